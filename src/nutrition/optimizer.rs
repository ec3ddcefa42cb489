//! Multi-nutrient coverage
//!
//! Ranks ingredients by how many deficiencies 100 g of each would close.
//! Each deficient nutrient contributes `min(density / minimum, 1.0)`, so a
//! single very rich nutrient cannot outweigh broad coverage.

use serde::Serialize;

use crate::models::{Nutrient, NutrientVector, StandardsTable};
use super::Catalog;

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub ingredient_id: i64,
    pub name: String,
    pub coverage_score: f64,
    /// Deficient nutrients this ingredient contributes to, deficiency order
    pub covered_nutrients: Vec<Nutrient>,
}

fn score(
    nutrients: &NutrientVector,
    deficiencies: &[Nutrient],
    standards: &StandardsTable,
) -> (f64, Vec<Nutrient>) {
    let mut total = 0.0;
    let mut covered = Vec::new();

    for &nutrient in deficiencies {
        let minimum = standards.minimum_or_zero(nutrient);
        let density = nutrients.get(nutrient);
        if minimum <= 0.0 || density <= 0.0 {
            continue;
        }
        total += (density / minimum).min(1.0);
        covered.push(nutrient);
    }

    (total, covered)
}

/// Best ingredients for covering all deficiencies at once. Zero scores are
/// left out; ties go to the lower id.
pub fn suggest_best(
    deficiencies: &[Nutrient],
    catalog: &Catalog,
    standards: &StandardsTable,
    top_n: usize,
) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = catalog
        .iter()
        .filter_map(|ingredient| {
            let (coverage_score, covered_nutrients) =
                score(&ingredient.nutrients, deficiencies, standards);
            (coverage_score > 0.0).then(|| Suggestion {
                ingredient_id: ingredient.id,
                name: ingredient.name.clone(),
                coverage_score,
                covered_nutrients,
            })
        })
        .collect();

    suggestions.sort_by(|a, b| {
        b.coverage_score
            .total_cmp(&a.coverage_score)
            .then_with(|| a.ingredient_id.cmp(&b.ingredient_id))
    });
    suggestions.truncate(top_n);
    suggestions
}
