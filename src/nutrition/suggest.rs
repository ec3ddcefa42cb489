//! Single-nutrient suggestions
//!
//! For each deficient nutrient, the catalog ingredients richest in that
//! nutrient. Ties on density resolve by ascending ingredient id.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{Ingredient, Nutrient, NutrientVector};
use super::{Catalog, EngineError};

pub const DEFAULT_SUGGESTION_LIMIT: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerNutrientOptions {
    pub limit: usize,
    /// Leave out ingredients that contain none of the nutrient
    pub positive_only: bool,
}

impl Default for PerNutrientOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SUGGESTION_LIMIT,
            positive_only: false,
        }
    }
}

/// An ingredient ranked by one nutrient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedIngredient {
    pub ingredient_id: i64,
    pub name: String,
    pub category: Option<String>,
    /// Amount of the ranked nutrient per 100 g
    pub value: f64,
    /// Every nutrient per 100 g, for previewing the effect of adding it
    pub nutrients: NutrientVector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientSuggestions {
    pub nutrient: Nutrient,
    pub label: &'static str,
    pub unit: &'static str,
    pub ingredients: Vec<RankedIngredient>,
}

/// Parse nutrient codes, dropping repeats and keeping first-seen order.
/// Any unknown code fails the whole call.
pub fn parse_nutrient_keys<S: AsRef<str>>(keys: &[S]) -> Result<Vec<Nutrient>, EngineError> {
    let mut nutrients = Vec::with_capacity(keys.len());
    for key in keys {
        let key = key.as_ref();
        let nutrient = Nutrient::from_code(key)
            .ok_or_else(|| EngineError::InvalidNutrientKey(key.to_string()))?;
        if !nutrients.contains(&nutrient) {
            nutrients.push(nutrient);
        }
    }
    Ok(nutrients)
}

/// Descending by density, then ascending id
fn by_density_desc(nutrient: Nutrient) -> impl Fn(&&Ingredient, &&Ingredient) -> Ordering {
    move |a: &&Ingredient, b: &&Ingredient| {
        b.nutrients
            .get(nutrient)
            .total_cmp(&a.nutrients.get(nutrient))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Top ingredients for a single nutrient
pub fn rank_by_nutrient(
    nutrient: Nutrient,
    catalog: &Catalog,
    options: PerNutrientOptions,
) -> Vec<RankedIngredient> {
    let mut candidates: Vec<&Ingredient> = catalog
        .iter()
        .filter(|i| !options.positive_only || i.nutrients.get(nutrient) > 0.0)
        .collect();
    candidates.sort_by(by_density_desc(nutrient));

    candidates
        .into_iter()
        .take(options.limit)
        .map(|i| RankedIngredient {
            ingredient_id: i.id,
            name: i.name.clone(),
            category: i.category.clone(),
            value: i.nutrients.get(nutrient),
            nutrients: i.nutrients,
        })
        .collect()
}

/// Top ingredients for each deficient nutrient, in deficiency order
pub fn suggest_per_nutrient(
    deficiencies: &[Nutrient],
    catalog: &Catalog,
    options: PerNutrientOptions,
) -> Vec<NutrientSuggestions> {
    deficiencies
        .iter()
        .map(|&nutrient| NutrientSuggestions {
            nutrient,
            label: nutrient.label(),
            unit: nutrient.unit(),
            ingredients: rank_by_nutrient(nutrient, catalog, options),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let item = |id: i64, name: &str, iron: f64, zinc: f64| {
            Ingredient::new(
                id,
                name,
                NutrientVector::from_pairs([(Nutrient::Iron, iron), (Nutrient::Zinc, zinc)]),
            )
        };
        Catalog::new(vec![
            item(4, "Liver", 9.0, 4.0),
            item(2, "Clams", 3.8, 2.7),
            item(1, "Lentils", 3.8, 1.3),
            item(3, "Apple", 0.0, 0.0),
            item(5, "Oyster", 2.1, 14.0),
        ])
        .unwrap()
    }

    fn ids(ranked: &[RankedIngredient]) -> Vec<i64> {
        ranked.iter().map(|r| r.ingredient_id).collect()
    }

    #[test]
    fn test_descending_with_id_tie_break() {
        let ranked = rank_by_nutrient(Nutrient::Iron, &catalog(), PerNutrientOptions::default());
        // clams and lentils tie at 3.8; lower id first
        assert_eq!(ids(&ranked), vec![4, 1, 2, 5, 3]);
        assert_eq!(ranked[0].value, 9.0);
        assert_eq!(ranked[0].name, "Liver");
        // full profile travels with the ranked row
        assert_eq!(ranked[0].nutrients.get(Nutrient::Zinc), 4.0);
        assert_eq!(ranked[3].nutrients.get(Nutrient::Zinc), 14.0);
    }

    #[test]
    fn test_limit_truncates() {
        let options = PerNutrientOptions { limit: 2, positive_only: false };
        let ranked = rank_by_nutrient(Nutrient::Zinc, &catalog(), options);
        assert_eq!(ids(&ranked), vec![5, 4]);
    }

    #[test]
    fn test_positive_only_drops_zero_density() {
        let options = PerNutrientOptions { limit: 15, positive_only: true };
        let ranked = rank_by_nutrient(Nutrient::Iron, &catalog(), options);
        assert!(!ids(&ranked).contains(&3));

        let ranked = rank_by_nutrient(Nutrient::VitaminD, &catalog(), options);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_one_group_per_deficiency() {
        let groups = suggest_per_nutrient(
            &[Nutrient::Zinc, Nutrient::Iron],
            &catalog(),
            PerNutrientOptions::default(),
        );
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].nutrient, Nutrient::Zinc);
        assert_eq!(groups[0].unit, "mg");
        assert_eq!(groups[1].ingredients.len(), 5);
    }

    #[test]
    fn test_parse_nutrient_keys() {
        let parsed = parse_nutrient_keys(&["fe", "ZN", "FE"]).unwrap();
        assert_eq!(parsed, vec![Nutrient::Iron, Nutrient::Zinc]);

        let err = parse_nutrient_keys(&["FE", "protein"]).unwrap_err();
        assert_eq!(err, EngineError::InvalidNutrientKey("protein".to_string()));

        let empty: [&str; 0] = [];
        assert!(parse_nutrient_keys(&empty).unwrap().is_empty());
    }
}
