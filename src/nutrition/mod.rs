//! Nutrition analysis engine
//!
//! Aggregation, deficiency classification and ingredient suggestions over a
//! read-only catalog and standards table.

mod aggregator;
mod catalog;
mod classifier;
mod error;
mod optimizer;
mod suggest;

use std::sync::Arc;

pub use aggregator::{aggregate, aggregate_raw, Aggregation, ResolvedEntry, SkipReason, SkippedEntry};
pub use catalog::Catalog;
pub use classifier::{classify, Classification, NutrientResult, Status};
pub use error::EngineError;
pub use optimizer::{suggest_best, Suggestion, DEFAULT_TOP_N};
pub use suggest::{
    parse_nutrient_keys, rank_by_nutrient, suggest_per_nutrient, NutrientSuggestions,
    PerNutrientOptions, RankedIngredient, DEFAULT_SUGGESTION_LIMIT,
};

use crate::models::StandardsTable;

/// Catalog and standards loaded at startup, shared by every request
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub catalog: Arc<Catalog>,
    pub standards: Arc<StandardsTable>,
}

impl AnalysisContext {
    pub fn new(catalog: Catalog, standards: StandardsTable) -> Self {
        if standards.is_degraded() {
            tracing::warn!("{}; no nutrient will be reported deficient", EngineError::MissingStandards);
        }
        Self {
            catalog: Arc::new(catalog),
            standards: Arc::new(standards),
        }
    }

    pub fn standards_degraded(&self) -> bool {
        self.standards.is_degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, Nutrient, NutrientVector, SelectionEntry, Standard};

    // Ingredient A carries 10 units per 100 g, B none; the minimum is 5.
    fn context() -> AnalysisContext {
        let catalog = Catalog::new(vec![
            Ingredient::new(1, "A", NutrientVector::from_pairs([(Nutrient::Lysine, 10.0)])),
            Ingredient::new(2, "B", NutrientVector::zero()),
        ])
        .unwrap();
        let standards = StandardsTable::new([Standard { nutrient: Nutrient::Lysine, minimum: 5.0 }]);
        AnalysisContext::new(catalog, standards)
    }

    fn run(ctx: &AnalysisContext, grams: f64) -> (Aggregation, Classification) {
        let aggregation = aggregate(&[SelectionEntry::new(1, grams)], &ctx.catalog);
        let classification = classify(&aggregation.totals, &ctx.standards);
        (aggregation, classification)
    }

    #[test]
    fn test_full_portion_passes() {
        let ctx = context();
        let (aggregation, classification) = run(&ctx, 100.0);
        assert_eq!(aggregation.totals.get(Nutrient::Lysine), 10.0);
        assert!(classification.passes());
    }

    #[test]
    fn test_exact_minimum_passes() {
        let ctx = context();
        let (aggregation, classification) = run(&ctx, 50.0);
        assert_eq!(aggregation.totals.get(Nutrient::Lysine), 5.0);
        assert!(classification.passes());
    }

    #[test]
    fn test_short_portion_suggests_only_contributor() {
        let ctx = context();
        let (aggregation, classification) = run(&ctx, 40.0);
        assert!((aggregation.totals.get(Nutrient::Lysine) - 4.0).abs() < 1e-9);
        assert_eq!(classification.deficiencies, vec![Nutrient::Lysine]);

        let best = suggest_best(&classification.deficiencies, &ctx.catalog, &ctx.standards, DEFAULT_TOP_N);
        let ids: Vec<i64> = best.iter().map(|s| s.ingredient_id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_degraded_context() {
        let catalog = Catalog::new(vec![Ingredient::new(1, "A", NutrientVector::zero())]).unwrap();
        let ctx = AnalysisContext::new(catalog, StandardsTable::degraded());
        assert!(ctx.standards_degraded());
    }
}
