//! Analysis MCP Tools
//!
//! Totals, pass/fail tables and suggestions for ingredient selections.

use serde::Serialize;

use crate::models::{Nutrient, NutrientVector, RawSelectionEntry, SelectionEntry};
use crate::nutrition::{
    aggregate, aggregate_raw, classify, parse_nutrient_keys, suggest_best, suggest_per_nutrient,
    Aggregation, AnalysisContext, EngineError, NutrientResult, NutrientSuggestions,
    PerNutrientOptions, ResolvedEntry, SkippedEntry, Suggestion, DEFAULT_SUGGESTION_LIMIT,
    DEFAULT_TOP_N,
};

/// Response for calculate_nutrients
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub totals: NutrientVector,
    pub total_grams: f64,
    pub resolved: Vec<ResolvedEntry>,
    pub skipped: Vec<SkippedEntry>,
    pub standards_degraded: bool,
}

/// Knobs for a full analysis
#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    pub suggestion_limit: usize,
    pub best_limit: usize,
    pub positive_only: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            best_limit: DEFAULT_TOP_N,
            positive_only: false,
        }
    }
}

/// Response for analyze_selection and analyze_current_selection
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub selected: Vec<ResolvedEntry>,
    pub total_grams: f64,
    pub results: Vec<NutrientResult>,
    pub deficiencies: Vec<Nutrient>,
    pub passes: bool,
    pub per_nutrient_suggestions: Vec<NutrientSuggestions>,
    pub best_suggestions: Vec<Suggestion>,
    pub skipped: Vec<SkippedEntry>,
    pub standards_degraded: bool,
}

/// Response for suggest_for_nutrients
#[derive(Debug, Serialize)]
pub struct PerNutrientResponse {
    pub suggestions: Vec<NutrientSuggestions>,
    pub standards_degraded: bool,
}

/// Response for suggest_best_ingredients
#[derive(Debug, Serialize)]
pub struct BestIngredientsResponse {
    pub nutrients: Vec<Nutrient>,
    pub suggestions: Vec<Suggestion>,
    pub standards_degraded: bool,
}

pub fn calculate_nutrients(ctx: &AnalysisContext, selection: &[RawSelectionEntry]) -> CalculateResponse {
    let aggregation = aggregate_raw(selection, &ctx.catalog);
    CalculateResponse {
        totals: aggregation.totals,
        total_grams: aggregation.total_grams,
        resolved: aggregation.resolved,
        skipped: aggregation.skipped,
        standards_degraded: ctx.standards_degraded(),
    }
}

fn analyze(ctx: &AnalysisContext, aggregation: Aggregation, options: AnalyzeOptions) -> AnalysisResponse {
    let classification = classify(&aggregation.totals, &ctx.standards);

    let per_nutrient_suggestions = suggest_per_nutrient(
        &classification.deficiencies,
        &ctx.catalog,
        PerNutrientOptions {
            limit: options.suggestion_limit,
            positive_only: options.positive_only,
        },
    );
    let best_suggestions = suggest_best(
        &classification.deficiencies,
        &ctx.catalog,
        &ctx.standards,
        options.best_limit,
    );

    AnalysisResponse {
        selected: aggregation.resolved,
        total_grams: aggregation.total_grams,
        passes: classification.passes(),
        results: classification.results,
        deficiencies: classification.deficiencies,
        per_nutrient_suggestions,
        best_suggestions,
        skipped: aggregation.skipped,
        standards_degraded: classification.degraded,
    }
}

/// Full analysis of a selection submitted by the caller
pub fn analyze_selection(
    ctx: &AnalysisContext,
    selection: &[RawSelectionEntry],
    options: AnalyzeOptions,
) -> AnalysisResponse {
    analyze(ctx, aggregate_raw(selection, &ctx.catalog), options)
}

/// Full analysis of already validated entries
pub fn analyze_entries(
    ctx: &AnalysisContext,
    selection: &[SelectionEntry],
    options: AnalyzeOptions,
) -> AnalysisResponse {
    analyze(ctx, aggregate(selection, &ctx.catalog), options)
}

pub fn suggest_for_nutrients(
    ctx: &AnalysisContext,
    nutrients: &[String],
    options: PerNutrientOptions,
) -> Result<PerNutrientResponse, EngineError> {
    let nutrients = parse_nutrient_keys(nutrients)?;
    Ok(PerNutrientResponse {
        suggestions: suggest_per_nutrient(&nutrients, &ctx.catalog, options),
        standards_degraded: ctx.standards_degraded(),
    })
}

pub fn suggest_best_ingredients(
    ctx: &AnalysisContext,
    nutrients: &[String],
    top_n: usize,
) -> Result<BestIngredientsResponse, EngineError> {
    let nutrients = parse_nutrient_keys(nutrients)?;
    let suggestions = suggest_best(&nutrients, &ctx.catalog, &ctx.standards, top_n);
    Ok(BestIngredientsResponse {
        nutrients,
        suggestions,
        standards_degraded: ctx.standards_degraded(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, Standard, StandardsTable};
    use crate::nutrition::{Catalog, Status};
    use serde_json::json;

    fn context() -> AnalysisContext {
        let catalog = Catalog::new(vec![
            Ingredient::new(
                10,
                "Sardine",
                NutrientVector::from_pairs([(Nutrient::Calcium, 300.0), (Nutrient::VitaminD, 10.0)]),
            ),
            Ingredient::new(20, "Kale", NutrientVector::from_pairs([(Nutrient::Calcium, 150.0)])),
            Ingredient::new(30, "Rice", NutrientVector::from_pairs([(Nutrient::EnergyKcal, 156.0)])),
        ])
        .unwrap();
        let standards = StandardsTable::new([
            Standard { nutrient: Nutrient::Calcium, minimum: 100.0 },
            Standard { nutrient: Nutrient::VitaminD, minimum: 5.0 },
        ]);
        AnalysisContext::new(catalog, standards)
    }

    fn raw(value: serde_json::Value) -> Vec<RawSelectionEntry> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_calculate_reports_skips() {
        let ctx = context();
        let response = calculate_nutrients(
            &ctx,
            &raw(json!([{"ingredient_id": 20, "grams": 50}, {"ingredient_id": 9999, "grams": 50}])),
        );
        assert_eq!(response.totals.get(Nutrient::Calcium), 75.0);
        assert_eq!(response.total_grams, 50.0);
        assert_eq!(response.skipped.len(), 1);
        assert!(!response.standards_degraded);
    }

    #[test]
    fn test_analyze_flags_and_suggests() {
        let ctx = context();
        let response = analyze_selection(
            &ctx,
            &raw(json!([{"ingredient_id": 30, "grams": 200}])),
            AnalyzeOptions::default(),
        );

        assert!(!response.passes);
        assert_eq!(response.deficiencies, vec![Nutrient::Calcium, Nutrient::VitaminD]);
        assert!(response.results.iter().all(|r| r.status == Status::Fail));

        assert_eq!(response.per_nutrient_suggestions.len(), 2);
        assert_eq!(response.per_nutrient_suggestions[0].ingredients[0].ingredient_id, 10);

        // sardine covers both, kale only calcium
        let best: Vec<i64> = response.best_suggestions.iter().map(|s| s.ingredient_id).collect();
        assert_eq!(best, vec![10, 20]);
    }

    #[test]
    fn test_analyze_passing_selection_has_no_suggestions() {
        let ctx = context();
        let response = analyze_entries(&ctx, &[SelectionEntry::new(10, 100.0)], AnalyzeOptions::default());
        assert!(response.passes);
        assert!(response.per_nutrient_suggestions.is_empty());
        assert!(response.best_suggestions.is_empty());
    }

    #[test]
    fn test_suggest_rejects_unknown_keys() {
        let ctx = context();
        let err = suggest_for_nutrients(&ctx, &["CA".to_string(), "FIBER".to_string()], PerNutrientOptions::default())
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidNutrientKey("FIBER".to_string()));

        let empty = suggest_for_nutrients(&ctx, &[], PerNutrientOptions::default()).unwrap();
        assert!(empty.suggestions.is_empty());
    }

    #[test]
    fn test_suggest_best_ingredients() {
        let ctx = context();
        let response = suggest_best_ingredients(&ctx, &["vitd".to_string(), "ca".to_string()], 1).unwrap();
        assert_eq!(response.nutrients, vec![Nutrient::VitaminD, Nutrient::Calcium]);
        assert_eq!(response.suggestions.len(), 1);
        assert_eq!(response.suggestions[0].ingredient_id, 10);
        assert_eq!(response.suggestions[0].coverage_score, 2.0);
    }
}
