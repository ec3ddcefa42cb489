//! Nutrient aggregation
//!
//! The one place where a selection becomes nutrient totals:
//! `total[n] += density[n] * grams / 100` for every resolvable entry.
//! Entries that cannot be used are skipped and reported, never fatal.

use serde::Serialize;

use crate::models::{check_grams, NutrientVector, RawSelectionEntry, SelectionEntry};
use super::{Catalog, EngineError};

/// A selection entry that contributed to the totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEntry {
    /// Position in the submitted selection
    pub index: usize,
    pub ingredient_id: i64,
    pub name: String,
    pub grams: f64,
}

/// Why an entry was left out
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnresolvedIngredientId,
    MalformedSelectionEntry(String),
}

/// A selection entry that did not contribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntry {
    pub index: usize,
    pub ingredient_id: Option<i64>,
    pub reason: SkipReason,
}

/// Totals for a selection plus an account of every entry
#[derive(Debug, Clone, Serialize)]
pub struct Aggregation {
    pub totals: NutrientVector,
    /// Grams of resolved entries only
    pub total_grams: f64,
    pub resolved: Vec<ResolvedEntry>,
    pub skipped: Vec<SkippedEntry>,
}

impl Aggregation {
    fn empty() -> Self {
        Self {
            totals: NutrientVector::zero(),
            total_grams: 0.0,
            resolved: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn add(&mut self, index: usize, entry: &SelectionEntry, catalog: &Catalog) {
        // typed entries are built without validation
        if let Err(reason) = check_grams(entry.grams) {
            let error = EngineError::MalformedSelectionEntry { index, reason };
            self.reject(error, Some(entry.ingredient_id));
            return;
        }

        let Some(ingredient) = catalog.get(entry.ingredient_id) else {
            tracing::warn!(
                "{} (selection index {}), entry skipped",
                EngineError::UnresolvedIngredientId(entry.ingredient_id),
                index
            );
            self.skipped.push(SkippedEntry {
                index,
                ingredient_id: Some(entry.ingredient_id),
                reason: SkipReason::UnresolvedIngredientId,
            });
            return;
        };

        self.totals.add_scaled(&ingredient.nutrients, entry.grams / 100.0);
        self.total_grams += entry.grams;
        self.resolved.push(ResolvedEntry {
            index,
            ingredient_id: ingredient.id,
            name: ingredient.name.clone(),
            grams: entry.grams,
        });
    }

    fn reject(&mut self, error: EngineError, ingredient_id: Option<i64>) {
        tracing::warn!("{}, entry skipped", error);
        if let EngineError::MalformedSelectionEntry { index, reason } = error {
            self.skipped.push(SkippedEntry {
                index,
                ingredient_id,
                reason: SkipReason::MalformedSelectionEntry(reason),
            });
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Aggregate validated entries. Duplicate ids add up.
pub fn aggregate(selection: &[SelectionEntry], catalog: &Catalog) -> Aggregation {
    let mut aggregation = Aggregation::empty();
    for (index, entry) in selection.iter().enumerate() {
        aggregation.add(index, entry, catalog);
    }
    aggregation
}

/// Aggregate untyped entries, validating each one first. Malformed entries
/// are skipped alongside unresolved ones.
pub fn aggregate_raw(selection: &[RawSelectionEntry], catalog: &Catalog) -> Aggregation {
    let mut aggregation = Aggregation::empty();
    for (index, raw) in selection.iter().enumerate() {
        match raw.validate(index) {
            Ok(entry) => aggregation.add(index, &entry, catalog),
            Err(e) => aggregation.reject(e, raw.ingredient_id.as_i64()),
        }
    }
    aggregation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, Nutrient};
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Ingredient::new(
                1,
                "Sardine",
                NutrientVector::from_pairs([
                    (Nutrient::Calcium, 70.0),
                    (Nutrient::Lysine, 1900.0),
                    (Nutrient::VitaminD, 32.0),
                ]),
            ),
            Ingredient::new(
                2,
                "Spinach",
                NutrientVector::from_pairs([(Nutrient::Calcium, 49.0), (Nutrient::Iron, 2.0)]),
            ),
            Ingredient::new(3, "Rice", NutrientVector::from_pairs([(Nutrient::EnergyKcal, 156.0)])),
        ])
        .unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_scales_by_grams_over_100() {
        let result = aggregate(&[SelectionEntry::new(1, 50.0), SelectionEntry::new(2, 200.0)], &catalog());
        assert!(close(result.totals.get(Nutrient::Calcium), 35.0 + 98.0));
        assert!(close(result.totals.get(Nutrient::Iron), 4.0));
        assert!(close(result.totals.get(Nutrient::VitaminD), 16.0));
        assert!(close(result.total_grams, 250.0));
        assert_eq!(result.resolved.len(), 2);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_zero_grams_contribute_nothing() {
        let c = catalog();
        for id in [1, 2, 3] {
            let result = aggregate(&[SelectionEntry::new(id, 0.0)], &c);
            assert_eq!(result.totals, NutrientVector::zero());
            assert_eq!(result.resolved.len(), 1);
        }
    }

    #[test]
    fn test_order_does_not_change_totals() {
        let c = catalog();
        let forward = [
            SelectionEntry::new(1, 30.0),
            SelectionEntry::new(2, 70.0),
            SelectionEntry::new(3, 110.0),
        ];
        let mut backward = forward;
        backward.reverse();

        let a = aggregate(&forward, &c);
        let b = aggregate(&backward, &c);
        for nutrient in Nutrient::ALL {
            assert!(close(a.totals.get(nutrient), b.totals.get(nutrient)));
        }
    }

    #[test]
    fn test_duplicate_entries_add_up() {
        let c = catalog();
        let once = aggregate(&[SelectionEntry::new(1, 40.0)], &c);
        let twice = aggregate(&[SelectionEntry::new(1, 40.0), SelectionEntry::new(1, 40.0)], &c);
        for nutrient in Nutrient::ALL {
            assert!(close(twice.totals.get(nutrient), 2.0 * once.totals.get(nutrient)));
        }
        assert_eq!(twice.resolved.len(), 2);
    }

    #[test]
    fn test_unknown_id_is_skipped_not_fatal() {
        let result = aggregate(&[SelectionEntry::new(1, 100.0), SelectionEntry::new(9999, 50.0)], &catalog());
        assert_eq!(result.skipped_count(), 1);
        assert_eq!(
            result.skipped[0],
            SkippedEntry {
                index: 1,
                ingredient_id: Some(9999),
                reason: SkipReason::UnresolvedIngredientId,
            }
        );
        assert!(close(result.totals.get(Nutrient::Calcium), 70.0));
        assert!(close(result.total_grams, 100.0));
    }

    #[test]
    fn test_typed_entry_with_bad_grams_is_skipped() {
        let result = aggregate(
            &[SelectionEntry::new(1, -50.0), SelectionEntry::new(2, f64::NAN), SelectionEntry::new(1, 100.0)],
            &catalog(),
        );
        assert_eq!(result.skipped_count(), 2);
        assert_eq!(result.skipped[0].index, 0);
        assert_eq!(result.skipped[0].ingredient_id, Some(1));
        assert!(matches!(
            &result.skipped[0].reason,
            SkipReason::MalformedSelectionEntry(reason) if reason.contains("negative")
        ));
        assert_eq!(result.skipped[1].index, 1);
        // only the valid 100 g entry counts
        assert!(close(result.totals.get(Nutrient::Calcium), 70.0));
        assert!(close(result.total_grams, 100.0));
    }

    #[test]
    fn test_raw_entries_skip_malformed_and_keep_indices() {
        let raw: Vec<RawSelectionEntry> = serde_json::from_value(json!([
            {"ingredient_id": 2, "grams": 100},
            {"ingredient_id": 1, "grams": -10},
            {"ingredient_id": "x", "grams": 10},
            {"food_code": "1", "grams": "100"},
        ]))
        .unwrap();

        let result = aggregate_raw(&raw, &catalog());
        let resolved: Vec<usize> = result.resolved.iter().map(|r| r.index).collect();
        assert_eq!(resolved, vec![0, 3]);

        assert_eq!(result.skipped.len(), 2);
        assert_eq!(result.skipped[0].index, 1);
        assert_eq!(result.skipped[0].ingredient_id, Some(1));
        assert!(matches!(result.skipped[0].reason, SkipReason::MalformedSelectionEntry(_)));
        assert_eq!(result.skipped[1].index, 2);
        assert_eq!(result.skipped[1].ingredient_id, None);

        assert!(close(result.totals.get(Nutrient::Calcium), 49.0 + 70.0));
    }

    #[test]
    fn test_empty_selection() {
        let result = aggregate(&[], &catalog());
        assert_eq!(result.totals, NutrientVector::zero());
        assert_eq!(result.total_grams, 0.0);
    }
}
