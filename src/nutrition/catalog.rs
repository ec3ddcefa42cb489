//! In-memory ingredient catalog
//!
//! Built once from storage at startup and shared read-only afterwards.
//! Ingredients are held in ascending id order, which is the catalog's
//! iteration order and the tie-break order for every ranking.

use std::collections::HashMap;

use crate::models::Ingredient;
use super::EngineError;

#[derive(Debug, Clone)]
pub struct Catalog {
    ingredients: Vec<Ingredient>,
    by_id: HashMap<i64, usize>,
}

impl Catalog {
    /// Build a catalog. Duplicate ids keep the first occurrence and are
    /// logged; an empty input is `EmptyCatalog`.
    pub fn new(ingredients: impl IntoIterator<Item = Ingredient>) -> Result<Self, EngineError> {
        let mut ingredients: Vec<Ingredient> = ingredients.into_iter().collect();
        // stable: among equal ids the first occurrence stays first
        ingredients.sort_by_key(|i| i.id);

        let before = ingredients.len();
        ingredients.dedup_by_key(|i| i.id);
        if ingredients.len() < before {
            tracing::warn!(
                "Catalog: skipped {} ingredient(s) with duplicate ids",
                before - ingredients.len()
            );
        }

        if ingredients.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }

        let by_id = ingredients
            .iter()
            .enumerate()
            .map(|(pos, i)| (i.id, pos))
            .collect();

        Ok(Self { ingredients, by_id })
    }

    pub fn get(&self, id: i64) -> Option<&Ingredient> {
        self.by_id.get(&id).map(|&pos| &self.ingredients[pos])
    }

    pub fn contains(&self, id: i64) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Ingredients in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.iter()
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    /// Always false for a constructed catalog
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Nutrient, NutrientVector};

    fn item(id: i64, name: &str, calcium: f64) -> Ingredient {
        Ingredient::new(id, name, NutrientVector::from_pairs([(Nutrient::Calcium, calcium)]))
    }

    #[test]
    fn test_empty_catalog_is_an_error() {
        let err = Catalog::new(Vec::new()).unwrap_err();
        assert_eq!(err, EngineError::EmptyCatalog);
    }

    #[test]
    fn test_iterates_in_id_order() {
        let catalog = Catalog::new(vec![item(30, "c", 0.0), item(10, "a", 0.0), item(20, "b", 0.0)]).unwrap();
        let ids: Vec<i64> = catalog.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let catalog = Catalog::new(vec![item(1, "first", 10.0), item(1, "second", 20.0)]).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(1).unwrap().name, "first");
    }

    #[test]
    fn test_lookup() {
        let catalog = Catalog::new(vec![item(5, "kale", 150.0)]).unwrap();
        assert!(catalog.contains(5));
        assert!(!catalog.contains(6));
        assert_eq!(catalog.get(5).unwrap().nutrients.get(Nutrient::Calcium), 150.0);
        assert!(catalog.get(9999).is_none());
    }
}
