//! Engine error kinds

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Selection references an id that is not in the catalog. Non-fatal:
    /// the entry is skipped and the rest of the selection still counts.
    #[error("Ingredient not found with id: {0}")]
    UnresolvedIngredientId(i64),

    /// Caller asked about a nutrient the system does not track
    #[error("Invalid nutrient key: '{0}'")]
    InvalidNutrientKey(String),

    /// Negative, non-finite, missing or non-numeric id/grams
    #[error("Malformed selection entry at index {index}: {reason}")]
    MalformedSelectionEntry { index: usize, reason: String },

    #[error("Ingredient catalog is empty")]
    EmptyCatalog,

    /// No standards loaded; analysis runs as if every minimum were 0
    #[error("Nutrient standards are unavailable")]
    MissingStandards,
}
