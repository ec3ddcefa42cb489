//! Data models
//!
//! Nutrient keys, catalog ingredients, standards and selection entries.

mod ingredient;
mod nutrient;
mod selection;
mod standard;

pub use ingredient::Ingredient;
pub use nutrient::{Nutrient, NutrientVector, UnknownNutrient, NUTRIENT_COUNT};
pub use selection::{validate_selection, RawSelectionEntry, SelectionEntry};
pub(crate) use selection::check_grams;
pub use standard::{Standard, StandardsTable};
