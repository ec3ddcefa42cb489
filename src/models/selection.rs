//! Selection entries
//!
//! A selection is the caller's list of `(ingredient, grams)` pairs. Entries
//! arrive untyped from the transport and are validated one by one, so a bad
//! entry is rejected without failing the rest of the selection.

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::nutrition::EngineError;

/// A validated selection entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub ingredient_id: i64,
    pub grams: f64,
}

impl SelectionEntry {
    pub fn new(ingredient_id: i64, grams: f64) -> Self {
        Self { ingredient_id, grams }
    }
}

/// A selection entry as received, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RawSelectionEntry {
    /// Ingredient id (food code); `food_code` is accepted as an alias
    #[serde(default, alias = "food_code")]
    pub ingredient_id: Value,
    /// Amount in grams, at least 0
    #[serde(default)]
    pub grams: Value,
}

impl From<SelectionEntry> for RawSelectionEntry {
    fn from(entry: SelectionEntry) -> Self {
        Self {
            ingredient_id: Value::from(entry.ingredient_id),
            grams: Value::from(entry.grams),
        }
    }
}

impl RawSelectionEntry {
    /// Validate into a `SelectionEntry`. `index` is the entry's position in
    /// the selection and is carried into the error.
    pub fn validate(&self, index: usize) -> Result<SelectionEntry, EngineError> {
        let malformed = |reason: String| EngineError::MalformedSelectionEntry { index, reason };

        let ingredient_id = parse_id(&self.ingredient_id).map_err(malformed)?;
        let grams = parse_grams(&self.grams).map_err(malformed)?;

        Ok(SelectionEntry { ingredient_id, grams })
    }
}

/// Validate a whole selection, splitting it into accepted entries and
/// per-entry errors. Accepted entries keep their relative order.
pub fn validate_selection(raw: &[RawSelectionEntry]) -> (Vec<SelectionEntry>, Vec<EngineError>) {
    let mut accepted = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();
    for (index, entry) in raw.iter().enumerate() {
        match entry.validate(index) {
            Ok(entry) => accepted.push(entry),
            Err(e) => rejected.push(e),
        }
    }
    (accepted, rejected)
}

fn parse_id(value: &Value) -> Result<i64, String> {
    match value {
        Value::Null => Err("missing ingredient id".to_string()),
        Value::Number(n) => {
            if let Some(id) = n.as_i64() {
                return Ok(id);
            }
            // 1234.0 from loosely typed clients
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(format!("ingredient id is not an integer: {}", n)),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("ingredient id is not an integer: '{}'", s)),
        other => Err(format!("ingredient id has wrong type: {}", other)),
    }
}

fn parse_grams(value: &Value) -> Result<f64, String> {
    let grams = match value {
        Value::Null => return Err("missing grams".to_string()),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("grams is not a number: {}", n))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("grams is not a number: '{}'", s))?,
        other => return Err(format!("grams has wrong type: {}", other)),
    };
    check_grams(grams)
}

/// Grams must be finite and not negative
pub(crate) fn check_grams(grams: f64) -> Result<f64, String> {
    if !grams.is_finite() {
        return Err(format!("grams must be finite, got {}", grams));
    }
    if grams < 0.0 {
        return Err(format!("grams cannot be negative, got {}", grams));
    }
    Ok(grams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawSelectionEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_numbers_and_numeric_strings_are_accepted() {
        let entry = raw(json!({"ingredient_id": 1001, "grams": 120.5})).validate(0).unwrap();
        assert_eq!(entry, SelectionEntry::new(1001, 120.5));

        let entry = raw(json!({"food_code": "1001", "grams": "80"})).validate(0).unwrap();
        assert_eq!(entry, SelectionEntry::new(1001, 80.0));

        let entry = raw(json!({"ingredient_id": 1001.0, "grams": 0})).validate(0).unwrap();
        assert_eq!(entry, SelectionEntry::new(1001, 0.0));
    }

    #[test]
    fn test_negative_grams_rejected() {
        let err = raw(json!({"ingredient_id": 1, "grams": -5})).validate(3).unwrap_err();
        match err {
            EngineError::MalformedSelectionEntry { index, reason } => {
                assert_eq!(index, 3);
                assert!(reason.contains("negative"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_and_missing_fields_rejected() {
        assert!(raw(json!({"ingredient_id": "abc", "grams": 10})).validate(0).is_err());
        assert!(raw(json!({"ingredient_id": 1, "grams": "lots"})).validate(0).is_err());
        assert!(raw(json!({"ingredient_id": 1.5, "grams": 10})).validate(0).is_err());
        assert!(raw(json!({"grams": 10})).validate(0).is_err());
        assert!(raw(json!({"ingredient_id": 1})).validate(0).is_err());
        assert!(raw(json!({"ingredient_id": [1], "grams": 10})).validate(0).is_err());
    }

    #[test]
    fn test_validate_selection_keeps_good_entries() {
        let entries = vec![
            raw(json!({"ingredient_id": 1, "grams": 10})),
            raw(json!({"ingredient_id": 2, "grams": -1})),
            raw(json!({"ingredient_id": 3, "grams": 30})),
        ];
        let (accepted, rejected) = validate_selection(&entries);
        assert_eq!(accepted, vec![SelectionEntry::new(1, 10.0), SelectionEntry::new(3, 30.0)]);
        assert_eq!(rejected.len(), 1);
        assert!(matches!(
            rejected[0],
            EngineError::MalformedSelectionEntry { index: 1, .. }
        ));
    }

    #[test]
    fn test_typed_entry_converts_back_to_raw() {
        let raw: RawSelectionEntry = SelectionEntry::new(7, 25.0).into();
        assert_eq!(raw.validate(0).unwrap(), SelectionEntry::new(7, 25.0));
    }
}
