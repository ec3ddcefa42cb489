//! Deficiency classification
//!
//! Compares totals against the standards table. A nutrient is deficient
//! iff its total is strictly below the minimum; reaching the minimum
//! exactly passes. Nutrients without a standard are never flagged.

use serde::Serialize;

use crate::models::{Nutrient, NutrientVector, StandardsTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    /// Display mark used by the result table
    pub fn symbol(self) -> &'static str {
        match self {
            Status::Pass => "○",
            Status::Fail => "×",
        }
    }
}

/// One row of the pass/fail table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientResult {
    pub nutrient: Nutrient,
    pub label: &'static str,
    pub unit: &'static str,
    pub total: f64,
    pub minimum: f64,
    pub status: Status,
    pub symbol: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Deficient nutrients in standards order
    pub deficiencies: Vec<Nutrient>,
    /// One row per constrained nutrient, standards order
    pub results: Vec<NutrientResult>,
    /// Standards were unavailable; every minimum was taken as 0
    pub degraded: bool,
}

impl Classification {
    pub fn is_deficient(&self, nutrient: Nutrient) -> bool {
        self.deficiencies.contains(&nutrient)
    }

    pub fn passes(&self) -> bool {
        self.deficiencies.is_empty()
    }
}

pub fn classify(totals: &NutrientVector, standards: &StandardsTable) -> Classification {
    let constrained: Vec<(Nutrient, f64)> = if standards.is_degraded() {
        Nutrient::ALL.iter().map(|&n| (n, 0.0)).collect()
    } else {
        standards.iter().map(|s| (s.nutrient, s.minimum)).collect()
    };

    let mut deficiencies = Vec::new();
    let mut results = Vec::with_capacity(constrained.len());

    for (nutrient, minimum) in constrained {
        let total = totals.get(nutrient);
        let status = if total < minimum { Status::Fail } else { Status::Pass };
        if status == Status::Fail {
            deficiencies.push(nutrient);
        }
        results.push(NutrientResult {
            nutrient,
            label: nutrient.label(),
            unit: nutrient.unit(),
            total,
            minimum,
            status,
            symbol: status.symbol(),
        });
    }

    Classification {
        deficiencies,
        results,
        degraded: standards.is_degraded(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Standard;

    fn standards() -> StandardsTable {
        StandardsTable::new([
            Standard { nutrient: Nutrient::Lysine, minimum: 500.0 },
            Standard { nutrient: Nutrient::Calcium, minimum: 100.0 },
            Standard { nutrient: Nutrient::Zinc, minimum: 0.0 },
        ])
    }

    #[test]
    fn test_strictly_below_minimum_fails() {
        let totals = NutrientVector::from_pairs([(Nutrient::Lysine, 499.9), (Nutrient::Calcium, 100.0)]);
        let result = classify(&totals, &standards());

        assert_eq!(result.deficiencies, vec![Nutrient::Lysine]);
        assert!(result.is_deficient(Nutrient::Lysine));
        assert!(!result.is_deficient(Nutrient::Calcium));
        assert!(!result.passes());
        assert!(!result.degraded);
    }

    #[test]
    fn test_results_follow_standards_order() {
        let result = classify(&NutrientVector::zero(), &standards());
        let order: Vec<Nutrient> = result.results.iter().map(|r| r.nutrient).collect();
        assert_eq!(order, vec![Nutrient::Lysine, Nutrient::Calcium, Nutrient::Zinc]);

        assert_eq!(result.results[0].symbol, "×");
        assert_eq!(result.results[2].status, Status::Pass);
        assert_eq!(result.results[2].symbol, "○");
    }

    #[test]
    fn test_unconstrained_nutrients_never_flagged() {
        // iron is far below anything, but has no standard
        let totals = NutrientVector::from_pairs([(Nutrient::Lysine, 600.0), (Nutrient::Calcium, 200.0)]);
        let result = classify(&totals, &standards());
        assert!(result.passes());
        assert!(result.results.iter().all(|r| r.nutrient != Nutrient::Iron));
    }

    #[test]
    fn test_degraded_standards_never_flag() {
        let result = classify(&NutrientVector::zero(), &StandardsTable::degraded());
        assert!(result.degraded);
        assert!(result.deficiencies.is_empty());
        assert_eq!(result.results.len(), Nutrient::ALL.len());
        assert!(result.results.iter().all(|r| r.status == Status::Pass && r.minimum == 0.0));
    }
}
