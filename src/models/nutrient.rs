//! Nutrient keys and per-ingredient nutrient vectors
//!
//! The tracked nutrients form a closed set. Each one has a stable code
//! (as used by the food composition tables and the standards file), a
//! database column, a display label, and a display unit.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! nutrients {
    ($( $variant:ident => ($code:literal, $column:literal, $label:literal, $unit:literal), )+) => {
        /// A tracked nutrient
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Nutrient {
            $( $variant, )+
        }

        impl Nutrient {
            /// Every nutrient, in declared order
            pub const ALL: [Nutrient; NUTRIENT_COUNT] = [ $( Nutrient::$variant, )+ ];

            /// Upper-case code, e.g. `ENERC_KCAL`
            pub fn code(self) -> &'static str {
                match self {
                    $( Nutrient::$variant => $code, )+
                }
            }

            /// Column name in the `ingredients` table
            pub fn column(self) -> &'static str {
                match self {
                    $( Nutrient::$variant => $column, )+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $( Nutrient::$variant => $label, )+
                }
            }

            /// Display unit of the per-100g amount
            pub fn unit(self) -> &'static str {
                match self {
                    $( Nutrient::$variant => $unit, )+
                }
            }
        }
    };
}

pub const NUTRIENT_COUNT: usize = 48;

nutrients! {
    EnergyKcal => ("ENERC_KCAL", "enerc_kcal", "Energy", "kcal"),
    Water => ("WATER", "water", "Water", "g"),
    Isoleucine => ("ILE", "ile", "Isoleucine", "mg"),
    Leucine => ("LEU", "leu", "Leucine", "mg"),
    Lysine => ("LYS", "lys", "Lysine", "mg"),
    Methionine => ("MET", "met", "Methionine", "mg"),
    Cystine => ("CYS", "cys", "Cystine", "mg"),
    Phenylalanine => ("PHE", "phe", "Phenylalanine", "mg"),
    Tyrosine => ("TYR", "tyr", "Tyrosine", "mg"),
    Threonine => ("THR", "thr", "Threonine", "mg"),
    Tryptophan => ("TRP", "trp", "Tryptophan", "mg"),
    Valine => ("VAL", "val", "Valine", "mg"),
    Histidine => ("HIS", "his", "Histidine", "mg"),
    Arginine => ("ARG", "arg", "Arginine", "mg"),
    LinoleicAcid => ("F18D2N6", "f18d2n6", "Linoleic acid", "g"),
    AlphaLinolenicAcid => ("F18D3N3", "f18d3n3", "alpha-Linolenic acid", "g"),
    Docosahexaenoic => ("F22D6N3", "f22d6n3", "Docosahexaenoic acid", "g"),
    Sodium => ("NAT", "nat", "Sodium", "mg"),
    Potassium => ("K", "k", "Potassium", "mg"),
    Calcium => ("CA", "ca", "Calcium", "mg"),
    Magnesium => ("MG", "mg", "Magnesium", "mg"),
    Phosphorus => ("P", "p", "Phosphorus", "mg"),
    Iron => ("FE", "fe", "Iron", "mg"),
    Zinc => ("ZN", "zn", "Zinc", "mg"),
    Copper => ("CU", "cu", "Copper", "mg"),
    Manganese => ("MN", "mn", "Manganese", "mg"),
    Iodine => ("YO", "yo", "Iodine", "ug"),
    Selenium => ("SE", "se", "Selenium", "ug"),
    Chromium => ("CR", "cr", "Chromium", "ug"),
    Retinol => ("RETOL", "retol", "Retinol", "ug"),
    AlphaCarotene => ("CARTA", "carta", "alpha-Carotene", "ug"),
    BetaCarotene => ("CARTB", "cartb", "beta-Carotene", "ug"),
    BetaCryptoxanthin => ("CRYPXB", "crypxb", "beta-Cryptoxanthin", "ug"),
    BetaCaroteneEquivalent => ("CARTBEQ", "cartbeq", "beta-Carotene equivalent", "ug"),
    VitaminARae => ("VITA_RAE", "vita_rae", "Vitamin A (RAE)", "ug"),
    VitaminD => ("VITD", "vitd", "Vitamin D", "ug"),
    AlphaTocopherol => ("TOCPHA", "tocpha", "alpha-Tocopherol", "mg"),
    BetaTocopherol => ("TOCPHB", "tocphb", "beta-Tocopherol", "mg"),
    GammaTocopherol => ("TOCPHG", "tocphg", "gamma-Tocopherol", "mg"),
    DeltaTocopherol => ("TOCPHD", "tocphd", "delta-Tocopherol", "mg"),
    Thiamin => ("THIA", "thia", "Thiamin (B1)", "mg"),
    Riboflavin => ("RIBF", "ribf", "Riboflavin (B2)", "mg"),
    Niacin => ("NIA", "nia", "Niacin", "mg"),
    VitaminB6 => ("VITB6A", "vitb6a", "Vitamin B6", "mg"),
    VitaminB12 => ("VITB12", "vitb12", "Vitamin B12", "ug"),
    Folate => ("FOL", "fol", "Folate", "ug"),
    PantothenicAcid => ("PANTAC", "pantac", "Pantothenic acid", "mg"),
    SaltEquivalent => ("NACL_EQ", "nacl_eq", "Salt equivalent", "g"),
}

impl Nutrient {
    /// Position in `ALL` and in every `NutrientVector`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse a nutrient code, ignoring case and surrounding whitespace
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|n| n.code().eq_ignore_ascii_case(code))
    }
}

/// Unknown nutrient code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown nutrient key: '{0}'")]
pub struct UnknownNutrient(pub String);

impl FromStr for Nutrient {
    type Err = UnknownNutrient;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownNutrient(s.to_string()))
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Nutrient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Nutrient {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Amount of every tracked nutrient, per 100 g for an ingredient or
/// absolute for aggregated totals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientVector {
    values: [f64; NUTRIENT_COUNT],
}

impl Default for NutrientVector {
    fn default() -> Self {
        Self::zero()
    }
}

impl NutrientVector {
    pub fn zero() -> Self {
        Self {
            values: [0.0; NUTRIENT_COUNT],
        }
    }

    /// Build from sparse `(nutrient, amount)` pairs; missing nutrients are 0
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Nutrient, f64)>,
    {
        let mut vector = Self::zero();
        for (nutrient, amount) in pairs {
            vector.set(nutrient, amount);
        }
        vector
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.values[nutrient.index()]
    }

    pub fn set(&mut self, nutrient: Nutrient, amount: f64) {
        self.values[nutrient.index()] = amount;
    }

    /// Scale every amount by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        let mut out = *self;
        for v in out.values.iter_mut() {
            *v *= multiplier;
        }
        out
    }

    /// `self += other * multiplier`, without an intermediate vector
    pub fn add_scaled(&mut self, other: &NutrientVector, multiplier: f64) {
        for (acc, v) in self.values.iter_mut().zip(other.values.iter()) {
            *acc += v * multiplier;
        }
    }

    /// `(nutrient, amount)` in declared order
    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        Nutrient::ALL.iter().map(move |&n| (n, self.get(n)))
    }
}

impl std::ops::Add for NutrientVector {
    type Output = NutrientVector;

    fn add(mut self, other: NutrientVector) -> NutrientVector {
        self.add_scaled(&other, 1.0);
        self
    }
}

impl std::ops::Mul<f64> for NutrientVector {
    type Output = NutrientVector;

    fn mul(self, multiplier: f64) -> NutrientVector {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for NutrientVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientVector::zero(), |acc, n| acc + n)
    }
}

impl Serialize for NutrientVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(NUTRIENT_COUNT))?;
        for (nutrient, amount) in self.iter() {
            map.serialize_entry(nutrient.code(), &amount)?;
        }
        map.end()
    }
}
