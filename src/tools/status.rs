//! NutriGap Status Tool
//!
//! Provides runtime status information about the NutriGap service.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::nutrition::AnalysisContext;

/// Analysis workflow instructions for AI assistants
pub const ANALYSIS_INSTRUCTIONS: &str = r#"
# NutriGap Analysis Instructions

NutriGap checks a selection of ingredients against minimum nutrient
standards and suggests ingredients that close the gaps.

## Concepts

- **Ingredient**: a food from the composition catalog, identified by its
  numeric food code. All nutrient amounts are stored **per 100 g**.
- **Selection**: a list of `{ "ingredient_id": <id>, "grams": <amount> }`
  entries. `food_code` is accepted in place of `ingredient_id`.
- **Standard**: the minimum total required for a nutrient. Nutrients
  without a standard are reported but never flagged.
- **Deficient**: the selection's total is strictly below the minimum.
  Reaching the minimum exactly passes.

Results mark each nutrient with ○ (pass) or × (deficient).

---

## Typical Workflow

1. Find ingredients: `search_ingredients` (by name) or `list_ingredients`.
2. Check one selection: `analyze_selection` with the entries and grams.
3. Read `deficiencies`, then pick from:
   - `per_nutrient_suggestions`: the richest ingredients for each deficient
     nutrient, one list per nutrient.
   - `best_suggestions`: ingredients that cover the most deficiencies at
     once. Each covered nutrient adds at most 1.0 to the score, so an
     ingredient with 500% of one nutrient scores lower than one with 80%
     of two.
4. Adjust grams or add ingredients and analyze again.

To work on a selection across several calls use `set_selection`,
`get_selection`, `analyze_current_selection` and `clear_selection`.
`get_selection` on an empty selection starts you off with the first three
catalog ingredients at 100 g each.

---

## Nutrient Keys

Nutrients are addressed by composition-table codes, case-insensitive, for
example `LYS` (lysine), `CA` (calcium), `FE` (iron), `VITD` (vitamin D),
`VITA_RAE` (vitamin A, retinol activity equivalents). Call
`list_nutrients` for the full list with labels and units. An unknown key
fails the whole suggestion call.

---

## Things To Watch

- Unknown ingredient ids and malformed entries (negative grams, text that
  is not a number) are skipped and listed under `skipped`; the rest of the
  selection is still analyzed.
- Repeating an ingredient in a selection adds the amounts together.
- If `standards_degraded` is `true`, no standards are loaded. Every
  nutrient then passes; tell the user the check is not meaningful.
"#;

/// Runtime status of the NutriGap service
#[derive(Debug, Clone, Serialize)]
pub struct NutriGapStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Loaded analysis data
    pub catalog_ingredients: usize,
    pub standards: usize,
    pub standards_degraded: bool,

    /// Process information
    pub started_at: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: DateTime<Utc>,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, ctx: &AnalysisContext) -> NutriGapStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutriGapStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            catalog_ingredients: ctx.catalog.len(),
            standards: ctx.standards.len(),
            standards_degraded: ctx.standards_degraded(),
            started_at: self.started_at.to_rfc3339(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
