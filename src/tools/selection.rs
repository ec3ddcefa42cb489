//! Current selection MCP Tools
//!
//! The server keeps one working selection that can be set, read, cleared
//! and analyzed. It is always replaced wholesale.

use std::sync::Mutex;

use serde::Serialize;

use crate::models::{validate_selection, RawSelectionEntry, SelectionEntry};
use crate::nutrition::{AnalysisContext, Catalog};
use super::analysis::{analyze_entries, AnalysisResponse, AnalyzeOptions};

/// Grams given to each seeded ingredient
const SEED_GRAMS: f64 = 100.0;
const SEED_COUNT: usize = 3;

/// One selection row with the ingredient name resolved
#[derive(Debug, Serialize)]
pub struct SelectionItem {
    pub ingredient_id: i64,
    pub name: Option<String>,
    pub grams: f64,
}

/// Response for set_selection, get_selection and clear_selection
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub entries: Vec<SelectionItem>,
    pub total_grams: f64,
    /// Entries dropped as malformed by set_selection
    pub rejected: Vec<String>,
}

impl SelectionResponse {
    fn new(entries: &[SelectionEntry], catalog: &Catalog, rejected: Vec<String>) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|e| SelectionItem {
                    ingredient_id: e.ingredient_id,
                    name: catalog.get(e.ingredient_id).map(|i| i.name.clone()),
                    grams: e.grams,
                })
                .collect(),
            total_grams: entries.iter().map(|e| e.grams).sum(),
            rejected,
        }
    }
}

/// The first few catalog ingredients at 100 g each
pub fn default_selection(catalog: &Catalog) -> Vec<SelectionEntry> {
    catalog
        .iter()
        .take(SEED_COUNT)
        .map(|i| SelectionEntry::new(i.id, SEED_GRAMS))
        .collect()
}

/// Working selection shared by the selection tools
#[derive(Debug, Default)]
pub struct SelectionState {
    entries: Mutex<Vec<SelectionEntry>>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<SelectionEntry>>, String> {
        self.entries
            .lock()
            .map_err(|_| "Selection state is unavailable (lock poisoned)".to_string())
    }

    /// Copy of the entries, so no lock is held while analyzing
    pub fn snapshot(&self) -> Result<Vec<SelectionEntry>, String> {
        Ok(self.lock()?.clone())
    }

    pub fn set(&self, ctx: &AnalysisContext, raw: &[RawSelectionEntry]) -> Result<SelectionResponse, String> {
        let (entries, errors) = validate_selection(raw);
        for error in &errors {
            tracing::warn!("set_selection: {}", error);
        }
        let rejected = errors.iter().map(|e| e.to_string()).collect();

        *self.lock()? = entries.clone();
        Ok(SelectionResponse::new(&entries, &ctx.catalog, rejected))
    }

    /// Current entries; an empty selection is seeded first
    pub fn get(&self, ctx: &AnalysisContext) -> Result<SelectionResponse, String> {
        let entries = {
            let mut guard = self.lock()?;
            if guard.is_empty() {
                *guard = default_selection(&ctx.catalog);
            }
            guard.clone()
        };
        Ok(SelectionResponse::new(&entries, &ctx.catalog, Vec::new()))
    }

    pub fn clear(&self) -> Result<SelectionResponse, String> {
        self.lock()?.clear();
        Ok(SelectionResponse {
            entries: Vec::new(),
            total_grams: 0.0,
            rejected: Vec::new(),
        })
    }

    pub fn analyze(&self, ctx: &AnalysisContext, options: AnalyzeOptions) -> Result<AnalysisResponse, String> {
        let entries = self.snapshot()?;
        Ok(analyze_entries(ctx, &entries, options))
    }
}
