//! NutriGap MCP Server Implementation
//!
//! Implements the MCP server with all NutriGap tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::RawSelectionEntry;
use crate::nutrition::{
    AnalysisContext, EngineError, PerNutrientOptions, DEFAULT_SUGGESTION_LIMIT, DEFAULT_TOP_N,
};
use crate::tools::analysis::{self, AnalyzeOptions};
use crate::tools::ingredients;
use crate::tools::selection::SelectionState;
use crate::tools::status::StatusTracker;

/// NutriGap MCP Service
#[derive(Clone)]
pub struct NutriGapService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    /// Catalog and standards, loaded once at startup
    context: AnalysisContext,
    /// Working selection for the *_selection tools
    selection: Arc<SelectionState>,
    tool_router: ToolRouter<NutriGapService>,
}

impl NutriGapService {
    pub fn new(database_path: PathBuf, database: Database, context: AnalysisContext) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            context,
            selection: Arc::new(SelectionState::new()),
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn engine_error(e: EngineError) -> McpError {
    match e {
        EngineError::InvalidNutrientKey(_) | EngineError::MalformedSelectionEntry { .. } => {
            McpError::invalid_params(e.to_string(), None)
        }
        _ => McpError::internal_error(e.to_string(), None),
    }
}

// ============================================================================
// Analysis Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateNutrientsParams {
    /// Selection entries: [{"ingredient_id": 1001, "grams": 150}, ...]
    pub selection: Vec<RawSelectionEntry>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeSelectionParams {
    /// Selection entries: [{"ingredient_id": 1001, "grams": 150}, ...]
    pub selection: Vec<RawSelectionEntry>,
    /// Ingredients listed per deficient nutrient (default 15)
    pub suggestion_limit: Option<usize>,
    /// Multi-nutrient suggestions returned (default 5)
    pub best_limit: Option<usize>,
    /// Only list ingredients that contain the nutrient
    #[serde(default)]
    pub positive_only: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeCurrentSelectionParams {
    /// Ingredients listed per deficient nutrient (default 15)
    pub suggestion_limit: Option<usize>,
    /// Multi-nutrient suggestions returned (default 5)
    pub best_limit: Option<usize>,
    /// Only list ingredients that contain the nutrient
    #[serde(default)]
    pub positive_only: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SuggestForNutrientsParams {
    /// Nutrient codes, e.g. ["CA", "FE"]
    pub nutrients: Vec<String>,
    /// Ingredients per nutrient (default 15)
    #[serde(default = "default_suggestion_limit")]
    pub limit: usize,
    /// Only list ingredients that contain the nutrient
    #[serde(default)]
    pub positive_only: bool,
}

fn default_suggestion_limit() -> usize { DEFAULT_SUGGESTION_LIMIT }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SuggestBestIngredientsParams {
    /// Deficient nutrient codes, e.g. ["CA", "VITD"]
    pub nutrients: Vec<String>,
    /// Suggestions returned (default 5)
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize { DEFAULT_TOP_N }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetSelectionParams {
    /// Selection entries: [{"ingredient_id": 1001, "grams": 150}, ...]
    pub selection: Vec<RawSelectionEntry>,
}

// ============================================================================
// Catalog Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchIngredientsParams {
    /// Part of the ingredient name
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListIngredientsParams {
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetIngredientParams {
    /// Ingredient id (food code)
    pub id: i64,
}

impl AnalyzeSelectionParams {
    fn options(&self) -> AnalyzeOptions {
        analyze_options(self.suggestion_limit, self.best_limit, self.positive_only)
    }
}

impl AnalyzeCurrentSelectionParams {
    fn options(&self) -> AnalyzeOptions {
        analyze_options(self.suggestion_limit, self.best_limit, self.positive_only)
    }
}

fn analyze_options(suggestion_limit: Option<usize>, best_limit: Option<usize>, positive_only: bool) -> AnalyzeOptions {
    let defaults = AnalyzeOptions::default();
    AnalyzeOptions {
        suggestion_limit: suggestion_limit.unwrap_or(defaults.suggestion_limit),
        best_limit: best_limit.unwrap_or(defaults.best_limit),
        positive_only,
    }
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl NutriGapService {
    // --- Status ---

    #[tool(description = "Get the current status of the NutriGap service including build info, loaded catalog and standards, database status, and process information")]
    async fn nutrigap_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.context);
        json_result(&status)
    }

    #[tool(description = "Get instructions for analyzing ingredient selections against nutrient standards. Call this before the first analysis or when unsure how to read the results.")]
    fn analysis_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ANALYSIS_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(ANALYSIS_INSTRUCTIONS)]))
    }

    // --- Analysis ---

    #[tool(description = "Sum nutrient totals for a selection of ingredients and grams. Unknown ids and malformed entries are skipped and listed.")]
    fn calculate_nutrients(&self, Parameters(p): Parameters<CalculateNutrientsParams>) -> Result<CallToolResult, McpError> {
        let result = analysis::calculate_nutrients(&self.context, &p.selection);
        json_result(&result)
    }

    #[tool(description = "Check a selection against the nutrient standards: totals with pass/fail per nutrient, deficiencies, per-nutrient suggestions and the best multi-nutrient suggestions")]
    fn analyze_selection(&self, Parameters(p): Parameters<AnalyzeSelectionParams>) -> Result<CallToolResult, McpError> {
        let result = analysis::analyze_selection(&self.context, &p.selection, p.options());
        json_result(&result)
    }

    #[tool(description = "List the catalog ingredients richest in each of the given nutrients, highest first")]
    fn suggest_for_nutrients(&self, Parameters(p): Parameters<SuggestForNutrientsParams>) -> Result<CallToolResult, McpError> {
        let options = PerNutrientOptions { limit: p.limit, positive_only: p.positive_only };
        let result = analysis::suggest_for_nutrients(&self.context, &p.nutrients, options).map_err(engine_error)?;
        json_result(&result)
    }

    #[tool(description = "Rank catalog ingredients by how many of the given deficient nutrients 100 g would cover, each nutrient capped at 100% of its minimum")]
    fn suggest_best_ingredients(&self, Parameters(p): Parameters<SuggestBestIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = analysis::suggest_best_ingredients(&self.context, &p.nutrients, p.top_n).map_err(engine_error)?;
        json_result(&result)
    }

    // --- Current Selection ---

    #[tool(description = "Replace the working selection. Malformed entries are rejected and listed.")]
    fn set_selection(&self, Parameters(p): Parameters<SetSelectionParams>) -> Result<CallToolResult, McpError> {
        let result = self.selection.set(&self.context, &p.selection).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the working selection. An empty selection is seeded with the first three catalog ingredients at 100 g.")]
    fn get_selection(&self) -> Result<CallToolResult, McpError> {
        let result = self.selection.get(&self.context).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Empty the working selection")]
    fn clear_selection(&self) -> Result<CallToolResult, McpError> {
        let result = self.selection.clear().map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Analyze the working selection the same way as analyze_selection")]
    fn analyze_current_selection(&self, Parameters(p): Parameters<AnalyzeCurrentSelectionParams>) -> Result<CallToolResult, McpError> {
        let result = self.selection.analyze(&self.context, p.options()).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Catalog ---

    #[tool(description = "Search ingredients by name (case-insensitive substring)")]
    fn search_ingredients(&self, Parameters(p): Parameters<SearchIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::search_ingredients(&self.database, &p.query, p.limit).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List ingredients in id order with pagination")]
    fn list_ingredients(&self, Parameters(p): Parameters<ListIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::list_ingredients(&self.database, p.limit, p.offset).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get one ingredient with every nutrient amount per 100 g")]
    fn get_ingredient(&self, Parameters(p): Parameters<GetIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::get_ingredient(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(item) => serde_json::to_string_pretty(&item),
            None => Ok(format!(r#"{{"error": "Ingredient not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List the nutrient minimums the selection is checked against, in display order")]
    fn list_standards(&self) -> Result<CallToolResult, McpError> {
        json_result(&ingredients::list_standards(&self.context.standards))
    }

    #[tool(description = "List every nutrient code with its label and unit")]
    fn list_nutrients(&self) -> Result<CallToolResult, McpError> {
        json_result(&ingredients::list_nutrients())
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for NutriGapService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutrigap".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("NutriGap".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "NutriGap - checks ingredient selections against minimum nutrient standards. \
                 IMPORTANT: Call analysis_instructions before the first analysis. \
                 Analysis: calculate_nutrients, analyze_selection, suggest_for_nutrients, suggest_best_ingredients. \
                 Working selection: set_selection/get_selection/clear_selection, analyze_current_selection. \
                 Catalog: search_ingredients, list_ingredients, get_ingredient, list_standards, list_nutrients. \
                 Amounts are per 100 g; selections give grams per ingredient id."
                    .into(),
            ),
        }
    }
}
