//! Catalog MCP Tools
//!
//! Browsing ingredients, standards and the nutrient keys.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Ingredient, Nutrient, NutrientVector, StandardsTable};

/// Summary of an ingredient for list/search results
#[derive(Debug, Serialize)]
pub struct IngredientSummary {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
}

impl From<&Ingredient> for IngredientSummary {
    fn from(item: &Ingredient) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            category: item.category.clone(),
        }
    }
}

/// Response for search_ingredients
#[derive(Debug, Serialize)]
pub struct SearchIngredientsResponse {
    pub items: Vec<IngredientSummary>,
    pub total: usize,
}

/// Response for list_ingredients
#[derive(Debug, Serialize)]
pub struct ListIngredientsResponse {
    pub items: Vec<IngredientSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Full ingredient detail, amounts per 100 g
#[derive(Debug, Serialize)]
pub struct IngredientDetail {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub nutrients_per_100g: NutrientVector,
}

impl From<Ingredient> for IngredientDetail {
    fn from(item: Ingredient) -> Self {
        Self {
            id: item.id,
            name: item.name,
            category: item.category,
            nutrients_per_100g: item.nutrients,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StandardEntry {
    pub nutrient: Nutrient,
    pub label: &'static str,
    pub unit: &'static str,
    pub minimum: f64,
}

/// Response for list_standards
#[derive(Debug, Serialize)]
pub struct ListStandardsResponse {
    pub standards: Vec<StandardEntry>,
    pub degraded: bool,
}

#[derive(Debug, Serialize)]
pub struct NutrientInfo {
    pub code: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
}

/// Response for list_nutrients
#[derive(Debug, Serialize)]
pub struct ListNutrientsResponse {
    pub nutrients: Vec<NutrientInfo>,
    pub total: usize,
}

pub fn search_ingredients(db: &Database, query: &str, limit: i64) -> Result<SearchIngredientsResponse, String> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(SearchIngredientsResponse { items: Vec::new(), total: 0 });
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let items = Ingredient::search(&conn, query, limit).map_err(|e| format!("Database error: {}", e))?;
    let summaries: Vec<IngredientSummary> = items.iter().map(IngredientSummary::from).collect();
    let total = summaries.len();
    Ok(SearchIngredientsResponse { items: summaries, total })
}

pub fn list_ingredients(db: &Database, limit: i64, offset: i64) -> Result<ListIngredientsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let items = Ingredient::list(&conn, limit, offset).map_err(|e| format!("Database error: {}", e))?;
    let total = Ingredient::count(&conn).map_err(|e| format!("Database error: {}", e))?;

    Ok(ListIngredientsResponse {
        items: items.iter().map(IngredientSummary::from).collect(),
        total,
        limit,
        offset,
    })
}

pub fn get_ingredient(db: &Database, id: i64) -> Result<Option<IngredientDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let item = Ingredient::get_by_id(&conn, id).map_err(|e| format!("Database error: {}", e))?;
    Ok(item.map(IngredientDetail::from))
}

/// Standards as loaded into the analysis context
pub fn list_standards(standards: &StandardsTable) -> ListStandardsResponse {
    ListStandardsResponse {
        standards: standards
            .iter()
            .map(|s| StandardEntry {
                nutrient: s.nutrient,
                label: s.nutrient.label(),
                unit: s.nutrient.unit(),
                minimum: s.minimum,
            })
            .collect(),
        degraded: standards.is_degraded(),
    }
}

pub fn list_nutrients() -> ListNutrientsResponse {
    let nutrients: Vec<NutrientInfo> = Nutrient::ALL
        .iter()
        .map(|n| NutrientInfo {
            code: n.code(),
            label: n.label(),
            unit: n.unit(),
        })
        .collect();
    let total = nutrients.len();
    ListNutrientsResponse { nutrients, total }
}
