//! Ingredient model
//!
//! An ingredient from the food composition catalog, with its nutrient
//! amounts per 100 g. Rows are written once at import and only read after.

use rusqlite::{params, Connection, Row, ToSql};
use serde::Serialize;

use crate::db::{DbError, DbResult};
use super::{Nutrient, NutrientVector};

/// A catalog ingredient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    /// Food code from the composition table
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    /// Amounts per 100 g
    pub nutrients: NutrientVector,
}

impl Ingredient {
    pub fn new(id: i64, name: impl Into<String>, nutrients: NutrientVector) -> Self {
        Self {
            id,
            name: name.into(),
            category: None,
            nutrients,
        }
    }

    /// Create an Ingredient from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let mut nutrients = NutrientVector::zero();
        for nutrient in Nutrient::ALL {
            nutrients.set(nutrient, row.get(nutrient.column())?);
        }
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            category: row.get("category")?,
            nutrients,
        })
    }

    /// Insert an ingredient. Fails with `DuplicateIngredient` if the id is taken.
    pub fn create(conn: &Connection, data: &Ingredient) -> DbResult<()> {
        if Self::exists(conn, data.id)? {
            return Err(DbError::DuplicateIngredient(data.id));
        }

        let columns: Vec<&str> = Nutrient::ALL.iter().map(|n| n.column()).collect();
        let placeholders: Vec<String> = (1..=columns.len() + 3).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO ingredients (id, name, category, {}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );

        let amounts: Vec<f64> = Nutrient::ALL.iter().map(|&n| data.nutrients.get(n)).collect();
        let mut params_vec: Vec<&dyn ToSql> = Vec::with_capacity(amounts.len() + 3);
        params_vec.push(&data.id);
        params_vec.push(&data.name);
        params_vec.push(&data.category);
        params_vec.extend(amounts.iter().map(|a| a as &dyn ToSql));

        conn.execute(&sql, params_vec.as_slice())?;
        Ok(())
    }

    pub fn exists(conn: &Connection, id: i64) -> DbResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM ingredients WHERE id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get an ingredient by id
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive substring search on the name
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let search_pattern = format!("%{}%", escape_like(query));
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM ingredients
            WHERE name LIKE ?1 ESCAPE '\'
            ORDER BY id ASC
            LIMIT ?2
            "#,
        )?;

        let items = stmt
            .query_map(params![search_pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Page through ingredients in id order
    pub fn list(conn: &Connection, limit: i64, offset: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients ORDER BY id ASC LIMIT ?1 OFFSET ?2")?;

        let items = stmt
            .query_map(params![limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Every ingredient in id order, for building the in-memory catalog
    pub fn load_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients ORDER BY id ASC")?;

        let items = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM ingredients", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Remove every ingredient (forced re-import)
    pub fn delete_all(conn: &Connection) -> DbResult<usize> {
        Ok(conn.execute("DELETE FROM ingredients", [])?)
    }
}

/// Match `%`, `_` and backslash literally in a LIKE pattern
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
