//! Nutrient standards
//!
//! Minimum required totals per nutrient (AAFCO-style). The table keeps the
//! order the standards were declared in, which is also the display order.

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db::DbResult;
use super::Nutrient;

/// One minimum requirement
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Standard {
    pub nutrient: Nutrient,
    pub minimum: f64,
}

/// Ordered minimum requirements, one per constrained nutrient
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StandardsTable {
    entries: Vec<Standard>,
    /// Set when no standards could be loaded. Every minimum then reads as 0.
    degraded: bool,
}

impl StandardsTable {
    /// Build from declared entries. Later duplicates of a nutrient are dropped.
    pub fn new(entries: impl IntoIterator<Item = Standard>) -> Self {
        let mut table = Self::default();
        for entry in entries {
            if table.minimum(entry.nutrient).is_none() {
                table.entries.push(entry);
            }
        }
        table
    }

    /// No standards available: nothing is ever deficient
    pub fn degraded() -> Self {
        Self {
            entries: Vec::new(),
            degraded: true,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Minimum for a nutrient, `None` when unconstrained
    pub fn minimum(&self, nutrient: Nutrient) -> Option<f64> {
        self.entries
            .iter()
            .find(|s| s.nutrient == nutrient)
            .map(|s| s.minimum)
    }

    /// Minimum for a nutrient, 0 when unconstrained
    pub fn minimum_or_zero(&self, nutrient: Nutrient) -> f64 {
        self.minimum(nutrient).unwrap_or(0.0)
    }

    /// Entries in declared order
    pub fn iter(&self) -> impl Iterator<Item = &Standard> {
        self.entries.iter()
    }

    /// Replace the stored standards with `entries`, keeping their order.
    /// Run inside a transaction so a failed write leaves the old rows.
    pub fn save(conn: &Connection, entries: &[Standard]) -> DbResult<usize> {
        conn.execute("DELETE FROM standards", [])?;
        let mut written = 0;
        for (position, entry) in entries.iter().enumerate() {
            written += conn.execute(
                "INSERT OR IGNORE INTO standards (nutrient, minimum, position) VALUES (?1, ?2, ?3)",
                params![entry.nutrient.code(), entry.minimum, position as i64],
            )?;
        }
        Ok(written)
    }

    /// Load the stored standards. An empty table loads as degraded.
    /// Rows naming an unknown nutrient are skipped with a warning.
    pub fn load(conn: &Connection) -> DbResult<Self> {
        let mut stmt = conn.prepare("SELECT nutrient, minimum FROM standards ORDER BY position ASC")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut entries = Vec::with_capacity(rows.len());
        for (code, minimum) in rows {
            match Nutrient::from_code(&code) {
                Some(nutrient) => entries.push(Standard { nutrient, minimum }),
                None => tracing::warn!("Ignoring stored standard for unknown nutrient '{}'", code),
            }
        }

        if entries.is_empty() {
            return Ok(Self::degraded());
        }
        Ok(Self::new(entries))
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM standards", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn standard(nutrient: Nutrient, minimum: f64) -> Standard {
        Standard { nutrient, minimum }
    }

    #[test]
    fn test_first_declaration_wins() {
        let table = StandardsTable::new([
            standard(Nutrient::Calcium, 500.0),
            standard(Nutrient::Zinc, 8.0),
            standard(Nutrient::Calcium, 900.0),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.minimum(Nutrient::Calcium), Some(500.0));
        assert_eq!(table.minimum(Nutrient::Iron), None);
        assert_eq!(table.minimum_or_zero(Nutrient::Iron), 0.0);
        assert!(!table.is_degraded());
    }

    #[test]
    fn test_degraded_has_no_entries() {
        let table = StandardsTable::degraded();
        assert!(table.is_degraded());
        assert!(table.is_empty());
        assert_eq!(table.minimum_or_zero(Nutrient::Lysine), 0.0);
    }

    #[test]
    fn test_save_and_load_keep_order() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let entries = [
            standard(Nutrient::Zinc, 8.0),
            standard(Nutrient::Calcium, 500.0),
            standard(Nutrient::Lysine, 630.0),
        ];
        assert_eq!(StandardsTable::save(&conn, &entries).unwrap(), 3);

        let loaded = StandardsTable::load(&conn).unwrap();
        let order: Vec<Nutrient> = loaded.iter().map(|s| s.nutrient).collect();
        assert_eq!(order, vec![Nutrient::Zinc, Nutrient::Calcium, Nutrient::Lysine]);

        StandardsTable::save(&conn, &entries[..1]).unwrap();
        assert_eq!(StandardsTable::count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_load_empty_table_is_degraded() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let loaded = StandardsTable::load(&conn).unwrap();
        assert!(loaded.is_degraded());
    }
}
