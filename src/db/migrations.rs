//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;
    if current_version < SCHEMA_VERSION {
        tracing::info!("Migrating schema from v{} to v{}", current_version, SCHEMA_VERSION);
    }

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: ingredient catalog and nutrient standards
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- INGREDIENTS
        -- Food composition catalog, amounts per 100 g.
        -- id is the food code from the source table.
        -- ============================================
        CREATE TABLE ingredients (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT,

            enerc_kcal REAL NOT NULL DEFAULT 0,  -- kcal
            water REAL NOT NULL DEFAULT 0,       -- g

            -- Amino acids (mg)
            ile REAL NOT NULL DEFAULT 0,
            leu REAL NOT NULL DEFAULT 0,
            lys REAL NOT NULL DEFAULT 0,
            met REAL NOT NULL DEFAULT 0,
            cys REAL NOT NULL DEFAULT 0,
            phe REAL NOT NULL DEFAULT 0,
            tyr REAL NOT NULL DEFAULT 0,
            thr REAL NOT NULL DEFAULT 0,
            trp REAL NOT NULL DEFAULT 0,
            val REAL NOT NULL DEFAULT 0,
            his REAL NOT NULL DEFAULT 0,
            arg REAL NOT NULL DEFAULT 0,

            -- Fatty acids (g)
            f18d2n6 REAL NOT NULL DEFAULT 0,
            f18d3n3 REAL NOT NULL DEFAULT 0,
            f22d6n3 REAL NOT NULL DEFAULT 0,

            -- Minerals (mg unless noted)
            nat REAL NOT NULL DEFAULT 0,
            k REAL NOT NULL DEFAULT 0,
            ca REAL NOT NULL DEFAULT 0,
            mg REAL NOT NULL DEFAULT 0,
            p REAL NOT NULL DEFAULT 0,
            fe REAL NOT NULL DEFAULT 0,
            zn REAL NOT NULL DEFAULT 0,
            cu REAL NOT NULL DEFAULT 0,
            mn REAL NOT NULL DEFAULT 0,
            yo REAL NOT NULL DEFAULT 0,          -- ug
            se REAL NOT NULL DEFAULT 0,          -- ug
            cr REAL NOT NULL DEFAULT 0,          -- ug

            -- Vitamin A family (ug)
            retol REAL NOT NULL DEFAULT 0,
            carta REAL NOT NULL DEFAULT 0,
            cartb REAL NOT NULL DEFAULT 0,
            crypxb REAL NOT NULL DEFAULT 0,
            cartbeq REAL NOT NULL DEFAULT 0,
            vita_rae REAL NOT NULL DEFAULT 0,

            vitd REAL NOT NULL DEFAULT 0,        -- ug

            -- Tocopherols (mg)
            tocpha REAL NOT NULL DEFAULT 0,
            tocphb REAL NOT NULL DEFAULT 0,
            tocphg REAL NOT NULL DEFAULT 0,
            tocphd REAL NOT NULL DEFAULT 0,

            -- B vitamins (mg unless noted)
            thia REAL NOT NULL DEFAULT 0,
            ribf REAL NOT NULL DEFAULT 0,
            nia REAL NOT NULL DEFAULT 0,
            vitb6a REAL NOT NULL DEFAULT 0,
            vitb12 REAL NOT NULL DEFAULT 0,      -- ug
            fol REAL NOT NULL DEFAULT 0,         -- ug
            pantac REAL NOT NULL DEFAULT 0,

            nacl_eq REAL NOT NULL DEFAULT 0,     -- g

            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_ingredients_name ON ingredients(name);

        -- ============================================
        -- STANDARDS
        -- Minimum required total per nutrient.
        -- position keeps the file order for display.
        -- ============================================
        CREATE TABLE standards (
            nutrient TEXT PRIMARY KEY,           -- nutrient code, e.g. 'LYS'
            minimum REAL NOT NULL CHECK(minimum >= 0),
            position INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}
