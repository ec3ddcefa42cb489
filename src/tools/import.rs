//! Catalog and standards import
//!
//! Reads the food composition table and the standards table from CSV into
//! SQLite, and builds the in-memory analysis context at startup.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::db::{Database, DbError};
use crate::models::{Ingredient, Nutrient, NutrientVector, Standard, StandardsTable};
use crate::nutrition::{AnalysisContext, Catalog};

/// Only the first few row errors are reported back
const MAX_REPORTED_ERRORS: usize = 10;

/// Response for an import run
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub file_path: String,
    pub total_rows: usize,
    pub imported: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub message: Option<String>,
}

impl ImportResponse {
    fn already_populated(file_path: &Path, existing: i64, what: &str) -> Self {
        Self {
            success: true,
            file_path: file_path.display().to_string(),
            total_rows: 0,
            imported: 0,
            duplicates: 0,
            skipped: 0,
            errors: Vec::new(),
            message: Some(format!(
                "{} table already holds {} rows; import skipped (use force to replace)",
                what, existing
            )),
        }
    }
}

/// Ingredients parsed from CSV, before they reach the database
#[derive(Debug, Default)]
pub struct ParsedIngredients {
    pub ingredients: Vec<Ingredient>,
    pub total_rows: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ParsedStandards {
    pub standards: Vec<Standard>,
    pub total_rows: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

enum Column {
    Id,
    Name,
    Category,
    Nutrient(Nutrient),
    Ignored,
}

/// Split one CSV line, honouring double quotes and `""` escapes.
///
/// Input is read line by line, so a quoted field may not span lines; an
/// embedded newline ends the row early and the remainder reads as a new row.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Composition-table cell to an amount per 100 g.
///
/// Trace marks (`Tr`), `-`, `N/A`, `Undefined`, blanks and anything else
/// non-numeric read as 0. Estimates in parentheses are unwrapped.
fn parse_amount(cell: &str) -> f64 {
    let mut value = cell.trim();
    if let Some(inner) = value.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        value = inner.trim();
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

fn classify_header(header: &[String]) -> Result<Vec<Column>, String> {
    let mut columns = Vec::with_capacity(header.len());
    let mut has_id = false;
    let mut has_name = false;

    for raw in header {
        let name = raw.trim().trim_start_matches('\u{feff}');
        let column = match name.to_ascii_lowercase().as_str() {
            "id" | "food_code" => {
                has_id = true;
                Column::Id
            }
            "name" => {
                has_name = true;
                Column::Name
            }
            "category" => Column::Category,
            _ => match Nutrient::from_code(name) {
                Some(nutrient) => Column::Nutrient(nutrient),
                None => {
                    tracing::warn!("Ignoring unknown ingredient column '{}'", name);
                    Column::Ignored
                }
            },
        };
        columns.push(column);
    }

    if !has_id {
        return Err("Ingredients CSV header has no 'id' or 'food_code' column".to_string());
    }
    if !has_name {
        return Err("Ingredients CSV header has no 'name' column".to_string());
    }
    Ok(columns)
}

/// Parse an ingredients CSV. The first non-empty line is the header.
///
/// Row problems are collected and the row skipped; a missing header or an
/// unreadable line fails the whole parse.
pub fn parse_ingredients_csv<R: BufRead>(reader: R) -> Result<ParsedIngredients, String> {
    let mut parsed = ParsedIngredients::default();
    let mut columns: Option<Vec<Column>> = None;

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| format!("Error reading line {}: {}", line_num + 1, e))?;
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_csv_line(&line);
        let Some(columns) = columns.as_ref() else {
            columns = Some(classify_header(&fields)?);
            continue;
        };

        parsed.total_rows += 1;

        let mut id: Option<i64> = None;
        let mut name = String::new();
        let mut category = None;
        let mut nutrients = NutrientVector::zero();

        for (column, value) in columns.iter().zip(fields.iter()) {
            let value = value.trim();
            match column {
                Column::Id => id = value.parse().ok(),
                Column::Name => name = value.to_string(),
                Column::Category if !value.is_empty() => category = Some(value.to_string()),
                Column::Nutrient(nutrient) => nutrients.set(*nutrient, parse_amount(value)),
                Column::Category | Column::Ignored => {}
            }
        }

        let Some(id) = id else {
            parsed.errors.push(format!("Row {}: Invalid or missing ingredient id", line_num + 1));
            parsed.skipped += 1;
            continue;
        };
        if name.is_empty() {
            parsed.errors.push(format!("Row {}: Missing ingredient name", line_num + 1));
            parsed.skipped += 1;
            continue;
        }

        parsed.ingredients.push(Ingredient {
            id,
            name,
            category,
            nutrients,
        });
    }

    if columns.is_none() {
        return Err("Ingredients CSV is empty".to_string());
    }
    Ok(parsed)
}

/// Parse a `nutrient,minimum` CSV. A leading header row is optional.
/// Unknown nutrients and negative or non-numeric minimums are rejected per
/// row; a repeated nutrient keeps its first row.
pub fn parse_standards_csv<R: BufRead>(reader: R) -> Result<ParsedStandards, String> {
    let mut parsed = ParsedStandards::default();
    let mut first = true;

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| format!("Error reading line {}: {}", line_num + 1, e))?;
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_csv_line(&line);
        let code = fields[0].trim().trim_start_matches('\u{feff}');

        if first {
            first = false;
            if code.eq_ignore_ascii_case("nutrient") {
                continue;
            }
        }

        parsed.total_rows += 1;

        let Some(nutrient) = Nutrient::from_code(code) else {
            parsed.errors.push(format!("Row {}: Unknown nutrient '{}'", line_num + 1, code));
            parsed.skipped += 1;
            continue;
        };

        let minimum = match fields.get(1).map(|v| v.trim().parse::<f64>()) {
            Some(Ok(v)) if v.is_finite() && v >= 0.0 => v,
            _ => {
                parsed.errors.push(format!("Row {}: Invalid minimum for {}", line_num + 1, code));
                parsed.skipped += 1;
                continue;
            }
        };

        if parsed.standards.iter().any(|s| s.nutrient == nutrient) {
            parsed.duplicates += 1;
            continue;
        }

        parsed.standards.push(Standard { nutrient, minimum });
    }

    Ok(parsed)
}

fn open(file_path: &Path) -> Result<BufReader<File>, String> {
    let file = File::open(file_path)
        .map_err(|e| format!("Failed to open file '{}': {}", file_path.display(), e))?;
    Ok(BufReader::new(file))
}

fn no_valid_rows(file_path: &Path, what: &str, skipped: usize, errors: &[String]) -> String {
    let mut message = format!(
        "No valid {} rows in '{}' ({} skipped); nothing imported",
        what,
        file_path.display(),
        skipped
    );
    if let Some(first) = errors.first() {
        message.push_str(&format!(": {}", first));
    }
    message
}

fn first_errors(mut errors: Vec<String>) -> Vec<String> {
    errors.truncate(MAX_REPORTED_ERRORS);
    errors
}

/// Import ingredients from CSV. Leaves a populated table alone unless
/// `force`, in which case it is replaced.
pub fn import_ingredients(db: &Database, file_path: &Path, force: bool) -> Result<ImportResponse, String> {
    let parsed = parse_ingredients_csv(open(file_path)?)?;
    // never swap a stored catalog for an empty one
    if parsed.ingredients.is_empty() {
        return Err(no_valid_rows(file_path, "ingredient", parsed.skipped, &parsed.errors));
    }

    let existing = db
        .with_conn(Ingredient::count)
        .map_err(|e| format!("Database error: {}", e))?;
    if existing > 0 && !force {
        return Ok(ImportResponse::already_populated(file_path, existing, "Ingredients"));
    }

    let (imported, duplicates) = db
        .transaction(|tx| {
            if existing > 0 {
                let removed = Ingredient::delete_all(tx)?;
                tracing::info!("Removed {} existing ingredients before re-import", removed);
            }

            let mut imported = 0;
            let mut duplicates = 0;
            for ingredient in &parsed.ingredients {
                match Ingredient::create(tx, ingredient) {
                    Ok(()) => imported += 1,
                    Err(DbError::DuplicateIngredient(id)) => {
                        tracing::debug!("Skipping duplicate ingredient id {}", id);
                        duplicates += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok((imported, duplicates))
        })
        .map_err(|e| format!("Failed to import ingredients: {}", e))?;

    tracing::info!(
        "Imported {} ingredients from {} ({} duplicates, {} skipped)",
        imported,
        file_path.display(),
        duplicates,
        parsed.skipped
    );

    Ok(ImportResponse {
        success: parsed.errors.is_empty(),
        file_path: file_path.display().to_string(),
        total_rows: parsed.total_rows,
        imported,
        duplicates,
        skipped: parsed.skipped,
        errors: first_errors(parsed.errors),
        message: None,
    })
}

/// Import standards from CSV, replacing the stored table when `force`
pub fn import_standards(db: &Database, file_path: &Path, force: bool) -> Result<ImportResponse, String> {
    let parsed = parse_standards_csv(open(file_path)?)?;
    if parsed.standards.is_empty() {
        return Err(no_valid_rows(file_path, "standard", parsed.skipped, &parsed.errors));
    }

    let existing = db
        .with_conn(StandardsTable::count)
        .map_err(|e| format!("Database error: {}", e))?;
    if existing > 0 && !force {
        return Ok(ImportResponse::already_populated(file_path, existing, "Standards"));
    }

    let imported = db
        .transaction(|tx| StandardsTable::save(tx, &parsed.standards))
        .map_err(|e| format!("Database error: {}", e))?;

    tracing::info!("Imported {} nutrient standards from {}", imported, file_path.display());

    Ok(ImportResponse {
        success: parsed.errors.is_empty(),
        file_path: file_path.display().to_string(),
        total_rows: parsed.total_rows,
        imported,
        duplicates: parsed.duplicates,
        skipped: parsed.skipped,
        errors: first_errors(parsed.errors),
        message: None,
    })
}

/// Build the analysis context from what is stored. An empty catalog is an
/// error; empty standards load degraded.
pub fn load_context(db: &Database) -> Result<AnalysisContext, String> {
    let (ingredients, standards) = db
        .with_conn(|conn| Ok((Ingredient::load_all(conn)?, StandardsTable::load(conn)?)))
        .map_err(|e| format!("Database error: {}", e))?;

    let catalog = Catalog::new(ingredients).map_err(|e| e.to_string())?;
    tracing::info!(
        "Loaded {} ingredients and {} nutrient standards",
        catalog.len(),
        standards.len()
    );

    Ok(AnalysisContext::new(catalog, standards))
}

/// Startup: seed empty tables from the configured CSV files, then load
pub fn bootstrap(db: &Database, config: &Config) -> Result<AnalysisContext, String> {
    let (ingredient_count, standard_count) = db
        .with_conn(|conn| Ok((Ingredient::count(conn)?, StandardsTable::count(conn)?)))
        .map_err(|e| format!("Database error: {}", e))?;

    if ingredient_count == 0 {
        if config.ingredients_csv.exists() {
            let result = import_ingredients(db, &config.ingredients_csv, false)?;
            for error in &result.errors {
                tracing::warn!("Ingredient import: {}", error);
            }
        } else {
            tracing::warn!(
                "Ingredient table is empty and {} does not exist",
                config.ingredients_csv.display()
            );
        }
    }

    if standard_count == 0 {
        if config.standards_csv.exists() {
            // unusable standards leave the server running degraded
            match import_standards(db, &config.standards_csv, false) {
                Ok(result) => {
                    for error in &result.errors {
                        tracing::warn!("Standards import: {}", error);
                    }
                }
                Err(e) => tracing::warn!("Standards import failed: {}", e),
            }
        } else {
            tracing::warn!(
                "Standards table is empty and {} does not exist",
                config.standards_csv.display()
            );
        }
    }

    load_context(db)
}
