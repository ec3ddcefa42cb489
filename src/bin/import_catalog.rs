//! Utility to import the ingredient catalog and nutrient standards
//!
//! Usage: import_catalog <ingredients.csv> [standards.csv] [--force]

use std::path::PathBuf;

use nutrigap::config::Config;
use nutrigap::tools::import::{import_ingredients, import_standards, ImportResponse};

fn report(what: &str, result: &ImportResponse) {
    println!("{} ({}):", what, result.file_path);
    if let Some(message) = &result.message {
        println!("  {}", message);
        return;
    }
    println!("  Rows:       {}", result.total_rows);
    println!("  Imported:   {}", result.imported);
    println!("  Duplicates: {}", result.duplicates);
    println!("  Skipped:    {}", result.skipped);
    for error in &result.errors {
        println!("  ! {}", error);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut force = false;
    let mut files: Vec<PathBuf> = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--force" | "-f" => force = true,
            _ => files.push(PathBuf::from(arg)),
        }
    }

    let Some(ingredients_csv) = files.first() else {
        eprintln!("Usage: import_catalog <ingredients.csv> [standards.csv] [--force]");
        std::process::exit(2);
    };

    let config = Config::from_env();
    config.ensure_data_dir()?;
    println!("Database path: {}", config.database_path.display());

    let database = nutrigap::db::Database::new(&config.database_path)?;

    // Run migrations
    database.with_conn(|conn| {
        nutrigap::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let result = import_ingredients(&database, ingredients_csv, force)?;
    report("Ingredients", &result);

    if let Some(standards_csv) = files.get(1) {
        let result = import_standards(&database, standards_csv, force)?;
        report("Standards", &result);
    }

    Ok(())
}
