//! NutriGap
//!
//! An MCP server that checks ingredient selections against nutrient standards.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use nutrigap::build_info;
use nutrigap::config::Config;
use nutrigap::db;
use nutrigap::mcp::NutriGapService;
use nutrigap::tools::import;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nutrigap=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env();
    eprintln!("Database path: {}", config.database_path.display());

    // Ensure data directory exists
    config.ensure_data_dir()?;

    // Initialize database
    eprintln!("Initializing database...");
    let database = db::Database::new(&config.database_path)?;

    // Run migrations
    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    // Seed empty tables and load the catalog; an empty catalog is fatal
    let context = import::bootstrap(&database, &config).map_err(|e| {
        tracing::error!("Startup failed: {}", e);
        e
    })?;

    // Create the NutriGap service
    let service = NutriGapService::new(config.database_path.clone(), database, context);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
