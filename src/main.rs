use shopfloor_costing::{
    config::{catalog, database},
    core::{catalog::seed_catalog, costing, validate},
    errors::Result,
};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenvy::dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and make sure the schema exists
    if database::get_database_url() == database::DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 4. Seed the catalog, if a seed file is present
    let path = catalog::catalog_path();
    if Path::new(&path).exists() {
        let config = catalog::load_catalog(&path)
            .inspect_err(|e| error!("Failed to load catalog from {}: {}", path, e))?;
        seed_catalog(&db, &config).await?;
    } else {
        warn!("No catalog file at {}, skipping seed", path);
    }

    // 5. Heal every derived total
    let summary = costing::recompute_all(&db).await?;
    info!(
        products = summary.products,
        processes = summary.processes,
        "Totals are up to date"
    );

    // 6. Optionally print one process's cost breakdown
    if let Some(raw) = std::env::args().nth(1) {
        let process_id = validate::parse_id(&raw, "Process")?;
        let report = costing::process_cost_breakdown(&db, process_id).await?;
        info!(
            process_id,
            name = %report.process.name,
            materials = costing::round_cents(report.breakdown.materials),
            services = costing::round_cents(report.breakdown.services),
            labor = costing::round_cents(report.breakdown.labor),
            total = costing::round_cents(report.breakdown.total()),
            "Process cost breakdown"
        );
        for line in &report.services {
            info!(
                service = %line.name,
                cost = costing::round_cents(line.cost_service),
                "  service"
            );
        }
        for line in &report.workers {
            info!(
                worker = %line.name,
                cost = costing::round_cents(line.cost_labor),
                "  labor"
            );
        }
    }

    Ok(())
}
