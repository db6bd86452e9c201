use ams_backend::{initialize_backend, AppConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging; `log` records from the library are bridged in
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load_from_env()?;
    let backend = initialize_backend(&config)?;

    for (name, report) in backend.load_reports() {
        info!("{}: {} records loaded", name, report.loaded);
        for line in &report.malformed {
            warn!("{}: line {} skipped ({})", name, line.line_number, line.reason);
        }
    }

    info!(
        "{} users, {} accommodations ({} available), {} restaurants",
        backend.users.users().len(),
        backend.accommodations.all().len(),
        backend.accommodations.available().len(),
        backend.restaurants.all().len()
    );
    Ok(())
}
