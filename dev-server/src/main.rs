//! Development server for portal UI development
//!
//! This binary runs the in-memory fake backend with a seeded dataset so the
//! UI can be developed without the real services.
//!
//! Usage: cargo run -p dev-server

use anyhow::Result;
use test_helpers::backend::Config;
use test_helpers::mock::DevDataset;
use test_helpers::telemetry;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = telemetry::get_subscriber("info".into());
    telemetry::init_subscriber(subscriber);

    info!("🚀 Starting portal development server");

    let mut config = Config::from_env();
    if config.port == 0 {
        config.port = 8000;
    }
    let app = test_helpers::start_backend(config)?;
    info!("✅ Fake backend running on http://127.0.0.1:{}", app.port);

    info!("📊 Setting up development data...");
    let dataset = DevDataset::create(&app);

    info!("🎯 Development server ready!");
    info!("   API: http://127.0.0.1:{}", app.port);
    info!(
        "   UI:  cd ui && BACKEND_URL=http://127.0.0.1:{} trunk serve",
        app.port
    );
    info!("");
    dataset.print_summary();
    info!("");
    info!("👋 Press Ctrl+C to shutdown");

    if let Err(e) = tokio::signal::ctrl_c().await {
        telemetry::log_error(e);
    }
    info!("🛑 Shutting down development server");
    Ok(())
}
