use anyhow::Context;

use portal_gate::config::GateConfig;
use portal_gate::server::run;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = GateConfig::from_env().context("Failed to load gate configuration")?;

    eprintln!("🚪 Portal Gate v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Portal: {}", config.portal);
    eprintln!("   Status endpoint: {}", config.status_url);
    eprintln!("   Status timeout: {:?}", config.status_timeout);
    eprintln!("   Pages: {}", config.static_dir.display());
    eprintln!("   Listening: http://0.0.0.0:{}\n", config.port);

    run(&config).await.context("Portal gate failed")?;
    Ok(())
}
