use std::io::Write;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feed_digest::config::Config;
use feed_digest::digest;
use feed_digest::prior_report::PriorReport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feed_digest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path =
        std::env::var("FEED_DIGEST_CONFIG").unwrap_or_else(|_| "feeds.toml".to_string());
    let config = Config::load(&config_path)?;
    info!("Loaded {} feeds from {}", config.feeds.len(), config_path);

    // Must succeed before any request goes out
    let prior = PriorReport::load(&config.prior_report)?;

    let today = Utc::now().date_naive();
    let report = digest::run(&config, prior, today).await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(report.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
