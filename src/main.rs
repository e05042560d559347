use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use autos_tracker::adapters::html::HtmlBrowser;
use autos_tracker::adapters::store::JsonStore;
use autos_tracker::config::load_config;
use autos_tracker::config::types::{BrowserBackend, Config};
use autos_tracker::pipeline::run_once;
use autos_tracker::ports::browser::ListingBrowser;
use autos_tracker::traversal::Crawler;
use autos_tracker::traversal::pacing::pacer_from_config;

fn find_config_path() -> PathBuf {
    let candidates = [PathBuf::from("config.yaml"), exe_dir().join("config.yaml")];

    for path in &candidates {
        if path.exists() {
            return path.clone();
        }
    }

    candidates[0].clone()
}

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn build_browser(config: &Config) -> Result<Arc<dyn ListingBrowser>> {
    let min_price = config.traversal.min_price;
    match config.browser.backend {
        BrowserBackend::Http => {
            tracing::info!(base_url = %config.browser.base_url, "Using HTTP browser");
            Ok(Arc::new(
                HtmlBrowser::new(&config.browser, min_price).context("failed to build HTTP client")?,
            ))
        }
        #[cfg(feature = "chrome")]
        BrowserBackend::Chrome => {
            use autos_tracker::adapters::chrome::ChromeBrowser;
            Ok(Arc::new(
                ChromeBrowser::launch(&config.browser, min_price).context("failed to launch Chrome")?,
            ))
        }
        #[cfg(not(feature = "chrome"))]
        BrowserBackend::Chrome => {
            anyhow::bail!("browser.backend is `chrome` but this build lacks the `chrome` feature")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting autos-tracker");

    let config_path = find_config_path();
    let config = load_config(&config_path)?;

    let store = JsonStore::open(&config.store.path)
        .await
        .with_context(|| format!("failed to open listings file {}", config.store.path))?;
    let browser = build_browser(&config)?;
    let pacer = pacer_from_config(&config.pacing);
    let crawler = Crawler::new(browser, pacer, &config.traversal);

    let summary = run_once(&crawler, &store).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
