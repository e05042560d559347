pub mod types;

use std::path::Path;

use crate::error::{Result, TrackerError};
use types::{Config, DelayRange};

/// Load `path` (defaults when absent), apply environment overrides, validate.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = read_config_file(path)?;
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        TrackerError::Config(format!(
            "failed to read config file {}: {e}",
            path.display()
        ))
    })?;
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yml::from_str(&content)?;
    Ok(config)
}

/// `HEADLESS`, `MAX_PAGES` (0 = unlimited), `MIN_PRICE` and `LISTINGS_PATH`.
/// Unparseable values are ignored.
pub fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(raw) = lookup("HEADLESS") {
        match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => config.browser.headless = true,
            "false" | "0" | "no" => config.browser.headless = false,
            _ => tracing::warn!(value = %raw, "Ignoring invalid HEADLESS override"),
        }
    }
    if let Some(raw) = lookup("MAX_PAGES") {
        match raw.trim().parse::<u32>() {
            Ok(0) => config.traversal.max_pages = None,
            Ok(n) => config.traversal.max_pages = Some(n),
            Err(_) => tracing::warn!(value = %raw, "Ignoring invalid MAX_PAGES override"),
        }
    }
    if let Some(raw) = lookup("MIN_PRICE") {
        match raw.trim().parse::<f64>() {
            Ok(price) => config.traversal.min_price = price,
            Err(_) => tracing::warn!(value = %raw, "Ignoring invalid MIN_PRICE override"),
        }
    }
    if let Some(path) = lookup("LISTINGS_PATH").filter(|p| !p.trim().is_empty()) {
        config.store.path = path;
    }
}

pub fn validate(config: &Config) -> Result<()> {
    if config.traversal.min_price.is_nan() || config.traversal.min_price < 0.0 {
        return Err(TrackerError::Config(format!(
            "traversal.min_price must be >= 0, got {}",
            config.traversal.min_price
        )));
    }
    let ranges = [
        ("pacing.before_extract", config.pacing.before_extract),
        ("pacing.between_pages", config.pacing.between_pages),
        ("pacing.after_detail", config.pacing.after_detail),
    ];
    for (name, DelayRange { min_ms, max_ms }) in ranges {
        if min_ms > max_ms {
            return Err(TrackerError::Config(format!(
                "{name}: min_ms ({min_ms}) exceeds max_ms ({max_ms})"
            )));
        }
    }
    if config.traversal.max_pages == Some(0) {
        return Err(TrackerError::Config(
            "traversal.max_pages must be at least 1 when set".into(),
        ));
    }
    Ok(())
}
