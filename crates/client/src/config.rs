use std::time::Duration;

use stockroom_core::low_stock::DEFAULT_LOW_STOCK_THRESHOLD;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the inventory API, without a trailing slash.
    pub api_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Item count below which a product is reported as low stock.
    pub low_stock_threshold: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            request_timeout: Duration::from_secs(30),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `INVENTORY_API_URL`    | `http://localhost:5000` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `LOW_STOCK_THRESHOLD`  | `10`                    |
    ///
    /// Values that fail to parse fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_url = std::env::var("INVENTORY_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let request_timeout = parse_var("REQUEST_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let low_stock_threshold =
            parse_var("LOW_STOCK_THRESHOLD").unwrap_or(defaults.low_stock_threshold);

        Self {
            api_url,
            request_timeout,
            low_stock_threshold,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparseable config value");
            None
        }
    }
}
