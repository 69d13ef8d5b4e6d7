use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

#[derive(Clone, Debug)]
pub struct AppConfig {
    // =========================
    // Feed
    // =========================
    /// HTTP endpoint returning the JSON array of recent sale records.
    pub feed_url: String,

    /// Fixed delay between feed requests. Failures do not change it.
    pub poll_interval: Duration,

    /// Per-request transport timeout; the only timeout in the pipeline.
    pub request_timeout: Duration,

    /// Sale categories dropped before dedup and filtering
    /// (e.g. "Sticker", "Container").
    pub excluded_categories: Vec<String>,

    // =========================
    // Matching
    // =========================
    /// Filter rule file, read once at startup.
    pub filters_path: PathBuf,

    /// Number of sale ids remembered across cycles.
    pub dedup_capacity: usize,

    // =========================
    // Output
    // =========================
    /// Newest-first match log.
    pub audit_log_path: PathBuf,
    pub audit_log_max_lines: usize,

    /// When set, matches are POSTed here; otherwise they are only logged.
    pub notify_webhook_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Unparsable numbers fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let feed_url =
            text("FEED_URL").unwrap_or_else(|| "http://localhost:3000/skinport-live".to_string());

        let excluded_categories = text("EXCLUDED_CATEGORIES")
            .map(|v| {
                v.split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            feed_url,
            poll_interval: Duration::from_secs(parse_or(&lookup, "POLL_INTERVAL_SECS", 5u64).max(1)),
            request_timeout: Duration::from_secs(
                parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 5u64).max(1),
            ),
            excluded_categories,

            filters_path: text("FILTERS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("script_params.json")),
            dedup_capacity: parse_or(&lookup, "DEDUP_CAPACITY", engine::dedup::DEFAULT_CAPACITY)
                .max(1),

            audit_log_path: text("AUDIT_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs/listings.txt")),
            audit_log_max_lines: parse_or(
                &lookup,
                "AUDIT_LOG_MAX_LINES",
                crate::audit::DEFAULT_MAX_LINES,
            )
            .max(1),

            notify_webhook_url: text("NOTIFY_WEBHOOK_URL"),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            warn!(key, value = %raw, "unparsable config value; using default");
            default
        }
    }
}
