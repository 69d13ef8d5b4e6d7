use std::path::Path;

use corelib::FilterConfig;
use engine::FilterSet;
use tracing::{info, warn};

use crate::error::ConfigError;

/// Reads and parses the filter file, accepting both the legacy single-rule
/// shape and the `{"filters": [...]}` shape.
pub async fn read_filter_config(path: &Path) -> Result<FilterConfig, ConfigError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    FilterConfig::from_json(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the active rule set. A missing or broken file yields an empty set,
/// which matches nothing, instead of failing startup.
pub async fn load_filter_set(path: &Path) -> FilterSet {
    match read_filter_config(path).await {
        Ok(cfg) => {
            let set = FilterSet::new(cfg.into_rules());
            info!(
                path = %path.display(),
                rules = set.len(),
                labels = ?set.iter().map(|r| r.label()).collect::<Vec<_>>(),
                "filter rules loaded"
            );
            set
        }
        Err(e) => {
            warn!(error = %e, "filter config unavailable; no sale will match");
            FilterSet::empty()
        }
    }
}
