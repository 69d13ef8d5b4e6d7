use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditLogError {
    #[error("audit log io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification endpoint rejected sale {sale_id}: {status}")]
    Rejected {
        sale_id: i64,
        status: reqwest::StatusCode,
    },

    #[error("notification dispatcher is gone")]
    ChannelClosed,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read filter config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid filter config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
