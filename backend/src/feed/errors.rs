use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sale feed answered {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed sale feed payload: {0}")]
    Decode(#[from] serde_json::Error),
}
