pub mod audit;
pub mod config;
pub mod feed;
pub mod filters;
pub mod metrics;
pub mod notify;

pub mod error;
pub mod logger;
pub mod time;
