pub mod client;
pub mod errors;
pub mod poller;
pub mod source;

pub use client::FeedClient;
pub use errors::FeedError;
pub use poller::{CycleReport, SalePoller};
pub use source::SaleFeed;
