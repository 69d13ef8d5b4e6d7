pub mod lenient;
pub mod notified;
pub mod rule;
pub mod sale;

pub use notified::{NotifiedSale, minor_to_major};
pub use rule::{FilterConfig, FilterRule};
pub use sale::{FeedRecord, LISTED, Sale};
