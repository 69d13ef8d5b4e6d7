pub mod constraint;
pub mod dedup;
pub mod filter;

pub use constraint::{Check, Constraint};
pub use dedup::DedupWindow;
pub use filter::{CompiledRule, FilterSet, evaluate_set, evaluate_single};
