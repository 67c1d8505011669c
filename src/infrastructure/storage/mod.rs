pub mod dedup;

pub use dedup::{DedupOptions, DedupStats, RequestDeduplicator, SharedRequest, SharedResult};
