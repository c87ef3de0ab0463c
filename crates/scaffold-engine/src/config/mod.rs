//! Run configuration, persisted defaults and the project cache

pub mod cache;
pub mod settings;

pub use cache::{is_cache_fresh, is_cache_fresh_at, CacheStore};
pub use settings::{merge_args, persistable_flags, RunConfig};
