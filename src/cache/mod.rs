//! Tag-based query/mutation cache.
//!
//! The synchronization core: read queries register under entity-kind tags,
//! mutations declare the tags they invalidate, and every successful write
//! marks intersecting resident queries stale and re-runs them — the
//! refetch-after-write discipline. Concurrent reads of the same query
//! share one in-flight request.

mod engine;
mod keys;
mod registry;
mod slot;

pub use engine::QueryCache;
pub use keys::{QueryKey, Tag};
pub use registry::TagIndex;
