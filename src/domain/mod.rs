//! Typed entity model for the subscription configuration graph.
//!
//! Pure value types plus the capability predicates used pervasively by the
//! validation engine and the cache. Invariants are enforced at entry points
//! (`crate::validate`), not by the types themselves.

pub mod cookie;
pub mod error;
pub mod platform;
pub mod subscribe;
pub mod weight;

pub use cookie::{Cookie, CookieId, CookieStatus, CookieTarget};
pub use error::DomainError;
pub use platform::{CategoryId, DEFAULT_TARGET, Platform, Site};
pub use subscribe::{Group, SubKey, SubscribeConfig};
pub use weight::{TargetWeight, TimeWindow, WeightConfig};
