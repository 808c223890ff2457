//! Round-trip target-name resolution with per-pair memoization.

use std::sync::Arc;

use dashmap::DashMap;
use metrics::counter;
use thiserror::Error;
use tracing::debug;

use crate::infra::{ApiError, ApiTransport};

#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The platform answered: no such target. A domain outcome, not a
    /// transport failure — it is memoized like a success.
    #[error("target does not exist on that platform")]
    TargetNotFound,
    /// The resolution call itself failed; the operator may retry. Never
    /// memoized. An unauthorized response has already cleared the session
    /// by the time it surfaces here.
    #[error("target resolution unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Resolves `(platform, target)` pairs to display names against the
/// server, memoizing domain outcomes for its lifetime.
///
/// Scope one resolver per form session: re-renders of the same draft hit
/// the memo table instead of the network, and discarding the form
/// discards the memo with it.
pub struct TargetResolver {
    transport: Arc<dyn ApiTransport>,
    /// `Some(name)` = resolved, `None` = confirmed absent.
    memo: DashMap<(String, String), Option<String>>,
}

impl TargetResolver {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            memo: DashMap::new(),
        }
    }

    /// Resolve the display name of a target, or confirm it does not exist.
    ///
    /// The UI must re-run this whenever the platform or target changes and
    /// must not submit while a resolution is pending or failed.
    pub async fn resolve(&self, platform_name: &str, target: &str) -> Result<String, ResolveError> {
        let key = (platform_name.to_string(), target.to_string());
        if let Some(memoized) = self.memo.get(&key) {
            counter!("subdesk_resolver_memo_hit_total").increment(1);
            return memoized.clone().ok_or(ResolveError::TargetNotFound);
        }

        let resp = self
            .transport
            .target_name(platform_name, target)
            .await
            .map_err(|err: ApiError| ResolveError::ServiceUnavailable(err.to_string()))?;

        // An empty name is the wire's other way of saying "not found".
        let name = resp.target_name.filter(|name| !name.is_empty());
        debug!(
            platform = platform_name,
            target,
            found = name.is_some(),
            "Target resolution settled"
        );
        self.memo.insert(key, name.clone());
        name.ok_or(ResolveError::TargetNotFound)
    }

    /// Drop every memoized outcome.
    pub fn clear(&self) {
        self.memo.clear();
    }

    /// Number of memoized `(platform, target)` outcomes.
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }
}
