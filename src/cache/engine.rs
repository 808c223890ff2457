//! Query/mutation engine: the refetch-after-write protocol.
//!
//! Reads go through typed query slots; writes go to the transport first,
//! and only after the server acknowledges them does the engine mark
//! intersecting resident queries stale and re-run them. A failed or
//! rejected write leaves the cache exactly as it was.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use metrics::counter;
use subdesk_api_types::StatusResp;
use tracing::{debug, info, warn};

use crate::domain::{
    Cookie, CookieId, CookieTarget, Group, SubscribeConfig, TargetWeight, WeightConfig,
};
use crate::infra::{ApiError, ApiTransport};
use crate::util::lock::mutex_lock;

use super::keys::{QueryKey, Tag};
use super::registry::TagIndex;
use super::slot::QuerySlot;

const SOURCE: &str = "cache::engine";

/// Tag-based query/mutation cache over the admin API.
pub struct QueryCache {
    transport: Arc<dyn ApiTransport>,
    index: Arc<TagIndex>,
    subs: Arc<QuerySlot<Vec<Group>>>,
    cookies: Mutex<HashMap<Option<String>, Arc<QuerySlot<Vec<Cookie>>>>>,
    cookie_targets: Mutex<HashMap<CookieId, Arc<QuerySlot<Vec<CookieTarget>>>>>,
    weights: Arc<QuerySlot<Vec<TargetWeight>>>,
}

impl QueryCache {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            index: Arc::new(TagIndex::new()),
            subs: QuerySlot::new(),
            cookies: Mutex::new(HashMap::new()),
            cookie_targets: Mutex::new(HashMap::new()),
            weights: QuerySlot::new(),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// All groups and their subscriptions, in group-number order.
    pub async fn subscriptions(&self) -> Result<Arc<Vec<Group>>, ApiError> {
        let transport = self.transport.clone();
        self.subs
            .fetch_or_join(&QueryKey::Subs, &self.index, move || {
                let transport = transport.clone();
                async move {
                    let resp = transport.subs().await?;
                    Ok(resp
                        .iter()
                        .map(|(group_number, detail)| Group {
                            group_number: group_number.clone(),
                            display_name: detail.name.clone(),
                            subscribes: detail.subscribes.iter().map(SubscribeConfig::from).collect(),
                        })
                        .collect())
                }
                .boxed()
            })
            .await
    }

    /// Stored cookies, optionally filtered by site.
    pub async fn cookies(&self, site_name: Option<&str>) -> Result<Arc<Vec<Cookie>>, ApiError> {
        let site_name: Option<String> = site_name.map(str::to_string);
        let key = QueryKey::Cookies {
            site_name: site_name.clone(),
        };
        let slot = self.cookie_slot(&site_name);
        let transport = self.transport.clone();
        slot.fetch_or_join(&key, &self.index, move || {
            let transport = transport.clone();
            let site_name = site_name.clone();
            async move {
                let resp = transport.cookies(site_name.as_deref()).await?;
                Ok(resp.iter().map(Cookie::from).collect())
            }
            .boxed()
        })
        .await
    }

    /// Associations of one cookie.
    pub async fn cookie_targets(
        &self,
        cookie_id: CookieId,
    ) -> Result<Arc<Vec<CookieTarget>>, ApiError> {
        let key = QueryKey::CookieTargets { cookie_id };
        let slot = self.cookie_target_slot(cookie_id);
        let transport = self.transport.clone();
        slot.fetch_or_join(&key, &self.index, move || {
            let transport = transport.clone();
            async move {
                let resp = transport.cookie_targets(cookie_id).await?;
                Ok(resp.iter().map(CookieTarget::from).collect())
            }
            .boxed()
        })
        .await
    }

    /// Weight schedules for every target, in (platform, target) order.
    pub async fn weights(&self) -> Result<Arc<Vec<TargetWeight>>, ApiError> {
        let transport = self.transport.clone();
        self.weights
            .fetch_or_join(&QueryKey::Weights, &self.index, move || {
                let transport = transport.clone();
                async move {
                    let resp = transport.weights().await?;
                    let mut entries = Vec::new();
                    for by_target in resp.values() {
                        for weight in by_target.values() {
                            entries.push(
                                TargetWeight::from_wire(weight)
                                    .map_err(|err| ApiError::Decode(err.to_string()))?,
                            );
                        }
                    }
                    Ok(entries)
                }
                .boxed()
            })
            .await
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub async fn new_sub(
        &self,
        group_number: &str,
        config: &SubscribeConfig,
    ) -> Result<(), ApiError> {
        let resp = self
            .transport
            .add_sub(group_number, &config.to_wire())
            .await?;
        self.settle("new_sub", resp, &[Tag::Subscribe]).await
    }

    pub async fn update_sub(
        &self,
        group_number: &str,
        config: &SubscribeConfig,
    ) -> Result<(), ApiError> {
        let resp = self
            .transport
            .update_sub(group_number, &config.to_wire())
            .await?;
        self.settle("update_sub", resp, &[Tag::Subscribe]).await
    }

    pub async fn del_sub(
        &self,
        group_number: &str,
        platform_name: &str,
        target: &str,
    ) -> Result<(), ApiError> {
        let resp = self
            .transport
            .del_sub(group_number, platform_name, target)
            .await?;
        self.settle("del_sub", resp, &[Tag::Subscribe]).await
    }

    pub async fn new_cookie(&self, site_name: &str, content: &str) -> Result<(), ApiError> {
        let resp = self.transport.add_cookie(site_name, content).await?;
        self.settle("new_cookie", resp, &[Tag::Cookie]).await
    }

    /// Delete a cookie. Invalidates cookie-target queries too: the server
    /// drops the associations along with the cookie.
    pub async fn del_cookie(&self, cookie_id: CookieId) -> Result<(), ApiError> {
        let resp = self.transport.del_cookie(cookie_id).await?;
        self.settle("del_cookie", resp, &[Tag::Cookie, Tag::CookieTarget])
            .await
    }

    pub async fn new_cookie_target(
        &self,
        platform_name: &str,
        target: &str,
        cookie_id: CookieId,
    ) -> Result<(), ApiError> {
        let resp = self
            .transport
            .add_cookie_target(platform_name, target, cookie_id)
            .await?;
        self.settle("new_cookie_target", resp, &[Tag::CookieTarget])
            .await
    }

    pub async fn del_cookie_target(
        &self,
        platform_name: &str,
        target: &str,
        cookie_id: CookieId,
    ) -> Result<(), ApiError> {
        let resp = self
            .transport
            .del_cookie_target(platform_name, target, cookie_id)
            .await?;
        self.settle("del_cookie_target", resp, &[Tag::CookieTarget])
            .await
    }

    pub async fn update_weight(
        &self,
        platform_name: &str,
        target: &str,
        weight: &WeightConfig,
    ) -> Result<(), ApiError> {
        let resp = self
            .transport
            .update_weight(platform_name, target, &weight.to_wire())
            .await?;
        self.settle("update_weight", resp, &[Tag::Weight]).await
    }

    // ========================================================================
    // Invalidation
    // ========================================================================

    /// Apply a settled mutation response: reject propagates, success
    /// invalidates and re-runs intersecting resident queries.
    async fn settle(
        &self,
        op: &'static str,
        resp: StatusResp,
        tags: &[Tag],
    ) -> Result<(), ApiError> {
        if !resp.ok {
            debug!(op, msg = %resp.msg, "Mutation rejected by server");
            return Err(ApiError::Rejected { msg: resp.msg });
        }
        let affected = self.invalidate(op, tags);
        self.refetch(affected).await;
        Ok(())
    }

    /// Mark every resident query under `tags` stale. Returns the affected
    /// keys; a tag with no resident queries contributes nothing.
    fn invalidate(&self, op: &'static str, tags: &[Tag]) -> Vec<QueryKey> {
        let mut affected: HashSet<QueryKey> = HashSet::new();
        for tag in tags {
            for key in self.index.queries_for_tag(*tag) {
                if self.mark_stale(&key) {
                    affected.insert(key);
                }
            }
        }
        counter!("subdesk_cache_invalidate_total").increment(affected.len() as u64);
        info!(
            op,
            tags = ?tags.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            affected = affected.len(),
            "Mutation settled; resident queries invalidated"
        );
        affected.into_iter().collect()
    }

    /// Re-run invalidated queries immediately. A refetch failure is logged
    /// and leaves the slot stale; the mutation itself already succeeded.
    async fn refetch(&self, keys: Vec<QueryKey>) {
        for key in keys {
            let result = match &key {
                QueryKey::Subs => self.subscriptions().await.map(|_| ()),
                QueryKey::Cookies { site_name } => {
                    self.cookies(site_name.as_deref()).await.map(|_| ())
                }
                QueryKey::CookieTargets { cookie_id } => {
                    self.cookie_targets(*cookie_id).await.map(|_| ())
                }
                QueryKey::Weights => self.weights().await.map(|_| ()),
            };
            if let Err(err) = result {
                warn!(query = %key, error = %err, "Refetch after write failed; result stays stale");
            }
        }
    }

    fn mark_stale(&self, key: &QueryKey) -> bool {
        match key {
            QueryKey::Subs => self.subs.mark_stale(),
            QueryKey::Cookies { site_name } => {
                mutex_lock(&self.cookies, SOURCE, "mark_stale.cookies")
                    .get(site_name)
                    .is_some_and(|slot| slot.mark_stale())
            }
            QueryKey::CookieTargets { cookie_id } => {
                mutex_lock(&self.cookie_targets, SOURCE, "mark_stale.cookie_targets")
                    .get(cookie_id)
                    .is_some_and(|slot| slot.mark_stale())
            }
            QueryKey::Weights => self.weights.mark_stale(),
        }
    }

    fn cookie_slot(&self, site_name: &Option<String>) -> Arc<QuerySlot<Vec<Cookie>>> {
        mutex_lock(&self.cookies, SOURCE, "cookie_slot")
            .entry(site_name.clone())
            .or_insert_with(QuerySlot::new)
            .clone()
    }

    fn cookie_target_slot(&self, cookie_id: CookieId) -> Arc<QuerySlot<Vec<CookieTarget>>> {
        mutex_lock(&self.cookie_targets, SOURCE, "cookie_target_slot")
            .entry(cookie_id)
            .or_insert_with(QuerySlot::new)
            .clone()
    }
}
