//! In-memory `ApiTransport` implementation driving the whole stack in
//! tests: mutations actually mutate the mock's state, so refetch-after-
//! write observations are real.

// Each test binary uses a different slice of this harness.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use subdesk::infra::{ApiError, ApiTransport};
use subdesk::session::Session;
use subdesk_api_types::{
    CookieResp, CookieTargetResp, GlobalConfResp, PlatformConf, SiteConf, StatusResp,
    SubscribeGroupDetail, SubscribeItem, SubscribeResp, TargetNameResp, TargetRef, TokenResp,
    WeightConfigPayload, WeightListResp,
};
use time::OffsetDateTime;
use tokio::sync::Notify;

#[derive(Default)]
pub struct MockState {
    pub subs: SubscribeResp,
    pub cookies: Vec<CookieResp>,
    pub cookie_targets: Vec<CookieTargetResp>,
    pub weights: WeightListResp,
    pub target_names: BTreeMap<(String, String), Option<String>>,
    next_cookie_id: i64,
}

pub struct MockApi {
    state: Mutex<MockState>,
    calls: Mutex<BTreeMap<&'static str, usize>>,
    fail_queue: Mutex<Vec<ApiError>>,
    reject_next: Mutex<Option<String>>,
    query_gate: Mutex<Option<Arc<Notify>>>,
    guarded_session: Mutex<Option<Arc<Session>>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState::default()),
            calls: Mutex::new(BTreeMap::new()),
            fail_queue: Mutex::new(Vec::new()),
            reject_next: Mutex::new(None),
            query_gate: Mutex::new(None),
            guarded_session: Mutex::new(None),
        })
    }

    // ========================================================================
    // Test controls
    // ========================================================================

    pub fn calls(&self, name: &'static str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    /// Queue an error; the next API call consumes and returns it.
    pub fn fail_next(&self, error: ApiError) {
        self.fail_queue.lock().unwrap().push(error);
    }

    /// The next mutation settles with `ok == false` and this message.
    pub fn reject_next(&self, msg: &str) {
        *self.reject_next.lock().unwrap() = Some(msg.to_string());
    }

    /// Park read queries on a gate until `release_queries`.
    pub fn hold_queries(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.query_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn release_queries(&self) {
        if let Some(gate) = self.query_gate.lock().unwrap().take() {
            gate.notify_waiters();
        }
    }

    /// Emulate the HTTP transport's guard: an unauthorized response clears
    /// this session before the error surfaces.
    pub fn guard_session(&self, session: Arc<Session>) {
        *self.guarded_session.lock().unwrap() = Some(session);
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    pub fn seed_group(&self, group_number: &str, name: &str) {
        self.state.lock().unwrap().subs.insert(
            group_number.to_string(),
            SubscribeGroupDetail {
                name: name.to_string(),
                subscribes: Vec::new(),
            },
        );
    }

    pub fn seed_sub(&self, group_number: &str, item: SubscribeItem) {
        let mut state = self.state.lock().unwrap();
        state
            .subs
            .entry(group_number.to_string())
            .or_insert_with(|| SubscribeGroupDetail {
                name: format!("group {group_number}"),
                subscribes: Vec::new(),
            })
            .subscribes
            .push(item);
    }

    pub fn seed_cookie(&self, site_name: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        state.next_cookie_id += 1;
        let id = state.next_cookie_id;
        state.cookies.push(CookieResp {
            id,
            content: format!("{{\"seed\": {id}}}"),
            cookie_name: format!("cookie {id}"),
            site_name: site_name.to_string(),
            last_usage: OffsetDateTime::UNIX_EPOCH,
            status: "ok".to_string(),
            cd_milliseconds: 10_000,
            is_universal: false,
            is_anonymous: false,
            tags: BTreeMap::new(),
        });
        id
    }

    pub fn seed_cookie_target(&self, cookie_id: i64, platform_name: &str, target: &str) {
        self.state
            .lock()
            .unwrap()
            .cookie_targets
            .push(CookieTargetResp {
                target: TargetRef {
                    platform_name: platform_name.to_string(),
                    target_name: format!("name of {target}"),
                    target: target.to_string(),
                },
                cookie_id,
            });
    }

    pub fn set_target_name(&self, platform_name: &str, target: &str, name: Option<&str>) {
        self.state.lock().unwrap().target_names.insert(
            (platform_name.to_string(), target.to_string()),
            name.map(str::to_string),
        );
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn called(&self, name: &'static str) -> Result<(), ApiError> {
        *self.calls.lock().unwrap().entry(name).or_insert(0) += 1;
        let queued = {
            let mut queue = self.fail_queue.lock().unwrap();
            if queue.is_empty() {
                None
            } else {
                Some(queue.remove(0))
            }
        };
        if let Some(error) = queued {
            if matches!(error, ApiError::Unauthorized) {
                if let Some(session) = self.guarded_session.lock().unwrap().as_ref() {
                    session.clear();
                }
            }
            return Err(error);
        }
        Ok(())
    }

    async fn wait_if_held(&self) {
        let gate = self.query_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn settle(&self) -> StatusResp {
        match self.reject_next.lock().unwrap().take() {
            Some(msg) => StatusResp { ok: false, msg },
            None => StatusResp {
                ok: true,
                msg: String::new(),
            },
        }
    }
}

/// Capability payload used across tests: one target-bearing platform with
/// categories and tags, one bare feed platform, one no-target platform.
pub fn default_conf() -> GlobalConfResp {
    GlobalConfResp {
        platform_conf: BTreeMap::from([
            (
                "weibo".to_string(),
                PlatformConf {
                    name: "Weibo".to_string(),
                    categories: BTreeMap::from([
                        (1, "post".to_string()),
                        (2, "repost".to_string()),
                    ]),
                    enabled_tag: true,
                    platform_name: "weibo".to_string(),
                    has_target: true,
                    site_name: "weibo.com".to_string(),
                },
            ),
            (
                "rss".to_string(),
                PlatformConf {
                    name: "RSS".to_string(),
                    categories: BTreeMap::new(),
                    enabled_tag: false,
                    platform_name: "rss".to_string(),
                    has_target: true,
                    site_name: "rss".to_string(),
                },
            ),
            (
                "news".to_string(),
                PlatformConf {
                    name: "Daily News".to_string(),
                    categories: BTreeMap::new(),
                    enabled_tag: false,
                    platform_name: "news".to_string(),
                    has_target: false,
                    site_name: "rss".to_string(),
                },
            ),
        ]),
        site_conf: BTreeMap::from([
            (
                "weibo.com".to_string(),
                SiteConf {
                    name: "weibo.com".to_string(),
                    enable_cookie: true,
                },
            ),
            (
                "rss".to_string(),
                SiteConf {
                    name: "rss".to_string(),
                    enable_cookie: false,
                },
            ),
        ]),
    }
}

#[async_trait]
impl ApiTransport for MockApi {
    async fn global_conf(&self) -> Result<GlobalConfResp, ApiError> {
        self.called("global_conf")?;
        Ok(default_conf())
    }

    async fn auth(&self, code: &str) -> Result<TokenResp, ApiError> {
        self.called("auth")?;
        Ok(TokenResp {
            token: format!("jwt-{code}"),
            user_type: "admin".to_string(),
            id: 1,
            name: "op".to_string(),
        })
    }

    async fn subs(&self) -> Result<SubscribeResp, ApiError> {
        self.called("subs")?;
        self.wait_if_held().await;
        Ok(self.state.lock().unwrap().subs.clone())
    }

    async fn add_sub(
        &self,
        group_number: &str,
        body: &SubscribeItem,
    ) -> Result<StatusResp, ApiError> {
        self.called("add_sub")?;
        let resp = self.settle();
        if resp.ok {
            self.seed_sub(group_number, body.clone());
        }
        Ok(resp)
    }

    async fn update_sub(
        &self,
        group_number: &str,
        body: &SubscribeItem,
    ) -> Result<StatusResp, ApiError> {
        self.called("update_sub")?;
        let resp = self.settle();
        if resp.ok {
            let mut state = self.state.lock().unwrap();
            if let Some(detail) = state.subs.get_mut(group_number) {
                for sub in &mut detail.subscribes {
                    if sub.platform_name == body.platform_name && sub.target == body.target {
                        *sub = body.clone();
                    }
                }
            }
        }
        Ok(resp)
    }

    async fn del_sub(
        &self,
        group_number: &str,
        platform_name: &str,
        target: &str,
    ) -> Result<StatusResp, ApiError> {
        self.called("del_sub")?;
        let resp = self.settle();
        if resp.ok {
            let mut state = self.state.lock().unwrap();
            if let Some(detail) = state.subs.get_mut(group_number) {
                detail
                    .subscribes
                    .retain(|sub| !(sub.platform_name == platform_name && sub.target == target));
            }
        }
        Ok(resp)
    }

    async fn target_name(
        &self,
        platform_name: &str,
        target: &str,
    ) -> Result<TargetNameResp, ApiError> {
        self.called("target_name")?;
        let state = self.state.lock().unwrap();
        let target_name = state
            .target_names
            .get(&(platform_name.to_string(), target.to_string()))
            .cloned()
            .flatten();
        Ok(TargetNameResp { target_name })
    }

    async fn cookies(&self, site_name: Option<&str>) -> Result<Vec<CookieResp>, ApiError> {
        self.called("cookies")?;
        self.wait_if_held().await;
        let state = self.state.lock().unwrap();
        Ok(state
            .cookies
            .iter()
            .filter(|cookie| site_name.is_none_or(|site| cookie.site_name == site))
            .cloned()
            .collect())
    }

    async fn add_cookie(&self, site_name: &str, _content: &str) -> Result<StatusResp, ApiError> {
        self.called("add_cookie")?;
        let resp = self.settle();
        if resp.ok {
            self.seed_cookie(site_name);
        }
        Ok(resp)
    }

    async fn del_cookie(&self, cookie_id: i64) -> Result<StatusResp, ApiError> {
        self.called("del_cookie")?;
        let resp = self.settle();
        if resp.ok {
            let mut state = self.state.lock().unwrap();
            state.cookies.retain(|cookie| cookie.id != cookie_id);
            state
                .cookie_targets
                .retain(|association| association.cookie_id != cookie_id);
        }
        Ok(resp)
    }

    async fn validate_cookie(
        &self,
        _site_name: &str,
        _content: &str,
    ) -> Result<StatusResp, ApiError> {
        self.called("validate_cookie")?;
        Ok(self.settle())
    }

    async fn cookie_targets(&self, cookie_id: i64) -> Result<Vec<CookieTargetResp>, ApiError> {
        self.called("cookie_targets")?;
        self.wait_if_held().await;
        let state = self.state.lock().unwrap();
        Ok(state
            .cookie_targets
            .iter()
            .filter(|association| association.cookie_id == cookie_id)
            .cloned()
            .collect())
    }

    async fn add_cookie_target(
        &self,
        platform_name: &str,
        target: &str,
        cookie_id: i64,
    ) -> Result<StatusResp, ApiError> {
        self.called("add_cookie_target")?;
        let resp = self.settle();
        if resp.ok {
            self.seed_cookie_target(cookie_id, platform_name, target);
        }
        Ok(resp)
    }

    async fn del_cookie_target(
        &self,
        platform_name: &str,
        target: &str,
        cookie_id: i64,
    ) -> Result<StatusResp, ApiError> {
        self.called("del_cookie_target")?;
        let resp = self.settle();
        if resp.ok {
            let mut state = self.state.lock().unwrap();
            state.cookie_targets.retain(|association| {
                !(association.cookie_id == cookie_id
                    && association.target.platform_name == platform_name
                    && association.target.target == target)
            });
        }
        Ok(resp)
    }

    async fn weights(&self) -> Result<WeightListResp, ApiError> {
        self.called("weights")?;
        self.wait_if_held().await;
        Ok(self.state.lock().unwrap().weights.clone())
    }

    async fn update_weight(
        &self,
        platform_name: &str,
        target: &str,
        body: &WeightConfigPayload,
    ) -> Result<StatusResp, ApiError> {
        self.called("update_weight")?;
        let resp = self.settle();
        if resp.ok {
            let mut state = self.state.lock().unwrap();
            let target_name = state
                .target_names
                .get(&(platform_name.to_string(), target.to_string()))
                .cloned()
                .flatten()
                .unwrap_or_default();
            state
                .weights
                .entry(platform_name.to_string())
                .or_default()
                .insert(
                    target.to_string(),
                    subdesk_api_types::PlatformWeightResp {
                        target: target.to_string(),
                        target_name,
                        platform_name: platform_name.to_string(),
                        weight: body.clone(),
                    },
                );
        }
        Ok(resp)
    }
}
