//! Admin API transport.
//!
//! `ApiTransport` is the seam between the synchronization engine and the
//! network; the engine and validators only ever see this trait, so tests
//! drive them with an in-memory implementation. `HttpTransport` is the
//! real reqwest-backed client: it joins endpoint paths under the
//! configured base URL, attaches the session's bearer credential to every
//! protected call, and funnels unauthorized responses into the session
//! guard.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use subdesk_api_types::{
    CookieResp, CookieTargetResp, GlobalConfResp, StatusResp, SubscribeItem, SubscribeResp,
    TargetNameResp, TokenResp, WeightConfigPayload, WeightListResp,
};
use tracing::{debug, warn};

use crate::config::{ApiSettings, user_agent};
use crate::session::Session;

use super::error::{ApiError, InfraError};

/// Typed surface of the admin API consumed by the engine and validators.
///
/// `auth` and `global_conf` are unauthenticated; every other call carries
/// the bearer credential or fails with `ApiError::NotAuthenticated`
/// before anything is sent.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn global_conf(&self) -> Result<GlobalConfResp, ApiError>;
    async fn auth(&self, code: &str) -> Result<TokenResp, ApiError>;

    async fn subs(&self) -> Result<SubscribeResp, ApiError>;
    async fn add_sub(
        &self,
        group_number: &str,
        body: &SubscribeItem,
    ) -> Result<StatusResp, ApiError>;
    async fn update_sub(
        &self,
        group_number: &str,
        body: &SubscribeItem,
    ) -> Result<StatusResp, ApiError>;
    async fn del_sub(
        &self,
        group_number: &str,
        platform_name: &str,
        target: &str,
    ) -> Result<StatusResp, ApiError>;
    async fn target_name(&self, platform_name: &str, target: &str)
    -> Result<TargetNameResp, ApiError>;

    async fn cookies(&self, site_name: Option<&str>) -> Result<Vec<CookieResp>, ApiError>;
    async fn add_cookie(&self, site_name: &str, content: &str) -> Result<StatusResp, ApiError>;
    async fn del_cookie(&self, cookie_id: i64) -> Result<StatusResp, ApiError>;
    async fn validate_cookie(&self, site_name: &str, content: &str)
    -> Result<StatusResp, ApiError>;

    async fn cookie_targets(&self, cookie_id: i64) -> Result<Vec<CookieTargetResp>, ApiError>;
    async fn add_cookie_target(
        &self,
        platform_name: &str,
        target: &str,
        cookie_id: i64,
    ) -> Result<StatusResp, ApiError>;
    async fn del_cookie_target(
        &self,
        platform_name: &str,
        target: &str,
        cookie_id: i64,
    ) -> Result<StatusResp, ApiError>;

    async fn weights(&self) -> Result<WeightListResp, ApiError>;
    async fn update_weight(
        &self,
        platform_name: &str,
        target: &str,
        body: &WeightConfigPayload,
    ) -> Result<StatusResp, ApiError>;
}

/// Whether a call attaches the session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    None,
    Bearer,
}

/// reqwest-backed transport with session guard semantics.
pub struct HttpTransport {
    client: Client,
    base: Url,
    session: Arc<Session>,
}

impl HttpTransport {
    pub fn new(api: &ApiSettings, session: Arc<Session>) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(api.request_timeout)
            .build()
            .map_err(|err| InfraError::client_build(err.to_string()))?;
        Ok(Self {
            client,
            base: api.base_url.clone(),
            session,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::InvalidRequest(err.to_string()))
    }

    fn bearer(&self) -> Result<HeaderValue, ApiError> {
        let token = self.session.token().ok_or(ApiError::NotAuthenticated)?;
        HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|err| ApiError::InvalidRequest(err.to_string()))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let mut url = self.url(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        debug!(%method, path, "API request");

        let mut request = self.client.request(method, url);
        if auth == Auth::Bearer {
            request = request.header(AUTHORIZATION, self.bearer()?);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        self.handle(response).await
    }

    async fn handle<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            if self.session.clear() {
                warn!("Unauthorized response; session cleared");
            }
            return Err(ApiError::Unauthorized);
        }

        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }

    fn json_body<T: serde::Serialize>(body: &T) -> Result<Value, ApiError> {
        serde_json::to_value(body).map_err(|err| ApiError::InvalidRequest(err.to_string()))
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn global_conf(&self) -> Result<GlobalConfResp, ApiError> {
        self.send(Method::GET, "global_conf", &[], None, Auth::None)
            .await
    }

    async fn auth(&self, code: &str) -> Result<TokenResp, ApiError> {
        self.send(
            Method::GET,
            "auth",
            &[("token", code.to_string())],
            None,
            Auth::None,
        )
        .await
    }

    async fn subs(&self) -> Result<SubscribeResp, ApiError> {
        self.send(Method::GET, "subs", &[], None, Auth::Bearer).await
    }

    async fn add_sub(
        &self,
        group_number: &str,
        body: &SubscribeItem,
    ) -> Result<StatusResp, ApiError> {
        self.send(
            Method::POST,
            "subs",
            &[("groupNumber", group_number.to_string())],
            Some(Self::json_body(body)?),
            Auth::Bearer,
        )
        .await
    }

    async fn update_sub(
        &self,
        group_number: &str,
        body: &SubscribeItem,
    ) -> Result<StatusResp, ApiError> {
        self.send(
            Method::PATCH,
            "subs",
            &[("groupNumber", group_number.to_string())],
            Some(Self::json_body(body)?),
            Auth::Bearer,
        )
        .await
    }

    async fn del_sub(
        &self,
        group_number: &str,
        platform_name: &str,
        target: &str,
    ) -> Result<StatusResp, ApiError> {
        self.send(
            Method::DELETE,
            "subs",
            &[
                ("groupNumber", group_number.to_string()),
                ("platformName", platform_name.to_string()),
                ("target", target.to_string()),
            ],
            None,
            Auth::Bearer,
        )
        .await
    }

    async fn target_name(
        &self,
        platform_name: &str,
        target: &str,
    ) -> Result<TargetNameResp, ApiError> {
        self.send(
            Method::GET,
            "target_name",
            &[
                ("platformName", platform_name.to_string()),
                ("target", target.to_string()),
            ],
            None,
            Auth::Bearer,
        )
        .await
    }

    async fn cookies(&self, site_name: Option<&str>) -> Result<Vec<CookieResp>, ApiError> {
        let mut query = Vec::new();
        if let Some(site) = site_name {
            query.push(("site_name", site.to_string()));
        }
        self.send(Method::GET, "cookie", &query, None, Auth::Bearer)
            .await
    }

    async fn add_cookie(&self, site_name: &str, content: &str) -> Result<StatusResp, ApiError> {
        self.send(
            Method::POST,
            "cookie",
            &[
                ("site_name", site_name.to_string()),
                ("content", content.to_string()),
            ],
            None,
            Auth::Bearer,
        )
        .await
    }

    async fn del_cookie(&self, cookie_id: i64) -> Result<StatusResp, ApiError> {
        self.send(
            Method::DELETE,
            &format!("cookie/{cookie_id}"),
            &[],
            None,
            Auth::Bearer,
        )
        .await
    }

    async fn validate_cookie(
        &self,
        site_name: &str,
        content: &str,
    ) -> Result<StatusResp, ApiError> {
        self.send(
            Method::POST,
            "cookie/validate",
            &[
                ("site_name", site_name.to_string()),
                ("content", content.to_string()),
            ],
            None,
            Auth::Bearer,
        )
        .await
    }

    async fn cookie_targets(&self, cookie_id: i64) -> Result<Vec<CookieTargetResp>, ApiError> {
        self.send(
            Method::GET,
            "cookie_target",
            &[("cookie_id", cookie_id.to_string())],
            None,
            Auth::Bearer,
        )
        .await
    }

    async fn add_cookie_target(
        &self,
        platform_name: &str,
        target: &str,
        cookie_id: i64,
    ) -> Result<StatusResp, ApiError> {
        self.send(
            Method::POST,
            "cookie_target",
            &[
                ("platform_name", platform_name.to_string()),
                ("target", target.to_string()),
                ("cookie_id", cookie_id.to_string()),
            ],
            None,
            Auth::Bearer,
        )
        .await
    }

    async fn del_cookie_target(
        &self,
        platform_name: &str,
        target: &str,
        cookie_id: i64,
    ) -> Result<StatusResp, ApiError> {
        self.send(
            Method::DELETE,
            "cookie_target",
            &[
                ("platform_name", platform_name.to_string()),
                ("target", target.to_string()),
                ("cookie_id", cookie_id.to_string()),
            ],
            None,
            Auth::Bearer,
        )
        .await
    }

    async fn weights(&self) -> Result<WeightListResp, ApiError> {
        self.send(Method::GET, "weight", &[], None, Auth::Bearer)
            .await
    }

    async fn update_weight(
        &self,
        platform_name: &str,
        target: &str,
        body: &WeightConfigPayload,
    ) -> Result<StatusResp, ApiError> {
        self.send(
            Method::PUT,
            "weight",
            &[
                ("platformName", platform_name.to_string()),
                ("target", target.to_string()),
            ],
            Some(Self::json_body(body)?),
            Auth::Bearer,
        )
        .await
    }
}
