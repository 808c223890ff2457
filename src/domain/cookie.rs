//! Stored credentials ("cookies") and their target associations.
//!
//! Cookies are created and deleted by the client; everything else about
//! them — status, cooldown, last usage — is server-owned and read-only
//! from this side.

use std::collections::BTreeMap;

use serde::Serialize;
use subdesk_api_types::{CookieResp, CookieTargetResp};
use time::OffsetDateTime;

/// Server-assigned cookie identifier.
pub type CookieId = i64;

/// Server-reported health of a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CookieStatus {
    Ok,
    Cooling,
    Invalid,
    /// Statuses this client version does not know yet.
    Unknown,
}

impl CookieStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CookieStatus::Ok => "ok",
            CookieStatus::Cooling => "cooling",
            CookieStatus::Invalid => "invalid",
            CookieStatus::Unknown => "unknown",
        }
    }
}

impl From<&str> for CookieStatus {
    fn from(value: &str) -> Self {
        match value {
            "ok" => CookieStatus::Ok,
            "cooling" => CookieStatus::Cooling,
            "invalid" => CookieStatus::Invalid,
            _ => CookieStatus::Unknown,
        }
    }
}

/// One stored credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cookie {
    pub id: CookieId,
    pub site_name: String,
    /// Secret payload; handled but never logged.
    pub content: String,
    pub friendly_name: String,
    pub last_usage: OffsetDateTime,
    pub status: CookieStatus,
    pub cooldown_ms: i64,
    pub is_universal: bool,
    pub is_anonymous: bool,
    pub tags: BTreeMap<String, String>,
}

impl From<&CookieResp> for Cookie {
    fn from(resp: &CookieResp) -> Self {
        Self {
            id: resp.id,
            site_name: resp.site_name.clone(),
            content: resp.content.clone(),
            friendly_name: resp.cookie_name.clone(),
            last_usage: resp.last_usage,
            status: CookieStatus::from(resp.status.as_str()),
            cooldown_ms: resp.cd_milliseconds,
            is_universal: resp.is_universal,
            is_anonymous: resp.is_anonymous,
            tags: resp.tags.clone(),
        }
    }
}

/// Association between a cookie and one platform target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieTarget {
    pub cookie_id: CookieId,
    pub platform_name: String,
    pub target: String,
    pub target_name: String,
}

impl From<&CookieTargetResp> for CookieTarget {
    fn from(resp: &CookieTargetResp) -> Self {
        Self {
            cookie_id: resp.cookie_id,
            platform_name: resp.target.platform_name.clone(),
            target: resp.target.target.clone(),
            target_name: resp.target.target_name.clone(),
        }
    }
}
