//! Shared request and response types for the subdesk admin API.
//!
//! Pure serde shapes, no behavior: the wire surface uses the field casing
//! of the upstream service (camelCase for subscription/platform payloads,
//! snake_case for cookie and weight payloads), so every divergence from
//! Rust naming is pinned down here with explicit renames.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ============================================================================
// Capability bootstrap
// ============================================================================

/// Response of `GET global_conf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfResp {
    pub platform_conf: BTreeMap<String, PlatformConf>,
    pub site_conf: BTreeMap<String, SiteConf>,
}

/// Server-declared capabilities of one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConf {
    /// Human-readable display name.
    pub name: String,
    /// Category id to label; JSON object keys arrive as decimal strings.
    pub categories: BTreeMap<i32, String>,
    pub enabled_tag: bool,
    pub platform_name: String,
    pub has_target: bool,
    pub site_name: String,
}

/// Server-declared capabilities of one site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConf {
    pub name: String,
    pub enable_cookie: bool,
}

// ============================================================================
// Session bootstrap
// ============================================================================

/// Response of `GET auth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResp {
    pub token: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub id: i64,
    pub name: String,
}

// ============================================================================
// Subscriptions
// ============================================================================

/// One subscription, as listed under a group and as the add/update body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeItem {
    pub platform_name: String,
    pub target: String,
    pub target_name: String,
    pub cats: Vec<i32>,
    pub tags: Vec<String>,
}

/// One group's entry in the subs listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeGroupDetail {
    pub name: String,
    pub subscribes: Vec<SubscribeItem>,
}

/// Response of `GET subs`: group number to group detail.
pub type SubscribeResp = BTreeMap<String, SubscribeGroupDetail>;

/// Response of `GET target_name`; absent/null name signals "no such target".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetNameResp {
    #[serde(default)]
    pub target_name: Option<String>,
}

// ============================================================================
// Cookies
// ============================================================================

/// One stored credential, as listed by `GET cookie`.
///
/// `status`, `last_usage`, and `cd_milliseconds` are server-owned; the
/// client never writes them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieResp {
    pub id: i64,
    pub content: String,
    pub cookie_name: String,
    pub site_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub last_usage: OffsetDateTime,
    pub status: String,
    pub cd_milliseconds: i64,
    pub is_universal: bool,
    pub is_anonymous: bool,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Target reference embedded in a cookie-target association.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRef {
    pub platform_name: String,
    pub target_name: String,
    pub target: String,
}

/// One cookie ↔ target association, as listed by `GET cookie_target`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieTargetResp {
    pub target: TargetRef,
    pub cookie_id: i64,
}

// ============================================================================
// Weights
// ============================================================================

/// One time window inside a weight schedule; times are `HH:MM:SS` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWeightEntry {
    pub start_time: String,
    pub end_time: String,
    pub weight: i32,
}

/// Weight schedule for one target, both in listings and as the PUT body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightConfigPayload {
    #[serde(rename = "default")]
    pub default_weight: i32,
    pub time_config: Vec<TimeWeightEntry>,
}

/// One target's resolved weight entry in the `GET weight` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformWeightResp {
    pub target: String,
    pub target_name: String,
    pub platform_name: String,
    pub weight: WeightConfigPayload,
}

/// Response of `GET weight`: platform name → target → weight entry.
pub type WeightListResp = BTreeMap<String, BTreeMap<String, PlatformWeightResp>>;

// ============================================================================
// Shared
// ============================================================================

/// Uniform mutation acknowledgement; `ok == false` is a rejected write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResp {
    pub ok: bool,
    pub msg: String,
}
