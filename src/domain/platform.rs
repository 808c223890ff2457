//! Platform and site capability records.
//!
//! Both are server-declared and immutable for the lifetime of a session;
//! the capability registry validates the wire payload once at load time and
//! hands out these closed records afterwards.

use std::collections::BTreeMap;

use serde::Serialize;
use subdesk_api_types::{PlatformConf, SiteConf};

use super::error::DomainError;

/// Category identifier declared by a platform.
pub type CategoryId = i32;

/// Sentinel target for platforms that have no per-account feeds.
pub const DEFAULT_TARGET: &str = "default";

/// Server-declared capabilities of one content platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    /// Stable identifier, e.g. `weibo`.
    pub platform_name: String,
    /// Human-readable name shown to operators.
    pub display_name: String,
    /// Site this platform fetches through; keys credential compatibility.
    pub site_name: String,
    /// Whether subscriptions need a target identifier.
    pub has_target: bool,
    /// Declared category choices; empty means the platform has none.
    pub categories: BTreeMap<CategoryId, String>,
    /// Whether free-form tags may be attached to subscriptions.
    pub tags_enabled: bool,
}

impl Platform {
    /// Whether a subscription form must collect a target from the operator.
    pub fn requires_target_input(&self) -> bool {
        self.has_target
    }

    /// Declared category choices for subscription drafts.
    pub fn category_choices(&self) -> &BTreeMap<CategoryId, String> {
        &self.categories
    }

    /// Whether free-form tags are accepted on subscriptions.
    pub fn tags_allowed(&self) -> bool {
        self.tags_enabled
    }
}

impl TryFrom<&PlatformConf> for Platform {
    type Error = DomainError;

    fn try_from(conf: &PlatformConf) -> Result<Self, Self::Error> {
        if conf.platform_name.trim().is_empty() {
            return Err(DomainError::validation("platform has a blank name"));
        }
        if conf.site_name.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "platform `{}` declares no site",
                conf.platform_name
            )));
        }
        Ok(Self {
            platform_name: conf.platform_name.clone(),
            display_name: conf.name.clone(),
            site_name: conf.site_name.clone(),
            has_target: conf.has_target,
            categories: conf.categories.clone(),
            tags_enabled: conf.enabled_tag,
        })
    }
}

/// Server-declared capabilities of one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    pub name: String,
    /// Whether the site supports credential storage at all.
    pub cookie_enabled: bool,
}

impl TryFrom<&SiteConf> for Site {
    type Error = DomainError;

    fn try_from(conf: &SiteConf) -> Result<Self, Self::Error> {
        if conf.name.trim().is_empty() {
            return Err(DomainError::validation("site has a blank name"));
        }
        Ok(Self {
            name: conf.name.clone(),
            cookie_enabled: conf.enable_cookie,
        })
    }
}
