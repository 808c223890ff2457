//! Cookie validation: the site-match association rule, site gating, and
//! the round-trip content probe.

use thiserror::Error;

use crate::domain::{Cookie, Platform, Site};
use crate::infra::{ApiError, ApiTransport};

/// Why a cookie ↔ target association was rejected.
#[derive(Debug, Clone, Error)]
pub enum AssociationError {
    #[error("cookie belongs to site `{cookie_site}` but the platform fetches through `{platform_site}`")]
    IncompatibleSite {
        cookie_site: String,
        platform_site: String,
    },
    #[error("site `{site}` does not support cookies")]
    CookieNotSupported { site: String },
}

/// A cookie may only be attached to targets of platforms that fetch
/// through the cookie's own site.
pub fn validate_cookie_target_association(
    cookie: &Cookie,
    platform: &Platform,
) -> Result<(), AssociationError> {
    if cookie.site_name != platform.site_name {
        return Err(AssociationError::IncompatibleSite {
            cookie_site: cookie.site_name.clone(),
            platform_site: platform.site_name.clone(),
        });
    }
    Ok(())
}

/// Cookies can only be stored for sites that declared support for them.
pub fn validate_cookie_site(site: &Site) -> Result<(), AssociationError> {
    if !site.cookie_enabled {
        return Err(AssociationError::CookieNotSupported {
            site: site.name.clone(),
        });
    }
    Ok(())
}

/// Why a cookie draft's content was rejected.
#[derive(Debug, Clone, Error)]
pub enum CookieContentError {
    #[error("cookie content is empty")]
    Empty,
    /// The site's client manager probed the content and rejected it.
    #[error("cookie rejected by site: {msg}")]
    Rejected { msg: String },
    #[error("cookie validation unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Local precheck before the round trip.
pub fn validate_cookie_draft(content: &str) -> Result<(), CookieContentError> {
    if content.trim().is_empty() {
        return Err(CookieContentError::Empty);
    }
    Ok(())
}

/// Round-trip content probe: the server exercises the credential against
/// the site before the add-cookie mutation is issued.
pub async fn validate_cookie_content(
    transport: &dyn ApiTransport,
    site_name: &str,
    content: &str,
) -> Result<(), CookieContentError> {
    validate_cookie_draft(content)?;
    let resp = transport
        .validate_cookie(site_name, content)
        .await
        .map_err(|err: ApiError| CookieContentError::ServiceUnavailable(err.to_string()))?;
    if resp.ok {
        Ok(())
    } else {
        Err(CookieContentError::Rejected { msg: resp.msg })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use time::OffsetDateTime;

    use crate::domain::CookieStatus;

    use super::*;

    fn cookie(site_name: &str) -> Cookie {
        Cookie {
            id: 3,
            site_name: site_name.to_string(),
            content: "{}".to_string(),
            friendly_name: "ops cookie".to_string(),
            last_usage: OffsetDateTime::UNIX_EPOCH,
            status: CookieStatus::Ok,
            cooldown_ms: 10_000,
            is_universal: false,
            is_anonymous: false,
            tags: BTreeMap::new(),
        }
    }

    fn platform(site_name: &str) -> Platform {
        Platform {
            platform_name: "weibo".to_string(),
            display_name: "Weibo".to_string(),
            site_name: site_name.to_string(),
            has_target: true,
            categories: BTreeMap::new(),
            tags_enabled: false,
        }
    }

    #[test]
    fn mismatched_sites_are_incompatible() {
        let result = validate_cookie_target_association(&cookie("rss"), &platform("weibo"));
        assert!(matches!(
            result,
            Err(AssociationError::IncompatibleSite { .. })
        ));
    }

    #[test]
    fn matching_sites_associate() {
        assert!(validate_cookie_target_association(&cookie("weibo"), &platform("weibo")).is_ok());
    }

    #[test]
    fn cookie_disabled_site_is_rejected() {
        let site = Site {
            name: "rss".to_string(),
            cookie_enabled: false,
        };
        assert!(matches!(
            validate_cookie_site(&site),
            Err(AssociationError::CookieNotSupported { .. })
        ));
    }

    #[test]
    fn blank_content_fails_the_local_precheck() {
        assert!(matches!(
            validate_cookie_draft("   "),
            Err(CookieContentError::Empty)
        ));
        assert!(validate_cookie_draft("{\"uid\": 1}").is_ok());
    }
}
