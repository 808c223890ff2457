//! Cache key definitions.
//!
//! `Tag` names an entity kind a query result depends on; `QueryKey`
//! identifies one read query by kind and parameters.

use std::fmt;

/// Entity kind used as a dependency marker on query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Subscribe,
    Cookie,
    CookieTarget,
    Weight,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Subscribe => "subscribe",
            Tag::Cookie => "cookie",
            Tag::CookieTarget => "cookie_target",
            Tag::Weight => "weight",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one read query: kind plus parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// All groups and their subscriptions.
    Subs,
    /// Stored cookies, optionally filtered by site.
    Cookies { site_name: Option<String> },
    /// Associations of one cookie.
    CookieTargets { cookie_id: i64 },
    /// Weight schedules for every target.
    Weights,
}

impl QueryKey {
    /// Tags this query's result depends on.
    pub fn tags(&self) -> &'static [Tag] {
        match self {
            QueryKey::Subs => &[Tag::Subscribe],
            QueryKey::Cookies { .. } => &[Tag::Cookie],
            QueryKey::CookieTargets { .. } => &[Tag::CookieTarget],
            QueryKey::Weights => &[Tag::Weight],
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Subs => f.write_str("subs"),
            QueryKey::Cookies { site_name: None } => f.write_str("cookies"),
            QueryKey::Cookies {
                site_name: Some(site),
            } => write!(f, "cookies(site={site})"),
            QueryKey::CookieTargets { cookie_id } => write!(f, "cookie_targets({cookie_id})"),
            QueryKey::Weights => f.write_str("weights"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_equality_includes_parameters() {
        assert_eq!(
            QueryKey::CookieTargets { cookie_id: 3 },
            QueryKey::CookieTargets { cookie_id: 3 }
        );
        assert_ne!(
            QueryKey::CookieTargets { cookie_id: 3 },
            QueryKey::CookieTargets { cookie_id: 4 }
        );
        assert_ne!(
            QueryKey::Cookies { site_name: None },
            QueryKey::Cookies {
                site_name: Some("rss".to_string())
            }
        );
    }

    #[test]
    fn every_key_declares_its_tags() {
        assert_eq!(QueryKey::Subs.tags(), &[Tag::Subscribe]);
        assert_eq!(
            QueryKey::CookieTargets { cookie_id: 1 }.tags(),
            &[Tag::CookieTarget]
        );
        assert_eq!(QueryKey::Weights.tags(), &[Tag::Weight]);
    }
}
