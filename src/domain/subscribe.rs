//! Groups and their subscriptions, mirrored from the server.
//!
//! The client never patches these incrementally: every successful fetch or
//! tag-triggered refetch replaces the group's copy wholesale.

use std::collections::BTreeSet;

use serde::Serialize;
use subdesk_api_types::SubscribeItem;

use super::platform::CategoryId;

/// Uniqueness key of one subscription within the whole configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubKey {
    pub group_number: String,
    pub platform_name: String,
    pub target: String,
}

/// One subscription of a group to a platform target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeConfig {
    pub platform_name: String,
    pub target: String,
    /// Resolved display name of the target. Never client-authored: it is
    /// either the result of a successful target resolution or empty.
    pub target_name: String,
    pub categories: BTreeSet<CategoryId>,
    pub tags: BTreeSet<String>,
}

impl SubscribeConfig {
    /// Wire body for add/update calls.
    pub fn to_wire(&self) -> SubscribeItem {
        SubscribeItem {
            platform_name: self.platform_name.clone(),
            target: self.target.clone(),
            target_name: self.target_name.clone(),
            cats: self.categories.iter().copied().collect(),
            tags: self.tags.iter().cloned().collect(),
        }
    }
}

impl From<&SubscribeItem> for SubscribeConfig {
    fn from(item: &SubscribeItem) -> Self {
        Self {
            platform_name: item.platform_name.clone(),
            target: item.target.clone(),
            target_name: item.target_name.clone(),
            categories: item.cats.iter().copied().collect(),
            tags: item.tags.iter().cloned().collect(),
        }
    }
}

/// One managed group and its subscriptions, in server order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub group_number: String,
    pub display_name: String,
    pub subscribes: Vec<SubscribeConfig>,
}

impl Group {
    pub fn sub_key(&self, sub: &SubscribeConfig) -> SubKey {
        SubKey {
            group_number: self.group_number.clone(),
            platform_name: sub.platform_name.clone(),
            target: sub.target.clone(),
        }
    }
}
