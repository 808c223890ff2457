//! Bidirectional tag index.
//!
//! Tracks which resident queries depend on which entity tags, enabling
//! set-lookup invalidation when a mutation lands.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::util::lock::{rw_read, rw_write};

use super::keys::{QueryKey, Tag};

const SOURCE: &str = "cache::registry";

/// Tracks tag → queries and query → tags mappings.
///
/// The bidirectional mapping enables:
/// - finding every resident query affected by a mutation's invalidation set
/// - cleaning up tag mappings when a query is dropped
pub struct TagIndex {
    tag_to_queries: RwLock<HashMap<Tag, HashSet<QueryKey>>>,
    query_to_tags: RwLock<HashMap<QueryKey, HashSet<Tag>>>,
}

impl TagIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self {
            tag_to_queries: RwLock::new(HashMap::new()),
            query_to_tags: RwLock::new(HashMap::new()),
        }
    }

    /// Register a resident query under its tags.
    ///
    /// Re-registering the same query is idempotent; tags removed from the
    /// new set are cleaned up.
    pub fn register(&self, query: QueryKey, tags: impl IntoIterator<Item = Tag>) {
        let tags: HashSet<Tag> = tags.into_iter().collect();
        let mut t2q = rw_write(&self.tag_to_queries, SOURCE, "register.tags");
        let mut q2t = rw_write(&self.query_to_tags, SOURCE, "register.queries");

        if let Some(previous) = q2t.get(&query) {
            for stale_tag in previous.difference(&tags) {
                if let Some(queries) = t2q.get_mut(stale_tag) {
                    queries.remove(&query);
                    if queries.is_empty() {
                        t2q.remove(stale_tag);
                    }
                }
            }
        }

        for tag in &tags {
            t2q.entry(*tag).or_default().insert(query.clone());
        }
        q2t.insert(query, tags);
    }

    /// All resident queries depending on a tag.
    pub fn queries_for_tag(&self, tag: Tag) -> HashSet<QueryKey> {
        rw_read(&self.tag_to_queries, SOURCE, "queries_for_tag")
            .get(&tag)
            .cloned()
            .unwrap_or_default()
    }

    /// All tags a resident query depends on.
    pub fn tags_for_query(&self, query: &QueryKey) -> HashSet<Tag> {
        rw_read(&self.query_to_tags, SOURCE, "tags_for_query")
            .get(query)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove a query and clean up its tag mappings.
    pub fn unregister(&self, query: &QueryKey) {
        let mut t2q = rw_write(&self.tag_to_queries, SOURCE, "unregister.tags");
        let mut q2t = rw_write(&self.query_to_tags, SOURCE, "unregister.queries");

        if let Some(tags) = q2t.remove(query) {
            for tag in tags {
                if let Some(queries) = t2q.get_mut(&tag) {
                    queries.remove(query);
                    if queries.is_empty() {
                        t2q.remove(&tag);
                    }
                }
            }
        }
    }

    /// Clear all mappings.
    pub fn clear(&self) {
        rw_write(&self.tag_to_queries, SOURCE, "clear.tags").clear();
        rw_write(&self.query_to_tags, SOURCE, "clear.queries").clear();
    }

    /// Number of tags with at least one resident query.
    pub fn tag_count(&self) -> usize {
        rw_read(&self.tag_to_queries, SOURCE, "tag_count").len()
    }

    /// Number of registered queries.
    pub fn query_count(&self) -> usize {
        rw_read(&self.query_to_tags, SOURCE, "query_count").len()
    }
}

impl Default for TagIndex {
    fn default() -> Self {
        Self::new()
    }
}
