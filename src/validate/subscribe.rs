//! Subscription draft validation and normalization.

use std::collections::BTreeSet;

use crate::domain::{CategoryId, DEFAULT_TARGET, Platform, SubscribeConfig};

use super::error::{FieldErrorKind, FieldErrors};

/// Operator-supplied subscription draft, before normalization.
#[derive(Debug, Clone, Default)]
pub struct SubscribeDraft {
    pub target: String,
    pub categories: BTreeSet<CategoryId>,
    pub tags: BTreeSet<String>,
}

/// Validate a draft against the platform's declared capabilities and
/// normalize it into a submittable `SubscribeConfig`.
///
/// Normalization rules:
/// - platforms without targets force `target` to the `"default"` sentinel
///   and never take operator input for it;
/// - tags are stripped (not rejected) when the platform does not allow
///   them;
/// - `target_name` starts empty on target-bearing platforms — it is only
///   ever filled by a successful resolution (`TargetResolver`), and the
///   caller must re-resolve whenever the target changes.
pub fn validate_subscribe_draft(
    draft: &SubscribeDraft,
    platform: &Platform,
) -> Result<SubscribeConfig, FieldErrors> {
    let mut errors = FieldErrors::new();

    let (target, target_name) = if platform.requires_target_input() {
        let target = draft.target.trim();
        if target.is_empty() {
            errors.push(
                "target",
                FieldErrorKind::Required,
                "this platform requires a target identifier",
            );
        }
        (target.to_string(), String::new())
    } else {
        (DEFAULT_TARGET.to_string(), platform.display_name.clone())
    };

    let choices = platform.category_choices();
    let unknown: Vec<CategoryId> = draft
        .categories
        .iter()
        .copied()
        .filter(|id| !choices.contains_key(id))
        .collect();
    if !unknown.is_empty() {
        let message = if choices.is_empty() {
            "this platform declares no categories".to_string()
        } else {
            format!("unknown categories: {unknown:?}")
        };
        errors.push("categories", FieldErrorKind::Invalid, message);
    }

    let tags = if platform.tags_allowed() {
        draft.tags.clone()
    } else {
        BTreeSet::new()
    };

    errors.into_result()?;
    Ok(SubscribeConfig {
        platform_name: platform.platform_name.clone(),
        target,
        target_name,
        categories: draft.categories.clone(),
        tags,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn platform(has_target: bool, tags_enabled: bool) -> Platform {
        Platform {
            platform_name: "weibo".to_string(),
            display_name: "Weibo".to_string(),
            site_name: "weibo.com".to_string(),
            has_target,
            categories: BTreeMap::from([(1, "post".to_string())]),
            tags_enabled,
        }
    }

    #[test]
    fn empty_target_on_target_bearing_platform_is_required() {
        let draft = SubscribeDraft {
            target: "".to_string(),
            categories: BTreeSet::from([1]),
            tags: BTreeSet::from(["x".to_string()]),
        };

        let errors = validate_subscribe_draft(&draft, &platform(true, false))
            .expect_err("empty target must be rejected");
        assert_eq!(errors.kind_of("target"), Some(FieldErrorKind::Required));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn tags_are_stripped_when_platform_disallows_them() {
        let draft = SubscribeDraft {
            target: "12345".to_string(),
            categories: BTreeSet::from([1]),
            tags: BTreeSet::from(["x".to_string()]),
        };

        let config =
            validate_subscribe_draft(&draft, &platform(true, false)).expect("draft is valid");
        assert!(config.tags.is_empty());
        assert_eq!(config.target, "12345");
        assert_eq!(config.target_name, "");
    }

    #[test]
    fn no_target_platform_forces_the_sentinel() {
        let draft = SubscribeDraft {
            target: "ignored-operator-input".to_string(),
            categories: BTreeSet::from([1]),
            tags: BTreeSet::new(),
        };

        let config =
            validate_subscribe_draft(&draft, &platform(false, true)).expect("draft is valid");
        assert_eq!(config.target, DEFAULT_TARGET);
        assert_eq!(config.target_name, "Weibo");
    }

    #[test]
    fn unknown_categories_are_invalid() {
        let draft = SubscribeDraft {
            target: "12345".to_string(),
            categories: BTreeSet::from([1, 9]),
            tags: BTreeSet::new(),
        };

        let errors = validate_subscribe_draft(&draft, &platform(true, true))
            .expect_err("unknown category must be rejected");
        assert_eq!(errors.kind_of("categories"), Some(FieldErrorKind::Invalid));
    }

    #[test]
    fn categories_must_be_empty_when_platform_has_none() {
        let mut bare = platform(true, true);
        bare.categories.clear();

        let draft = SubscribeDraft {
            target: "12345".to_string(),
            categories: BTreeSet::from([1]),
            tags: BTreeSet::new(),
        };
        assert!(validate_subscribe_draft(&draft, &bare).is_err());

        let empty = SubscribeDraft {
            target: "12345".to_string(),
            categories: BTreeSet::new(),
            tags: BTreeSet::new(),
        };
        assert!(validate_subscribe_draft(&empty, &bare).is_ok());
    }
}
