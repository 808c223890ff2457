//! Capability bootstrap and the full add-subscription control flow:
//! registry → validation → round-trip resolution → mutation → refetch.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use subdesk::SubdeskClient;
use subdesk::domain::DEFAULT_TARGET;
use subdesk::registry::RegistryError;
use subdesk::session::Session;
use subdesk::validate::{SubscribeDraft, validate_subscribe_draft};

use common::MockApi;

fn client_over(mock: &Arc<MockApi>) -> SubdeskClient {
    SubdeskClient::with_transport(mock.clone(), Arc::new(Session::new()))
}

#[tokio::test]
async fn capabilities_load_once() {
    let mock = MockApi::new();
    let client = client_over(&mock);

    client.load_capabilities().await.expect("first load");
    let weibo = client.registry().platform("weibo").expect("declared platform");
    assert!(weibo.has_target);
    assert_eq!(weibo.site_name, "weibo.com");
    assert!(!client.registry().site("rss").expect("declared site").cookie_enabled);

    let again = client.load_capabilities().await;
    assert!(matches!(again, Err(RegistryError::AlreadyLoaded)));
    assert_eq!(mock.calls("global_conf"), 1, "no refetch on the second load");
}

#[tokio::test]
async fn reads_before_load_are_rejected() {
    let mock = MockApi::new();
    let client = client_over(&mock);

    assert!(matches!(
        client.registry().platform("weibo"),
        Err(RegistryError::NotLoaded)
    ));
}

#[tokio::test]
async fn add_subscription_flow_end_to_end() {
    let mock = MockApi::new();
    mock.seed_group("10010", "ops group");
    mock.set_target_name("weibo", "111", Some("Some Account"));
    let client = client_over(&mock);
    client.load_capabilities().await.expect("capabilities load");

    // Form flow: validate the draft, resolve the target, submit.
    let platform = client.registry().platform("weibo").expect("platform");
    let draft = SubscribeDraft {
        target: "111".to_string(),
        categories: BTreeSet::from([1]),
        tags: BTreeSet::from(["tech".to_string()]),
    };
    let mut config = validate_subscribe_draft(&draft, &platform).expect("draft valid");
    assert_eq!(config.target_name, "", "resolution has not run yet");

    config.target_name = client
        .resolver()
        .resolve(&platform.platform_name, &config.target)
        .await
        .expect("target exists");

    client
        .cache()
        .new_sub("10010", &config)
        .await
        .expect("subscription stored");

    let groups = client.cache().subscriptions().await.expect("listing");
    let group = groups
        .iter()
        .find(|group| group.group_number == "10010")
        .expect("seeded group");
    assert_eq!(group.subscribes.len(), 1);
    assert_eq!(group.subscribes[0].target_name, "Some Account");
    assert_eq!(group.subscribes[0].tags, BTreeSet::from(["tech".to_string()]));
}

#[tokio::test]
async fn no_target_platform_submits_the_sentinel() {
    let mock = MockApi::new();
    mock.seed_group("10010", "ops group");
    let client = client_over(&mock);
    client.load_capabilities().await.expect("capabilities load");

    let platform = client.registry().platform("news").expect("platform");
    let draft = SubscribeDraft {
        target: "operator typed something anyway".to_string(),
        categories: BTreeSet::new(),
        tags: BTreeSet::new(),
    };
    let config = validate_subscribe_draft(&draft, &platform).expect("draft valid");
    assert_eq!(config.target, DEFAULT_TARGET);
    assert_eq!(config.target_name, "Daily News");

    client
        .cache()
        .new_sub("10010", &config)
        .await
        .expect("subscription stored");
    assert_eq!(mock.calls("target_name"), 0, "no resolution round trip");
}
