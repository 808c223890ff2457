use std::collections::BTreeSet;

use subdesk::SubdeskClient;
use subdesk::domain::SubscribeConfig;
use subdesk::validate::{SubscribeDraft, validate_subscribe_draft};

use crate::args::SubsAction;
use crate::error::CliError;
use crate::print::print_json;

pub async fn handle(client: &SubdeskClient, action: SubsAction) -> Result<(), CliError> {
    match action {
        SubsAction::List => {
            let groups = client.cache().subscriptions().await?;
            print_json(&*groups)
        }
        SubsAction::Add {
            group,
            platform,
            target,
            categories,
            tags,
        } => {
            let config = build(client, &platform, target, categories, tags).await?;
            client.cache().new_sub(&group, &config).await?;
            print_json(&config)
        }
        SubsAction::Update {
            group,
            platform,
            target,
            categories,
            tags,
        } => {
            let config = build(client, &platform, target, categories, tags).await?;
            client.cache().update_sub(&group, &config).await?;
            print_json(&config)
        }
        SubsAction::Del {
            group,
            platform,
            target,
        } => {
            client.cache().del_sub(&group, &platform, &target).await?;
            Ok(())
        }
    }
}

/// Validate the draft against the platform's capabilities, then run the
/// round-trip target resolution before the configuration may be submitted.
async fn build(
    client: &SubdeskClient,
    platform_name: &str,
    target: Option<String>,
    categories: Vec<i32>,
    tags: Vec<String>,
) -> Result<SubscribeConfig, CliError> {
    let platform = client.registry().platform(platform_name)?;
    let draft = SubscribeDraft {
        target: target.unwrap_or_default(),
        categories: categories.into_iter().collect(),
        tags: tags.into_iter().collect::<BTreeSet<String>>(),
    };

    let mut config = validate_subscribe_draft(&draft, &platform)?;
    if platform.requires_target_input() {
        config.target_name = client
            .resolver()
            .resolve(&platform.platform_name, &config.target)
            .await?;
    }
    Ok(config)
}
