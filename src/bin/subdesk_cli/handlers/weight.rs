use subdesk::SubdeskClient;
use subdesk::validate::{WeightDraft, WindowDraft, validate_weight_draft};

use crate::args::WeightAction;
use crate::error::CliError;
use crate::print::print_json;

pub async fn handle(client: &SubdeskClient, action: WeightAction) -> Result<(), CliError> {
    match action {
        WeightAction::List => {
            let weights = client.cache().weights().await?;
            print_json(&*weights)
        }
        WeightAction::Set {
            platform,
            target,
            default_weight,
            windows,
        } => {
            let draft = WeightDraft {
                default_weight,
                windows: windows
                    .iter()
                    .map(|spec| parse_window(spec))
                    .collect::<Result<Vec<_>, _>>()?,
            };
            let config = validate_weight_draft(&draft)?;
            client
                .cache()
                .update_weight(&platform, &target, &config)
                .await?;
            Ok(())
        }
    }
}

/// Parse a `HH:MM..HH:MM=WEIGHT` window spec.
fn parse_window(spec: &str) -> Result<WindowDraft, CliError> {
    let bad = || CliError::InvalidInput(format!("window `{spec}` is not HH:MM..HH:MM=WEIGHT"));
    let (range, weight) = spec.rsplit_once('=').ok_or_else(bad)?;
    let (start, end) = range.split_once("..").ok_or_else(bad)?;
    let weight = weight.parse::<i32>().map_err(|_| bad())?;
    Ok(WindowDraft {
        start: start.to_string(),
        end: end.to_string(),
        weight,
    })
}
