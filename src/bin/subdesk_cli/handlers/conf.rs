use subdesk::SubdeskClient;

use crate::args::ConfAction;
use crate::error::CliError;
use crate::print::print_json;

pub async fn handle(client: &SubdeskClient, action: ConfAction) -> Result<(), CliError> {
    match action {
        ConfAction::Platforms => {
            let platforms = client.registry().platforms()?;
            let platforms: Vec<_> = platforms.iter().map(|platform| platform.as_ref()).collect();
            print_json(&platforms)
        }
        ConfAction::Sites => {
            let sites = client.registry().sites()?;
            let sites: Vec<_> = sites.iter().map(|site| site.as_ref()).collect();
            print_json(&sites)
        }
    }
}
