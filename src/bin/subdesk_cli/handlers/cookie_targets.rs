use subdesk::SubdeskClient;
use subdesk::validate::{validate_cookie_site, validate_cookie_target_association};

use crate::args::CookieTargetsAction;
use crate::error::CliError;
use crate::print::print_json;

pub async fn handle(client: &SubdeskClient, action: CookieTargetsAction) -> Result<(), CliError> {
    match action {
        CookieTargetsAction::List { cookie_id } => {
            let targets = client.cache().cookie_targets(cookie_id).await?;
            print_json(&*targets)
        }
        CookieTargetsAction::Add {
            cookie_id,
            platform,
            target,
        } => {
            let platform = client.registry().platform(&platform)?;
            let site = client.registry().site(&platform.site_name)?;
            validate_cookie_site(&site)?;

            let cookies = client.cache().cookies(None).await?;
            let cookie = cookies
                .iter()
                .find(|cookie| cookie.id == cookie_id)
                .ok_or_else(|| {
                    CliError::InvalidInput(format!("no cookie with id {cookie_id}"))
                })?;
            validate_cookie_target_association(cookie, &platform)?;

            client
                .cache()
                .new_cookie_target(&platform.platform_name, &target, cookie_id)
                .await?;
            Ok(())
        }
        CookieTargetsAction::Del {
            cookie_id,
            platform,
            target,
        } => {
            client
                .cache()
                .del_cookie_target(&platform, &target, cookie_id)
                .await?;
            Ok(())
        }
    }
}
