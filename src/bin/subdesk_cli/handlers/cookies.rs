use std::path::PathBuf;

use subdesk::SubdeskClient;
use subdesk::validate::{validate_cookie_content, validate_cookie_site};

use crate::args::CookiesAction;
use crate::error::CliError;
use crate::io::read_opt_value;
use crate::print::print_json;

pub async fn handle(client: &SubdeskClient, action: CookiesAction) -> Result<(), CliError> {
    match action {
        CookiesAction::List { site } => {
            let cookies = client.cache().cookies(site.as_deref()).await?;
            print_json(&*cookies)
        }
        CookiesAction::Add {
            site,
            content,
            content_file,
        } => {
            let content = probe(client, &site, content, content_file).await?;
            client.cache().new_cookie(&site, &content).await?;
            Ok(())
        }
        CookiesAction::Del { id } => {
            client.cache().del_cookie(id).await?;
            Ok(())
        }
        CookiesAction::Validate {
            site,
            content,
            content_file,
        } => {
            probe(client, &site, content, content_file).await?;
            println!("ok");
            Ok(())
        }
    }
}

/// Gate on the site's cookie support, then run the round-trip content
/// probe. Returns the content ready for submission.
async fn probe(
    client: &SubdeskClient,
    site_name: &str,
    content: Option<String>,
    content_file: Option<PathBuf>,
) -> Result<String, CliError> {
    let site = client.registry().site(site_name)?;
    validate_cookie_site(&site)?;

    let content = read_opt_value(content, content_file)?;
    validate_cookie_content(client.transport().as_ref(), site_name, &content).await?;
    Ok(content)
}
