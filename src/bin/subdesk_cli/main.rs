//! subdesk-cli: operator command line over the subscription admin API.

mod args;
mod error;
mod handlers;
mod io;
mod print;

use clap::Parser;

use subdesk::SubdeskClient;
use subdesk::config::Settings;
use subdesk::infra::telemetry;

use args::{Cli, Commands};
use error::CliError;
use handlers::{conf, cookie_targets, cookies, subs, weight};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config_file.as_deref())?;
    telemetry::init(&settings.logging)?;

    let client = SubdeskClient::new(&settings)?;
    if let Some(code) = &cli.auth_code {
        client.login(code).await?;
    }
    client.load_capabilities().await?;

    match cli.command {
        Commands::Conf(cmd) => conf::handle(&client, cmd.action).await?,
        Commands::Subs(cmd) => subs::handle(&client, cmd.action).await?,
        Commands::Cookies(cmd) => cookies::handle(&client, cmd.action).await?,
        Commands::CookieTargets(cmd) => cookie_targets::handle(&client, cmd.action).await?,
        Commands::Weight(cmd) => weight::handle(&client, cmd.action).await?,
    }

    Ok(())
}
