//! Command-line surface for `subdesk-cli`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "subdesk-cli", version, about = "Subscription admin API CLI", long_about = None)]
pub struct Cli {
    /// Path to a configuration file (defaults to ./subdesk.toml when present)
    #[arg(long, env = "SUBDESK_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<String>,

    /// One-time auth code (CLI flag intentionally disabled to avoid shell history leaks)
    #[arg(hide = true, env = "SUBDESK_AUTH_CODE")]
    pub auth_code: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Platform and site capabilities
    Conf(ConfCmd),
    /// Group subscription management
    Subs(SubsCmd),
    /// Credential cookie management
    Cookies(CookiesCmd),
    /// Cookie ↔ target associations
    CookieTargets(CookieTargetsCmd),
    /// Scheduling weights
    Weight(WeightCmd),
}

#[derive(Parser, Debug)]
pub struct ConfCmd {
    #[command(subcommand)]
    pub action: ConfAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfAction {
    /// List declared platforms and their capabilities
    Platforms,
    /// List declared sites
    Sites,
}

#[derive(Parser, Debug)]
pub struct SubsCmd {
    #[command(subcommand)]
    pub action: SubsAction,
}

#[derive(Subcommand, Debug)]
pub enum SubsAction {
    /// List all groups and their subscriptions
    List,
    /// Add a subscription to a group
    Add {
        #[arg(long)]
        group: String,
        #[arg(long)]
        platform: String,
        /// Target identifier; omit for platforms without targets
        #[arg(long)]
        target: Option<String>,
        /// Category id, repeatable
        #[arg(long = "category")]
        categories: Vec<i32>,
        /// Free-form tag, repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Replace an existing subscription's categories and tags
    Update {
        #[arg(long)]
        group: String,
        #[arg(long)]
        platform: String,
        #[arg(long)]
        target: Option<String>,
        #[arg(long = "category")]
        categories: Vec<i32>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Remove a subscription from a group
    Del {
        #[arg(long)]
        group: String,
        #[arg(long)]
        platform: String,
        #[arg(long)]
        target: String,
    },
}

#[derive(Parser, Debug)]
pub struct CookiesCmd {
    #[command(subcommand)]
    pub action: CookiesAction,
}

#[derive(Subcommand, Debug)]
pub enum CookiesAction {
    /// List stored cookies
    List {
        #[arg(long)]
        site: Option<String>,
    },
    /// Store a new cookie after probing it against the site
    Add {
        #[arg(long)]
        site: String,
        /// Cookie content inline; prefer --content-file for long payloads
        #[arg(long)]
        content: Option<String>,
        /// Read cookie content from a file
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
    /// Delete a cookie (associations are dropped with it)
    Del {
        #[arg(long)]
        id: i64,
    },
    /// Probe cookie content against the site without storing it
    Validate {
        #[arg(long)]
        site: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
pub struct CookieTargetsCmd {
    #[command(subcommand)]
    pub action: CookieTargetsAction,
}

#[derive(Subcommand, Debug)]
pub enum CookieTargetsAction {
    /// List the targets a cookie is attached to
    List {
        #[arg(long)]
        cookie_id: i64,
    },
    /// Attach a cookie to a platform target
    Add {
        #[arg(long)]
        cookie_id: i64,
        #[arg(long)]
        platform: String,
        #[arg(long)]
        target: String,
    },
    /// Detach a cookie from a platform target
    Del {
        #[arg(long)]
        cookie_id: i64,
        #[arg(long)]
        platform: String,
        #[arg(long)]
        target: String,
    },
}

#[derive(Parser, Debug)]
pub struct WeightCmd {
    #[command(subcommand)]
    pub action: WeightAction,
}

#[derive(Subcommand, Debug)]
pub enum WeightAction {
    /// List weight schedules for every target
    List,
    /// Replace the weight schedule of one target
    Set {
        #[arg(long)]
        platform: String,
        #[arg(long)]
        target: String,
        #[arg(long)]
        default_weight: i32,
        /// Time window as `HH:MM..HH:MM=WEIGHT`, repeatable, evaluated in
        /// order with the last matching window winning
        #[arg(long = "window")]
        windows: Vec<String>,
    },
}
