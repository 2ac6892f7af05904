mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use content_sync::ContentSync;
use content_sync_clevertap::ClevertapClient;

use crate::config::{Overrides, PASSCODE_ENV};

#[derive(Parser)]
#[command(name = "content-sync")]
#[command(about = "Sync CleverTap templates and content blocks with a translation pipeline")]
struct Cli {
    /// Log progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Account id (overrides the config file)
    #[arg(long, global = true)]
    account_id: Option<String>,
    /// Data center region, e.g. eu1 (overrides the config file)
    #[arg(long, global = true)]
    region: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the configured credentials
    Auth,
    /// List every translatable item of the account
    List,
    /// Show display rows for the identifiers in a JSON file
    Items {
        /// JSON array of item identifiers, `-` for stdin
        file: PathBuf,
    },
    /// Fetch per-locale text for the identifiers in a JSON file
    Content {
        /// Comma-separated locale codes (defaults to the configured locales)
        #[arg(long, value_delimiter = ',')]
        locales: Vec<String>,
        /// JSON array of item identifiers, `-` for stdin
        file: PathBuf,
    },
    /// Publish translated content items from a JSON file
    Publish {
        /// JSON array of content items, `-` for stdin
        file: PathBuf,
    },
    /// Show the locales available for translation
    Locales,
    /// Show the columns of a display row
    Schema,
}

fn build_engine(app_config: &config::AppConfig, overrides: &Overrides) -> Result<ContentSync> {
    let client_config = app_config.resolve(overrides, std::env::var(PASSCODE_ENV).ok())?;
    let client = ClevertapClient::new(client_config).context("invalid CleverTap configuration")?;
    Ok(ContentSync::new(Arc::new(client)))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let app_config = config::load_config();
    let overrides = Overrides {
        account_id: cli.account_id,
        region: cli.region,
    };

    if let Command::Schema = cli.command {
        return commands::schema::run()?.print();
    }

    let engine = build_engine(&app_config, &overrides)?;
    let output = match cli.command {
        Command::Auth => commands::auth::run(&engine).await?,
        Command::List => commands::list::run(&engine).await?,
        Command::Items { file } => commands::items::run(&engine, &file).await?,
        Command::Content { locales, file } => {
            commands::content::run(&engine, &locales, &app_config.locale_codes(), &file).await?
        }
        Command::Publish { file } => commands::publish::run(&engine, &file).await?,
        Command::Locales => commands::locales::run(&engine).await?,
        Command::Schema => commands::schema::run()?,
    };

    output.print()
}
