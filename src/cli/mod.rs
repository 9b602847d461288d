pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "asset-desk")]
#[command(about = "Asset Desk CLI - client for the asset-management API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Manage the stored bearer token")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Log in and store the returned bearer token")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (read from ASSET_DESK_PASSWORD if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Login endpoint URL (defaults to <api base>/api/auth/login)")]
        url: Option<String>,
    },

    #[command(about = "Forget the stored bearer token")]
    Logout,

    #[command(about = "List asset types or resolve one type label")]
    Types {
        #[arg(long, help = "Resolve the label for this id")]
        id: Option<i64>,
    },

    #[command(about = "List asset locations or resolve one location label")]
    Locations {
        #[arg(long, help = "Resolve the label for this id")]
        id: Option<i64>,
    },

    #[command(about = "List asset employees or resolve one employee label")]
    Employees {
        #[arg(long, help = "Resolve the label for this id")]
        id: Option<i64>,
    },

    #[command(about = "Search the employee directory")]
    Search {
        #[arg(help = "Search text (omit to list everyone)")]
        query: Option<String>,
        #[arg(long, help = "Debounce delay in milliseconds (defaults to ASSET_DESK_SEARCH_DEBOUNCE_MS)")]
        delay_ms: Option<u64>,
    },

    #[command(about = "Asset operations")]
    Asset {
        #[command(subcommand)]
        cmd: commands::asset::AssetCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
        Commands::Login { username, password, url } => {
            commands::login::handle(username, password, url, output_format).await
        }
        Commands::Logout => commands::login::logout(output_format).await,
        Commands::Types { id } => {
            commands::lookup::handle(crate::lookup::ASSET_TYPES, id, output_format).await
        }
        Commands::Locations { id } => {
            commands::lookup::handle(crate::lookup::ASSET_LOCATIONS, id, output_format).await
        }
        Commands::Employees { id } => {
            commands::lookup::handle(crate::lookup::ASSET_EMPLOYEES, id, output_format).await
        }
        Commands::Search { query, delay_ms } => {
            commands::search::handle(query, delay_ms, output_format).await
        }
        Commands::Asset { cmd } => commands::asset::handle(cmd, output_format).await,
    }
}
