use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{failure, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::credential::{CredentialStore, FileCredentialStore};

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Store a bearer token (with or without the Bearer prefix)")]
    Set {
        #[arg(help = "Token value")]
        value: String,
    },

    #[command(about = "Show the stored bearer token")]
    Show {
        #[arg(long, help = "Print the full value instead of a masked one")]
        reveal: bool,
    },

    #[command(about = "Remove the stored bearer token")]
    Clear,
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = FileCredentialStore::new(config::config().storage_file());

    match cmd {
        TokenCommands::Set { value } => {
            if value.trim().is_empty() {
                return Err(failure(&output_format, "Token value cannot be empty", "VALIDATION_ERROR"));
            }
            store.set(value.trim())?;
            output_success(
                &output_format,
                "Token stored",
                Some(json!({ "path": store.path().display().to_string() })),
            )
        }
        TokenCommands::Show { reveal } => {
            let Some(token) = store.get()? else {
                return Err(failure(&output_format, "No bearer token set", "NO_CREDENTIAL"));
            };
            let shown = if reveal { token } else { mask(&token) };

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "token": shown }))?);
                }
                OutputFormat::Text => println!("{}", shown),
            }
            Ok(())
        }
        TokenCommands::Clear => {
            store.clear()?;
            output_success(&output_format, "Token cleared", None)
        }
    }
}

/// Keep the scheme and the last four characters
fn mask(token: &str) -> String {
    let (scheme, secret) = match token.split_once(' ') {
        Some((scheme, secret)) => (format!("{} ", scheme), secret),
        None => (String::new(), token),
    };
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return format!("{}****", scheme);
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", scheme, tail)
}
