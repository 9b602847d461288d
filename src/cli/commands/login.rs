use serde_json::json;

use crate::auth::LoginSession;
use crate::cli::utils::{build_client, failure, output_success};
use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::config;
use crate::error::ClientError;

const PASSWORD_ENV: &str = "ASSET_DESK_PASSWORD";

pub async fn handle(
    username: String,
    password: Option<String>,
    url: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let password = password
        .or_else(|| std::env::var(PASSWORD_ENV).ok())
        .unwrap_or_default();

    // An explicit login URL works without a configured API base
    let client = match &url {
        Some(url) => {
            if !url.trim().is_empty() {
                url::Url::parse(url.trim())
                    .map_err(|e| anyhow::anyhow!("Invalid login URL '{}': {}", url, e))?;
            }
            ApiClient::from_config(config::config())?
        }
        None => build_client()?,
    };

    let session = LoginSession::new(client);
    match session.login(&username, &password, url.as_deref()).await {
        Ok(_) => output_success(
            &output_format,
            &format!("Logged in as {}", username),
            Some(json!({ "username": username })),
        ),
        Err(e) => {
            let message = session.error().unwrap_or_else(|| e.to_string());
            Err(failure(&output_format, &message, e.error_code()))
        }
    }
}

pub async fn logout(output_format: OutputFormat) -> anyhow::Result<()> {
    let session = LoginSession::new(ApiClient::from_config(config::config())?);
    session
        .logout()
        .map_err(|e: ClientError| failure(&output_format, &e.to_string(), e.error_code()))?;
    output_success(&output_format, "Logged out", None)
}
