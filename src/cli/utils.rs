use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::config;

/// Client built from the process configuration.
///
/// A relative (empty) API base only works behind the reverse proxy, which a
/// command-line process never has.
pub fn build_client() -> anyhow::Result<ApiClient> {
    let config = config::config();
    if config.api_base.is_empty() {
        anyhow::bail!("No API base configured; set ASSET_DESK_API_BASE (e.g. http://127.0.0.1:8000)");
    }
    url::Url::parse(&config.api_base)
        .map_err(|e| anyhow::anyhow!("Invalid API base '{}': {}", config.api_base, e))?;

    Ok(ApiClient::from_config(config)?)
}

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Error to return from a command handler. JSON mode also prints the
/// structured error on stdout; the binary reports the error on stderr.
pub fn failure(output_format: &OutputFormat, message: &str, error_code: &str) -> anyhow::Error {
    if let OutputFormat::Json = output_format {
        if let Err(e) = output_error(output_format, message, Some(error_code)) {
            return e;
        }
    }
    anyhow::anyhow!("{}", message)
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output a single record; text mode prints one `key: value` line per field
pub fn output_record(output_format: &OutputFormat, record: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        OutputFormat::Text => match record.as_object() {
            Some(fields) => {
                for (key, value) in fields {
                    println!("{:<20} {}", format!("{}:", key), display_value(value));
                }
            }
            None => println!("{}", display_value(record)),
        },
    }
    Ok(())
}

/// Strings without quotes, null as a dash, everything else as JSON
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
