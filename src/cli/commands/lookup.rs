use serde_json::json;

use crate::cli::utils::{build_client, failure, output_empty_collection};
use crate::cli::OutputFormat;
use crate::lookup::{LookupSpec, ResourceLookup};

pub async fn handle(spec: LookupSpec, id: Option<i64>, output_format: OutputFormat) -> anyhow::Result<()> {
    let lookup = ResourceLookup::new(build_client()?, spec);
    lookup.fetch().await;

    if let Some(message) = lookup.error() {
        return Err(failure(&output_format, &message, "FETCH_FAILED"));
    }

    if let Some(id) = id {
        let label = lookup.get_label(id);
        match output_format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&json!({ "id": id, "label": label }))?);
            }
            OutputFormat::Text => println!("{}", label),
        }
        return Ok(());
    }

    let items = lookup.items();
    if items.is_empty() {
        return output_empty_collection(
            &output_format,
            spec.resource,
            &format!("No {} found", spec.resource),
        );
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => {
            for (id, label) in lookup.lookup_map() {
                println!("{:>6}  {}", id, label);
            }
            println!("\n{} {}", items.len(), spec.resource);
        }
    }
    Ok(())
}
