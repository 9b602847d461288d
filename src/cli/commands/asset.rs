use clap::{Args, Subcommand};
use serde_json::{json, Value};

use crate::assets::{AssetDraft, AssetService};
use crate::cli::utils::{build_client, display_value, failure, output_empty_collection, output_record, output_success};
use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::lookup::ResourceLookup;

#[derive(Subcommand)]
pub enum AssetCommands {
    #[command(about = "List assets")]
    List {
        #[arg(long, help = "Only assets assigned to this employee", conflicts_with = "location")]
        employee: Option<i64>,
        #[arg(long, help = "Only assets at this location")]
        location: Option<i64>,
    },

    #[command(about = "Show one asset with resolved type, location and employee labels")]
    Get {
        #[arg(help = "Asset id")]
        id: i64,
    },

    #[command(about = "Create an asset")]
    Add {
        #[command(flatten)]
        fields: AssetFields,
    },

    #[command(about = "Update an asset; omitted fields keep their current values")]
    Update {
        #[arg(help = "Asset id")]
        id: i64,
        #[command(flatten)]
        fields: AssetFields,
    },

    #[command(about = "Mark an asset as decommissioned")]
    Decommission {
        #[arg(help = "Asset id")]
        id: i64,
    },
}

#[derive(Args)]
pub struct AssetFields {
    #[arg(long = "type", help = "Asset type id")]
    pub type_id: Option<i64>,
    #[arg(long = "location", help = "Location id")]
    pub location_id: Option<i64>,
    #[arg(long = "employee", help = "Employee id")]
    pub employee_id: Option<i64>,
    #[arg(long, help = "Free-form notes")]
    pub notes: Option<String>,
}

impl AssetFields {
    fn apply(self, draft: &mut AssetDraft) {
        if self.type_id.is_some() {
            draft.type_id = self.type_id;
        }
        if self.location_id.is_some() {
            draft.location_id = self.location_id;
        }
        if self.employee_id.is_some() {
            draft.employee_id = self.employee_id;
        }
        if self.notes.is_some() {
            draft.notes = self.notes;
        }
    }
}

pub async fn handle(cmd: AssetCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = build_client()?;
    let assets = AssetService::new(client.clone());

    match cmd {
        AssetCommands::List { employee, location } => {
            let result = match (employee, location) {
                (Some(id), _) => assets.list_by_employee(id).await,
                (None, Some(id)) => assets.list_by_location(id).await,
                (None, None) => assets.list().await,
            };
            let listing = result.map_err(|e| service_failure(&assets, &output_format, e))?;
            let records = listing.as_array().cloned().unwrap_or_default();

            if records.is_empty() {
                return output_empty_collection(&output_format, "assets", "No assets found");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&records)?);
                }
                OutputFormat::Text => {
                    let labels = Labels::load(&client).await;
                    for record in &records {
                        println!("{}", labels.summary_line(record));
                    }
                }
            }
            Ok(())
        }
        AssetCommands::Get { id } => {
            let record = assets
                .get(id)
                .await
                .map_err(|e| service_failure(&assets, &output_format, e))?;
            let labels = Labels::load(&client).await;
            output_record(&output_format, &labels.annotate(record))
        }
        AssetCommands::Add { fields } => {
            let mut draft = AssetDraft::default();
            fields.apply(&mut draft);

            let created = assets
                .create(&draft)
                .await
                .map_err(|e| service_failure(&assets, &output_format, e))?;
            let id = created.get("id").map(display_value).unwrap_or_default();
            output_success(&output_format, &format!("Asset {} created", id), Some(json!({ "asset": created })))
        }
        AssetCommands::Update { id, fields } => {
            let current = assets
                .get(id)
                .await
                .map_err(|e| service_failure(&assets, &output_format, e))?;
            let mut draft = AssetDraft::from_record(&current);
            fields.apply(&mut draft);

            let updated = assets
                .update(id, &draft)
                .await
                .map_err(|e| service_failure(&assets, &output_format, e))?;
            output_success(&output_format, &format!("Asset {} updated", id), Some(json!({ "asset": updated })))
        }
        AssetCommands::Decommission { id } => {
            let updated = assets
                .decommission(id)
                .await
                .map_err(|e| service_failure(&assets, &output_format, e))?;
            output_success(
                &output_format,
                &format!("Asset {} decommissioned", id),
                Some(json!({ "asset": updated })),
            )
        }
    }
}

/// Report the service's display message rather than the raw error
fn service_failure(assets: &AssetService, output_format: &OutputFormat, err: ClientError) -> anyhow::Error {
    let message = assets.error().unwrap_or_else(|| err.to_string());
    failure(output_format, &message, err.error_code())
}

/// The three lookups an asset record refers to, loaded concurrently.
/// A lookup that fails still answers with its fallback labels.
struct Labels {
    types: ResourceLookup,
    locations: ResourceLookup,
    employees: ResourceLookup,
}

impl Labels {
    async fn load(client: &ApiClient) -> Self {
        let labels = Self {
            types: ResourceLookup::asset_types(client.clone()),
            locations: ResourceLookup::asset_locations(client.clone()),
            employees: ResourceLookup::asset_employees(client.clone()),
        };
        futures::join!(labels.types.fetch(), labels.locations.fetch(), labels.employees.fetch());
        labels
    }

    fn label(lookup: &ResourceLookup, record: &Value, field: &str) -> Option<String> {
        record
            .get(field)
            .and_then(Value::as_i64)
            .map(|id| lookup.get_label(id))
    }

    fn annotate(&self, mut record: Value) -> Value {
        let type_label = Self::label(&self.types, &record, "type_id");
        let location_label = Self::label(&self.locations, &record, "location_id");
        let employee_label = Self::label(&self.employees, &record, "employee_id");

        if let Some(fields) = record.as_object_mut() {
            fields.insert("type".to_string(), json!(type_label));
            fields.insert("location".to_string(), json!(location_label));
            fields.insert("employee".to_string(), json!(employee_label));
        }
        record
    }

    fn summary_line(&self, record: &Value) -> String {
        let id = record.get("id").map(display_value).unwrap_or_default();
        let kind = Self::label(&self.types, record, "type_id").unwrap_or_else(|| "-".to_string());
        let holder = Self::label(&self.employees, record, "employee_id")
            .or_else(|| Self::label(&self.locations, record, "location_id"))
            .unwrap_or_else(|| "unassigned".to_string());
        let status = match record.get("is_decommissioned").and_then(Value::as_i64) {
            Some(flag) if flag != 0 => " [decommissioned]",
            _ => "",
        };
        format!("{:>6}  {:<24} {}{}", id, kind, holder, status)
    }
}
