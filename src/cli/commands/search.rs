use std::time::Duration;

use serde_json::{json, Value};

use crate::cli::utils::{build_client, failure};
use crate::cli::OutputFormat;
use crate::config;
use crate::search::{full_name, result_summary, EmployeeDirectory};

pub async fn handle(query: Option<String>, delay_ms: Option<u64>, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let delay = delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.search_debounce());

    let directory = EmployeeDirectory::with_settings(build_client()?, delay, config.employee_page_limit);
    directory.set_query(query.as_deref().unwrap_or_default());
    directory.settle().await;

    if let Some(message) = directory.error() {
        return Err(failure(&output_format, &message, "FETCH_FAILED"));
    }

    let snapshot = directory.snapshot();
    let employees = snapshot.data.employees;
    let summary = result_summary(employees.len(), &snapshot.data.query);

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "query": snapshot.data.query,
                    "summary": summary,
                    "employees": employees,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", summary);
            for employee in &employees {
                let id = employee.get("id").unwrap_or(&Value::Null);
                let email = employee.get("email").and_then(Value::as_str).unwrap_or("");
                println!("{:>6}  {:<30} {}", id, full_name(employee), email);
            }
        }
    }
    Ok(())
}
