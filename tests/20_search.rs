mod common;

use std::time::Duration;

use anyhow::Result;
use asset_desk::search::{full_name, result_summary, EmployeeDirectory};

use common::{StubBackend, TOKEN};

const DELAY: Duration = Duration::from_millis(50);

#[tokio::test]
async fn debounced_query_sends_only_the_last_value() -> Result<()> {
    let backend = StubBackend::spawn().await?;
    let directory = EmployeeDirectory::with_settings(backend.client(Some(TOKEN))?, DELAY, 1000);

    directory.set_query("j");
    directory.set_query("jo");
    directory.set_query("  john ");
    directory.settle().await;

    let queries = backend.employee_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].get("q").map(String::as_str), Some("john"));
    assert_eq!(queries[0].get("limit").map(String::as_str), Some("1000"));

    let names: Vec<String> = directory.employees().iter().map(full_name).collect();
    assert_eq!(names, vec!["John Doe".to_string(), "Johnny Appleseed".to_string()]);
    assert_eq!(directory.query(), "john");
    assert_eq!(
        result_summary(names.len(), &directory.query()),
        "Showing 2 employees matching \"john\""
    );
    Ok(())
}

#[tokio::test]
async fn blank_query_lists_everyone_within_limit() -> Result<()> {
    let backend = StubBackend::spawn().await?;
    let directory = EmployeeDirectory::with_settings(backend.client(Some(TOKEN))?, DELAY, 3);

    directory.fetch("   ").await;

    let queries = backend.employee_queries();
    assert_eq!(queries.len(), 1);
    assert!(!queries[0].contains_key("q"));
    assert_eq!(directory.employees().len(), 3);
    assert_eq!(result_summary(directory.employees().len(), &directory.query()), "Showing 3 employees");
    Ok(())
}

#[tokio::test]
async fn cancelled_search_sends_nothing() -> Result<()> {
    let backend = StubBackend::spawn().await?;
    let directory = EmployeeDirectory::with_settings(backend.client(Some(TOKEN))?, DELAY, 1000);

    directory.set_query("mary");
    directory.cancel();
    directory.settle().await;

    assert!(backend.employee_queries().is_empty());
    assert!(directory.employees().is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_search_reports_server_detail() -> Result<()> {
    let backend = StubBackend::spawn().await?;
    let directory = EmployeeDirectory::with_settings(backend.client(Some("expired"))?, DELAY, 1000);

    directory.set_query("jane");
    directory.settle().await;

    assert_eq!(directory.error().as_deref(), Some("Invalid token"));
    assert!(!directory.is_loading());
    Ok(())
}
