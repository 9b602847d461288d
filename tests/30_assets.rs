mod common;

use anyhow::Result;
use asset_desk::assets::{AssetDraft, AssetService, MISSING_ASSIGNMENT};
use asset_desk::ClientError;

use common::{StubBackend, TOKEN};

#[tokio::test]
async fn create_update_and_decommission_round_trip() -> Result<()> {
    let backend = StubBackend::spawn().await?;
    let assets = AssetService::new(backend.client(Some(TOKEN))?);

    let draft = AssetDraft {
        type_id: Some(2),
        employee_id: Some(42),
        notes: Some("Desk monitor".into()),
        ..AssetDraft::default()
    };
    let created = assets.create(&draft).await?;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(id, 124);

    let assigned = assets.list_by_employee(42).await?;
    assert_eq!(assigned.as_array().map(Vec::len), Some(1));

    let mut moved = AssetDraft::from_record(&assets.get(id).await?);
    moved.employee_id = None;
    moved.location_id = Some(6);
    assets.update(id, &moved).await?;

    let at_warehouse = assets.list_by_location(6).await?;
    assert_eq!(at_warehouse[0]["id"], id);
    assert_eq!(at_warehouse[0]["notes"], "Desk monitor");

    assets.decommission(id).await?;
    let record = assets.get(id).await?;
    assert_eq!(record["is_decommissioned"], 1);
    assert_eq!(record["location_id"], 6);
    assert_eq!(assets.error(), None);
    Ok(())
}

#[tokio::test]
async fn missing_asset_reports_server_detail() -> Result<()> {
    let backend = StubBackend::spawn().await?;
    let assets = AssetService::new(backend.client(Some(TOKEN))?);

    let err = assets.get(999).await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(assets.error().as_deref(), Some("Asset not found"));
    Ok(())
}

#[tokio::test]
async fn invalid_draft_is_rejected_locally() -> Result<()> {
    let backend = StubBackend::spawn().await?;
    let assets = AssetService::new(backend.client(Some(TOKEN))?);

    let draft = AssetDraft { type_id: Some(1), ..AssetDraft::default() };
    let err = assets.create(&draft).await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(assets.error().as_deref(), Some(MISSING_ASSIGNMENT));
    assert_eq!(backend.hits(), 0);
    Ok(())
}

#[tokio::test]
async fn listing_requires_a_token() -> Result<()> {
    let backend = StubBackend::spawn().await?;
    let assets = AssetService::new(backend.client(None)?);

    let err = assets.list().await.unwrap_err();

    assert!(matches!(err, ClientError::NoCredential));
    assert_eq!(backend.hits(), 0);
    Ok(())
}
