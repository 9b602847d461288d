use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::client::{ApiClient, InFlight, RequestState, StateCell};
use crate::error::{ClientError, ClientResult};

pub const RESOURCES_PATH: &str = "/resources/";

pub const MISSING_TYPE: &str = "Please select an asset type.";
pub const MISSING_ASSIGNMENT: &str = "Please assign the asset to either a location or an employee.";

pub const CREATE_FAILURE: &str = "Failed to create asset";
pub const UPDATE_FAILURE: &str = "Failed to update asset";
pub const FETCH_ONE_FAILURE: &str = "Failed to fetch asset";
pub const FETCH_MANY_FAILURE: &str = "Failed to fetch assets";

/// Editable asset fields, as sent on create and update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetDraft {
    pub type_id: Option<i64>,
    pub location_id: Option<i64>,
    pub employee_id: Option<i64>,
    #[serde(default)]
    pub is_decommissioned: u8,
    pub notes: Option<String>,
}

impl AssetDraft {
    /// Lift the editable fields out of a server record; anything unexpected
    /// is treated as unset.
    pub fn from_record(record: &Value) -> Self {
        let id = |field: &str| record.get(field).and_then(Value::as_i64);
        Self {
            type_id: id("type_id"),
            location_id: id("location_id"),
            employee_id: id("employee_id"),
            is_decommissioned: record
                .get("is_decommissioned")
                .and_then(|v| v.as_u64().or_else(|| v.as_bool().map(u64::from)))
                .map(|v| u8::from(v != 0))
                .unwrap_or(0),
            notes: record
                .get("notes")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.type_id.is_none() {
            return Err(ClientError::validation(MISSING_TYPE));
        }
        if self.location_id.is_none() && self.employee_id.is_none() {
            return Err(ClientError::validation(MISSING_ASSIGNMENT));
        }
        Ok(())
    }

    pub fn is_decommissioned(&self) -> bool {
        self.is_decommissioned != 0
    }

    fn checked_payload(&self) -> ClientResult<Value> {
        self.validate()?;
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetOp {
    Create,
    Update,
    FetchOne,
    FetchMany,
}

impl AssetOp {
    fn failure_message(self) -> &'static str {
        match self {
            AssetOp::Create => CREATE_FAILURE,
            AssetOp::Update => UPDATE_FAILURE,
            AssetOp::FetchOne => FETCH_ONE_FAILURE,
            AssetOp::FetchMany => FETCH_MANY_FAILURE,
        }
    }
}

/// Asset reads and mutations over the authenticated client.
///
/// Each call also records its outcome in request state (`is_loading`,
/// display-ready `error`, last response body) for UI layers.
pub struct AssetService {
    client: ApiClient,
    state: StateCell<Option<Value>>,
}

impl AssetService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: StateCell::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.error()
    }

    pub fn snapshot(&self) -> RequestState<Option<Value>> {
        self.state.snapshot()
    }

    // Every operation begins its attempt before returning the future, so
    // `is_loading` is already true when the call returns.

    pub fn list(&self) -> impl Future<Output = ClientResult<Value>> + Send + '_ {
        let attempt = self.state.begin();
        async move {
            let result = self.client.get(RESOURCES_PATH, &[]).await;
            finish(attempt, AssetOp::FetchMany, result)
        }
    }

    pub fn list_by_employee(&self, employee_id: i64) -> impl Future<Output = ClientResult<Value>> + Send + '_ {
        let attempt = self.state.begin();
        async move {
            let path = format!("{}employee/{}", RESOURCES_PATH, employee_id);
            let result = self.client.get(&path, &[]).await;
            finish(attempt, AssetOp::FetchMany, result)
        }
    }

    pub fn list_by_location(&self, location_id: i64) -> impl Future<Output = ClientResult<Value>> + Send + '_ {
        let attempt = self.state.begin();
        async move {
            let path = format!("{}location/{}", RESOURCES_PATH, location_id);
            let result = self.client.get(&path, &[]).await;
            finish(attempt, AssetOp::FetchMany, result)
        }
    }

    pub fn get(&self, id: i64) -> impl Future<Output = ClientResult<Value>> + Send + '_ {
        let attempt = self.state.begin();
        async move {
            let result = self.client.get(&asset_path(id), &[]).await;
            finish(attempt, AssetOp::FetchOne, result)
        }
    }

    /// Validation failures are recorded in state like any other failure,
    /// without touching the network.
    pub fn create(&self, draft: &AssetDraft) -> impl Future<Output = ClientResult<Value>> + Send + '_ {
        let attempt = self.state.begin();
        let payload = draft.checked_payload();
        async move {
            let result = match payload {
                Ok(payload) => self.client.post(RESOURCES_PATH, payload).await,
                Err(e) => Err(e),
            };
            let created = finish(attempt, AssetOp::Create, result)?;
            let created_id = created.get("id").cloned().unwrap_or(Value::Null);
            info!("Asset created: {}", created_id);
            Ok(created)
        }
    }

    pub fn update(&self, id: i64, draft: &AssetDraft) -> impl Future<Output = ClientResult<Value>> + Send + '_ {
        let attempt = self.state.begin();
        let payload = draft.checked_payload();
        async move {
            let result = match payload {
                Ok(payload) => self.client.put(&asset_path(id), payload).await,
                Err(e) => Err(e),
            };
            let updated = finish(attempt, AssetOp::Update, result)?;
            info!("Asset {} updated", id);
            Ok(updated)
        }
    }

    /// Load the asset, flag it decommissioned, and write it back. Both
    /// requests run under one attempt.
    pub fn decommission(&self, id: i64) -> impl Future<Output = ClientResult<Value>> + Send + '_ {
        let attempt = self.state.begin();
        async move {
            let result = self.rewrite_decommissioned(id).await;
            let updated = finish(attempt, AssetOp::Update, result)?;
            info!("Asset {} decommissioned", id);
            Ok(updated)
        }
    }

    async fn rewrite_decommissioned(&self, id: i64) -> ClientResult<Value> {
        let path = asset_path(id);
        let record = self.client.get(&path, &[]).await?;
        let mut draft = AssetDraft::from_record(&record);
        draft.is_decommissioned = 1;

        let payload = serde_json::to_value(&draft)?;
        self.client.put(&path, payload).await
    }
}

/// Close an attempt with the request outcome
fn finish(
    attempt: InFlight<'_, Option<Value>>,
    op: AssetOp,
    result: ClientResult<Value>,
) -> ClientResult<Value> {
    match result {
        Ok(body) => {
            let last = body.clone();
            attempt.succeed(|data| *data = Some(last));
            Ok(body)
        }
        Err(e) => {
            error!("{:?} failed: {}", op, e);
            attempt.fail(e.display_message(op.failure_message()));
            Err(e)
        }
    }
}

fn asset_path(id: i64) -> String {
    format!("{}{}", RESOURCES_PATH, id)
}
