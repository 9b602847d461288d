#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use asset_desk::credential::{CredentialStore, MemoryCredentialStore};
use asset_desk::http::ReqwestTransport;
use asset_desk::ApiClient;

pub const TOKEN: &str = "stub-token";
pub const USERNAME: &str = "testuser";
pub const PASSWORD: &str = "password123";

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Default)]
struct Backend {
    hits: AtomicUsize,
    assets: Mutex<Vec<Value>>,
    employee_queries: Mutex<Vec<HashMap<String, String>>>,
}

/// In-process asset API: fixed lookups, a small employee directory, and a
/// mutable asset table. Every `/resources` route requires `Bearer stub-token`.
pub struct StubBackend {
    pub base_url: String,
    state: Arc<Backend>,
}

impl StubBackend {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = Arc::new(Backend::default());
        state.assets.lock().unwrap().push(json!({
            "id": 123,
            "type_id": 1,
            "location_id": 5,
            "employee_id": null,
            "date_added": "2024-01-15T10:30:00Z",
            "is_decommissioned": 0,
            "notes": "Test notes"
        }));

        let app = Router::new()
            .route("/resources/types/", get(asset_types))
            .route("/resources/locations/", get(asset_locations))
            .route("/resources/employees/", get(employees))
            .route("/resources/", get(list_assets).post(create_asset))
            .route("/resources/:id", get(get_asset).put(update_asset))
            .route("/resources/employee/:id", get(assets_by_employee))
            .route("/resources/location/:id", get(assets_by_location))
            .route("/api/auth/login", post(login))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind stub backend")?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self { base_url, state })
    }

    /// Requests that reached a `/resources` handler, authorized or not
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn employee_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.employee_queries.lock().unwrap().clone()
    }

    pub fn client(&self, token: Option<&str>) -> Result<ApiClient> {
        let store = match token {
            Some(token) => MemoryCredentialStore::with_token(token),
            None => MemoryCredentialStore::new(),
        };
        self.client_with_store(Arc::new(store))
    }

    pub fn client_with_store(&self, store: Arc<dyn CredentialStore>) -> Result<ApiClient> {
        let transport = ReqwestTransport::new(None)?;
        Ok(ApiClient::new(self.base_url.clone(), Arc::new(transport), store))
    }
}

/// Client pointed at a port nothing listens on
pub fn unreachable_client() -> Result<ApiClient> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let transport = ReqwestTransport::new(None)?;
    Ok(ApiClient::new(
        format!("http://127.0.0.1:{}", port),
        Arc::new(transport),
        Arc::new(MemoryCredentialStore::with_token(TOKEN)),
    ))
}

fn rejected(status: StatusCode, body: Value) -> (StatusCode, Json<Value>) {
    (status, Json(body))
}

fn authorize(state: &Backend, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let expected = format!("Bearer {}", TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        Some(_) => Err(rejected(StatusCode::UNAUTHORIZED, json!({ "detail": "Invalid token" }))),
        None => Err(rejected(StatusCode::UNAUTHORIZED, json!({ "detail": "Not authenticated" }))),
    }
}

async fn asset_types(State(state): State<Arc<Backend>>, headers: HeaderMap) -> Reply {
    authorize(&state, &headers)?;
    Ok(Json(json!([
        { "id": 1, "asset_type_name": "Laptop" },
        { "id": 2, "asset_type_name": "Monitor" },
        { "id": 3, "asset_type_name": null }
    ])))
}

async fn asset_locations(State(state): State<Arc<Backend>>, headers: HeaderMap) -> Reply {
    authorize(&state, &headers)?;
    Ok(Json(json!([
        { "id": 5, "asset_location_name": "Head Office" },
        { "id": 6, "asset_location_name": "Warehouse" }
    ])))
}

fn directory() -> Vec<Value> {
    [(42, "John", "Doe"), (43, "Jane", "Smith"), (44, "Johnny", "Appleseed"), (45, "Mary", "Jones")]
        .into_iter()
        .map(|(id, first, last)| {
            json!({
                "id": id,
                "first_name": first,
                "last_name": last,
                "email": format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
                "asset_employee_name": format!("{} {}", first, last),
            })
        })
        .collect()
}

async fn employees(
    State(state): State<Arc<Backend>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    authorize(&state, &headers)?;
    state.employee_queries.lock().unwrap().push(params.clone());

    let needle = params.get("q").map(|q| q.to_lowercase());
    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);

    let matches: Vec<Value> = directory()
        .into_iter()
        .filter(|e| match &needle {
            Some(needle) => ["first_name", "last_name"].iter().any(|field| {
                e[*field].as_str().unwrap_or("").to_lowercase().contains(needle.as_str())
            }),
            None => true,
        })
        .take(limit)
        .collect();
    Ok(Json(Value::Array(matches)))
}

async fn list_assets(State(state): State<Arc<Backend>>, headers: HeaderMap) -> Reply {
    authorize(&state, &headers)?;
    let assets = state.assets.lock().unwrap().clone();
    Ok(Json(Value::Array(assets)))
}

fn assets_where(state: &Backend, field: &str, id: i64) -> Json<Value> {
    let assets = state.assets.lock().unwrap();
    let matching: Vec<Value> = assets.iter().filter(|a| a[field].as_i64() == Some(id)).cloned().collect();
    Json(Value::Array(matching))
}

async fn assets_by_employee(State(state): State<Arc<Backend>>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    authorize(&state, &headers)?;
    Ok(assets_where(&state, "employee_id", id))
}

async fn assets_by_location(State(state): State<Arc<Backend>>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    authorize(&state, &headers)?;
    Ok(assets_where(&state, "location_id", id))
}

fn not_found() -> (StatusCode, Json<Value>) {
    rejected(StatusCode::NOT_FOUND, json!({ "detail": "Asset not found" }))
}

async fn get_asset(State(state): State<Arc<Backend>>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    authorize(&state, &headers)?;
    let assets = state.assets.lock().unwrap();
    let found = assets.iter().find(|a| a["id"].as_i64() == Some(id)).cloned();
    found.map(Json).ok_or_else(not_found)
}

async fn create_asset(State(state): State<Arc<Backend>>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    authorize(&state, &headers)?;
    let mut assets = state.assets.lock().unwrap();
    let id = assets.iter().filter_map(|a| a["id"].as_i64()).max().unwrap_or(0) + 1;

    let mut record = body;
    record["id"] = json!(id);
    record["date_added"] = json!("2024-02-01T09:00:00Z");
    assets.push(record.clone());
    Ok(Json(record))
}

async fn update_asset(
    State(state): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    authorize(&state, &headers)?;
    let mut assets = state.assets.lock().unwrap();
    let record = assets
        .iter_mut()
        .find(|a| a["id"].as_i64() == Some(id))
        .ok_or_else(not_found)?;

    if let (Some(target), Some(fields)) = (record.as_object_mut(), body.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    let updated = record.clone();
    Ok(Json(updated))
}

async fn login(Json(body): Json<Value>) -> Reply {
    let username = body["username"].as_str().unwrap_or("");
    let password = body["password"].as_str().unwrap_or("");
    if username == USERNAME && password == PASSWORD {
        Ok(Json(json!({ "token": TOKEN, "token_type": "bearer" })))
    } else {
        Err(rejected(StatusCode::UNAUTHORIZED, json!({ "message": "Invalid credentials" })))
    }
}
