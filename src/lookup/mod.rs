//! Cached resource collections with id to label lookups.
//!
//! Asset types, asset locations and employees all follow the same shape:
//! fetch one fixed path, keep the records verbatim, and derive a label map
//! from two fields of each record.

use std::collections::BTreeMap;
use std::future::Future;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::client::{ApiClient, RequestState, StateCell};

/// Where a lookup fetches from and how its records are read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupSpec {
    pub resource: &'static str,
    pub path: &'static str,
    pub id_field: &'static str,
    pub label_field: &'static str,
    pub fallback_prefix: &'static str,
    pub failure_message: &'static str,
}

pub const ASSET_TYPES: LookupSpec = LookupSpec {
    resource: "asset types",
    path: "/resources/types/",
    id_field: "id",
    label_field: "asset_type_name",
    fallback_prefix: "Type",
    failure_message: "Failed to fetch asset types",
};

pub const ASSET_LOCATIONS: LookupSpec = LookupSpec {
    resource: "asset locations",
    path: "/resources/locations/",
    id_field: "id",
    label_field: "asset_location_name",
    fallback_prefix: "Location",
    failure_message: "Failed to fetch asset locations",
};

pub const ASSET_EMPLOYEES: LookupSpec = LookupSpec {
    resource: "asset employees",
    path: "/resources/employees/",
    id_field: "id",
    label_field: "asset_employee_name",
    fallback_prefix: "Employee",
    failure_message: "Failed to fetch asset employees",
};

/// Latest successful fetch and the map derived from it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    pub items: Vec<Value>,
    pub lookup_map: BTreeMap<i64, String>,
}

/// Map each record's id to its label. Records without a numeric id or a
/// string label are skipped; a repeated id keeps the later label.
pub fn build_lookup_map(items: &[Value], id_field: &str, label_field: &str) -> BTreeMap<i64, String> {
    let mut map = BTreeMap::new();
    for record in items {
        let id = record.get(id_field).and_then(Value::as_i64);
        let label = record.get(label_field).and_then(Value::as_str);
        if let (Some(id), Some(label)) = (id, label) {
            map.insert(id, label.to_string());
        }
    }
    map
}

pub struct ResourceLookup {
    spec: LookupSpec,
    client: ApiClient,
    state: StateCell<Collection>,
}

impl ResourceLookup {
    pub fn new(client: ApiClient, spec: LookupSpec) -> Self {
        Self {
            spec,
            client,
            state: StateCell::new(),
        }
    }

    pub fn asset_types(client: ApiClient) -> Self {
        Self::new(client, ASSET_TYPES)
    }

    pub fn asset_locations(client: ApiClient) -> Self {
        Self::new(client, ASSET_LOCATIONS)
    }

    pub fn asset_employees(client: ApiClient) -> Self {
        Self::new(client, ASSET_EMPLOYEES)
    }

    pub fn spec(&self) -> &LookupSpec {
        &self.spec
    }

    pub fn items(&self) -> Vec<Value> {
        self.state.read(|s| s.data.items.clone())
    }

    pub fn lookup_map(&self) -> BTreeMap<i64, String> {
        self.state.read(|s| s.data.lookup_map.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.error()
    }

    pub fn snapshot(&self) -> RequestState<Collection> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<RequestState<Collection>> {
        self.state.subscribe()
    }

    /// Reload the collection.
    ///
    /// `is_loading` flips to true before this returns, so it is observable
    /// before the future is first polled. Failures land in `error()` and
    /// leave the previous collection in place.
    pub fn fetch(&self) -> impl Future<Output = ()> + Send + '_ {
        let attempt = self.state.begin();

        async move {
            match self.client.get(self.spec.path, &[]).await {
                Ok(Value::Array(items)) => {
                    let lookup_map = build_lookup_map(&items, self.spec.id_field, self.spec.label_field);
                    info!("{} loaded: {} records", self.spec.resource, items.len());
                    attempt.succeed(|data| {
                        data.items = items;
                        data.lookup_map = lookup_map;
                    });
                }
                Ok(other) => {
                    warn!("{} response was not a list: {}", self.spec.resource, other);
                    attempt.fail(self.spec.failure_message);
                }
                Err(e) => {
                    error!("Error fetching {}: {}", self.spec.resource, e);
                    attempt.fail(e.display_message(self.spec.failure_message));
                }
            }
        }
    }

    /// Mapped label, or `"{prefix} {id}"` when the id is unknown or its
    /// label is empty
    pub fn get_label(&self, id: i64) -> String {
        self.state.read(|s| {
            s.data
                .lookup_map
                .get(&id)
                .filter(|label| !label.is_empty())
                .cloned()
                .unwrap_or_else(|| format!("{} {}", self.spec.fallback_prefix, id))
        })
    }
}
