//! Employee directory with debounced search.
//!
//! Query changes restart a single trailing-edge timer; only the value that
//! survives a quiet period is sent. Requests that already left are never
//! cancelled, so whichever response resolves last is what the directory
//! shows.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::client::{ApiClient, RequestState, StateCell};
use crate::config::{ClientConfig, DEFAULT_EMPLOYEE_PAGE_LIMIT, DEFAULT_SEARCH_DEBOUNCE_MS};

pub const EMPLOYEES_PATH: &str = "/resources/employees/";
pub const SEARCH_FAILURE: &str = "Failed to fetch employees";
pub const SEARCH_PARAM: &str = "q";
pub const LIMIT_PARAM: &str = "limit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Pending,
}

/// Current result set and the trimmed query that produced it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    pub employees: Vec<Value>,
    pub query: String,
}

struct Inner {
    client: ApiClient,
    limit: u32,
    state: StateCell<Directory>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl Inner {
    fn load(&self, raw_query: &str) -> impl Future<Output = ()> + Send + '_ {
        let attempt = self.state.begin();
        let query = raw_query.trim().to_string();

        let mut params = vec![(LIMIT_PARAM, self.limit.to_string())];
        if !query.is_empty() {
            params.push((SEARCH_PARAM, query.clone()));
        }

        async move {
            match self.client.get(EMPLOYEES_PATH, &params).await {
                Ok(Value::Array(employees)) => {
                    info!("Employee search {:?}: {} results", query, employees.len());
                    attempt.succeed(|data| {
                        data.employees = employees;
                        data.query = query;
                    });
                }
                Ok(other) => {
                    warn!("Employee search response was not a list: {}", other);
                    attempt.fail(SEARCH_FAILURE);
                }
                Err(e) => {
                    error!("Error fetching employees: {}", e);
                    attempt.fail(e.display_message(SEARCH_FAILURE));
                }
            }
        }
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }
}

pub struct EmployeeDirectory {
    inner: Arc<Inner>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl EmployeeDirectory {
    pub fn new(client: ApiClient) -> Self {
        Self::with_settings(
            client,
            Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            DEFAULT_EMPLOYEE_PAGE_LIMIT,
        )
    }

    pub fn from_config(client: ApiClient, config: &ClientConfig) -> Self {
        Self::with_settings(client, config.search_debounce(), config.employee_page_limit)
    }

    pub fn with_settings(client: ApiClient, delay: Duration, limit: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                limit,
                state: StateCell::new(),
                in_flight: Mutex::new(Vec::new()),
            }),
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn employees(&self) -> Vec<Value> {
        self.inner.state.read(|s| s.data.employees.clone())
    }

    /// Trimmed query of the response currently shown
    pub fn query(&self) -> String {
        self.inner.state.read(|s| s.data.query.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.error()
    }

    pub fn snapshot(&self) -> RequestState<Directory> {
        self.inner.state.snapshot()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<RequestState<Directory>> {
        self.inner.state.subscribe()
    }

    pub fn phase(&self) -> SearchPhase {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.as_ref() {
            Some(timer) if !timer.is_finished() => SearchPhase::Pending,
            _ => SearchPhase::Idle,
        }
    }

    /// Immediate, undebounced load (initial page load or explicit refresh).
    /// Like the lookups, `is_loading` is set before this returns.
    pub fn fetch(&self, query: &str) -> impl Future<Output = ()> + Send + '_ {
        self.inner.load(query)
    }

    /// Register an input change. Must be called from within a tokio runtime.
    ///
    /// Cancels the pending timer, if any, and arms a new one. When it fires
    /// the request is detached from the timer so later input cannot abort it.
    pub fn set_query(&self, input: &str) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.take() {
            if !timer.is_finished() {
                debug!("Debounce timer restarted");
            }
            timer.abort();
        }

        let inner = Arc::clone(&self.inner);
        let delay = self.delay;
        let query = input.to_string();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let request = {
                let inner = Arc::clone(&inner);
                tokio::spawn(async move { inner.load(&query).await })
            };
            inner.track(request);
        }));
    }

    /// Drop a pending timer without firing it
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.take() {
            timer.abort();
        }
    }

    /// Wait for the pending timer (if any) to fire and for every request it
    /// or earlier timers started to resolve.
    pub async fn settle(&self) {
        let timer = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = timer {
            if let Err(e) = timer.await {
                if !e.is_cancelled() {
                    error!("Debounce timer task failed: {}", e);
                }
            }
        }

        let requests: Vec<_> = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for request in requests {
            if let Err(e) = request.await {
                error!("Employee search task failed: {}", e);
            }
        }
    }
}

impl Drop for EmployeeDirectory {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// `first_name last_name`, skipping whichever part is missing
pub fn full_name(record: &Value) -> String {
    ["first_name", "last_name"]
        .iter()
        .filter_map(|field| record.get(*field).and_then(Value::as_str))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Result count line for a directory listing
pub fn result_summary(count: usize, query: &str) -> String {
    let noun = if count == 1 { "employee" } else { "employees" };
    let query = query.trim();
    if query.is_empty() {
        format!("Showing {} {}", count, noun)
    } else {
        format!("Showing {} {} matching \"{}\"", count, noun, query)
    }
}
