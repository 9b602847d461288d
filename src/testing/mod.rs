use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::client::ApiClient;
use crate::credential::MemoryCredentialStore;
use crate::http::{Transport, TransportError, TransportRequest};

type Reply = Result<Value, TransportError>;

enum Scripted {
    Ready(Reply),
    Held(oneshot::Receiver<Reply>),
}

/// Scripted transport that records every request it receives.
///
/// Responses are consumed in order; an unscripted request fails with a
/// network error so a missing script shows up in assertions.
#[derive(Default)]
pub struct FakeTransport {
    calls: Mutex<Vec<TransportRequest>>,
    script: Mutex<VecDeque<Scripted>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond_with(&self, body: Value) {
        self.script.lock().unwrap().push_back(Scripted::Ready(Ok(body)));
    }

    pub fn fail_with(&self, error: TransportError) {
        self.script.lock().unwrap().push_back(Scripted::Ready(Err(error)));
    }

    /// Next request waits until the returned sender is used
    pub fn hold(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().unwrap().push_back(Scripted::Held(rx));
        tx
    }

    pub fn calls(&self) -> Vec<TransportRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<TransportRequest> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Reply {
        self.calls.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Held(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(TransportError::network("held response dropped"))),
            None => Err(TransportError::network("no scripted response")),
        }
    }
}

/// Client against `https://api.test` with an optional stored credential
pub fn test_client(token: Option<&str>, transport: Arc<FakeTransport>) -> ApiClient {
    let store = match token {
        Some(t) => MemoryCredentialStore::with_token(t),
        None => MemoryCredentialStore::new(),
    };
    ApiClient::new("https://api.test", transport, Arc::new(store))
}
