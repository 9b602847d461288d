pub mod state;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::credential::{CredentialStore, FileCredentialStore};
use crate::error::{ClientError, ClientResult};
use crate::http::{ReqwestTransport, Transport, TransportError, TransportRequest};

pub use state::{InFlight, RequestState, StateCell};

/// Scheme prefix added to credentials that lack one
pub const BEARER_PREFIX: &str = "Bearer ";

/// Authorization header value for a stored credential.
///
/// The prefix check is case-insensitive, but an existing prefix is never
/// re-cased: `"bearer xyz"` goes out as `"bearer xyz"`.
pub fn authorization_value(credential: &str) -> String {
    if credential.to_lowercase().starts_with("bearer ") {
        credential.to_string()
    } else {
        format!("{}{}", BEARER_PREFIX, credential)
    }
}

/// Authenticated fetch helper shared by every resource consumer
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            credentials,
        }
    }

    /// reqwest transport plus the on-disk credential store from `config`
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        let credentials = FileCredentialStore::new(config.storage_file());
        Ok(Self::new(
            config.api_base.clone(),
            Arc::new(transport),
            Arc::new(credentials),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Header value for the stored credential; an empty value counts as none
    pub fn authorization(&self) -> ClientResult<String> {
        match self.credentials.get()? {
            Some(credential) if !credential.is_empty() => Ok(authorization_value(&credential)),
            _ => Err(ClientError::NoCredential),
        }
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> ClientResult<Value> {
        let mut request = TransportRequest::get(self.url(path));
        for (key, value) in query {
            request = request.with_query(*key, value.clone());
        }
        self.send_authorized(request).await
    }

    pub async fn post(&self, path: &str, body: Value) -> ClientResult<Value> {
        self.send_authorized(TransportRequest::post(self.url(path), body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> ClientResult<Value> {
        self.send_authorized(TransportRequest::put(self.url(path), body)).await
    }

    /// Attach the authorization header and send. Without a credential this
    /// returns [`ClientError::NoCredential`] and the transport is never called.
    pub async fn send_authorized(&self, mut request: TransportRequest) -> ClientResult<Value> {
        request.authorization = Some(self.authorization()?);
        debug!("{} {}", request.method.as_str(), request.url);
        Ok(self.transport.send(request).await?)
    }

    /// Send without credentials (login)
    pub async fn send_anonymous(&self, request: TransportRequest) -> Result<Value, TransportError> {
        debug!("{} {} (anonymous)", request.method.as_str(), request.url);
        self.transport.send(request).await
    }
}
