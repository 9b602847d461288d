use std::future::Future;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::client::{authorization_value, ApiClient, RequestState, StateCell};
use crate::error::{ClientError, ClientResult};
use crate::http::{TransportError, TransportRequest};

pub const LOGIN_PATH: &str = "/api/auth/login";

pub const MISSING_CREDENTIALS: &str = "Please enter both username and password";
pub const MISSING_LOGIN_URL: &str = "Please enter the API URL";
pub const LOGIN_FAILURE: &str = "Login failed";

/// Response fields a token may arrive under, in priority order
const TOKEN_FIELDS: [&str; 4] = ["token", "access_token", "bearerToken", "accessToken"];

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Login flow: validates input, posts to the auth proxy, and saves the
/// returned token (with its scheme prefix) in the credential store.
pub struct LoginSession {
    client: ApiClient,
    state: StateCell<Option<String>>,
}

impl LoginSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: StateCell::new(),
        }
    }

    pub fn default_url(&self) -> String {
        self.client.url(LOGIN_PATH)
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.error()
    }

    pub fn snapshot(&self) -> RequestState<Option<String>> {
        self.state.snapshot()
    }

    /// Log in and persist the credential. `url` overrides the default
    /// login endpoint. The returned value is exactly what was stored.
    ///
    /// `is_loading` is set before this returns.
    pub fn login<'a>(
        &'a self,
        username: &'a str,
        password: &'a str,
        url: Option<&'a str>,
    ) -> impl Future<Output = ClientResult<String>> + Send + 'a {
        let attempt = self.state.begin();

        async move {
            match self.try_login(username, password, url).await {
                Ok(stored) => {
                    info!("Login successful for user {}", username);
                    let saved = stored.clone();
                    attempt.succeed(|data| *data = Some(saved));
                    Ok(stored)
                }
                Err(e) => {
                    warn!("Login failed for user {}: {}", username, e);
                    attempt.fail(login_message(&e));
                    Err(e)
                }
            }
        }
    }

    async fn try_login(&self, username: &str, password: &str, url: Option<&str>) -> ClientResult<String> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ClientError::validation(MISSING_CREDENTIALS));
        }

        let url = match url {
            Some(url) => url.trim().to_string(),
            None => self.default_url(),
        };
        if url.is_empty() {
            return Err(ClientError::validation(MISSING_LOGIN_URL));
        }

        let payload = serde_json::to_value(LoginRequest { username, password })?;
        let body = self
            .client
            .send_anonymous(TransportRequest::post(url, payload))
            .await?;

        let token = extract_token(&body).ok_or(ClientError::MissingToken)?;
        let stored = authorization_value(token);
        self.client.credentials().set(&stored)?;
        Ok(stored)
    }

    /// Forget the stored credential
    pub fn logout(&self) -> ClientResult<()> {
        self.client.credentials().clear()?;
        self.state.begin().succeed(|data| *data = None);
        Ok(())
    }
}

/// First non-empty token field in a login response
pub fn extract_token(body: &Value) -> Option<&str> {
    TOKEN_FIELDS
        .iter()
        .filter_map(|field| body.get(*field).and_then(Value::as_str))
        .find(|token| !token.is_empty())
}

/// Login errors prefer the proxy's `message`, then `detail`
fn login_message(err: &ClientError) -> String {
    match err {
        ClientError::Transport(e) => transport_message(e),
        ClientError::Storage(_) | ClientError::Serialization(_) => LOGIN_FAILURE.to_string(),
        other => other.to_string(),
    }
}

fn transport_message(err: &TransportError) -> String {
    err.field("message")
        .or_else(|| err.detail())
        .unwrap_or(LOGIN_FAILURE)
        .to_string()
}
