pub mod assets;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod http;
pub mod lookup;
pub mod search;

pub use client::{authorization_value, ApiClient, RequestState};
pub use error::{ClientError, ClientResult};

#[cfg(test)]
pub mod testing;
