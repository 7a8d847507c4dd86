//! Platform REST API access
//!
//! - [`auth`]: bearer tokens (static or OAuth client credentials)
//! - [`client`]: authenticated JSON requests with status mapping

pub mod auth;
pub mod client;

pub use auth::{AccessTokenProvider, ClientCredentialsAuth, StaticToken};
pub use client::PlatformClient;
