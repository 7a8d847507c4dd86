//! # cxform infrastructure
//!
//! Everything that talks to the outside world:
//! - HTTP transport with retry ([`http`])
//! - Authenticated REST client for the platform API ([`api`])
//! - Configuration loading from env and files ([`config`])
//! - Resource adapters and data sources ([`resources`], [`data_sources`])
//! - Provider wiring ([`provider`])
//!
//! Adapters implement the ports defined in `cxform-core` and only ever
//! surface `cxform_domain::CxError`.

pub mod api;
pub mod config;
pub mod data_sources;
pub mod errors;
pub mod http;
pub mod provider;
pub mod resources;

pub use api::{AccessTokenProvider, ClientCredentialsAuth, PlatformClient, StaticToken};
pub use http::{HttpClient, HttpClientBuilder};
pub use provider::Provider;
