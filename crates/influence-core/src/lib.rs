//! Core library for the influencer marketplace client.
//!
//! - [`auth`]: credential storage backends and the process-wide session
//! - [`api`]: request pipeline with token refresh, typed endpoint client
//! - [`models`]: users, profiles, campaigns, applications, search results
//! - [`config`]: client configuration with environment overrides

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{CredentialStore, SessionState, SessionStore};
pub use config::Config;
