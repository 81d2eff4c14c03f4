//! REST API client module for the marketplace platform.
//!
//! This module provides:
//! - `Pipeline`: bearer attachment plus single-retry token refresh
//! - `ApiClient`: typed methods for the auth, influencer, campaign, brand
//!   and search endpoints, all routed through the pipeline
//!
//! The API uses bearer token authentication with an access/refresh pair
//! obtained from `/api/v1/auth/login` or `/api/v1/auth/register`.

pub mod client;
pub mod error;
pub mod pipeline;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use pipeline::{ApiRequest, AuthEvent, Pipeline};
