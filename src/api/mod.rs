//! REST API module for the equipment dashboard backend.
//!
//! This module provides the `ApiClient` for the dataset and auth endpoints
//! and the `AuthTransport` underneath it, which injects the bearer token and
//! recovers from expired access tokens with a single coordinated
//! refresh-and-replay.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{ApiClient, LoginResponse};
pub use error::ApiError;
pub use transport::{ApiRequest, AuthFailureHandler, AuthTransport};
