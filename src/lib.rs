//! Equipdash - client library for the equipment dashboard API.
//!
//! This crate handles the authenticated side of talking to the dashboard
//! backend: bearer-token injection, transparent token refresh on 401,
//! session state, and typed access to the dataset endpoints.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
