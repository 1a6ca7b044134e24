//! Authentication module for managing tokens and sessions.
//!
//! This module provides:
//! - `TokenStore`: persisted access/refresh token storage
//! - `Session`: login/register/logout and the authenticated flag
//!
//! Tokens have no client-side expiry tracking; the transport discovers
//! expiry reactively when the server answers 401.

pub mod session;
pub mod store;

pub use session::Session;
pub use store::{TokenPair, TokenStore};
