//! Session facade over the token store and auth endpoints.
//!
//! The authenticated flag is a snapshot: `initialize` derives it from the
//! persisted store once at startup, and afterwards only `login` and `logout`
//! move it. When the transport clears the store on an unrecoverable 401 the
//! flag goes stale until the application reacts to the auth-failure handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{ApiClient, ApiError};

use super::store::{TokenPair, TokenStore};

pub struct Session {
    client: ApiClient,
    store: Arc<TokenStore>,
    authenticated: AtomicBool,
}

impl Session {
    pub fn new(client: ApiClient, store: Arc<TokenStore>) -> Self {
        Self {
            client,
            store,
            authenticated: AtomicBool::new(false),
        }
    }

    /// Derive the authenticated flag from the persisted store. Run once at
    /// startup; the flag is never re-derived automatically afterwards.
    pub fn initialize(&self) {
        let present = self.store.access_token().is_some();
        self.authenticated.store(present, Ordering::SeqCst);
        debug!(authenticated = present, "Session initialized from store");
    }

    /// Log in and populate the token store. On failure the error propagates
    /// unchanged and neither the store nor the flag moves.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let tokens = self.client.login(username, password).await?;
        self.store
            .set(TokenPair::new(tokens.access, tokens.refresh));
        self.authenticated.store(true, Ordering::SeqCst);
        info!(username, "Logged in");
        Ok(())
    }

    /// Create an account. No session starts; the caller logs in separately.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        self.client.register(username, email, password).await?;
        info!(username, "Registered");
        Ok(())
    }

    /// Drop the session locally. Idempotent; no server round trip.
    pub fn logout(&self) {
        self.store.clear();
        self.authenticated.store(false, Ordering::SeqCst);
        info!("Logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }
}
