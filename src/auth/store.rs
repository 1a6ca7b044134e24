//! Persisted access/refresh token storage.
//!
//! The store is inert key/value state: it has no expiry tracking of its own.
//! Token expiry is discovered reactively by the transport when the server
//! answers 401. Tokens are persisted to `tokens.json` in the application data
//! directory so a session survives a restart.

use std::path::PathBuf;
use std::sync::RwLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

/// An access/refresh token pair. Either field may be absent; an empty pair is
/// the unauthenticated state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "access_token", default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(rename = "refresh_token", default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl TokenPair {
    pub fn new(access: String, refresh: String) -> Self {
        Self {
            access: Some(access),
            refresh: Some(refresh),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// Shared token store.
///
/// Login and logout write both fields together; a refresh replaces only the
/// access field. Mutations never fail from the caller's perspective: a
/// persistence error is logged and the in-memory state still updates.
pub struct TokenStore {
    path: Option<PathBuf>,
    tokens: RwLock<TokenPair>,
}

impl TokenStore {
    /// Open a store persisted under `data_dir`, loading any saved tokens.
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let path = data_dir.join(TOKEN_FILE);
        let tokens = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read token file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse token file")?
        } else {
            TokenPair::default()
        };

        Ok(Self {
            path: Some(path),
            tokens: RwLock::new(tokens),
        })
    }

    /// Create a store with no persistence (isolated sessions, tests).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tokens: RwLock::new(TokenPair::default()),
        }
    }

    pub fn get(&self) -> TokenPair {
        self.tokens.read().expect("token store lock poisoned").clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .expect("token store lock poisoned")
            .access
            .clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.tokens
            .read()
            .expect("token store lock poisoned")
            .refresh
            .clone()
    }

    /// Overwrite both fields. Other readers see either the old pair or the
    /// new pair, never a half-written one.
    pub fn set(&self, pair: TokenPair) {
        let mut tokens = self.tokens.write().expect("token store lock poisoned");
        *tokens = pair;
        self.persist(&tokens);
    }

    /// Replace only the access token, leaving the refresh token untouched.
    pub fn set_access(&self, access: &str) {
        let mut tokens = self.tokens.write().expect("token store lock poisoned");
        tokens.access = Some(access.to_string());
        self.persist(&tokens);
    }

    /// Remove both tokens and the persisted file.
    pub fn clear(&self) {
        let mut tokens = self.tokens.write().expect("token store lock poisoned");
        *tokens = TokenPair::default();
        if let Some(ref path) = self.path {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(error = %e, "Failed to remove token file");
                }
            }
        }
    }

    fn persist(&self, tokens: &TokenPair) {
        let Some(ref path) = self.path else {
            return;
        };
        match serde_json::to_string_pretty(tokens) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(path, contents) {
                    warn!(error = %e, "Failed to persist tokens");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize tokens"),
        }
    }
}
