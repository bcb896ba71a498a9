//! Route handlers and the state they share.

pub mod error;
pub mod health;
pub mod root;
pub mod types;
pub mod user_login;
pub mod user_register;

pub use self::error::ApiError;

use crate::api::{password::Hasher, store::CredentialStore};
use anyhow::Result;
use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};
use secrecy::SecretString;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Read a request body as a JSON object, whatever its `Content-Type`.
/// Empty bodies, malformed JSON and non-object values are a missing payload.
pub(crate) fn json_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ApiError::MissingPayload),
    }
}

/// Shared by every handler through an `Extension<Arc<AppState>>` layer.
pub struct AppState {
    store: Arc<dyn CredentialStore>,
    hasher: Hasher,
    // verified against when the account is unknown so both login failures cost one hash
    decoy_hash: String,
}

impl AppState {
    /// # Errors
    /// Returns an error if the decoy hash cannot be computed.
    pub fn new(store: Arc<dyn CredentialStore>, hasher: Hasher) -> Result<Self> {
        let decoy: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(24)
            .map(char::from)
            .collect();
        let decoy_hash = hasher.hash(&SecretString::from(decoy))?.hash;

        Ok(Self {
            store,
            hasher,
            decoy_hash,
        })
    }

    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    #[must_use]
    pub const fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    pub(crate) fn decoy_hash(&self) -> &str {
        &self.decoy_hash
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}
