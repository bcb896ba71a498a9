use crate::api::{
    self,
    handlers::AppState,
    password::Hasher,
    store::{CredentialStore, MemoryStore},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the application state cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());

    let state = AppState::new(store, Hasher::default())
        .context("Failed to initialize application state")?;

    debug!("State: {:?}", state);

    api::new(args.port, Arc::new(state)).await
}
