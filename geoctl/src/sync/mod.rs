//! Synchronization of local reference data with external sources.
//!
//! - [`localities`]: IBGE client, payload parsing and the upsert reconciler
//! - [`locality_sync`]: `sync_regions`, `sync_states` and `sync_municipalities`, which fetch
//!   everything first and then reconcile inside one transaction
//! - [`state_images`]: flag and coat of arms downloads for states

use crate::db::errors::DbError;
use crate::sync::localities::FetchError;
use crate::types::Level;

pub mod http;
pub mod localities;
pub mod locality_sync;
pub mod state_images;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Upstream could not be reached, answered non-2xx, or sent something that is not JSON
    #[error("failed to fetch {level} from IBGE: {source}")]
    Transport {
        level: Level,
        #[source]
        source: FetchError,
    },

    /// A payload is malformed or references a parent that cannot be resolved
    #[error("invalid {level} payload: {message}")]
    Validation { level: Level, message: String },

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        SyncError::Database(err.into())
    }
}
