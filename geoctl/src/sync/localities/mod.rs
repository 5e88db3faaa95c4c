//! IBGE locality hierarchy: remote client, payload views and reconciliation.

pub mod fetch;
pub mod payloads;
pub mod reconcile;

pub use fetch::{FetchError, FetchLocalities, FetchLocalitiesReqwest, IBGE_LOCALITIES_URL, endpoint_path};
pub use payloads::{MunicipalityPayload, RegionPayload, StatePayload, normalize_payload};
pub use reconcile::{LocalityStore, ensure_municipality, ensure_region, ensure_state};
