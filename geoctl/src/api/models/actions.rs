//! Bulk action request/response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Selection the action applies to. Must not be empty.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActionRequest {
    #[schema(example = json!([35, 33]))]
    pub ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    #[schema(example = "states")]
    pub entity: String,
    #[schema(example = "synchronize")]
    pub action: String,
    /// Number of records the action touched
    pub processed: usize,
    #[schema(example = "2 states synchronized from IBGE")]
    pub message: String,
}
