//! Common type definitions.
//!
//! # ID Types
//!
//! Locality entities are keyed by their IBGE codes, so their IDs are plain integers that match the
//! upstream service. Reference entities use database-generated serial IDs, except genders which are
//! keyed by their abbreviation.
//!
//! - [`RegionId`], [`StateId`], [`MunicipalityId`]: IBGE codes
//! - [`ColorId`], [`PhoneTypeId`], [`AddressTypeId`], [`AddressId`], [`PhoneId`]: serial IDs
//! - [`GenderId`]: abbreviation (up to three characters)

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

// Type aliases for IDs
pub type RegionId = i32;
pub type StateId = i32;
pub type MunicipalityId = i32;
pub type ColorId = i32;
pub type GenderId = String;
pub type PhoneTypeId = i32;
pub type AddressTypeId = i32;
pub type AddressId = i32;
pub type PhoneId = i32;

/// Who performed a write, as reported by the trusted proxy header. `None` for system operations.
pub type Actor = Option<String>;

/// The three levels of the locality hierarchy, in parent-first order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Regions,
    States,
    Municipalities,
}

impl Level {
    /// Path segment of this level in the IBGE locality API
    pub fn segment(self) -> &'static str {
        match self {
            Level::Regions => "regioes",
            Level::States => "estados",
            Level::Municipalities => "municipios",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Regions => write!(f, "regions"),
            Level::States => write!(f, "states"),
            Level::Municipalities => write!(f, "municipalities"),
        }
    }
}
