//! Typed views over IBGE locality payloads.
//!
//! Only the fields the reconciler needs are modelled; everything else in the upstream document is
//! ignored. Upstream keys are Portuguese and some contain dashes, hence the renames.

use crate::sync::SyncError;
use crate::types::Level;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Flatten a fetched document into a list of entity objects.
///
/// Arrays keep their order and duplicates; a single object becomes a one element list.
pub fn normalize_payload(level: Level, value: Value) -> Result<Vec<Value>, SyncError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Ok(vec![value]),
        other => Err(SyncError::Validation {
            level,
            message: format!("expected an object or an array, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse<T: DeserializeOwned>(level: Level, value: &Value) -> Result<T, SyncError> {
    if !value.is_object() {
        return Err(SyncError::Validation {
            level,
            message: format!("expected an object, got {}", json_kind(value)),
        });
    }
    T::deserialize(value).map_err(|e| SyncError::Validation {
        level,
        message: e.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegionPayload {
    pub id: i32,
    #[serde(default, rename = "sigla")]
    pub abbreviation: String,
    #[serde(default, rename = "nome")]
    pub name: String,
}

impl RegionPayload {
    pub fn parse(value: &Value) -> Result<Self, SyncError> {
        parse(Level::Regions, value)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatePayload {
    pub id: i32,
    #[serde(default, rename = "sigla")]
    pub abbreviation: String,
    #[serde(default, rename = "nome")]
    pub name: String,
    #[serde(default, rename = "regiao")]
    pub region: Option<RegionPayload>,
}

impl StatePayload {
    pub fn parse(value: &Value) -> Result<Self, SyncError> {
        parse(Level::States, value)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MunicipalityPayload {
    pub id: i32,
    #[serde(default, rename = "nome")]
    pub name: String,
    #[serde(default, rename = "microrregiao")]
    micro_region: Option<MicroRegion>,
    #[serde(default, rename = "regiao-imediata")]
    immediate_region: Option<ImmediateRegion>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct MicroRegion {
    #[serde(default, rename = "mesorregiao")]
    meso_region: Option<UfHolder>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ImmediateRegion {
    #[serde(default, rename = "regiao-intermediaria")]
    intermediate_region: Option<UfHolder>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct UfHolder {
    #[serde(default, rename = "UF")]
    uf: Option<Value>,
}

impl MunicipalityPayload {
    pub fn parse(value: &Value) -> Result<Self, SyncError> {
        parse(Level::Municipalities, value)
    }

    /// The state reference carried by the payload, if any.
    ///
    /// Checks `microrregiao.mesorregiao.UF` first, then
    /// `regiao-imediata.regiao-intermediaria.UF`. Null links at any depth count as absent.
    pub fn state_reference(&self) -> Option<&Value> {
        let via_micro = self
            .micro_region
            .as_ref()
            .and_then(|m| m.meso_region.as_ref())
            .and_then(|m| m.uf.as_ref());
        let via_immediate = self
            .immediate_region
            .as_ref()
            .and_then(|r| r.intermediate_region.as_ref())
            .and_then(|r| r.uf.as_ref());

        via_micro.or(via_immediate).filter(|uf| !uf.is_null())
    }
}
