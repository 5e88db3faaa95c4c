//! OpenAPI documentation for the admin API at `/admin/api/v1/*`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;
use crate::sync;

/// Documents the trusted proxy header used to attribute writes.
struct ProxyHeaderAddon;

impl Modify for ProxyHeaderAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "ProxyHeader".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-geoctl-user",
                    "Set by the fronting proxy to the operator's identity. Recorded in the audit columns of every write. \
                     Required only when `auth.proxy_header.enabled` is set; the header name is configurable.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/admin/api/v1", description = "Admin API server")
    ),
    modifiers(&ProxyHeaderAddon),
    paths(
        api::handlers::regions::list_regions,
        api::handlers::regions::get_region,
        api::handlers::regions::create_region,
        api::handlers::regions::update_region,
        api::handlers::regions::delete_region,
        api::handlers::regions::synchronize_regions,
        api::handlers::states::list_states,
        api::handlers::states::get_state,
        api::handlers::states::create_state,
        api::handlers::states::update_state,
        api::handlers::states::delete_state,
        api::handlers::states::synchronize_states,
        api::handlers::states::update_images,
        api::handlers::municipalities::list_municipalities,
        api::handlers::municipalities::get_municipality,
        api::handlers::municipalities::create_municipality,
        api::handlers::municipalities::update_municipality,
        api::handlers::municipalities::delete_municipality,
        api::handlers::municipalities::synchronize_municipalities,
        api::handlers::actions::run_action,
        api::handlers::colors::list_colors,
        api::handlers::colors::get_color,
        api::handlers::colors::create_color,
        api::handlers::colors::update_color,
        api::handlers::colors::delete_color,
        api::handlers::genders::list_genders,
        api::handlers::genders::get_gender,
        api::handlers::genders::create_gender,
        api::handlers::genders::update_gender,
        api::handlers::genders::delete_gender,
        api::handlers::phone_types::list_phone_types,
        api::handlers::phone_types::get_phone_type,
        api::handlers::phone_types::create_phone_type,
        api::handlers::phone_types::update_phone_type,
        api::handlers::phone_types::delete_phone_type,
        api::handlers::address_types::list_address_types,
        api::handlers::address_types::get_address_type,
        api::handlers::address_types::create_address_type,
        api::handlers::address_types::update_address_type,
        api::handlers::address_types::delete_address_type,
        api::handlers::addresses::list_addresses,
        api::handlers::addresses::get_address,
        api::handlers::addresses::create_address,
        api::handlers::addresses::update_address,
        api::handlers::addresses::delete_address,
        api::handlers::phones::list_phones,
        api::handlers::phones::get_phone,
        api::handlers::phones::create_phone,
        api::handlers::phones::update_phone,
        api::handlers::phones::delete_phone,
    ),
    components(
        schemas(
            api::models::AuditInfo,
            api::models::regions::RegionCreate,
            api::models::regions::RegionUpdate,
            api::models::regions::RegionResponse,
            api::models::states::StateCreate,
            api::models::states::StateUpdate,
            api::models::states::StateResponse,
            api::models::municipalities::MunicipalityCreate,
            api::models::municipalities::MunicipalityUpdate,
            api::models::municipalities::MunicipalityResponse,
            api::models::actions::ActionRequest,
            api::models::actions::ActionResponse,
            api::models::colors::ColorCreate,
            api::models::colors::ColorUpdate,
            api::models::colors::ColorResponse,
            api::models::genders::GenderCreate,
            api::models::genders::GenderUpdate,
            api::models::genders::GenderResponse,
            api::models::phone_types::PhoneTypeCreate,
            api::models::phone_types::PhoneTypeUpdate,
            api::models::phone_types::PhoneTypeResponse,
            api::models::address_types::AddressTypeCreate,
            api::models::address_types::AddressTypeUpdate,
            api::models::address_types::AddressTypeResponse,
            api::models::addresses::AddressCreate,
            api::models::addresses::AddressUpdate,
            api::models::addresses::AddressResponse,
            api::models::phones::PhoneCreate,
            api::models::phones::PhoneUpdate,
            api::models::phones::PhoneResponse,
            api::handlers::states::UpdateImagesRequest,
            sync::locality_sync::SyncRequest,
            sync::locality_sync::SyncSummary,
            sync::state_images::StateSelection,
            crate::types::Level,
        )
    ),
    tags(
        (name = "regions", description = "The five macro-regions of Brazil, keyed by IBGE code."),
        (name = "states", description = "Federative units. Filter by `region_id` to drive cascading selects."),
        (name = "municipalities", description = "Municipalities, searchable by name, region and state."),
        (name = "sync", description = "Pull localities from the IBGE API and upsert them.

Parents are created or refreshed before their children, and each call runs in a single transaction."),
        (name = "actions", description = "Bulk commands applied to a selection of ids."),
        (name = "reference", description = "Colors, genders, phone and address types, addresses and phones."),
    ),
    info(
        title = "geoctl Admin API",
        version = "1.0.0",
        description = "Administration of the Brazilian locality hierarchy (region, state, municipality) and related reference data.

## Errors

Failures return a JSON body with a `message` field. Unique constraint violations also carry a `resource` field naming the conflicting entity.",
    ),
)]
pub struct AdminApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_doc_lists_sync_and_action_paths() {
        let doc = AdminApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/regions/sync"));
        assert!(doc.paths.paths.contains_key("/{entity}/actions/{action}"));
        assert!(doc.paths.paths.contains_key("/address-types/{id}"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("ProxyHeader"));
    }
}
