//! Admin HTTP API.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response bodies and query parameters
//!
//! # API Structure
//!
//! Everything is nested under `/admin/api/v1`:
//!
//! - **Localities** (`/regions`, `/states`, `/municipalities`): CRUD, IBGE sync, search filters
//! - **Bulk actions** (`/{entity}/actions/{action}`): commands applied to a selection of ids
//! - **Reference data** (`/colors`, `/genders`, `/phone-types`, `/address-types`, `/addresses`,
//!   `/phones`): CRUD
//!
//! Interactive documentation is served at `/admin/docs`.

pub mod handlers;
pub mod models;
