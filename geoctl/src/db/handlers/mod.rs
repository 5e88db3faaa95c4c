//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed `PgConnection` and implements [`Repository`] for its table.
//! The locality repositories additionally expose `upsert`, which is the only write path used by
//! the IBGE synchronization.
//!
//! ```ignore
//! let mut conn = pool.acquire().await?;
//! let mut states = States::new(&mut conn);
//! let in_southeast = states.list(&StateFilter::new(0, 100).region(3)).await?;
//! ```

pub mod address_types;
pub mod addresses;
pub mod colors;
pub mod genders;
pub mod municipalities;
pub mod phone_types;
pub mod phones;
pub mod regions;
pub mod repository;
pub mod states;

pub use address_types::AddressTypes;
pub use addresses::Addresses;
pub use colors::Colors;
pub use genders::Genders;
pub use municipalities::Municipalities;
pub use phone_types::PhoneTypes;
pub use phones::Phones;
pub use regions::Regions;
pub use repository::Repository;
pub use states::States;

/// SET clause shared by every update statement: touches `updated_*` and toggles the soft-delete
/// columns when `is_active` flips. `$active` and `$actor` are the positional parameter numbers.
pub(crate) fn audit_set_clause(active: usize, actor: usize) -> String {
    format!(
        "is_active = COALESCE(${active}::boolean, is_active),
         deleted_at = CASE WHEN ${active}::boolean IS FALSE AND is_active THEN NOW()
                           WHEN ${active}::boolean IS TRUE THEN NULL
                           ELSE deleted_at END,
         deleted_by = CASE WHEN ${active}::boolean IS FALSE AND is_active THEN ${actor}::text
                           WHEN ${active}::boolean IS TRUE THEN NULL
                           ELSE deleted_by END,
         updated_at = NOW(),
         updated_by = ${actor}::text"
    )
}

/// Build a case-insensitive substring pattern for ILIKE, escaping wildcards in user input.
/// Blank input means "no filter".
pub(crate) fn contains_pattern(search: Option<&str>) -> Option<String> {
    let term = search.map(str::trim).filter(|s| !s.is_empty())?;
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    Some(format!("%{escaped}%"))
}
