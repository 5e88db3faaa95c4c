//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//! It follows the Repository pattern to provide clean abstractions over database operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐
//! │  Handlers   │     │ Locality sync│
//! └──────┬──────┘     └──────┬───────┘
//!        │                   │
//!        ↓                   ↓
//! ┌──────────────────────────────────┐
//! │ Repositories (db::handlers)      │
//! └──────────────┬───────────────────┘
//!                ↓
//! ┌──────────────────────────────────┐
//! │ Models (db::models)              │
//! └──────────────┬───────────────────┘
//!                ↓
//!          ┌────────────┐
//!          │ PostgreSQL │
//!          └────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations and upserts
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! ## Example Usage
//!
//! ```ignore
//! use geoctl::db::handlers::{Regions, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut regions = Regions::new(&mut tx);
//!
//!     if let Some(region) = regions.get_by_id(3).await? {
//!         println!("Found region: {}", region.name);
//!     }
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Transactions
//!
//! Repositories borrow a `&mut PgConnection`, so the caller decides the transaction boundary.
//! Locality synchronization reconciles every fetched payload through one transaction.

pub mod errors;
pub mod handlers;
pub mod models;
