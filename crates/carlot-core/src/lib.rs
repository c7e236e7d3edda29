//! # carlot-core: Pure Business Logic for Carlot
//!
//! This crate is the **heart** of Carlot. It contains the request-validation
//! and update-delta pipeline for car listings, plus the pagination contract,
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Carlot Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP Clients                                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (axum)                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api Handlers                             │   │
//! │  │    create_car, list_cars, update_car, register, login, ...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ carlot-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌────────────┐                │   │
//! │  │   │   types   │  │ validation │  │ pagination │                │   │
//! │  │   │ Car, User │  │   rules    │  │  windows   │                │   │
//! │  │   │  deltas   │  │   checks   │  │ has_more   │                │   │
//! │  │   └───────────┘  └────────────┘  └────────────┘                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    carlot-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Car, User, drafts, patches, deltas)
//! - [`error`] - Domain error types and aggregated validation errors
//! - [`validation`] - Field constraint checks and normalization
//! - [`pagination`] - Page window computation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Aggregated Diagnostics**: Validation reports ALL failing fields, never
//!    just the first one, and never prints anything as a side effect
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod pagination;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use carlot_core::Car` instead of
// `use carlot_core::types::Car`

pub use error::{CoreError, ValidationErrors};
pub use pagination::{PageRequest, PageWindow};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================
// Range bounds for car fields, expressed as inclusive [MIN, MAX] pairs so
// the diagnostic messages can name the exact accepted bounds.

/// Earliest accepted model year.
pub const YEAR_MIN: i64 = 1971;

/// Latest accepted model year.
pub const YEAR_MAX: i64 = 2024;

/// Smallest accepted engine displacement in cm³.
pub const CM3_MIN: i64 = 1;

/// Largest accepted engine displacement in cm³.
pub const CM3_MAX: i64 = 4_999;

/// Smallest accepted odometer reading in km.
pub const KM_MIN: i64 = 1;

/// Largest accepted odometer reading in km.
pub const KM_MAX: i64 = 499_999;

/// Smallest accepted asking price.
pub const PRICE_MIN: i64 = 1;

/// Largest accepted asking price.
pub const PRICE_MAX: i64 = 99_999;

/// Minimum username length in characters.
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length in characters.
pub const USERNAME_MAX_LEN: usize = 15;

/// Default page size for car listings.
pub const CARS_PER_PAGE: u64 = 10;
