//! # Repository Module
//!
//! Repository implementations for database access.
//!
//! ## Repository Pattern
//! Each repository owns a clone of the connection pool and exposes the
//! operations the resource layer needs: insert-one, find-one, windowed
//! find, count, field-set update, delete-one.

pub mod car;
pub mod user;

use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Generates a fresh store key.
///
/// UUID v4: globally unique without coordination.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Parses an opaque text identifier into a canonical store key.
///
/// ## Errors
/// `DbError::InvalidId` when the text is not a well-formed UUID. Callers at
/// the HTTP boundary may fold this into a not-found outcome, but the kinds
/// stay distinct here.
pub fn parse_id(id: &str) -> DbResult<String> {
    Uuid::parse_str(id.trim())
        .map(|key| key.to_string())
        .map_err(|_| DbError::invalid_id(id))
}
