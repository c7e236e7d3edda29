//! # Domain Types
//!
//! Core domain types for Carlot: car listings, users, and the input shapes
//! that flow through the validation pipeline.
//!
//! ## Type Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Car Type Lifecycle                                │
//! │                                                                         │
//! │  CarDraft (raw create input)                                           │
//! │       │  validation::validate_new_car                                  │
//! │       ▼                                                                 │
//! │  NewCar (validated + normalized, no id yet)                            │
//! │       │  CarRepository::insert (store assigns id)                      │
//! │       ▼                                                                 │
//! │  Car (persisted document)                                              │
//! │       ▲                                                                 │
//! │       │  CarRepository::apply_update                                   │
//! │  CarDelta (validated field overwrites)                                 │
//! │       ▲  validation::build_update                                      │
//! │       │                                                                 │
//! │  CarPatch (raw partial input, all fields optional)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Car
// =============================================================================

/// A persisted car listing.
///
/// ## Invariants
/// - Every persisted Car satisfied full-field validation at creation
/// - `brand` and `make` are title-cased, never stored in arbitrary case
/// - `id` is an opaque, store-assigned key
/// - `user_id` is a lookup key only, not an ownership relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Car {
    /// Store-assigned identifier (UUID text).
    pub id: String,

    /// Manufacturer, title-cased (e.g. "Bmw", "Ford").
    pub brand: String,

    /// Model name, title-cased (e.g. "Fiesta").
    pub make: String,

    /// Model year.
    pub year: i64,

    /// Engine displacement in cm³.
    pub cm3: i64,

    /// Odometer reading in km.
    pub km: i64,

    /// Asking price.
    pub price: i64,

    /// Identifier of the user who created the listing.
    pub user_id: String,

    /// Retrieval URL produced by the media upload host, if a picture
    /// was attached at creation.
    pub picture_url: Option<String>,

    /// When the listing was created.
    pub created_at: DateTime<Utc>,
}

/// Raw create input for a car listing, before validation.
///
/// Field values arrive exactly as the client sent them; nothing is
/// normalized or range-checked yet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CarDraft {
    pub brand: String,
    pub make: String,
    pub year: i64,
    pub cm3: i64,
    pub km: i64,
    pub price: i64,
    pub user_id: String,
    pub picture_url: Option<String>,
}

/// A validated, normalized car ready for insertion.
///
/// The store assigns the identifier at insert time, so there is none here.
/// Constructed only by [`crate::validation::validate_new_car`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCar {
    pub brand: String,
    pub make: String,
    pub year: i64,
    pub cm3: i64,
    pub km: i64,
    pub price: i64,
    pub user_id: String,
    pub picture_url: Option<String>,
}

/// Raw partial-update input: every field optional.
///
/// An `id` field is accepted on the wire (clients echo documents back) but
/// it is never a mutable field; [`crate::validation::build_update`] discards
/// it before counting remaining fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CarPatch {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub brand: Option<String>,
    pub make: Option<String>,
    pub year: Option<i64>,
    pub cm3: Option<i64>,
    pub km: Option<i64>,
    pub price: Option<i64>,
}

/// A validated set of field overwrites for an existing car.
///
/// Guaranteed non-empty by construction: [`crate::validation::build_update`]
/// rejects patches that strip down to zero fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarDelta {
    pub brand: Option<String>,
    pub make: Option<String>,
    pub year: Option<i64>,
    pub cm3: Option<i64>,
    pub km: Option<i64>,
    pub price: Option<i64>,
}

impl CarDelta {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Number of fields this delta will overwrite.
    pub fn field_count(&self) -> usize {
        usize::from(self.brand.is_some())
            + usize::from(self.make.is_some())
            + usize::from(self.year.is_some())
            + usize::from(self.cm3.is_some())
            + usize::from(self.km.is_some())
            + usize::from(self.price.is_some())
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user.
///
/// The password is stored as an argon2 hash; the plaintext never leaves the
/// registration/login handlers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Store-assigned identifier (UUID text).
    pub id: String,

    /// Unique display name, 3-15 characters.
    pub username: String,

    /// Argon2 PHC-format password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Username/password pair as submitted for registration or login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_field_count() {
        let delta = CarDelta::default();
        assert!(delta.is_empty());
        assert_eq!(delta.field_count(), 0);

        let delta = CarDelta {
            year: Some(2001),
            price: Some(4000),
            ..CarDelta::default()
        };
        assert!(!delta.is_empty());
        assert_eq!(delta.field_count(), 2);
    }

    #[test]
    fn test_patch_accepts_underscore_id_alias() {
        let patch: CarPatch = serde_json::from_str(r#"{"_id": "abc", "km": 120000}"#).unwrap();
        assert_eq!(patch.id.as_deref(), Some("abc"));
        assert_eq!(patch.km, Some(120_000));
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: "u-1".to_string(),
            username: "suchart".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "suchart");
    }
}
