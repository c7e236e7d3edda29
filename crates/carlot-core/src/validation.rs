//! # Validation Module
//!
//! The request-validation and update-delta pipeline for car listings.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (axum extractors)                                       │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Missing-field rejection                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - Business rule validation                       │
//! │  ├── Range checks on every field, ALL failures aggregated              │
//! │  └── Title-case normalization of brand/make                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── UNIQUE constraints (usernames)                                    │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation here is pure: it returns structured diagnostics and has no
//! observable side effects (no logging, no printing).
//!
//! ## Usage
//! ```rust,no_run
//! use carlot_core::types::{CarDraft, CarPatch};
//! use carlot_core::validation::{validate_new_car, build_update};
//!
//! # let draft: CarDraft = todo!();
//! // Validate and normalize a create request
//! let new_car = validate_new_car(draft).unwrap();
//!
//! // Turn a partial body into a non-empty delta
//! let delta = build_update(CarPatch { year: Some(2010), ..CarPatch::default() }).unwrap();
//! ```

use crate::error::{CoreError, ValidationErrors};
use crate::types::{CarDelta, CarDraft, CarPatch, Credentials, NewCar};
use crate::{
    CM3_MAX, CM3_MIN, KM_MAX, KM_MIN, PRICE_MAX, PRICE_MIN, USERNAME_MAX_LEN, USERNAME_MIN_LEN,
    YEAR_MAX, YEAR_MIN,
};

// =============================================================================
// Normalization
// =============================================================================

/// Title-cases a string the way the listing boundary requires.
///
/// An alphabetic character is uppercased when it starts the string or follows
/// a non-alphabetic character, and lowercased otherwise.
///
/// ## Example
/// ```rust
/// use carlot_core::validation::title_case;
///
/// assert_eq!(title_case("alfa romeo"), "Alfa Romeo");
/// assert_eq!(title_case("BMW"), "Bmw");
/// assert_eq!(title_case("t-roc"), "T-Roc");
/// ```
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;

    for ch in input.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }

    out
}

// =============================================================================
// Field Checks
// =============================================================================

/// Records a failure when `value` falls outside `[min, max]`.
fn check_range(errors: &mut ValidationErrors, field: &str, value: i64, min: i64, max: i64) {
    if value < min || value > max {
        errors.add(field, format!("must be between {min} and {max}"));
    }
}

/// Records a failure when a text field is empty or whitespace.
fn check_required_text(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "is required");
    }
}

// =============================================================================
// Create Pipeline
// =============================================================================

/// Validates a create request and normalizes it into a [`NewCar`].
///
/// ## Rules
/// - `brand`, `make`, `user_id` must be non-empty text
/// - `year` ∈ [`YEAR_MIN`], [`YEAR_MAX`]
/// - `cm3` ∈ [`CM3_MIN`], [`CM3_MAX`]
/// - `km` ∈ [`KM_MIN`], [`KM_MAX`]
/// - `price` ∈ [`PRICE_MIN`], [`PRICE_MAX`]
///
/// Every failing field is reported; validation never stops at the first
/// violation. On success `brand` and `make` are title-cased, so nothing is
/// ever persisted in arbitrary case.
pub fn validate_new_car(draft: CarDraft) -> Result<NewCar, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_required_text(&mut errors, "brand", &draft.brand);
    check_required_text(&mut errors, "make", &draft.make);
    check_required_text(&mut errors, "user_id", &draft.user_id);
    check_range(&mut errors, "year", draft.year, YEAR_MIN, YEAR_MAX);
    check_range(&mut errors, "cm3", draft.cm3, CM3_MIN, CM3_MAX);
    check_range(&mut errors, "km", draft.km, KM_MIN, KM_MAX);
    check_range(&mut errors, "price", draft.price, PRICE_MIN, PRICE_MAX);

    errors.into_result()?;

    Ok(NewCar {
        brand: title_case(draft.brand.trim()),
        make: title_case(draft.make.trim()),
        year: draft.year,
        cm3: draft.cm3,
        km: draft.km,
        price: draft.price,
        user_id: draft.user_id,
        picture_url: draft.picture_url,
    })
}

// =============================================================================
// Update Pipeline
// =============================================================================

/// Validates the present fields of a patch and builds a non-empty [`CarDelta`].
///
/// ## Rules
/// - Absent fields are skipped entirely (no constraint applies)
/// - Present fields get the same range/text checks as creation, aggregated
/// - The identifier field is discarded: it is never mutable, so a patch
///   carrying only an id counts as empty
/// - A delta with zero remaining fields fails with [`CoreError::EmptyUpdate`]
///
/// Present `brand`/`make` values are title-cased, preserving the casing
/// invariant across updates.
pub fn build_update(patch: CarPatch) -> Result<CarDelta, CoreError> {
    let mut errors = ValidationErrors::new();

    if let Some(brand) = &patch.brand {
        check_required_text(&mut errors, "brand", brand);
    }
    if let Some(make) = &patch.make {
        check_required_text(&mut errors, "make", make);
    }
    if let Some(year) = patch.year {
        check_range(&mut errors, "year", year, YEAR_MIN, YEAR_MAX);
    }
    if let Some(cm3) = patch.cm3 {
        check_range(&mut errors, "cm3", cm3, CM3_MIN, CM3_MAX);
    }
    if let Some(km) = patch.km {
        check_range(&mut errors, "km", km, KM_MIN, KM_MAX);
    }
    if let Some(price) = patch.price {
        check_range(&mut errors, "price", price, PRICE_MIN, PRICE_MAX);
    }

    errors.into_result()?;

    // patch.id is intentionally dropped here: the identifier is never mutable
    let delta = CarDelta {
        brand: patch.brand.map(|b| title_case(b.trim())),
        make: patch.make.map(|m| title_case(m.trim())),
        year: patch.year,
        cm3: patch.cm3,
        km: patch.km,
        price: patch.price,
    };

    if delta.is_empty() {
        return Err(CoreError::EmptyUpdate);
    }

    Ok(delta)
}

// =============================================================================
// User Checks
// =============================================================================

/// Validates registration/login credentials.
///
/// ## Rules
/// - `username` must be [`USERNAME_MIN_LEN`]-[`USERNAME_MAX_LEN`] characters
/// - `password` must be non-empty (hashing policy is the caller's concern)
pub fn validate_credentials(credentials: &Credentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let username_len = credentials.username.chars().count();
    if username_len < USERNAME_MIN_LEN || username_len > USERNAME_MAX_LEN {
        errors.add(
            "username",
            format!("must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"),
        );
    }

    if credentials.password.is_empty() {
        errors.add("password", "is required");
    }

    errors.into_result()
}

// =============================================================================
// Unit Tests
// =============================================================================
