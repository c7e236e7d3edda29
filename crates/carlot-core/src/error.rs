//! # Error Types
//!
//! Domain-specific error types for carlot-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  carlot-core errors (this file)                                        │
//! │  ├── CoreError         - Domain errors (empty update, validation)      │
//! │  └── ValidationErrors  - Aggregated per-field input failures           │
//! │                                                                         │
//! │  carlot-db errors (separate crate)                                     │
//! │  └── DbError           - Database operation failures                   │
//! │                                                                         │
//! │  API errors (in apps/api)                                              │
//! │  └── ApiError          - What HTTP clients see (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationErrors → CoreError → DbError → ApiError → Client      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl) where possible
//! 2. Validation failures are aggregated: every failing field is reported,
//!    as a mapping from field name to an ordered list of reasons
//! 3. Errors are typed values, never bare strings or printed diagnostics

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Aggregated Validation Errors
// =============================================================================

/// Aggregated input validation failures.
///
/// Maps each failing field name to an ordered list of human-readable reasons.
/// Validation never stops at the first violation: callers get the full
/// picture in one round trip.
///
/// ## Example
/// ```rust
/// use carlot_core::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// errors.add("year", "must be between 1971 and 2024");
/// errors.add("price", "must be between 1 and 99999");
///
/// assert!(errors.contains("year"));
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    // BTreeMap keeps field ordering stable for serialized responses and tests
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates an empty set of validation errors.
    pub fn new() -> Self {
        ValidationErrors::default()
    }

    /// Records a failure reason for a field.
    ///
    /// Reasons for the same field accumulate in insertion order.
    pub fn add(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(reason.into());
    }

    /// Returns true if no field has failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if the given field has at least one recorded failure.
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Failure reasons recorded for a field, in insertion order.
    pub fn reasons(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates over (field, reasons) pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Converts accumulated failures into a `Result`.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let mut errors = ValidationErrors::new();
    /// // ... run checks ...
    /// errors.into_result()?;
    /// ```
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, reasons) in &self.errors {
            for reason in reasons {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field} {reason}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent domain rule violations. They are recoverable:
/// the caller must correct its input and retry.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input validation failed for one or more fields.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// An update request carried no mutable fields.
    ///
    /// ## When This Occurs
    /// - Every field of the patch was absent or null
    /// - The patch carried only an identifier (never a mutable field)
    #[error("No fields provided for update")]
    EmptyUpdate,
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
