//! # Error Types
//!
//! Domain-specific error types for quote-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quote-core errors (this file)                                         │
//! │  ├── CoreError        - Lookups, catalog data and rendering failures   │
//! │  └── ValidationError  - Strict input validation failures               │
//! │                                                                         │
//! │  quote-desk errors (app)                                               │
//! │  └── ApiError         - What the shell / frontend sees (serialized)    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → User                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Where Errors Do NOT Appear
//! The pricing and aggregation engines never fail. Empty or non-numeric
//! input becomes 0, division by a zero cost basis becomes 0, and unknown
//! row/category ids are no-ops. These errors only exist for the adapter
//! that sits in front of the engine and wants to tell the user *why*
//! nothing happened.

use thiserror::Error;

use crate::types::{CatalogItemId, CategoryId};

// =============================================================================
// Core Error
// =============================================================================

/// Core lookup and data errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Catalog has no such item in the given category.
    #[error("Catalog item {item_id} not found in category {category_id}")]
    CatalogItemNotFound {
        category_id: CategoryId,
        item_id: CatalogItemId,
    },

    /// Category is not part of the quotation.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// Line item id is not part of the quotation.
    #[error("Row not found: {0}")]
    RowNotFound(String),

    /// Catalog data could not be parsed.
    ///
    /// ## When This Occurs
    /// - A catalog JSON file is malformed
    /// - An item declares neither `weight` nor `baseCost`
    #[error("Invalid catalog data: {0}")]
    InvalidCatalog(String),

    /// A document renderer failed to produce output.
    #[error("Document rendering failed: {0}")]
    Render(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the strict parsers in [`crate::validation`]. The lenient
/// normalizers the engine relies on never produce these.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value is not a finite number.
    #[error("{field} is not a number: '{value}'")]
    InvalidNumber { field: String, value: String },

    /// Invalid format (e.g., unknown field name, unknown direction).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
