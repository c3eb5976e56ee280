//! # quote-core: Pure Pricing Logic for Quote Desk
//!
//! This crate holds the whole quotation calculator: per-row cost build-up,
//! margin back-solving, global repricing and totals. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quote Desk Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation (grid UI / interactive shell)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ raw strings                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 quote-desk commands (adapter)                   │   │
//! │  │    add_item, edit_field, set_global_margin, export_document    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ quote-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │ quotation │  │  catalog  │  │ document  │  │   │
//! │  │   │  RowEdit  │  │ Quotation │  │  Catalog  │  │ QuoteDoc  │  │   │
//! │  │   │  derive   │  │  totals   │  │  search   │  │ Renderer  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO LOGGING • NO GLOBAL STATE                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (LineItem, totals, ids)
//! - [`pricing`] - Row Pricing Engine (forward derivation, reverse edits)
//! - [`quotation`] - Aggregation and global-margin propagation
//! - [`catalog`] - Static product catalog and search
//! - [`money`] - Display money in paise with Indian digit grouping
//! - [`validation`] - Input normalization and strict parsing
//! - [`cover`] - Cover letter and terms text
//! - [`document`] - Export records and the renderer seam
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Exact inside**: the engine stores unrounded `f64`; [`Money`] rounds
//!    once at the display boundary
//! 2. **Never NaN**: empty or garbage input is 0, a zero cost basis yields 0%
//! 3. **Never stale**: every mutation recomputes totals before returning
//!
//! ## Example Usage
//!
//! ```rust
//! use quote_core::catalog::Catalog;
//! use quote_core::quotation::Quotation;
//! use quote_core::types::CatalogItemId;
//! use quote_core::COMMODITY_CATEGORY_ID;
//!
//! let catalog = Catalog::builtin();
//! let mut quote = Quotation::default();
//!
//! // 15mm copper pipe, 0.357 kg/mtr at ₹1270/kg
//! quote.add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(3), 1.0);
//!
//! // "This job must come to ₹600" - every row repriced at one margin
//! quote.set_grand_total_override(600.0);
//! assert!((quote.totals().total_value - 600.0).abs() < 0.01);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod cover;
pub mod document;
pub mod error;
pub mod money;
pub mod pricing;
pub mod quotation;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{RowEdit, RowField, TextField};
pub use quotation::Quotation;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Transport markup applied to every new row, in percent of base cost.
pub const DEFAULT_TRANSPORT_PERCENT: f64 = 2.0;

/// Global margin a new quotation starts with.
pub const DEFAULT_MARGIN_PERCENT: f64 = 20.0;

/// Copper price per kg a new quotation starts with.
pub const DEFAULT_MARKET_RATE: f64 = 1270.0;

/// GST 18%, in basis points.
pub const DEFAULT_TAX_BPS: u32 = 1800;

/// The commodity category: its weight-priced items follow the market rate.
pub const COMMODITY_CATEGORY_ID: CategoryId = CategoryId(1000);

/// Reserved bucket for typed-in rows.
pub const CUSTOM_CATEGORY_ID: CategoryId = CategoryId(9999);

/// Classification code on rows created from the catalog.
pub const DEFAULT_HSN_CODE: &str = "9018";

/// Classification code on custom rows.
pub const CUSTOM_HSN_CODE: &str = "Gen";

/// Unit on custom rows.
pub const CUSTOM_UNIT: &str = "nos";
