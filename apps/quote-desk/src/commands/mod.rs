//! # Commands Module
//!
//! One function per user-facing operation. Each takes the session plus raw
//! user strings and returns a serializable response or an [`ApiError`].
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (shared response type)
//! ├── items.rs     ◄─── Add/remove rows and categories, catalog search
//! ├── pricing.rs   ◄─── Cell edits, global margin, grand total, rates
//! └── document.rs  ◄─── Cover letter, view mode, preview, export
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  shell line: "set 2 marginAmt 950"                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  pricing::edit_field(&mut session, "2", "marginAmt", "950")             │
//! │         │  resolve row ref ──► RowField::from_str ──► Quotation         │
//! │         ▼                                                               │
//! │  Result<QuotationResponse, ApiError>                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  shell prints the table (or JSON)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod document;
pub mod items;
pub mod pricing;

use quote_core::document::ViewMode;
use quote_core::quotation::CategorySection;
use quote_core::QuotationTotals;
use serde::{Deserialize, Serialize};

use crate::state::SessionState;

/// Snapshot of the quotation returned by every mutating command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationResponse {
    pub sections: Vec<CategorySection>,
    pub totals: QuotationTotals,
    /// Pre-tax total to show; differs from `totals.total_value` only after
    /// a grand-total override that had no cost basis.
    pub displayed_total: f64,
    pub global_margin_percent: f64,
    pub market_rate: f64,
    pub view_mode: ViewMode,
    pub row_count: usize,
}

impl From<&SessionState> for QuotationResponse {
    fn from(session: &SessionState) -> Self {
        let quotation = &session.quotation;
        QuotationResponse {
            sections: quotation.sections(&session.catalog),
            totals: *quotation.totals(),
            displayed_total: quotation.displayed_total(),
            global_margin_percent: quotation.global_margin_percent(),
            market_rate: quotation.market_rate(),
            view_mode: session.view_mode,
            row_count: quotation.row_count(),
        }
    }
}
