//! # Session State
//!
//! The one editing session: the quotation, the catalog it draws from, the
//! cover letter and the view mode.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shell ──owns──► SessionState                                           │
//! │                  ├── quotation: Quotation   (rows, order, totals)       │
//! │                  ├── catalog:   Catalog     (read-only)                 │
//! │                  ├── cover:     CoverLetter (plain text)                │
//! │                  └── view_mode: ViewMode    (internal / client)         │
//! │                                                                         │
//! │  Commands borrow it: fn cmd(session: &mut SessionState, raw: &str)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! A single user edits one quotation at a time, so there is no lock.

use quote_core::catalog::Catalog;
use quote_core::cover::CoverLetter;
use quote_core::document::{QuoteDocument, ViewMode};
use quote_core::{CoreError, Quotation, RowId, TaxRate};

use super::ConfigState;
use crate::error::ApiError;

/// Everything one editing session holds.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub quotation: Quotation,
    pub catalog: Catalog,
    pub cover: CoverLetter,
    pub view_mode: ViewMode,
    pub company_name: String,
}

impl SessionState {
    /// Starts an empty quotation with the configured defaults.
    pub fn new(config: &ConfigState, catalog: Catalog) -> Self {
        let quotation = Quotation::new(
            config.default_margin_percent,
            config.market_rate,
            TaxRate::from_percentage(config.tax_percent),
        );

        let mut cover = CoverLetter::default();
        cover.sync_tax_term(config.tax_percent);

        SessionState {
            quotation,
            catalog,
            cover,
            view_mode: ViewMode::Internal,
            company_name: config.company_name.clone(),
        }
    }

    /// Resolves a row reference typed by the user.
    ///
    /// ## Accepted Forms
    /// - 1-based position in display order (`3`)
    /// - Full row id
    /// - Unique id prefix (`4f1c`)
    pub fn resolve_row(&self, reference: &str) -> Result<RowId, ApiError> {
        let reference = reference.trim();
        let rows = self.quotation.rows();

        if let Ok(position) = reference.parse::<usize>() {
            if position >= 1 && position <= rows.len() {
                return Ok(rows[position - 1].id.clone());
            }
        }

        let mut matches = rows
            .iter()
            .filter(|r| !reference.is_empty() && r.id.as_str().starts_with(reference));

        match (matches.next(), matches.next()) {
            (Some(row), None) => Ok(row.id.clone()),
            (Some(_), Some(_)) => Err(ApiError::validation(format!(
                "Row reference '{}' is ambiguous",
                reference
            ))),
            (None, _) => Err(CoreError::RowNotFound(reference.to_string()).into()),
        }
    }

    /// Builds the document for the current view mode.
    pub fn document(&self) -> QuoteDocument {
        self.document_for(self.view_mode)
    }

    /// Builds the document for `view`, whatever the session is showing.
    pub fn document_for(&self, view: ViewMode) -> QuoteDocument {
        QuoteDocument::build(
            &self.quotation,
            &self.catalog,
            &self.cover,
            &self.company_name,
            view,
        )
    }
}
