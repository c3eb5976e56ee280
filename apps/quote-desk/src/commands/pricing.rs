//! # Pricing Commands
//!
//! Per-cell edits and the quotation-wide levers.
//!
//! ## Input Handling
//! ```text
//! ┌────────────────────────┬──────────────────────────────────────────────┐
//! │ Command                │ Value parsing                                │
//! ├────────────────────────┼──────────────────────────────────────────────┤
//! │ edit_field             │ lenient: '' → 0, '12kg' → 12 (grid cell);    │
//! │                        │ a negative quantity is rejected              │
//! │ edit_row_total         │ lenient                                      │
//! │ edit_text              │ verbatim                                     │
//! │ set_global_margin      │ strict: must be a number                     │
//! │ set_grand_total        │ strict                                       │
//! │ set_market_rate        │ strict, >= 0                                 │
//! │ set_tax_rate           │ strict, 0..=100                              │
//! └────────────────────────┴──────────────────────────────────────────────┘
//! ```

use std::str::FromStr;

use quote_core::pricing::{RowField, TextField};
use quote_core::quotation::GrandTotalOutcome;
use quote_core::validation::{
    normalize_amount, parse_amount, validate_market_rate, validate_quantity, validate_tax_percent,
};
use quote_core::CoreError;
use tracing::{debug, info, warn};

use super::QuotationResponse;
use crate::error::ApiError;
use crate::state::SessionState;

/// Edits one numeric cell of a row.
///
/// ## Arguments
/// * `row` - Position (1-based) or id prefix
/// * `field` - e.g. `baseCost`, `transAmt`, `qty`, `marginPercent`,
///   `marginAmt`, `price`, `amount`
/// * `value` - Raw cell text
pub fn edit_field(
    session: &mut SessionState,
    row: &str,
    field: &str,
    value: &str,
) -> Result<QuotationResponse, ApiError> {
    debug!(row, field, value, "edit_field command");

    let id = session.resolve_row(row)?;
    let field = RowField::from_str(field)?;
    if field == RowField::Quantity {
        validate_quantity(normalize_amount(value))?;
    }

    if !session.quotation.edit_field(&id, field, value) {
        warn!(row = %id, "edit_field: row not found");
        return Err(CoreError::RowNotFound(id.to_string()).into());
    }

    Ok(QuotationResponse::from(&*session))
}

/// Back-solves a row's price from the line total.
pub fn edit_row_total(
    session: &mut SessionState,
    row: &str,
    amount: &str,
) -> Result<QuotationResponse, ApiError> {
    debug!(row, amount, "edit_row_total command");

    let id = session.resolve_row(row)?;
    if !session.quotation.edit_row_total_amount(&id, amount) {
        warn!(row = %id, "edit_row_total: row not found");
        return Err(CoreError::RowNotFound(id.to_string()).into());
    }

    Ok(QuotationResponse::from(&*session))
}

/// Edits a text cell (`name`, `unit`, `hsn`).
pub fn edit_text(
    session: &mut SessionState,
    row: &str,
    field: &str,
    value: &str,
) -> Result<QuotationResponse, ApiError> {
    debug!(row, field, value, "edit_text command");

    let id = session.resolve_row(row)?;
    let field = TextField::from_str(field)?;

    if !session.quotation.edit_text(&id, field, value) {
        warn!(row = %id, "edit_text: row not found");
        return Err(CoreError::RowNotFound(id.to_string()).into());
    }

    Ok(QuotationResponse::from(&*session))
}

/// Reprices every row at one margin percent.
pub fn set_global_margin(
    session: &mut SessionState,
    margin: &str,
) -> Result<QuotationResponse, ApiError> {
    debug!(margin, "set_global_margin command");

    let margin = parse_amount("margin", margin)?;
    session.quotation.set_global_margin_percent(margin);

    info!(
        margin_percent = margin,
        rows = session.quotation.row_count(),
        "Repriced all rows at a uniform margin"
    );
    Ok(QuotationResponse::from(&*session))
}

/// Back-solves a uniform margin from a desired pre-tax total.
pub fn set_grand_total(
    session: &mut SessionState,
    total: &str,
) -> Result<QuotationResponse, ApiError> {
    debug!(total, "set_grand_total command");

    let total = parse_amount("grand total", total)?;
    match session.quotation.set_grand_total_override(total) {
        GrandTotalOutcome::Repriced(margin) => info!(
            total,
            margin_percent = margin,
            "Grand total override repriced all rows"
        ),
        GrandTotalOutcome::DisplayOnly(_) => warn!(
            total,
            "Grand total override has no cost basis, showing it without repricing"
        ),
    }

    Ok(QuotationResponse::from(&*session))
}

/// Changes the commodity market rate and reprices weight-based rows.
pub fn set_market_rate(
    session: &mut SessionState,
    rate: &str,
) -> Result<QuotationResponse, ApiError> {
    debug!(rate, "set_market_rate command");

    let rate = parse_amount("market rate", rate)?;
    validate_market_rate(rate)?;

    let repriced = session
        .quotation
        .handle_market_rate_change(&session.catalog, rate);

    info!(market_rate = rate, repriced, "Market rate changed");
    Ok(QuotationResponse::from(&*session))
}

/// Changes the tax percent, keeping the cover letter's tax term in step.
pub fn set_tax_rate(
    session: &mut SessionState,
    tax: &str,
) -> Result<QuotationResponse, ApiError> {
    debug!(tax, "set_tax_rate command");

    let tax = parse_amount("tax rate", tax)?;
    validate_tax_percent(tax)?;

    session.quotation.set_tax_percent(tax);
    session.cover.sync_tax_term(tax);

    info!(tax_percent = tax, "Tax rate changed");
    Ok(QuotationResponse::from(&*session))
}
