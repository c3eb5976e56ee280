//! # Row Pricing Engine
//!
//! Keeps one [`LineItem`] internally consistent under any single-field edit.
//!
//! ## Forward Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base_cost ──┬──► transport_amount = base × transport% / 100            │
//! │              │                                                          │
//! │              └──► internal_cost = base + transport + fitting            │
//! │                                   + mounting + labour                   │
//! │                           │                                             │
//! │   margin% ────────────────┼──► margin_amount = internal × margin% / 100 │
//! │                           │                                             │
//! │                           └──► quoted_unit_price = internal + margin    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reverse Edits (back-solve)
//! ```text
//! ┌────────────────────┬────────────────────────────────┬──────────────────┐
//! │ Edited field       │ Back-solved                    │ Then             │
//! ├────────────────────┼────────────────────────────────┼──────────────────┤
//! │ transport_amount   │ transport%                     │ derive_forward   │
//! │ margin_amount      │ margin%, quoted price          │ stop             │
//! │ quoted_unit_price  │ margin amount, margin%         │ stop             │
//! │ line total         │ quoted price, margin, margin%  │ stop             │
//! │ anything else      │ (nothing)                      │ derive_forward   │
//! └────────────────────┴────────────────────────────────┴──────────────────┘
//! ```
//! Reverse edits of the margin/price stop short of [`derive_forward`]: the
//! edited value is the driver for that edit and must survive untouched.
//!
//! Every function here is pure: it takes a row by reference and returns
//! the updated row.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::LineItem;
use crate::validation::{normalize_amount, sanitize};

// =============================================================================
// Edit Intents
// =============================================================================

/// One per-cell edit of a line item, carrying the already-normalized value.
///
/// Matching on this enum is exhaustive, so adding an editable field forces
/// a decision about what it back-solves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum RowEdit {
    BaseCost(f64),
    TransportPercent(f64),
    TransportAmount(f64),
    FittingCost(f64),
    MountingCost(f64),
    LabourCost(f64),
    Quantity(f64),
    MarginPercent(f64),
    MarginAmount(f64),
    QuotedUnitPrice(f64),
    /// Desired line total (`quoted_unit_price × quantity`).
    LineTotal(f64),
}

/// Numeric fields addressable by name from a grid or shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum RowField {
    BaseCost,
    TransportPercent,
    TransportAmount,
    FittingCost,
    MountingCost,
    LabourCost,
    Quantity,
    MarginPercent,
    MarginAmount,
    QuotedUnitPrice,
    LineTotal,
}

impl RowField {
    /// Every editable numeric field, in grid column order.
    pub const ALL: [RowField; 11] = [
        RowField::BaseCost,
        RowField::TransportPercent,
        RowField::TransportAmount,
        RowField::FittingCost,
        RowField::MountingCost,
        RowField::LabourCost,
        RowField::Quantity,
        RowField::MarginPercent,
        RowField::MarginAmount,
        RowField::QuotedUnitPrice,
        RowField::LineTotal,
    ];

    /// Pairs the field with a value to form an edit.
    pub fn with_value(self, value: f64) -> RowEdit {
        match self {
            RowField::BaseCost => RowEdit::BaseCost(value),
            RowField::TransportPercent => RowEdit::TransportPercent(value),
            RowField::TransportAmount => RowEdit::TransportAmount(value),
            RowField::FittingCost => RowEdit::FittingCost(value),
            RowField::MountingCost => RowEdit::MountingCost(value),
            RowField::LabourCost => RowEdit::LabourCost(value),
            RowField::Quantity => RowEdit::Quantity(value),
            RowField::MarginPercent => RowEdit::MarginPercent(value),
            RowField::MarginAmount => RowEdit::MarginAmount(value),
            RowField::QuotedUnitPrice => RowEdit::QuotedUnitPrice(value),
            RowField::LineTotal => RowEdit::LineTotal(value),
        }
    }

    /// Normalizes a raw cell string (`""` is 0) into an edit.
    pub fn parse_edit(self, raw: &str) -> RowEdit {
        self.with_value(normalize_amount(raw))
    }

    /// The camelCase name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RowField::BaseCost => "baseCost",
            RowField::TransportPercent => "transportPercent",
            RowField::TransportAmount => "transportAmount",
            RowField::FittingCost => "fittingCost",
            RowField::MountingCost => "mountingCost",
            RowField::LabourCost => "labourCost",
            RowField::Quantity => "quantity",
            RowField::MarginPercent => "marginPercent",
            RowField::MarginAmount => "marginAmount",
            RowField::QuotedUnitPrice => "quotedUnitPrice",
            RowField::LineTotal => "lineTotal",
        }
    }
}

impl FromStr for RowField {
    type Err = ValidationError;

    /// Accepts camelCase, snake_case and the short grid column names
    /// (`qty`, `transAmt`, `marginAmt`, `price`, `amount`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        let field = match key.as_str() {
            "basecost" | "base" | "factoryprice" => RowField::BaseCost,
            "transportpercent" | "transpercent" | "transport%" => RowField::TransportPercent,
            "transportamount" | "transamt" | "transport" => RowField::TransportAmount,
            "fittingcost" | "fitting" => RowField::FittingCost,
            "mountingcost" | "mounting" | "saddlecost" | "saddle" => RowField::MountingCost,
            "labourcost" | "labour" | "laborcost" | "labor" | "workcost" => RowField::LabourCost,
            "quantity" | "qty" => RowField::Quantity,
            "marginpercent" | "margin%" | "margin" => RowField::MarginPercent,
            "marginamount" | "marginamt" => RowField::MarginAmount,
            "quotedunitprice" | "quotedprice" | "price" | "rate" => RowField::QuotedUnitPrice,
            "linetotal" | "amount" | "total" => RowField::LineTotal,
            _ => {
                return Err(ValidationError::InvalidFormat {
                    field: "field".to_string(),
                    reason: format!("unknown row field '{}'", s.trim()),
                })
            }
        };
        Ok(field)
    }
}

/// Plain-text fields: stored verbatim, no derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
    Name,
    Unit,
    HsnCode,
}

impl FromStr for TextField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "description" => Ok(TextField::Name),
            "unit" => Ok(TextField::Unit),
            "hsn" | "hsncode" | "hsn_code" | "code" => Ok(TextField::HsnCode),
            other => Err(ValidationError::InvalidFormat {
                field: "field".to_string(),
                reason: format!("unknown text field '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Engine Operations
// =============================================================================

/// Returns `part` as a percentage of `whole`; 0 when there is no positive
/// cost basis to divide by.
#[inline]
fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Recomputes every derived field from the cost inputs and the effective
/// margin.
///
/// When `margin_override` is given it replaces the row's margin percent,
/// which is how global repricing pushes one margin onto every row.
///
/// ## Example
/// ```rust
/// use quote_core::pricing::derive_forward;
/// use quote_core::types::{CategoryId, LineItem};
///
/// let row = LineItem::new(CategoryId(1001), None, "Valve", "nos", "9018", 100.0, 20.0);
/// let row = derive_forward(&row, None);
/// assert!((row.internal_cost - 102.0).abs() < 1e-9);
/// assert!((row.quoted_unit_price - 122.4).abs() < 1e-9);
///
/// let repriced = derive_forward(&row, Some(50.0));
/// assert_eq!(repriced.margin_percent, 50.0);
/// assert!((repriced.quoted_unit_price - 153.0).abs() < 1e-9);
/// ```
pub fn derive_forward(row: &LineItem, margin_override: Option<f64>) -> LineItem {
    let mut next = row.clone();
    let margin_percent = sanitize(margin_override.unwrap_or(row.margin_percent));

    next.transport_amount = next.base_cost * next.transport_percent / 100.0;
    next.internal_cost = next.base_cost
        + next.transport_amount
        + next.fitting_cost
        + next.mounting_cost
        + next.labour_cost;
    next.margin_percent = margin_percent;
    next.margin_amount = next.internal_cost * margin_percent / 100.0;
    next.quoted_unit_price = next.internal_cost + next.margin_amount;
    next
}

/// Applies one edit and restores consistency.
///
/// Exactly one field drives each edit; see the module table for what is
/// back-solved. Non-finite values are treated as 0.
pub fn apply_edit(row: &LineItem, edit: RowEdit) -> LineItem {
    let mut next = row.clone();

    match edit {
        RowEdit::BaseCost(v) => next.base_cost = sanitize(v),
        RowEdit::TransportPercent(v) => next.transport_percent = sanitize(v),
        RowEdit::TransportAmount(v) => {
            let amount = sanitize(v);
            next.transport_amount = amount;
            next.transport_percent = percent_of(amount, next.base_cost);
        }
        RowEdit::FittingCost(v) => next.fitting_cost = sanitize(v),
        RowEdit::MountingCost(v) => next.mounting_cost = sanitize(v),
        RowEdit::LabourCost(v) => next.labour_cost = sanitize(v),
        RowEdit::Quantity(v) => next.quantity = sanitize(v).max(0.0),
        RowEdit::MarginPercent(v) => next.margin_percent = sanitize(v),
        RowEdit::MarginAmount(v) => {
            let amount = sanitize(v);
            next.margin_amount = amount;
            next.margin_percent = percent_of(amount, next.internal_cost);
            next.quoted_unit_price = next.internal_cost + amount;
            return next;
        }
        RowEdit::QuotedUnitPrice(v) => {
            set_quoted_price(&mut next, sanitize(v));
            return next;
        }
        RowEdit::LineTotal(v) => {
            let divisor = if next.quantity > 0.0 { next.quantity } else { 1.0 };
            set_quoted_price(&mut next, sanitize(v) / divisor);
            return next;
        }
    }

    derive_forward(&next, None)
}

/// Price is the driver: margin amount and percent follow from it.
fn set_quoted_price(row: &mut LineItem, price: f64) {
    row.quoted_unit_price = price;
    row.margin_amount = price - row.internal_cost;
    row.margin_percent = percent_of(row.margin_amount, row.internal_cost);
}

/// Single entry point for a per-cell edit arriving as a raw string.
///
/// ## Example
/// ```rust
/// use quote_core::pricing::{derive_forward, edit_field, RowField};
/// use quote_core::types::{CategoryId, LineItem};
///
/// let row = derive_forward(
///     &LineItem::new(CategoryId(1001), None, "Valve", "nos", "9018", 100.0, 20.0),
///     None,
/// );
/// let row = edit_field(&row, RowField::QuotedUnitPrice, "153");
/// assert_eq!(row.quoted_unit_price, 153.0);
/// assert!((row.margin_percent - 50.0).abs() < 1e-9);
///
/// let row = edit_field(&row, RowField::FittingCost, "");
/// assert_eq!(row.fitting_cost, 0.0);
/// ```
pub fn edit_field(row: &LineItem, field: RowField, raw: &str) -> LineItem {
    apply_edit(row, field.parse_edit(raw))
}

/// Back-solves the unit price, margin and margin percent from a desired
/// line total.
///
/// The amount is divided by the quantity whenever the quantity is
/// positive, so the row's line total afterwards equals the amount typed,
/// fractional lengths below 1 included (0.5 mtr for 100 prices at 200).
/// Only a zero quantity divides by 1. This departs from a
/// `max(quantity, 1)` divisor, which gives the same result for quantities
/// of 1 or more but would print 50 for the 0.5 mtr line.
pub fn edit_row_total_amount(row: &LineItem, raw_amount: &str) -> LineItem {
    apply_edit(row, RowEdit::LineTotal(normalize_amount(raw_amount)))
}

/// Stores a plain-text field verbatim.
pub fn edit_text(row: &LineItem, field: TextField, value: &str) -> LineItem {
    let mut next = row.clone();
    let value = value.to_string();
    match field {
        TextField::Name => next.name = value,
        TextField::Unit => next.unit = value,
        TextField::HsnCode => next.hsn_code = value,
    }
    next
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogItemId, CategoryId};

    const EPS: f64 = 0.01;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn consistent(row: &LineItem) -> bool {
        close(row.quoted_unit_price, row.internal_cost + row.margin_amount)
    }

    fn valve(base_cost: f64, margin: f64) -> LineItem {
        derive_forward(
            &LineItem::new(CategoryId(1001), Some(CatalogItemId(15)), "Valve", "nos", "9018", base_cost, margin),
            None,
        )
    }

    #[test]
    fn test_pipe_row_forward_derivation() {
        // 15mm copper pipe: 0.357 kg/mtr at 1270/kg
        let row = LineItem::new(CategoryId(1000), Some(CatalogItemId(3)), "15mm", "mtr", "9018", 0.357 * 1270.0, 20.0);
        let row = derive_forward(&row, None);

        assert!(close(row.base_cost, 453.39));
        assert!(close(row.transport_amount, 9.07));
        assert!(close(row.internal_cost, 462.46));
        assert!(close(row.margin_amount, 92.49));
        assert!(close(row.quoted_unit_price, 554.95));
    }

    #[test]
    fn test_margin_override_sets_margin_percent() {
        let row = valve(100.0, 20.0);
        let row = derive_forward(&row, Some(35.0));
        assert_eq!(row.margin_percent, 35.0);
        assert!(close(row.quoted_unit_price, 102.0 * 1.35));
    }

    #[test]
    fn test_every_edit_keeps_price_consistent() {
        let mut row = valve(710.0, 20.0);
        let edits = [
            RowEdit::BaseCost(800.0),
            RowEdit::TransportPercent(5.0),
            RowEdit::TransportAmount(12.5),
            RowEdit::FittingCost(40.0),
            RowEdit::MountingCost(15.0),
            RowEdit::LabourCost(120.0),
            RowEdit::Quantity(3.0),
            RowEdit::MarginPercent(-10.0),
            RowEdit::MarginAmount(77.7),
            RowEdit::QuotedUnitPrice(1234.56),
            RowEdit::LineTotal(5000.0),
            RowEdit::MarginPercent(22.5),
        ];

        for edit in edits {
            row = apply_edit(&row, edit);
            assert!(consistent(&row), "inconsistent after {:?}: {:?}", edit, row);
        }
    }

    #[test]
    fn test_margin_percent_round_trip_through_amount() {
        let row = valve(453.39, 20.0);
        let row = edit_field(&row, RowField::MarginPercent, "27.3");
        let amount = row.margin_amount;

        let row = edit_field(&row, RowField::MarginAmount, &amount.to_string());
        assert!(close(row.margin_percent, 27.3));
        assert!(close(row.quoted_unit_price, row.internal_cost * 1.273));
    }

    #[test]
    fn test_quoted_price_round_trip() {
        let row = valve(600.0, 20.0);
        let row = edit_field(&row, RowField::QuotedUnitPrice, "999.99");

        assert_eq!(row.quoted_unit_price, 999.99);
        assert!(close(row.margin_amount, 999.99 - row.internal_cost));
        assert!(close(row.margin_percent, (999.99 / 612.0 - 1.0) * 100.0));
    }

    #[test]
    fn test_quoted_price_edit_does_not_rederive() {
        let row = valve(100.0, 20.0);
        let row = apply_edit(&row, RowEdit::QuotedUnitPrice(100.0));
        // Below cost: negative margin, still exactly the typed price.
        assert_eq!(row.quoted_unit_price, 100.0);
        assert!(close(row.margin_amount, -2.0));
        assert!(row.margin_percent < 0.0);
    }

    #[test]
    fn test_zero_cost_margin_amount_edit() {
        let row = valve(0.0, 20.0);
        assert_eq!(row.internal_cost, 0.0);

        let row = edit_field(&row, RowField::MarginAmount, "500");
        assert_eq!(row.margin_percent, 0.0);
        assert!(!row.margin_percent.is_nan());
        assert_eq!(row.quoted_unit_price, 500.0);
    }

    #[test]
    fn test_zero_cost_quoted_price_edit() {
        let row = valve(0.0, 20.0);
        let row = edit_field(&row, RowField::QuotedUnitPrice, "250");
        assert_eq!(row.margin_percent, 0.0);
        assert_eq!(row.margin_amount, 250.0);
        assert!(consistent(&row));
    }

    #[test]
    fn test_transport_amount_back_solves_percent() {
        let row = valve(500.0, 20.0);
        let row = edit_field(&row, RowField::TransportAmount, "25");

        assert!(close(row.transport_percent, 5.0));
        assert!(close(row.transport_amount, 25.0));
        assert!(close(row.internal_cost, 525.0));
        assert!(close(row.quoted_unit_price, 630.0));
    }

    #[test]
    fn test_transport_amount_with_zero_base() {
        let row = valve(0.0, 20.0);
        let row = edit_field(&row, RowField::TransportAmount, "25");
        assert_eq!(row.transport_percent, 0.0);
        assert_eq!(row.transport_amount, 0.0);
    }

    #[test]
    fn test_transport_percent_recomputes_amount() {
        let row = valve(500.0, 20.0);
        let row = edit_field(&row, RowField::TransportPercent, "10");
        assert!(close(row.transport_amount, 50.0));
    }

    #[test]
    fn test_empty_input_is_zero() {
        let row = valve(500.0, 20.0);
        let row = edit_field(&row, RowField::BaseCost, "");
        assert_eq!(row.base_cost, 0.0);
        assert_eq!(row.internal_cost, 0.0);
        assert_eq!(row.quoted_unit_price, 0.0);
    }

    #[test]
    fn test_garbage_input_never_stores_nan() {
        let row = valve(500.0, 20.0);
        let row = edit_field(&row, RowField::MarginPercent, "lots");
        assert_eq!(row.margin_percent, 0.0);
        let row = apply_edit(&row, RowEdit::FittingCost(f64::NAN));
        assert_eq!(row.fitting_cost, 0.0);
        assert!(consistent(&row));
    }

    #[test]
    fn test_row_total_back_solve() {
        let row = apply_edit(&valve(100.0, 20.0), RowEdit::Quantity(4.0));
        let row = edit_row_total_amount(&row, "612");

        assert!(close(row.quoted_unit_price, 153.0));
        assert!(close(row.margin_amount, 51.0));
        assert!(close(row.margin_percent, 50.0));
        assert!(close(row.line_total(), 612.0));
    }

    #[test]
    fn test_row_total_with_zero_quantity() {
        let row = apply_edit(&valve(100.0, 20.0), RowEdit::Quantity(0.0));
        let row = edit_row_total_amount(&row, "150");
        assert!(close(row.quoted_unit_price, 150.0));
        assert!(consistent(&row));
    }

    #[test]
    fn test_row_total_with_fractional_quantity() {
        let row = apply_edit(&valve(100.0, 20.0), RowEdit::Quantity(2.5));
        let row = edit_row_total_amount(&row, "500");
        assert!(close(row.quoted_unit_price, 200.0));
        assert!(close(row.line_total(), 500.0));
    }

    #[test]
    fn test_loss_leader_margin() {
        let row = edit_field(&valve(100.0, 20.0), RowField::MarginPercent, "-15");
        assert!(close(row.quoted_unit_price, 102.0 * 0.85));
        assert!(row.line_profit() < 0.0);
    }

    #[test]
    fn test_text_edits_do_not_touch_numbers() {
        let row = valve(100.0, 20.0);
        let edited = edit_text(&row, TextField::Name, "Ball valve 15mm");
        let edited = edit_text(&edited, TextField::HsnCode, "8481");
        assert_eq!(edited.name, "Ball valve 15mm");
        assert_eq!(edited.hsn_code, "8481");
        assert_eq!(edited.quoted_unit_price, row.quoted_unit_price);
    }

    #[test]
    fn test_row_field_names() {
        assert_eq!("marginAmt".parse::<RowField>().unwrap(), RowField::MarginAmount);
        assert_eq!("margin_amount".parse::<RowField>().unwrap(), RowField::MarginAmount);
        assert_eq!("qty".parse::<RowField>().unwrap(), RowField::Quantity);
        assert_eq!("transAmt".parse::<RowField>().unwrap(), RowField::TransportAmount);
        assert_eq!("amount".parse::<RowField>().unwrap(), RowField::LineTotal);
        assert!("colour".parse::<RowField>().is_err());

        for field in RowField::ALL {
            assert_eq!(field.as_str().parse::<RowField>().unwrap(), field);
        }
    }

    #[test]
    fn test_text_field_names() {
        assert_eq!("hsn".parse::<TextField>().unwrap(), TextField::HsnCode);
        assert_eq!("Name".parse::<TextField>().unwrap(), TextField::Name);
        assert!("price".parse::<TextField>().is_err());
    }

    #[test]
    fn test_row_total_below_one_unit() {
        let row = edit_field(&valve(100.0, 20.0), RowField::Quantity, "0.5");
        let row = edit_row_total_amount(&row, "100");

        assert!(close(row.quoted_unit_price, 200.0));
        assert!(close(row.line_total(), 100.0));
    }

    #[test]
    fn test_negative_quantity_clamps_to_zero() {
        let row = edit_field(&valve(100.0, 20.0), RowField::Quantity, "-3");
        assert_eq!(row.quantity, 0.0);
        assert_eq!(row.line_cost(), 0.0);
    }
}
