//! # Domain Types
//!
//! Core domain types used throughout Quote Desk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │ QuotationTotals │   │ CategorySubtotal│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (RowId)     │   │  total_cost     │   │  cost           │       │
//! │  │  category_id    │   │  total_value    │   │  value          │       │
//! │  │  cost inputs    │   │  total_profit   │   │  profit         │       │
//! │  │  margin driver  │   │  tax, grand     │   └─────────────────┘       │
//! │  │  derived fields │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │   CategoryId    │   │   Direction     │       │
//! │  │  bps (u32)      │   │  1000 = copper  │   │  Up / Down      │       │
//! │  │  1800 = 18%     │   │  9999 = custom  │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exact Values
//! Every `f64` on [`LineItem`] and [`QuotationTotals`] is stored unrounded.
//! Rounding to two decimals happens at the display boundary
//! ([`crate::money::Money`] and [`crate::document`]), so repeated reverse
//! edits never compound rounding error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;

// =============================================================================
// Identifiers
// =============================================================================

/// Integer id of a category group in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct CategoryId(pub u32);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer id of an item within the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct CatalogItemId(pub u32);

impl fmt::Display for CatalogItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a line item, stable for the row's lifetime.
///
/// Backed by a UUID v4 string so ids never collide, even when two rows
/// are added within the same instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RowId(String);

impl RowId {
    /// Generates a fresh, unique row id.
    pub fn new() -> Self {
        RowId(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RowId {
    fn default() -> Self {
        RowId::new()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        RowId(value.to_string())
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18% (standard GST slab)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage. Negative input clamps to zero.
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct.max(0.0) * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage.
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::from_bps(crate::DEFAULT_TAX_BPS)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One row in the quotation.
///
/// ## Field Groups
/// - **Cost inputs** (user-editable): `base_cost`, `transport_percent`,
///   `fitting_cost`, `mounting_cost`, `labour_cost`, `quantity`
/// - **Margin driver**: `margin_percent` (may be negative for a loss-leader)
/// - **Derived**: `transport_amount`, `internal_cost`, `margin_amount`,
///   `quoted_unit_price`, maintained by [`crate::pricing`]
///
/// ## Invariant
/// `quoted_unit_price == internal_cost + margin_amount` after every
/// engine operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: RowId,
    pub category_id: CategoryId,
    /// Source catalog item; `None` for custom items.
    pub catalog_item_id: Option<CatalogItemId>,

    pub name: String,
    pub unit: String,
    /// Free-text classification code (HSN).
    pub hsn_code: String,

    /// Per-unit factory/base price.
    pub base_cost: f64,
    pub transport_percent: f64,
    pub transport_amount: f64,
    /// First auxiliary per-unit cost (fittings).
    pub fitting_cost: f64,
    /// Second auxiliary per-unit cost (saddles, clamps, mounting).
    pub mounting_cost: f64,
    /// Third auxiliary per-unit cost (installation labour).
    pub labour_cost: f64,
    pub quantity: f64,

    pub internal_cost: f64,
    pub margin_percent: f64,
    pub margin_amount: f64,
    pub quoted_unit_price: f64,
}

impl LineItem {
    /// Creates a row with the default transport markup and zero auxiliary
    /// costs. Derived fields are left at zero; run
    /// [`crate::pricing::derive_forward`] before exposing the row.
    pub fn new(
        category_id: CategoryId,
        catalog_item_id: Option<CatalogItemId>,
        name: impl Into<String>,
        unit: impl Into<String>,
        hsn_code: impl Into<String>,
        base_cost: f64,
        margin_percent: f64,
    ) -> Self {
        LineItem {
            id: RowId::new(),
            category_id,
            catalog_item_id,
            name: name.into(),
            unit: unit.into(),
            hsn_code: hsn_code.into(),
            base_cost,
            transport_percent: crate::DEFAULT_TRANSPORT_PERCENT,
            transport_amount: 0.0,
            fitting_cost: 0.0,
            mounting_cost: 0.0,
            labour_cost: 0.0,
            quantity: 1.0,
            internal_cost: 0.0,
            margin_percent,
            margin_amount: 0.0,
            quoted_unit_price: 0.0,
        }
    }

    /// Quoted line total (`quoted_unit_price × quantity`).
    #[inline]
    pub fn line_total(&self) -> f64 {
        self.quoted_unit_price * self.quantity
    }

    /// Fully-loaded line cost (`internal_cost × quantity`).
    #[inline]
    pub fn line_cost(&self) -> f64 {
        self.internal_cost * self.quantity
    }

    /// Profit on a single unit as actually quoted.
    #[inline]
    pub fn unit_profit(&self) -> f64 {
        self.quoted_unit_price - self.internal_cost
    }

    /// Profit on the whole line as actually quoted.
    #[inline]
    pub fn line_profit(&self) -> f64 {
        self.unit_profit() * self.quantity
    }

    /// Margin realized by the quoted price, in percent of internal cost.
    ///
    /// Equal to `margin_percent` whenever the row is consistent; zero when
    /// the row has no cost basis.
    pub fn realized_margin_percent(&self) -> f64 {
        if self.internal_cost > 0.0 {
            self.unit_profit() / self.internal_cost * 100.0
        } else {
            0.0
        }
    }

    /// Whether the row came from the catalog rather than being typed in.
    #[inline]
    pub fn is_custom(&self) -> bool {
        self.catalog_item_id.is_none()
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Roll-up of cost, value and profit for one category section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategorySubtotal {
    pub cost: f64,
    pub value: f64,
    pub profit: f64,
}

impl CategorySubtotal {
    /// Sums the given rows.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a LineItem>) -> Self {
        let mut subtotal = CategorySubtotal::default();
        for row in rows {
            subtotal.cost += row.line_cost();
            subtotal.value += row.line_total();
        }
        subtotal.profit = subtotal.value - subtotal.cost;
        subtotal
    }
}

/// Quotation-wide totals, recomputed after every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuotationTotals {
    /// Σ internal_cost × quantity
    pub total_cost: f64,
    /// Σ quoted_unit_price × quantity
    pub total_value: f64,
    /// total_value − total_cost
    pub total_profit: f64,
    pub tax_percent: f64,
    /// total_value × tax_percent / 100
    pub tax_amount: f64,
    /// total_value + tax_amount
    pub grand_total: f64,
}

impl QuotationTotals {
    /// Sums all rows and applies the tax rate.
    pub fn compute<'a>(rows: impl IntoIterator<Item = &'a LineItem>, tax: TaxRate) -> Self {
        let sums = CategorySubtotal::from_rows(rows);
        let tax_percent = tax.percentage();
        let tax_amount = sums.value * tax_percent / 100.0;
        QuotationTotals {
            total_cost: sums.cost,
            total_value: sums.value,
            total_profit: sums.profit,
            tax_percent,
            tax_amount,
            grand_total: sums.value + tax_amount,
        }
    }

    /// Average margin actually realized across the quotation.
    pub fn realized_margin_percent(&self) -> f64 {
        if self.total_cost > 0.0 {
            self.total_profit / self.total_cost * 100.0
        } else {
            0.0
        }
    }
}

// =============================================================================
// Category Reordering
// =============================================================================

/// Direction to move a category within the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(ValidationError::InvalidFormat {
                field: "direction".to_string(),
                reason: format!("expected 'up' or 'down', got '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(internal_cost: f64, quoted: f64, quantity: f64) -> LineItem {
        let mut row = LineItem::new(CategoryId(1), None, "Row", "nos", "Gen", 0.0, 0.0);
        row.internal_cost = internal_cost;
        row.quoted_unit_price = quoted;
        row.quantity = quantity;
        row
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(18.0);
        assert_eq!(rate.bps(), 1800);
        assert!((rate.percentage() - 18.0).abs() < 0.001);
        assert_eq!(TaxRate::from_percentage(-5.0), TaxRate::zero());
    }

    #[test]
    fn test_tax_rate_default_is_gst() {
        assert_eq!(TaxRate::default().bps(), 1800);
    }

    #[test]
    fn test_row_ids_are_unique() {
        assert_ne!(RowId::new(), RowId::new());
    }

    #[test]
    fn test_new_line_item_defaults() {
        let row = LineItem::new(CategoryId(1000), Some(CatalogItemId(3)), "15mm", "mtr", "9018", 453.39, 20.0);
        assert_eq!(row.transport_percent, 2.0);
        assert_eq!(row.quantity, 1.0);
        assert_eq!(row.fitting_cost, 0.0);
        assert!(!row.is_custom());
    }

    #[test]
    fn test_line_profit_readouts() {
        let row = row(100.0, 125.0, 4.0);
        assert_eq!(row.line_total(), 500.0);
        assert_eq!(row.line_cost(), 400.0);
        assert_eq!(row.line_profit(), 100.0);
        assert!((row.realized_margin_percent() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_realized_margin_zero_cost() {
        let row = row(0.0, 50.0, 1.0);
        assert_eq!(row.realized_margin_percent(), 0.0);
    }

    #[test]
    fn test_totals_compute() {
        let rows = vec![row(100.0, 120.0, 1.0), row(200.0, 240.0, 2.0)];
        let totals = QuotationTotals::compute(&rows, TaxRate::from_percentage(18.0));
        assert_eq!(totals.total_cost, 500.0);
        assert_eq!(totals.total_value, 600.0);
        assert_eq!(totals.total_profit, 100.0);
        assert!((totals.tax_amount - 108.0).abs() < 1e-9);
        assert!((totals.grand_total - 708.0).abs() < 1e-9);
        assert!((totals.realized_margin_percent() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!(" DOWN ".parse::<Direction>().unwrap(), Direction::Down);
        assert!("left".parse::<Direction>().is_err());
    }
}
