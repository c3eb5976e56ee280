//! # Quotation Aggregate
//!
//! Owns the line items and the category display order, keeps totals
//! current, and implements the two global reverse operations (uniform
//! repricing and grand-total back-solve).
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item / remove_* / edit_* / set_* / handle_market_rate_change       │
//! │                │                                                        │
//! │                ▼                                                        │
//! │     rows: Vec<LineItem>  (pricing::derive_forward / apply_edit)         │
//! │                │                                                        │
//! │                ▼  (same call, synchronously)                            │
//! │     recompute_totals()  ──►  QuotationTotals                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! No caller can observe rows and totals out of step: every mutator ends
//! with a recompute before returning.
//!
//! ## Ownership
//! A `Quotation` is a plain value owned by the session. It never holds the
//! [`Catalog`]; operations that need it borrow one.
//!
//! ## Missing Ids
//! Removing, reordering or editing something that is not there is a no-op.
//! Mutators return `bool` (or `Option`) so the adapter can report it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::pricing::{self, RowEdit, RowField, TextField};
use crate::types::{
    CatalogItemId, CategoryId, CategorySubtotal, Direction, LineItem, QuotationTotals, RowId,
    TaxRate,
};
use crate::validation::{normalize_amount, sanitize};
use crate::{
    COMMODITY_CATEGORY_ID, CUSTOM_CATEGORY_ID, CUSTOM_HSN_CODE, CUSTOM_UNIT, DEFAULT_HSN_CODE,
    DEFAULT_MARGIN_PERCENT, DEFAULT_MARKET_RATE,
};

/// One category's rows, in insertion order, with their subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategorySection {
    pub category_id: CategoryId,
    pub name: String,
    pub rows: Vec<LineItem>,
    pub subtotal: CategorySubtotal,
}

/// What a grand-total override did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrandTotalOutcome {
    /// Every row was repriced at this uniform margin percent.
    Repriced(f64),
    /// No cost basis: the typed total is only displayed.
    DisplayOnly(f64),
}

// =============================================================================
// Quotation
// =============================================================================

/// The quotation being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    rows: Vec<LineItem>,
    category_order: Vec<CategoryId>,
    global_margin_percent: f64,
    market_rate: f64,
    tax_rate: TaxRate,
    totals: QuotationTotals,
    displayed_total: Option<f64>,
}

impl Default for Quotation {
    fn default() -> Self {
        Quotation::new(DEFAULT_MARGIN_PERCENT, DEFAULT_MARKET_RATE, TaxRate::default())
    }
}

impl Quotation {
    /// Creates an empty quotation.
    pub fn new(global_margin_percent: f64, market_rate: f64, tax_rate: TaxRate) -> Self {
        let mut quotation = Quotation {
            rows: Vec::new(),
            category_order: Vec::new(),
            global_margin_percent: sanitize(global_margin_percent),
            market_rate: sanitize(market_rate),
            tax_rate,
            totals: QuotationTotals::default(),
            displayed_total: None,
        };
        quotation.recompute_totals();
        quotation
    }

    // -------------------------------------------------------------------------
    // Adding and removing
    // -------------------------------------------------------------------------

    /// Adds a catalog item at the current market rate and global margin.
    ///
    /// Returns `None` (and changes nothing) when the catalog has no such
    /// item.
    ///
    /// ## Example
    /// ```rust
    /// use quote_core::catalog::Catalog;
    /// use quote_core::quotation::Quotation;
    /// use quote_core::types::CatalogItemId;
    /// use quote_core::COMMODITY_CATEGORY_ID;
    ///
    /// let catalog = Catalog::builtin();
    /// let mut quote = Quotation::default();
    /// let id = quote.add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(3), 1.0);
    ///
    /// let row = quote.row(&id.unwrap()).unwrap();
    /// assert!((row.quoted_unit_price - 554.95).abs() < 0.01);
    /// ```
    pub fn add_item(
        &mut self,
        catalog: &Catalog,
        category_id: CategoryId,
        item_id: CatalogItemId,
        quantity: f64,
    ) -> Option<RowId> {
        let item = catalog.item(category_id, item_id)?;

        let mut row = LineItem::new(
            category_id,
            Some(item_id),
            item.name.clone(),
            item.unit.clone(),
            DEFAULT_HSN_CODE,
            item.base_cost_at(self.market_rate),
            self.global_margin_percent,
        );
        row.quantity = sanitize(quantity).max(0.0);

        Some(self.push_row(row))
    }

    /// Adds a typed-in item to the custom bucket. An empty name skips the
    /// addition.
    pub fn add_custom_item(&mut self, name: &str, raw_price: &str) -> Option<RowId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let row = LineItem::new(
            CUSTOM_CATEGORY_ID,
            None,
            name,
            CUSTOM_UNIT,
            CUSTOM_HSN_CODE,
            normalize_amount(raw_price),
            self.global_margin_percent,
        );

        Some(self.push_row(row))
    }

    fn push_row(&mut self, row: LineItem) -> RowId {
        let row = pricing::derive_forward(&row, None);
        let id = row.id.clone();

        if !self.category_order.contains(&row.category_id) {
            self.category_order.push(row.category_id);
        }
        self.rows.push(row);
        self.recompute_totals();
        id
    }

    /// Removes one row. Returns `false` when the id is unknown.
    pub fn remove_item(&mut self, id: &RowId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| &r.id != id);
        let removed = self.rows.len() != before;
        if removed {
            self.recompute_totals();
        }
        removed
    }

    /// Removes a category section and all of its rows.
    pub fn remove_category(&mut self, category_id: CategoryId) -> bool {
        let before = (self.rows.len(), self.category_order.len());
        self.category_order.retain(|c| *c != category_id);
        self.rows.retain(|r| r.category_id != category_id);

        let changed = before != (self.rows.len(), self.category_order.len());
        if changed {
            self.recompute_totals();
        }
        changed
    }

    /// Swaps the category at `index` with its neighbour. Moving the first
    /// category up, the last one down, or an out-of-range index does
    /// nothing.
    pub fn reorder_category(&mut self, index: usize, direction: Direction) -> bool {
        let len = self.category_order.len();
        if index >= len {
            return false;
        }

        let target = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < len => index + 1,
            _ => return false,
        };

        self.category_order.swap(index, target);
        true
    }

    // -------------------------------------------------------------------------
    // Per-row edits
    // -------------------------------------------------------------------------

    fn update_row(&mut self, id: &RowId, update: impl FnOnce(&LineItem) -> LineItem) -> bool {
        let Some(row) = self.rows.iter_mut().find(|r| &r.id == id) else {
            return false;
        };
        *row = update(row);
        self.recompute_totals();
        true
    }

    /// Applies a typed edit to one row.
    pub fn apply_edit(&mut self, id: &RowId, edit: RowEdit) -> bool {
        self.update_row(id, |row| pricing::apply_edit(row, edit))
    }

    /// Applies a raw per-cell edit to one row.
    pub fn edit_field(&mut self, id: &RowId, field: RowField, raw: &str) -> bool {
        self.update_row(id, |row| pricing::edit_field(row, field, raw))
    }

    /// Back-solves one row's price from a desired line total.
    pub fn edit_row_total_amount(&mut self, id: &RowId, raw_amount: &str) -> bool {
        self.update_row(id, |row| pricing::edit_row_total_amount(row, raw_amount))
    }

    /// Stores a plain-text field on one row.
    pub fn edit_text(&mut self, id: &RowId, field: TextField, value: &str) -> bool {
        self.update_row(id, |row| pricing::edit_text(row, field, value))
    }

    // -------------------------------------------------------------------------
    // Global operations
    // -------------------------------------------------------------------------

    /// Reprices every row at exactly `margin_percent`, discarding per-row
    /// margins. The value also becomes the default for rows added later.
    pub fn set_global_margin_percent(&mut self, margin_percent: f64) {
        let margin_percent = sanitize(margin_percent);
        self.global_margin_percent = margin_percent;

        for row in &mut self.rows {
            *row = pricing::derive_forward(row, Some(margin_percent));
        }
        self.recompute_totals();
    }

    /// Back-solves a uniform margin that makes the pre-tax total equal
    /// `total`, then reprices every row with it.
    ///
    /// With no cost basis (`total_cost <= 0`) nothing is repriced; the
    /// typed total is kept as the displayed total until the next
    /// recompute.
    ///
    /// ## Example
    /// ```rust
    /// use quote_core::quotation::{GrandTotalOutcome, Quotation};
    ///
    /// let mut quote = Quotation::default();
    /// quote.add_custom_item("Survey", "100");
    ///
    /// // internal cost is 102 (2% transport), so 153 needs 50% margin
    /// let outcome = quote.set_grand_total_override(153.0);
    /// assert!(matches!(outcome, GrandTotalOutcome::Repriced(m) if (m - 50.0).abs() < 1e-9));
    /// assert!((quote.totals().total_value - 153.0).abs() < 0.01);
    /// ```
    pub fn set_grand_total_override(&mut self, total: f64) -> GrandTotalOutcome {
        let total = sanitize(total);
        let total_cost = self.totals.total_cost;

        if total_cost <= 0.0 {
            self.displayed_total = Some(total);
            return GrandTotalOutcome::DisplayOnly(total);
        }

        let margin_percent = (total / total_cost - 1.0) * 100.0;
        self.set_global_margin_percent(margin_percent);
        GrandTotalOutcome::Repriced(margin_percent)
    }

    /// Re-derives base cost for weight-priced rows of the commodity
    /// category at the new rate, keeping each row's margin percent.
    ///
    /// Returns how many rows were repriced. The rate is also used for
    /// rows added afterwards.
    pub fn handle_market_rate_change(&mut self, catalog: &Catalog, market_rate: f64) -> usize {
        let market_rate = sanitize(market_rate);
        self.market_rate = market_rate;

        let mut repriced = 0;
        for row in &mut self.rows {
            if row.category_id != COMMODITY_CATEGORY_ID {
                continue;
            }
            let weight = row
                .catalog_item_id
                .and_then(|item_id| catalog.item(row.category_id, item_id))
                .and_then(|item| item.weight());

            if let Some(weight) = weight {
                row.base_cost = weight * market_rate;
                *row = pricing::derive_forward(row, None);
                repriced += 1;
            }
        }

        self.recompute_totals();
        repriced
    }

    /// Sets the tax percentage applied on top of the total value.
    pub fn set_tax_percent(&mut self, tax_percent: f64) {
        self.tax_rate = TaxRate::from_percentage(sanitize(tax_percent));
        self.recompute_totals();
    }

    /// Re-sums every row. Clears any display-only grand total.
    pub fn recompute_totals(&mut self) {
        self.totals = QuotationTotals::compute(&self.rows, self.tax_rate);
        self.displayed_total = None;
    }

    // -------------------------------------------------------------------------
    // Read accessors
    // -------------------------------------------------------------------------

    /// Rows ordered by category order, then insertion order.
    pub fn rows(&self) -> Vec<&LineItem> {
        self.category_order
            .iter()
            .flat_map(|category| self.rows.iter().filter(move |r| r.category_id == *category))
            .collect()
    }

    /// Looks up a row by id.
    pub fn row(&self, id: &RowId) -> Option<&LineItem> {
        self.rows.iter().find(|r| &r.id == id)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn category_order(&self) -> &[CategoryId] {
        &self.category_order
    }

    /// One section per category in display order, including categories
    /// whose rows have all been removed.
    pub fn sections(&self, catalog: &Catalog) -> Vec<CategorySection> {
        self.category_order
            .iter()
            .map(|category_id| {
                let rows: Vec<LineItem> = self
                    .rows
                    .iter()
                    .filter(|r| r.category_id == *category_id)
                    .cloned()
                    .collect();
                CategorySection {
                    category_id: *category_id,
                    name: catalog.category_name(*category_id),
                    subtotal: CategorySubtotal::from_rows(&rows),
                    rows,
                }
            })
            .collect()
    }

    pub fn totals(&self) -> &QuotationTotals {
        &self.totals
    }

    /// The pre-tax total to show: a display-only override if one is
    /// pending, else the computed total value.
    pub fn displayed_total(&self) -> f64 {
        self.displayed_total.unwrap_or(self.totals.total_value)
    }

    pub fn global_margin_percent(&self) -> f64 {
        self.global_margin_percent
    }

    pub fn market_rate(&self) -> f64 {
        self.market_rate
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 0.01;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    /// Custom row with exactly `cost` internal cost (transport zeroed).
    fn add_at_cost(quote: &mut Quotation, name: &str, cost: f64) -> RowId {
        let id = quote.add_custom_item(name, &cost.to_string()).unwrap();
        quote.edit_field(&id, RowField::TransportPercent, "0");
        id
    }

    #[test]
    fn test_add_weight_item_at_market_rate() {
        let catalog = Catalog::builtin();
        let mut quote = Quotation::default();

        let id = quote
            .add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(3), 1.0)
            .unwrap();
        let row = quote.row(&id).unwrap();

        assert!(close(row.base_cost, 453.39));
        assert!(close(row.transport_amount, 9.07));
        assert!(close(row.internal_cost, 462.46));
        assert!(close(row.margin_amount, 92.49));
        assert!(close(row.quoted_unit_price, 554.95));
        assert_eq!(row.hsn_code, "9018");
        assert_eq!(quote.category_order(), &[COMMODITY_CATEGORY_ID]);
        assert!(close(quote.totals().total_value, 554.95));
    }

    #[test]
    fn test_add_unknown_item_is_skipped() {
        let catalog = Catalog::builtin();
        let mut quote = Quotation::default();

        assert!(quote.add_item(&catalog, CategoryId(42), CatalogItemId(1), 1.0).is_none());
        assert!(quote.add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(999), 1.0).is_none());
        assert!(quote.is_empty());
        assert!(quote.category_order().is_empty());
    }

    #[test]
    fn test_add_custom_item() {
        let mut quote = Quotation::default();
        let id = quote.add_custom_item("Installation", "5000").unwrap();
        let row = quote.row(&id).unwrap();

        assert_eq!(row.category_id, CUSTOM_CATEGORY_ID);
        assert_eq!(row.unit, "nos");
        assert_eq!(row.hsn_code, "Gen");
        assert!(row.is_custom());
        assert!(close(row.internal_cost, 5100.0));
        assert!(quote.add_custom_item("  ", "10").is_none());
    }

    #[test]
    fn test_new_rows_take_global_margin() {
        let mut quote = Quotation::default();
        quote.set_global_margin_percent(35.0);
        let id = quote.add_custom_item("Survey", "100").unwrap();
        assert_eq!(quote.row(&id).unwrap().margin_percent, 35.0);
    }

    #[test]
    fn test_rows_follow_category_order() {
        let catalog = Catalog::builtin();
        let mut quote = Quotation::default();

        let pipe = quote.add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(3), 1.0).unwrap();
        let valve = quote.add_item(&catalog, CategoryId(1001), CatalogItemId(15), 1.0).unwrap();
        let pipe2 = quote.add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(4), 1.0).unwrap();

        let ids: Vec<&RowId> = quote.rows().iter().map(|r| &r.id).collect();
        assert_eq!(ids, vec![&pipe, &pipe2, &valve]);

        assert!(quote.reorder_category(1, Direction::Up));
        let ids: Vec<&RowId> = quote.rows().iter().map(|r| &r.id).collect();
        assert_eq!(ids, vec![&valve, &pipe, &pipe2]);
    }

    #[test]
    fn test_reorder_boundaries_are_no_ops() {
        let mut quote = Quotation::default();
        let catalog = Catalog::builtin();
        quote.add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(3), 1.0);
        quote.add_custom_item("Survey", "100");
        let order = quote.category_order().to_vec();

        assert!(!quote.reorder_category(0, Direction::Up));
        assert!(!quote.reorder_category(1, Direction::Down));
        assert!(!quote.reorder_category(7, Direction::Up));
        assert_eq!(quote.category_order(), order.as_slice());

        assert!(quote.reorder_category(0, Direction::Down));
        assert_eq!(quote.category_order(), &[CUSTOM_CATEGORY_ID, COMMODITY_CATEGORY_ID]);
    }

    #[test]
    fn test_remove_item_and_missing_id() {
        let mut quote = Quotation::default();
        let a = add_at_cost(&mut quote, "A", 100.0);
        add_at_cost(&mut quote, "B", 200.0);

        assert!(quote.remove_item(&a));
        assert!(close(quote.totals().total_cost, 200.0));
        assert!(!quote.remove_item(&a));
        assert!(!quote.remove_item(&RowId::from("nope")));
        assert_eq!(quote.row_count(), 1);
    }

    #[test]
    fn test_remove_category_clears_section() {
        let catalog = Catalog::builtin();
        let mut quote = Quotation::default();
        quote.add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(3), 2.0);
        quote.add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(4), 1.0);
        quote.add_custom_item("Survey", "100");

        assert!(quote.remove_category(COMMODITY_CATEGORY_ID));
        assert_eq!(quote.row_count(), 1);
        assert_eq!(quote.category_order(), &[CUSTOM_CATEGORY_ID]);
        assert!(!quote.remove_category(COMMODITY_CATEGORY_ID));
    }

    #[test]
    fn test_edits_on_missing_row() {
        let mut quote = Quotation::default();
        let ghost = RowId::from("ghost");
        assert!(!quote.edit_field(&ghost, RowField::Quantity, "3"));
        assert!(!quote.edit_row_total_amount(&ghost, "100"));
        assert!(!quote.edit_text(&ghost, TextField::Name, "x"));
    }

    #[test]
    fn test_totals_follow_every_edit() {
        let mut quote = Quotation::default();
        let id = add_at_cost(&mut quote, "A", 100.0);

        quote.edit_field(&id, RowField::Quantity, "3");
        assert!(close(quote.totals().total_cost, 300.0));
        assert!(close(quote.totals().total_value, 360.0));

        quote.edit_row_total_amount(&id, "450");
        assert!(close(quote.totals().total_value, 450.0));
        assert!(close(quote.totals().total_profit, 150.0));
        assert!(close(quote.totals().tax_amount, 81.0));
        assert!(close(quote.totals().grand_total, 531.0));
    }

    #[test]
    fn test_global_margin_is_uniform() {
        let mut quote = Quotation::default();
        let a = add_at_cost(&mut quote, "A", 100.0);
        let b = add_at_cost(&mut quote, "B", 250.0);
        quote.edit_field(&a, RowField::MarginPercent, "5");
        quote.edit_field(&b, RowField::QuotedUnitPrice, "900");

        quote.set_global_margin_percent(12.5);

        for row in quote.rows() {
            assert_eq!(row.margin_percent, 12.5);
            assert!(close(row.quoted_unit_price, row.internal_cost * 1.125));
        }
        assert_eq!(quote.global_margin_percent(), 12.5);
    }

    #[test]
    fn test_grand_total_override_back_solves_margin() {
        let mut quote = Quotation::default();
        let a = add_at_cost(&mut quote, "A", 100.0);
        let b = add_at_cost(&mut quote, "B", 200.0);

        assert!(close(quote.row(&a).unwrap().quoted_unit_price, 120.0));
        assert!(close(quote.row(&b).unwrap().quoted_unit_price, 240.0));
        assert!(close(quote.totals().total_cost, 300.0));
        assert!(close(quote.totals().total_value, 360.0));

        let outcome = quote.set_grand_total_override(450.0);

        assert!(matches!(outcome, GrandTotalOutcome::Repriced(m) if close(m, 50.0)));
        assert!(close(quote.row(&a).unwrap().quoted_unit_price, 150.0));
        assert!(close(quote.row(&b).unwrap().quoted_unit_price, 300.0));
        assert!(close(quote.totals().total_value, 450.0));
        assert!(close(quote.global_margin_percent(), 50.0));
    }

    #[test]
    fn test_grand_total_override_with_quantities() {
        let catalog = Catalog::builtin();
        let mut quote = Quotation::default();
        quote.add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(3), 37.5);
        quote.add_item(&catalog, CategoryId(1001), CatalogItemId(15), 4.0);
        quote.add_custom_item("Installation", "18000");

        quote.set_grand_total_override(500_000.0);
        assert!((quote.totals().total_value - 500_000.0).abs() < 0.05);
    }

    #[test]
    fn test_grand_total_override_without_cost_basis() {
        let mut quote = Quotation::default();
        let outcome = quote.set_grand_total_override(1000.0);

        assert_eq!(outcome, GrandTotalOutcome::DisplayOnly(1000.0));
        assert_eq!(quote.displayed_total(), 1000.0);
        assert_eq!(quote.totals().total_value, 0.0);

        // The next mutation recomputes and drops the display-only value.
        quote.add_custom_item("Survey", "0");
        assert_eq!(quote.displayed_total(), 0.0);
    }

    #[test]
    fn test_market_rate_change_only_touches_weight_rows() {
        let catalog = Catalog::builtin();
        let mut quote = Quotation::default();
        let pipe = quote.add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(3), 1.0).unwrap();
        let support = quote.add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(12), 1.0).unwrap();
        let custom = quote.add_custom_item("Installation", "5000").unwrap();
        quote.edit_field(&pipe, RowField::MarginPercent, "30");
        let custom_before = quote.row(&custom).unwrap().clone();
        let support_before = quote.row(&support).unwrap().clone();

        let repriced = quote.handle_market_rate_change(&catalog, 1300.0);

        assert_eq!(repriced, 1);
        let row = quote.row(&pipe).unwrap();
        assert!(close(row.base_cost, 464.1));
        assert_eq!(row.margin_percent, 30.0);
        assert!(close(row.quoted_unit_price, row.internal_cost * 1.3));
        assert_eq!(quote.row(&custom).unwrap(), &custom_before);
        assert_eq!(quote.row(&support).unwrap(), &support_before);
        assert_eq!(quote.market_rate(), 1300.0);
    }

    #[test]
    fn test_tax_percent() {
        let mut quote = Quotation::default();
        add_at_cost(&mut quote, "A", 100.0);
        quote.set_tax_percent(5.0);
        assert!(close(quote.totals().tax_amount, 6.0));
        assert!(close(quote.totals().grand_total, 126.0));
    }

    #[test]
    fn test_sections_with_subtotals() {
        let catalog = Catalog::builtin();
        let mut quote = Quotation::default();
        quote.add_item(&catalog, CategoryId(1001), CatalogItemId(15), 2.0);
        add_at_cost(&mut quote, "A", 100.0);

        let sections = quote.sections(&catalog);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "Ball valves with Adaptor");
        assert_eq!(sections[1].name, "Custom Items");
        assert!(close(sections[1].subtotal.cost, 100.0));
        assert!(close(sections[1].subtotal.value, 120.0));
        assert!(close(sections[1].subtotal.profit, 20.0));
    }
}
