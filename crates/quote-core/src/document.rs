//! # Document Export
//!
//! Turns a quotation into a read-only [`QuoteDocument`] and hands it to a
//! [`DocumentRenderer`]. Pagination, fonts and PDF generation belong to the
//! renderer; this module only decides *what* is printed.
//!
//! ## Views
//! ```text
//! ┌──────────────┬───────────────────────────────────────────────────────────┐
//! │ Internal     │ # Description Base Trn% Trn Fit Mount Labour Cost Mrg%   │
//! │              │   Mrg Qty Unit Rate Amount Profit Profit% LineProfit      │
//! │              │ every category section, even when empty                   │
//! ├──────────────┼───────────────────────────────────────────────────────────┤
//! │ Client       │ # Description Qty Unit Rate Amount                        │
//! │              │ empty sections omitted, no cost or profit anywhere        │
//! └──────────────┴───────────────────────────────────────────────────────────┘
//! ```
//! Unit rates are rounded to the paisa once, from the exact engine values.
//! Every printed amount below a rate is computed in paise from the printed
//! figures, so line amounts add up to section amounts, section amounts to
//! the total, and total plus tax to the grand total.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::cover::CoverLetter;
use crate::error::{CoreError, CoreResult};
use crate::money::{round2, Money};
use crate::quotation::Quotation;
use crate::types::LineItem;

/// Which columns a document carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Everything, for the estimator.
    #[default]
    Internal,
    /// Description, quantity, unit, rate and amount only.
    Client,
}

/// Export file stem for a quotation reference: `Quote_<ref>` with every
/// `/` replaced by `-`.
///
/// ## Example
/// ```rust
/// use quote_core::document::file_stem;
///
/// assert_eq!(file_stem("UBS/78PL/MMCK"), "Quote_UBS-78PL-MMCK");
/// ```
pub fn file_stem(reference: &str) -> String {
    format!("Quote_{}", reference.replace('/', "-"))
}

// =============================================================================
// Document Records
// =============================================================================

/// Cost and profit columns, present only in the internal view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CostColumns {
    pub base_cost: Money,
    pub transport_percent: f64,
    pub transport_amount: Money,
    pub fitting_cost: Money,
    pub mounting_cost: Money,
    pub labour_cost: Money,
    pub internal_cost: Money,
    pub margin_percent: f64,
    pub margin_amount: Money,
    pub unit_profit: Money,
    pub profit_percent: f64,
    pub line_profit: Money,
}

impl CostColumns {
    fn from_row(row: &LineItem) -> Self {
        CostColumns {
            base_cost: Money::from_amount(row.base_cost),
            transport_percent: round2(row.transport_percent),
            transport_amount: Money::from_amount(row.transport_amount),
            fitting_cost: Money::from_amount(row.fitting_cost),
            mounting_cost: Money::from_amount(row.mounting_cost),
            labour_cost: Money::from_amount(row.labour_cost),
            internal_cost: Money::from_amount(row.internal_cost),
            margin_percent: round2(row.margin_percent),
            margin_amount: Money::from_amount(row.margin_amount),
            unit_profit: Money::from_amount(row.unit_profit()),
            profit_percent: round2(row.realized_margin_percent()),
            line_profit: Money::from_amount(row.line_profit()),
        }
    }
}

/// One printed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRow {
    /// 1-based position within its section.
    pub index: usize,
    pub description: String,
    pub hsn_code: String,
    pub quantity: f64,
    pub unit: String,
    pub rate: Money,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub costs: Option<CostColumns>,
}

/// One category block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSection {
    pub name: String,
    pub rows: Vec<DocumentRow>,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub cost: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub profit: Option<Money>,
}

impl DocumentSection {
    fn build(name: String, rows: &[LineItem], internal: bool) -> Self {
        let rows: Vec<(DocumentRow, Money)> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let rate = Money::from_amount(row.quoted_unit_price);
                let printed = DocumentRow {
                    index: i + 1,
                    description: row.name.clone(),
                    hsn_code: row.hsn_code.clone(),
                    quantity: row.quantity,
                    unit: row.unit.clone(),
                    rate,
                    amount: rate.multiply_quantity(row.quantity),
                    costs: internal.then(|| CostColumns::from_row(row)),
                };
                (printed, Money::from_amount(row.line_cost()))
            })
            .collect();

        let mut amount = Money::zero();
        let mut cost = Money::zero();
        for (row, line_cost) in &rows {
            amount += row.amount;
            cost += *line_cost;
        }

        DocumentSection {
            name,
            rows: rows.into_iter().map(|(row, _)| row).collect(),
            amount,
            cost: internal.then_some(cost),
            profit: internal.then(|| amount - cost),
        }
    }
}

/// Footer totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTotals {
    pub total_value: Money,
    pub tax_percent: f64,
    pub tax_amount: Money,
    pub grand_total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub total_cost: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub total_profit: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub margin_percent: Option<f64>,
}

/// Everything a renderer needs to print a quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDocument {
    pub view: ViewMode,
    pub company_name: String,
    pub cover: CoverLetter,
    pub sections: Vec<DocumentSection>,
    pub totals: DocumentTotals,
    pub file_stem: String,
}

impl QuoteDocument {
    /// Builds the document for `view` from the current quotation state.
    pub fn build(
        quotation: &Quotation,
        catalog: &Catalog,
        cover: &CoverLetter,
        company_name: &str,
        view: ViewMode,
    ) -> Self {
        let internal = view == ViewMode::Internal;

        let sections: Vec<DocumentSection> = quotation
            .sections(catalog)
            .into_iter()
            .filter(|section| internal || !section.rows.is_empty())
            .map(|section| DocumentSection::build(section.name, &section.rows, internal))
            .collect();

        let mut total_value = Money::zero();
        let mut total_cost = Money::zero();
        for section in &sections {
            total_value += section.amount;
            total_cost += section.cost.unwrap_or_default();
        }
        let tax_amount = total_value.calculate_tax(quotation.tax_rate());

        let totals = DocumentTotals {
            total_value,
            tax_percent: quotation.tax_rate().percentage(),
            tax_amount,
            grand_total: total_value + tax_amount,
            total_cost: internal.then_some(total_cost),
            total_profit: internal.then(|| total_value - total_cost),
            margin_percent: internal.then(|| round2(quotation.totals().realized_margin_percent())),
        };

        QuoteDocument {
            view,
            company_name: company_name.to_string(),
            cover: cover.clone(),
            sections,
            totals,
            file_stem: file_stem(&cover.reference),
        }
    }

    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }
}

// =============================================================================
// Renderers
// =============================================================================

/// Seam for document output formats.
pub trait DocumentRenderer {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    /// Renders the document to bytes.
    fn render(&self, document: &QuoteDocument) -> CoreResult<Vec<u8>>;

    /// `<file stem>.<extension>`.
    fn file_name(&self, document: &QuoteDocument) -> String {
        format!("{}.{}", document.file_stem, self.extension())
    }
}

/// Writes the document as JSON for an external PDF generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl DocumentRenderer for JsonRenderer {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, document: &QuoteDocument) -> CoreResult<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(document)
        } else {
            serde_json::to_vec(document)
        };
        bytes.map_err(|e| CoreError::Render(e.to_string()))
    }
}

/// Plain-text table, used for terminal previews.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    fn write(&self, doc: &QuoteDocument, out: &mut String) -> std::fmt::Result {
        writeln!(out, "{}", doc.company_name)?;
        writeln!(out, "Ref: {}    Date: {}", doc.cover.reference, doc.cover.date)?;

        for section in &doc.sections {
            writeln!(out)?;
            writeln!(out, "== {} ==", section.name)?;
            for row in &section.rows {
                write!(
                    out,
                    "{:>3}  {:<36} {:>8} {:<4} {:>14} {:>16}",
                    row.index,
                    row.description,
                    row.quantity,
                    row.unit,
                    row.rate.to_string(),
                    row.amount.to_string()
                )?;
                if let Some(costs) = &row.costs {
                    write!(
                        out,
                        "  | cost {} mrg {}% profit {}",
                        costs.internal_cost, costs.margin_percent, costs.line_profit
                    )?;
                }
                writeln!(out)?;
            }
            write!(out, "     Subtotal {}", section.amount)?;
            if let (Some(cost), Some(profit)) = (section.cost, section.profit) {
                write!(out, "  (cost {}, profit {})", cost, profit)?;
            }
            writeln!(out)?;
        }

        let t = &doc.totals;
        writeln!(out)?;
        writeln!(out, "Total            {}", t.total_value)?;
        writeln!(out, "Tax @ {}%       {}", t.tax_percent, t.tax_amount)?;
        writeln!(out, "Grand total      {}", t.grand_total)?;
        if let (Some(cost), Some(profit), Some(margin)) = (t.total_cost, t.total_profit, t.margin_percent) {
            writeln!(out, "Cost {}  Profit {}  Margin {}%", cost, profit, margin)?;
        }
        Ok(())
    }
}

impl DocumentRenderer for TextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, document: &QuoteDocument) -> CoreResult<Vec<u8>> {
        let mut out = String::new();
        self.write(document, &mut out)
            .map_err(|e| CoreError::Render(e.to_string()))?;
        Ok(out.into_bytes())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::RowField;
    use crate::types::{CatalogItemId, CategoryId};
    use crate::COMMODITY_CATEGORY_ID;
    use chrono::NaiveDate;

    fn fixture() -> (Quotation, Catalog, CoverLetter) {
        let catalog = Catalog::builtin();
        let mut quote = Quotation::default();
        quote.add_item(&catalog, COMMODITY_CATEGORY_ID, CatalogItemId(3), 10.0);
        let valve = quote
            .add_item(&catalog, CategoryId(1001), CatalogItemId(15), 2.0)
            .unwrap();
        quote.remove_item(&valve);
        quote.add_custom_item("Installation", "5000");

        let mut cover = CoverLetter::dated(NaiveDate::from_ymd_opt(2025, 12, 9).unwrap());
        cover.reference = "ABC/78PL/XY".to_string();
        (quote, catalog, cover)
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("QT/2025/001"), "Quote_QT-2025-001");
        assert_eq!(file_stem("plain"), "Quote_plain");
    }

    #[test]
    fn test_internal_view_keeps_everything() {
        let (quote, catalog, cover) = fixture();
        let doc = QuoteDocument::build(&quote, &catalog, &cover, "Acme Gases", ViewMode::Internal);

        assert_eq!(doc.sections.len(), 3);
        assert!(doc.sections[1].rows.is_empty());
        assert!(doc.sections[0].rows[0].costs.is_some());
        assert!(doc.totals.total_cost.is_some());
        assert_eq!(doc.file_stem, "Quote_ABC-78PL-XY");
    }

    #[test]
    fn test_client_view_hides_costs_and_empty_sections() {
        let (quote, catalog, cover) = fixture();
        let doc = QuoteDocument::build(&quote, &catalog, &cover, "Acme Gases", ViewMode::Client);

        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.row_count(), 2);
        for section in &doc.sections {
            assert!(section.cost.is_none());
            assert!(section.profit.is_none());
            assert!(section.rows.iter().all(|r| r.costs.is_none()));
        }
        assert!(doc.totals.total_cost.is_none());
        assert!(doc.totals.margin_percent.is_none());

        let json = String::from_utf8(JsonRenderer::default().render(&doc).unwrap()).unwrap();
        assert!(!json.contains("internalCost"));
        assert!(!json.contains("totalProfit"));
    }

    #[test]
    fn test_amounts_rounded_once() {
        let (mut quote, catalog, cover) = fixture();
        let id = quote.rows()[0].id.clone();
        quote.edit_field(&id, RowField::Quantity, "1");
        let doc = QuoteDocument::build(&quote, &catalog, &cover, "Acme Gases", ViewMode::Client);

        let pipe = &doc.sections[0].rows[0];
        assert_eq!(pipe.rate.paise(), 55495);
        assert_eq!(pipe.amount.paise(), 55495);
        assert_eq!(pipe.index, 1);
    }

    #[test]
    fn test_renderer_file_names() {
        let (quote, catalog, cover) = fixture();
        let doc = QuoteDocument::build(&quote, &catalog, &cover, "Acme Gases", ViewMode::Client);

        assert_eq!(JsonRenderer::default().file_name(&doc), "Quote_ABC-78PL-XY.json");
        assert_eq!(TextRenderer.file_name(&doc), "Quote_ABC-78PL-XY.txt");
    }

    #[test]
    fn test_text_renderer_preview() {
        let (quote, catalog, cover) = fixture();
        let doc = QuoteDocument::build(&quote, &catalog, &cover, "Acme Gases", ViewMode::Client);
        let text = String::from_utf8(TextRenderer.render(&doc).unwrap()).unwrap();

        assert!(text.starts_with("Acme Gases"));
        assert!(text.contains("== Copper pipe =="));
        assert!(text.contains("== Custom Items =="));
        assert!(!text.contains("Ball valves"));
        assert!(text.contains("Grand total"));
    }

    #[test]
    fn test_printed_amounts_foot() {
        let (mut quote, catalog, cover) = fixture();
        let id = quote.rows()[0].id.clone();
        quote.edit_field(&id, RowField::Quantity, "3");
        let doc = QuoteDocument::build(&quote, &catalog, &cover, "Acme Gases", ViewMode::Internal);

        let pipe = &doc.sections[0].rows[0];
        assert_eq!(pipe.amount.paise(), 55495 * 3);

        let mut value = Money::zero();
        for section in &doc.sections {
            let mut rows = Money::zero();
            for row in &section.rows {
                rows += row.amount;
            }
            assert_eq!(section.amount, rows);
            assert_eq!(section.amount - section.cost.unwrap(), section.profit.unwrap());
            value += section.amount;
        }

        let t = &doc.totals;
        assert_eq!(t.total_value, value);
        assert_eq!(t.tax_amount, value.calculate_tax(quote.tax_rate()));
        assert_eq!(t.grand_total, t.total_value + t.tax_amount);
        assert_eq!(t.total_value - t.total_cost.unwrap(), t.total_profit.unwrap());
    }

    #[test]
    fn test_cost_fields_are_optional_in_bindings() {
        assert!(DocumentRow::decl().contains("costs?: CostColumns"));
        assert!(DocumentSection::decl().contains("cost?: Money"));
        assert!(DocumentTotals::decl().contains("totalCost?: Money"));
        assert!(DocumentTotals::decl().contains("marginPercent?: number"));
    }

    #[test]
    fn test_client_json_omits_cost_keys() {
        let (quote, catalog, cover) = fixture();
        let doc = QuoteDocument::build(&quote, &catalog, &cover, "Acme Gases", ViewMode::Client);
        let value = serde_json::to_value(&doc).unwrap();

        assert!(value["sections"][0]["rows"][0].get("costs").is_none());
        assert!(value["totals"].get("totalCost").is_none());
    }
}
