//! # Product Catalog
//!
//! A static, read-only table of purchasable items grouped by category.
//!
//! ## Cost Basis
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CatalogItem                                                            │
//! │  ├── Weight { weight }   base cost = weight × market rate (per kg)      │
//! │  │                       e.g. 15mm copper pipe, 0.357 kg/mtr            │
//! │  └── Fixed { baseCost }  base cost = list price                         │
//! │                          e.g. ball valve, ₹710 per piece                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## JSON Shape
//! ```json
//! [{ "id": 1000, "name": "Copper pipe", "items": [
//!     { "id": 3, "name": "15mm", "weight": 0.357, "unit": "mtr" },
//!     { "id": 12, "name": "Hanging support", "baseCost": 75.0, "unit": "nos" }
//! ]}]
//! ```
//! `factoryPrice` is accepted as an alias of `baseCost`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{CatalogItemId, CategoryId};
use crate::validation::validate_item_name;
use crate::{COMMODITY_CATEGORY_ID, CUSTOM_CATEGORY_ID};

/// Display name of the reserved custom-items bucket.
pub const CUSTOM_CATEGORY_NAME: &str = "Custom Items";

// =============================================================================
// Catalog Types
// =============================================================================

/// How an item's base cost is determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostBasis {
    /// Commodity-priced: kilograms per unit, multiplied by the market rate.
    Weight { weight: f64 },
    /// Fixed list price per unit.
    Fixed {
        #[serde(rename = "baseCost", alias = "factoryPrice")]
        base_cost: f64,
    },
}

/// A purchasable thing. Immutable for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: CatalogItemId,
    pub name: String,
    pub unit: String,
    #[serde(flatten)]
    pub cost: CostBasis,
}

impl CatalogItem {
    /// Resolves the per-unit base cost at the given market rate.
    pub fn base_cost_at(&self, market_rate: f64) -> f64 {
        match self.cost {
            CostBasis::Weight { weight } => weight * market_rate,
            CostBasis::Fixed { base_cost } => base_cost,
        }
    }

    /// Weight per unit, for commodity-priced items.
    pub fn weight(&self) -> Option<f64> {
        match self.cost {
            CostBasis::Weight { weight } => Some(weight),
            CostBasis::Fixed { .. } => None,
        }
    }
}

/// A named bucket of catalog items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: CategoryId,
    pub name: String,
    pub items: Vec<CatalogItem>,
}

/// One catalog search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMatch {
    pub category_id: CategoryId,
    pub category_name: String,
    pub item_id: CatalogItemId,
    pub item_name: String,
    pub unit: String,
    /// Indicative base cost at the market rate the search ran with.
    pub base_cost: f64,
}

// =============================================================================
// Catalog
// =============================================================================

/// The full product catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    groups: Vec<CategoryGroup>,
}

impl Catalog {
    /// Creates a catalog from category groups.
    pub fn new(groups: Vec<CategoryGroup>) -> Self {
        Catalog { groups }
    }

    /// Parses a catalog from JSON.
    ///
    /// ## Errors
    /// - [`CoreError::InvalidCatalog`] when the JSON is malformed or an item
    ///   declares neither `weight` nor `baseCost`
    /// - [`CoreError::Validation`] when a category or item name is empty or
    ///   too long
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let catalog: Catalog =
            serde_json::from_str(json).map_err(|e| CoreError::InvalidCatalog(e.to_string()))?;

        for group in &catalog.groups {
            validate_item_name(&group.name)?;
            for item in &group.items {
                validate_item_name(&item.name)?;
            }
        }
        Ok(catalog)
    }

    /// All category groups, in catalog order.
    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    /// Finds a category group by id.
    pub fn group(&self, category_id: CategoryId) -> Option<&CategoryGroup> {
        self.groups.iter().find(|g| g.id == category_id)
    }

    /// Finds an item within a category.
    pub fn item(&self, category_id: CategoryId, item_id: CatalogItemId) -> Option<&CatalogItem> {
        self.group(category_id)?.items.iter().find(|i| i.id == item_id)
    }

    /// Display name of a category, including the synthetic custom bucket.
    pub fn category_name(&self, category_id: CategoryId) -> String {
        if category_id == CUSTOM_CATEGORY_ID {
            return CUSTOM_CATEGORY_NAME.to_string();
        }
        self.group(category_id)
            .map(|g| g.name.clone())
            .unwrap_or_else(|| format!("Category {}", category_id))
    }

    /// Case-insensitive substring search over item and category names.
    ///
    /// An empty (or whitespace) term returns nothing.
    pub fn search(&self, term: &str, market_rate: f64) -> Vec<CatalogMatch> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches = Vec::new();
        for group in &self.groups {
            let group_hit = group.name.to_lowercase().contains(&needle);
            for item in &group.items {
                if group_hit || item.name.to_lowercase().contains(&needle) {
                    matches.push(CatalogMatch {
                        category_id: group.id,
                        category_name: group.name.clone(),
                        item_id: item.id,
                        item_name: item.name.clone(),
                        unit: item.unit.clone(),
                        base_cost: item.base_cost_at(market_rate),
                    });
                }
            }
        }
        matches
    }

    /// The built-in medical gas pipeline catalog.
    pub fn builtin() -> Self {
        let groups = vec![
            group(
                COMMODITY_CATEGORY_ID.0,
                "Copper pipe",
                vec![
                    weighted(1, "10mm", 0.222, "mtr"),
                    weighted(2, "12mm", 0.222, "mtr"),
                    weighted(3, "15mm", 0.357, "mtr"),
                    weighted(4, "22mm", 0.534, "mtr"),
                    weighted(5, "28mm", 0.685, "mtr"),
                    weighted(6, "35mm", 1.140, "mtr"),
                    weighted(7, "42mm", 1.376, "mtr"),
                    weighted(8, "54mm", 2.213, "mtr"),
                    weighted(9, "76mm", 4.164, "mtr"),
                    weighted(10, "108mm", 7.411, "mtr"),
                    fixed(11, "12mm conseal", 453.39, "mtr"),
                    fixed(12, "Hanging support", 75.0, "nos"),
                ],
            ),
            group(
                1001,
                "Ball valves with Adaptor",
                vec![
                    fixed(14, "12mm with 3 piece Adaptor", 600.0, "nos"),
                    fixed(15, "15mm with 3 piece Adaptor", 710.0, "nos"),
                    fixed(16, "22mm with 3 piece Adaptor-itap", 1722.0, "nos"),
                    fixed(17, "28mm with 3 piece Adaptor-itap", 2453.0, "nos"),
                    fixed(18, "35mm with 3 piece Adaptor", 2900.0, "nos"),
                    fixed(19, "42mm with 3 piece Adaptor-itap", 6015.0, "nos"),
                    fixed(20, "54mm with 3 piece Adaptor", 5760.0, "nos"),
                    fixed(21, "76mm", 8000.0, "nos"),
                    fixed(22, "108mm", 12000.0, "nos"),
                ],
            ),
            group(
                1002,
                "Area valve service units",
                vec![
                    fixed(24, "Area Valve Service Unit 2 gas zonal", 4680.0, "nos"),
                    fixed(25, "Area Valve Service Unit 3 gas zonal", 6130.0, "nos"),
                    fixed(26, "Area Valve Service Unit 4 gas zonal", 7760.0, "nos"),
                    fixed(27, "Area Valve Service Unit 5 gas zonal", 9370.0, "nos"),
                    fixed(28, "Area Valve Service Unit 6 gas zonal", 10590.0, "nos"),
                    fixed(29, "Area Valve Service Unit 2 gas with NIST and valve", 12750.0, "nos"),
                    fixed(30, "Area Valve Service Unit 3 gas top entry with NIST and valve", 13780.0, "nos"),
                    fixed(31, "Area Valve Service Unit 4 gas with NIST and valve", 17750.0, "nos"),
                    fixed(32, "Area Valve Service Unit 5 gas with NIST and valve", 18750.0, "nos"),
                    fixed(33, "Area Valve Service Unit 6 gas with NIST and valve", 19750.0, "nos"),
                    fixed(34, "NIST Connector", 880.0, "nos"),
                ],
            ),
            group(
                1003,
                "Area Alarms",
                vec![
                    fixed(37, "Analog line pressure alarm 1 gas", 3250.0, "nos"),
                    fixed(38, "Analog line pressure alarm 2 gas", 9000.0, "nos"),
                    fixed(39, "Analog line pressure alarm 3 gas", 11500.0, "nos"),
                    fixed(40, "Analog line pressure alarm 4 gas", 14000.0, "nos"),
                    fixed(41, "Analog line pressure alarm 5 gas", 16700.0, "nos"),
                ],
            ),
            group(
                1005,
                "Digital line pressure alarms",
                vec![
                    fixed(44, "Digital line pressure alarm 2 gas", 14230.0, "nos"),
                    fixed(45, "Digital line pressure alarm 3 gas", 16000.0, "nos"),
                    fixed(46, "Digital line pressure alarm 4 gas", 18950.0, "nos"),
                    fixed(47, "Digital line pressure alarm 5 gas", 18500.0, "nos"),
                    fixed(48, "Digital line pressure alarm 6 gas", 19650.0, "nos"),
                    fixed(49, "Alarm 4 gas with separate sensor", 15600.0, "nos"),
                ],
            ),
            group(
                1006,
                "Alarm set + valve box set",
                vec![
                    fixed(51, "2 gas alarm + valve set", 20450.0, "nos"),
                    fixed(52, "3 gas alarm + valve set", 25780.0, "nos"),
                    fixed(53, "4 gas alarm + valve set", 32000.0, "nos"),
                    fixed(54, "5 gas alarm + valve set", 38150.0, "nos"),
                    fixed(55, "6 gas alarm + valve set", 39000.0, "nos"),
                    fixed(56, "Master alarm (16 window)", 19900.0, "nos"),
                ],
            ),
            group(
                1008,
                "Oxygen manifold Main",
                vec![
                    fixed(59, "Provision for cylinder", 4000.0, "nos"),
                    fixed(60, "Middle frame/cylinder", 1000.0, "nos"),
                    fixed(61, "Semi automatic control panel", 30000.0, "nos"),
                ],
            ),
            group(
                1009,
                "Oxygen control panels",
                vec![
                    fixed(63, "Fully automatic control panel", 90000.0, "nos"),
                    fixed(64, "Fully automatic control panel D", 84000.0, "nos"),
                    fixed(65, "Fully automatic control panel XL 2100lpm", 174500.0, "nos"),
                    fixed(66, "Emergency panel", 45000.0, "nos"),
                    fixed(67, "NFPA O2 beacon control panel", 312720.0, "nos"),
                ],
            ),
            group(
                1012,
                "AGS Duplex 400 v 3ph/380 v 3ph",
                vec![fixed(71, "Single stage double gauge regulator", 1275.0, "nos")],
            ),
            group(
                1013,
                "Oxygen Manifold Emergency",
                vec![
                    fixed(73, "Provision for cylinder", 4000.0, "nos"),
                    fixed(74, "Middle frame", 1000.0, "nos"),
                ],
            ),
            group(
                1014,
                "Regulator Single stage",
                vec![
                    fixed(76, "Single stage double gauge regulator", 1275.0, "nos"),
                    fixed(77, "Regulator IOX-14", 4800.0, "nos"),
                    fixed(78, "High flow regulator + safety valve installation", 8500.0, "nos"),
                    fixed(79, "Emergency regulator set", 50000.0, "nos"),
                ],
            ),
            group(
                1015,
                "N2O manifold Main",
                vec![
                    fixed(81, "Provision for cylinder", 4000.0, "nos"),
                    fixed(82, "Middle frame/cylinder", 1000.0, "nos"),
                    fixed(83, "Semi automatic control panel", 35000.0, "nos"),
                ],
            ),
            group(
                1016,
                "N2O control panels",
                vec![
                    fixed(85, "3 source control panel", 190000.0, "nos"),
                    fixed(86, "NFPA N2O beacon control panel", 312720.0, "nos"),
                    fixed(87, "Single stage double gauge regulator", 1275.0, "nos"),
                ],
            ),
            group(
                1017,
                "N2O Manifold Emergency",
                vec![
                    fixed(89, "Provision for cylinder", 3500.0, "nos"),
                    fixed(90, "Middle frame", 500.0, "nos"),
                    fixed(91, "Regulator single stage", 1050.0, "nos"),
                    fixed(92, "Single stage double gauge regulator", 1275.0, "nos"),
                    fixed(93, "Regulator IOX-14", 4800.0, "nos"),
                ],
            ),
            group(
                1019,
                "Bulk cylinder N2O",
                vec![fixed(96, "Emergency full set", 50000.0, "nos")],
            ),
        ];

        Catalog::new(groups)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin()
    }
}

fn group(id: u32, name: &str, items: Vec<CatalogItem>) -> CategoryGroup {
    CategoryGroup {
        id: CategoryId(id),
        name: name.to_string(),
        items,
    }
}

fn weighted(id: u32, name: &str, weight: f64, unit: &str) -> CatalogItem {
    CatalogItem {
        id: CatalogItemId(id),
        name: name.to_string(),
        unit: unit.to_string(),
        cost: CostBasis::Weight { weight },
    }
}

fn fixed(id: u32, name: &str, base_cost: f64, unit: &str) -> CatalogItem {
    CatalogItem {
        id: CatalogItemId(id),
        name: name.to_string(),
        unit: unit.to_string(),
        cost: CostBasis::Fixed { base_cost },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_builtin_lookup() {
        let catalog = Catalog::builtin();
        let pipe = catalog.item(CategoryId(1000), CatalogItemId(3)).unwrap();
        assert_eq!(pipe.name, "15mm");
        assert_eq!(pipe.weight(), Some(0.357));
        assert!((pipe.base_cost_at(1270.0) - 453.39).abs() < 1e-9);

        let support = catalog.item(CategoryId(1000), CatalogItemId(12)).unwrap();
        assert_eq!(support.weight(), None);
        assert_eq!(support.base_cost_at(1270.0), 75.0);
    }

    #[test]
    fn test_lookup_missing_item() {
        let catalog = Catalog::builtin();
        assert!(catalog.item(CategoryId(1000), CatalogItemId(999)).is_none());
        assert!(catalog.item(CategoryId(4242), CatalogItemId(1)).is_none());
    }

    #[test]
    fn test_category_names() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.category_name(CategoryId(1003)), "Area Alarms");
        assert_eq!(catalog.category_name(CUSTOM_CATEGORY_ID), "Custom Items");
        assert_eq!(catalog.category_name(CategoryId(7)), "Category 7");
    }

    #[test]
    fn test_search_by_item_name() {
        let catalog = Catalog::builtin();
        let hits = catalog.search("IOX", 1270.0);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.item_name.contains("IOX-14")));
    }

    #[test]
    fn test_search_by_category_name_returns_all_items() {
        let catalog = Catalog::builtin();
        let hits = catalog.search("copper", 1300.0);
        assert_eq!(hits.len(), 12);
        let pipe = hits.iter().find(|h| h.item_id == CatalogItemId(3)).unwrap();
        assert!((pipe.base_cost - 464.1).abs() < 1e-9);
    }

    #[test]
    fn test_search_empty_term() {
        assert!(Catalog::builtin().search("  ", 1270.0).is_empty());
    }

    #[test]
    fn test_from_json_accepts_both_cost_shapes() {
        let json = r#"[{"id": 1000, "name": "Copper pipe", "items": [
            {"id": 3, "name": "15mm", "weight": 0.357, "unit": "mtr"},
            {"id": 11, "name": "conseal", "factoryPrice": 453.39, "unit": "mtr"},
            {"id": 12, "name": "support", "baseCost": 75.0, "unit": "nos"}
        ]}]"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.groups().len(), 1);
        assert_eq!(
            catalog.item(CategoryId(1000), CatalogItemId(11)).unwrap().cost,
            CostBasis::Fixed { base_cost: 453.39 }
        );
        assert_eq!(
            catalog.item(CategoryId(1000), CatalogItemId(12)).unwrap().cost,
            CostBasis::Fixed { base_cost: 75.0 }
        );
    }

    #[test]
    fn test_from_json_rejects_item_without_cost() {
        let json = r#"[{"id": 1, "name": "Bad", "items": [{"id": 1, "name": "x", "unit": "nos"}]}]"#;
        assert!(matches!(
            Catalog::from_json_str(json),
            Err(CoreError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_blank_item_name() {
        let json = r#"[{"id": 1, "name": "Valves", "items": [
            {"id": 1, "name": "   ", "baseCost": 10.0, "unit": "nos"}
        ]}]"#;
        assert!(matches!(
            Catalog::from_json_str(json),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }
}
