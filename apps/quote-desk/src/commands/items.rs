//! # Item Commands
//!
//! Adding and removing rows and category sections, reordering sections,
//! and searching the catalog.

use quote_core::catalog::CatalogMatch;
use quote_core::types::{CatalogItemId, CategoryId, Direction};
use quote_core::validation::{parse_amount, validate_item_name, validate_quantity};
use quote_core::{CoreError, ValidationError};
use tracing::{debug, warn};

use super::QuotationResponse;
use crate::error::ApiError;
use crate::state::SessionState;

fn parse_id(field: &str, raw: &str) -> Result<u32, ApiError> {
    raw.trim().parse::<u32>().map_err(|_| {
        ValidationError::InvalidNumber {
            field: field.to_string(),
            value: raw.trim().to_string(),
        }
        .into()
    })
}

/// Returns the current quotation.
pub fn get_quotation(session: &SessionState) -> QuotationResponse {
    debug!("get_quotation command");
    QuotationResponse::from(session)
}

/// Adds a catalog item.
///
/// ## Arguments
/// * `category_id` - Catalog category id
/// * `item_id` - Item id within the category
/// * `quantity` - Quantity (default: 1, fractional lengths allowed)
pub fn add_item(
    session: &mut SessionState,
    category_id: &str,
    item_id: &str,
    quantity: Option<&str>,
) -> Result<QuotationResponse, ApiError> {
    debug!(category_id, item_id, ?quantity, "add_item command");

    let category_id = CategoryId(parse_id("category id", category_id)?);
    let item_id = CatalogItemId(parse_id("item id", item_id)?);
    let quantity = match quantity {
        Some(raw) => {
            let qty = parse_amount("quantity", raw)?;
            validate_quantity(qty)?;
            qty
        }
        None => 1.0,
    };

    let added = session
        .quotation
        .add_item(&session.catalog, category_id, item_id, quantity);

    if added.is_none() {
        warn!(%category_id, %item_id, "add_item: catalog item not found");
        return Err(CoreError::CatalogItemNotFound {
            category_id,
            item_id,
        }
        .into());
    }

    Ok(QuotationResponse::from(&*session))
}

/// Adds a typed-in item to the custom section.
pub fn add_custom_item(
    session: &mut SessionState,
    name: &str,
    price: &str,
) -> Result<QuotationResponse, ApiError> {
    debug!(name, price, "add_custom_item command");

    validate_item_name(name)?;
    session
        .quotation
        .add_custom_item(name, price)
        .ok_or_else(|| ApiError::validation("name is required"))?;

    Ok(QuotationResponse::from(&*session))
}

/// Removes one row.
pub fn remove_item(session: &mut SessionState, row: &str) -> Result<QuotationResponse, ApiError> {
    debug!(row, "remove_item command");

    let id = session.resolve_row(row)?;
    if !session.quotation.remove_item(&id) {
        warn!(row = %id, "remove_item: row vanished");
        return Err(CoreError::RowNotFound(id.to_string()).into());
    }

    Ok(QuotationResponse::from(&*session))
}

/// Removes a whole category section.
pub fn remove_category(
    session: &mut SessionState,
    category_id: &str,
) -> Result<QuotationResponse, ApiError> {
    debug!(category_id, "remove_category command");

    let category_id = CategoryId(parse_id("category id", category_id)?);
    if !session.quotation.remove_category(category_id) {
        warn!(%category_id, "remove_category: category not in quotation");
        return Err(CoreError::CategoryNotFound(category_id).into());
    }

    Ok(QuotationResponse::from(&*session))
}

/// Moves the section at 1-based `position` up or down.
///
/// Moving past either end leaves the order unchanged and is not an error.
pub fn reorder_category(
    session: &mut SessionState,
    position: &str,
    direction: &str,
) -> Result<QuotationResponse, ApiError> {
    debug!(position, direction, "reorder_category command");

    let position = parse_id("position", position)? as usize;
    let direction: Direction = direction.parse()?;

    let count = session.quotation.category_order().len();
    if position == 0 || position > count {
        return Err(ApiError::validation(format!(
            "position must be between 1 and {}",
            count
        )));
    }

    if !session.quotation.reorder_category(position - 1, direction) {
        debug!(position, ?direction, "reorder_category: already at the edge");
    }

    Ok(QuotationResponse::from(&*session))
}

/// Searches the catalog by item or category name, pricing weight items
/// at the session's market rate.
pub fn search_catalog(session: &SessionState, term: &str) -> Vec<CatalogMatch> {
    debug!(term, "search_catalog command");
    session
        .catalog
        .search(term, session.quotation.market_rate())
}
