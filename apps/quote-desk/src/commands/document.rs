//! # Document Commands
//!
//! Cover letter text, client/internal view, preview and export.
//!
//! ## Export Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  export_document(session, dir, "json")                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  session.document_for(view)  ──►  QuoteDocument (client by default)     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  JsonRenderer / TextRenderer  ──►  bytes                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  <dir>/Quote_<ref with / as ->.<ext>                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! PDF generation stays outside: it consumes the JSON export.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Local;
use quote_core::cover::{format_letter_date, CoverField, CoverLetter};
use quote_core::document::{DocumentRenderer, JsonRenderer, TextRenderer, ViewMode};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::SessionState;

/// Result of a successful export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub path: PathBuf,
    pub bytes: usize,
    pub view_mode: ViewMode,
}

/// Sets one cover-letter field. The date accepts `today`.
pub fn set_cover_field(
    session: &mut SessionState,
    field: &str,
    value: &str,
) -> Result<CoverLetter, ApiError> {
    debug!(field, value, "set_cover_field command");

    let field = CoverField::from_str(field)?;
    let value = if field == CoverField::Date && value.trim().eq_ignore_ascii_case("today") {
        format_letter_date(Local::now().date_naive())
    } else {
        value.to_string()
    };

    session.cover.set(field, &value);
    Ok(session.cover.clone())
}

/// Switches between the internal and client views.
pub fn set_view_mode(session: &mut SessionState, mode: &str) -> Result<ViewMode, ApiError> {
    debug!(mode, "set_view_mode command");

    let mode = match mode.trim().to_ascii_lowercase().as_str() {
        "internal" => ViewMode::Internal,
        "client" => ViewMode::Client,
        other => {
            return Err(ApiError::validation(format!(
                "view mode must be 'internal' or 'client', got '{}'",
                other
            )))
        }
    };

    session.view_mode = mode;
    info!(?mode, "View mode changed");
    Ok(mode)
}

/// Renders the current document as a text preview.
pub fn preview_document(session: &SessionState) -> Result<String, ApiError> {
    debug!("preview_document command");

    let bytes = TextRenderer.render(&session.document())?;
    String::from_utf8(bytes).map_err(|e| ApiError::export(e.to_string()))
}

fn renderer_for(format: &str) -> Result<Box<dyn DocumentRenderer>, ApiError> {
    match format.trim().to_ascii_lowercase().as_str() {
        "" | "json" => Ok(Box::new(JsonRenderer { pretty: true })),
        "txt" | "text" => Ok(Box::new(TextRenderer)),
        other => Err(ApiError::validation(format!(
            "export format must be 'json' or 'txt', got '{}'",
            other
        ))),
    }
}

/// Writes the document into `dir`.
///
/// `view` defaults to the client view, whatever the session is showing.
pub fn export_document(
    session: &SessionState,
    dir: &Path,
    format: &str,
    view: Option<ViewMode>,
) -> Result<ExportResponse, ApiError> {
    debug!(dir = %dir.display(), format, ?view, "export_document command");

    let renderer = renderer_for(format)?;
    let document = session.document_for(view.unwrap_or(ViewMode::Client));
    let bytes = renderer.render(&document)?;

    let path = dir.join(renderer.file_name(&document));
    std::fs::write(&path, &bytes)
        .map_err(|e| ApiError::export(format!("Cannot write {}: {}", path.display(), e)))?;

    info!(path = %path.display(), bytes = bytes.len(), "Exported quotation");
    Ok(ExportResponse {
        path,
        bytes: bytes.len(),
        view_mode: document.view,
    })
}
