//! # State Module
//!
//! Application state for Quote Desk.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────────┐    │
//! │  │      ConfigState         │      │       SessionState           │    │
//! │  │                          │      │                              │    │
//! │  │  company name, symbol    │ ───► │  quotation (rows, totals)    │    │
//! │  │  tax / margin / rate     │ seed │  catalog, cover letter       │    │
//! │  │  catalog + export paths  │      │  view mode                   │    │
//! │  └──────────────────────────┘      └──────────────────────────────┘    │
//! │                                                                         │
//! │  ConfigState: read-only after startup                                  │
//! │  SessionState: single writer (the shell), no lock                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod session;

pub use config::ConfigState;
pub use session::SessionState;
