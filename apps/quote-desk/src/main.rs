//! # Quote Desk Entry Point
//!
//! ```text
//! stdin ──► Shell ──► commands ──► quote-core ──► stdout
//!                                                   │
//!                                   stderr ◄── tracing logs
//! ```
//!
//! The actual setup is in lib.rs so it can be tested.

use std::process::ExitCode;

fn main() -> ExitCode {
    quote_desk_lib::run()
}
