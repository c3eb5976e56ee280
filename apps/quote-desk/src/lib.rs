//! # Quote Desk Library
//!
//! Core library for the Quote Desk application.
//! This is the main entry point that configures and runs the pricing shell.
//!
//! ## Module Organization
//! ```text
//! quote_desk_lib/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── Configuration (file + env + defaults)
//! │   └── session.rs  ◄─── Quotation, catalog, cover letter, view mode
//! ├── commands/
//! │   ├── mod.rs      ◄─── Shared quotation response
//! │   ├── items.rs    ◄─── Add/remove/reorder, catalog search
//! │   ├── pricing.rs  ◄─── Cell edits and global levers
//! │   └── document.rs ◄─── Cover letter, preview, export
//! ├── shell.rs        ◄─── Line-oriented front end
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────────────────────┐        ┌──────────────────────────────┐   │
//! │  │    ConfigState           │        │    SessionState              │   │
//! │  │                          │ seeds  │                              │   │
//! │  │  • Company name          │ ─────► │  • Quotation (rows, totals)  │   │
//! │  │  • Tax / margin / rate   │        │  • Catalog                   │   │
//! │  │  • Catalog path          │        │  • Cover letter              │   │
//! │  │  • Export directory      │        │  • View mode                 │   │
//! │  └──────────────────────────┘        └──────────────────────────────┘   │
//! │                                                                         │
//! │  One session per process; commands take it by `&mut`.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod shell;
pub mod state;

use std::io;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use error::ApiError;
use shell::Shell;
use state::{ConfigState, SessionState};

/// Runs the application.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging                                                  │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: INFO, can be overridden with RUST_LOG                    │
/// │                                                                         │
/// │  2. Load Configuration                                                  │
/// │     • QUOTE_CONFIG or <config dir>/quote-desk/config.json               │
/// │     • QUOTE_* environment overrides                                     │
/// │                                                                         │
/// │  3. Load Catalog                                                        │
/// │     • catalogPath JSON file, or the built-in catalog                    │
/// │                                                                         │
/// │  4. Start Session & Shell                                               │
/// │     • Commands from stdin, output to stdout                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> ExitCode {
    init_tracing();

    info!("Starting Quote Desk");

    match start() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Quote Desk stopped");
            eprintln!("quote-desk: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn start() -> Result<(), ApiError> {
    let config = ConfigState::load()?;
    let catalog = config.load_catalog()?;
    info!(
        categories = catalog.groups().len(),
        company = %config.company_name,
        "Catalog loaded"
    );

    let session = SessionState::new(&config, catalog);
    info!(
        tax_percent = config.tax_percent,
        margin_percent = config.default_margin_percent,
        market_rate = config.market_rate,
        "Session ready"
    );

    let mut shell = Shell::new(config, session);
    let stdin = io::stdin();
    let stdout = io::stdout();
    shell.run(stdin.lock(), stdout.lock())?;

    info!("Session closed");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so they never mix with shell output.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=quote=trace` - Show trace for quote crates only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,quote=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
