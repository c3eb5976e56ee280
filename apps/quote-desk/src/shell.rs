//! # Interactive Shell
//!
//! A line-oriented front end over the commands. Reads one command per
//! line, prints the updated quotation after each change.
//!
//! ## Line Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  custom "Site survey" 2500                                              │
//! │         │                                                               │
//! │         ▼  tokenize (double quotes group words)                         │
//! │  ["custom", "Site survey", "2500"]                                      │
//! │         │                                                               │
//! │         ▼  ShellLine::try_parse_from (clap)                             │
//! │  ShellCommand::Custom { name, price }                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::items::add_custom_item ──► table / JSON / error line         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! `help` lists every command; `help <command>` shows its arguments.
//! A `<row>` is the 1-based `#` shown by `show`, or a row id prefix.

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use clap::error::ErrorKind;
use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use quote_core::catalog::CatalogMatch;
use quote_core::document::ViewMode;
use quote_core::pricing::{RowField, TextField};
use tracing::debug;

use crate::commands::{self, QuotationResponse};
use crate::error::ApiError;
use crate::state::{ConfigState, SessionState};

// =============================================================================
// Command Line Definitions
// =============================================================================

/// One shell line.
#[derive(Parser, Debug)]
#[command(name = "quote-desk", about = "Quotation pricing shell")]
#[command(no_binary_name = true, color = ColorChoice::Never)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Show rows and totals
    #[command(visible_alias = "ls")]
    Show,

    /// Print the quotation snapshot as JSON
    Json,

    /// Search the catalog by item or category name
    Search {
        /// Search term (several words are joined)
        term: Vec<String>,
    },

    /// Add a catalog item
    Add {
        /// Catalog category id
        cat: String,
        /// Item id within the category
        item: String,
        /// Quantity (default: 1)
        #[arg(allow_hyphen_values = true)]
        qty: Option<String>,
    },

    /// Add a custom item (quote names that contain spaces)
    Custom {
        name: String,
        /// Base cost
        #[arg(allow_hyphen_values = true)]
        price: String,
    },

    /// Remove a row
    Rm { row: String },

    /// Remove a whole category section
    Rmcat { cat: String },

    /// Move a category section up or down
    Move {
        /// Section number as shown by `show`
        section: String,
        /// up | down
        direction: String,
    },

    /// Edit a cell: numeric fields back-solve, name/unit/hsn are text
    Set {
        row: String,
        /// e.g. baseCost, transAmt, qty, marginPercent, marginAmt, price, amount, name
        field: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },

    /// Back-solve a row's price from its line total
    Total {
        row: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Reprice every row at one margin percent
    Margin {
        #[arg(allow_hyphen_values = true)]
        pct: String,
    },

    /// Back-solve a uniform margin from a pre-tax total
    Grand {
        #[arg(allow_hyphen_values = true)]
        total: String,
    },

    /// Change the commodity market rate (per kg)
    Rate {
        #[arg(allow_hyphen_values = true)]
        rate: String,
    },

    /// Change the tax percent
    Tax {
        #[arg(allow_hyphen_values = true)]
        pct: String,
    },

    /// Show the cover letter, or set one of its fields
    Cover {
        /// ref, date, to, company, address, subject, body1-3, taxes,
        /// supply, warranty, support, payment, signatory, phone
        field: Option<String>,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },

    /// Switch the on-screen view (internal | client)
    Mode { mode: String },

    /// Print the document in the current view
    Preview,

    /// Write the document file (client view unless --internal)
    Export {
        #[arg(value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Include cost and profit columns
        #[arg(long)]
        internal: bool,
    },

    /// Leave the shell
    #[command(visible_alias = "exit")]
    Quit,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON (input for the PDF generator)
    #[default]
    Json,
    /// Plain text
    Txt,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Txt => "txt",
        }
    }
}

/// What the shell does after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

/// Splits a command line into words; double quotes group words.
pub fn tokenize(line: &str) -> Result<Vec<String>, ApiError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(ApiError::validation("unterminated quote"));
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

// =============================================================================
// Shell
// =============================================================================

/// The interactive session front end.
pub struct Shell {
    config: ConfigState,
    session: SessionState,
}

impl Shell {
    pub fn new(config: ConfigState, session: SessionState) -> Self {
        Shell { config, session }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Reads commands until end of input or `quit`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> io::Result<()> {
        writeln!(out, "{} - type 'help' for commands", self.config.company_name)?;
        write!(out, "> ")?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            match self.execute(&line) {
                Ok(Reply::Quit) => break,
                Ok(Reply::Output(text)) if text.is_empty() => {}
                Ok(Reply::Output(text)) => writeln!(out, "{}", text)?,
                Err(e) => writeln!(out, "error {}", e)?,
            }
            write!(out, "> ")?;
            out.flush()?;
        }

        writeln!(out)?;
        Ok(())
    }

    /// Parses and executes one command line.
    ///
    /// Help requests come back as output; usage mistakes as
    /// `VALIDATION_ERROR`.
    pub fn execute(&mut self, line: &str) -> Result<Reply, ApiError> {
        let tokens = tokenize(line)?;
        if tokens.is_empty() {
            return Ok(Reply::Output(String::new()));
        }

        match ShellLine::try_parse_from(&tokens) {
            Ok(parsed) => self.dispatch(parsed.command),
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                | ErrorKind::DisplayVersion => Ok(Reply::Output(e.to_string().trim_end().to_string())),
                _ => {
                    let message = e.to_string();
                    let message = message.trim().trim_start_matches("error: ");
                    Err(ApiError::validation(message))
                }
            },
        }
    }

    fn dispatch(&mut self, command: ShellCommand) -> Result<Reply, ApiError> {
        debug!(?command, "shell command");

        let session = &mut self.session;
        let response = match command {
            ShellCommand::Quit => return Ok(Reply::Quit),
            ShellCommand::Show => commands::items::get_quotation(session),
            ShellCommand::Json => {
                let response = commands::items::get_quotation(session);
                return Ok(Reply::Output(serde_json::to_string_pretty(&response)?));
            }
            ShellCommand::Search { term } => {
                let hits = commands::items::search_catalog(session, &term.join(" "));
                return Ok(Reply::Output(self.render_matches(&hits)));
            }
            ShellCommand::Add { cat, item, qty } => {
                commands::items::add_item(session, &cat, &item, qty.as_deref())?
            }
            ShellCommand::Custom { name, price } => {
                commands::items::add_custom_item(session, &name, &price)?
            }
            ShellCommand::Rm { row } => commands::items::remove_item(session, &row)?,
            ShellCommand::Rmcat { cat } => commands::items::remove_category(session, &cat)?,
            ShellCommand::Move { section, direction } => {
                commands::items::reorder_category(session, &section, &direction)?
            }
            ShellCommand::Set { row, field, value } => {
                let value = value.join(" ");
                if field.parse::<RowField>().is_err() && field.parse::<TextField>().is_ok() {
                    commands::pricing::edit_text(session, &row, &field, &value)?
                } else {
                    commands::pricing::edit_field(session, &row, &field, &value)?
                }
            }
            ShellCommand::Total { row, amount } => {
                commands::pricing::edit_row_total(session, &row, &amount)?
            }
            ShellCommand::Margin { pct } => commands::pricing::set_global_margin(session, &pct)?,
            ShellCommand::Grand { total } => commands::pricing::set_grand_total(session, &total)?,
            ShellCommand::Rate { rate } => commands::pricing::set_market_rate(session, &rate)?,
            ShellCommand::Tax { pct } => commands::pricing::set_tax_rate(session, &pct)?,
            ShellCommand::Cover { field, value } => {
                let cover = match field {
                    None => session.cover.clone(),
                    Some(field) => {
                        commands::document::set_cover_field(session, &field, &value.join(" "))?
                    }
                };
                return Ok(Reply::Output(serde_json::to_string_pretty(&cover)?));
            }
            ShellCommand::Mode { mode } => {
                let mode = commands::document::set_view_mode(session, &mode)?;
                return Ok(Reply::Output(format!("view mode: {:?}", mode).to_lowercase()));
            }
            ShellCommand::Preview => {
                return Ok(Reply::Output(commands::document::preview_document(session)?));
            }
            ShellCommand::Export { format, internal } => {
                let dir = self.config.export_dir();
                let view = internal.then_some(ViewMode::Internal);
                let export =
                    commands::document::export_document(session, &dir, format.as_str(), view)?;
                return Ok(Reply::Output(format!(
                    "wrote {} ({} bytes)",
                    export.path.display(),
                    export.bytes
                )));
            }
        };

        Ok(Reply::Output(self.render_quotation(&response)))
    }

    fn render_matches(&self, hits: &[CatalogMatch]) -> String {
        if hits.is_empty() {
            return "no matches".to_string();
        }

        let mut out = String::new();
        for hit in hits {
            let _ = writeln!(
                out,
                "{:>5} {:>4}  {:<28} {:<36} {:<4} {:>14}",
                hit.category_id.0,
                hit.item_id.0,
                hit.category_name,
                hit.item_name,
                hit.unit,
                self.config.format_amount(hit.base_cost)
            );
        }
        out.trim_end().to_string()
    }

    fn render_quotation(&self, response: &QuotationResponse) -> String {
        let client = response.view_mode == ViewMode::Client;
        let fmt = |amount: f64| self.config.format_amount(amount);
        let mut out = String::new();
        let mut position = 0;

        for (index, section) in response.sections.iter().enumerate() {
            if client && section.rows.is_empty() {
                continue;
            }
            let _ = writeln!(out, "[{}] {} (cat {})", index + 1, section.name, section.category_id);

            for row in &section.rows {
                position += 1;
                let _ = write!(out, "{:>4}  {:<34} {:>8} {:<4}", position, row.name, row.quantity, row.unit);
                if !client {
                    let _ = write!(
                        out,
                        " cost {:>12} mrg {:>7.2}%",
                        fmt(row.internal_cost),
                        row.margin_percent
                    );
                }
                let _ = writeln!(
                    out,
                    " rate {:>12} amt {:>14}  {}",
                    fmt(row.quoted_unit_price),
                    fmt(row.line_total()),
                    &row.id.as_str()[..8.min(row.id.as_str().len())]
                );
            }

            let _ = write!(out, "      subtotal {}", fmt(section.subtotal.value));
            if !client {
                let _ = write!(out, "  profit {}", fmt(section.subtotal.profit));
            }
            let _ = writeln!(out);
        }

        let t = &response.totals;
        if !client {
            let _ = writeln!(
                out,
                "cost {}  profit {}  avg margin {:.2}%  (global {:.2}%, rate {}/kg)",
                fmt(t.total_cost),
                fmt(t.total_profit),
                t.realized_margin_percent(),
                response.global_margin_percent,
                fmt(response.market_rate)
            );
        }
        let _ = writeln!(out, "total {}", fmt(response.displayed_total));
        let _ = writeln!(out, "tax {}% {}", t.tax_percent, fmt(t.tax_amount));
        let _ = write!(out, "grand total {}", fmt(t.grand_total));
        out
    }
}
