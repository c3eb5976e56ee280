//! # Cover Letter
//!
//! The free-text first page of a quotation: reference, addressee, subject,
//! body paragraphs, commercial terms and signatory. Every field is a plain
//! string; nothing here is derived from the pricing state.

use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

/// Date format printed on the letter (`09-12-2025`).
pub const LETTER_DATE_FORMAT: &str = "%d-%m-%Y";

/// Formats a date the way the letter prints it.
pub fn format_letter_date(date: NaiveDate) -> String {
    date.format(LETTER_DATE_FORMAT).to_string()
}

/// Commercial terms, one paragraph each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Terms {
    pub taxes: String,
    pub supply: String,
    pub warranty: String,
    pub support: String,
    pub payment: String,
}

impl Default for Terms {
    fn default() -> Self {
        Terms {
            taxes: "GST 18% will be extra as applicable at the time of billing.".to_string(),
            supply: "Completion period is approximately 2-3 months from receipt of a confirmed order with advance payment.".to_string(),
            warranty: "All installations and supplies carry a warranty of 12 months from the date of installation.".to_string(),
            support: "Service support and staff training are provided. An annual maintenance contract is available after the warranty period.".to_string(),
            payment: "50% advance, 40% at the time of installation, 10% after installation.".to_string(),
        }
    }
}

/// First-page letter text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetter {
    /// Quotation reference, e.g. `ABC/78PL/XY`. Also names the export file.
    pub reference: String,
    pub date: String,
    pub recipient_name: String,
    pub recipient_company: String,
    pub recipient_address: String,
    pub subject: String,
    pub body: [String; 3],
    pub terms: Terms,
    pub signatory_name: String,
    pub signatory_phone: String,
}

impl CoverLetter {
    /// A blank letter dated `date`, with default terms.
    pub fn dated(date: NaiveDate) -> Self {
        CoverLetter {
            reference: "QT/0001".to_string(),
            date: format_letter_date(date),
            recipient_name: String::new(),
            recipient_company: String::new(),
            recipient_address: String::new(),
            subject: String::new(),
            body: [
                "With reference to our discussion, please find the attached price details.".to_string(),
                String::new(),
                "We assure you of our best service and attention for the success of the project.".to_string(),
            ],
            terms: Terms::default(),
            signatory_name: String::new(),
            signatory_phone: String::new(),
        }
    }

    /// Rewrites the taxes term to quote the given rate.
    pub fn sync_tax_term(&mut self, tax_percent: f64) {
        self.terms.taxes = format!(
            "GST {}% will be extra as applicable at the time of billing.",
            tax_percent
        );
    }

    /// Stores one field verbatim.
    pub fn set(&mut self, field: CoverField, value: &str) {
        let value = value.to_string();
        match field {
            CoverField::Reference => self.reference = value,
            CoverField::Date => self.date = value,
            CoverField::RecipientName => self.recipient_name = value,
            CoverField::RecipientCompany => self.recipient_company = value,
            CoverField::RecipientAddress => self.recipient_address = value,
            CoverField::Subject => self.subject = value,
            CoverField::Body(n) => self.body[n.min(2)] = value,
            CoverField::TermTaxes => self.terms.taxes = value,
            CoverField::TermSupply => self.terms.supply = value,
            CoverField::TermWarranty => self.terms.warranty = value,
            CoverField::TermSupport => self.terms.support = value,
            CoverField::TermPayment => self.terms.payment = value,
            CoverField::SignatoryName => self.signatory_name = value,
            CoverField::SignatoryPhone => self.signatory_phone = value,
        }
    }
}

impl Default for CoverLetter {
    fn default() -> Self {
        CoverLetter::dated(Local::now().date_naive())
    }
}

/// Addressable cover-letter fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverField {
    Reference,
    Date,
    RecipientName,
    RecipientCompany,
    RecipientAddress,
    Subject,
    /// Body paragraph, 0-based (0..=2).
    Body(usize),
    TermTaxes,
    TermSupply,
    TermWarranty,
    TermSupport,
    TermPayment,
    SignatoryName,
    SignatoryPhone,
}

impl FromStr for CoverField {
    type Err = ValidationError;

    /// Names as typed in the shell: `ref`, `date`, `to`, `company`,
    /// `address`, `subject`, `body1`..`body3`, `taxes`, `supply`,
    /// `warranty`, `support`, `payment`, `signatory`, `phone`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim().to_ascii_lowercase().as_str() {
            "ref" | "reference" => CoverField::Reference,
            "date" => CoverField::Date,
            "to" | "name" | "recipient" => CoverField::RecipientName,
            "company" => CoverField::RecipientCompany,
            "address" => CoverField::RecipientAddress,
            "subject" | "sub" => CoverField::Subject,
            "body1" => CoverField::Body(0),
            "body2" => CoverField::Body(1),
            "body3" => CoverField::Body(2),
            "taxes" => CoverField::TermTaxes,
            "supply" => CoverField::TermSupply,
            "warranty" => CoverField::TermWarranty,
            "support" => CoverField::TermSupport,
            "payment" => CoverField::TermPayment,
            "signatory" => CoverField::SignatoryName,
            "phone" => CoverField::SignatoryPhone,
            other => {
                return Err(ValidationError::InvalidFormat {
                    field: "cover field".to_string(),
                    reason: format!("unknown cover field '{}'", other),
                })
            }
        };
        Ok(field)
    }
}
