//! Kassenbeleg data models.
//!
//! A German fiscal receipt QR payload carries the transaction identity, a
//! VAT-rate breakdown, and the TSE signature material required for
//! tax-authority verification. The signature fields are carried through
//! unchanged; this crate never verifies them.

use serde::{Deserialize, Serialize};

/// A structured fiscal receipt, produced only by a successful parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    /// Protocol/version tag (field 0).
    pub format_version: String,

    /// Opaque transaction identifier, UUID-shaped (field 1).
    pub transaction_id: String,

    /// Document classification tag, e.g. "Beleg" (field 2).
    pub document_type: String,

    /// Free-text register/store label from the compound field.
    pub label: String,

    /// VAT-rate breakdown from the compound field.
    pub vat_breakdown: VatBreakdown,

    /// Authoritative total, always equal to `vat_breakdown.total`.
    pub total_amount: f64,

    /// Payment channel tag from the compound field.
    pub payment_method: String,

    /// Per-register monotonically assigned counter (field 4).
    pub receipt_counter: i64,

    /// Register/till identifier (field 5).
    pub register_id: String,

    /// Start of the covered transaction interval, opaque timestamp (field 6).
    pub period_start: String,

    /// End of the covered transaction interval, opaque timestamp (field 7).
    pub period_end: String,

    /// Signature algorithm tag (field 8).
    pub signature_algorithm: String,

    /// Time format tag (field 9).
    pub time_format: String,

    /// TSE signature, carried unverified (field 10).
    pub signature: String,

    /// Certificate hash, carried unverified (field 11).
    pub certificate_hash: String,
}

/// Five-component VAT-rate breakdown of the receipt total.
///
/// Components are `f64` because a malformed numeric token propagates as NaN
/// in the default (permissive) parse mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VatBreakdown {
    /// Gross total across all rates.
    pub total: f64,

    /// Amount taxed at 0%.
    pub vat0: f64,

    /// Amount taxed at the reduced 7% rate.
    pub vat7: f64,

    /// Amount taxed at the standard 19% rate.
    pub vat19: f64,

    /// Amount under other/special rates.
    pub other: f64,
}

impl VatBreakdown {
    /// True if any component failed numeric parsing in permissive mode.
    pub fn has_invalid_component(&self) -> bool {
        [self.total, self.vat0, self.vat7, self.vat19, self.other]
            .iter()
            .any(|v| v.is_nan())
    }
}

/// Outcome of a parse attempt. All-or-nothing: no partial record exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "receipt")]
pub enum ParseOutcome {
    /// The payload matched the Kassenbeleg format.
    Receipt(ReceiptRecord),

    /// The payload is not a recognizable fiscal receipt.
    NotThisFormat,
}

impl ParseOutcome {
    /// Borrow the record if the parse succeeded.
    pub fn receipt(&self) -> Option<&ReceiptRecord> {
        match self {
            ParseOutcome::Receipt(record) => Some(record),
            ParseOutcome::NotThisFormat => None,
        }
    }

    /// Consume the outcome, keeping the record if the parse succeeded.
    pub fn into_receipt(self) -> Option<ReceiptRecord> {
        match self {
            ParseOutcome::Receipt(record) => Some(record),
            ParseOutcome::NotThisFormat => None,
        }
    }

    /// True if the payload matched the format.
    pub fn is_receipt(&self) -> bool {
        matches!(self, ParseOutcome::Receipt(_))
    }
}
