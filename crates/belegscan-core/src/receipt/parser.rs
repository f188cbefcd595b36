//! Parser for the German fiscal receipt (Kassenbeleg) QR payload.
//!
//! Payload grammar, `;`-separated top-level fields:
//!
//! ```text
//! version;transaction;type;label^vat0_vat1_vat2_vat3_vat4:amount:method;counter;register;start;end;alg;timefmt;sig;cert[;...]
//! ```
//!
//! Parsing is pure and total: every input, however malformed, maps to a
//! [`ParseOutcome`] and never panics. There is no partial record; any missing
//! structural piece fails the whole parse.

use crate::models::receipt::{ParseOutcome, ReceiptRecord, VatBreakdown};

/// Minimum number of top-level `;`-separated fields. Extra trailing fields
/// are ignored.
const MIN_FIELDS: usize = 12;

/// Required number of `_`-separated components in the VAT block. Extra
/// components are ignored.
const VAT_COMPONENTS: usize = 5;

/// Parser for Kassenbeleg payloads.
///
/// By default non-numeric VAT tokens propagate as NaN components, matching
/// the behavior of deployed scanners. [`with_strict_numbers`] opts into
/// rejecting such payloads outright.
///
/// [`with_strict_numbers`]: ReceiptParser::with_strict_numbers
#[derive(Debug, Clone)]
pub struct ReceiptParser {
    strict_numbers: bool,
}

impl ReceiptParser {
    /// Create a parser with default (permissive) settings.
    pub fn new() -> Self {
        Self {
            strict_numbers: false,
        }
    }

    /// Reject payloads with non-numeric VAT tokens instead of propagating
    /// NaN components.
    pub fn with_strict_numbers(mut self, strict: bool) -> Self {
        self.strict_numbers = strict;
        self
    }

    /// Parse a raw decoded QR payload.
    ///
    /// The authoritative total is the first VAT component; the declared
    /// amount token inside the compound field is discarded without being
    /// cross-checked.
    pub fn parse(&self, raw: &str) -> ParseOutcome {
        let fields: Vec<&str> = raw.split(';').collect();
        if fields.len() < MIN_FIELDS {
            return ParseOutcome::NotThisFormat;
        }

        // Compound field 3: label^vat_block:amount:method
        let Some((label, rest)) = fields[3].split_once('^') else {
            return ParseOutcome::NotThisFormat;
        };

        let mut money = rest.split(':');
        let (Some(vat_block), Some(_declared_amount), Some(payment_method)) =
            (money.next(), money.next(), money.next())
        else {
            return ParseOutcome::NotThisFormat;
        };

        let Some(vat_breakdown) = self.parse_vat_block(vat_block) else {
            return ParseOutcome::NotThisFormat;
        };

        let Ok(receipt_counter) = fields[4].trim().parse::<i64>() else {
            return ParseOutcome::NotThisFormat;
        };

        ParseOutcome::Receipt(ReceiptRecord {
            format_version: fields[0].to_string(),
            transaction_id: fields[1].to_string(),
            document_type: fields[2].to_string(),
            label: label.to_string(),
            total_amount: vat_breakdown.total,
            vat_breakdown,
            payment_method: payment_method.to_string(),
            receipt_counter,
            register_id: fields[5].to_string(),
            period_start: fields[6].to_string(),
            period_end: fields[7].to_string(),
            signature_algorithm: fields[8].to_string(),
            time_format: fields[9].to_string(),
            signature: fields[10].to_string(),
            certificate_hash: fields[11].to_string(),
        })
    }

    fn parse_vat_block(&self, block: &str) -> Option<VatBreakdown> {
        let tokens: Vec<&str> = block.split('_').collect();
        if tokens.len() < VAT_COMPONENTS {
            return None;
        }

        let mut amounts = [0.0f64; VAT_COMPONENTS];
        for (slot, token) in amounts.iter_mut().zip(&tokens) {
            *slot = self.parse_amount(token)?;
        }

        Some(VatBreakdown {
            total: amounts[0],
            vat0: amounts[1],
            vat7: amounts[2],
            vat19: amounts[3],
            other: amounts[4],
        })
    }

    fn parse_amount(&self, token: &str) -> Option<f64> {
        match token.trim().parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) if self.strict_numbers => None,
            Err(_) => Some(f64::NAN),
        }
    }
}

impl Default for ReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = "1.0;9f2c-uuid;Beleg;Supermarkt^12.50_0_0_2.50_10.00:EC:card;42;REG01;2023-01-01T10:00:00;2023-01-01T10:05:00;SHA256;UTC;abcSIG;certHASH123";

    fn parse(raw: &str) -> ParseOutcome {
        ReceiptParser::new().parse(raw)
    }

    #[test]
    fn test_full_sample_payload() {
        let record = parse(SAMPLE).into_receipt().unwrap();

        assert_eq!(record.format_version, "1.0");
        assert_eq!(record.transaction_id, "9f2c-uuid");
        assert_eq!(record.document_type, "Beleg");
        assert_eq!(record.label, "Supermarkt");
        assert_eq!(record.vat_breakdown.total, 12.50);
        assert_eq!(record.vat_breakdown.vat0, 0.0);
        assert_eq!(record.vat_breakdown.vat7, 0.0);
        assert_eq!(record.vat_breakdown.vat19, 2.50);
        assert_eq!(record.vat_breakdown.other, 10.00);
        assert_eq!(record.total_amount, 12.50);
        assert_eq!(record.payment_method, "card");
        assert_eq!(record.receipt_counter, 42);
        assert_eq!(record.register_id, "REG01");
        assert_eq!(record.period_start, "2023-01-01T10:00:00");
        assert_eq!(record.period_end, "2023-01-01T10:05:00");
        assert_eq!(record.signature_algorithm, "SHA256");
        assert_eq!(record.time_format, "UTC");
        assert_eq!(record.signature, "abcSIG");
        assert_eq!(record.certificate_hash, "certHASH123");
    }

    #[test]
    fn test_totality_on_degenerate_inputs() {
        assert_eq!(parse(""), ParseOutcome::NotThisFormat);
        assert_eq!(parse("no semicolons at all"), ParseOutcome::NotThisFormat);
        assert_eq!(parse("a;b;c;d"), ParseOutcome::NotThisFormat);
        assert_eq!(parse(";;;;;;;;;;;"), ParseOutcome::NotThisFormat);

        // Thousands of fields terminate and fail on the compound field.
        let huge = "x;".repeat(5000);
        assert_eq!(parse(&huge), ParseOutcome::NotThisFormat);
    }

    #[test]
    fn test_minimum_field_boundary() {
        // 11 fields, otherwise well-formed: failure.
        let eleven = "1.0;u;t;L^1_2_3_4_5:9:cash;42;R;s;e;alg;fmt;sig";
        assert_eq!(eleven.split(';').count(), 11);
        assert_eq!(parse(eleven), ParseOutcome::NotThisFormat);

        // Exactly 12 with a valid compound field: success.
        let twelve = "1.0;u;t;L^1_2_3_4_5:9:cash;42;R;s;e;alg;fmt;sig;cert";
        assert_eq!(twelve.split(';').count(), 12);
        assert!(parse(twelve).is_receipt());
    }

    #[test]
    fn test_extra_trailing_fields_ignored() {
        let extra = format!("{SAMPLE};ignored;also-ignored");
        let record = parse(&extra).into_receipt().unwrap();
        assert_eq!(record.certificate_hash, "certHASH123");
    }

    #[test]
    fn test_missing_caret_fails() {
        let raw = "1.0;u;t;label_only_no_caret;42;R;s;e;alg;fmt;sig;cert";
        assert_eq!(parse(raw), ParseOutcome::NotThisFormat);
    }

    #[test]
    fn test_missing_payment_tokens_fail() {
        // No colon after the VAT block.
        let raw = "1.0;u;t;L^1_2_3_4_5;42;R;s;e;alg;fmt;sig;cert";
        assert_eq!(parse(raw), ParseOutcome::NotThisFormat);

        // Only the amount token, no payment method.
        let raw = "1.0;u;t;L^1_2_3_4_5:9;42;R;s;e;alg;fmt;sig;cert";
        assert_eq!(parse(raw), ParseOutcome::NotThisFormat);
    }

    #[test]
    fn test_vat_component_count_boundary() {
        // Four components: failure.
        let four = "1.0;u;t;L^1_2_3_4:9:cash;42;R;s;e;alg;fmt;sig;cert";
        assert_eq!(parse(four), ParseOutcome::NotThisFormat);

        // Five components: success. A sixth is ignored.
        let six = "1.0;u;t;L^1_2_3_4_5_6:9:cash;42;R;s;e;alg;fmt;sig;cert";
        let record = parse(six).into_receipt().unwrap();
        assert_eq!(record.vat_breakdown.other, 5.0);
    }

    #[test]
    fn test_total_amount_derived_from_vat_block() {
        // Declared amount token (77.77) deliberately disagrees with the VAT
        // total; the VAT total wins.
        let raw = "1.0;u;t;L^5.25_1_2_3_4:77.77:cash;42;R;s;e;alg;fmt;sig;cert";
        let record = parse(raw).into_receipt().unwrap();
        assert_eq!(record.total_amount, 5.25);
        assert_eq!(record.total_amount, record.vat_breakdown.total);
    }

    #[test]
    fn test_non_numeric_vat_token_propagates_nan() {
        let raw = "1.0;u;t;L^abc_1_2_3_4:9:cash;42;R;s;e;alg;fmt;sig;cert";
        let record = parse(raw).into_receipt().unwrap();
        assert!(record.total_amount.is_nan());
        assert!(record.vat_breakdown.has_invalid_component());
        assert_eq!(record.vat_breakdown.vat0, 1.0);
    }

    #[test]
    fn test_strict_numbers_rejects_non_numeric_vat_token() {
        let raw = "1.0;u;t;L^abc_1_2_3_4:9:cash;42;R;s;e;alg;fmt;sig;cert";
        let parser = ReceiptParser::new().with_strict_numbers(true);
        assert_eq!(parser.parse(raw), ParseOutcome::NotThisFormat);

        // Well-formed numbers still pass in strict mode.
        assert!(parser.parse(SAMPLE).is_receipt());
    }

    #[test]
    fn test_non_integer_counter_fails() {
        let raw = "1.0;u;t;L^1_2_3_4_5:9:cash;not-a-number;R;s;e;alg;fmt;sig;cert";
        assert_eq!(parse(raw), ParseOutcome::NotThisFormat);
    }

    #[test]
    fn test_idempotence() {
        let first = parse(SAMPLE);
        let second = parse(SAMPLE);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_label_is_allowed() {
        let raw = "1.0;u;t;^1_2_3_4_5:9:cash;42;R;s;e;alg;fmt;sig;cert";
        let record = parse(raw).into_receipt().unwrap();
        assert_eq!(record.label, "");
    }

    #[test]
    fn test_extra_payment_tokens_ignored() {
        let raw = "1.0;u;t;L^1_2_3_4_5:9:cash:tip;42;R;s;e;alg;fmt;sig;cert";
        let record = parse(raw).into_receipt().unwrap();
        assert_eq!(record.payment_method, "cash");
    }
}
