//! Sequencing of decode, parse, and AI extraction.
//!
//! Each scan stamps a fresh generation. AI extraction is asynchronous and
//! may finish after a newer scan has replaced the state; such stale results
//! are discarded by comparing generations instead of last-write-wins.

use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, warn};

use crate::ai::{AiExtraction, AiExtractor};
use crate::error::Result;
use crate::models::config::ScanConfig;
use crate::models::receipt::ReceiptRecord;
use crate::qr::QrDecoder;
use crate::receipt::ReceiptParser;

/// State of one completed scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Generation stamp of the scan that produced this state.
    pub generation: u64,

    /// Verbatim decoded QR payload.
    pub raw_text: String,

    /// Corner coordinates of the located symbol, original-image pixels.
    pub corners: [(f32, f32); 4],

    /// Structured receipt, when the payload matched the Kassenbeleg format.
    pub receipt: Option<ReceiptRecord>,

    /// AI extraction result, once one has been applied.
    pub ai: Option<AiExtraction>,
}

/// Owns the decoder, the parser, and the current scan state.
///
/// The parser runs synchronously between the async boundaries; each scan
/// produces independently owned data, so no locking is needed.
pub struct ScanOrchestrator {
    decoder: QrDecoder,
    parser: ReceiptParser,
    generation: u64,
    current: Option<ScanResult>,
}

impl ScanOrchestrator {
    /// Build an orchestrator from scan configuration.
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            decoder: QrDecoder::new().with_max_image_size(config.max_image_size),
            parser: ReceiptParser::new().with_strict_numbers(config.strict_numbers),
            generation: 0,
            current: None,
        }
    }

    /// Decode the image, attempt the receipt parse, and replace the current
    /// state with a fresh generation.
    ///
    /// A payload that does not match the receipt format is not an error;
    /// the result simply carries no structured record. Decode failures
    /// (including "no code found") propagate as [`crate::QrError`].
    pub fn scan(&mut self, image: &DynamicImage) -> Result<&ScanResult> {
        let symbol = self.decoder.decode(image)?;
        self.generation += 1;

        let receipt = self.parser.parse(&symbol.text).into_receipt();
        if receipt.is_none() {
            debug!(
                generation = self.generation,
                "payload is not a Kassenbeleg, keeping raw text only"
            );
        }

        Ok(self.current.insert(ScanResult {
            generation: self.generation,
            raw_text: symbol.text,
            corners: symbol.corners,
            receipt,
            ai: None,
        }))
    }

    /// The state of the most recent scan, if any.
    pub fn current(&self) -> Option<&ScanResult> {
        self.current.as_ref()
    }

    /// Drop the current state. The generation counter keeps advancing so
    /// in-flight AI results for the cleared scan stay discardable.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Attach an AI result to the scan that requested it. Returns `false`
    /// and discards the result when the generation no longer matches the
    /// current state.
    pub fn apply_ai_result(&mut self, generation: u64, result: AiExtraction) -> bool {
        match self.current.as_mut() {
            Some(state) if state.generation == generation => {
                state.ai = Some(result);
                true
            }
            _ => {
                warn!(
                    stale = generation,
                    current = self.generation,
                    "discarding AI extraction for a superseded scan"
                );
                false
            }
        }
    }

    /// Run AI extraction for the current scan and apply the result if the
    /// scan has not been superseded meanwhile. Extraction failures are
    /// flattened into [`AiExtraction::Failed`], never an error.
    pub async fn run_ai_extraction(
        &mut self,
        extractor: &AiExtractor,
        image_base64: &str,
    ) -> bool {
        let Some(generation) = self.current.as_ref().map(|s| s.generation) else {
            return false;
        };

        let outcome = match extractor.extract_receipt_number(image_base64).await {
            Ok(text) => AiExtraction::Extracted(text),
            Err(e) => AiExtraction::Failed(e.to_string()),
        };

        self.apply_ai_result(generation, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BelegError, QrError};

    fn stub_state(generation: u64) -> ScanResult {
        ScanResult {
            generation,
            raw_text: "raw".to_string(),
            corners: [(0.0, 0.0); 4],
            receipt: None,
            ai: None,
        }
    }

    #[test]
    fn test_scan_surfaces_not_found() {
        let mut orchestrator = ScanOrchestrator::new(&ScanConfig::default());
        let blank = DynamicImage::new_luma8(32, 32);

        let err = orchestrator.scan(&blank).unwrap_err();
        assert!(matches!(err, BelegError::Qr(QrError::NotFound)));
        assert!(orchestrator.current().is_none());
    }

    #[test]
    fn test_matching_generation_applies() {
        let mut orchestrator = ScanOrchestrator::new(&ScanConfig::default());
        orchestrator.generation = 3;
        orchestrator.current = Some(stub_state(3));

        let applied =
            orchestrator.apply_ai_result(3, AiExtraction::Extracted("BON-77".to_string()));
        assert!(applied);
        assert_eq!(
            orchestrator.current().unwrap().ai,
            Some(AiExtraction::Extracted("BON-77".to_string()))
        );
    }

    #[test]
    fn test_stale_generation_discarded() {
        let mut orchestrator = ScanOrchestrator::new(&ScanConfig::default());
        orchestrator.generation = 5;
        orchestrator.current = Some(stub_state(5));

        // A result issued for generation 4 arrives late.
        let applied =
            orchestrator.apply_ai_result(4, AiExtraction::Extracted("stale".to_string()));
        assert!(!applied);
        assert!(orchestrator.current().unwrap().ai.is_none());
    }

    #[tokio::test]
    async fn test_run_ai_extraction_records_failure() {
        let mut orchestrator = ScanOrchestrator::new(&ScanConfig::default());
        orchestrator.generation = 1;
        orchestrator.current = Some(stub_state(1));

        // Unreachable endpoint so the call fails fast without real network.
        let config = crate::models::config::AiConfig {
            base_url: "http://127.0.0.1:9/v1".to_string(),
            request_timeout_secs: 2,
            ..Default::default()
        };
        let extractor = AiExtractor::new(&config, "test-key".to_string()).unwrap();

        let applied = orchestrator.run_ai_extraction(&extractor, "AAAA").await;
        assert!(applied);
        assert!(matches!(
            orchestrator.current().unwrap().ai,
            Some(AiExtraction::Failed(_))
        ));
    }

    #[test]
    fn test_result_after_clear_discarded() {
        let mut orchestrator = ScanOrchestrator::new(&ScanConfig::default());
        orchestrator.generation = 2;
        orchestrator.current = Some(stub_state(2));
        orchestrator.clear();

        let applied = orchestrator.apply_ai_result(2, AiExtraction::Failed("late".to_string()));
        assert!(!applied);
        assert!(orchestrator.current().is_none());
    }
}
