//! Core library for belegscan receipt scanning.
//!
//! This crate provides:
//! - QR symbol decoding from images (rqrr)
//! - German fiscal receipt (Kassenbeleg) payload parsing
//! - AI-assisted receipt number extraction
//! - Scan orchestration with generation-tracked async results

pub mod ai;
pub mod error;
pub mod models;
pub mod qr;
pub mod receipt;
pub mod scan;

pub use error::{AiError, BelegError, QrError, Result};
pub use models::config::{AiConfig, BelegConfig, ScanConfig};
pub use models::receipt::{ParseOutcome, ReceiptRecord, VatBreakdown};
pub use ai::{AiExtraction, AiExtractor};
pub use qr::{DecodedSymbol, QrDecoder};
pub use receipt::ReceiptParser;
pub use scan::{ScanOrchestrator, ScanResult};
