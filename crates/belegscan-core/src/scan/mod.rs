//! Scan orchestration.

mod orchestrator;

pub use orchestrator::{ScanOrchestrator, ScanResult};
