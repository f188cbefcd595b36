//! QR symbol localization and decoding.

mod decoder;

pub use decoder::{DecodedSymbol, QrDecoder};
