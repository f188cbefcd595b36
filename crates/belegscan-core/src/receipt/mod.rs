//! Kassenbeleg payload parsing.

mod parser;

pub use parser::ReceiptParser;
