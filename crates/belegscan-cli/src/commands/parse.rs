//! Parse command - run the payload parser on a raw string.

use std::io::Read;

use clap::Args;
use console::style;

use belegscan_core::{ParseOutcome, ReceiptParser};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Raw decoded payload, or "-" to read from stdin
    #[arg(required = true)]
    payload: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: ParseFormat,

    /// Reject receipts with non-numeric VAT tokens
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ParseFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    let payload = if args.payload == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf.trim_end_matches(['\r', '\n']).to_string()
    } else {
        args.payload
    };

    let parser =
        ReceiptParser::new().with_strict_numbers(args.strict || config.scan.strict_numbers);

    match parser.parse(&payload) {
        ParseOutcome::Receipt(record) => {
            match args.format {
                ParseFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
                ParseFormat::Text => {
                    println!("{} Kassenbeleg", style("✓").green());
                    println!("  Store:    {}", record.label);
                    println!("  Counter:  {}", record.receipt_counter);
                    println!("  Register: {}", record.register_id);
                    println!("  Total:    {:.2}", record.total_amount);
                    println!("  Payment:  {}", record.payment_method);
                }
            }
            Ok(())
        }
        ParseOutcome::NotThisFormat => {
            anyhow::bail!("payload does not match the Kassenbeleg format")
        }
    }
}
