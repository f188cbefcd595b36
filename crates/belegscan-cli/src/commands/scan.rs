//! Scan command - decode and parse a receipt QR code from an image file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use belegscan_core::models::config::API_KEY_ENV;
use belegscan_core::{AiExtraction, AiExtractor, BelegConfig, ScanOrchestrator, ScanResult};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Input image file (PNG, JPEG, TIFF, BMP)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Ask the configured vision model for the printed receipt number
    #[arg(long)]
    ai: bool,

    /// Reject receipts with non-numeric VAT tokens
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    if args.strict {
        config.scan.strict_numbers = true;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Scanning file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    pb.set_message("Loading image...");
    pb.set_position(10);

    let image_bytes = fs::read(&args.input)?;
    let image = image::load_from_memory(&image_bytes)?;

    pb.set_message("Decoding QR code...");
    pb.set_position(40);

    let mut orchestrator = ScanOrchestrator::new(&config.scan);
    if let Err(e) = orchestrator.scan(&image) {
        pb.finish_and_clear();
        anyhow::bail!("{}", e);
    }

    if args.ai {
        pb.set_message("Asking vision model...");
        pb.set_position(70);
        run_ai(&mut orchestrator, &config, &image_bytes).await?;
    }

    pb.finish_with_message("Done");

    let result = orchestrator
        .current()
        .ok_or_else(|| anyhow::anyhow!("scan produced no state"))?;

    let output = format_result(result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if result.receipt.is_none() {
        eprintln!(
            "{} Payload is not a Kassenbeleg; raw text shown as-is.",
            style("ℹ").blue()
        );
    }

    debug!("Total scan time: {:?}", start.elapsed());

    Ok(())
}

/// Run AI extraction on the original image bytes. A failed call is stored
/// on the result as a failure message, not raised.
async fn run_ai(
    orchestrator: &mut ScanOrchestrator,
    config: &BelegConfig,
    image_bytes: &[u8],
) -> anyhow::Result<()> {
    let Some(api_key) = BelegConfig::api_key_from_env() else {
        anyhow::bail!(
            "--ai requires the {} environment variable to be set",
            API_KEY_ENV
        );
    };

    let extractor = AiExtractor::new(&config.ai, api_key)?;
    let image_base64 = BASE64.encode(image_bytes);
    orchestrator.run_ai_extraction(&extractor, &image_base64).await;

    Ok(())
}

fn format_result(result: &ScanResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => format_text(result),
    }
}

fn format_csv(result: &ScanResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "raw_text",
        "format_version",
        "transaction_id",
        "document_type",
        "label",
        "total_amount",
        "payment_method",
        "receipt_counter",
        "register_id",
        "period_start",
        "period_end",
        "ai_receipt_number",
    ])?;

    let (version, txn, doc, label, total, method, counter, register, start, end) =
        match &result.receipt {
            Some(r) => (
                r.format_version.clone(),
                r.transaction_id.clone(),
                r.document_type.clone(),
                r.label.clone(),
                r.total_amount.to_string(),
                r.payment_method.clone(),
                r.receipt_counter.to_string(),
                r.register_id.clone(),
                r.period_start.clone(),
                r.period_end.clone(),
            ),
            None => Default::default(),
        };

    let ai = result
        .ai
        .as_ref()
        .and_then(|a| a.text())
        .unwrap_or_default()
        .to_string();

    wtr.write_record([
        &result.raw_text,
        &version,
        &txn,
        &doc,
        &label,
        &total,
        &method,
        &counter,
        &register,
        &start,
        &end,
        &ai,
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ScanResult) -> anyhow::Result<String> {
    let mut output = String::new();

    output.push_str(&format!("Raw payload: {}\n", result.raw_text));

    match &result.receipt {
        Some(r) => {
            output.push_str("\nReceipt:\n");
            output.push_str(&format!("  Store:     {}\n", r.label));
            output.push_str(&format!("  Document:  {}\n", r.document_type));
            output.push_str(&format!("  Counter:   {}\n", r.receipt_counter));
            output.push_str(&format!("  Register:  {}\n", r.register_id));
            output.push_str(&format!("  Period:    {} .. {}\n", r.period_start, r.period_end));
            output.push_str(&format!("  Payment:   {}\n", r.payment_method));
            output.push_str("\nVAT breakdown:\n");
            output.push_str(&format!("  Total: {:.2}\n", r.vat_breakdown.total));
            output.push_str(&format!("  0%:    {:.2}\n", r.vat_breakdown.vat0));
            output.push_str(&format!("  7%:    {:.2}\n", r.vat_breakdown.vat7));
            output.push_str(&format!("  19%:   {:.2}\n", r.vat_breakdown.vat19));
            output.push_str(&format!("  Other: {:.2}\n", r.vat_breakdown.other));
        }
        None => {
            output.push_str("\nNo structured receipt (payload did not match the format).\n");
        }
    }

    match &result.ai {
        Some(AiExtraction::Extracted(text)) => {
            output.push_str(&format!("\nAI receipt number: {}\n", text));
        }
        Some(AiExtraction::Failed(reason)) => {
            output.push_str(&format!("\nAI extraction failed: {}\n", reason));
        }
        None => {}
    }

    Ok(output)
}
