//! Process command - extract data from a single receipt file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use rcpt_core::ExtractionResult;

use super::{build_parser, build_stitcher, load_config, read_input};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (.txt lines or .json OCR document)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Skip assistants and use only the rule-based parser
    #[arg(long)]
    offline: bool,

    /// Show extraction confidence and source
    #[arg(long)]
    show_confidence: bool,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    info!("Processing file: {}", args.input.display());

    let input = read_input(&args.input)?;
    let text = build_stitcher(&config).stitch_text(&input);

    let parser = build_parser(&config, args.offline)?;
    let result = parser.parse(&text).await;

    if args.validate {
        let issues = result.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_result(&result, args.format)?;

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

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.0}% ({})",
            style("ℹ").blue(),
            result.confidence * 100.0,
            result.source
        );
        if result.needs_review() {
            println!("{} Low confidence, please review", style("!").yellow());
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["store_name", "date", "item", "quantity", "price", "line_total"])?;

    let store = result.store_name.clone().unwrap_or_default();
    let date = result.date.map(|d| d.to_string()).unwrap_or_default();

    for item in &result.items {
        wtr.write_record([
            store.as_str(),
            date.as_str(),
            item.name.as_str(),
            &item.quantity.to_string(),
            &item.price.to_string(),
            &item.line_total().map(|t| t.to_string()).unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Store: {}\n",
        result.store_name.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Date: {}\n",
        result.date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    ));
    output.push('\n');

    output.push_str("Items:\n");
    for item in &result.items {
        if item.quantity > 1 {
            output.push_str(&format!("  {} x{}  {}\n", item.name, item.quantity, item.price));
        } else {
            output.push_str(&format!("  {}  {}\n", item.name, item.price));
        }
    }
    output.push('\n');

    output.push_str("Summary:\n");
    for (label, value) in [
        ("Subtotal", result.subtotal),
        ("Tax", result.tax),
        ("Total", result.total),
    ] {
        if let Some(value) = value {
            output.push_str(&format!("  {:<9}{}\n", format!("{}:", label), value));
        }
    }

    output
}
