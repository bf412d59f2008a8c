//! Stitch command - print the logical lines of an OCR document.

use std::path::PathBuf;

use clap::Args;

use super::{build_stitcher, load_config, read_input};

/// Arguments for the stitch command.
#[derive(Args)]
pub struct StitchArgs {
    /// OCR document (.json) or plain lines (.txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Print lines as a JSON array
    #[arg(long)]
    json: bool,
}

pub fn run(args: StitchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let input = read_input(&args.input)?;
    let lines = build_stitcher(&config).stitch(&input);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
    } else {
        for line in &lines {
            println!("{}", line);
        }
    }

    Ok(())
}
