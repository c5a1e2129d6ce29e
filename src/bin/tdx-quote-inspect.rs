use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use tdx_rtmr::logging::init_logging;

#[derive(Parser, Debug)]
#[command(version, about = "Intel TDX quote inspector")]
struct Cli {
    /// Path to a TDX quote, either raw binary or a protobuf QuoteV4 message
    quote: PathBuf,

    /// Print the inspection as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Fail unless the quote signature verifies
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            err.print().ok();
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let bytes = std::fs::read(&cli.quote)
        .with_context(|| format!("couldn't read quote file {}", cli.quote.display()))?;

    let inspection =
        tdx_rtmr::inspect_quote(&bytes).context("couldn't extract TD report from quote")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
    } else {
        println!("Reading TDX quote from: {}", cli.quote.display());
        print!("{inspection}");
    }

    if cli.strict {
        inspection.require_valid_signature()?;
    }
    Ok(())
}
