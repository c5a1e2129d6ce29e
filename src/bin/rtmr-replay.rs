use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tdx_rtmr::logging::init_logging;
use tdx_rtmr::measurement::boot::{locate_boot_files, DEFAULT_BOOT_DIR, DEFAULT_CMDLINE_PATH};
use tdx_rtmr::report::ReplayedRegister;

#[derive(Parser, Debug)]
#[command(version, about = "Predicts RTMR[1] from the kernel, initrd and command line")]
struct Cli {
    #[arg(long, env = "TDX_RTMR_BOOT_DIR", default_value = DEFAULT_BOOT_DIR, help = "Directory holding vmlinuz-<version> and its initrd")]
    boot_dir: PathBuf,

    #[arg(long, env = "TDX_RTMR_CMDLINE", default_value = DEFAULT_CMDLINE_PATH, help = "File containing the kernel command line")]
    cmdline: PathBuf,

    #[arg(long, help = "Compare the prediction against the RTMR[1] attested in this quote")]
    quote: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let files = locate_boot_files(&cli.boot_dir).context("couldn't locate boot files")?;
    let artifacts = files
        .load(&cli.cmdline)
        .context("couldn't read boot artifacts")?;

    let expected = artifacts.expected_rtmr1();
    println!("{}", ReplayedRegister(&expected));

    if let Some(path) = cli.quote {
        let bytes = std::fs::read(&path)
            .with_context(|| format!("couldn't read quote file {}", path.display()))?;
        let inspection = tdx_rtmr::inspect_quote(&bytes)?;
        let attested = inspection.td_report.boot_register();
        if !artifacts.matches(&inspection.td_report) {
            anyhow::bail!("RTMR[1] mismatch: quote attests {}", attested.to_hex());
        }
        println!("RTMR[1] matches the quote");
    }

    Ok(())
}
