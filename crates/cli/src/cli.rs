use clap::Parser;
use std::path::PathBuf;

use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "passos-smoke")]
#[command(about = "Browser smoke test for the Pequenos Passos page")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Report format printed on stdout
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Base URL of the externally started server under test
    #[arg(long, value_name = "URL", default_value = "http://localhost:8000/")]
    pub base_url: String,

    /// Directory for screenshot artifacts
    #[arg(long, value_name = "DIR", default_value = "jules-scratch/verification")]
    pub out_dir: PathBuf,

    /// Run with a visible browser window instead of headless
    #[arg(long)]
    pub headed: bool,
}
