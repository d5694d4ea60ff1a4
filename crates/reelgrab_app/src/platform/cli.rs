use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use reelgrab_core::OutputFormat;

/// Fetch an Instagram post or reel through a reelgrab conversion server.
#[derive(Debug, Parser)]
#[command(name = "reelgrab", version, about)]
pub struct Cli {
    /// Post, reel or story URL.
    pub url: String,

    /// Conversion server root, e.g. http://127.0.0.1:5000/
    #[arg(long)]
    pub server: Option<String>,

    /// Format the selector starts on for videos.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Accept the preselected format without asking.
    #[arg(long)]
    pub no_prompt: bool,

    /// Directory the artifact is saved into.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// RON config file. Defaults to ./reelgrab.ron when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Progress polling cadence in milliseconds.
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Write logs to this file instead of the terminal.
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Mp4,
    Mp3,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Mp4 => OutputFormat::Mp4,
            FormatArg::Mp3 => OutputFormat::Mp3,
        }
    }
}
