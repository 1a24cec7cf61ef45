use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "sif-rs",
    version,
    about = "Modular web reconnaissance: declarative scan modules and framework fingerprinting"
)]
pub struct Args {
    /// Target URL (http:// or https://). Repeatable or comma-separated
    #[arg(short, long, value_delimiter = ',')]
    pub target: Vec<String>,

    /// File with one target URL per line
    #[arg(long)]
    pub target_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Concurrent requests per module
    #[arg(long, default_value_t = 10)]
    pub threads: usize,

    /// Module IDs to run (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub modules: Vec<String>,

    /// Run every module carrying one of these tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub module_tags: Vec<String>,

    /// Run every registered module
    #[arg(long)]
    pub all_modules: bool,

    /// List registered modules and exit
    #[arg(long)]
    pub list_modules: bool,

    /// Only run framework detection
    #[arg(long)]
    pub framework: bool,

    /// Extra module directory, loaded after the built-in and user directories
    #[arg(long)]
    pub module_dir: Option<PathBuf>,

    /// Directory for per-target log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Write diagnostics to this file instead of stdout
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Report file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Silent mode (no banner, errors only)
    #[arg(short, long)]
    pub silent: bool,
}
