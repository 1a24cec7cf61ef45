// src/common/logger.rs
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use chrono::Local;
use env_logger::{Builder, Target};
use log::{info, LevelFilter};

/// Debug when verbose, errors only when silent, info otherwise. `RUST_LOG`
/// still refines per-module levels on top of that.
pub fn level_for(verbose: bool, silent: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else if silent {
        LevelFilter::Error
    } else {
        LevelFilter::Info
    }
}

pub fn init(verbose: bool, silent: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = Builder::new();
    builder.filter_level(level_for(verbose, silent));
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    if let Some(log_path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(log_path)?;
        builder.target(Target::Pipe(Box::new(file)));
    } else {
        builder.target(Target::Stdout);
    }

    builder.format(|buf, record| {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(buf, "[{}] [{}] {}", timestamp, record.level(), record.args())
    });

    builder.try_init()?;

    if let Some(log_path) = log_file {
        info!("Logging to file: {}", log_path.display());
    }
    Ok(())
}
