use crate::error::Result;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

/// Per-sink thresholds derived from the command-line flags.
///
/// The log file never records less than `DEBUG`, so a run started without `-v` still leaves
/// the flux and geometry setup details on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevels {
    pub console: LevelFilter,
    pub file: LevelFilter,
}

impl LogLevels {
    pub fn from_flags(verbosity: u8, quiet: bool) -> Self {
        let console = if quiet {
            LevelFilter::ERROR
        } else {
            [LevelFilter::WARN, LevelFilter::INFO, LevelFilter::DEBUG]
                .get(usize::from(verbosity))
                .copied()
                .unwrap_or(LevelFilter::TRACE)
        };
        Self {
            console,
            file: console.max(LevelFilter::DEBUG),
        }
    }
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let levels = LogLevels::from_flags(verbosity, quiet);

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(levels.console);

    let file = match log_file {
        Some(path) => Some(
            fmt::layer()
                .with_writer(Mutex::new(File::create(path)?))
                .with_ansi(false)
                .with_target(true)
                .with_filter(levels.file),
        ),
        None => None,
    };

    tracing_subscriber::registry().with(console).with(file).init();
    Ok(())
}
