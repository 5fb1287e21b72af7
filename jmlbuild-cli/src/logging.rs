//! CLI logging bootstrap
//!
//! Per-stage log control over `tracing-subscriber`. Logs go to stderr:
//! `linkflags` stdout is spliced into a link command line and must stay
//! clean.

use std::io;

use jmlbuild_core::Stage;
use tracing::Level;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored, multi-line (development)
    Pretty,
    /// Single line, no timestamps
    Compact,
}

/// Initialize the log system for the chosen verbosity and format
pub fn init(verbose: bool, format: LogFormat) {
    let global = if verbose { Level::DEBUG } else { Level::INFO };

    let targets = Targets::new()
        .with_default(global)
        .with_target(Stage::Scan.target(), global)
        .with_target(Stage::Session.target(), global)
        .with_target(Stage::Parse.target(), global)
        .with_target(Stage::Emit.target(), global);

    let layer = match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_writer(io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(targets))
        .init();
}
