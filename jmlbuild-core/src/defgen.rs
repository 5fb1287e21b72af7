//! Export-table synthesizer
//!
//! Drives the MSVC toolchain through one shell session: compile the
//! source tree into a shared artifact, archive the objects, dump the
//! archive's public symbol table, then parse, filter and emit the
//! module-definition file, and clean up every intermediate artifact.
//!
//! The staged commands are fire-and-forget; a failed stage only shows
//! up when the drained output is missing its markers. The pipeline is
//! single-use and unsynchronized: callers must not run two syntheses
//! over the same tree concurrently.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::config::DefgenConfig;
use crate::error::{BuildError, BuildResult};
use crate::session::ToolchainSession;
use crate::symbols::{parse_symbols, ExportDefinition};

/// One C source and the object file the compiler leaves behind for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub source: PathBuf,
    pub object: PathBuf,
}

/// List the `*.c` files directly under the source directory.
///
/// Flat and non-recursive; sorted by path so cleanup order and logs are
/// deterministic.
pub fn enumerate_sources(config: &DefgenConfig) -> BuildResult<Vec<SourceUnit>> {
    let mut units = Vec::new();
    for entry in fs::read_dir(&config.source_dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("c") {
            units.push(SourceUnit {
                object: config.object_for(&path),
                source: path,
            });
        }
    }
    units.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(units)
}

/// Run the full synthesis pipeline and write the definition file.
///
/// The session is the single synchronization point: every command is
/// queued up front and nothing is read back until the drain.
pub fn synthesize(config: &DefgenConfig) -> BuildResult<ExportDefinition> {
    let cwd = std::env::current_dir()?;
    let units = enumerate_sources(config)?;
    info!(
        target: "jmlbuild::session",
        "{} source file(s) under '{}'",
        units.len(),
        config.source_dir
    );

    let mut session = ToolchainSession::spawn(&config.shell)?;
    session.send(&config.cd_command(&cwd))?;
    session.send(&config.env_init_command())?;
    session.send(&config.compile_command())?;
    session.send(&config.archive_command())?;
    session.send(&config.dump_command())?;

    let raw = session.drain(config.drain_timeout_secs.map(Duration::from_secs))?;

    let def = generate_exports(&raw, config)?;
    def.write_to(Path::new(&config.def_path))?;
    cleanup(config, &units)?;

    info!(
        target: "jmlbuild::emit",
        "{} export(s) written to '{}'",
        def.symbols().len(),
        config.def_path
    );
    Ok(def)
}

/// Parse the drained dump and filter it to the project's public API.
pub fn generate_exports(raw: &str, config: &DefgenConfig) -> BuildResult<ExportDefinition> {
    let symbols = parse_symbols(raw, &config.archive_path)?;
    Ok(ExportDefinition::from_symbols(symbols, &config.export_prefix))
}

/// Delete the run's intermediate artifacts.
///
/// The temporary archive must go: failure to delete it signals an
/// inconsistent intermediate state the caller must not continue past.
/// The shared-library siblings and the object files are best-effort;
/// one locked or missing file does not abort the rest.
pub fn cleanup(config: &DefgenConfig, units: &[SourceUnit]) -> BuildResult<()> {
    fs::remove_file(&config.archive_path).map_err(|e| BuildError::ArchiveCleanup {
        path: config.archive_path.clone(),
        source: e,
    })?;

    let stem = config.shared_stem();
    for ext in [".exp", ".dll", ".lib"] {
        let sibling = format!("{}{}", stem, ext);
        if let Err(e) = fs::remove_file(&sibling) {
            warn!(target: "jmlbuild::emit", "could not delete '{}': {}", sibling, e);
        }
    }

    for unit in units {
        if let Err(e) = fs::remove_file(&unit.object) {
            warn!(
                target: "jmlbuild::emit",
                "could not delete '{}': {}",
                unit.object.display(),
                e
            );
        }
    }
    Ok(())
}
