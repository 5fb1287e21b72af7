//! jml build tooling
//!
//! Derives the interpreter's export surface from its sources instead of
//! a hand-maintained list. Two cooperating components:
//! - the link-directive scanner, turning leading `--link:` comments in
//!   native std modules into `-l` linker flags;
//! - the export synthesizer, driving the MSVC toolchain end-to-end to
//!   regenerate the DLL module-definition file.

pub mod config;
pub mod defgen;
pub mod directive;
pub mod error;
pub mod session;
pub mod symbols;

pub use config::{DefgenConfig, Stage};
pub use defgen::{cleanup, enumerate_sources, generate_exports, synthesize, SourceUnit};
pub use directive::{link_flags, scan_file, source_for_artifact, LinkDirective};
pub use error::{BuildError, BuildResult};
pub use session::ToolchainSession;
pub use symbols::{parse_symbols, ExportDefinition};
