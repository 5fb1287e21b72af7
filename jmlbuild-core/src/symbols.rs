//! Symbol-dump parsing and export-definition emission
//!
//! `dumpbin /LINKERMEMBER` output is semi-structured text; the public
//! symbol table is recovered by marker-offset slicing. The markers,
//! the 4-character backtrack and the 10-character symbol column are the
//! external tool's exact format contract and live only in this module,
//! so a format change in the tool is a one-place fix.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{BuildError, BuildResult};

/// Preamble line naming the dumped archive
const DUMP_OF_FILE: &str = "Dump of file ";

/// Header announcing the public-symbol table; the table body starts
/// immediately after it
const SYMBOL_TABLE_HEADER: &str = "correct header end\r\n\r\n    122 public symbols\r\n\r\n";

/// Start of the next archive section, bounding the table body
const SECTION_BOUNDARY: &str = "Archive member name at";

/// Characters backed off the boundary to drop the trailing separator
const SEPARATOR_BACKTRACK: usize = 4;

/// Fixed-width offset/hex column preceding each symbol name
static SYMBOL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[a-fA-F\d ]{10}(\w*)").unwrap());

/// Extract every symbol name from the dump's public-symbol table.
///
/// All three markers must be present; a missing one means an upstream
/// compile, archive or dump command failed silently, and is reported as
/// `ToolchainOutput` rather than producing an empty table.
pub fn parse_symbols(raw: &str, archive_name: &str) -> BuildResult<Vec<String>> {
    let dump_marker = format!("{}{}", DUMP_OF_FILE, archive_name);
    let dump_at = raw
        .find(&dump_marker)
        .ok_or_else(|| BuildError::ToolchainOutput {
            marker: dump_marker.clone(),
        })?;

    let header_at =
        raw[dump_at..]
            .find(SYMBOL_TABLE_HEADER)
            .ok_or_else(|| BuildError::ToolchainOutput {
                marker: "public symbols header".to_string(),
            })?;
    let body_start = dump_at + header_at + SYMBOL_TABLE_HEADER.len();

    // The boundary scan starts one marker-length past the body start
    let search_from = (body_start + SECTION_BOUNDARY.len()).min(raw.len());
    let boundary_at =
        raw[search_from..]
            .find(SECTION_BOUNDARY)
            .ok_or_else(|| BuildError::ToolchainOutput {
                marker: SECTION_BOUNDARY.to_string(),
            })?;
    let body_end = (search_from + boundary_at)
        .saturating_sub(SEPARATOR_BACKTRACK)
        .max(body_start);

    let body = &raw[body_start..body_end];
    let symbols: Vec<String> = SYMBOL_LINE
        .captures_iter(body)
        .map(|caps| caps[1].to_string())
        .collect();

    debug!(
        target: "jmlbuild::parse",
        "{} symbol table entries in {} byte body",
        symbols.len(),
        body.len()
    );
    Ok(symbols)
}

/// Ordered, distinct, prefix-filtered export surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDefinition {
    symbols: Vec<String>,
}

impl ExportDefinition {
    /// Keep only symbols carrying the project prefix, in discovery
    /// order, dropping duplicates. Everything else in the archive is
    /// toolchain- or CRT-internal.
    pub fn from_symbols<I>(symbols: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let symbols = symbols
            .into_iter()
            .filter(|s| s.starts_with(prefix))
            .filter(|s| seen.insert(s.clone()))
            .collect();
        Self { symbols }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Module-definition file content: an `EXPORTS` header, then one
    /// symbol per line
    pub fn render(&self) -> String {
        let mut out = String::from("EXPORTS\n");
        for symbol in &self.symbols {
            out.push_str(symbol);
            out.push('\n');
        }
        out
    }

    pub fn write_to(&self, path: &Path) -> BuildResult<()> {
        std::fs::write(path, self.render())?;
        debug!(
            target: "jmlbuild::emit",
            "wrote {} export(s) to {}",
            self.symbols.len(),
            path.display()
        );
        Ok(())
    }
}
