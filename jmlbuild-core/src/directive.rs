//! Link-directive scanner
//!
//! Native std modules declare their external library dependencies in a
//! leading comment, e.g. `//--link: hs`. The scanner reads the first two
//! lines of a source file and turns every directive into a `-l` linker
//! flag for the build driver.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{BuildError, BuildResult};

/// `-- link : name`, whitespace-tolerant
static LINK_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--\s*link\s*:\s*(\w+)").unwrap());

/// One declared external library dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDirective {
    pub library: String,
}

/// Scan the leading lines of a source file for link directives.
///
/// Exactly the first two lines are inspected, as a single concatenated
/// buffer, so a directive is found regardless of which of the two lines
/// it sits on. No directive is an empty result, not an error.
pub fn scan_file(path: &Path) -> BuildResult<Vec<LinkDirective>> {
    let file = File::open(path).map_err(|e| BuildError::FileAccess {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut reader = BufReader::new(file);
    let mut window = String::new();
    for _ in 0..2 {
        let read = reader
            .read_line(&mut window)
            .map_err(|e| BuildError::FileAccess {
                path: path.display().to_string(),
                source: e,
            })?;
        if read == 0 {
            break;
        }
    }

    let directives: Vec<LinkDirective> = LINK_DIRECTIVE
        .captures_iter(&window)
        .map(|caps| LinkDirective {
            library: caps[1].to_string(),
        })
        .collect();

    debug!(
        target: "jmlbuild::scan",
        "{}: {} directive(s)",
        path.display(),
        directives.len()
    );
    Ok(directives)
}

/// Render directives as a build-flag fragment.
///
/// Each token is `-l` plus the library name, followed by a single space;
/// the fragment is spliced into a link command line, so there is no
/// trailing newline.
pub fn link_flags(directives: &[LinkDirective]) -> String {
    let mut out = String::new();
    for directive in directives {
        out.push_str("-l");
        out.push_str(&directive.library);
        out.push(' ');
    }
    out
}

/// Derive the source path from a build-artifact path.
///
/// The build driver passes the shared-library output name; the first
/// `.so` occurrence is rewritten to `.c`.
pub fn source_for_artifact(arg: &str) -> PathBuf {
    PathBuf::from(arg.replacen(".so", ".c", 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scan_str(content: &str) -> Vec<LinkDirective> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        scan_file(file.path()).unwrap()
    }

    #[test]
    fn test_no_directive_is_empty() {
        let directives = scan_str("#include <stdio.h>\n#include <stdlib.h>\nint x;\n");
        assert!(directives.is_empty());
        assert_eq!(link_flags(&directives), "");
    }

    #[test]
    fn test_single_directive() {
        let directives = scan_str("//-- link: foo\n\nint x;\n");
        assert_eq!(
            directives,
            vec![LinkDirective {
                library: "foo".to_string()
            }]
        );
        assert_eq!(link_flags(&directives), "-lfoo ");
    }

    #[test]
    fn test_compact_directive_form() {
        // The form actually used by std/hs.c
        let directives = scan_str("//--link: hs\n\n#include <hs/hs.h>\n");
        assert_eq!(directives[0].library, "hs");
    }

    #[test]
    fn test_two_directives_across_lines() {
        let directives = scan_str("//--link:foo\n//-- link: bar\nint x;\n");
        let flags = link_flags(&directives);
        assert!(flags.contains("-lfoo"));
        assert!(flags.contains("-lbar"));
        // Order preserved as found
        assert_eq!(flags, "-lfoo -lbar ");
    }

    #[test]
    fn test_directive_past_window_ignored() {
        let directives = scan_str("int x;\nint y;\n//--link: late\n");
        assert!(directives.is_empty());
    }

    #[test]
    fn test_whitespace_tolerance() {
        let directives = scan_str("// --  link  :  pcre2\n");
        assert_eq!(directives[0].library, "pcre2");
    }

    #[test]
    fn test_identifier_stops_at_non_word() {
        let directives = scan_str("//--link: ssl.3\n");
        assert_eq!(directives[0].library, "ssl");
    }

    #[test]
    fn test_one_line_file() {
        let directives = scan_str("//--link: m");
        assert_eq!(directives[0].library, "m");
    }

    #[test]
    fn test_missing_file_is_file_access_error() {
        let result = scan_file(Path::new("no/such/module.c"));
        assert!(matches!(result, Err(BuildError::FileAccess { .. })));
    }

    #[test]
    fn test_artifact_name_normalization() {
        assert_eq!(source_for_artifact("std/hs.so"), PathBuf::from("std/hs.c"));
        assert_eq!(source_for_artifact("std/hs.c"), PathBuf::from("std/hs.c"));
    }
}
