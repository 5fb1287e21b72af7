//! Synthesizer configuration
//!
//! Pure configuration data plus the MSVC command text built from it.
//! Defaults reproduce the project's conventional layout; a JSON override
//! file can replace any subset of fields.

use std::path::{Path, PathBuf};

use crate::error::{BuildError, BuildResult};

/// Pipeline stage, used to name log targets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Scan,
    Session,
    Parse,
    Emit,
}

impl Stage {
    /// Get the string name of the stage
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Scan => "scan",
            Stage::Session => "session",
            Stage::Parse => "parse",
            Stage::Emit => "emit",
        }
    }

    /// Get the log target name for this stage
    pub fn target(&self) -> String {
        format!("jmlbuild::{}", self.as_str())
    }
}

/// Configuration for one export-synthesis run
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct DefgenConfig {
    /// Directory holding the C sources (flat, non-recursive)
    pub source_dir: String,
    /// Directory the compiler drops object files into
    pub object_dir: String,
    /// Temporary static-library archive path
    pub archive_path: String,
    /// Destination module-definition file
    pub def_path: String,
    /// Include directories passed to the compiler
    pub include_dirs: Vec<String>,
    /// Path to the MSVC environment-initialization script
    pub vcvarsall: String,
    /// Target architecture argument for vcvarsall
    pub arch: String,
    /// Exported symbols must start with this prefix
    pub export_prefix: String,
    /// Shell program driving the toolchain
    pub shell: String,
    /// Bound on the final drain; `None` waits forever
    pub drain_timeout_secs: Option<u64>,
}

impl Default for DefgenConfig {
    fn default() -> Self {
        Self {
            source_dir: "src".to_string(),
            object_dir: "lib".to_string(),
            archive_path: "lib\\tmpstatic.lib".to_string(),
            def_path: "tool/msvc/jml.def".to_string(),
            include_dirs: vec!["src".to_string(), "include".to_string()],
            vcvarsall: "C:\\Program Files (x86)\\Microsoft Visual Studio\\2019\\Community\\VC\\Auxiliary\\Build\\vcvarsall.bat".to_string(),
            arch: "amd64".to_string(),
            export_prefix: "jml".to_string(),
            shell: "cmd.exe".to_string(),
            drain_timeout_secs: Some(600),
        }
    }
}

impl DefgenConfig {
    /// Read a JSON override file
    ///
    /// Missing fields fall back to the defaults, so a file overriding a
    /// single path is valid.
    pub fn load(path: &Path) -> BuildResult<Self> {
        if !path.exists() {
            return Err(BuildError::Config(format!(
                "config file '{}' not found",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            BuildError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| BuildError::Config(format!("cannot parse '{}': {}", path.display(), e)))
    }

    /// Basename stem of the temporary shared-library artifact
    ///
    /// The linker also produces `.exp`/`.dll`/`.lib` siblings next to it;
    /// all are deleted during cleanup.
    pub fn shared_stem(&self) -> String {
        format!("{}__2", self.archive_path.replace(".lib", ""))
    }

    /// Object-file path for a source file, relocated into the object dir
    pub fn object_for(&self, source: &Path) -> PathBuf {
        let stem = source.file_stem().unwrap_or_default();
        let mut name = stem.to_os_string();
        name.push(".obj");
        Path::new(&self.object_dir).join(name)
    }

    /// `cd` into the working directory
    pub fn cd_command(&self, cwd: &Path) -> String {
        format!("cd \"{}\"", cwd.display())
    }

    /// Initialize the MSVC environment for the target architecture
    pub fn env_init_command(&self) -> String {
        format!("\"{}\" {}", self.vcvarsall, self.arch)
    }

    /// Compile every source and link them into the shared artifact
    ///
    /// Object files land in the object directory as a side effect of the
    /// same invocation.
    pub fn compile_command(&self) -> String {
        let includes = self
            .include_dirs
            .iter()
            .map(|d| format!("/I {}", d))
            .collect::<Vec<_>>()
            .join(" ");
        let stem = self.shared_stem();
        format!(
            "cl.exe {}/*.c {} /Fo{}\\ /EHsc /LD /Fe{} /DEF {} /link /out:{}.dll",
            self.source_dir, includes, self.object_dir, stem, self.def_path, stem
        )
    }

    /// Collect every object file into the temporary static archive
    pub fn archive_command(&self) -> String {
        format!("lib {}/*.obj /out:{}", self.object_dir, self.archive_path)
    }

    /// Dump the archive's linker member (public symbol table)
    pub fn dump_command(&self) -> String {
        format!("dumpbin /LINKERMEMBER {}", self.archive_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Scan.as_str(), "scan");
        assert_eq!(Stage::Session.target(), "jmlbuild::session");
        assert_eq!(Stage::Emit.target(), "jmlbuild::emit");
    }

    #[test]
    fn test_default_layout() {
        let cfg = DefgenConfig::default();
        assert_eq!(cfg.source_dir, "src");
        assert_eq!(cfg.object_dir, "lib");
        assert_eq!(cfg.archive_path, "lib\\tmpstatic.lib");
        assert_eq!(cfg.def_path, "tool/msvc/jml.def");
        assert_eq!(cfg.export_prefix, "jml");
        assert_eq!(cfg.shell, "cmd.exe");
        assert_eq!(cfg.drain_timeout_secs, Some(600));
    }

    #[test]
    fn test_shared_stem_derivation() {
        let cfg = DefgenConfig::default();
        assert_eq!(cfg.shared_stem(), "lib\\tmpstatic__2");
    }

    #[test]
    fn test_object_relocation() {
        let cfg = DefgenConfig::default();
        let obj = cfg.object_for(Path::new("src/jml_vm.c"));
        assert_eq!(obj, Path::new("lib").join("jml_vm.obj"));
    }

    #[test]
    fn test_compile_command_text() {
        let cfg = DefgenConfig::default();
        assert_eq!(
            cfg.compile_command(),
            "cl.exe src/*.c /I src /I include /Folib\\ /EHsc /LD /Felib\\tmpstatic__2 \
             /DEF tool/msvc/jml.def /link /out:lib\\tmpstatic__2.dll"
        );
    }

    #[test]
    fn test_archive_and_dump_commands() {
        let cfg = DefgenConfig::default();
        assert_eq!(cfg.archive_command(), "lib lib/*.obj /out:lib\\tmpstatic.lib");
        assert_eq!(cfg.dump_command(), "dumpbin /LINKERMEMBER lib\\tmpstatic.lib");
    }

    #[test]
    fn test_env_init_command() {
        let mut cfg = DefgenConfig::default();
        cfg.vcvarsall = "C:\\vc\\vcvarsall.bat".to_string();
        assert_eq!(cfg.env_init_command(), "\"C:\\vc\\vcvarsall.bat\" amd64");
    }

    #[test]
    fn test_load_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"source_dir": "core", "export_prefix": "abc"}}"#).unwrap();

        let cfg = DefgenConfig::load(file.path()).unwrap();
        assert_eq!(cfg.source_dir, "core");
        assert_eq!(cfg.export_prefix, "abc");
        // Untouched fields keep their defaults
        assert_eq!(cfg.object_dir, "lib");
        assert_eq!(cfg.shell, "cmd.exe");
    }

    #[test]
    fn test_load_missing_file() {
        let result = DefgenConfig::load(Path::new("no/such/defgen.json"));
        assert!(matches!(result, Err(BuildError::Config(_))));
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = DefgenConfig::load(file.path());
        assert!(matches!(result, Err(BuildError::Config(_))));
    }
}
