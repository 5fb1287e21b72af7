//! jml build tooling CLI
//!
//! Two subcommands: `linkflags` resolves a native std module's embedded
//! link directives into `-l` flags for the build driver; `defgen`
//! regenerates the DLL export-definition file from the source tree.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use jmlbuild_core::{link_flags, scan_file, source_for_artifact, synthesize, DefgenConfig};

mod logging;
use logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "jmlbuild",
    about = "jml build tooling - link flags and DLL export generation",
    version
)]
struct Cli {
    /// Enable per-stage debug logging (stderr)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the -l linker flags declared in a source file's leading comment
    Linkflags {
        /// Source path; a shared-library name is rewritten to its source
        path: String,
    },
    /// Regenerate the DLL export-definition file (MSVC hosts only)
    Defgen {
        /// JSON file overriding the built-in project layout
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, LogFormat::Compact);

    match cli.command {
        Command::Linkflags { path } => run_linkflags(&path),
        Command::Defgen { config } => run_defgen(config.as_deref()),
    }
}

fn run_linkflags(arg: &str) {
    let source = source_for_artifact(arg);
    match scan_file(&source) {
        Ok(directives) => {
            // Flag fragment only, no trailing newline
            print!("{}", link_flags(&directives));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_defgen(config_path: Option<&Path>) {
    // The synthesizer drives cmd.exe and the MSVC tools; anywhere else
    // it declines cleanly instead of attempting a partial run
    if !cfg!(windows) {
        println!("windows only");
        return;
    }

    let config = match config_path {
        Some(path) => DefgenConfig::load(path),
        None => Ok(DefgenConfig::default()),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match synthesize(&config) {
        Ok(def) => {
            println!("{} export(s) -> {}", def.symbols().len(), config.def_path);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
