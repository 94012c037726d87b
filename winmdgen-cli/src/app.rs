use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// winmdgen - Windows Runtime metadata generation for authored components
#[derive(Debug, Parser)]
#[command(name = "winmdgen", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a full generation: check, build, write the .winmd and run the projection tool.
    Generate {
        /// Program description (JSON source units with their declared types).
        #[arg(long, value_name = "JSON")]
        program: PathBuf,

        /// Build properties in analyzer-config (globalconfig) format.
        #[arg(long, value_name = "GLOBALCONFIG")]
        properties: PathBuf,

        /// Write the projection sources into this directory.
        #[arg(long, value_name = "DIR")]
        sources_out: Option<PathBuf>,

        /// Do not start the projection tool; only the .winmd is produced.
        #[arg(long)]
        skip_projection: bool,
    },

    /// Run the interop rules over a program. Exits with 1 when violations exist.
    Check {
        /// Program description (JSON source units with their declared types).
        #[arg(long, value_name = "JSON")]
        program: PathBuf,
    },

    /// List the metadata tables of a .winmd file and their row counts.
    Tables {
        /// Path to the .winmd file.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}
