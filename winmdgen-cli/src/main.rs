mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })?;

    let cli = Cli::parse();

    // Show winmdgen info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("winmdgen", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Generate {
            program,
            properties,
            sources_out,
            skip_projection,
        } => commands::generate::run(
            program,
            properties,
            sources_out.as_deref(),
            *skip_projection,
            &cli.global,
        ),
        Command::Check { program } => commands::check::run(program, &cli.global),
        Command::Tables { path } => commands::tables::run(path, &cli.global),
    }
}
