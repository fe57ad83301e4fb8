mod cli;
mod commands;
mod config;
mod data_source;
mod identity;
mod paths;
mod progress;
mod provider;
mod resource;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config_path: PathBuf,
    pub state_path: PathBuf,
    /// Database path given on the command line
    pub database: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config_path: paths::expand_path(&cli.config.to_string_lossy()),
        state_path: paths::expand_path(&cli.state.to_string_lossy()),
        database: cli.database,
    };

    match cli.command {
        Command::Plan(args) => commands::plan::plan(&ctx, args.target.as_deref()),
        Command::Apply(args) => {
            commands::plan::apply(&ctx, args.target.as_deref(), args.dry_run, args.yes)
        }
        Command::Destroy(args) => commands::plan::destroy(&ctx, args.target.as_deref(), args.yes),
        Command::Refresh(args) => commands::plan::refresh(&ctx, args.target.as_deref()),
        Command::Import { address, id } => commands::import::run(&ctx, &address, &id),
        Command::State(cmd) => commands::state::run(&ctx, cmd),
        Command::Read(args) => commands::data::read(&ctx, args.target.as_deref()),
        Command::Schema => commands::schema::run(),
        Command::Db(cmd) => commands::db::run(&ctx, cmd),
        Command::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "persondb-provider",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
