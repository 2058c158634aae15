mod cli;
mod commands;
mod config;
mod manifest;
mod progress;
mod resource;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::{FileConfig, Settings};
use std::io;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub settings: Settings,
}

impl Context {
    /// Build a Kea client from the effective settings
    pub fn client(&self) -> Result<keakit::Client> {
        self.settings.client()
    }

    /// Default target host
    pub fn host(&self) -> Result<&str> {
        self.settings.host()
    }
}

fn log_level(cli: &Cli, settings: &Settings) -> log::LevelFilter {
    if cli.quiet {
        return log::LevelFilter::Error;
    }
    match cli.verbose {
        0 => settings.log_level.unwrap_or(log::LevelFilter::Warn),
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "keactl", &mut io::stdout());
        return Ok(());
    }

    let file = FileConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(cli.host.clone(), file, |key| std::env::var(key).ok())?;

    env_logger::Builder::new()
        .filter_level(log_level(&cli, &settings))
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        settings,
    };

    match &cli.command {
        Command::Plan(args) => commands::plan::run(&ctx, &args.manifest),
        Command::Apply(args) => commands::apply::apply(&ctx, args),
        Command::Destroy(args) => commands::apply::destroy(&ctx, args),
        Command::Import(cmd) => commands::import::run(&ctx, cmd),
        Command::Subnets(cmd) => commands::query::subnets(&ctx, cmd),
        Command::OptionDefs(cmd) => commands::query::option_defs(&ctx, cmd),
        Command::Reservations(cmd) => commands::query::reservations(&ctx, cmd),
        Command::Leases(cmd) => commands::leases::run(&ctx, cmd),
        Command::Heartbeat => commands::query::heartbeat(&ctx),
        Command::Completions { .. } => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::error(&format!("{err:#}"));
            if !quiet
                && let Some(kea) = err.chain().find_map(|e| e.downcast_ref::<keakit::Error>())
            {
                let category = kea.category();
                eprintln!("  {}: {}", category.description(), category.advice());
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_precedence() {
        let settings = Settings {
            log_level: Some(log::LevelFilter::Info),
            ..Settings::default()
        };

        let cli = Cli::try_parse_from(["keactl", "heartbeat"]).unwrap();
        assert_eq!(log_level(&cli, &settings), log::LevelFilter::Info);
        assert_eq!(log_level(&cli, &Settings::default()), log::LevelFilter::Warn);

        let cli = Cli::try_parse_from(["keactl", "-vv", "heartbeat"]).unwrap();
        assert_eq!(log_level(&cli, &settings), log::LevelFilter::Debug);

        let cli = Cli::try_parse_from(["keactl", "-q", "-v", "heartbeat"]).unwrap();
        assert_eq!(log_level(&cli, &settings), log::LevelFilter::Error);
    }
}
