mod env;
mod exec;
mod extract;
mod store;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::{debug, error, info};
use std::process;

use crate::extract::ExtractOptions;
use crate::store::SsmStore;

/// Run a command with AWS SSM Parameter Store values injected into its environment
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Inject only parameters whose name starts with this prefix (the prefix is stripped)
    #[arg(long, value_name = "PREFIX", default_value = "")]
    prefix: String,

    /// Do not decrypt parameter values
    #[arg(long)]
    leave_encrypted: bool,

    /// Do not pass the surrounding process's environment to the command
    #[arg(long)]
    pristine: bool,

    /// AWS region of the parameter store (defaults to the AWS config chain)
    #[arg(long, value_name = "REGION")]
    region: Option<String>,

    /// AWS profile to load credentials from
    #[arg(long, value_name = "PROFILE")]
    profile: Option<String>,

    /// Give up if the parameter listing runs past this many pages
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Command to run, one argument per occurrence (--cmd ls --cmd -la)
    #[arg(
        long = "cmd",
        value_name = "ARG",
        required = true,
        action = ArgAction::Append,
        num_args = 1,
        allow_hyphen_values = true
    )]
    command: Vec<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Cli {
    fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            prefix: self.prefix.clone(),
            decrypt: !self.leave_encrypted,
            max_pages: self.max_pages.map(|n| n as usize),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.to_filter())
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    debug!("CLI arguments: {:#?}", cli);

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            error!("{:#}", err);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let store = SsmStore::connect(cli.region.as_deref(), cli.profile.as_deref())?;

    let extracted = extract::extract(&store, &cli.extract_options())
        .context("Failed to read parameters")?;
    info!("Extracted {} parameters", extracted.len());

    let ambient = env::ambient();
    let command_env = env::compose(cli.pristine, &ambient, &extracted);

    exec::run(&cli.command, &command_env)
}
