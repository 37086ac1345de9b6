//! `conform`: run an interpreter's conformance corpus.
//!
//! With no arguments, runs the `gc-stress` preset (`examples/*.lox` against
//! `./bin/clox --stress-GC=full`). Exits with the number of failed plus
//! timed-out executions, or 1 on a configuration error.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use conform::cli::{OutputOptions, config_command, list_command, run_command};
use conform::core::skip::SkipPattern;
use conform::core::variant::Variant;
use conform::exit_codes;
use conform::io::config::{ConfigOverrides, Preset, SuiteConfig, apply_overrides, load_config};
use conform::logging;

#[derive(Parser)]
#[command(
    name = "conform",
    version,
    about = "Conformance test runner for an interpreter binary"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run every case under every enabled variant (default).
    Run(RunArgs),
    /// List discovered cases and whether they would be skipped.
    List(SuiteArgs),
    /// Print the effective configuration as TOML.
    Config(SuiteArgs),
}

#[derive(Args, Default)]
struct RunArgs {
    #[command(flatten)]
    suite: SuiteArgs,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Don't print a line before each execution.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args, Default)]
struct SuiteArgs {
    /// Built-in configuration to start from.
    #[arg(long, value_enum, default_value_t = Preset::GcStress)]
    preset: Preset,

    /// TOML config file; replaces the preset.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory containing the case files.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Case file extension.
    #[arg(long = "ext")]
    extension: Option<String>,

    /// Interpreter binary (path, or name looked up on PATH).
    #[arg(long)]
    binary: Option<PathBuf>,

    /// Per-execution deadline in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Variant as `name` or `name=<flags>`; repeatable, replaces configured variants.
    #[arg(long = "variant", value_parser = Variant::parse)]
    variants: Vec<Variant>,

    /// Skip cases whose path contains this string; repeatable.
    #[arg(long)]
    skip: Vec<String>,

    /// Skip cases whose path matches this regex; repeatable.
    #[arg(long)]
    skip_regex: Vec<String>,
}

impl SuiteArgs {
    fn overrides(&self) -> ConfigOverrides {
        let substrings = self.skip.iter().cloned().map(SkipPattern::Substring);
        let regexes = self.skip_regex.iter().cloned().map(SkipPattern::Regex);
        ConfigOverrides {
            root: self.root.clone(),
            extension: self.extension.clone(),
            binary: self.binary.clone(),
            timeout_secs: self.timeout_secs,
            variants: self.variants.clone(),
            skip: substrings.chain(regexes).collect(),
        }
    }

    fn load(&self) -> Result<SuiteConfig> {
        let base = match &self.config {
            Some(path) => load_config(path)?,
            None => self.preset.config(),
        };
        apply_overrides(base, &self.overrides())
    }
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command.unwrap_or_else(|| Command::Run(RunArgs::default())) {
        Command::Run(args) => {
            let cfg = args.suite.load()?;
            let output = OutputOptions {
                json: args.json,
                quiet: args.quiet,
            };
            run_command(&cfg, output)
        }
        Command::List(args) => {
            list_command(&args.load()?)?;
            Ok(exit_codes::OK)
        }
        Command::Config(args) => {
            config_command(&args.load()?)?;
            Ok(exit_codes::OK)
        }
    }
}
