//! # vidhi CLI entry point
//!
//! Parses command-line arguments, opens a [`Session`] and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vidhi_cli::config::VidhiConfig;
use vidhi_cli::document::{
    run_detect, run_generate, run_recommend, run_validate, DetectArgs, GenerateArgs, RecommendArgs, ValidateArgs,
};
use vidhi_cli::lifecycle::{
    run_appeal, run_deadlines, run_status, run_transition, AppealArgs, DeadlinesArgs, RecordIdArgs, StatusArgs,
};
use vidhi_cli::rules::{run_rules, RulesArgs};
use vidhi_cli::{clock_for, Session};
use vidhi_lifecycle::LifecycleEvent;

/// Vidhi: jurisdiction-aware legal document generation.
///
/// Generates RTI applications, affidavits and first appeals from rule
/// data, explains every clause it includes, and tracks filed documents
/// through their statutory deadlines.
#[derive(Parser, Debug)]
#[command(name = "vidhi", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (default: ./vidhi.yaml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rules directory, overriding the configuration.
    #[arg(long, global = true)]
    rules_dir: Option<PathBuf>,

    /// Record directory, overriding the configuration.
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Evaluate as of this date or RFC 3339 instant instead of now.
    #[arg(long, global = true)]
    as_of: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect, export and check rule tables.
    Rules(RulesArgs),
    /// Detect regulatory categories in text.
    Detect(DetectArgs),
    /// Suggest a document kind from a description of what you need.
    Recommend(RecommendArgs),
    /// Validate an input file and print the verdict.
    Validate(ValidateArgs),
    /// Generate a document from an input file.
    Generate(GenerateArgs),
    /// Mark a drafted document as filed (DRAFTED -> SUBMITTED).
    Submit(RecordIdArgs),
    /// Record the authority's reply (-> REPLY_RECEIVED).
    Reply(RecordIdArgs),
    /// Close a record (-> CLOSED).
    Close(RecordIdArgs),
    /// Show one record, or list all records.
    Status(StatusArgs),
    /// Generate a first appeal against an RTI application.
    Appeal(AppealArgs),
    /// List running reply and appeal deadlines, soonest first.
    Deadlines(DeadlinesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let cwd = std::env::current_dir().context("failed to read working directory")?;
    let mut config = VidhiConfig::resolve(cli.config.as_deref(), &cwd)?;
    if let Some(dir) = cli.rules_dir {
        config.rules_dir = Some(dir);
    }
    if let Some(dir) = cli.store_dir {
        config.store_dir = dir;
    }
    tracing::debug!(?config, "configuration resolved");

    let session = Session::open(config, clock_for(cli.as_of.as_deref())?)?;

    match &cli.command {
        Commands::Rules(args) => run_rules(args, &session),
        Commands::Detect(args) => run_detect(args, &session),
        Commands::Recommend(args) => run_recommend(args, &session),
        Commands::Validate(args) => run_validate(args, &session),
        Commands::Generate(args) => run_generate(args, &session),
        Commands::Submit(args) => run_transition(args, LifecycleEvent::Submit, &session),
        Commands::Reply(args) => run_transition(args, LifecycleEvent::RecordReply, &session),
        Commands::Close(args) => run_transition(args, LifecycleEvent::Close, &session),
        Commands::Status(args) => run_status(args, &session),
        Commands::Appeal(args) => run_appeal(args, &session),
        Commands::Deadlines(args) => run_deadlines(args, &session),
    }
}
