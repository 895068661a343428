// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDFMaster — local document toolkit
//
// Entry point. Initialises logging, loads configuration, and drives one
// session per invocation: select a tool, stage input, process, deliver.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pdfmaster_core::catalog::{self, ToolId};
use pdfmaster_core::error::{PdfMasterError, Result};
use pdfmaster_core::human_errors::humanize_error;
use pdfmaster_core::{InputKind, ToolCategory, ToolkitConfig};
use pdfmaster_toolkit::{Dispatcher, FileSystemSink, InputFile, Session, SessionOutcome};

#[derive(Parser)]
#[command(name = "pdfmaster")]
#[command(about = "Merge, split, rotate, flatten and convert documents locally")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every tool, grouped by category
    Tools,

    /// Run one tool over the given input
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Tool identifier, e.g. merge-pdf or split-pdf
    tool: ToolId,

    /// Input files, processed in the order given
    files: Vec<PathBuf>,

    /// Text for text-to-pdf
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,

    /// Read the text for text-to-pdf from a file
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Tool option as key=value (e.g. pages=1-3,5 or angle=90); repeatable
    #[arg(long = "option", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Directory the result is written to (overrides the config file)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Path to a JSON configuration file
    #[arg(short, long, default_value = "pdfmaster.json")]
    config: PathBuf,
}

fn parse_option(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Tools => {
            list_tools();
            ExitCode::SUCCESS
        }
        Command::Run(args) => match run(args).await {
            Ok(outcome) => {
                report(&outcome);
                ExitCode::SUCCESS
            }
            Err(err) => {
                tracing::debug!(error = %err, "run failed");
                let human = humanize_error(&err);
                eprintln!("{}", human.message);
                eprintln!("  {}", human.suggestion);
                ExitCode::FAILURE
            }
        },
    }
}

fn list_tools() {
    for category in ToolCategory::LISTED {
        println!("{}", category.title());
        for tool in catalog::by_category(category) {
            println!("  {:<20} {}", tool.id.as_str(), tool.description);
        }
        println!();
    }
}

async fn run(args: RunArgs) -> Result<SessionOutcome> {
    let mut config = ToolkitConfig::load(&args.config)?;
    if let Some(out) = args.out {
        config.output_dir = out;
    }
    tracing::info!(tool = %args.tool, files = args.files.len(), "PDFMaster starting");

    let session = Session::new(
        Dispatcher::from_config(&config),
        FileSystemSink::from_config(&config),
    );
    session.select_tool(args.tool);

    if !args.files.is_empty() {
        let batch = args.files.iter().map(InputFile::from_path).collect();
        session.submit(batch)?;
    }

    let text = match (args.text, args.text_file) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(tokio::fs::read_to_string(&path).await?),
        (None, None) => None,
    };
    if let Some(text) = text {
        session.set_text(text)?;
    }

    for (name, value) in args.options {
        session.set_option(name, value)?;
    }

    if !session.can_process() {
        let what = if args.tool.input_kind() == InputKind::Text {
            "text"
        } else {
            "files"
        };
        return Err(PdfMasterError::EmptyInput(what));
    }

    session.process().await
}

fn report(outcome: &SessionOutcome) {
    let receipt = &outcome.receipt;
    println!("{}", receipt.path.display());
    println!("  {} bytes, {}", receipt.size, receipt.mime_type);
    println!("  sha256 {}", receipt.sha256);
    for notice in &outcome.notices {
        println!("  note: {notice}");
    }
}
