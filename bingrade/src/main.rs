//! Command-line tool for grading JavaScript submissions against testcases.
//!
//! Usage:
//!   grade run --suite <FILE> --submission <FILE> [OPTIONS]
//!   grade parse [LITERAL] [--args] [--to literal|json|debug]
//!   grade check --suite <FILE>
//!
//! `run` exits 0 when every testcase passes, 1 when any fails, and 2 on
//! usage or I/O errors. `check` exits 1 when any testcase is not strict.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use libgrade::{
    parse_arguments, parse_complex_value, render, validate_testcase, wire, Grader, Isolation,
    NodeSandbox, Submission, Value,
};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod suite;

#[derive(Parser, Debug)]
#[command(name = "grade", version, about = "Grade JavaScript submissions against literal testcases")]
struct Cli {
    /// Log debug output to stderr (overrides GRADE_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a submission against a testcase suite and print the summary as JSON
    Run(RunArgs),
    /// Parse a literal (or an argument list with --args) and print it
    Parse(ParseArgs),
    /// Check that every testcase in a suite uses the strict literal grammar
    Check {
        /// Suite file (.json, .yaml, .yml or .toml)
        #[arg(long)]
        suite: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Suite file (.json, .yaml, .yml or .toml)
    #[arg(long)]
    suite: PathBuf,

    /// JavaScript source file
    #[arg(long)]
    submission: PathBuf,

    /// Function to call (detected from the source when omitted)
    #[arg(long)]
    entry: Option<String>,

    /// Wall-clock limit per testcase in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Heap limit for the runtime in megabytes
    #[arg(long)]
    max_memory_mb: Option<u64>,

    /// Testcases run at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Runtime executable
    #[arg(long)]
    node: Option<String>,

    /// Confinement for submissions: "permission" or "container"
    #[arg(long)]
    isolation: Option<Isolation>,

    /// Image providing node when isolation is "container"
    #[arg(long)]
    container_image: Option<String>,

    /// TOML config file
    #[arg(long, env = "GRADE_CONFIG")]
    config: Option<PathBuf>,

    /// Blank the text of hidden testcases in the output
    #[arg(long)]
    redact: bool,

    /// Pretty-print the JSON summary
    #[arg(long)]
    pretty: bool,
}

#[derive(clap::Args, Debug)]
struct ParseArgs {
    /// Literal text; read from stdin when omitted or "-"
    literal: Option<String>,

    /// Treat the text as a `name = value, ...` argument list
    #[arg(long)]
    args: bool,

    /// Output form
    #[arg(long, value_enum, default_value_t = OutputForm::Literal)]
    to: OutputForm,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputForm {
    /// Literal grammar
    Literal,
    /// Wire JSON
    Json,
    /// Rust debug form
    Debug,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Command::Run(args) => run(args).await,
        Command::Parse(args) => parse(args),
        Command::Check { suite } => check(&suite),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("GRADE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

// =============================================================================
// Commands
// =============================================================================

async fn run(args: RunArgs) -> Result<ExitCode> {
    let config = config::resolve(
        args.config.as_deref(),
        config::Overrides {
            node: args.node,
            timeout_ms: args.timeout_ms,
            max_memory_mb: args.max_memory_mb,
            concurrency: args.concurrency,
            entry: args.entry,
            isolation: args.isolation,
            container_image: args.container_image,
        },
    )?;

    let testcases = suite::load(&args.suite)?;
    let source = fs::read_to_string(&args.submission)
        .with_context(|| format!("Failed to read {}", args.submission.display()))?;
    let mut submission = Submission::new(source);
    submission.entry_point = config.entry_point.clone();

    tracing::debug!(testcases = testcases.len(), ?config, "grading");

    let sandbox = NodeSandbox::from_config(&config);
    if !sandbox.is_available().await {
        anyhow::bail!(
            "{} cannot run submissions with {:?} isolation",
            match config.isolation {
                Isolation::Permission => &config.node_binary,
                Isolation::Container => &config.container_image,
            },
            config.isolation
        );
    }
    let grader = Grader::from_config(sandbox, &config);
    let summary = grader.grade(&submission, &testcases).await;
    let summary = if args.redact {
        summary.redacted()
    } else {
        summary
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{}", json);

    Ok(if summary.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn parse(args: ParseArgs) -> Result<ExitCode> {
    let text = match args.literal.as_deref() {
        Some(s) if s != "-" => s.to_string(),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    if args.args {
        let arguments = parse_arguments(&text);
        match args.to {
            OutputForm::Json => {
                let values: Vec<Value> = arguments.into_iter().map(|a| a.value).collect();
                println!("{}", wire::encode_args(&values));
            }
            form => {
                for arg in arguments {
                    let shown = show(&arg.value, form);
                    match arg.name {
                        Some(name) => println!("{} = {}", name, shown),
                        None => println!("{}", shown),
                    }
                }
            }
        }
    } else {
        println!("{}", show(&parse_complex_value(&text), args.to));
    }
    Ok(ExitCode::SUCCESS)
}

fn show(value: &Value, form: OutputForm) -> String {
    match form {
        OutputForm::Literal => render(value),
        OutputForm::Json => wire::to_wire(value).to_string(),
        OutputForm::Debug => format!("{:?}", value),
    }
}

fn check(path: &std::path::Path) -> Result<ExitCode> {
    let testcases = suite::load(path)?;
    let mut failures = 0;

    for (index, testcase) in testcases.iter().enumerate() {
        match validate_testcase(testcase) {
            Ok(()) => println!("{}: ok", index),
            Err(e) => {
                failures += 1;
                println!("{}: {}", index, e);
            }
        }
    }

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
