use anyhow::Result;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::info;

mod app;

#[derive(Parser, Debug)]
#[command(author, version, about = "heifreg - libheif conformance regression harness", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct SessionArgs {
    /// Directory holding version.json and test_data.json
    #[arg(short, long, default_value = ".")]
    data_dir: Utf8PathBuf,

    /// Harness settings file (defaults to heifreg.toml in the data directory)
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Provision the corpus and run the full conformance matrix
    Run {
        #[command(flatten)]
        session: SessionArgs,

        /// Number of cases to run at once
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Write a JSON report to this file
        #[arg(short, long)]
        report: Option<Utf8PathBuf>,
    },
    /// Load the configuration and fetch the corpus if it is missing
    Provision {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// List expected-fail conformance files and their reasons
    Limitations,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    info!("Starting heifreg v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Run {
            session,
            jobs,
            report,
        } => {
            let passed = app::run(
                &session.data_dir,
                session.config.as_deref(),
                jobs,
                report.as_deref(),
            )?;
            Ok(if passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Provision { session } => {
            app::provision(&session.data_dir, session.config.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Limitations => {
            app::limitations();
            Ok(ExitCode::SUCCESS)
        }
    }
}
