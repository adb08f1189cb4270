mod cmd;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::RunOptions;
use crate::output::OutputFormat;

/// dockfix - Build and run Docker test fixtures
#[derive(Parser)]
#[command(name = "dockfix")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Fixture manifest
  #[arg(short, long, global = true, default_value = "fixtures.json")]
  manifest: PathBuf,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List the fixtures of the manifest
  List {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Build a fixture image and its base images
  Build {
    /// Fixture id
    id: String,

    /// Build without the engine's layer cache
    #[arg(long)]
    no_cache: bool,

    /// Append build output to this file instead of printing it on failure
    #[arg(long)]
    log: Option<PathBuf>,
  },

  /// Build a fixture and run a container from it until interrupted
  Run {
    /// Fixture id
    id: String,

    /// Build without the engine's layer cache
    #[arg(long)]
    no_cache: bool,

    /// Write container output to this file instead of stdout
    #[arg(long)]
    log: Option<PathBuf>,

    /// Publish each port on OFFSET + port
    #[arg(long, value_name = "OFFSET")]
    port_offset: Option<u16>,

    /// Host address to publish ports on
    #[arg(long)]
    ip: Option<String>,

    /// Stop after this long instead of waiting for Ctrl-C (e.g., "30s", "5m")
    #[arg(long = "for", value_name = "DURATION", value_parser = humantime::parse_duration)]
    duration: Option<Duration>,

    /// Arguments passed to the container
    #[arg(last = true)]
    args: Vec<String>,
  },

  /// Check whether the docker engine is available
  Available {
    /// Also require the engine to run on this machine
    #[arg(long)]
    local: bool,
  },

  /// Show whether a container is running
  Status {
    /// Container id
    cid: String,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::List { output } => cmd::cmd_list(&cli.manifest, output),
    Commands::Build { id, no_cache, log } => cmd::cmd_build(&cli.manifest, &id, no_cache, log.as_deref()),
    Commands::Run {
      id,
      no_cache,
      log,
      port_offset,
      ip,
      duration,
      args,
    } => cmd::cmd_run(
      &cli.manifest,
      RunOptions {
        id,
        no_cache,
        log,
        port_offset,
        ip,
        duration,
        args,
      },
    ),
    Commands::Available { local } => cmd::cmd_available(local),
    Commands::Status { cid, output } => cmd::cmd_status(&cid, output),
  }
}
