//! Task runner for Terraform modules tested with Go.
//!
//! Running `dry` with no subcommand runs the unit and then the integration
//! suite, cleaning, formatting and selecting the sandbox subscription once.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use dry::core::types::TaskName;
use dry::exit_codes;
use dry::io::config::{CONFIG_FILE, load_config};
use dry::io::env::TaskEnv;
use dry::io::process::SystemRunner;
use dry::logging;
use dry::tasks::Tasks;

#[derive(Parser)]
#[command(
    name = "dry",
    version,
    about = "Clean, format, authenticate and test a Terraform module"
)]
struct Cli {
    /// Pass `-v` to `go test` and enable debug tracing.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workspace root. Defaults to the current directory.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file. Defaults to `<root>/dry.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Run unit then integration tests (default).
    Full,
    /// Remove Terraform state, plans, caches and coverage files.
    Clean,
    /// Run `terraform fmt` and `go fmt` on the test suite.
    Format,
    /// Run tests matching `MAGE_TARGET_UT` (default `^TestUT_`).
    Unit,
    /// Run tests matching `MAGE_TARGET_IT` (default `^TestIT_`) with a 60m timeout.
    Integration,
    /// Run the tests with a coverage profile and open the HTML report.
    Cover,
    /// Make the sandbox subscription the cloud CLI's active subscription.
    SelectSandbox,
    /// Ensure the cloud CLI has an active session, logging in if needed.
    LoginSandbox,
}

impl From<Command> for TaskName {
    fn from(command: Command) -> Self {
        match command {
            Command::Full => TaskName::Full,
            Command::Clean => TaskName::Clean,
            Command::Format => TaskName::Format,
            Command::Unit => TaskName::Unit,
            Command::Integration => TaskName::Integration,
            Command::Cover => TaskName::Cover,
            Command::SelectSandbox => TaskName::SelectSandbox,
            Command::LoginSandbox => TaskName::LoginSandbox,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FAILED);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("resolve current directory")?,
    };
    let config_path = cli.config.unwrap_or_else(|| root.join(CONFIG_FILE));
    let config = load_config(&config_path)?;
    let task = cli.command.map_or(TaskName::Full, TaskName::from);

    info!(%task, root = %root.display(), "starting");
    let runner = SystemRunner::new(&root);
    let mut tasks =
        Tasks::new(&root, config, TaskEnv::from_process(), runner).verbose(cli.verbose);
    tasks.run(task)?;
    Ok(())
}
