mod cli;
mod config;
mod dashboard;
mod data;
mod logging;
mod store;
mod template;
mod workflow;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use store::InMemorySession;

#[derive(Parser)]
#[command(name = "clinicflow")]
#[command(about = "Clinician portal workflows - guarded steps over session state")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory (defaults to current)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Output mode: console, json, quiet
    #[arg(long, global = true, default_value = "console")]
    output: String,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress normal output
    #[arg(long, global = true)]
    quiet: bool,

    /// Also write logs to the default log file
    #[arg(long, global = true)]
    log: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workflow, feeding step fields from key=value args
    Run {
        /// Workflow name
        workflow: String,

        /// Field values as key=value pairs
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Validate a workflow without running it
    Validate {
        /// Workflow name
        workflow: String,
    },

    /// List available workflows
    Workflows,

    /// Show the dashboard, cycling the schedule through the given dates
    Dashboard {
        /// Dates to visit, in order (YYYY-MM-DD)
        #[arg(long, value_delimiter = ',')]
        dates: Vec<NaiveDate>,
    },

    /// Show a patient detail record
    Patient {
        /// Patient id (a1, b1, ...)
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match (cli.log_file, cli.log) {
        (Some(path), _) => Some(path),
        (None, true) => Some(logging::default_log_path()?),
        (None, false) => None,
    };
    logging::init_logging(cli.debug, cli.quiet, log_file)?;

    let project_dir = cli.dir.as_deref();
    let config = config::PortalConfig::load(project_dir)?;

    let mode = if cli.quiet {
        cli::OutputMode::Quiet
    } else {
        cli::OutputMode::from_str(&cli.output)
    };
    let handler = cli::create_handler(mode, cli.debug);
    let json = mode == cli::OutputMode::Json;

    // One session per invocation, gone when the process exits
    let mut session = InMemorySession::new();

    let exit_code = match cli.command {
        Commands::Run { workflow, args } => cli::run_workflow(
            &workflow,
            args,
            project_dir,
            &config,
            &mut session,
            &*handler,
        )
        .map_err(|e| anyhow::anyhow!(e))?,

        Commands::Validate { workflow } => {
            cli::validate_workflow(&workflow, project_dir, &config, &*handler)
                .map_err(|e| anyhow::anyhow!(e))?
        }

        Commands::Workflows => cli::list_workflows(project_dir, &config, &*handler)
            .map_err(|e| anyhow::anyhow!(e))?,

        Commands::Dashboard { dates } => {
            cli::show_dashboard(&dates, &config, &mut session, json)
                .map_err(|e| anyhow::anyhow!(e))?
        }

        Commands::Patient { id } => {
            cli::show_patient(&id, json).map_err(|e| anyhow::anyhow!(e))?
        }
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
