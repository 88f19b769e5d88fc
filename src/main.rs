// ABOUTME: Main entry point for the devplexer CLI

use anyhow::{Context, Result};
use clap::Parser;
use devplexer::cli::{Cli, Command};
use devplexer::config::{resolve_config_path, Topology};
use devplexer::models::SessionId;
use devplexer::presenter::{presenter_for, NoopPresenter, TerminalPresenter};
use devplexer::session::{OrchestratorError, SessionOrchestrator, EXIT_FAILURE, EXIT_PARTIAL};
use devplexer::tmux::{attach_command, TmuxDriver};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let code = match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {e:#}");
            match e.downcast_ref::<OrchestratorError>() {
                Some(orchestrator_error) => orchestrator_error.exit_code(),
                None => EXIT_FAILURE,
            }
        }
    };

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

async fn run(cli: &Cli) -> Result<i32> {
    let invocation_dir =
        std::env::current_dir().context("Failed to determine the current directory")?;
    let command = cli.resolved_command();
    let config_path = resolve_config_path(&invocation_dir, command.config());
    let topology = Topology::load(&config_path, &invocation_dir)
        .map_err(OrchestratorError::from)?;
    info!(
        "Loaded topology {} with {} apps from {}",
        topology.namespace(),
        topology.apps().len(),
        config_path.display()
    );

    let driver = TmuxDriver::new();
    driver
        .check_installed()
        .map_err(OrchestratorError::DriverUnavailable)?;

    let presenter: Box<dyn TerminalPresenter> = if cli.no_focus {
        Box::new(NoopPresenter)
    } else {
        presenter_for(cli.presenter, driver.program())
    };
    let orchestrator = SessionOrchestrator::new(driver, presenter);

    match command {
        Command::Up(_) => match orchestrator.ensure_session(&topology).await {
            Ok(report) => {
                print!("{report}");
                if report.presenter_warning.is_some() || cli.no_focus {
                    println!(
                        "Attach with: {}",
                        attach_command(orchestrator.driver().program(), report.session_id())
                    );
                }
                Ok(0)
            }
            Err(OrchestratorError::PartialSession(report)) => {
                print!("{report}");
                eprintln!(
                    "error: {} of {} apps failed to start; re-run to retry them",
                    report.failed_apps().len(),
                    report.apps.len()
                );
                Ok(EXIT_PARTIAL)
            }
            Err(e) => Err(e.into()),
        },
        Command::Status(_) => {
            let status = orchestrator.status(&topology).await?;
            print!("{status}");
            Ok(0)
        }
        Command::Down(_) => {
            let session_id = SessionId::derive(topology.namespace())?;
            if orchestrator.teardown(&topology).await? {
                println!("Killed session {session_id}");
            } else {
                println!("Session {session_id} is not running");
            }
            Ok(0)
        }
    }
}

fn setup_logging(verbose: bool) {
    use std::fs::OpenOptions;
    use std::path::PathBuf;
    use tracing_subscriber::prelude::*;

    // Create log directory if it doesn't exist
    let log_dir = dirs::home_dir()
        .map(|home| home.join(".devplexer").join("logs"))
        .unwrap_or_else(|| PathBuf::from(".devplexer/logs"));
    let _ = std::fs::create_dir_all(&log_dir);

    let log_file = log_dir.join(format!(
        "devplexer-{}.log",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ));

    // Logging is best effort; a read-only home must not stop the run.
    let file_layer = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .ok()
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(file)
                .with_ansi(false) // No ANSI colors in log file
        });

    let stderr_layer = verbose.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let default_filter = if verbose {
        "devplexer=debug"
    } else {
        "devplexer=info"
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
