//! keg - Formula-driven installer for prebuilt release binaries
//!
//! This is the main CLI application that orchestrates all operations through
//! the ops crate.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use keg_config::Config;
use keg_events::{EventReceiver, EventSender};
use keg_net::{NetClient, NetConfig};
use keg_ops::{InstallRequest, OperationResult, OpsContextBuilder, OpsCtx};
use keg_state::StateManager;
use keg_types::ColorChoice;
use std::path::Path;
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    // Run the application and handle errors
    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(&cli.global.config).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global);

    init_tracing(cli.global.json, cli.global.debug, &config.logs_dir());
    info!("Starting keg v{}", env!("CARGO_PKG_VERSION"));

    // Create event channel
    let (event_sender, event_receiver) = keg_events::channel();

    let ops_ctx = build_ops_context(event_sender, config.clone()).await?;

    let color = cli.global.color.unwrap_or(config.general.color);
    let renderer = OutputRenderer::new(cli.global.json, color);

    let colors_enabled = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.debug);

    // JSON mode keeps stderr quiet; events still reach the debug log
    let result = execute_command_with_events(
        cli.command,
        ops_ctx,
        event_receiver,
        &mut event_handler,
        cli.global.json,
    )
    .await?;

    // Render final result
    renderer.render_result(&result)?;

    if let OperationResult::VerifyReport(entries) = &result {
        if let Some(e) = keg_ops::verification_error(entries) {
            return Err(e.into());
        }
    }

    if !cli.global.json && matches!(result, OperationResult::InstallReport(_)) {
        show_path_reminder_if_needed(&config.bin_dir());
    }

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    ops_ctx: OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
    quiet: bool,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, ops_ctx));

    // Handle events concurrently with command execution
    loop {
        select! {
            // Command completed
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    dispatch(event_handler, event, quiet);
                }
                return result;
            }

            // Event received
            event = event_receiver.recv() => {
                if let Some(event) = event {
                    dispatch(event_handler, event, quiet);
                }
            }
        }
    }
}

fn dispatch(handler: &mut EventHandler, message: keg_events::EventMessage, quiet: bool) {
    if quiet {
        crate::logging::log_event_with_tracing(&message);
    } else {
        handler.handle_event(message);
    }
}

/// Execute the specified command
async fn execute_command(command: Commands, ctx: OpsCtx) -> Result<OperationResult, CliError> {
    match command {
        Commands::Install {
            formula,
            version,
            from,
            force,
        } => {
            let request = InstallRequest {
                formula,
                version,
                from,
                force,
            };
            let report = keg_ops::install(&ctx, &request).await?;
            Ok(OperationResult::InstallReport(report))
        }

        Commands::Uninstall { formula } => {
            let report = keg_ops::uninstall(&ctx, &formula).await?;
            Ok(OperationResult::InstallReport(report))
        }

        Commands::List => {
            let installed = keg_ops::list_installed(&ctx).await?;
            Ok(OperationResult::InstalledList(installed))
        }

        Commands::Info { formula } => {
            let info = keg_ops::formula_info(&ctx, &formula).await?;
            Ok(OperationResult::FormulaInfo(info))
        }

        Commands::Fetch {
            formula,
            version,
            platform,
        } => {
            let report = keg_ops::fetch(&ctx, &formula, version.as_ref(), platform).await?;
            Ok(OperationResult::FetchReport(report))
        }

        Commands::Verify { formula } => {
            let entries = keg_ops::verify(&ctx, formula.as_deref()).await?;
            Ok(OperationResult::VerifyReport(entries))
        }

        Commands::Platform => {
            let report = keg_ops::platform(&ctx)?;
            Ok(OperationResult::PlatformReport(report))
        }

        Commands::Lint { file } => {
            let report = keg_ops::lint(&ctx, &file).await?;
            Ok(OperationResult::LintReport(report))
        }

        Commands::History { formula, limit } => {
            let entries = keg_ops::history(&ctx, formula.as_deref(), limit).await?;
            Ok(OperationResult::History(entries))
        }
    }
}

/// Build operations context with all required components
async fn build_ops_context(event_sender: EventSender, config: Config) -> Result<OpsCtx, CliError> {
    let state = StateManager::open(&config.db_path()).await?;
    let net = NetClient::new(NetConfig::from_config(&config))?;

    let ctx = OpsContextBuilder::new()
        .with_state(state)
        .with_net(net)
        .with_event_sender(event_sender)
        .with_config(config)
        .build()?;

    Ok(ctx)
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool, log_dir: &Path) {
    // Check if debug logging is enabled
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let default_filter = || tracing_subscriber::EnvFilter::new("info,keg=debug,keg_ops=debug");

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_file = log_dir.join(format!(
            "keg-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        let file = std::fs::create_dir_all(log_dir).and_then(|()| std::fs::File::create(&log_file));
        match file {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| default_filter()),
                    )
                    .init();
                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) if !json_mode => {
                eprintln!("Warning: Failed to create log file: {e}");
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| default_filter()),
                    )
                    .init();
                return;
            }
            Err(_) => {}
        }
    }

    if json_mode {
        // JSON mode: suppress all console output to avoid contaminating JSON
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
}

/// Show PATH reminder if needed
fn show_path_reminder_if_needed(bin_dir: &Path) {
    let path = std::env::var_os("PATH").unwrap_or_default();
    if !std::env::split_paths(&path).any(|p| p == bin_dir) {
        eprintln!();
        eprintln!("Add {} to your PATH to use installed binaries:", bin_dir.display());
        eprintln!("   export PATH=\"{}:$PATH\"", bin_dir.display());
        eprintln!();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if let Some(bin_dir) = &global.bin_dir {
        config.paths.bin_dir = Some(bin_dir.clone());
    }
    if let Some(formula_dir) = &global.formula_dir {
        config.paths.formula_dir = Some(formula_dir.clone());
    }
}
