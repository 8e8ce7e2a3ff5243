//! opskit CLI entry point.

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use opskit::cli::{usage_for, Cli, CommandContext, CommandDispatcher};
use opskit::config::{load_db_config, load_settings, ConfigPaths, PASSWORD_ENV};
use opskit::shell::is_ci;
use opskit::ui::{create_ui, OutputMode, UserInterface};
use opskit::{OpsError, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for diagnostics on stderr.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("opskit=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("opskit=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Load settings and the saved database connection once.
fn build_context(cli: &Cli) -> Result<CommandContext> {
    let paths = ConfigPaths::discover().with_settings(cli.config.as_deref());
    let mut settings = load_settings(&paths.settings, cli.config.is_some())?;
    if let Some(log_file) = &cli.log_file {
        settings.log_file = Some(log_file.clone());
    }

    // A broken db.env must not block unrelated commands or `db configure`.
    let db = match load_db_config(&paths) {
        Ok(db) => db,
        Err(e) => {
            tracing::warn!("Ignoring saved database settings: {}", e);
            None
        }
    };
    let password = std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty());

    Ok(CommandContext::new(settings, paths)
        .with_db(db, password)
        .with_assume_yes(cli.yes)
        .with_interrupts(true))
}

fn report_error(ui: &mut dyn UserInterface, err: &OpsError) {
    if let OpsError::CommandFailed {
        command, stderr, ..
    } = err
    {
        if !stderr.trim().is_empty() {
            ui.show_error_block(command, stderr, None);
        }
    }
    ui.error(&format!("Error: {}", err));
    if let OpsError::ToolNotFound { tool } = err {
        ui.show_hint(&format!("Install '{}' or add it to PATH.", tool));
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not errors.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            if matches!(
                e.kind(),
                ErrorKind::InvalidSubcommand | ErrorKind::UnknownArgument
            ) {
                let args: Vec<String> = std::env::args().collect();
                eprintln!("\n{}", usage_for(&args));
            }
            return ExitCode::from(code);
        }
    };

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    init_tracing(cli.debug);
    tracing::debug!("opskit starting with args: {:?}", cli);

    let mut ui = create_ui(!is_ci(), OutputMode::from_flags(cli.verbose, cli.quiet));

    let context = match build_context(&cli) {
        Ok(context) => context,
        Err(e) => {
            report_error(ui.as_mut(), &e);
            return exit_code(e.exit_code());
        }
    };

    let dispatcher = CommandDispatcher::new(context);
    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => exit_code(result.exit_code),
        Err(e) => {
            report_error(ui.as_mut(), &e);
            exit_code(e.exit_code())
        }
    }
}
