use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use departure_board::app::{AppContext, load_config};
use departure_board::cli::Args;
use departure_board::config::sample_path_for;
use departure_board::render::TextRenderer;

/// Log to `log_file` if given, otherwise to stderr. `RUST_LOG` overrides the
/// default `info` level.
fn init_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.log_file.as_deref()) {
        eprintln!("Error: cannot open log file: {e}");
        return ExitCode::FAILURE;
    }

    let mut config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!(
                "A sample configuration is at {}",
                sample_path_for(&args.config).display()
            );
            return ExitCode::FAILURE;
        }
    };

    if args.test_mode {
        config.test_mode = true;
    }

    let stdout = std::io::stdout();
    let color = !args.no_color && stdout.is_terminal();
    let renderer = TextRenderer::new(stdout, color).with_fullscreen(config.display.fullscreen);

    let mut app = match AppContext::from_config(config, renderer) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "startup failed");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = app.config();
    info!(
        stations = config.stations.len(),
        test_mode = config.test_mode,
        width = config.display.window_width,
        height = config.display.window_height,
        fullscreen = config.display.fullscreen,
        rotate_display = config.display.rotate_display,
        "starting departure board"
    );

    app.run().await;
    info!("departure board stopped");
    ExitCode::SUCCESS
}
