//! barre: a flexbox status bar driven by line-oriented markup on stdin.

mod coordinator;
mod msg;
mod output;
mod reader;
mod svg;
mod window;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Flexbox status bar driven by markup on stdin")]
struct Cli {
    /// Bar width in pixels. Required with --output; defaults to the
    /// window manager's choice otherwise.
    #[arg(short, long)]
    width: Option<u32>,

    /// Bar height in pixels.
    #[arg(long, default_value_t = 20)]
    height: u32,

    /// Render once to this file (.png or .svg) instead of opening a
    /// window.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Request a dock-type window from the window manager.
    #[arg(long)]
    dock: bool,

    /// Window title.
    #[arg(long, default_value = "barre")]
    title: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("barre=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.output {
        let Some(width) = cli.width else {
            error!("--width is required with --output");
            return ExitCode::FAILURE;
        };
        return match output::run(path, width, cli.height) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!("{err:#}");
                ExitCode::FAILURE
            }
        };
    }

    let opts = window::LiveOptions {
        width: cli.width,
        height: cli.height,
        title: cli.title,
        dock: cli.dock,
    };
    match window::run(opts) {
        // The quit key is a deliberate abort, reported as failure.
        Ok(quit_key) => {
            if quit_key {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
