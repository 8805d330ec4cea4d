//! Kilo entrypoint.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use core_input::read_input;
use core_state::{ControlFlow, Editor, HELP_MESSAGE};
use core_terminal::TerminalGuard;
use tracing::{error, info};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "kilo", version, about = "Kilo editor")]
struct Args {
    /// Optional path to open at startup. If omitted an empty unnamed buffer
    /// is used.
    path: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `kilo.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // The editor owns stdout for the whole session, so diagnostics go to a
    // file (append-mode, non-blocking) filtered by RUST_LOG.
    let log_path = std::path::Path::new("kilo.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(log_path);
    }
    let file_appender = tracing_appender::rolling::never(".", "kilo.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .init();

    info!(target: "runtime", "startup");

    // Log panics before the terminal guard's drop restores the screen; the
    // default hook still prints to stderr for the user.
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        error!(target: "runtime.panic", %panic_info, "panic");
        default_panic(panic_info);
    }));

    let args = Args::parse();
    if let Err(error) = run(args) {
        // The guard inside run() has already restored the terminal.
        error!(target: "runtime", ?error, "fatal");
        return Err(error);
    }
    info!(target: "runtime", "clean_exit");
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = core_config::load_from(args.config)?;

    let mut editor = match &args.path {
        Some(path) => Editor::open(path, config)?,
        None => Editor::new(config),
    };

    let _term = TerminalGuard::acquire().context("failed to acquire the terminal")?;
    let (cols, rows) = core_terminal::size().context("failed to probe the terminal size")?;
    editor.set_screen_size(cols, rows);
    editor.set_status(HELP_MESSAGE);

    let mut stdout = io::stdout();
    loop {
        editor.scroll();
        core_render::refresh(&editor, &mut stdout)?;
        match editor.process_input(read_input()?) {
            ControlFlow::Continue => {}
            ControlFlow::Quit => break,
        }
    }
    Ok(())
}
