mod cmd;
mod output;
mod settings_path;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ycm-bridge",
    about = "Host helpers for the ycm-bridge editor plugin: ports, interpreters, payload encoding, debounce",
    version,
    propagate_version = true
)]
struct Cli {
    /// Settings file (default: nearest ycm-bridge.yaml upward from the cwd)
    #[arg(long, global = true, env = "YCM_BRIDGE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a free TCP port on the loopback interface
    Port,

    /// Print the first of the given executables found on PATH
    Which {
        /// Candidate names, tried in order
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Print the Python 2.7 interpreter used to launch the completion server
    Python,

    /// Re-emit JSON from FILE (or stdin) as normalized UTF-8 JSON
    Normalize {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Run a deferred action and report whether and when it fired
    Debounce {
        /// Countdown in milliseconds
        #[arg(long, default_value = "500")]
        delay_ms: u64,

        /// Reset the countdown this many milliseconds after start (repeatable)
        #[arg(long = "reset-after-ms", value_name = "MS")]
        reset_after_ms: Vec<u64>,

        /// Cancel this many milliseconds after start
        #[arg(long, value_name = "MS")]
        cancel_after_ms: Option<u64>,
    },

    /// Show the effective settings
    Settings,
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise only warnings.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(tracing::Level::WARN.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let settings_path = settings_path::resolve_settings_path(cli.settings.as_deref());

    let result = match cli.command {
        Commands::Port => cmd::port::run(cli.json),
        Commands::Which { names } => cmd::which::run(&names, cli.json),
        Commands::Python => cmd::python::run(&settings_path, cli.json),
        Commands::Normalize { file } => cmd::normalize::run(file.as_deref()),
        Commands::Debounce {
            delay_ms,
            reset_after_ms,
            cancel_after_ms,
        } => cmd::debounce::run(delay_ms, &reset_after_ms, cancel_after_ms, cli.json),
        Commands::Settings => cmd::settings::run(&settings_path, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
