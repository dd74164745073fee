//! tbx - Toolbox container dispatcher CLI

mod commands;
mod console;
mod selector;

use clap::{Parser, Subcommand, ValueEnum};
use selector::resolve_container;
use std::path::PathBuf;
use tbx_config::{ConfigError, GlobalConfig, SandboxMode};
use tbx_core::{Dispatcher, Intent};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tbx")]
#[command(author, version, about = "Toolbox Container Dispatcher", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "TBX_CONFIG")]
    config: Option<PathBuf>,

    /// Override sandbox detection
    #[arg(long, global = true, value_enum)]
    sandbox: Option<SandboxArg>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SandboxArg {
    Auto,
    Always,
    Never,
}

impl From<SandboxArg> for SandboxMode {
    fn from(arg: SandboxArg) -> Self {
        match arg {
            SandboxArg::Auto => SandboxMode::Auto,
            SandboxArg::Always => SandboxMode::Always,
            SandboxArg::Never => SandboxMode::Never,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List containers
    List {
        /// Print the names as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Start a container
    Start {
        /// Container name (interactive selection if not specified)
        container: Option<String>,
    },

    /// Stop a container
    Stop {
        /// Container name (interactive selection if not specified)
        container: Option<String>,
    },

    /// Run a command in a container (the configured shell by default)
    Exec {
        /// Container name (interactive selection if not specified)
        container: Option<String>,
        /// Command to run, after `--`
        #[arg(last = true)]
        cmd: Vec<String>,
    },

    /// Attach a shell, starting the container first if needed
    Connect {
        /// Container name (interactive selection if not specified)
        container: Option<String>,
    },

    /// Open a file with the configured editor inside a container
    Open {
        /// [CONTAINER] FILE
        #[arg(required = true, num_args = 1..=2, value_names = ["CONTAINER", "FILE"])]
        args: Vec<String>,
    },

    /// Show or edit global configuration
    Config {
        /// Only print the config file location
        #[arg(long)]
        path: bool,
        /// Open config in editor
        #[arg(short, long, conflicts_with = "path")]
        edit: bool,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether the requested command succeeded
async fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => match GlobalConfig::config_path() {
            Ok(path) => Some(path),
            Err(ConfigError::NoConfigDir) => None,
            Err(e) => return Err(e.into()),
        },
    };

    // Config command doesn't need a dispatcher
    if let Some(Commands::Config { path, edit }) = &cli.command {
        let config_path = config_path.ok_or(ConfigError::NoConfigDir)?;
        commands::config(&config_path, *path, *edit)?;
        return Ok(true);
    }

    let mut config = match &config_path {
        Some(path) => GlobalConfig::load_from(path)?,
        None => {
            tracing::warn!("No config directory available, using defaults");
            GlobalConfig::default()
        }
    };
    if let Some(mode) = cli.sandbox {
        config.sandbox.mode = mode.into();
    }

    let mut dispatcher = Dispatcher::from_config(&config);
    tracing::debug!("Execution context: {}", dispatcher.context());

    let Some(command) = cli.command else {
        tbx_tui::run(dispatcher).await?;
        return Ok(true);
    };

    match command {
        Commands::List { json } => {
            commands::list(&dispatcher, json).await?;
            Ok(true)
        }
        Commands::Start { container } => {
            let name = resolve_container(&dispatcher, container, "Select container to start:").await?;
            commands::dispatch(&mut dispatcher, Intent::Start, &name).await
        }
        Commands::Stop { container } => {
            let name = resolve_container(&dispatcher, container, "Select container to stop:").await?;
            commands::dispatch(&mut dispatcher, Intent::Stop, &name).await
        }
        Commands::Exec { container, cmd } => {
            let name = resolve_container(&dispatcher, container, "Select container to run command in:").await?;
            commands::dispatch(&mut dispatcher, Intent::Exec { command: cmd }, &name).await
        }
        Commands::Connect { container } => {
            let name = resolve_container(&dispatcher, container, "Select container to connect to:").await?;
            commands::dispatch(&mut dispatcher, Intent::Connect, &name).await
        }
        Commands::Open { mut args } => {
            let file = args.pop().map(PathBuf::from);
            let container = args.pop();
            let name = resolve_container(&dispatcher, container, "Select container to open the file in:").await?;
            commands::dispatch(&mut dispatcher, Intent::OpenFile { path: file }, &name).await
        }
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}
