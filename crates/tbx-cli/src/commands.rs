//! Subcommand implementations

use crate::console::ConsoleSurface;
use anyhow::{Context, Result};
use std::path::Path;
use tbx_config::GlobalConfig;
use tbx_core::{Dispatcher, Intent};

/// Dispatch an intent and stream the process until it finishes.
///
/// Returns whether the process exited successfully.
pub async fn dispatch(dispatcher: &mut Dispatcher, intent: Intent, name: &str) -> Result<bool> {
    let mut surface = ConsoleSurface;
    dispatcher.dispatch(intent, name, &mut surface)?;

    let outcome = tokio::select! {
        outcome = dispatcher.wait(&mut surface) => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping {}", name);
            dispatcher.shutdown();
            dispatcher.wait(&mut surface).await
        }
    };

    Ok(outcome.is_some_and(|o| o.success()))
}

/// List containers
pub async fn list(dispatcher: &Dispatcher, json: bool) -> Result<()> {
    let names = dispatcher.list_containers().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    if names.is_empty() {
        println!("No containers found.");
        return Ok(());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

/// Show or edit configuration
pub fn config(config_path: &Path, show_path: bool, edit: bool) -> Result<()> {
    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if edit {
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

        // Create config file with defaults if it doesn't exist
        if !config_path.exists() {
            GlobalConfig::default().save_to(config_path)?;
            println!("Created default config at {:?}", config_path);
        }

        std::process::Command::new(&editor)
            .arg(config_path)
            .status()
            .context(format!("Failed to open editor: {}", editor))?;
        return Ok(());
    }

    if config_path.exists() {
        // Parse first so a broken file is reported instead of echoed
        GlobalConfig::load_from(config_path)?;
        let content = std::fs::read_to_string(config_path)?;
        println!("# Config file: {:?}\n", config_path);
        println!("{}", content);
    } else {
        println!("# Config file: {:?} (not created yet)\n", config_path);
        println!("# Default configuration:");
        let content = toml::to_string_pretty(&GlobalConfig::default())?;
        println!("{}", content);
        println!("\n# Run 'tbx config --edit' to create and edit the config file.");
    }

    Ok(())
}
