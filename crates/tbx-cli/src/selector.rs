//! Interactive container selection for commands run without a name

use anyhow::{bail, Result};
use dialoguer::{theme::ColorfulTheme, Select};
use std::io::IsTerminal;
use tbx_core::Dispatcher;

/// Use the given name, or prompt for one when attached to a terminal.
///
/// Without a terminal the name stays empty and the dispatcher rejects it.
pub async fn resolve_container(
    dispatcher: &Dispatcher,
    container: Option<String>,
    prompt: &str,
) -> Result<String> {
    if let Some(name) = container {
        return Ok(name);
    }
    if !std::io::stdin().is_terminal() || !std::io::stderr().is_terminal() {
        return Ok(String::new());
    }

    let names = dispatcher.list_containers().await?;
    if names.is_empty() {
        bail!("No containers found");
    }

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&names)
        .default(0)
        .interact_opt()?;

    match selection {
        Some(index) => Ok(names[index].clone()),
        None => bail!("Cancelled"),
    }
}
