//! Context management commands.

use std::path::Path;

use anyhow::Result;

use crate::config::{ClientConfig, Context};

/// Create or update a context and make it current if none is.
pub fn create(
    name: &str,
    server: &str,
    token: &str,
    data_dir: &str,
    client_config_path: &Path,
) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;
    config.upsert_context(Context {
        name: name.to_string(),
        server: server.to_string(),
        token: token.to_string(),
        data_dir: data_dir.to_string(),
    });
    if config.current_context.is_empty() {
        config.current_context = name.to_string();
    }
    config.save(client_config_path)?;

    println!("Context \"{name}\" created.");
    if !server.is_empty() {
        println!("  Server: {server}");
    }
    Ok(())
}

/// Switch current context.
pub fn use_context(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!(
            "Context \"{name}\" not found. Run `buziz context list` to see available contexts."
        );
    }

    config.current_context = name.to_string();
    config.save(client_config_path)?;
    println!("Switched to context \"{name}\".");
    Ok(())
}

/// List all contexts.
pub fn list(client_config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: buziz context create <name> --server <url>");
        return Ok(());
    }

    println!("{:2} {:20} {:40}", "", "NAME", "SERVER");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context {
            "*"
        } else {
            " "
        };
        let server = if ctx.server.is_empty() { "-" } else { &ctx.server };
        println!("{:2} {:20} {:40}", marker, ctx.name, server);
    }
    Ok(())
}
