//! Validate command implementation

use std::path::Path;

use colored::Colorize;

use guild_config::GuildConfig;

use crate::error::Result;

/// Load a configuration directory and report what it contains
pub fn run_validate(config_dir: &Path) -> Result<()> {
    println!(
        "{} Validating {}...",
        "=>".blue().bold(),
        config_dir.display()
    );

    let config = GuildConfig::load(config_dir)?;
    let desired = &config.desired;
    let channels: usize = desired.categories.iter().map(|c| c.channels.len()).sum();

    if let Some(profile) = &config.profile {
        println!("   server: {}", profile.name.cyan());
    }
    println!(
        "{} Configuration is valid: {} role(s), {} categorie(s), {} channel(s), {} integration(s)",
        "OK".green().bold(),
        desired.roles.len(),
        desired.categories.len(),
        channels,
        desired.integrations.len()
    );
    Ok(())
}
