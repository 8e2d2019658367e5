use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = if path.exists() {
        Config::load_from(&path)?
    } else {
        println!("{}", "No config file yet; showing defaults.".yellow());
        Config::default()
    };

    println!("{} {}", "Config:".bold(), path.display());
    let settings = config.transition_settings();
    println!("  defaults.theme          {}", config.theme_name());
    println!("  defaults.transition     {}", settings.kind.name());
    println!(
        "  defaults.transition_ms  {}",
        (settings.half_duration * 1000.0).round() as u64
    );
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display()
    );
    Ok(())
}
