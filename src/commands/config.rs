//! Configuration commands.
//!
//! - `config show`: Display the effective configuration
//! - `config path`: Print where the config file is read from

use owo_colors::OwoColorize;

use super::print_json;
use crate::config::Config;
use crate::error::Result;

/// Show the effective configuration (file values merged over defaults)
pub fn cmd_config_show(json: bool) -> Result<()> {
    let config = Config::load()?;

    if json {
        return print_json(&config);
    }

    let path = Config::config_path()?;
    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    };

    println!("{} {}", "Config file:".cyan().bold(), source);
    println!();
    print!("{}", serde_yaml_ng::to_string(&config)?);
    Ok(())
}

/// Print the config file location
pub fn cmd_config_path() -> Result<()> {
    println!("{}", Config::config_path()?.display());
    Ok(())
}
