mod browse;
mod config;

pub use browse::{BrowseOptions, ShellCommand, cmd_browse, parse_shell_command};
pub use config::{cmd_config_path, cmd_config_show};

use crate::error::Result;

/// Print a serializable value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
