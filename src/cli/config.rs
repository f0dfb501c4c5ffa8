//! Config subcommand implementation.
//!
//! Handles `portsweep config`, which prints the effective settings and can
//! write the defaults to the settings file.

use crate::config::{AppSettings, Paths};
use crate::error::{CliError, CliResult};
use crate::output;
use clap::Parser;
use std::path::Path;

/// Show or initialize settings.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Write default settings to the settings file
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing settings file with --init
    #[arg(long, requires = "init")]
    pub force: bool,
}

impl ConfigCommand {
    /// Execute the config command.
    pub fn execute(&self, paths: &Paths, custom: Option<&Path>) -> CliResult<()> {
        let file = custom
            .map(Path::to_path_buf)
            .unwrap_or_else(|| paths.settings_file());

        if self.init {
            if file.exists() && !self.force {
                return Err(CliError::Other(format!(
                    "{} already exists (use --force to overwrite)",
                    file.display()
                )));
            }
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            AppSettings::default().save_to(&file)?;
            output::print_success(&format!("Wrote default settings to {}", file.display()));
            return Ok(());
        }

        let settings = if file.exists() {
            AppSettings::load_from(&file)?
        } else {
            AppSettings::default()
        };

        output::print_info(&format!("Settings file: {}", file.display()));
        output::print_info(&format!(
            "Reports directory: {}",
            settings.reports_dir(paths).display()
        ));
        let json = serde_json::to_string_pretty(&settings)
            .map_err(|e| CliError::Other(e.to_string()))?;
        println!("{}", json);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_root(dir.path());
        let init = ConfigCommand {
            init: true,
            force: false,
        };

        init.execute(&paths, None).unwrap();
        let loaded = AppSettings::load(&paths).unwrap();
        assert_eq!(loaded, AppSettings::default());

        assert!(matches!(init.execute(&paths, None), Err(CliError::Other(_))));

        let forced = ConfigCommand {
            init: true,
            force: true,
        };
        assert!(forced.execute(&paths, None).is_ok());
    }

    #[test]
    fn test_show_with_custom_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_root(dir.path());
        let custom = dir.path().join("custom.json");
        let show = ConfigCommand {
            init: false,
            force: false,
        };

        // Missing file falls back to defaults.
        assert!(show.execute(&paths, Some(&custom)).is_ok());

        std::fs::write(&custom, r#"{"default_tasks": 0}"#).unwrap();
        assert!(matches!(
            show.execute(&paths, Some(&custom)),
            Err(CliError::Config(_))
        ));
    }
}
