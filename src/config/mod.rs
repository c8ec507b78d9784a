// src/config/mod.rs

//! JSON configuration persistence for the `fswatch` binary.
//!
//! The document mirrors the command line: watch paths, command tokens, and
//! the two presentation flags. Unknown keys are ignored and missing keys take
//! their defaults, so a config written by a newer version still loads.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// The settings understood by the `fswatch` binary.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Print a diagnostic line for each filesystem event.
    pub is_verbose: bool,

    /// Clear the terminal before each command run.
    pub is_clear_console: bool,

    /// Files and directories to watch.
    pub watch_files: Vec<String>,

    /// Command tokens to run on each change.
    pub command: Vec<String>,
}

impl Config {
    /// Load settings from the JSON document at `path`.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from opening the file, or from parsing it
    /// as a JSON settings document.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Write the settings as pretty-printed JSON to `path`.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from creating or writing the file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::test;

    use super::Config;

    #[test]
    fn load_reads_camel_case_keys() -> test::Result {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("fswatch.json");
        fs::write(
            &path,
            r#"{
                "isVerbose": true,
                "isClearConsole": false,
                "watchFiles": ["src", "Cargo.toml"],
                "command": ["cargo", "test"]
            }"#,
        )?;

        let config = Config::load(&path)?;
        assert!(config.is_verbose);
        assert!(!config.is_clear_console);
        assert_eq!(config.watch_files, vec!["src", "Cargo.toml"]);
        assert_eq!(config.command, vec!["cargo", "test"]);

        Ok(())
    }

    #[test]
    fn load_ignores_unknown_keys_and_defaults_missing_ones() -> test::Result {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("fswatch.json");
        fs::write(&path, r#"{"watchFiles": ["src"], "retries": 3}"#)?;

        let config = Config::load(&path)?;
        assert_eq!(config.watch_files, vec!["src"]);
        assert!(!config.is_verbose);
        assert!(!config.is_clear_console);
        assert!(config.command.is_empty());

        Ok(())
    }

    #[test]
    fn save_round_trips() -> test::Result {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("fswatch.json");

        let config = Config {
            is_verbose: true,
            is_clear_console: true,
            watch_files: vec!["demo".to_string()],
            command: vec!["make".to_string(), "{}".to_string()],
        };
        config.save(&path)?;

        assert_eq!(Config::load(&path)?, config);

        Ok(())
    }
}
