//! Durable port selection.
//!
//! A small TOML document with the selected input and output names. Loading
//! never fails past this boundary (missing or broken files degrade to the
//! empty selection); saving goes through a temp-file-then-rename sequence
//! so the file on disk is always either the old or the new complete
//! version, never a partial write.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "midithru.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    /// Selected input port names, in display order.
    pub inputs: Vec<String>,
    /// Selected output port names, in display order.
    pub outputs: Vec<String>,
}

impl PortConfig {
    /// Missing, unreadable, or unparseable files all degrade to defaults.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no config file, starting with empty selection");
                return Self::default();
            }
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config file unparseable, starting with empty selection");
                Self::default()
            }
        }
    }

    /// Atomic replace: serialize, write `<path>.tmp`, rename over the
    /// target. Failures are returned so the caller can surface them.
    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized =
            toml::to_string_pretty(self).map_err(|e| Error::ConfigParse(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serialized)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Replace the input selection wholesale, dropping duplicate names
    /// while keeping first-occurrence order.
    pub fn set_inputs(&mut self, names: Vec<String>) {
        self.inputs = dedup_preserving_order(names);
    }

    pub fn set_outputs(&mut self, names: Vec<String>) {
        self.outputs = dedup_preserving_order(names);
    }
}

fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// `midithru.toml` next to the executable, falling back to the working
/// directory when the executable path is unavailable.
pub fn default_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = PortConfig::load(&dir.path().join("nope.toml"));
        assert_eq!(config, PortConfig::default());
    }

    #[test]
    fn test_load_garbage_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "not = [valid").unwrap();
        assert_eq!(PortConfig::load(&path), PortConfig::default());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = PortConfig::default();
        config.set_inputs(vec![
            "Midi Through Port-0".to_string(),
            "Arturia KeyStep 32".to_string(),
            "Søren's Synth  (2)".to_string(),
        ]);
        config.set_outputs(vec!["FLUID Synth (qsynth)".to_string()]);

        config.save(&path).unwrap();
        assert_eq!(PortConfig::load(&path), config);
    }

    #[test]
    fn test_round_trip_empty_lists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = PortConfig::default();
        config.save(&path).unwrap();
        assert_eq!(PortConfig::load(&path), config);
    }

    #[test]
    fn test_set_inputs_drops_duplicates_keeps_order() {
        let mut config = PortConfig::default();
        config.set_inputs(vec![
            "A".to_string(),
            "B".to_string(),
            "A".to_string(),
            "C".to_string(),
            "B".to_string(),
        ]);
        assert_eq!(config.inputs, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_interrupted_save_leaves_original_intact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut original = PortConfig::default();
        original.set_inputs(vec!["Keys".to_string()]);
        original.save(&path).unwrap();
        let original_bytes = fs::read(&path).unwrap();

        // Simulate a crash between temp-write and rename: the temp file
        // exists but the rename never happened.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, "inputs = [\"half-writt").unwrap();

        assert_eq!(fs::read(&path).unwrap(), original_bytes);
        assert_eq!(PortConfig::load(&path), original);
    }

    #[test]
    fn test_save_reports_io_failure() {
        let dir = tempdir().unwrap();
        // Target inside a directory that does not exist.
        let path = dir.path().join("missing-subdir").join(CONFIG_FILE_NAME);
        let config = PortConfig::default();
        assert!(config.save(&path).is_err());
    }
}
