use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::AccountError;

const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// User preferences persisted alongside the account data.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Config {
    /// Save automatically after every mutating CLI action.
    #[serde(default)]
    pub auto_save: bool,
    /// Run schedule processing and interest accrual when the CLI starts.
    #[serde(default)]
    pub auto_process_on_startup: bool,
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(base: &Path) -> Result<Self, AccountError> {
        if !base.exists() {
            fs::create_dir_all(base)?;
        }
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> Result<Config, AccountError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), AccountError> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension(format!("json.{TMP_SUFFIX}"));
        let mut file = fs::File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::new(temp.path()).expect("manager");
        let config = manager.load().expect("load");
        assert!(!config.auto_save);
        assert!(!config.auto_process_on_startup);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::new(temp.path()).expect("manager");
        let config = Config {
            auto_save: true,
            auto_process_on_startup: true,
        };
        manager.save(&config).expect("save");
        let loaded = manager.load().expect("load");
        assert!(loaded.auto_save);
        assert!(loaded.auto_process_on_startup);
    }
}
