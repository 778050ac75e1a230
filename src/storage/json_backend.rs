use chrono::Utc;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::{ledger::Account, utils};

use super::Result;

const ACCOUNT_FILE: &str = "account.json";
const BACKUP_DIR: &str = "backups";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// JSON-file persistence for the account snapshot.
///
/// Saves are staged through a temporary sibling and renamed into place, so
/// an interrupted write never truncates existing state, and the previous
/// snapshot is rotated into `backups/` first.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    account_file: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let root = root.unwrap_or_else(utils::app_data_dir);
        ensure_dir(&root)?;
        let backups_dir = root.join(BACKUP_DIR);
        Ok(Self {
            account_file: root.join(ACCOUNT_FILE),
            backups_dir,
            root,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn account_path(&self) -> &Path {
        &self.account_file
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    /// Saves the account, rotating any previous snapshot into `backups/`.
    /// Cursor state (schedule `next_date`, interest `next_apply`) is
    /// persisted verbatim so processing stays idempotent across restarts.
    pub fn save(&self, account: &Account) -> Result<()> {
        if self.account_file.exists() {
            self.backup_existing_file()?;
        }
        let json = serde_json::to_string_pretty(account)?;
        let tmp = tmp_path(&self.account_file);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.account_file)?;
        Ok(())
    }

    /// Loads the persisted account if one exists, recomputing the derived
    /// balances from the ledger. Drift between persisted and recomputed
    /// values is logged and returned as warnings, never treated as fatal.
    pub fn load(&self) -> Result<Option<(Account, Vec<String>)>> {
        if !self.account_file.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.account_file)?;
        let mut account: Account = serde_json::from_str(&data)?;
        let warnings = account.rebuild_derived_state();
        for warning in &warnings {
            tracing::warn!(%warning, "persisted state drift");
        }
        Ok(Some((account, warnings)))
    }

    fn backup_existing_file(&self) -> Result<()> {
        ensure_dir(&self.backups_dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let backup_path = self.backups_dir.join(format!("account_{timestamp}.json"));
        fs::copy(&self.account_file, &backup_path)?;
        self.prune_backups()?;
        Ok(())
    }

    fn prune_backups(&self) -> Result<()> {
        let mut entries: Vec<PathBuf> = fs::read_dir(&self.backups_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .collect();
        // Timestamped names sort chronologically.
        entries.sort();
        while entries.len() > self.retention {
            let oldest = entries.remove(0);
            let _ = fs::remove_file(oldest);
        }
        Ok(())
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
