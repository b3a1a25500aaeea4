//! Run state file
//!
//! Persists the `RunLedger` of the last run to `.vpcflow/state.json` so a
//! later teardown knows exactly what was created.

use crate::error::{CloudError, Result};
use crate::ledger::{LEDGER_VERSION, RunLedger};
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_DIR: &str = ".vpcflow";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";

/// State manager for reading/writing the ledger file
pub struct StateManager {
    /// Directory the `.vpcflow` folder lives in
    root: PathBuf,
}

impl StateManager {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Path of the state file
    pub fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the last ledger, `None` if no run was recorded yet
    pub async fn load(&self) -> Result<Option<RunLedger>> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found");
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let ledger: RunLedger = serde_json::from_str(&content)?;

        if ledger.version > LEDGER_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                ledger.version, LEDGER_VERSION
            )));
        }

        tracing::debug!("Loaded ledger with {} steps", ledger.steps.len());
        Ok(Some(ledger))
    }

    /// Save the ledger, keeping the previous file as a backup
    pub async fn save(&self, ledger: &RunLedger) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let content = serde_json::to_string_pretty(ledger)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved ledger with {} steps", ledger.steps.len());
        Ok(())
    }
}
