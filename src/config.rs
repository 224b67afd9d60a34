use anyhow::{anyhow, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::posting::JournalAccounts;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding all journal, table and ledger files.
    pub data_dir: PathBuf,
    #[serde(default)]
    pub accounts: JournalAccounts,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            accounts: JournalAccounts::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| anyhow!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| anyhow!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let serialized = serde_yaml::to_string(self)?;
        std::fs::write(path, serialized)
            .with_context(|| anyhow!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for account in self.accounts.all() {
            // Account 0 is the general ledger file
            ensure!(account.0 != 0, "Account number 0 is reserved for the ledger");
            ensure!(
                seen.insert(account),
                "Account number {} is configured for more than one journal",
                account
            );
        }
        Ok(())
    }
}
