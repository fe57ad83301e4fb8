use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use declarative::State;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Format version written to new state files
pub const STATE_VERSION: u32 = 1;

// ============================================================================
// State File
// ============================================================================

/// On-disk record of every managed resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,

    /// Incremented on every save
    #[serde(default)]
    pub serial: u64,

    /// Last time the state was saved
    pub last_updated: DateTime<Utc>,

    #[serde(flatten)]
    pub state: State,

    #[serde(skip)]
    path: PathBuf,
}

impl StateFile {
    fn empty(path: &Path) -> Self {
        Self {
            version: STATE_VERSION,
            serial: 0,
            last_updated: Utc::now(),
            state: State::new(),
            path: path.to_path_buf(),
        }
    }

    /// Load state from disk, or return an empty state if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using empty state");
            return Ok(Self::empty(path));
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let mut file: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        if file.version > STATE_VERSION {
            bail!(
                "State file {} has version {}, newer than supported version {STATE_VERSION}",
                path.display(),
                file.version
            );
        }

        file.path = path.to_path_buf();
        log::debug!(
            "Loaded state from {} (serial {}, {} resources)",
            path.display(),
            file.serial,
            file.state.len()
        );
        Ok(file)
    }

    /// Save state to disk, bumping the serial
    ///
    /// Writes a sibling temp file, then renames it over the old one.
    pub fn save(&mut self) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        self.serial += 1;
        self.last_updated = Utc::now();

        let content =
            serde_json::to_string_pretty(&self).context("Failed to serialize state to JSON")?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace state file: {}", self.path.display()))?;

        log::debug!("Saved state to {} (serial {})", self.path.display(), self.serial);
        Ok(())
    }

    /// Replace the recorded resources and save
    pub fn persist(&mut self, state: &State) -> Result<()> {
        self.state = state.clone();
        self.save()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::Address;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let file = StateFile::load(&tmp.path().join("state.json")).unwrap();

        assert_eq!(file.serial, 0);
        assert!(file.state.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("state.json");

        let mut file = StateFile::load(&path).unwrap();
        file.state.insert(
            &Address::new("persondb_person", "alice"),
            json!({"id": "/person/alice", "person_id": "alice", "last_name": "Liddell"}),
        );
        file.save().unwrap();
        file.save().unwrap();

        let reloaded = StateFile::load(&path).unwrap();
        assert_eq!(reloaded.serial, 2);
        assert_eq!(reloaded.state, file.state);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_shape() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");

        let mut file = StateFile::load(&path).unwrap();
        file.state
            .insert(&Address::new("persondb_person", "a"), json!({"person_id": "a"}));
        file.save().unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], STATE_VERSION);
        assert_eq!(raw["serial"], 1);
        assert!(raw["last_updated"].is_string());
        assert_eq!(raw["resources"]["persondb_person.a"]["type"], "persondb_person");
    }

    #[test]
    fn test_newer_version_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        fs::write(
            &path,
            r#"{"version": 99, "serial": 1, "last_updated": "2026-01-01T00:00:00Z", "resources": {}}"#,
        )
        .unwrap();

        let err = StateFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("newer"));
    }
}
