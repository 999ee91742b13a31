use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::domain::HouseholdState;
use crate::utils::paths;

use super::{Result, StorageBackend};

const STATE_FILE: &str = "household.json";
const BLOB_DIR: &str = "blobs";
const BLOB_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem storage: `household.json` plus one file per blob under `blobs/`.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    state_file: PathBuf,
    blobs_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(|| paths::data_dir_in(&paths::app_data_dir()));
        fs::create_dir_all(&root)?;
        let blobs_dir = root.join(BLOB_DIR);
        fs::create_dir_all(&blobs_dir)?;
        Ok(Self {
            state_file: root.join(STATE_FILE),
            root,
            blobs_dir,
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> &Path {
        &self.state_file
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.blobs_dir
            .join(format!("{}.{}", canonical_key(key), BLOB_EXTENSION))
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self) -> Result<Option<HouseholdState>> {
        let Some(data) = read_optional(&self.state_file)? else {
            return Ok(None);
        };
        let state: HouseholdState = serde_json::from_str(&data)?;
        tracing::debug!(bills = state.bills.len(), path = %self.state_file.display(), "loaded household");
        Ok(Some(state))
    }

    fn save(&self, state: &HouseholdState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        write_atomic(&self.state_file, &json)
    }

    fn load_blob(&self, key: &str) -> Result<Option<String>> {
        read_optional(&self.blob_path(key))
    }

    fn save_blob(&self, key: &str, value: &str) -> Result<()> {
        write_atomic(&self.blob_path(key), value)
    }

    fn remove_blob(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.blob_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn blob_keys(&self) -> Result<Vec<String>> {
        if !self.blobs_dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.blobs_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BLOB_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.state_file) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        if self.blobs_dir.exists() {
            fs::remove_dir_all(&self.blobs_dir)?;
        }
        fs::create_dir_all(&self.blobs_dir)?;
        tracing::info!(path = %self.root.display(), "cleared household storage");
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(data) => Ok(Some(data)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn canonical_key(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "blob".into()
    } else {
        sanitized
    }
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension(format!("{BLOB_EXTENSION}.{TMP_SUFFIX}"));
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
