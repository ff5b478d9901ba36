//! JSON-backed stores rooted at a data directory.
//!
//! ```text
//! <data-dir>/
//! ├── config.json
//! ├── supplier_patterns.json
//! ├── invoices-2024-01-05.json
//! ├── invoices-2024-01-06.json
//! └── uploads/
//! ```
//!
//! Every store does an unsynchronized read-modify-write of whole files, so
//! concurrent writers to the same file may lose updates.

mod config_store;
mod pattern_store;
mod record_store;

pub use config_store::ConfigStore;
pub use pattern_store::PatternStore;
pub use record_store::RecordStore;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{PurcError, Result, StoreError};
use crate::models::config::Config;
use crate::models::patterns::SupplierPatterns;

/// Config file name.
pub const CONFIG_FILE: &str = "config.json";

/// Supplier patterns file name.
pub const PATTERN_FILE: &str = "supplier_patterns.json";

/// Uploads subdirectory name.
pub const UPLOADS_DIR: &str = "uploads";

/// Root directory holding every store file.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn patterns_path(&self) -> PathBuf {
        self.root.join(PATTERN_FILE)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(UPLOADS_DIR)
    }

    pub fn config_store(&self) -> ConfigStore {
        ConfigStore::new(self.config_path())
    }

    pub fn pattern_store(&self) -> PatternStore {
        PatternStore::new(self.patterns_path())
    }

    pub fn record_store(&self) -> RecordStore {
        RecordStore::new(&self.root)
    }

    /// Create the directories and seed missing config/pattern files with
    /// built-in defaults. Existing files are left alone.
    pub fn ensure(&self) -> Result<()> {
        for dir in [self.root.clone(), self.uploads_dir()] {
            fs::create_dir_all(&dir)?;
        }

        let config_path = self.config_path();
        if !config_path.exists() {
            write_json(&config_path, &Config::default())?;
            info!("Seeded default config at {}", config_path.display());
        }

        let patterns_path = self.patterns_path();
        if !patterns_path.exists() {
            write_json(&patterns_path, &SupplierPatterns::new())?;
            debug!("Created empty pattern file at {}", patterns_path.display());
        }

        Ok(())
    }

    /// Copy a file into the uploads directory, keeping its file name.
    /// Returns the staged path. A file that already is the staged copy,
    /// under any path spelling, is not copied.
    pub fn stage_upload(&self, source: &Path) -> Result<PathBuf> {
        let name = source.file_name().ok_or_else(|| {
            PurcError::Config(format!("not a file path: {}", source.display()))
        })?;

        let uploads = self.uploads_dir();
        fs::create_dir_all(&uploads)?;

        let staged = uploads.join(name);
        if is_same_file(source, &staged) {
            debug!("{} is already staged", source.display());
        } else {
            fs::copy(source, &staged)?;
            debug!("Staged {} as {}", source.display(), staged.display());
        }

        Ok(staged)
    }
}

/// Both paths resolve to the same existing file.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Read and parse a JSON file. `Ok(None)` when the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> std::result::Result<Option<T>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StoreError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Overwrite a file with pretty-printed JSON, creating parent directories.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> std::result::Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let content = serde_json::to_string_pretty(value).map_err(|e| StoreError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    fs::write(path, content).map_err(io_err)
}
