mod queue;
mod worker;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::element::Element;
use crate::tokens::DesignSettings;

pub use queue::{SaveKey, SavePayload, SaveQueue, SaveRequest};
pub use worker::PersistenceWorker;

const APP_DIR: &str = "pagecraft";
const PAGES_SUBDIR: &str = "pages";
const PROJECTS_SUBDIR: &str = "projects";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Backing store for page elements and project design settings.
pub trait PageStorage {
    fn load_elements(&self, page_id: &str) -> StorageResult<Option<Vec<Element>>>;
    fn save_elements(&self, page_id: &str, elements: &[Element]) -> StorageResult<()>;
    fn load_design(&self, project_id: &str) -> StorageResult<Option<DesignSettings>>;
    fn save_design(&self, project_id: &str, settings: &DesignSettings) -> StorageResult<()>;
}

/// One pretty-printed JSON file per page and per project under `root`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    root: PathBuf,
}

impl JsonFileStorage {
    pub fn with_paths(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn with_default_paths() -> StorageResult<Self> {
        let root = default_data_dir(
            std::env::var_os("XDG_DATA_HOME").map(PathBuf::from).as_deref(),
            std::env::var_os("HOME").map(PathBuf::from).as_deref(),
        )?;
        Ok(Self::with_paths(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn validate_key(key: &str) -> StorageResult<()> {
        let invalid = key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\'])
            || key.contains('\0');
        if invalid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    pub fn page_path(&self, page_id: &str) -> StorageResult<PathBuf> {
        Self::validate_key(page_id)?;
        Ok(self.root.join(PAGES_SUBDIR).join(format!("{page_id}.json")))
    }

    pub fn design_path(&self, project_id: &str) -> StorageResult<PathBuf> {
        Self::validate_key(project_id)?;
        Ok(self
            .root
            .join(PROJECTS_SUBDIR)
            .join(format!("{project_id}.json")))
    }
}

impl PageStorage for JsonFileStorage {
    fn load_elements(&self, page_id: &str) -> StorageResult<Option<Vec<Element>>> {
        read_json(&self.page_path(page_id)?)
    }

    fn save_elements(&self, page_id: &str, elements: &[Element]) -> StorageResult<()> {
        write_json(&self.page_path(page_id)?, &elements)
    }

    fn load_design(&self, project_id: &str) -> StorageResult<Option<DesignSettings>> {
        read_json(&self.design_path(project_id)?)
    }

    fn save_design(&self, project_id: &str, settings: &DesignSettings) -> StorageResult<()> {
        write_json(&self.design_path(project_id)?, settings)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StorageError::Io(err)),
    }
}

/// Writes through a sibling temp file so a crash never leaves a torn file.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(value)?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, contents)?;
    fs::rename(&staging, path)?;
    Ok(())
}

fn default_data_dir(xdg_data_home: Option<&Path>, home: Option<&Path>) -> StorageResult<PathBuf> {
    if let Some(xdg) = xdg_data_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.join(APP_DIR));
    }
    let home = home.ok_or(StorageError::MissingHomeDirectory)?;
    Ok(home.join(".local").join("share").join(APP_DIR))
}

#[cfg(test)]
pub(crate) fn with_temp_root<F: FnOnce(&Path)>(name: &str, f: F) {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();
    let root = std::env::temp_dir().join(format!(
        "pagecraft-{name}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&root).expect("create temp root");
    f(&root);
    let _ = fs::remove_dir_all(&root);
}
