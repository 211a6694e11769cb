use crate::error::AppError;
use crate::model::Task;
use crate::storage::{STORAGE_KEY, Storage, decode_tasks, encode_tasks};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const STORE_ENV_VAR: &str = "TASKFLOW_STORE_PATH";

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    let file_name = format!("{STORAGE_KEY}.json");
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("taskflow").join(file_name))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskflow")
            .join(file_name))
    }
}

/// Task list mirrored into a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Vec<Task> {
        match load_tasks(&self.path) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(
                    file = %self.path.display(),
                    error = %err,
                    "stored task list is unreadable, starting empty"
                );
                Vec::new()
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<(), AppError> {
        save_tasks(&self.path, tasks)
    }
}

pub fn load_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    if !path.exists() {
        debug!(file = %path.display(), "no stored task list");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    decode_tasks(&content)
}

pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|err| AppError::io(err.to_string()))?;

    let content = encode_tasks(tasks)?;
    let mut temp = NamedTempFile::new_in(dir).map_err(|err| AppError::io(err.to_string()))?;
    temp.write_all(content.as_bytes())
        .map_err(|err| AppError::io(err.to_string()))?;
    temp.flush().map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(temp.path(), permissions)
            .map_err(|err| AppError::io(err.to_string()))?;
    }

    temp.persist(path)
        .map_err(|err| AppError::io(format!("failed to persist {}: {}", path.display(), err)))?;
    debug!(file = %path.display(), count = tasks.len(), "saved task list");

    Ok(())
}
