//! Tool storage and persistence.
//!
//! The `ToolStore` maps tool names to source text, one `<name>.rhai` file per
//! tool in a single directory. It is the only durable state of the service.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StorageError;
use crate::tool::{TOOL_EXTENSION, is_valid_tool_name};

/// Filesystem-backed tool source store.
#[derive(Debug, Clone)]
pub struct ToolStore {
    /// Directory holding one file per tool.
    root: PathBuf,
}

impl ToolStore {
    /// Create a store at `root`, creating the directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::CreateDirectory(format!("{}: {e}", root.display())))?;

        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the source file for `name`.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_tool_name(name) {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{name}.{TOOL_EXTENSION}")))
    }

    /// Write `source` for `name`, replacing any previous content.
    pub async fn save(&self, name: &str, source: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::CreateDirectory(format!("{}: {e}", self.root.display())))?;

        // Write atomically; the temp name is unique so concurrent writers never
        // interleave and the last rename wins.
        let temp_path = self.root.join(format!(".{name}.{}.tmp", Uuid::new_v4()));
        fs::write(&temp_path, source)
            .await
            .map_err(|e| StorageError::WriteFile(format!("{}: {e}", temp_path.display())))?;

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::WriteFile(format!("{}: {e}", path.display())));
        }

        info!("Saved tool source: {}", path.display());
        Ok(())
    }

    /// Whether source is persisted for `name`.
    pub async fn exists(&self, name: &str) -> bool {
        match self.path_for(name) {
            Ok(path) => fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Read the source persisted for `name`.
    pub async fn read(&self, name: &str) -> Result<String, StorageError> {
        let path = self.path_for(name)?;

        match fs::read_to_string(&path).await {
            Ok(source) => Ok(source),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::ReadFile(format!("{}: {e}", path.display()))),
        }
    }

    /// Names of all persisted tools, sorted.
    pub async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::ListDirectory(format!(
                    "{}: {e}",
                    self.root.display()
                )));
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::ListDirectory(format!("{}: {e}", self.root.display())))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != TOOL_EXTENSION) {
                continue;
            }

            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) if is_valid_tool_name(stem) => names.push(stem.to_string()),
                _ => debug!("Ignoring unrecognized file: {}", path.display()),
            }
        }

        names.sort();
        Ok(names)
    }
}
