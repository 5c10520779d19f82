//! File-backed verdict store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use coordination::{CollaboratorError, VerdictStore};
use tracing::info;

/// Writes each verdict to `<dir>/<name>`, creating `dir` on first use.
#[derive(Debug, Clone)]
pub struct FileVerdictStore {
    dir: PathBuf,
}

impl FileVerdictStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a verdict named `name` is written to.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, CollaboratorError> {
        let is_plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !is_plain {
            return Err(CollaboratorError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("verdict name '{name}' is not a plain file name"),
            )));
        }
        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl VerdictStore for FileVerdictStore {
    async fn save(&self, name: &str, content: &str) -> Result<String, CollaboratorError> {
        let path = self.path_for(name)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, content).await?;
        info!(path = %path.display(), bytes = content.len(), "verdict written");
        Ok(path.display().to_string())
    }
}
