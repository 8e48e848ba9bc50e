use crate::Result;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// On-disk staging area for uploaded attachments.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the staging directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Writes `data` to a fresh, uniquely named file and returns the owning guard.
    pub async fn stage(&self, field_name: &str, mime_type: &str, data: &[u8]) -> Result<Upload> {
        self.ensure_dir().await?;

        let path = self.dir.join(Uuid::new_v4().simple().to_string());
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        // From here on the guard owns the file, so a failed write still removes it.
        let upload = Upload {
            path,
            mime_type: mime_type.to_string(),
            field_name: field_name.to_string(),
            released: false,
        };

        file.write_all(data).await?;
        file.flush().await?;

        debug!(
            "Staged {} upload ({} bytes, {}) at {}",
            upload.field_name,
            data.len(),
            upload.mime_type,
            upload.path.display()
        );

        Ok(upload)
    }
}

/// A staged attachment owned by exactly one request.
///
/// The backing file is deleted once: by [`Upload::release`], or on drop if the request
/// bailed out before releasing it.
#[derive(Debug)]
pub struct Upload {
    path: PathBuf,
    mime_type: String,
    field_name: String,
    released: bool,
}

impl Upload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Deletes the staged file without blocking the runtime.
    pub async fn release(mut self) {
        let result = tokio::fs::remove_file(&self.path).await;
        self.released = true;
        log_removal(&self.path, result);
    }
}

impl Drop for Upload {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        log_removal(&self.path, std::fs::remove_file(&self.path));
    }
}

// Best effort: a failed delete is logged and must not mask the request's result.
fn log_removal(path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => debug!("Released staged upload {}", path.display()),
        Err(e) => warn!("Error deleting temp file {}: {}", path.display(), e),
    }
}
