use crate::error::DownloadError;
use crate::service::OrderId;
use std::path::{Path, PathBuf};
use tracing;

/// Suffix of in-flight downloads. Never mistaken for a finished file.
pub const PARTIAL_SUFFIX: &str = ".part";
/// Suffix given to downloads whose digest did not match.
pub const CORRUPT_SUFFIX: &str = ".corrupt";

/// The local download tree, laid out as `<root>/<order_id>/<filename>`.
///
/// The tree doubles as the record of what has already been downloaded.
#[derive(Debug, Clone)]
pub struct LocalInventory {
    root: PathBuf,
}

impl LocalInventory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn order_dir(&self, order: &OrderId) -> PathBuf {
        self.root.join(order.as_str())
    }

    pub fn item_path(&self, order: &OrderId, filename: &str) -> PathBuf {
        self.order_dir(order).join(filename)
    }

    /// Creates the order directory if needed. Calling this for an existing directory is a no-op.
    pub async fn ensure_order_dir(&self, order: &OrderId) -> Result<PathBuf, DownloadError> {
        let dir = self.order_dir(order);
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            tracing::info!(order = %order, path = %dir.display(), "Creating order directory");
        }
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| DownloadError::filesystem(&dir, e))?;
        Ok(dir)
    }

    /// Whether `<root>/<order>/<filename>` is a finished download.
    ///
    /// With a known size the file length must match exactly; without one, any non-empty
    /// regular file counts.
    pub async fn already_present(
        &self,
        order: &OrderId,
        filename: &str,
        expected_size: Option<u64>,
    ) -> bool {
        let path = self.item_path(order, filename);
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return false,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Cannot inspect local file, treating as absent: {}", e);
                return false;
            }
        };

        if !metadata.is_file() {
            tracing::warn!(path = %path.display(), "Local path is not a regular file");
            return false;
        }

        match expected_size {
            Some(expected) if metadata.len() != expected => {
                tracing::info!(
                    path = %path.display(),
                    expected,
                    actual = metadata.len(),
                    "Local file size differs from the service, downloading again"
                );
                false
            }
            Some(_) => true,
            None => metadata.len() > 0,
        }
    }
}

/// `<path>` with `suffix` appended to its file name.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
