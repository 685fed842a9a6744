use super::download::download_item;
use super::source::ItemSource;
use crate::error::DownloadError;
use crate::inventory::LocalInventory;
use crate::service::{ChecksumReference, Item, filename_from_url};
use crate::verification::{ContentDigest, parse_checksum_file};
use std::path::PathBuf;
use tracing;

#[derive(Clone, Debug)]
pub struct ExpectedDigest {
    pub digest: ContentDigest,
    /// Local copy of the checksum file the digest was read from, if any
    pub checksum_file: Option<PathBuf>,
}

/// Resolves the digest an item is expected to have.
///
/// Remote checksum files are stored next to the item like any other download and are only
/// fetched when not already present. Returns `None` when the item has no checksum reference.
pub async fn fetch_expected_digest<S: ItemSource + ?Sized>(
    source: &mut S,
    inventory: &LocalInventory,
    item: &Item,
) -> Result<Option<ExpectedDigest>, DownloadError> {
    let url = match &item.checksum {
        None => return Ok(None),
        Some(ChecksumReference::Inline(digest)) => {
            return Ok(Some(ExpectedDigest {
                digest: digest.clone(),
                checksum_file: None,
            }));
        }
        Some(ChecksumReference::Remote(url)) => url,
    };

    let filename = filename_from_url(url).map_err(|reason| DownloadError::InvalidChecksum {
        path: inventory.order_dir(&item.order_id),
        reason,
    })?;
    let path = inventory.item_path(&item.order_id, &filename);

    if inventory.already_present(&item.order_id, &filename, None).await {
        tracing::debug!(path = %path.display(), "Checksum file already present");
    } else {
        tracing::debug!(url = %url, "Fetching checksum file");
        let request = source.request(url, path.clone(), None)?;
        download_item(&request, None).await?;
    }

    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| DownloadError::filesystem(&path, e))?;
    let digest = parse_checksum_file(&contents, &filename).map_err(|reason| {
        DownloadError::InvalidChecksum {
            path: path.clone(),
            reason,
        }
    })?;

    Ok(Some(ExpectedDigest {
        digest,
        checksum_file: Some(path),
    }))
}
