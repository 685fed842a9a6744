use super::types::DownloadRequest;
use crate::error::DownloadError;
use crate::inventory::{CORRUPT_SUFFIX, PARTIAL_SUFFIX, with_suffix};
use crate::verification::ContentDigestVerifier;
use futures::StreamExt;
use std::path::Path;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

/// Downloads one file to `request.destination` and returns the number of bytes written.
///
/// Content is streamed into `<destination>.part`, which is renamed onto the destination
/// only once the transfer completed and, if a verifier is given, the digest matched. A
/// mismatching file is moved to `<destination>.corrupt` instead.
pub async fn download_item(
    request: &DownloadRequest,
    mut verifier: Option<ContentDigestVerifier>,
) -> Result<u64, DownloadError> {
    let destination = &request.destination;
    let partial_path = with_suffix(destination, PARTIAL_SUFFIX);
    debug!(url = %request.url, output = %destination.display(), "Downloading");

    let written = match stream_to_file(request, &partial_path, verifier.as_mut()).await {
        Ok(written) => written,
        Err(err) => {
            remove_quietly(&partial_path).await;
            return Err(err);
        }
    };

    if let Some(expected) = request.expected_size {
        if written != expected {
            remove_quietly(&partial_path).await;
            return Err(DownloadError::transfer(
                &request.url,
                format!("received {written} bytes, expected {expected}"),
            ));
        }
    }

    if let Some(verifier) = verifier {
        if let Err(mismatch) = verifier.finish() {
            let corrupt_path = with_suffix(destination, CORRUPT_SUFFIX);
            warn!(
                output = %destination.display(),
                quarantine = %corrupt_path.display(),
                "Digest mismatch, moving download aside"
            );
            if let Err(e) = tokio::fs::rename(&partial_path, &corrupt_path).await {
                remove_quietly(&partial_path).await;
                return Err(DownloadError::filesystem(&corrupt_path, e));
            }
            return Err(mismatch.into_error(corrupt_path));
        }
    }

    tokio::fs::rename(&partial_path, destination)
        .await
        .map_err(|e| DownloadError::filesystem(destination, e))?;

    info!(output = %destination.display(), bytes = written, "Downloaded");
    Ok(written)
}

async fn stream_to_file(
    request: &DownloadRequest,
    partial_path: &Path,
    mut verifier: Option<&mut ContentDigestVerifier>,
) -> Result<u64, DownloadError> {
    let mut reader = request
        .operator
        .reader(&request.rel_path)
        .await
        .map_err(|e| DownloadError::transfer(&request.url, e))?
        .into_stream(..)
        .await
        .map_err(|e| DownloadError::transfer(&request.url, e))?;

    // Truncates leftovers of an interrupted run; transfers always start from scratch.
    let file = tokio::fs::File::create(partial_path)
        .await
        .map_err(|e| DownloadError::filesystem(partial_path, e))?;
    let mut writer = BufWriter::new(file);
    let mut written: u64 = 0;

    while let Some(chunk) = reader.next().await {
        let buffer = chunk
            .map_err(|e| DownloadError::transfer(&request.url, e))?
            .to_bytes();

        if let Some(verifier) = verifier.as_deref_mut() {
            verifier.update(&buffer);
        }

        writer
            .write_all(&buffer)
            .await
            .map_err(|e| DownloadError::filesystem(partial_path, e))?;
        written += buffer.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::filesystem(partial_path, e))?;
    writer
        .get_ref()
        .sync_all()
        .await
        .map_err(|e| DownloadError::filesystem(partial_path, e))?;

    Ok(written)
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), "Failed to remove partial download: {}", e);
        }
    }
}
