use crate::service::{Credentials, OrderSelector};
use std::path::PathBuf;
use std::time::Duration;

/// Validated inputs of a download run.
#[derive(Debug, Clone)]
pub struct DownloadParams {
    pub host: String,
    pub email: String,
    pub selector: OrderSelector,
    pub target_directory: PathBuf,
    pub credentials: Credentials,
    pub verify_checksums: bool,
    pub timeout: Duration,
}
