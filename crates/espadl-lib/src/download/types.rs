use opendal::Operator;
use std::path::PathBuf;
use url::Url;

#[derive(Clone, Debug)]
pub struct DownloadRequest {
    /// Original URL, for logs and error messages
    pub url: Url,
    /// Operator serving the URL's origin
    pub operator: Operator,
    /// Path of the file relative to the operator's endpoint
    pub rel_path: String,
    /// Final location; content is staged next to it until complete
    pub destination: PathBuf,
    /// Size reported by the service, if any
    pub expected_size: Option<u64>,
}
