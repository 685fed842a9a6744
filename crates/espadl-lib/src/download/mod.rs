mod checksum;
#[allow(clippy::module_inception)]
mod download;
mod source;
mod types;

pub use checksum::{ExpectedDigest, fetch_expected_digest};
pub use download::download_item;
pub use source::{HttpItemSource, ItemSource};
pub use types::DownloadRequest;
