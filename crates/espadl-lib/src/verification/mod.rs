mod checksum_file;
mod content_digest;

pub use checksum_file::parse_checksum_file;
pub use content_digest::{ChecksumAlgorithm, ContentDigest, ContentDigestVerifier, DigestMismatch};
