use crate::error::DownloadError;
use digest::Digest;
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl ChecksumAlgorithm {
    /// Guess the algorithm from a checksum file extension such as `md5` or `sha256`.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "md5" => Some(Self::Md5),
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            "sha384" => Some(Self::Sha384),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Guess the algorithm from the length of a hex-encoded digest.
    pub fn from_hex_len(len: usize) -> Option<Self> {
        match len {
            32 => Some(Self::Md5),
            40 => Some(Self::Sha1),
            64 => Some(Self::Sha256),
            96 => Some(Self::Sha384),
            128 => Some(Self::Sha512),
            _ => None,
        }
    }

    pub fn digest_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
        };
        f.write_str(name)
    }
}

/// An expected digest together with the algorithm that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentDigest {
    Md5(Vec<u8>),
    Sha1(Vec<u8>),
    Sha256(Vec<u8>),
    Sha384(Vec<u8>),
    Sha512(Vec<u8>),
}

impl ContentDigest {
    pub fn from_hex_digest(algorithm: ChecksumAlgorithm, digest: &str) -> Result<Self, String> {
        let bytes = hex::decode(digest.trim()).map_err(|e| format!("invalid hex digest: {e}"))?;
        if bytes.len() != algorithm.digest_len() {
            return Err(format!(
                "{algorithm} digest must be {} bytes, got {}",
                algorithm.digest_len(),
                bytes.len()
            ));
        }

        Ok(Self::from_bytes(algorithm, bytes))
    }

    fn from_bytes(algorithm: ChecksumAlgorithm, bytes: Vec<u8>) -> Self {
        match algorithm {
            ChecksumAlgorithm::Md5 => Self::Md5(bytes),
            ChecksumAlgorithm::Sha1 => Self::Sha1(bytes),
            ChecksumAlgorithm::Sha256 => Self::Sha256(bytes),
            ChecksumAlgorithm::Sha384 => Self::Sha384(bytes),
            ChecksumAlgorithm::Sha512 => Self::Sha512(bytes),
        }
    }

    /// Starts hashing content that is expected to match this digest.
    pub fn verifier(&self) -> ContentDigestVerifier {
        ContentDigestVerifier {
            hasher: StreamingHasher::new(self.algorithm()),
            expected: self.clone(),
        }
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm {
        match self {
            Self::Md5(_) => ChecksumAlgorithm::Md5,
            Self::Sha1(_) => ChecksumAlgorithm::Sha1,
            Self::Sha256(_) => ChecksumAlgorithm::Sha256,
            Self::Sha384(_) => ChecksumAlgorithm::Sha384,
            Self::Sha512(_) => ChecksumAlgorithm::Sha512,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Md5(bytes)
            | Self::Sha1(bytes)
            | Self::Sha256(bytes)
            | Self::Sha384(bytes)
            | Self::Sha512(bytes) => bytes,
        }
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

enum StreamingHasher {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl StreamingHasher {
    fn new(algorithm: ChecksumAlgorithm) -> Self {
        match algorithm {
            ChecksumAlgorithm::Md5 => Self::Md5(Md5::new()),
            ChecksumAlgorithm::Sha1 => Self::Sha1(Sha1::new()),
            ChecksumAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            ChecksumAlgorithm::Sha384 => Self::Sha384(Sha384::new()),
            ChecksumAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(hasher) => hasher.update(data),
            Self::Sha1(hasher) => hasher.update(data),
            Self::Sha256(hasher) => hasher.update(data),
            Self::Sha384(hasher) => hasher.update(data),
            Self::Sha512(hasher) => hasher.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Md5(hasher) => hasher.finalize().to_vec(),
            Self::Sha1(hasher) => hasher.finalize().to_vec(),
            Self::Sha256(hasher) => hasher.finalize().to_vec(),
            Self::Sha384(hasher) => hasher.finalize().to_vec(),
            Self::Sha512(hasher) => hasher.finalize().to_vec(),
        }
    }
}

/// Hashes a download as it streams past. Obtained from [`ContentDigest::verifier`].
pub struct ContentDigestVerifier {
    hasher: StreamingHasher,
    expected: ContentDigest,
}

impl ContentDigestVerifier {
    #[inline]
    pub fn update(&mut self, data: impl AsRef<[u8]>) {
        self.hasher.update(data.as_ref());
    }

    pub fn finish(self) -> Result<(), DigestMismatch> {
        let actual = ContentDigest::from_bytes(self.expected.algorithm(), self.hasher.finalize());
        if actual == self.expected {
            Ok(())
        } else {
            Err(DigestMismatch {
                expected: self.expected,
                actual,
            })
        }
    }
}

#[derive(Debug)]
pub struct DigestMismatch {
    pub expected: ContentDigest,
    pub actual: ContentDigest,
}

impl DigestMismatch {
    /// `path` is where the offending content now lives.
    pub fn into_error(self, path: impl Into<PathBuf>) -> DownloadError {
        DownloadError::ChecksumMismatch {
            path: path.into(),
            expected: self.expected.digest_hex(),
            actual: self.actual.digest_hex(),
        }
    }
}
