use super::{ChecksumAlgorithm, ContentDigest};
use std::path::Path;

/// Parses the contents of a checksum file.
///
/// Accepts a bare hex digest, the coreutils `<digest>  <filename>` form and the BSD
/// `ALG (filename) = <digest>` form. Only the first non-empty line is considered, as
/// checksum files accompany exactly one product. The algorithm is taken from the
/// checksum file's extension, then the BSD tag, then the digest length.
pub fn parse_checksum_file(contents: &str, checksum_file_name: &str) -> Result<ContentDigest, String> {
    let line = contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .ok_or_else(|| "checksum file is empty".to_string())?;

    let (tag, digest_hex) = match line.rsplit_once('=') {
        Some((head, digest)) if head.contains('(') => {
            let tag = head.split_whitespace().next();
            (tag, digest.trim())
        }
        _ => (None, line.split_whitespace().next().unwrap_or_default()),
    };

    let algorithm = Path::new(checksum_file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ChecksumAlgorithm::from_extension)
        .or_else(|| tag.and_then(|tag| ChecksumAlgorithm::from_extension(&tag.replace('-', ""))))
        .or_else(|| ChecksumAlgorithm::from_hex_len(digest_hex.len()))
        .ok_or_else(|| format!("cannot determine checksum algorithm for digest {digest_hex:?}"))?;

    ContentDigest::from_hex_digest(algorithm, digest_hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MD5_HEX: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

    #[test]
    fn test_parse_coreutils_format() {
        let contents = format!("{MD5_HEX}  LC08_L1TP_sr.tar.gz\n");
        let digest = parse_checksum_file(&contents, "LC08_L1TP_sr.md5").unwrap();
        assert_eq!(digest.algorithm(), ChecksumAlgorithm::Md5);
        assert_eq!(digest.digest_hex(), MD5_HEX);
    }

    #[test]
    fn test_parse_bare_digest_uses_length() {
        let digest = parse_checksum_file(&format!("\n{MD5_HEX}\n"), "scene.cksum").unwrap();
        assert_eq!(digest.algorithm(), ChecksumAlgorithm::Md5);
    }

    #[test]
    fn test_parse_bsd_format() {
        let sha256 = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        let contents = format!("SHA256 (scene.tar.gz) = {sha256}");
        let digest = parse_checksum_file(&contents, "scene.txt").unwrap();
        assert_eq!(digest.algorithm(), ChecksumAlgorithm::Sha256);
        assert_eq!(digest.digest_hex(), sha256);
    }

    #[test]
    fn test_extension_and_digest_length_must_agree() {
        let result = parse_checksum_file(MD5_HEX, "scene.sha256");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_file_is_rejected() {
        assert!(parse_checksum_file("  \n\n", "scene.md5").is_err());
    }
}
