use std::{fs::File, io::Read, path::Path};

use md5::Md5;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Paired content digests of a byte stream. A pure function of the bytes;
/// the digest pair is identical for any read chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentFingerprint {
    pub sha256: String,
    pub md5: String,
}

impl ContentFingerprint {
    pub fn matches_sha256(&self, expected: &str) -> bool {
        self.sha256 == expected.trim().to_lowercase()
    }

    pub fn matches_md5(&self, expected: &str) -> bool {
        self.md5 == expected.trim().to_lowercase()
    }
}

pub struct ContentHasher {
    chunk_size: usize,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self { chunk_size: 8192 }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn hash_file<P: AsRef<Path>>(&self, path: P) -> Result<ContentFingerprint> {
        self.hash_reader(File::open(path)?)
    }

    /// Streams the reader through both digests in bounded chunks; the whole
    /// input is never held in memory. Read errors propagate unchanged.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> Result<ContentFingerprint> {
        let mut sha256 = Sha256::new();
        let mut md5 = Md5::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            sha256.update(&buffer[..read]);
            md5.update(&buffer[..read]);
        }

        Ok(ContentFingerprint {
            sha256: hex::encode(sha256.finalize()),
            md5: hex::encode(md5.finalize()),
        })
    }

    pub fn hash_bytes(&self, bytes: &[u8]) -> Result<ContentFingerprint> {
        self.hash_reader(bytes)
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_pair_is_chunk_size_independent() {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let reference = ContentHasher::new().hash_bytes(&data).unwrap();

        for chunk_size in [1, 7, 64, 4096, 1 << 20] {
            let fingerprint = ContentHasher::new()
                .with_chunk_size(chunk_size)
                .hash_bytes(&data)
                .unwrap();
            assert_eq!(fingerprint, reference, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn known_digests_of_empty_input() {
        let fingerprint = ContentHasher::new().hash_bytes(b"").unwrap();
        assert_eq!(
            fingerprint.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(fingerprint.md5, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn expected_hash_comparison_is_case_and_whitespace_insensitive() {
        let fingerprint = ContentHasher::new().hash_bytes(b"abc").unwrap();
        let shouting = format!("  {}  ", fingerprint.sha256.to_uppercase());
        assert!(fingerprint.matches_sha256(&shouting));
        assert!(!fingerprint.matches_md5("not a digest"));
    }

    #[test]
    fn identical_bytes_fingerprint_identically_from_different_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"same bytes").unwrap();

        let from_file = ContentHasher::new().hash_file(&path).unwrap();
        let from_bytes = ContentHasher::new().hash_bytes(b"same bytes").unwrap();
        assert_eq!(from_file, from_bytes);
    }
}
