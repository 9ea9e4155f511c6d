//! Content-derived file identifier.
//!
//! A file id is the lowercase hex SHA-1 of the file's content, extended with
//! the UTF-8 bytes of the grouping prefix when one is given. The same content
//! saved under two different prefixes therefore yields two distinct ids,
//! while repeated saves under the same prefix converge on one id.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

/// Hex length of a SHA-1 digest.
const HEX_LEN: usize = 40;

/// A file identifier - 40 lowercase hex chars of SHA-1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Derive the id for a content stream.
    ///
    /// Reads `content` to the end; the stream is consumed exactly once. An
    /// empty prefix is treated as absent. Distinct content hashing to the
    /// same id silently overwrites on save; collisions are not detected.
    pub fn derive(content: &mut dyn Read, prefix: Option<&str>) -> Result<Self> {
        let mut hasher = IdHasher::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = content.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finish(prefix))
    }

    /// Derive the id for in-memory content.
    pub fn derive_bytes(content: &[u8], prefix: Option<&str>) -> Self {
        let mut hasher = IdHasher::new();
        hasher.update(content);
        hasher.finish(prefix)
    }

    /// Parse from an existing id string (validates format).
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != HEX_LEN || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidId(s.to_string()));
        }
        Ok(FileId(s.to_lowercase()))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for FileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Incremental id derivation for single-pass writes.
///
/// Feed content chunks as they are spooled to disk, then finalize with the
/// optional prefix.
pub struct IdHasher {
    inner: Sha1,
}

impl IdHasher {
    pub fn new() -> Self {
        IdHasher { inner: Sha1::new() }
    }

    /// Feed a chunk of content.
    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
    }

    /// Extend with the prefix bytes (if any) and produce the id.
    pub fn finish(mut self, prefix: Option<&str>) -> FileId {
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            self.inner.update(prefix.as_bytes());
        }
        FileId(hex::encode(self.inner.finalize()))
    }
}

impl Default for IdHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_known_vector() {
        // sha1("hello" + "cuckoo")
        let id = FileId::derive(&mut "hello".as_bytes(), Some("cuckoo")).unwrap();
        assert_eq!(id.as_str(), "8e9b53494fcf4c8285b24815152583d5839ca212");

        // sha1("hello")
        let id = FileId::derive(&mut "hello".as_bytes(), None).unwrap();
        assert_eq!(id.as_str(), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    }

    #[test]
    fn test_derive_is_deterministic() {
        let a = FileId::derive_bytes(b"some content", Some("proj"));
        let b = FileId::derive_bytes(b"some content", Some("proj"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_is_prefix_sensitive() {
        let p1 = FileId::derive_bytes(b"hello", Some("p1"));
        let p2 = FileId::derive_bytes(b"hello", Some("p2"));
        let none = FileId::derive_bytes(b"hello", None);
        assert_ne!(p1, p2);
        assert_ne!(p1, none);
        assert_eq!(p1.as_str(), "7519e48699911df4a68c00d936be4af676ede11f");
        assert_eq!(p2.as_str(), "417d1cd1f9b5b2c97fc11bace4b027d1d8e4118e");
    }

    #[test]
    fn test_empty_prefix_is_absent() {
        let empty = FileId::derive_bytes(b"hello", Some(""));
        let none = FileId::derive_bytes(b"hello", None);
        assert_eq!(empty, none);
    }

    #[test]
    fn test_streamed_matches_bytes() {
        let content = vec![7u8; 100_000];
        let streamed = FileId::derive(&mut content.as_slice(), Some("big")).unwrap();
        assert_eq!(streamed, FileId::derive_bytes(&content, Some("big")));
    }

    #[test]
    fn test_format() {
        let id = FileId::derive_bytes(b"format", None);
        assert_eq!(id.as_str().len(), 40);
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_parse_valid() {
        let id: FileId = "8e9b53494fcf4c8285b24815152583d5839ca212".parse().unwrap();
        assert_eq!(id.as_str(), "8e9b53494fcf4c8285b24815152583d5839ca212");

        // Uppercase input normalizes to lowercase
        let id = FileId::parse("8E9B53494FCF4C8285B24815152583D5839CA212").unwrap();
        assert_eq!(id.as_str(), "8e9b53494fcf4c8285b24815152583d5839ca212");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(FileId::parse("short"), Err(Error::InvalidId(_))));
        assert!(matches!(
            FileId::parse("zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"),
            Err(Error::InvalidId(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = FileId::derive_bytes(b"serde", None);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_str()));
        let restored: FileId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }
}
