//! Filesystem layout under the base directory.
//!
//! ```text
//! {base}/storage/{fileId}/{originalName}     blob content
//! {base}/information/{prefix}/{fileId}       forward marker, untagged
//! {base}/information/{prefix}/{tag}/{fileId} forward marker, tagged
//! {base}/information/{fileId}/{prefix}       reverse marker
//! {base}/information/{fileId}                degenerate marker, no prefix
//! {base}/staging/{uuid}                      in-flight single-pass writes
//! ```

use crate::model::FileId;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) const STORAGE_DIR: &str = "storage";
pub(crate) const INFO_DIR: &str = "information";
pub(crate) const STAGING_DIR: &str = "staging";

/// Resolves every path the store touches.
///
/// An immutable value constructed once per store; there is no global or
/// mutable base path.
#[derive(Debug, Clone)]
pub struct Layout {
    base: PathBuf,
}

impl Layout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Layout { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn storage_root(&self) -> PathBuf {
        self.base.join(STORAGE_DIR)
    }

    pub fn info_root(&self) -> PathBuf {
        self.base.join(INFO_DIR)
    }

    pub fn staging_root(&self) -> PathBuf {
        self.base.join(STAGING_DIR)
    }

    /// Directory holding the blob for `id`.
    pub fn blob_dir(&self, id: &FileId) -> PathBuf {
        self.storage_root().join(id.as_str())
    }

    /// Full path of the stored content for `id`/`name`.
    pub fn blob_path(&self, id: &FileId, name: &str) -> PathBuf {
        self.blob_dir(id).join(name)
    }

    /// `information/{fileId}`: parent of the reverse markers, and the
    /// degenerate marker when no prefix was given.
    pub fn info_node(&self, id: &FileId) -> PathBuf {
        self.info_root().join(id.as_str())
    }

    /// `information/{fileId}/{prefix}`
    pub fn reverse_marker(&self, id: &FileId, prefix: &str) -> PathBuf {
        self.info_node(id).join(prefix)
    }

    /// `information/{prefix}`
    pub fn prefix_dir(&self, prefix: &str) -> PathBuf {
        self.info_root().join(prefix)
    }

    /// `information/{prefix}/{fileId}`
    pub fn forward_marker(&self, prefix: &str, id: &FileId) -> PathBuf {
        self.prefix_dir(prefix).join(id.as_str())
    }

    /// `information/[{prefix}/]{tag}`
    pub fn tag_dir(&self, prefix: Option<&str>, tag: &str) -> PathBuf {
        match prefix {
            Some(prefix) => self.prefix_dir(prefix).join(tag),
            None => self.info_root().join(tag),
        }
    }

    /// `information/[{prefix}/]{tag}/{fileId}`
    pub fn tag_marker(&self, prefix: Option<&str>, tag: &str, id: &FileId) -> PathBuf {
        self.tag_dir(prefix, tag).join(id.as_str())
    }

    pub fn staging_path(&self, name: &str) -> PathBuf {
        self.staging_root().join(name)
    }

    /// Create the `storage/` and `information/` roots if absent.
    pub fn ensure_roots(&self) -> Result<()> {
        fs::create_dir_all(self.storage_root())?;
        fs::create_dir_all(self.info_root())?;
        Ok(())
    }
}

/// Create `dir` and any missing parents.
pub(crate) fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}
