//! Content-addressed storage with a filesystem-backed secondary index.
//!
//! Two directory trees under one base path: `storage/` holds blob content
//! keyed by file id, `information/` holds the forward and reverse index
//! markers that group ids by prefix and tag.

mod blob;
mod index;
mod layout;
mod local;
mod tagged;

pub use blob::BlobStore;
pub use index::IndexManager;
pub use layout::Layout;
pub use local::LocalStore;
pub use tagged::TaggedStore;

use crate::model::{FileId, FileMeta};
use crate::Result;
use serde::Serialize;
use std::io::Read;

/// A listing entry: a stored file id and its original name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub id: FileId,
    pub original_name: String,
}

/// Capability interface for storage backends.
///
/// One initial implementation exists ([`LocalStore`]); alternate backends
/// (object storage, in-memory for tests) satisfy the same surface.
pub trait Store: Send + Sync {
    /// Persist content under its derived id and record the index entry.
    ///
    /// Reads `content` to the end; the caller relinquishes the stream.
    /// Returns the derived id. Saving identical content under the same
    /// prefix is idempotent and converges on one id.
    fn save(&self, meta: &FileMeta, content: &mut dyn Read) -> Result<FileId>;

    /// [`save`](Store::save), then additionally record a tag marker. The
    /// plain forward entry always exists; the tag is a narrower index.
    fn save_tagged(&self, meta: &FileMeta, content: &mut dyn Read, tag: &str) -> Result<FileId>;

    /// Open stored content for reading.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) if the
    /// id/name pair does not exist.
    fn open(&self, id: &FileId, name: &str) -> Result<Box<dyn Read + Send>>;

    /// Delete the blob, then its index markers. Best-effort and idempotent:
    /// deleting an absent id succeeds silently.
    fn delete(&self, id: &FileId, tag: Option<&str>) -> Result<()>;

    /// Enumerate files recorded under a prefix, optionally scoped to a tag.
    ///
    /// An unknown prefix or tag yields an empty list, not an error.
    fn list_by_prefix(&self, prefix: &str, tag: Option<&str>) -> Result<Vec<StoredFile>>;

    /// Remove every file recorded under the prefix, blobs and markers both,
    /// then the prefix tree itself. Idempotent.
    fn remove_prefix(&self, prefix: &str) -> Result<()>;
}
