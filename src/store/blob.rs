//! Blob persistence under the `storage/` subtree.
//!
//! Each blob occupies its own directory, `storage/{fileId}/{originalName}`.
//! At most one blob directory exists per id; an id with no directory is
//! absent.

use crate::model::FileId;
use crate::store::layout::{ensure_dir, Layout};
use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads, writes and deletes blob content.
#[derive(Debug, Clone)]
pub struct BlobStore {
    layout: Layout,
}

impl BlobStore {
    pub fn new(layout: Layout) -> Self {
        BlobStore { layout }
    }

    /// Write a blob by handing the destination path to `transfer`.
    ///
    /// Creates `storage/{id}` if absent; the callback must fully write and
    /// close the file before returning. An existing blob is overwritten.
    pub fn put_with<F>(&self, id: &FileId, name: &str, transfer: F) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> io::Result<()>,
    {
        ensure_dir(&self.layout.blob_dir(id))?;
        let dest = self.layout.blob_path(id, name);
        transfer(&dest)?;
        Ok(dest)
    }

    /// Move a fully-written file into place as the blob for `id`/`name`.
    ///
    /// Rename first; on a cross-device link error, fall back to copy and
    /// delete. An existing blob is overwritten.
    pub fn adopt(&self, id: &FileId, name: &str, src: &Path) -> Result<PathBuf> {
        ensure_dir(&self.layout.blob_dir(id))?;
        let dest = self.layout.blob_path(id, name);
        match fs::rename(src, &dest) {
            Ok(()) => {}
            Err(e) if e.raw_os_error() == Some(libc::EXDEV) => {
                fs::copy(src, &dest)?;
                fs::remove_file(src)?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(dest)
    }

    /// Open the stored content for reading.
    pub fn open(&self, id: &FileId, name: &str) -> Result<fs::File> {
        let path = self.layout.blob_path(id, name);
        match fs::File::open(&path) {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound {
                file_id: id.to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Recursively delete `storage/{id}`. Absence is a no-op, not an error.
    pub fn remove(&self, id: &FileId) -> Result<()> {
        match fs::remove_dir_all(self.layout.blob_dir(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(%id, "blob already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The single stored file name under `storage/{id}/`, if the blob exists.
    pub fn original_name(&self, id: &FileId) -> Result<Option<String>> {
        let dir = self.layout.blob_dir(id);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                return Ok(Some(entry.file_name().to_string_lossy().into_owned()));
            }
        }
        Ok(None)
    }
}
