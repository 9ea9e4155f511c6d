//! Local filesystem store.
//!
//! Composes the hasher, blob store and index manager behind the public
//! [`Store`](crate::store::Store) surface. All operations are synchronous
//! and uncoordinated: the filesystem is the only shared state, and callers
//! needing ordering between concurrent saves and deletes of the same id
//! must serialize at a higher layer.

use crate::config::StoreConfig;
use crate::model::{FileId, FileMeta, IdHasher};
use crate::store::blob::BlobStore;
use crate::store::index::IndexManager;
use crate::store::layout::{ensure_dir, Layout};
use crate::store::{Store, StoredFile};
use crate::Result;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// A content-addressed file store on the local filesystem.
pub struct LocalStore {
    layout: Layout,
    blobs: BlobStore,
    index: IndexManager,
}

impl LocalStore {
    /// Open a store, creating the `storage/` and `information/` roots if
    /// absent.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let layout = Layout::new(config.base_path);
        layout.ensure_roots()?;
        info!(base_path = %layout.base().display(), "file store ready");
        Ok(LocalStore {
            blobs: BlobStore::new(layout.clone()),
            index: IndexManager::new(layout.clone()),
            layout,
        })
    }

    /// Open a store at a specific base path.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(StoreConfig::with_base_path(path))
    }

    /// The base directory this store operates under.
    pub fn base_path(&self) -> &Path {
        self.layout.base()
    }

    /// Save by handing the final destination path to a caller-supplied
    /// transfer function.
    ///
    /// `content` is read once to derive the id; `transfer` must fully write
    /// and close the destination before returning. The store does not see or
    /// buffer the content during the transfer step. Use this when the
    /// content already exists somewhere the caller can copy from, e.g. a
    /// spooled multipart upload.
    pub fn save_with<F>(&self, meta: &FileMeta, content: &mut dyn Read, transfer: F) -> Result<FileId>
    where
        F: FnOnce(&Path) -> io::Result<()>,
    {
        let id = FileId::derive(content, meta.prefix())?;
        self.blobs.put_with(&id, &meta.original_name, transfer)?;
        self.index.record(&id, meta.prefix(), None)?;
        Ok(id)
    }

    /// [`save_with`](Self::save_with), plus a tag marker.
    pub fn save_tagged_with<F>(
        &self,
        meta: &FileMeta,
        content: &mut dyn Read,
        tag: &str,
        transfer: F,
    ) -> Result<FileId>
    where
        F: FnOnce(&Path) -> io::Result<()>,
    {
        let id = self.save_with(meta, content, transfer)?;
        self.index.record(&id, meta.prefix(), Some(tag))?;
        Ok(id)
    }

    /// Open the stored content as a plain file handle.
    pub fn open_file(&self, id: &FileId, name: &str) -> Result<fs::File> {
        self.blobs.open(id, name)
    }

    /// Single-pass save: spool `content` to a staging file while hashing,
    /// then rename into place.
    fn save_staged(&self, meta: &FileMeta, content: &mut dyn Read, tag: Option<&str>) -> Result<FileId> {
        ensure_dir(&self.layout.staging_root())?;
        let staging = self
            .layout
            .staging_path(&Uuid::new_v4().simple().to_string());

        let id = match spool(content, &staging, meta.prefix()) {
            Ok(id) => id,
            Err(e) => {
                let _ = fs::remove_file(&staging);
                return Err(e.into());
            }
        };

        if let Err(e) = self.blobs.adopt(&id, &meta.original_name, &staging) {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
        self.index.record(&id, meta.prefix(), None)?;
        if let Some(tag) = tag {
            self.index.record(&id, meta.prefix(), Some(tag))?;
        }
        Ok(id)
    }

    /// For each id recorded under the prefix, drop the blob and the reverse
    /// tree, then the prefix tree itself.
    fn remove_prefix_cascade(&self, prefix: &str) -> Result<()> {
        for id in self.index.list(prefix, None)? {
            if let Err(e) = self.blobs.remove(&id) {
                warn!(%id, error = %e, "failed to delete blob during prefix removal");
            }
            self.index.drop_reverse(&id);
        }
        self.index.drop_prefix(prefix);
        Ok(())
    }
}

impl Store for LocalStore {
    fn save(&self, meta: &FileMeta, content: &mut dyn Read) -> Result<FileId> {
        self.save_staged(meta, content, None)
    }

    fn save_tagged(&self, meta: &FileMeta, content: &mut dyn Read, tag: &str) -> Result<FileId> {
        self.save_staged(meta, content, Some(tag))
    }

    fn open(&self, id: &FileId, name: &str) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(self.open_file(id, name)?))
    }

    fn delete(&self, id: &FileId, tag: Option<&str>) -> Result<()> {
        self.blobs.remove(id)?;
        self.index.remove(id, tag)
    }

    fn list_by_prefix(&self, prefix: &str, tag: Option<&str>) -> Result<Vec<StoredFile>> {
        let mut files = Vec::new();
        for id in self.index.list(prefix, tag)? {
            match self.blobs.original_name(&id)? {
                Some(original_name) => files.push(StoredFile { id, original_name }),
                // Accepted index/blob divergence after a partial failure
                None => warn!(%id, "indexed file has no stored content"),
            }
        }
        Ok(files)
    }

    fn remove_prefix(&self, prefix: &str) -> Result<()> {
        self.remove_prefix_cascade(prefix)
    }
}

/// Copy `content` into `dest` while hashing, returning the derived id.
fn spool(content: &mut dyn Read, dest: &Path, prefix: Option<&str>) -> io::Result<FileId> {
    let mut out = fs::File::create(dest)?;
    let mut hasher = IdHasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = content.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        out.write_all(&buf[..n])?;
    }
    out.flush()?;
    Ok(hasher.finish(prefix))
}
