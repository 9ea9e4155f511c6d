//! Fixed-tag view over a store.
//!
//! Binds one tag (e.g. "reports") so callers work with a narrower surface:
//! every save lands under the tag, every listing is scoped to it.

use crate::model::{FileId, FileMeta};
use crate::store::{Store, StoredFile};
use crate::Result;
use std::io::Read;

/// A store view that applies one tag to every save and listing.
pub struct TaggedStore<S> {
    inner: S,
    tag: String,
}

impl<S: Store> TaggedStore<S> {
    pub fn new(inner: S, tag: impl Into<String>) -> Self {
        TaggedStore {
            inner,
            tag: tag.into(),
        }
    }

    /// The bound tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Save under the bound tag.
    pub fn save(&self, meta: &FileMeta, content: &mut dyn Read) -> Result<FileId> {
        self.inner.save_tagged(meta, content, &self.tag)
    }

    /// List a prefix, scoped to the bound tag.
    pub fn list(&self, prefix: &str) -> Result<Vec<StoredFile>> {
        self.inner.list_by_prefix(prefix, Some(&self.tag))
    }

    /// Retrieval is tag-agnostic; delegates to the underlying store.
    pub fn open(&self, id: &FileId, name: &str) -> Result<Box<dyn Read + Send>> {
        self.inner.open(id, name)
    }

    /// Delete the file and its markers, including the bound tag's.
    pub fn delete(&self, id: &FileId) -> Result<()> {
        self.inner.delete(id, Some(&self.tag))
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;
    use tempfile::tempdir;

    #[test]
    fn test_tagged_view_scopes_saves_and_listings() {
        let dir = tempdir().unwrap();
        let reports = TaggedStore::new(LocalStore::open_at(dir.path()).unwrap(), "reports");

        let meta = FileMeta::new("summary.jtl", "application/xml", 10).with_prefix("proj");
        let id = reports.save(&meta, &mut "<jtl></jtl>".as_bytes()).unwrap();

        let listed = reports.list("proj").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].original_name, "summary.jtl");

        // The view sees nothing under other tags' prefixes
        assert!(reports.list("elsewhere").unwrap().is_empty());

        // Content is reachable without the tag
        let inner = reports.into_inner();
        assert!(inner.open(&id, "summary.jtl").is_ok());
    }

    #[test]
    fn test_tagged_view_delete() {
        let dir = tempdir().unwrap();
        let reports = TaggedStore::new(LocalStore::open_at(dir.path()).unwrap(), "reports");

        let meta = FileMeta::new("summary.jtl", "application/xml", 10).with_prefix("proj");
        let id = reports.save(&meta, &mut "<jtl></jtl>".as_bytes()).unwrap();

        reports.delete(&id).unwrap();
        assert!(reports.list("proj").unwrap().is_empty());
        assert!(reports
            .open(&id, "summary.jtl")
            .err()
            .unwrap()
            .is_not_found());
    }
}
