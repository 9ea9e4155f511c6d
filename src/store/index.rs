//! Secondary index under the `information/` subtree.
//!
//! Forward markers map `{prefix}/[{tag}/]` to file ids; reverse markers map
//! each file id back to the prefixes it was recorded under. The reverse map
//! is what makes cascading cleanup possible without scanning the whole tree:
//! the set of prefixes under `information/{fileId}/` always equals the set of
//! prefixes holding a forward marker for that id.

use crate::model::FileId;
use crate::store::layout::{ensure_dir, Layout};
use crate::Result;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Maintains the forward and reverse index markers.
#[derive(Debug, Clone)]
pub struct IndexManager {
    layout: Layout,
}

impl IndexManager {
    pub fn new(layout: Layout) -> Self {
        IndexManager { layout }
    }

    /// Record forward and reverse markers for a save. Idempotent:
    /// pre-existing markers are left untouched.
    ///
    /// Without a prefix or tag the degenerate marker `information/{fileId}`
    /// is still created, so every stored id is tracked in the index.
    pub fn record(&self, id: &FileId, prefix: Option<&str>, tag: Option<&str>) -> Result<()> {
        match tag {
            None => match prefix {
                None => ensure_dir(&self.layout.info_node(id))?,
                Some(prefix) => {
                    touch(&self.layout.forward_marker(prefix, id))?;
                    touch(&self.layout.reverse_marker(id, prefix))?;
                }
            },
            Some(tag) => {
                touch(&self.layout.tag_marker(prefix, tag, id))?;
                match prefix {
                    None => ensure_dir(&self.layout.info_node(id))?,
                    Some(prefix) => touch(&self.layout.reverse_marker(id, prefix))?,
                }
            }
        }
        Ok(())
    }

    /// Remove every marker referencing `id`, driven by the reverse index.
    ///
    /// Best-effort: individual deletion failures are logged and skipped, so
    /// invoking this twice for the same id succeeds silently.
    pub fn remove(&self, id: &FileId, tag: Option<&str>) -> Result<()> {
        let prefixes = self.reverse_prefixes(id)?;
        if prefixes.is_empty() {
            // Untagged-prefix case: the tag marker sits directly under
            // information/{tag}/.
            if let Some(tag) = tag {
                discard_file(&self.layout.tag_marker(None, tag, id));
            }
        } else {
            for prefix in &prefixes {
                if let Some(tag) = tag {
                    discard_file(&self.layout.tag_marker(Some(prefix), tag, id));
                }
                discard_file(&self.layout.forward_marker(prefix, id));
            }
        }
        discard_tree(&self.layout.info_node(id));
        Ok(())
    }

    /// File ids recorded under a prefix, or under a tag within it.
    ///
    /// An unknown prefix or tag yields an empty list, not an error.
    pub fn list(&self, prefix: &str, tag: Option<&str>) -> Result<Vec<FileId>> {
        let dir = match tag {
            None => self.layout.prefix_dir(prefix),
            Some(tag) => self.layout.tag_dir(Some(prefix), tag),
        };
        self.marker_names(&dir)
    }

    /// The prefixes a file id was recorded under.
    pub fn reverse_prefixes(&self, id: &FileId) -> Result<Vec<String>> {
        let entries = match fs::read_dir(self.layout.info_node(id)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut prefixes = Vec::new();
        for entry in entries {
            prefixes.push(entry?.file_name().to_string_lossy().into_owned());
        }
        Ok(prefixes)
    }

    /// Recursively delete the reverse tree `information/{fileId}`.
    pub fn drop_reverse(&self, id: &FileId) {
        discard_tree(&self.layout.info_node(id));
    }

    /// Recursively delete the prefix tree `information/{prefix}`.
    pub fn drop_prefix(&self, prefix: &str) {
        discard_tree(&self.layout.prefix_dir(prefix));
    }

    /// Direct non-directory markers in `dir`, parsed as file ids. Tag
    /// subdirectories alongside them are skipped.
    fn marker_names(&self, dir: &Path) -> Result<Vec<FileId>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match FileId::parse(&name) {
                Ok(id) => ids.push(id),
                Err(_) => debug!(marker = %name, "skipping non-id marker"),
            }
        }
        Ok(ids)
    }
}

/// Create an empty marker file, and its parents, if absent.
fn touch(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(path)?;
    Ok(())
}

/// Delete a marker file, logging and swallowing any failure.
fn discard_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "marker already gone");
        }
        Err(e) => warn!(path = %path.display(), error = %e, "failed to delete marker"),
    }
}

/// Delete a marker tree, logging and swallowing any failure.
fn discard_tree(path: &Path) {
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "marker tree already gone");
        }
        Err(e) => warn!(path = %path.display(), error = %e, "failed to delete marker tree"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn index_in(dir: &Path) -> (IndexManager, Layout) {
        let layout = Layout::new(dir);
        layout.ensure_roots().unwrap();
        (IndexManager::new(layout.clone()), layout)
    }

    fn id(n: u8) -> FileId {
        FileId::derive_bytes(&[n], None)
    }

    #[test]
    fn test_record_with_prefix() {
        let dir = tempdir().unwrap();
        let (index, layout) = index_in(dir.path());
        let id = id(1);

        index.record(&id, Some("cuckoo"), None).unwrap();
        assert!(layout.forward_marker("cuckoo", &id).is_file());
        assert!(layout.reverse_marker(&id, "cuckoo").is_file());

        // Idempotent
        index.record(&id, Some("cuckoo"), None).unwrap();
        assert_eq!(index.list("cuckoo", None).unwrap(), vec![id]);
    }

    #[test]
    fn test_record_without_prefix() {
        let dir = tempdir().unwrap();
        let (index, layout) = index_in(dir.path());
        let id = id(2);

        index.record(&id, None, None).unwrap();
        assert!(layout.info_node(&id).is_dir());
        assert!(index.reverse_prefixes(&id).unwrap().is_empty());
    }

    #[test]
    fn test_record_tagged() {
        let dir = tempdir().unwrap();
        let (index, layout) = index_in(dir.path());
        let id = id(3);

        index.record(&id, Some("cuckoo"), None).unwrap();
        index.record(&id, Some("cuckoo"), Some("reports")).unwrap();
        assert!(layout.tag_marker(Some("cuckoo"), "reports", &id).is_file());

        assert_eq!(index.list("cuckoo", Some("reports")).unwrap(), vec![id.clone()]);
        assert!(index.list("cuckoo", Some("other-tag")).unwrap().is_empty());
        // The tag directory is skipped when listing the prefix itself
        assert_eq!(index.list("cuckoo", None).unwrap(), vec![id]);
    }

    #[test]
    fn test_record_tagged_without_prefix() {
        let dir = tempdir().unwrap();
        let (index, layout) = index_in(dir.path());
        let id = id(4);

        index.record(&id, None, None).unwrap();
        index.record(&id, None, Some("reports")).unwrap();
        assert!(layout.tag_marker(None, "reports", &id).is_file());
        assert!(layout.info_node(&id).is_dir());
    }

    #[test]
    fn test_remove_with_prefix() {
        let dir = tempdir().unwrap();
        let (index, layout) = index_in(dir.path());
        let id = id(5);

        index.record(&id, Some("cuckoo"), None).unwrap();
        index.remove(&id, None).unwrap();

        assert!(!layout.forward_marker("cuckoo", &id).exists());
        assert!(!layout.info_node(&id).exists());
        // Tolerates a second invocation
        index.remove(&id, None).unwrap();
    }

    #[test]
    fn test_remove_tagged() {
        let dir = tempdir().unwrap();
        let (index, layout) = index_in(dir.path());
        let id = id(6);

        index.record(&id, Some("cuckoo"), None).unwrap();
        index.record(&id, Some("cuckoo"), Some("reports")).unwrap();
        index.remove(&id, Some("reports")).unwrap();

        assert!(!layout.tag_marker(Some("cuckoo"), "reports", &id).exists());
        assert!(!layout.forward_marker("cuckoo", &id).exists());
        assert!(!layout.info_node(&id).exists());
    }

    #[test]
    fn test_remove_tagged_without_prefix() {
        let dir = tempdir().unwrap();
        let (index, layout) = index_in(dir.path());
        let id = id(7);

        index.record(&id, None, None).unwrap();
        index.record(&id, None, Some("reports")).unwrap();
        index.remove(&id, Some("reports")).unwrap();

        assert!(!layout.tag_marker(None, "reports", &id).exists());
        assert!(!layout.info_node(&id).exists());
    }

    #[test]
    fn test_list_unknown_prefix_is_empty() {
        let dir = tempdir().unwrap();
        let (index, _) = index_in(dir.path());
        assert!(index.list("never-seen", None).unwrap().is_empty());
        assert!(index.list("never-seen", Some("tagly")).unwrap().is_empty());
    }

    #[test]
    fn test_multiple_prefixes_share_reverse_node() {
        let dir = tempdir().unwrap();
        let (index, _) = index_in(dir.path());
        let id = id(8);

        index.record(&id, Some("p1"), None).unwrap();
        index.record(&id, Some("p2"), None).unwrap();

        let mut prefixes = index.reverse_prefixes(&id).unwrap();
        prefixes.sort();
        assert_eq!(prefixes, vec!["p1", "p2"]);

        index.remove(&id, None).unwrap();
        assert!(index.list("p1", None).unwrap().is_empty());
        assert!(index.list("p2", None).unwrap().is_empty());
    }
}
