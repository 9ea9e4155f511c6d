//! Upload metadata accompanying a stored file.

use crate::model::FileId;
use serde::{Deserialize, Serialize};

/// Metadata describing an uploaded file.
///
/// The mime type is caller-supplied and not verified against the content.
/// After a save, `id` carries the identifier the store assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMeta {
    /// Identifier assigned by the store, set once the file is saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<FileId>,

    /// File name as supplied by the uploader.
    pub original_name: String,

    /// Declared mime type (e.g., "text/plain").
    pub mime_type: String,

    /// Content length in bytes.
    pub size: u64,

    /// Grouping key the file is indexed under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl FileMeta {
    pub fn new(
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
    ) -> Self {
        FileMeta {
            id: None,
            original_name: original_name.into(),
            mime_type: mime_type.into(),
            size,
            prefix: None,
        }
    }

    /// Attach a grouping prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Attach the assigned id.
    pub fn with_id(mut self, id: FileId) -> Self {
        self.id = Some(id);
        self
    }

    /// The grouping prefix, with an empty string treated as absent.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|p| !p.is_empty())
    }
}
