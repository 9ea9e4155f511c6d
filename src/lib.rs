//! # cubby
//!
//! A content-addressed file store with prefix and tag indexing.
//!
//! Uploaded content is persisted under a deterministic, content-derived
//! identifier and can later be retrieved, grouped, enumerated, and removed
//! in bulk. Two directory trees under one base path stay consistent across
//! creation, deletion and bulk removal: `storage/` holds the blobs,
//! `information/` holds the index markers that make grouping and cascading
//! cleanup cheap.
//!
//! ## Core Concepts
//!
//! - **File id**: lowercase hex SHA-1 of the content, extended with the
//!   grouping prefix when one is given
//! - **Blob**: the stored content at `storage/{fileId}/{originalName}`
//! - **Forward index**: markers at `information/{prefix}/[{tag}/]{fileId}`
//! - **Reverse index**: markers at `information/{fileId}/{prefix}`, driving
//!   cascading cleanup without tree scans
//!
//! ## Example
//!
//! ```ignore
//! use cubby::{FileMeta, LocalStore, Store};
//!
//! let store = LocalStore::open_at("/var/lib/cubby")?;
//! let meta = FileMeta::new("a.txt", "text/plain", 5).with_prefix("proj");
//! let id = store.save(&meta, &mut "hello".as_bytes())?;
//! let mut content = store.open(&id, "a.txt")?;
//! ```

pub mod config;
pub mod model;
pub mod store;

mod error;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use model::{FileId, FileMeta, IdHasher};
pub use store::{LocalStore, Store, StoredFile, TaggedStore};
