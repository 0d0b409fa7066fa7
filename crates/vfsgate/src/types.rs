//! Core VFS types.
//!
//! These are plain data, serializable so listings and metadata can be handed
//! to callers outside the process unchanged.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use strum::{Display, EnumString};

use crate::path::VfsPath;

/// Entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
}

impl EntryKind {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Dir)
    }
}

/// Public/private access classification.
///
/// What it maps to (ACLs, unix modes, bucket policies) is up to the adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// A live snapshot of one entry's metadata, as reported by the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Normalized path of the entry.
    pub path: VfsPath,
    /// File or directory.
    pub kind: EntryKind,
    /// Mime type (`"directory"` for directories).
    pub mime_type: String,
    /// Last modification time.
    pub timestamp: SystemTime,
    /// Size in bytes.
    pub size: u64,
    pub visibility: Visibility,
}

impl Metadata {
    /// Metadata for a file.
    pub fn file(
        path: VfsPath,
        size: u64,
        mime_type: impl Into<String>,
        visibility: Visibility,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            path,
            kind: EntryKind::File,
            mime_type: mime_type.into(),
            timestamp,
            size,
            visibility,
        }
    }

    /// Metadata for a directory.
    pub fn dir(path: VfsPath, visibility: Visibility, timestamp: SystemTime) -> Self {
        Self {
            path,
            kind: EntryKind::Dir,
            mime_type: "directory".to_string(),
            timestamp,
            size: 0,
            visibility,
        }
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}
