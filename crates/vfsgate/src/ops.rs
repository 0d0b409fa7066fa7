//! Filesystem operations trait.
//!
//! [`FileSystem`] is the uniform, object-safe operation set callers and
//! plugins program against. It is implemented by the [`Vfs`](crate::Vfs)
//! facade (plain logical paths) and by the
//! [`MountManager`](crate::MountManager) (`prefix://subpath` paths), so a
//! mount manager can be mounted inside another one.
//!
//! Paths are raw strings here; each implementation normalizes or routes them
//! itself.

use std::io::Read;
use std::time::SystemTime;

use crate::adapter::ReadStream;
use crate::config::Options;
use crate::error::VfsResult;
use crate::types::{Metadata, Visibility};

/// Uniform filesystem operations.
pub trait FileSystem: Send + Sync {
    // ========================================================================
    // Reading
    // ========================================================================

    /// Check if a file exists. The root itself reports `false`.
    fn has(&self, path: &str) -> VfsResult<bool>;

    /// Read an entire file.
    fn read(&self, path: &str) -> VfsResult<Vec<u8>>;

    /// Open a file for streaming reads.
    fn read_stream(&self, path: &str) -> VfsResult<ReadStream>;

    /// Fetch metadata for one entry.
    fn get_metadata(&self, path: &str) -> VfsResult<Metadata>;

    /// List the contents of a directory.
    fn list_contents(&self, path: &str, recursive: bool) -> VfsResult<Vec<Metadata>>;

    // ========================================================================
    // Writing
    // ========================================================================

    /// Create a file; fails if it already exists.
    fn write(&self, path: &str, content: &[u8], options: Options) -> VfsResult<()>;

    /// Create a file from a reader; fails if it already exists.
    fn write_stream(&self, path: &str, reader: &mut dyn Read, options: Options) -> VfsResult<()>;

    /// Replace an existing file; fails if it is missing.
    fn update(&self, path: &str, content: &[u8], options: Options) -> VfsResult<()>;

    /// Replace an existing file from a reader; fails if it is missing.
    fn update_stream(&self, path: &str, reader: &mut dyn Read, options: Options)
        -> VfsResult<()>;

    /// Create or replace a file.
    fn put(&self, path: &str, content: &[u8], options: Options) -> VfsResult<()>;

    /// Create or replace a file from a reader.
    fn put_stream(&self, path: &str, reader: &mut dyn Read, options: Options) -> VfsResult<()>;

    /// Delete a file.
    fn delete(&self, path: &str) -> VfsResult<bool>;

    /// Read a file, then delete it.
    fn read_and_delete(&self, path: &str) -> VfsResult<Vec<u8>>;

    /// Move a file; the destination must not exist.
    fn move_file(&self, path: &str, new_path: &str) -> VfsResult<()>;

    /// Copy a file; the destination must not exist.
    fn copy_file(&self, path: &str, new_path: &str) -> VfsResult<()>;

    fn create_dir(&self, path: &str, options: Options) -> VfsResult<()>;

    /// Delete a directory. The root can never be deleted.
    fn delete_dir(&self, path: &str) -> VfsResult<()>;

    fn set_visibility(&self, path: &str, visibility: Visibility) -> VfsResult<()>;

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    fn get_mime_type(&self, path: &str) -> VfsResult<String> {
        Ok(self.get_metadata(path)?.mime_type)
    }

    fn get_timestamp(&self, path: &str) -> VfsResult<SystemTime> {
        Ok(self.get_metadata(path)?.timestamp)
    }

    fn get_file_size(&self, path: &str) -> VfsResult<u64> {
        Ok(self.get_metadata(path)?.size)
    }

    fn get_visibility(&self, path: &str) -> VfsResult<Visibility> {
        Ok(self.get_metadata(path)?.visibility)
    }
}
