//! Storage backend contract.
//!
//! An [`Adapter`] is what a concrete backend (memory, disk, object store)
//! implements. Adapters only ever see normalized [`VfsPath`]s and fully
//! resolved [`Config`]s; presence/absence invariants are enforced by the
//! facade before an adapter is called.

use std::io::{Cursor, Read};
use std::time::SystemTime;

use crate::config::Config;
use crate::error::VfsResult;
use crate::path::VfsPath;
use crate::types::{Metadata, Visibility};

/// Owned read handle. Dropping it releases the underlying resource.
pub type ReadStream = Box<dyn Read + Send>;

/// Capability set a storage backend implements.
pub trait Adapter: Send + Sync {
    // ========================================================================
    // Reading
    // ========================================================================

    /// Check whether a file or directory exists.
    fn has(&self, path: &VfsPath) -> VfsResult<bool>;

    /// Read an entire file.
    fn read(&self, path: &VfsPath) -> VfsResult<Vec<u8>>;

    /// Open a file for streaming reads.
    ///
    /// The default buffers the whole file through [`Adapter::read`].
    fn read_stream(&self, path: &VfsPath) -> VfsResult<ReadStream> {
        Ok(Box::new(Cursor::new(self.read(path)?)))
    }

    /// Fetch metadata for a single entry.
    fn get_metadata(&self, path: &VfsPath) -> VfsResult<Metadata>;

    fn get_mime_type(&self, path: &VfsPath) -> VfsResult<String> {
        Ok(self.get_metadata(path)?.mime_type)
    }

    fn get_timestamp(&self, path: &VfsPath) -> VfsResult<SystemTime> {
        Ok(self.get_metadata(path)?.timestamp)
    }

    fn get_file_size(&self, path: &VfsPath) -> VfsResult<u64> {
        Ok(self.get_metadata(path)?.size)
    }

    fn get_visibility(&self, path: &VfsPath) -> VfsResult<Visibility> {
        Ok(self.get_metadata(path)?.visibility)
    }

    /// List a directory, optionally descending into subdirectories.
    fn list_contents(&self, path: &VfsPath, recursive: bool) -> VfsResult<Vec<Metadata>>;

    // ========================================================================
    // Writing
    // ========================================================================

    /// Write a new file.
    fn write(&self, path: &VfsPath, content: &[u8], config: &Config) -> VfsResult<()>;

    /// Write a new file from a reader.
    ///
    /// The default drains the reader and calls [`Adapter::write`].
    fn write_stream(&self, path: &VfsPath, reader: &mut dyn Read, config: &Config) -> VfsResult<()> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.write(path, &buf, config)
    }

    /// Replace the content of an existing file.
    fn update(&self, path: &VfsPath, content: &[u8], config: &Config) -> VfsResult<()>;

    /// Replace the content of an existing file from a reader.
    fn update_stream(
        &self,
        path: &VfsPath,
        reader: &mut dyn Read,
        config: &Config,
    ) -> VfsResult<()> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.update(path, &buf, config)
    }

    /// Delete a file. Returns whether anything was removed.
    fn delete(&self, path: &VfsPath) -> VfsResult<bool>;

    /// Move a file within this backend.
    fn move_file(&self, from: &VfsPath, to: &VfsPath) -> VfsResult<()>;

    /// Copy a file within this backend.
    fn copy_file(&self, from: &VfsPath, to: &VfsPath) -> VfsResult<()>;

    fn set_visibility(&self, path: &VfsPath, visibility: Visibility) -> VfsResult<()>;

    /// Create a directory (and any missing parents).
    fn create_dir(&self, path: &VfsPath, config: &Config) -> VfsResult<()>;

    /// Delete a directory and everything below it.
    fn delete_dir(&self, path: &VfsPath) -> VfsResult<()>;

    // ========================================================================
    // Capabilities
    // ========================================================================

    /// Whether `update` may be used to overwrite an existing file in place.
    fn can_overwrite(&self) -> bool;
}
