//! VFS error types.

use std::io;
use thiserror::Error;

/// VFS error type.
///
/// Variants carry the offending path, prefix or method name, so callers
/// never need extra context to act on them.
#[derive(Debug, Error)]
pub enum VfsError {
    /// Path escapes the logical root, or a mounted path has no valid
    /// `prefix://` form.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// File or directory not found.
    #[error("file not found at path: {0}")]
    FileNotFound(String),

    /// Path already exists.
    #[error("file already exists at path: {0}")]
    FileExists(String),

    /// No filesystem mounted under the prefix.
    #[error("mount prefix {0} does not exist")]
    MountNotFound(String),

    /// A filesystem is already mounted under the prefix.
    #[error("mount prefix {0} already exists")]
    MountExists(String),

    /// No plugin registered for the method.
    #[error("no plugin found for method {0}")]
    PluginNotFound(String),

    /// Backend encountered a symbolic link.
    #[error("links are not supported, encountered link at {0}")]
    LinkNotSupported(String),

    /// Backend cannot read the path.
    #[error("unreadable file encountered at path: {0}")]
    UnreadableFile(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Expected a file.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Permission denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Plugin arguments did not match what the plugin expects.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl VfsError {
    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Create a FileNotFound error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound(path.into())
    }

    /// Create a FileExists error.
    pub fn file_exists(path: impl Into<String>) -> Self {
        Self::FileExists(path.into())
    }

    /// Create a MountNotFound error.
    pub fn mount_not_found(prefix: impl Into<String>) -> Self {
        Self::MountNotFound(prefix.into())
    }

    /// Create a MountExists error.
    pub fn mount_exists(prefix: impl Into<String>) -> Self {
        Self::MountExists(prefix.into())
    }

    /// Create a PluginNotFound error.
    pub fn plugin_not_found(method: impl Into<String>) -> Self {
        Self::PluginNotFound(method.into())
    }

    /// Create a LinkNotSupported error.
    pub fn link_not_supported(path: impl Into<String>) -> Self {
        Self::LinkNotSupported(path.into())
    }

    /// Create an UnreadableFile error.
    pub fn unreadable_file(path: impl Into<String>) -> Self {
        Self::UnreadableFile(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Create a PermissionDenied error.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create an InvalidArgument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an Other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns true for [`VfsError::FileNotFound`].
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound(_))
    }

    /// Returns true for [`VfsError::FileExists`].
    pub fn is_file_exists(&self) -> bool {
        matches!(self, Self::FileExists(_))
    }

    /// The path this error is about, for the path-carrying variants.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::InvalidPath(p)
            | Self::FileNotFound(p)
            | Self::FileExists(p)
            | Self::LinkNotSupported(p)
            | Self::UnreadableFile(p)
            | Self::NotADirectory(p)
            | Self::IsADirectory(p) => Some(p),
            _ => None,
        }
    }
}

/// Convert VfsError to std::io::Error for stream interop.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::FileNotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::FileExists(msg) => io::Error::new(io::ErrorKind::AlreadyExists, msg),
            VfsError::PermissionDenied(msg) => {
                io::Error::new(io::ErrorKind::PermissionDenied, msg)
            }
            VfsError::UnreadableFile(msg) => {
                io::Error::new(io::ErrorKind::PermissionDenied, msg)
            }
            VfsError::NotADirectory(msg) => io::Error::new(io::ErrorKind::NotADirectory, msg),
            VfsError::IsADirectory(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            VfsError::InvalidPath(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            VfsError::InvalidArgument(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            VfsError::MountNotFound(prefix) => io::Error::new(io::ErrorKind::NotFound, prefix),
            VfsError::Io(e) => e,
            other => io::Error::other(other.to_string()),
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        let err = VfsError::file_not_found("a/b.txt");
        assert!(err.is_file_not_found());
        assert!(!err.is_file_exists());
        assert_eq!(err.path(), Some("a/b.txt"));

        let err = VfsError::mount_exists("local");
        assert_eq!(err.path(), None);
        assert_eq!(err.to_string(), "mount prefix local already exists");
    }

    #[test]
    fn test_into_io_error() {
        let io_err: io::Error = VfsError::file_exists("x").into();
        assert_eq!(io_err.kind(), io::ErrorKind::AlreadyExists);

        let io_err: io::Error = VfsError::is_a_directory("d").into();
        assert_eq!(io_err.kind(), io::ErrorKind::IsADirectory);

        let io_err: io::Error = VfsError::plugin_not_found("Nope").into();
        assert_eq!(io_err.kind(), io::ErrorKind::Other);
        assert!(io_err.to_string().contains("Nope"));
    }
}
