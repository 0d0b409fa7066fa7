//! Virtual filesystem abstraction.
//!
//! Application code talks to one uniform API while storage lives behind
//! pluggable backends. Key components:
//!
//! - [`FileSystem`] - Uniform operation set (also what plugins see)
//! - [`Adapter`] - Contract a storage backend implements
//! - [`Vfs`] - Facade over one adapter: path normalization, config
//!   layering, existence checks
//! - [`MountManager`] - Routes `prefix://subpath` paths to mounted
//!   filesystems
//! - [`PluginRegistry`] - Named compound operations, looked up at runtime
//! - [`MemoryAdapter`] - In-memory backend (scratch space, testing)
//!
//! ## Design Decisions
//!
//! - **Logical paths**: every path is normalized to a relative,
//!   slash-separated form; `..` may never climb above the root.
//! - **Layered config**: per-call options fall back to the filesystem's
//!   persistent config. `disableAsserts` turns off presence checks.
//! - **Blocking I/O**: streams are owned `Box<dyn Read + Send>` handles,
//!   released on drop.

pub mod adapter;
pub mod backends;
pub mod config;
mod error;
mod filesystem;
mod mount;
mod ops;
pub mod path;
pub mod plugin;
pub mod plugins;
mod types;

pub use adapter::{Adapter, ReadStream};
pub use backends::MemoryAdapter;
pub use config::{Config, Options};
pub use error::{VfsError, VfsResult};
pub use filesystem::Vfs;
pub use mount::{MountInfo, MountManager};
pub use ops::FileSystem;
pub use path::{VfsPath, normalize};
pub use plugin::{Plugin, PluginArg, PluginRegistry, PluginValue};
pub use types::{EntryKind, Metadata, Visibility};
