//! Built-in plugins.
//!
//! Compound operations written purely against [`FileSystem`](crate::FileSystem),
//! so they run on a single [`Vfs`](crate::Vfs) or through a
//! [`MountManager`](crate::MountManager) alike.

mod empty_dir;
mod force_copy;
mod force_rename;

pub use empty_dir::EmptyDir;
pub use force_copy::ForceCopy;
pub use force_rename::ForceRename;

use crate::error::VfsResult;
use crate::ops::FileSystem;
use crate::plugin::PluginRegistry;

/// Register every built-in plugin.
pub fn register_all(registry: &PluginRegistry) {
    registry.add_plugin(EmptyDir);
    registry.add_plugin(ForceCopy);
    registry.add_plugin(ForceRename);
}

/// Delete `path` if it is there. A missing file counts as cleared, whether
/// the filesystem reports it as an error or as `Ok(false)`.
fn clear_destination(fs: &dyn FileSystem, path: &str) -> VfsResult<()> {
    match fs.delete(path) {
        Ok(_) => Ok(()),
        Err(e) if e.is_file_not_found() => Ok(()),
        Err(e) => Err(e),
    }
}
