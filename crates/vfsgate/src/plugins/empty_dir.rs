use crate::error::VfsResult;
use crate::ops::FileSystem;
use crate::plugin::{Plugin, PluginArg, PluginValue, path_args};

/// Removes everything inside a directory, keeping the directory itself.
///
/// Args: `[Path]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDir;

/// Address a listed entry relative to the directory argument, so the result
/// stays routable when `dir` carries a mount prefix.
fn child_path(dir: &str, name: &str) -> String {
    if dir.is_empty() || dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

impl Plugin for EmptyDir {
    fn method(&self) -> &str {
        "EmptyDir"
    }

    #[tracing::instrument(skip(self, fs), name = "plugin.empty_dir")]
    fn handle(&self, fs: &dyn FileSystem, args: &[PluginArg]) -> VfsResult<PluginValue> {
        let [dir] = path_args::<1>(self.method(), args)?;
        for item in fs.list_contents(dir, false)? {
            let path = child_path(dir, item.path.file_name());
            if item.is_dir() {
                fs.delete_dir(&path)?;
            } else {
                fs.delete(&path)?;
            }
        }
        Ok(PluginValue::Unit)
    }
}
