use crate::error::VfsResult;
use crate::ops::FileSystem;
use crate::plugin::{Plugin, PluginArg, PluginValue, path_args};

/// Moves a file, replacing whatever is at the destination.
///
/// Args: `[Path, Path]`. A missing destination is fine; returns `Bool(true)`
/// once the move is done.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForceRename;

impl Plugin for ForceRename {
    fn method(&self) -> &str {
        "ForceRename"
    }

    #[tracing::instrument(skip(self, fs), name = "plugin.force_rename")]
    fn handle(&self, fs: &dyn FileSystem, args: &[PluginArg]) -> VfsResult<PluginValue> {
        let [from, to] = path_args::<2>(self.method(), args)?;
        super::clear_destination(fs, to)?;
        fs.move_file(from, to)?;
        Ok(PluginValue::Bool(true))
    }
}
