//! Mount manager with `prefix://subpath` routing.
//!
//! Routes filesystem operations to the filesystem mounted under the path's
//! prefix. Move and copy between two different filesystems are synthesized
//! by streaming the source into the destination.

use parking_lot::RwLock;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

use crate::adapter::ReadStream;
use crate::config::Options;
use crate::error::{VfsError, VfsResult};
use crate::ops::FileSystem;
use crate::types::{Metadata, Visibility};

static MOUNT_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+)://").expect("static regex"));

static PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+$").expect("static regex"));

/// Information about a mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// The mount prefix (e.g., "local").
    pub prefix: String,
}

/// Routes filesystem operations to mounted filesystems.
///
/// A path like `local://docs/readme.md` goes to whatever is mounted under
/// `local`, which receives `docs/readme.md` untouched.
pub struct MountManager {
    /// Mounted filesystems, keyed by prefix.
    mounts: RwLock<BTreeMap<String, Arc<dyn FileSystem>>>,
}

impl std::fmt::Debug for MountManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountManager")
            .field("prefixes", &self.mounts.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for MountManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MountManager {
    /// Create a new empty mount manager.
    pub fn new() -> Self {
        Self {
            mounts: RwLock::new(BTreeMap::new()),
        }
    }

    /// Mount a filesystem under `prefix`.
    pub fn mount(&self, prefix: &str, fs: impl FileSystem + 'static) -> VfsResult<()> {
        self.mount_arc(prefix, Arc::new(fs))
    }

    /// Mount a filesystem (already wrapped in Arc) under `prefix`.
    ///
    /// The same filesystem may be mounted under several prefixes.
    pub fn mount_arc(&self, prefix: &str, fs: Arc<dyn FileSystem>) -> VfsResult<()> {
        if !PREFIX.is_match(prefix) {
            return Err(VfsError::invalid_argument(format!(
                "mount prefix must be lowercase ascii letters, got {prefix:?}"
            )));
        }
        let mut mounts = self.mounts.write();
        if mounts.contains_key(prefix) {
            return Err(VfsError::mount_exists(prefix));
        }
        mounts.insert(prefix.to_string(), fs);
        debug!("mounted {}://", prefix);
        Ok(())
    }

    /// Unmount the filesystem under `prefix`.
    pub fn unmount(&self, prefix: &str) -> VfsResult<()> {
        match self.mounts.write().remove(prefix) {
            Some(_) => {
                debug!("unmounted {}://", prefix);
                Ok(())
            }
            None => Err(VfsError::mount_not_found(prefix)),
        }
    }

    /// List all current mounts, sorted by prefix.
    pub fn list_mounts(&self) -> Vec<MountInfo> {
        self.mounts
            .read()
            .keys()
            .map(|prefix| MountInfo {
                prefix: prefix.clone(),
            })
            .collect()
    }

    pub fn is_mounted(&self, prefix: &str) -> bool {
        self.mounts.read().contains_key(prefix)
    }

    /// The filesystem mounted under `prefix`.
    pub fn filesystem(&self, prefix: &str) -> VfsResult<Arc<dyn FileSystem>> {
        self.mounts
            .read()
            .get(prefix)
            .cloned()
            .ok_or_else(|| VfsError::mount_not_found(prefix))
    }

    /// Find the filesystem for a mounted path.
    ///
    /// Returns the filesystem and the subpath after `://`. The table lock is
    /// released before returning.
    fn resolve<'p>(&self, path: &'p str) -> VfsResult<(Arc<dyn FileSystem>, &'p str)> {
        let caps = MOUNT_PATH.captures(path).ok_or_else(|| {
            VfsError::invalid_path(format!("{path} does not match prefix://subpath"))
        })?;
        let (prefix, whole) = match (caps.get(1), caps.get(0)) {
            (Some(prefix), Some(whole)) => (prefix.as_str(), whole),
            _ => return Err(VfsError::invalid_path(path)),
        };
        let fs = self.filesystem(prefix)?;
        Ok((fs, &path[whole.end()..]))
    }

    /// Stream `from` on `src` into `to` on `dst`.
    fn stream_across(
        src: &dyn FileSystem,
        from: &str,
        dst: &dyn FileSystem,
        to: &str,
    ) -> VfsResult<()> {
        let mut stream = src.read_stream(from)?;
        dst.write_stream(to, &mut stream, Options::new())
    }
}

fn same_instance(a: &Arc<dyn FileSystem>, b: &Arc<dyn FileSystem>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl FileSystem for MountManager {
    fn has(&self, path: &str) -> VfsResult<bool> {
        let (fs, sub) = self.resolve(path)?;
        fs.has(sub)
    }

    fn read(&self, path: &str) -> VfsResult<Vec<u8>> {
        let (fs, sub) = self.resolve(path)?;
        fs.read(sub)
    }

    fn read_stream(&self, path: &str) -> VfsResult<ReadStream> {
        let (fs, sub) = self.resolve(path)?;
        fs.read_stream(sub)
    }

    fn get_metadata(&self, path: &str) -> VfsResult<Metadata> {
        let (fs, sub) = self.resolve(path)?;
        fs.get_metadata(sub)
    }

    fn get_mime_type(&self, path: &str) -> VfsResult<String> {
        let (fs, sub) = self.resolve(path)?;
        fs.get_mime_type(sub)
    }

    fn get_timestamp(&self, path: &str) -> VfsResult<std::time::SystemTime> {
        let (fs, sub) = self.resolve(path)?;
        fs.get_timestamp(sub)
    }

    fn get_file_size(&self, path: &str) -> VfsResult<u64> {
        let (fs, sub) = self.resolve(path)?;
        fs.get_file_size(sub)
    }

    fn get_visibility(&self, path: &str) -> VfsResult<Visibility> {
        let (fs, sub) = self.resolve(path)?;
        fs.get_visibility(sub)
    }

    fn list_contents(&self, path: &str, recursive: bool) -> VfsResult<Vec<Metadata>> {
        let (fs, sub) = self.resolve(path)?;
        fs.list_contents(sub, recursive)
    }

    fn write(&self, path: &str, content: &[u8], options: Options) -> VfsResult<()> {
        let (fs, sub) = self.resolve(path)?;
        fs.write(sub, content, options)
    }

    fn write_stream(&self, path: &str, reader: &mut dyn Read, options: Options) -> VfsResult<()> {
        let (fs, sub) = self.resolve(path)?;
        fs.write_stream(sub, reader, options)
    }

    fn update(&self, path: &str, content: &[u8], options: Options) -> VfsResult<()> {
        let (fs, sub) = self.resolve(path)?;
        fs.update(sub, content, options)
    }

    fn update_stream(
        &self,
        path: &str,
        reader: &mut dyn Read,
        options: Options,
    ) -> VfsResult<()> {
        let (fs, sub) = self.resolve(path)?;
        fs.update_stream(sub, reader, options)
    }

    fn put(&self, path: &str, content: &[u8], options: Options) -> VfsResult<()> {
        let (fs, sub) = self.resolve(path)?;
        fs.put(sub, content, options)
    }

    fn put_stream(&self, path: &str, reader: &mut dyn Read, options: Options) -> VfsResult<()> {
        let (fs, sub) = self.resolve(path)?;
        fs.put_stream(sub, reader, options)
    }

    fn delete(&self, path: &str) -> VfsResult<bool> {
        let (fs, sub) = self.resolve(path)?;
        fs.delete(sub)
    }

    fn read_and_delete(&self, path: &str) -> VfsResult<Vec<u8>> {
        let (fs, sub) = self.resolve(path)?;
        fs.read_and_delete(sub)
    }

    #[tracing::instrument(skip(self), name = "mount.move_file")]
    fn move_file(&self, path: &str, new_path: &str) -> VfsResult<()> {
        let (src, from) = self.resolve(path)?;
        let (dst, to) = self.resolve(new_path)?;

        if same_instance(&src, &dst) {
            return src.move_file(from, to);
        }

        debug!("streaming {} across mounts to {}", path, new_path);
        if let Err(e) = Self::stream_across(src.as_ref(), from, dst.as_ref(), to) {
            warn!("move of {} to {} failed, source kept: {}", path, new_path, e);
            return Err(e);
        }
        src.delete(from)?;
        Ok(())
    }

    #[tracing::instrument(skip(self), name = "mount.copy_file")]
    fn copy_file(&self, path: &str, new_path: &str) -> VfsResult<()> {
        let (src, from) = self.resolve(path)?;
        let (dst, to) = self.resolve(new_path)?;

        if same_instance(&src, &dst) {
            return src.copy_file(from, to);
        }

        debug!("streaming {} across mounts to {}", path, new_path);
        Self::stream_across(src.as_ref(), from, dst.as_ref(), to)
    }

    fn create_dir(&self, path: &str, options: Options) -> VfsResult<()> {
        let (fs, sub) = self.resolve(path)?;
        fs.create_dir(sub, options)
    }

    fn delete_dir(&self, path: &str) -> VfsResult<()> {
        let (fs, sub) = self.resolve(path)?;
        fs.delete_dir(sub)
    }

    fn set_visibility(&self, path: &str, visibility: Visibility) -> VfsResult<()> {
        let (fs, sub) = self.resolve(path)?;
        fs.set_visibility(sub, visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryAdapter;
    use crate::filesystem::Vfs;

    fn memory_with(path: &str, content: &[u8]) -> Vfs<MemoryAdapter> {
        let fs = Vfs::new(MemoryAdapter::new());
        fs.write(path, content, Options::new()).unwrap();
        fs
    }

    #[test]
    fn test_basic_mount() {
        let manager = MountManager::new();
        manager.mount("scratch", memory_with("test.txt", b"hello")).unwrap();

        assert_eq!(manager.read("scratch://test.txt").unwrap(), b"hello");
        assert!(manager.has("scratch://test.txt").unwrap());
    }

    #[test]
    fn test_multiple_mounts() {
        let manager = MountManager::new();
        manager.mount("scratch", memory_with("a.txt", b"scratch")).unwrap();
        manager.mount("data", memory_with("b.txt", b"data")).unwrap();

        assert_eq!(manager.read("scratch://a.txt").unwrap(), b"scratch");
        assert_eq!(manager.read("data://b.txt").unwrap(), b"data");
        assert!(!manager.has("data://a.txt").unwrap());
    }

    #[test]
    fn test_duplicate_mount() {
        let manager = MountManager::new();
        manager.mount("a", Vfs::new(MemoryAdapter::new())).unwrap();
        let err = manager.mount("a", Vfs::new(MemoryAdapter::new())).unwrap_err();
        assert!(matches!(err, VfsError::MountExists(ref p) if p == "a"));
    }

    #[test]
    fn test_bad_prefix_rejected() {
        let manager = MountManager::new();
        for prefix in ["", "Local", "s3", "a-b"] {
            assert!(
                manager.mount(prefix, Vfs::new(MemoryAdapter::new())).is_err(),
                "{prefix:?}"
            );
        }
    }

    #[test]
    fn test_unmount() {
        let manager = MountManager::new();
        manager.mount("temp", Vfs::new(MemoryAdapter::new())).unwrap();
        assert!(manager.is_mounted("temp"));

        manager.unmount("temp").unwrap();
        assert!(!manager.is_mounted("temp"));
        assert!(matches!(
            manager.unmount("temp"),
            Err(VfsError::MountNotFound(_))
        ));
        assert!(matches!(
            manager.has("temp://x"),
            Err(VfsError::MountNotFound(_))
        ));
    }

    #[test]
    fn test_list_mounts() {
        let manager = MountManager::new();
        manager.mount("zeta", Vfs::new(MemoryAdapter::new())).unwrap();
        manager.mount("alpha", Vfs::new(MemoryAdapter::new())).unwrap();

        let prefixes: Vec<_> = manager.list_mounts().into_iter().map(|m| m.prefix).collect();
        assert_eq!(prefixes, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_malformed_paths() {
        let manager = MountManager::new();
        manager.mount("local", Vfs::new(MemoryAdapter::new())).unwrap();

        for path in ["local:/x", "x", "LOCAL://x", "://x", "1://x"] {
            assert!(
                matches!(manager.has(path), Err(VfsError::InvalidPath(_))),
                "{path}"
            );
        }
    }

    #[test]
    fn test_write_through_manager() {
        let manager = MountManager::new();
        let fs: Arc<Vfs<MemoryAdapter>> = Arc::new(Vfs::new(MemoryAdapter::new()));
        manager.mount_arc("scratch", fs.clone()).unwrap();

        manager
            .write("scratch://dir/new.txt", b"created", Options::new())
            .unwrap();

        // Subpath reaches the mounted filesystem untouched.
        assert_eq!(fs.read("dir/new.txt").unwrap(), b"created");

        let listed: Vec<_> = manager
            .list_contents("scratch://dir", false)
            .unwrap()
            .into_iter()
            .map(|m| m.path.to_string())
            .collect();
        assert_eq!(listed, vec!["dir/new.txt"]);
    }

    #[test]
    fn test_cross_mount_move() {
        let manager = MountManager::new();
        let a: Arc<Vfs<MemoryAdapter>> = Arc::new(memory_with("x.txt", b"payload"));
        let b: Arc<Vfs<MemoryAdapter>> = Arc::new(Vfs::new(MemoryAdapter::new()));
        manager.mount_arc("a", a.clone()).unwrap();
        manager.mount_arc("b", b.clone()).unwrap();

        manager.move_file("a://x.txt", "b://y.txt").unwrap();

        assert!(!a.has("x.txt").unwrap());
        assert_eq!(b.read("y.txt").unwrap(), b"payload");
    }

    #[test]
    fn test_cross_mount_move_keeps_source_on_failure() {
        let manager = MountManager::new();
        let a: Arc<Vfs<MemoryAdapter>> = Arc::new(memory_with("x.txt", b"payload"));
        let b: Arc<Vfs<MemoryAdapter>> = Arc::new(memory_with("y.txt", b"taken"));
        manager.mount_arc("a", a.clone()).unwrap();
        manager.mount_arc("b", b.clone()).unwrap();

        let err = manager.move_file("a://x.txt", "b://y.txt").unwrap_err();
        assert!(err.is_file_exists());
        assert_eq!(a.read("x.txt").unwrap(), b"payload");
        assert_eq!(b.read("y.txt").unwrap(), b"taken");
    }

    #[test]
    fn test_cross_mount_copy() {
        let manager = MountManager::new();
        manager.mount("a", memory_with("x.txt", b"payload")).unwrap();
        manager.mount("b", Vfs::new(MemoryAdapter::new())).unwrap();

        manager.copy_file("a://x.txt", "b://x.txt").unwrap();

        assert_eq!(manager.read("a://x.txt").unwrap(), b"payload");
        assert_eq!(manager.read("b://x.txt").unwrap(), b"payload");
    }

    #[test]
    fn test_same_instance_under_two_prefixes() {
        let manager = MountManager::new();
        let fs: Arc<Vfs<MemoryAdapter>> = Arc::new(memory_with("old/f", b"data"));
        manager.mount_arc("one", fs.clone()).unwrap();
        manager.mount_arc("two", fs.clone()).unwrap();

        manager.move_file("one://old", "two://new").unwrap();

        // A directory move only works through the native path.
        assert_eq!(fs.read("new/f").unwrap(), b"data");
        assert!(!fs.has("old/f").unwrap());
    }

    #[test]
    fn test_nested_manager() {
        let inner = MountManager::new();
        inner.mount("mem", memory_with("f", b"deep")).unwrap();

        let outer = MountManager::new();
        outer.mount("outer", inner).unwrap();

        assert_eq!(outer.read("outer://mem://f").unwrap(), b"deep");
    }

    #[test]
    fn test_concurrent_mount_and_dispatch() {
        let manager = MountManager::new();
        manager.mount("stable", memory_with("f", b"steady")).unwrap();

        std::thread::scope(|scope| {
            for t in 0..4 {
                let manager = &manager;
                scope.spawn(move || {
                    let prefix = ["alpha", "beta", "gamma", "delta"][t];
                    for _ in 0..50 {
                        manager.mount(prefix, Vfs::new(MemoryAdapter::new())).unwrap();
                        assert!(manager.is_mounted(prefix));
                        manager.unmount(prefix).unwrap();
                    }
                });
            }
            for _ in 0..4 {
                let manager = &manager;
                scope.spawn(move || {
                    for _ in 0..200 {
                        assert_eq!(manager.read("stable://f").unwrap(), b"steady");
                        assert!(manager.list_mounts().iter().any(|m| m.prefix == "stable"));
                    }
                });
            }
        });

        assert_eq!(manager.list_mounts().len(), 1);
    }
}
