//! In-memory adapter.
//!
//! Used for scratch space and testing. All data is ephemeral.
//!
//! `write` creates or replaces: the facade is what enforces absence, so with
//! assertions disabled a second write simply wins.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::adapter::Adapter;
use crate::config::Config;
use crate::error::{VfsError, VfsResult};
use crate::path::VfsPath;
use crate::types::{Metadata, Visibility};

/// Entry in the memory filesystem.
#[derive(Debug, Clone)]
enum Entry {
    File {
        data: Vec<u8>,
        visibility: Visibility,
        mtime: SystemTime,
    },
    Dir {
        visibility: Visibility,
        mtime: SystemTime,
    },
}

impl Entry {
    fn dir(visibility: Visibility) -> Self {
        Entry::Dir {
            visibility,
            mtime: SystemTime::now(),
        }
    }

    fn metadata(&self, path: &VfsPath) -> Metadata {
        match self {
            Entry::File {
                data,
                visibility,
                mtime,
            } => Metadata::file(
                path.clone(),
                data.len() as u64,
                guess_mime(path),
                *visibility,
                *mtime,
            ),
            Entry::Dir { visibility, mtime } => Metadata::dir(path.clone(), *visibility, *mtime),
        }
    }
}

/// Mime type from the file extension.
fn guess_mime(path: &VfsPath) -> &'static str {
    let ext = path
        .file_name()
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "toml" => "application/toml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// In-memory adapter.
///
/// Thread-safe via internal `RwLock`. All data is lost when dropped.
#[derive(Debug)]
pub struct MemoryAdapter {
    entries: RwLock<BTreeMap<VfsPath, Entry>>,
    overwrite: bool,
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAdapter {
    /// Create a new empty in-memory adapter that supports in-place updates.
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        // Root directory always exists
        entries.insert(VfsPath::ROOT, Entry::dir(Visibility::Public));
        Self {
            entries: RwLock::new(entries),
            overwrite: true,
        }
    }

    /// Create an adapter that reports no overwrite support, so `put`
    /// always goes through `write`.
    pub fn without_overwrite() -> Self {
        Self {
            overwrite: false,
            ..Self::new()
        }
    }

    /// Number of stored entries, excluding the root.
    pub fn len(&self) -> usize {
        self.entries.read().len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ensure all parent directories of `path` exist.
    fn ensure_parents(entries: &mut BTreeMap<VfsPath, Entry>, path: &VfsPath) -> VfsResult<()> {
        let mut missing = Vec::new();
        let mut current = path.parent();
        while let Some(dir) = current {
            match entries.get(&dir) {
                Some(Entry::Dir { .. }) => break,
                Some(Entry::File { .. }) => {
                    return Err(VfsError::not_a_directory(dir.as_str()));
                }
                None => {
                    current = dir.parent();
                    missing.push(dir);
                }
            }
        }
        for dir in missing {
            entries.insert(dir, Entry::dir(Visibility::Public));
        }
        Ok(())
    }

    /// The root is neither a movable source nor a writable destination.
    fn check_transfer(from: &VfsPath, to: &VfsPath) -> VfsResult<()> {
        if from.is_root() {
            return Err(VfsError::permission_denied("cannot move or copy root"));
        }
        if to.is_root() {
            return Err(VfsError::permission_denied("cannot replace root"));
        }
        Ok(())
    }

    fn descendants(entries: &BTreeMap<VfsPath, Entry>, dir: &VfsPath) -> Vec<VfsPath> {
        entries
            .keys()
            .filter(|k| k.is_descendant_of(dir))
            .cloned()
            .collect()
    }
}

impl Adapter for MemoryAdapter {
    fn has(&self, path: &VfsPath) -> VfsResult<bool> {
        Ok(self.entries.read().contains_key(path))
    }

    fn read(&self, path: &VfsPath) -> VfsResult<Vec<u8>> {
        match self.entries.read().get(path) {
            Some(Entry::File { data, .. }) => Ok(data.clone()),
            Some(Entry::Dir { .. }) => Err(VfsError::unreadable_file(path.as_str())),
            None => Err(VfsError::file_not_found(path.as_str())),
        }
    }

    fn get_metadata(&self, path: &VfsPath) -> VfsResult<Metadata> {
        self.entries
            .read()
            .get(path)
            .map(|e| e.metadata(path))
            .ok_or_else(|| VfsError::file_not_found(path.as_str()))
    }

    fn list_contents(&self, path: &VfsPath, recursive: bool) -> VfsResult<Vec<Metadata>> {
        let entries = self.entries.read();
        match entries.get(path) {
            Some(Entry::Dir { .. }) => {}
            Some(Entry::File { .. }) => {
                return Err(VfsError::not_a_directory(path.as_str()));
            }
            None => return Err(VfsError::file_not_found(path.as_str())),
        }

        // BTreeMap order keeps the listing sorted.
        Ok(entries
            .iter()
            .filter(|(k, _)| {
                if recursive {
                    k.is_descendant_of(path)
                } else {
                    k.parent().as_ref() == Some(path)
                }
            })
            .map(|(k, e)| e.metadata(k))
            .collect())
    }

    fn write(&self, path: &VfsPath, content: &[u8], config: &Config) -> VfsResult<()> {
        let mut entries = self.entries.write();
        if let Some(Entry::Dir { .. }) = entries.get(path) {
            return Err(VfsError::file_exists(path.as_str()));
        }
        Self::ensure_parents(&mut entries, path)?;
        entries.insert(
            path.clone(),
            Entry::File {
                data: content.to_vec(),
                visibility: config.visibility().unwrap_or_default(),
                mtime: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn update(&self, path: &VfsPath, content: &[u8], config: &Config) -> VfsResult<()> {
        let mut entries = self.entries.write();
        match entries.get_mut(path) {
            Some(Entry::File {
                data,
                visibility,
                mtime,
            }) => {
                *data = content.to_vec();
                *mtime = SystemTime::now();
                if let Some(v) = config.visibility() {
                    *visibility = v;
                }
                Ok(())
            }
            Some(Entry::Dir { .. }) => Err(VfsError::is_a_directory(path.as_str())),
            None => Err(VfsError::file_not_found(path.as_str())),
        }
    }

    fn delete(&self, path: &VfsPath) -> VfsResult<bool> {
        let mut entries = self.entries.write();
        match entries.get(path) {
            Some(Entry::File { .. }) => {
                entries.remove(path);
                Ok(true)
            }
            Some(Entry::Dir { .. }) => Err(VfsError::is_a_directory(path.as_str())),
            None => Ok(false),
        }
    }

    fn move_file(&self, from: &VfsPath, to: &VfsPath) -> VfsResult<()> {
        Self::check_transfer(from, to)?;
        if to.is_descendant_of(from) {
            return Err(VfsError::invalid_path(format!(
                "cannot move {from} into its own subtree {to}"
            )));
        }
        let mut entries = self.entries.write();
        if !entries.contains_key(from) {
            return Err(VfsError::file_not_found(from.as_str()));
        }
        Self::ensure_parents(&mut entries, to)?;

        // Directories carry their children along.
        for child in Self::descendants(&entries, from) {
            let Some(relative) = child
                .strip_prefix(from.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
            else {
                continue;
            };
            let target = to.join(relative)?;
            if let Some(child_entry) = entries.remove(&child) {
                entries.insert(target, child_entry);
            }
        }
        if let Some(entry) = entries.remove(from) {
            entries.insert(to.clone(), entry);
        }
        Ok(())
    }

    fn copy_file(&self, from: &VfsPath, to: &VfsPath) -> VfsResult<()> {
        Self::check_transfer(from, to)?;
        let mut entries = self.entries.write();
        let entry = match entries.get(from) {
            Some(entry @ Entry::File { .. }) => entry.clone(),
            Some(Entry::Dir { .. }) => {
                return Err(VfsError::is_a_directory(from.as_str()));
            }
            None => return Err(VfsError::file_not_found(from.as_str())),
        };
        Self::ensure_parents(&mut entries, to)?;
        entries.insert(to.clone(), entry);
        Ok(())
    }

    fn set_visibility(&self, path: &VfsPath, new: Visibility) -> VfsResult<()> {
        match self.entries.write().get_mut(path) {
            Some(Entry::File { visibility, .. }) | Some(Entry::Dir { visibility, .. }) => {
                *visibility = new;
                Ok(())
            }
            None => Err(VfsError::file_not_found(path.as_str())),
        }
    }

    fn create_dir(&self, path: &VfsPath, config: &Config) -> VfsResult<()> {
        let mut entries = self.entries.write();
        match entries.get(path) {
            Some(Entry::Dir { .. }) => return Ok(()),
            Some(Entry::File { .. }) => return Err(VfsError::file_exists(path.as_str())),
            None => {}
        }
        Self::ensure_parents(&mut entries, path)?;
        entries.insert(
            path.clone(),
            Entry::dir(config.visibility().unwrap_or_default()),
        );
        Ok(())
    }

    fn delete_dir(&self, path: &VfsPath) -> VfsResult<()> {
        if path.is_root() {
            return Err(VfsError::permission_denied("cannot remove root"));
        }
        let mut entries = self.entries.write();
        match entries.get(path) {
            Some(Entry::Dir { .. }) => {}
            Some(Entry::File { .. }) => {
                return Err(VfsError::not_a_directory(path.as_str()));
            }
            None => return Err(VfsError::file_not_found(path.as_str())),
        }
        for child in Self::descendants(&entries, path) {
            entries.remove(&child);
        }
        entries.remove(path);
        Ok(())
    }

    fn can_overwrite(&self) -> bool {
        self.overwrite
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> VfsPath {
        VfsPath::new(s).unwrap()
    }

    #[test]
    fn test_write_and_read() {
        let fs = MemoryAdapter::new();
        fs.write(&p("test.txt"), b"hello world", &Config::new()).unwrap();
        assert_eq!(fs.read(&p("test.txt")).unwrap(), b"hello world");
        assert!(fs.has(&p("test.txt")).unwrap());
        assert_eq!(fs.len(), 1);
    }

    #[test]
    fn test_auto_create_parents() {
        let fs = MemoryAdapter::new();
        fs.write(&p("a/b/c/file.txt"), b"", &Config::new()).unwrap();

        assert!(fs.get_metadata(&p("a")).unwrap().is_dir());
        assert!(fs.get_metadata(&p("a/b")).unwrap().is_dir());
        assert!(fs.get_metadata(&p("a/b/c")).unwrap().is_dir());
    }

    #[test]
    fn test_file_in_place_of_parent() {
        let fs = MemoryAdapter::new();
        fs.write(&p("a"), b"", &Config::new()).unwrap();
        assert!(fs.write(&p("a/b"), b"", &Config::new()).is_err());
    }

    #[test]
    fn test_delete_reports_removal() {
        let fs = MemoryAdapter::new();
        fs.write(&p("x"), b"", &Config::new()).unwrap();
        assert!(fs.delete(&p("x")).unwrap());
        assert!(!fs.delete(&p("x")).unwrap());
    }

    #[test]
    fn test_move_directory() {
        let fs = MemoryAdapter::new();
        fs.write(&p("old/one"), b"1", &Config::new()).unwrap();
        fs.write(&p("old/sub/two"), b"2", &Config::new()).unwrap();

        fs.move_file(&p("old"), &p("new")).unwrap();

        assert!(!fs.has(&p("old")).unwrap());
        assert!(!fs.has(&p("old/one")).unwrap());
        assert_eq!(fs.read(&p("new/one")).unwrap(), b"1");
        assert_eq!(fs.read(&p("new/sub/two")).unwrap(), b"2");
    }

    #[test]
    fn test_move_keeps_multibyte_names() {
        let fs = MemoryAdapter::new();
        fs.write(&p("src/é.txt"), b"e", &Config::new()).unwrap();
        fs.write(&p("src/abc.txt"), b"a", &Config::new()).unwrap();

        fs.move_file(&p("src"), &p("dst")).unwrap();

        assert_eq!(fs.read(&p("dst/é.txt")).unwrap(), b"e");
        assert_eq!(fs.read(&p("dst/abc.txt")).unwrap(), b"a");
    }

    #[test]
    fn test_root_is_not_a_transfer_endpoint() {
        let fs = MemoryAdapter::new();
        fs.write(&p("a.txt"), b"a", &Config::new()).unwrap();

        for result in [
            fs.move_file(&VfsPath::ROOT, &p("dst")),
            fs.move_file(&p("a.txt"), &VfsPath::ROOT),
            fs.copy_file(&p("a.txt"), &VfsPath::ROOT),
        ] {
            assert!(matches!(result, Err(VfsError::PermissionDenied(_))));
        }
        assert!(fs.get_metadata(&VfsPath::ROOT).unwrap().is_dir());
        assert_eq!(fs.read(&p("a.txt")).unwrap(), b"a");
    }

    #[test]
    fn test_move_into_own_subtree() {
        let fs = MemoryAdapter::new();
        fs.write(&p("a/f"), b"", &Config::new()).unwrap();

        let err = fs.move_file(&p("a"), &p("a/b")).unwrap_err();
        assert!(matches!(err, VfsError::InvalidPath(_)));
        assert!(fs.has(&p("a/f")).unwrap());
    }

    #[test]
    fn test_directory_errors() {
        let fs = MemoryAdapter::new();
        fs.write(&p("f"), b"", &Config::new()).unwrap();
        fs.create_dir(&p("d"), &Config::new()).unwrap();

        assert!(matches!(fs.delete(&p("d")), Err(VfsError::IsADirectory(_))));
        assert!(matches!(
            fs.list_contents(&p("f"), false),
            Err(VfsError::NotADirectory(_))
        ));
        assert!(matches!(
            fs.write(&p("f/x"), b"", &Config::new()),
            Err(VfsError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_copy_rejects_directories() {
        let fs = MemoryAdapter::new();
        fs.create_dir(&p("d"), &Config::new()).unwrap();
        assert!(fs.copy_file(&p("d"), &p("e")).is_err());
    }

    #[test]
    fn test_create_dir_idempotent() {
        let fs = MemoryAdapter::new();
        fs.create_dir(&p("d"), &Config::new()).unwrap();
        fs.create_dir(&p("d"), &Config::new()).unwrap();
        fs.write(&p("f"), b"", &Config::new()).unwrap();
        assert!(fs.create_dir(&p("f"), &Config::new()).unwrap_err().is_file_exists());
    }

    #[test]
    fn test_delete_dir_recursive() {
        let fs = MemoryAdapter::new();
        fs.write(&p("d/a"), b"", &Config::new()).unwrap();
        fs.write(&p("d/e/b"), b"", &Config::new()).unwrap();
        fs.write(&p("keep"), b"", &Config::new()).unwrap();

        fs.delete_dir(&p("d")).unwrap();
        assert_eq!(fs.len(), 1);
        assert!(fs.delete_dir(&VfsPath::ROOT).is_err());
    }

    #[test]
    fn test_list_root() {
        let fs = MemoryAdapter::new();
        fs.write(&p("b.txt"), b"", &Config::new()).unwrap();
        fs.write(&p("a/c.txt"), b"", &Config::new()).unwrap();

        let names: Vec<_> = fs
            .list_contents(&VfsPath::ROOT, false)
            .unwrap()
            .into_iter()
            .map(|m| m.path.to_string())
            .collect();
        assert_eq!(names, vec!["a", "b.txt"]);

        assert_eq!(fs.list_contents(&VfsPath::ROOT, true).unwrap().len(), 3);
        assert!(fs.list_contents(&p("missing"), false).unwrap_err().is_file_not_found());
    }

    #[test]
    fn test_mime_guess() {
        assert_eq!(guess_mime(&p("x/readme.MD")), "text/markdown");
        assert_eq!(guess_mime(&p("data.json")), "application/json");
        assert_eq!(guess_mime(&p("noext")), "application/octet-stream");
    }

    #[test]
    fn test_overwrite_flag() {
        assert!(MemoryAdapter::new().can_overwrite());
        assert!(!MemoryAdapter::without_overwrite().can_overwrite());
    }
}
