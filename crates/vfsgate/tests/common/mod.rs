//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use vfsgate::{Adapter, Config, MemoryAdapter, Metadata, VfsPath, VfsResult, Visibility};

/// Install a test subscriber once. `RUST_LOG=vfsgate=debug` shows spans.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Wraps a [`MemoryAdapter`] and counts the calls the facade makes.
#[derive(Debug, Default)]
pub struct CountingAdapter {
    inner: MemoryAdapter,
    pub has_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
}

impl CountingAdapter {
    pub fn new(inner: MemoryAdapter) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn has_checks(&self) -> usize {
        self.has_calls.load(Ordering::SeqCst)
    }
}

impl Adapter for CountingAdapter {
    fn has(&self, path: &VfsPath) -> VfsResult<bool> {
        self.has_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.has(path)
    }

    fn read(&self, path: &VfsPath) -> VfsResult<Vec<u8>> {
        self.inner.read(path)
    }

    fn get_metadata(&self, path: &VfsPath) -> VfsResult<Metadata> {
        self.inner.get_metadata(path)
    }

    fn list_contents(&self, path: &VfsPath, recursive: bool) -> VfsResult<Vec<Metadata>> {
        self.inner.list_contents(path, recursive)
    }

    fn write(&self, path: &VfsPath, content: &[u8], config: &Config) -> VfsResult<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.write(path, content, config)
    }

    fn update(&self, path: &VfsPath, content: &[u8], config: &Config) -> VfsResult<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.update(path, content, config)
    }

    fn delete(&self, path: &VfsPath) -> VfsResult<bool> {
        self.inner.delete(path)
    }

    fn move_file(&self, from: &VfsPath, to: &VfsPath) -> VfsResult<()> {
        self.inner.move_file(from, to)
    }

    fn copy_file(&self, from: &VfsPath, to: &VfsPath) -> VfsResult<()> {
        self.inner.copy_file(from, to)
    }

    fn set_visibility(&self, path: &VfsPath, visibility: Visibility) -> VfsResult<()> {
        self.inner.set_visibility(path, visibility)
    }

    fn create_dir(&self, path: &VfsPath, config: &Config) -> VfsResult<()> {
        self.inner.create_dir(path, config)
    }

    fn delete_dir(&self, path: &VfsPath) -> VfsResult<()> {
        self.inner.delete_dir(path)
    }

    fn can_overwrite(&self) -> bool {
        self.inner.can_overwrite()
    }
}
