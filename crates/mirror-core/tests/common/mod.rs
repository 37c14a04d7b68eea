//! In-memory filesystem primitives for executor and engine tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use mirror_core::sync::EntryPrimitives;
use mirror_core::{Item, SyncIndex, SyncMode, SyncPlan, compute_plan, execute, ExecOptions};
use mirror_fs::{DirectoryLinkKind, NormalizedPath};

/// Primitives that track entries in a set instead of touching disk.
#[derive(Default)]
pub struct FakePrimitives {
    entries: RefCell<BTreeSet<PathBuf>>,
    sources: HashSet<PathBuf>,
    create_failures: HashMap<PathBuf, io::ErrorKind>,
    remove_failures: HashMap<PathBuf, io::ErrorKind>,
    pub calls: RefCell<Vec<String>>,
}

impl FakePrimitives {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every item's media file as present
    pub fn with_sources(mut self, items: &[Item]) -> Self {
        self.sources.extend(items.iter().map(|item| item.source_path.clone()));
        self
    }

    pub fn with_entry(self, path: &str) -> Self {
        self.entries.borrow_mut().insert(native(path));
        self
    }

    pub fn fail_create(mut self, path: &str, kind: io::ErrorKind) -> Self {
        self.create_failures.insert(native(path), kind);
        self
    }

    pub fn fail_remove(mut self, path: &str, kind: io::ErrorKind) -> Self {
        self.remove_failures.insert(native(path), kind);
        self
    }

    pub fn has_entry(&self, path: &str) -> bool {
        self.entries.borrow().contains(&native(path))
    }

    pub fn entry_count(&self) -> usize {
        self.entries.borrow().len()
    }

    fn create(&self, op: &str, target: &Path) -> mirror_fs::Result<()> {
        self.calls.borrow_mut().push(format!("{} {}", op, NormalizedPath::new(target)));
        if let Some(kind) = self.create_failures.get(target) {
            return Err(mirror_fs::Error::io(target, io::Error::new(*kind, "injected")));
        }
        self.entries.borrow_mut().insert(target.to_path_buf());
        Ok(())
    }
}

impl EntryPrimitives for FakePrimitives {
    fn link_directory(
        &self,
        _source: &Path,
        target: &Path,
        _kind: DirectoryLinkKind,
    ) -> mirror_fs::Result<()> {
        self.create("link_dir", target)
    }

    fn link_file(&self, _source: &Path, target: &Path) -> mirror_fs::Result<()> {
        self.create("link_file", target)
    }

    fn copy_file(&self, _source: &Path, target: &Path) -> mirror_fs::Result<u64> {
        self.create("copy", target).map(|_| 0)
    }

    fn remove_entry(&self, path: &Path) -> mirror_fs::Result<bool> {
        self.calls.borrow_mut().push(format!("remove {}", NormalizedPath::new(path)));
        if let Some(kind) = self.remove_failures.get(path) {
            return Err(mirror_fs::Error::io(path, io::Error::new(*kind, "injected")));
        }
        Ok(self.entries.borrow_mut().remove(path))
    }

    fn entry_exists(&self, path: &Path) -> bool {
        self.entries.borrow().contains(path)
    }

    fn source_exists(&self, path: &Path) -> bool {
        self.sources.contains(path)
    }
}

pub fn native(path: &str) -> PathBuf {
    NormalizedPath::new(path).to_native()
}

pub fn out() -> NormalizedPath {
    NormalizedPath::new("/out")
}

pub fn item(id: &str, name: &str, ext: &str) -> Item {
    Item::new(id, name, ext, format!("/lib/images/{}.info/{}.{}", id, name, ext))
}

/// Plan and execute one run against `fake`, returning the plan and new index.
pub fn run_once(
    items: &[Item],
    previous: &SyncIndex,
    mode: SyncMode,
    fake: &FakePrimitives,
) -> (SyncPlan, mirror_core::SyncResult) {
    let plan = compute_plan(items, previous, mode, &out());
    let options = ExecOptions::new(fake).with_library_root("/lib");
    let result = execute(&plan, mode, previous, &options);
    (plan, result)
}
