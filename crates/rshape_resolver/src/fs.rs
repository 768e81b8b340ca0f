//! The filesystem capability the resolver reads sources through.

use std::cell::RefCell;
use std::rc::Rc;

use rshape_core::collections::FxHashMap;
use rshape_tspath::normalize_path;

pub trait FileSystem {
    fn file_exists(&self, path: &str) -> bool;

    /// The file's text, or `None` when it cannot be read.
    fn read_file(&self, path: &str) -> Option<String>;

    /// The canonical path of a file, following symlinks. Hosts without the
    /// capability return `None` and paths are used as probed.
    fn realpath(&self, _path: &str) -> Option<String> {
        None
    }
}

impl<F: FileSystem + ?Sized> FileSystem for Rc<F> {
    fn file_exists(&self, path: &str) -> bool {
        (**self).file_exists(path)
    }

    fn read_file(&self, path: &str) -> Option<String> {
        (**self).read_file(path)
    }

    fn realpath(&self, path: &str) -> Option<String> {
        (**self).realpath(path)
    }
}

/// Reads from the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn file_exists(&self, path: &str) -> bool {
        std::path::Path::new(path).is_file()
    }

    fn read_file(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn realpath(&self, path: &str) -> Option<String> {
        let canonical = std::fs::canonicalize(path).ok()?;
        canonical.to_str().map(normalize_path)
    }
}

/// An in-memory file map.
///
/// Clones share the same map, so a host can keep one handle to update unsaved
/// buffers while the resolution context reads through another.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: Rc<RefCell<FxHashMap<String, String>>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<P: AsRef<str>, T: Into<String>>(files: impl IntoIterator<Item = (P, T)>) -> Self {
        let fs = Self::new();
        for (path, text) in files {
            fs.write_file(path.as_ref(), text);
        }
        fs
    }

    pub fn write_file(&self, path: &str, text: impl Into<String>) {
        self.files.borrow_mut().insert(normalize_path(path), text.into());
    }

    pub fn remove_file(&self, path: &str) -> bool {
        self.files.borrow_mut().remove(&normalize_path(path)).is_some()
    }

    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }
}

impl FileSystem for MemoryFileSystem {
    fn file_exists(&self, path: &str) -> bool {
        self.files.borrow().contains_key(&normalize_path(path))
    }

    fn read_file(&self, path: &str) -> Option<String> {
        self.files.borrow().get(&normalize_path(path)).cloned()
    }
}
