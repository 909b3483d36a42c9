//! This module provides the in-memory tree that backs a session: a flat map from absolute paths
//! to entries, plus the cursor every relative argument is resolved against.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::{FsBackend, Result, utils};
use crate::error::Error;
use crate::{Entry, EntryType};

/// A session over a virtual tree of directories and files kept entirely in memory.
///
/// ### Internal state
///
/// * `cwd` — the cursor. Starts at `/` and is changed by `cd()`, `load()` and `cleanup()`.
///   Normally an inner absolute normalized path; after `load()` it is whatever the state file's
///   first line said.
///
/// * `entries` — the single source of truth.
///   - Key: inner absolute normalized `PathBuf` (produced by `resolve()`).
///   - Value: `Entry`; a directory value holds the names of its immediate children.
///   - `BTreeMap` gives prefix-friendly, deterministic iteration (used by `tree()` and `save()`).
///
/// ### Invariants
///
/// 1. **Root existence**: `/` is always present and is a `Directory`.
/// 2. **Path normalization**: every key is normalized (no `.`, `..`, `//`, trailing `/`).
/// 3. **Children index**: inserting `/a/b` records `b` in `/a` if `/a` is a directory;
///    erasing `/a/b` drops it again. A directory inserted at `/a` starts with the names of the
///    entries already stored one level below it, so the index always matches what `load()`
///    rebuilds from the stored paths.
///
/// Parent existence is *not* enforced: an entry may be created under a missing parent and is
/// then listed nowhere. `rm()` does not cascade (see `remove_tree()`), and `cp()`/`mv()` are
/// shallow.
///
/// ### Example
///
/// ```
/// use pathtree::{FsBackend, PathTree};
///
/// let mut fs = PathTree::new();
/// fs.mkdir("docs").unwrap();
/// fs.cd("docs").unwrap();
/// fs.touch("note.txt").unwrap();
/// fs.write("note.txt", "hello").unwrap();
/// fs.cd("..").unwrap();
///
/// assert_eq!(fs.read("/docs/note.txt").unwrap(), "hello");
/// assert_eq!(fs.ls("docs").unwrap().collect::<Vec<_>>(), vec!["note.txt"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PathTree {
    pub(crate) cwd: PathBuf,
    pub(crate) entries: BTreeMap<PathBuf, Entry>,
}

impl PathTree {
    /// Creates an empty session: only the root directory, cursor at `/`.
    pub fn new() -> Self {
        let inner_root = PathBuf::from("/");
        let mut entries = BTreeMap::new();
        entries.insert(inner_root.clone(), Entry::new(EntryType::Directory));

        Self {
            cwd: inner_root,
            entries,
        }
    }

    /// Joins `path` onto the cursor and normalizes the result.
    /// An absolute `path` replaces the cursor. Never fails.
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        utils::normalize(self.cwd.join(path))
    }

    /// Looks up the entry at `path`.
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<&Entry> {
        self.entries.get(&self.resolve(path))
    }

    /// Iterates all stored entries in path order.
    pub fn entries(&self) -> impl Iterator<Item = (&Path, &Entry)> {
        self.entries.iter().map(|(path, entry)| (path.as_path(), entry))
    }

    /// Like `resolve()`, but rejects an empty argument, which would otherwise address the cursor.
    fn resolve_target(&self, path: &Path) -> Result<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidPath(path.to_path_buf()));
        }
        Ok(self.resolve(path))
    }

    fn create(&mut self, path: &Path, entry_type: EntryType) -> Result<()> {
        let inner = self.resolve_target(path)?;
        if self.entries.contains_key(&inner) {
            return Err(Error::AlreadyExists(inner));
        }
        debug!(path = %inner.display(), ?entry_type, "create");
        self.insert(inner, Entry::new(entry_type));
        Ok(())
    }

    /// Stores `entry` at `path` and registers it with its parent.
    /// A directory's child set is rebuilt from the entries already stored one level below.
    pub(crate) fn insert(&mut self, path: PathBuf, mut entry: Entry) {
        if let Entry::Directory(children) = &mut entry {
            *children = self.stored_children(&path);
        }
        self.entries.insert(path.clone(), entry);
        self.attach(&path);
    }

    fn stored_children(&self, path: &Path) -> BTreeSet<String> {
        let component_count = path.components().count() + 1;
        self.entries
            .keys()
            .filter(|&p| p.starts_with(path) && p.components().count() == component_count)
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }

    /// Records `path` in its parent's child set, if the parent is a stored directory.
    pub(crate) fn attach(&mut self, path: &Path) {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        if let Some(Entry::Directory(children)) = self.entries.get_mut(parent) {
            children.insert(name.to_string_lossy().into_owned());
        }
    }

    fn detach(&mut self, path: &Path) {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        if let Some(Entry::Directory(children)) = self.entries.get_mut(parent) {
            children.remove(&*name.to_string_lossy());
        }
    }
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FsBackend for PathTree {
    /// Returns the cursor.
    fn cwd(&self) -> &Path {
        self.cwd.as_path()
    }

    /// Changes the cursor.
    ///
    /// * `/` jumps to the root.
    /// * `..` moves to the cursor's `Path::parent()` (`/a` becomes `/`). If the cursor has no
    ///   parent, or holds no separator at all, it is left as is. A trailing separator does not
    ///   count as a component, so a loaded cursor `/a/b/` goes to `/a`.
    /// * anything else is resolved and must be an existing directory, otherwise
    ///   `Error::InvalidPath` is returned and the cursor does not move.
    fn cd<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if utils::is_virtual_root(path) {
            self.cwd = PathBuf::from("/");
            return Ok(());
        }
        if path == Path::new("..") {
            if let Some(parent) = self.cwd.parent().filter(|p| !p.as_os_str().is_empty()) {
                self.cwd = parent.to_path_buf();
            }
            return Ok(());
        }

        let target = self.resolve(path);
        match self.entries.get(&target) {
            Some(entry) if entry.is_dir() => {
                self.cwd = target;
                Ok(())
            }
            _ => Err(Error::InvalidPath(target)),
        }
    }

    /// Checks if a `path` exists in the tree.
    fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.entries.contains_key(&self.resolve(path))
    }

    fn is_dir<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let inner = self.resolve(path);
        match self.entries.get(&inner) {
            Some(entry) => Ok(entry.is_dir()),
            None => Err(Error::InvalidPath(inner)),
        }
    }

    fn is_file<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let inner = self.resolve(path);
        match self.entries.get(&inner) {
            Some(entry) => Ok(entry.is_file()),
            None => Err(Error::InvalidPath(inner)),
        }
    }

    /// Returns the names of the immediate children of directory `path`, in sorted order.
    ///
    /// The iterator borrows the tree and can be re-created at will. Pass `"."` to list the
    /// cursor. Missing paths and files yield `Error::InvalidPath`.
    fn ls<P: AsRef<Path>>(&self, path: P) -> Result<impl Iterator<Item = &str>> {
        let inner = self.resolve(path);
        match self.entries.get(&inner) {
            Some(Entry::Directory(children)) => Ok(children.iter().map(String::as_str)),
            _ => Err(Error::InvalidPath(inner)),
        }
    }

    /// Returns every stored path strictly below directory `path`, orphans included.
    /// Matching is by path prefix, not by the children index.
    fn tree<P: AsRef<Path>>(&self, path: P) -> Result<impl Iterator<Item = &Path>> {
        let inner = self.resolve(path);
        if !self.entries.get(&inner).is_some_and(Entry::is_dir) {
            return Err(Error::InvalidPath(inner));
        }
        Ok(self
            .entries
            .keys()
            .map(PathBuf::as_path)
            .filter(move |&path| path != inner && path.starts_with(&inner)))
    }

    /// Creates an empty directory. The parent is not required to exist.
    fn mkdir<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.create(path.as_ref(), EntryType::Directory)
    }

    /// Creates an empty file. The parent is not required to exist.
    fn touch<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.create(path.as_ref(), EntryType::File)
    }

    /// Returns the stored contents of a file.
    /// Missing paths and directories yield `Error::InvalidFile`.
    fn read<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let inner = self.resolve(path);
        match self.entries.get(&inner) {
            Some(Entry::File(content)) => Ok(content.clone()),
            _ => Err(Error::InvalidFile(inner)),
        }
    }

    /// Replaces the entire contents of an existing file. Does not create the file.
    fn write<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()> {
        let inner = self.resolve(path);
        match self.entries.get_mut(&inner) {
            Some(Entry::File(stored)) => {
                debug!(path = %inner.display(), len = content.len(), "write");
                *stored = content.to_owned();
                Ok(())
            }
            _ => Err(Error::InvalidFile(inner)),
        }
    }

    /// Appends to an existing file, preserving its old contents.
    fn append<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()> {
        let inner = self.resolve(path);
        match self.entries.get_mut(&inner) {
            Some(Entry::File(stored)) => {
                debug!(path = %inner.display(), len = content.len(), "append");
                stored.push_str(content);
                Ok(())
            }
            _ => Err(Error::InvalidFile(inner)),
        }
    }

    /// Erases the single entry at `path`. Entries nested below it are left in place.
    /// The root cannot be removed.
    fn rm<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let inner = self.resolve_target(path.as_ref())?;
        if utils::is_virtual_root(&inner) || self.entries.remove(&inner).is_none() {
            return Err(Error::InvalidPath(inner));
        }
        self.detach(&inner);
        debug!(path = %inner.display(), "remove");
        Ok(())
    }

    /// Erases the entry at `path` and every entry whose path has it as a prefix.
    fn remove_tree<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let inner = self.resolve_target(path.as_ref())?;
        if utils::is_virtual_root(&inner) || !self.entries.contains_key(&inner) {
            return Err(Error::InvalidPath(inner));
        }

        let removed: Vec<PathBuf> = self
            .entries
            .keys()
            .filter(|&path| path.starts_with(&inner))
            .cloned()
            .collect();
        for p in &removed {
            self.entries.remove(p);
        }
        self.detach(&inner);

        debug!(path = %inner.display(), count = removed.len(), "remove tree");
        Ok(())
    }

    /// Stores a clone of the entry at `from` under `to`, replacing whatever was there.
    ///
    /// The copy is shallow: a directory keeps its child names, but nested entries are not
    /// duplicated. Copying onto the root is rejected.
    fn cp<P: AsRef<Path>, Q: AsRef<Path>>(&mut self, from: P, to: Q) -> Result<()> {
        let src = self.resolve_target(from.as_ref())?;
        let dst = self.resolve_target(to.as_ref())?;
        let Some(entry) = self.entries.get(&src).cloned() else {
            return Err(Error::InvalidPath(src));
        };
        if utils::is_virtual_root(&dst) {
            return Err(Error::InvalidPath(dst));
        }
        if src == dst {
            return Ok(());
        }

        debug!(from = %src.display(), to = %dst.display(), "copy");
        self.insert(dst, entry);
        Ok(())
    }

    /// Same as `cp()` followed by `rm()` of the source, with every check done before the
    /// first mutation. Moving an entry onto itself leaves it in place.
    fn mv<P: AsRef<Path>, Q: AsRef<Path>>(&mut self, from: P, to: Q) -> Result<()> {
        let src = self.resolve_target(from.as_ref())?;
        let dst = self.resolve_target(to.as_ref())?;
        if utils::is_virtual_root(&src) || !self.entries.contains_key(&src) {
            return Err(Error::InvalidPath(src));
        }
        if utils::is_virtual_root(&dst) {
            return Err(Error::InvalidPath(dst));
        }
        if src == dst {
            return Ok(());
        }

        if let Some(entry) = self.entries.remove(&src) {
            self.detach(&src);
            debug!(from = %src.display(), to = %dst.display(), "move");
            self.insert(dst, entry);
        }
        Ok(())
    }

    /// Removes every entry except the root and moves the cursor back to `/`.
    fn cleanup(&mut self) {
        self.entries.retain(|path, _| utils::is_virtual_root(path));
        if let Some(Entry::Directory(children)) = self.entries.get_mut(Path::new("/")) {
            children.clear();
        }
        self.cwd = PathBuf::from("/");
    }
}
