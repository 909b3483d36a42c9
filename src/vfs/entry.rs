use std::collections::BTreeSet;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// A stored node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Opaque file contents.
    File(String),
    /// Names of the immediate children.
    Directory(BTreeSet<String>),
}

impl Entry {
    pub fn new(entry_type: EntryType) -> Entry {
        match entry_type {
            EntryType::File => Entry::File(String::new()),
            EntryType::Directory => Entry::Directory(BTreeSet::new()),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            Entry::File(_) => EntryType::File,
            Entry::Directory(_) => EntryType::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        self.entry_type() == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type() == EntryType::Directory
    }

    /// File contents; `None` for directories.
    pub fn content(&self) -> Option<&str> {
        match self {
            Entry::File(content) => Some(content.as_str()),
            Entry::Directory(_) => None,
        }
    }

    /// Child names; `None` for files.
    pub fn children(&self) -> Option<&BTreeSet<String>> {
        match self {
            Entry::Directory(children) => Some(children),
            Entry::File(_) => None,
        }
    }
}
