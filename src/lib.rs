//! An in-memory, path-addressed file system session.
//!
//! ### Overview
//!
//! `pathtree` keeps a tree of directories and files in a flat map keyed by absolute paths,
//! together with a current working directory. Operations are exposed through the `FsBackend`
//! trait; the whole state can be written to and read back from a flat text file.
//!
//! **Key ideas**:
//! - **Flat storage**: one `BTreeMap` from normalized path to `Entry`, plus a children index
//!   kept in each directory entry for listing.
//! - **Relative addressing**: every argument is resolved against the cursor and normalized.
//! - **Structured errors**: operations return `pathtree::Error`; nothing is printed.
//!
//! ```
//! use pathtree::{FsBackend, PathTree};
//!
//! let mut fs = PathTree::new();
//! fs.mkdir("docs").unwrap();
//! fs.touch("docs/todo.txt").unwrap();
//! fs.write("docs/todo.txt", "milk").unwrap();
//! assert_eq!(fs.read("/docs/todo.txt").unwrap(), "milk");
//! ```

mod core;
mod error;
mod vfs;

pub use crate::core::{FsBackend, Result};
pub use error::Error;
pub use vfs::{Entry, EntryType, PathTree};
