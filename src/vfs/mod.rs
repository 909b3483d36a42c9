mod entry;
mod path_tree;
mod state;

pub use entry::{Entry, EntryType};
pub use path_tree::PathTree;
