use std::path::Path;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Operations of a session over a virtual tree.
///
/// Every `path` argument may be relative (resolved against `cwd()`) or absolute.
pub trait FsBackend {
    fn cwd(&self) -> &Path;
    fn cd<P: AsRef<Path>>(&mut self, path: P) -> Result<()>;
    fn exists<P: AsRef<Path>>(&self, path: P) -> bool;
    fn is_dir<P: AsRef<Path>>(&self, path: P) -> Result<bool>;
    fn is_file<P: AsRef<Path>>(&self, path: P) -> Result<bool>;
    fn ls<P: AsRef<Path>>(&self, path: P) -> Result<impl Iterator<Item = &str>>;
    fn tree<P: AsRef<Path>>(&self, path: P) -> Result<impl Iterator<Item = &Path>>;
    fn mkdir<P: AsRef<Path>>(&mut self, path: P) -> Result<()>;
    fn touch<P: AsRef<Path>>(&mut self, path: P) -> Result<()>;
    fn read<P: AsRef<Path>>(&self, path: P) -> Result<String>;
    fn write<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()>;
    fn append<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()>;
    fn rm<P: AsRef<Path>>(&mut self, path: P) -> Result<()>;
    fn remove_tree<P: AsRef<Path>>(&mut self, path: P) -> Result<()>;
    fn cp<P: AsRef<Path>, Q: AsRef<Path>>(&mut self, from: P, to: Q) -> Result<()>;
    fn mv<P: AsRef<Path>, Q: AsRef<Path>>(&mut self, from: P, to: Q) -> Result<()>;
    fn cleanup(&mut self);
}

pub(crate) mod utils {
    use std::path::{Component, Path, PathBuf};

    /// Drops `.` components and folds `..` into the preceding component.
    /// `..` never climbs above the root. Repeated and trailing separators
    /// disappear because `components()` already skips them.
    pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
        let mut result = PathBuf::new();
        for component in path.as_ref().components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if let Some(parent) = result.parent() {
                        result = parent.to_path_buf();
                    }
                }
                _ => result.push(component),
            }
        }
        result
    }

    pub fn is_virtual_root<P: AsRef<Path>>(path: P) -> bool {
        let mut components = path.as_ref().components();
        components.next() == Some(Component::RootDir) && components.next().is_none()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_normalize() {
            assert_eq!(normalize("/foo/bar"), Path::new("/foo/bar"));
            assert_eq!(normalize("/foo//bar/"), Path::new("/foo/bar"));
            assert_eq!(normalize("/foo/././bar"), Path::new("/foo/bar"));
            assert_eq!(normalize("/foo/./../bar"), Path::new("/bar"));
            assert_eq!(normalize("/a/b/../../.."), Path::new("/"));
            assert_eq!(normalize("/../../x"), Path::new("/x"));
            assert_eq!(normalize("rel/./x"), Path::new("rel/x"));
        }

        #[test]
        fn test_is_virtual_root() {
            assert!(is_virtual_root("/"));
            assert!(is_virtual_root("//"));
            assert!(!is_virtual_root("/a"));
            assert!(!is_virtual_root(""));
            assert!(!is_virtual_root("a"));
        }
    }
}
