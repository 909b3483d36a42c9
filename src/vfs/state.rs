//! Flat text persistence for `PathTree`.
//!
//! ```text
//! <cursor>
//! <path>\t<1|0>\t<contents>
//! ...
//! ```
//!
//! `1` marks a directory, `0` a file. There is no escaping, so contents holding a tab or a
//! newline do not survive a round trip.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::{Result, utils};
use crate::error::Error;
use crate::{Entry, EntryType, PathTree};

impl PathTree {
    /// Writes the cursor and every entry to `path`, creating or truncating it.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_state(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| Error::io(path, e))?;

        info!(path = %path.display(), entries = self.entries.len(), "state saved");
        Ok(())
    }

    /// Serializes the state into `writer`. Entries come out in path order.
    pub fn write_state<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "{}", self.cwd.display())?;
        for (path, entry) in &self.entries {
            let flag = match entry.entry_type() {
                EntryType::Directory => 1,
                EntryType::File => 0,
            };
            writeln!(
                writer,
                "{}\t{}\t{}",
                path.display(),
                flag,
                entry.content().unwrap_or_default()
            )?;
        }
        Ok(())
    }

    /// Replaces the whole state with the one stored in `path`.
    ///
    /// Malformed entry lines are skipped without an error. If the file cannot be opened or
    /// read, the current state is left untouched.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        self.read_state(BufReader::new(file))
            .map_err(|e| Error::io(path, e))?;

        info!(path = %path.display(), entries = self.entries.len(), "state loaded");
        Ok(())
    }

    /// Deserializes a state from `reader` and swaps it in once fully read.
    ///
    /// The first line becomes the cursor verbatim; an empty source leaves it at `/`.
    /// The children index is rebuilt from the loaded paths.
    pub fn read_state<R: BufRead>(&mut self, reader: R) -> io::Result<()> {
        let mut lines = reader.lines();
        let mut tree = PathTree::new();

        if let Some(cursor) = lines.next() {
            tree.cwd = PathBuf::from(cursor?);
        }

        let mut loaded = Vec::new();
        for (index, line) in lines.enumerate() {
            let line = line?;
            match parse_line(&line) {
                Some((path, entry)) => loaded.push((path, entry)),
                None => debug!(line = index + 2, "skipping malformed state line"),
            }
        }

        for (path, entry) in loaded {
            tree.entries.insert(path, entry);
        }
        let paths: Vec<PathBuf> = tree.entries.keys().cloned().collect();
        for path in &paths {
            tree.attach(path);
        }

        *self = tree;
        Ok(())
    }
}

/// Parses `<path>\t<flag>\t<contents>`.
///
/// Lines with two tabs split on tabs, so contents may hold spaces or be empty. Other lines
/// fall back to whitespace splitting and need exactly three tokens. Root lines are dropped,
/// since the root is always a fresh directory.
fn parse_line(line: &str) -> Option<(PathBuf, Entry)> {
    let mut fields = line.splitn(3, '\t');
    let (path, flag, content) = match (fields.next(), fields.next(), fields.next()) {
        (Some(path), Some(flag), Some(content)) => (path, flag, content),
        _ => {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [path, flag, content] => (*path, *flag, *content),
                _ => return None,
            }
        }
    };

    if path.is_empty() {
        return None;
    }
    let entry = match flag {
        "1" => Entry::new(EntryType::Directory),
        "0" => Entry::File(content.to_owned()),
        _ => return None,
    };

    let path = utils::normalize(path);
    if path.as_os_str().is_empty() || utils::is_virtual_root(&path) {
        return None;
    }
    Some((path, entry))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempdir::TempDir;

    use super::*;
    use crate::FsBackend;

    fn setup_test_vfs() -> PathTree {
        let mut vfs = PathTree::new();
        vfs.mkdir("/docs").unwrap();
        vfs.mkdir("/docs/drafts").unwrap();
        vfs.touch("/docs/note.txt").unwrap();
        vfs.write("/docs/note.txt", "hello").unwrap();
        vfs.touch("/empty.txt").unwrap();
        vfs.cd("/docs/drafts").unwrap();
        vfs
    }

    mod save {
        use super::*;

        #[test]
        fn test_save_format() -> Result<()> {
            let tmp = TempDir::new("pathtree").unwrap();
            let file = tmp.path().join("state.txt");

            setup_test_vfs().save(&file)?;

            let text = fs::read_to_string(&file).unwrap();
            assert_eq!(
                text,
                "/docs/drafts\n\
                 /\t1\t\n\
                 /docs\t1\t\n\
                 /docs/drafts\t1\t\n\
                 /docs/note.txt\t0\thello\n\
                 /empty.txt\t0\t\n"
            );
            Ok(())
        }

        #[test]
        fn test_save_to_unwritable_path() {
            let tmp = TempDir::new("pathtree").unwrap();
            let file = tmp.path().join("missing_dir").join("state.txt");

            let err = PathTree::new().save(&file).unwrap_err();
            assert!(matches!(err, Error::Io { ref path, .. } if path == &file));
        }
    }

    mod load {
        use super::*;

        #[test]
        fn test_round_trip_into_fresh_tree() -> Result<()> {
            let tmp = TempDir::new("pathtree").unwrap();
            let file = tmp.path().join("state.txt");
            let original = setup_test_vfs();
            original.save(&file)?;

            let mut restored = PathTree::new();
            restored.load(&file)?;

            assert_eq!(restored, original);
            assert_eq!(restored.cwd(), Path::new("/docs/drafts"));
            assert_eq!(
                restored.ls("/docs")?.collect::<Vec<_>>(),
                vec!["drafts", "note.txt"]
            );
            assert_eq!(restored.read("/docs/note.txt")?, "hello");
            Ok(())
        }

        #[test]
        fn test_load_clears_previous_state() -> Result<()> {
            let mut vfs = PathTree::new();
            vfs.touch("/stale.txt")?;

            vfs.read_state("/\n/fresh.txt\t0\tnew\n".as_bytes()).unwrap();

            assert!(!vfs.exists("/stale.txt"));
            assert_eq!(vfs.read("/fresh.txt")?, "new");
            assert_eq!(vfs.ls("/")?.collect::<Vec<_>>(), vec!["fresh.txt"]);
            Ok(())
        }

        #[test]
        fn test_load_skips_malformed_lines() -> Result<()> {
            let mut vfs = PathTree::new();
            let state = "/\n\
                         /good\t0\tok\n\
                         just-one-token\n\
                         /two tokens\n\
                         /bad-flag\t7\tx\n\
                         \n\
                         \t0\tno-path\n\
                         /spaced 0 word\n\
                         /four 0 too many\n";
            vfs.read_state(state.as_bytes()).unwrap();

            let paths: Vec<_> = vfs.entries().map(|(path, _)| path).collect();
            assert_eq!(
                paths,
                vec![Path::new("/"), Path::new("/good"), Path::new("/spaced")]
            );
            assert_eq!(vfs.read("/spaced")?, "word");
            Ok(())
        }

        #[test]
        fn test_load_keeps_spaces_in_tab_separated_contents() -> Result<()> {
            let mut vfs = PathTree::new();
            vfs.read_state("/\n/f\t0\thello big world\n".as_bytes()).unwrap();
            assert_eq!(vfs.read("/f")?, "hello big world");
            Ok(())
        }

        #[test]
        fn test_load_cursor_is_verbatim() -> Result<()> {
            let mut vfs = PathTree::new();
            vfs.read_state("abc\n".as_bytes()).unwrap();
            assert_eq!(vfs.cwd(), Path::new("abc"));

            vfs.cd("..")?;
            assert_eq!(vfs.cwd(), Path::new("abc"));
            Ok(())
        }

        #[test]
        fn test_load_empty_source() {
            let mut vfs = PathTree::new();
            vfs.mkdir("/x").unwrap();
            vfs.read_state("".as_bytes()).unwrap();
            assert_eq!(vfs, PathTree::new());
        }

        #[test]
        fn test_load_normalizes_paths_and_keeps_root_directory() -> Result<()> {
            let mut vfs = PathTree::new();
            vfs.read_state("/\n/\t0\toops\n//a//b/\t1\t\n/a\t1\t\n".as_bytes())
                .unwrap();

            assert!(vfs.is_dir("/")?);
            assert!(vfs.is_dir("/a/b")?);
            assert_eq!(vfs.ls("/a")?.collect::<Vec<_>>(), vec!["b"]);
            Ok(())
        }

        #[test]
        fn test_load_missing_file_keeps_state() {
            let tmp = TempDir::new("pathtree").unwrap();
            let mut vfs = setup_test_vfs();
            let before = vfs.clone();

            let err = vfs.load(tmp.path().join("nope.txt")).unwrap_err();
            assert!(matches!(err, Error::Io { .. }));
            assert!(err.to_string().starts_with("unable to access state file"));
            assert_eq!(vfs, before);
        }
    }
}
