//! # Input Supply
//!
//! The converter never touches the filesystem directly. Song texts, book
//! outlines and setlists come from a [`SongSource`]:
//!
//! - [`MemorySource`] - texts held in memory, keyed by path
//! - [`FsSource`] - texts read from disk, directories walked with `walkdir`
//!
//! A source reports a missing path through [`SongSource::exists`]; callers
//! decide whether that is fatal. A failed read of a path that exists is always
//! a [`BookError::InputUnavailable`].

use glob::Pattern;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::BookError;

pub trait SongSource {
    fn exists(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> Result<String, BookError>;

    /// Files under `dir` (recursively) whose name matches the glob `pattern`.
    /// Hidden files are skipped; results are sorted.
    fn find(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, BookError>;
}

/// Compile a file-name glob (`*.cho`, `song?.txt`, `[a-m]*`).
pub fn file_pattern(pattern: &str) -> Result<Pattern, BookError> {
    Pattern::new(pattern)
        .map_err(|e| BookError::ConfigError(format!("bad file pattern `{}`: {}", pattern, e)))
}

fn name_matches(pattern: &Pattern, path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| pattern.matches(n))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.starts_with('.'))
}

/// Drop `.` components so `./songs/a.cho` and `songs/a.cho` are the same key.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), text.into());
    }
}

impl SongSource for MemorySource {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }

    fn read(&self, path: &Path) -> Result<String, BookError> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| BookError::unavailable(path.display(), "not found"))
    }

    fn find(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, BookError> {
        let pattern = file_pattern(pattern)?;
        let dir = normalize(dir);
        Ok(self
            .files
            .keys()
            .filter(|path| path.starts_with(&dir) && !is_hidden(path))
            .filter(|path| name_matches(&pattern, path))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl SongSource for FsSource {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> Result<String, BookError> {
        fs::read_to_string(path).map_err(|e| BookError::unavailable(path.display(), e))
    }

    fn find(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, BookError> {
        let pattern = file_pattern(pattern)?;
        let root = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
        let mut found = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| BookError::unavailable(root.display(), e))?;
            let path = entry.path();
            if !entry.file_type().is_file() || is_hidden(path) {
                continue;
            }
            if name_matches(&pattern, path) {
                found.push(path.to_path_buf());
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_pattern() {
        let cho = file_pattern("*.cho").unwrap();
        assert!(cho.matches("grace.cho"));
        assert!(!cho.matches("grace.chopro"));
        assert!(file_pattern("song?.txt").unwrap().matches("song1.txt"));
        assert!(!file_pattern("a.b").unwrap().matches("axb"));
    }

    #[test]
    fn test_bad_pattern_is_config_error() {
        let source = MemorySource::new().with_file("a.cho", "");
        let err = source.find(Path::new(""), "[a-").unwrap_err();
        assert!(matches!(err, BookError::ConfigError(_)));
        assert!(matches!(FsSource.find(Path::new("."), "[a-"), Err(BookError::ConfigError(_))));
    }

    #[test]
    fn test_memory_source_paths_are_normalised() {
        let source = MemorySource::new().with_file("songs/a.cho", "{title: A}");
        assert!(source.exists(Path::new("./songs/a.cho")));
        assert_eq!(source.read(Path::new("songs/./a.cho")).unwrap(), "{title: A}");
    }

    #[test]
    fn test_memory_source_missing_is_unavailable() {
        let source = MemorySource::new();
        assert!(!source.exists(Path::new("nope.cho")));
        let err = source.read(Path::new("nope.cho")).unwrap_err();
        assert!(matches!(err, BookError::InputUnavailable { .. }));
    }

    #[test]
    fn test_memory_source_find() {
        let source = MemorySource::new()
            .with_file("songs/b.cho", "")
            .with_file("songs/a.cho", "")
            .with_file("songs/.hidden.cho", "")
            .with_file("songs/deep/c.cho", "")
            .with_file("songs/notes.txt", "")
            .with_file("other/d.cho", "");

        let found = source.find(Path::new("./songs"), "*.cho").unwrap();
        assert_eq!(
            found,
            vec![
                PathBuf::from("songs/a.cho"),
                PathBuf::from("songs/b.cho"),
                PathBuf::from("songs/deep/c.cho"),
            ]
        );
        assert_eq!(source.find(Path::new(""), "*.cho").unwrap().len(), 4);
    }
}
