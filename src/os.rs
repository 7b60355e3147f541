//! Filesystem helpers.
//!
//! Thin wrappers over `std::fs` and `walkdir` in the spirit of the usual
//! shell commands (`cd`, `cp`, `mv`, `rm`, `ls`, `wc`). Every operation checks
//! its precondition first and reports a failed one as an [`Error`].

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{info, warn};
use walkdir::WalkDir;

use crate::error::{Error, IoContext, Result};

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::NotADirectory {
            path: path.to_path_buf(),
        })
    }
}

fn require_absent(path: &Path) -> Result<()> {
    if path.exists() {
        Err(Error::AlreadyExists {
            path: path.to_path_buf(),
        })
    } else {
        Ok(())
    }
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).with_path(parent)
        }
        _ => Ok(()),
    }
}

/// Compare a path's extension against `extension`, which may carry a
/// leading dot (`".txt"` and `"txt"` are equivalent).
fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension().and_then(|e| e.to_str()) == Some(wanted)
}

// ---------------------------------------------------------------------------
// Working directory
// ---------------------------------------------------------------------------

pub fn change_directory(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    require_dir(dir)?;
    std::env::set_current_dir(dir).with_path(dir)
}

pub fn current_working_directory() -> Result<PathBuf> {
    std::env::current_dir().with_path(".")
}

// ---------------------------------------------------------------------------
// Copy / move
// ---------------------------------------------------------------------------

/// Copy a single file, creating the destination's parent directories.
pub fn copy_file(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
    let (source, destination) = (source.as_ref(), destination.as_ref());
    require_file(source)?;
    create_parent(destination)?;
    fs::copy(source, destination).with_path(destination)?;
    info!("copied {} -> {}", source.display(), destination.display());
    Ok(())
}

/// Recursively copy `source` into a new directory `destination`.
pub fn copy_directory(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
    let (source, destination) = (source.as_ref(), destination.as_ref());
    require_dir(source)?;
    require_absent(destination)?;

    for entry in WalkDir::new(source) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).with_path(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target).with_path(&target)?;
        } else {
            warn!("skipping non-regular entry {}", entry.path().display());
        }
    }

    info!("copied directory {} -> {}", source.display(), destination.display());
    Ok(())
}

/// Copy every file directly inside `source_dir` with the given extension
/// into `destination_dir`. Returns the number of files copied.
pub fn copy_files(
    source_dir: impl AsRef<Path>,
    destination_dir: impl AsRef<Path>,
    extension: &str,
) -> Result<usize> {
    let (source_dir, destination_dir) = (source_dir.as_ref(), destination_dir.as_ref());
    require_dir(source_dir)?;
    fs::create_dir_all(destination_dir).with_path(destination_dir)?;

    let mut copied = 0;
    for entry in WalkDir::new(source_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), extension) {
            continue;
        }
        let target = destination_dir.join(entry.file_name());
        fs::copy(entry.path(), &target).with_path(&target)?;
        copied += 1;
    }

    info!(
        "copied {copied} '{extension}' file(s) {} -> {}",
        source_dir.display(),
        destination_dir.display()
    );
    Ok(copied)
}

pub fn move_file(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
    let (source, destination) = (source.as_ref(), destination.as_ref());
    require_file(source)?;
    create_parent(destination)?;
    fs::rename(source, destination).with_path(source)?;
    info!("moved {} -> {}", source.display(), destination.display());
    Ok(())
}

pub fn move_directory(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
    let (source, destination) = (source.as_ref(), destination.as_ref());
    require_dir(source)?;
    require_absent(destination)?;
    create_parent(destination)?;
    fs::rename(source, destination).with_path(source)?;
    info!("moved directory {} -> {}", source.display(), destination.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Create / delete
// ---------------------------------------------------------------------------

/// Create an empty file. Fails if anything already exists at `path`.
pub fn create_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    require_absent(path)?;
    File::create(path).with_path(path)?;
    info!("created {}", path.display());
    Ok(())
}

/// Create a directory and any missing parents.
pub fn create_directory(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    require_absent(path)?;
    fs::create_dir_all(path).with_path(path)?;
    info!("created directory {}", path.display());
    Ok(())
}

pub fn delete_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    require_file(path)?;
    fs::remove_file(path).with_path(path)?;
    info!("deleted {}", path.display());
    Ok(())
}

/// Remove an empty directory.
pub fn delete_directory(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    require_dir(path)?;
    fs::remove_dir(path).with_path(path)?;
    info!("deleted directory {}", path.display());
    Ok(())
}

/// Remove a directory and everything beneath it.
pub fn delete_populated_directory(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    require_dir(path)?;
    fs::remove_dir_all(path).with_path(path)?;
    info!("deleted directory tree {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Names of the entries directly inside `dir`, sorted. When `extension` is
/// given only files with that extension are listed.
pub fn list_contents(dir: impl AsRef<Path>, extension: Option<&str>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    require_dir(dir)?;

    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if let Some(ext) = extension {
            if !entry.file_type().is_file() || !has_extension(entry.path(), ext) {
                continue;
            }
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Size of a file in bytes.
pub fn file_size(path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    require_file(path)?;
    Ok(fs::metadata(path).with_path(path)?.len())
}

fn fold_lines<T>(path: &Path, init: T, mut f: impl FnMut(T, &str) -> T) -> Result<T> {
    require_file(path)?;
    let reader = BufReader::new(File::open(path).with_path(path)?);
    let mut acc = init;
    for line in reader.lines() {
        let line = line.with_path(path)?;
        acc = f(acc, line.as_str());
    }
    Ok(acc)
}

pub fn file_line_count(path: impl AsRef<Path>) -> Result<usize> {
    fold_lines(path.as_ref(), 0, |n, _| n + 1)
}

/// Number of whitespace-separated words in a file.
pub fn file_word_count(path: impl AsRef<Path>) -> Result<usize> {
    fold_lines(path.as_ref(), 0, |n, line| n + line.split_whitespace().count())
}

/// Number of whitespace-separated tokens exactly equal to `word`.
pub fn count_word_occurrence(path: impl AsRef<Path>, word: &str) -> Result<usize> {
    fold_lines(path.as_ref(), 0, |n, line| {
        n + line.split_whitespace().filter(|tok| *tok == word).count()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TEXT: &str = "This is a text file\n\
                        used to count words in a file\n\
                        the file has four lines\n\
                        and this is the last line of the file\n";

    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("text_file.txt"), TEXT).unwrap();
        dir
    }

    #[test]
    fn counts_lines_words_and_occurrences() {
        let dir = fixture();
        let file = dir.path().join("text_file.txt");

        assert_eq!(file_line_count(&file).unwrap(), 4);
        assert_eq!(file_word_count(&file).unwrap(), 26);
        assert_eq!(count_word_occurrence(&file, "file").unwrap(), 4);
        assert_eq!(file_size(&file).unwrap(), TEXT.len() as u64);
    }

    #[test]
    fn counting_a_missing_file_fails() {
        let dir = fixture();
        let err = file_line_count(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn create_and_delete_file() {
        let dir = fixture();
        let file = dir.path().join("created.txt");

        create_file(&file).unwrap();
        assert!(file.is_file());
        assert!(matches!(create_file(&file), Err(Error::AlreadyExists { .. })));

        delete_file(&file).unwrap();
        assert!(!file.exists());
        assert!(matches!(delete_file(&file), Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn create_and_delete_directories() {
        let dir = fixture();
        let nested = dir.path().join("a").join("b");

        create_directory(&nested).unwrap();
        assert!(nested.is_dir());

        delete_directory(&nested).unwrap();
        assert!(!nested.exists());

        let populated = dir.path().join("a");
        create_file(populated.join("test.txt")).unwrap();
        assert!(delete_directory(&populated).is_err());
        delete_populated_directory(&populated).unwrap();
        assert!(!populated.exists());
    }

    #[test]
    fn copy_file_creates_parents() {
        let dir = fixture();
        let target = dir.path().join("copies").join("copy.txt");

        copy_file(dir.path().join("text_file.txt"), &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), TEXT);
    }

    #[test]
    fn copy_directory_is_recursive() {
        let dir = fixture();
        let source = dir.path().join("src_dir");
        fs::create_dir_all(source.join("inner")).unwrap();
        fs::write(source.join("test.txt"), "top").unwrap();
        fs::write(source.join("inner").join("deep.txt"), "deep").unwrap();

        let destination = dir.path().join("dst_dir");
        copy_directory(&source, &destination).unwrap();

        assert_eq!(fs::read_to_string(destination.join("test.txt")).unwrap(), "top");
        assert_eq!(
            fs::read_to_string(destination.join("inner").join("deep.txt")).unwrap(),
            "deep"
        );
        assert!(matches!(
            copy_directory(&source, &destination),
            Err(Error::AlreadyExists { .. })
        ));
    }

    #[test]
    fn copy_files_filters_by_extension() {
        let dir = fixture();
        let source = dir.path().join("source");
        fs::create_dir(&source).unwrap();
        for name in ["test1.txt", "test2.txt", "script.py"] {
            fs::write(source.join(name), name).unwrap();
        }

        let destination = dir.path().join("destination");
        assert_eq!(copy_files(&source, &destination, ".txt").unwrap(), 2);
        assert_eq!(
            list_contents(&destination, None).unwrap(),
            vec!["test1.txt", "test2.txt"]
        );
    }

    #[test]
    fn move_file_and_directory_round_trip() {
        let dir = fixture();
        let original = dir.path().join("text_file.txt");
        let moved = dir.path().join("moved").join("text_file2.txt");

        move_file(&original, &moved).unwrap();
        assert!(moved.is_file());
        assert!(!original.exists());

        let relocated = dir.path().join("elsewhere").join("moved");
        move_directory(dir.path().join("moved"), &relocated).unwrap();
        assert!(relocated.join("text_file2.txt").is_file());
    }

    #[test]
    fn list_contents_with_and_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["test1.txt", "test2.txt", "test3.txt", "test.py"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("test")).unwrap();

        assert_eq!(list_contents(dir.path(), Some(".py")).unwrap(), vec!["test.py"]);
        assert_eq!(
            list_contents(dir.path(), Some("txt")).unwrap(),
            vec!["test1.txt", "test2.txt", "test3.txt"]
        );
        assert_eq!(
            list_contents(dir.path(), None).unwrap(),
            vec!["test", "test.py", "test1.txt", "test2.txt", "test3.txt"]
        );
    }

    #[test]
    fn change_directory_rejects_missing_dir() {
        let dir = fixture();
        let err = change_directory(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
        assert!(current_working_directory().unwrap().is_dir());
    }
}
