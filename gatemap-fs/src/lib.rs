//! Capability-based filesystem helpers shared by the gatemap crates.
//!
//! Paths are UTF-8 (`camino`) and every open goes through a `cap-std`
//! directory handle resolved from ambient authority, so callers never touch
//! `std::fs` directly.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Read};
use std::path::Component;

/// Open an existing file for reading.
///
/// # Errors
///
/// Returns the underlying I/O error when the file cannot be opened.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Read a whole file into a string.
///
/// # Errors
///
/// Returns the underlying I/O error when the file cannot be opened or is not
/// valid UTF-8.
pub fn read_utf8_file(path: &Utf8Path) -> io::Result<String> {
    let mut contents = String::new();
    open_utf8_file(path)?.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Create every missing ancestor directory of `path`.
///
/// Relative paths resolve from the current directory.
///
/// # Errors
///
/// Returns the I/O error raised while opening the base directory or creating
/// the missing components.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base, relative) = split_base(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?.create_dir_all(&relative)
}

/// Split `dir` into a directory cap-std can open ambiently and the relative
/// remainder beneath it.
fn split_base(dir: &Utf8Path) -> io::Result<(Utf8PathBuf, Utf8PathBuf)> {
    let std_dir = dir.as_std_path();
    let base = match std_dir.components().next() {
        // Windows drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR.to_string())
        }
        Some(Component::RootDir) => Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string()),
        _ => return Ok((Utf8PathBuf::from("."), dir.to_path_buf())),
    };
    let relative = dir
        .strip_prefix(&base)
        .map_err(|_| io::Error::other("failed to strip base from absolute path"))?
        .to_path_buf();
    Ok((base, relative))
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests fail fast on setup errors")]

    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 temp dir")
    }

    #[rstest]
    fn ensure_parent_dir_creates_nested_directories() {
        let tmp = TempDir::new().expect("tempdir");
        let target = utf8_root(&tmp).join("a/b/c/recent.db");

        ensure_parent_dir(&target).expect("parents should be created");

        assert!(target.parent().expect("has parent").is_dir());
    }

    #[rstest]
    fn read_utf8_file_returns_contents() {
        let tmp = TempDir::new().expect("tempdir");
        let file = utf8_root(&tmp).join("gates.json");
        std::fs::write(&file, "[1, 2]").expect("write file");

        assert_eq!(read_utf8_file(&file).expect("readable"), "[1, 2]");
    }
}
