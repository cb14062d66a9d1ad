//! Contains various `std::fs` wrapper functions that also contain the target path in their errors.

use crate::errors::FsPathError;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// The [`fs`](self) result type.
pub type Result<T> = std::result::Result<T, FsPathError>;

/// Wrapper for [`File::create`].
pub fn create_file(path: impl AsRef<Path>) -> Result<fs::File> {
    let path = path.as_ref();
    File::create(path).map_err(|err| FsPathError::create_file(err, path))
}

/// Wrapper for [`std::fs::remove_file`].
pub fn remove_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::remove_file(path).map_err(|err| FsPathError::remove_file(err, path))
}

/// Wrapper for [`std::fs::read_to_string`].
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|err| FsPathError::read(err, path))
}

/// Reads the JSON file and deserialize it into the provided type.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    // read the file into a byte array first
    // https://github.com/serde-rs/json/issues/160
    let s = read_to_string(path)?;
    serde_json::from_str(&s).map_err(|source| FsPathError::ReadJson { source, path: path.into() })
}

/// Writes the object as a pretty JSON object, indented by two spaces.
pub fn write_pretty_json_file<T: Serialize>(path: &Path, obj: &T) -> Result<()> {
    let file = create_file(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, obj)
        .map_err(|source| FsPathError::WriteJson { source, path: path.into() })?;
    writer.flush().map_err(|e| FsPathError::write(e, path))?;
    writer.get_ref().sync_all().map_err(|e| FsPathError::write(e, path))
}

/// Wrapper for [`std::fs::rename`].
pub fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    fs::rename(from, to).map_err(|err| FsPathError::rename(err, from, to))
}

/// Wrapper for [`std::fs::create_dir_all`].
pub fn create_dir_all(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|err| FsPathError::create_dir(err, path))
}

/// Writes every document as pretty JSON, either all of them or none.
///
/// Each document is written to a hidden file next to its target first. Once all of them are on
/// disk they are moved into place one by one, with every file they replace kept as a backup until
/// the last one is in. If a move fails, the targets already moved are put back as they were.
pub fn write_pretty_json_files<T: Serialize>(files: &[(PathBuf, T)]) -> Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for (target, obj) in files {
        let file = Staged { tmp: sibling(target, "tmp"), target, backup: None };
        let written = write_pretty_json_file(&file.tmp, obj);
        staged.push(file);
        if let Err(err) = written {
            discard(&staged);
            return Err(err);
        }
    }

    for i in 0..staged.len() {
        if let Err(err) = staged[i].swap_in() {
            roll_back(&staged[..=i]);
            discard(&staged);
            return Err(err);
        }
    }

    for file in &staged {
        if let Some(backup) = &file.backup
            && let Err(err) = remove_file(backup)
        {
            warn!(%err, "failed to remove backup file");
        }
        trace!(path = %file.target.display(), "wrote json file");
    }
    Ok(())
}

/// A document written next to its target.
struct Staged<'a> {
    tmp: PathBuf,
    target: &'a Path,
    /// Where the file previously at `target` was moved to
    backup: Option<PathBuf>,
}

impl Staged<'_> {
    fn swap_in(&mut self) -> Result<()> {
        if self.target.is_file() {
            let backup = sibling(self.target, "bak");
            rename(self.target, &backup)?;
            self.backup = Some(backup);
        }
        rename(&self.tmp, self.target)
    }
}

fn sibling(target: &Path, ext: &str) -> PathBuf {
    let name = target.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
    target.with_file_name(format!(".{name}.{ext}"))
}

/// Undoes [`Staged::swap_in`], last file first.
fn roll_back(staged: &[Staged<'_>]) {
    for file in staged.iter().rev() {
        let restored = match &file.backup {
            Some(backup) => rename(backup, file.target),
            // moved in, but nothing was there before
            None if !file.tmp.exists() => remove_file(file.target),
            None => Ok(()),
        };
        if let Err(err) = restored {
            warn!(%err, path = %file.target.display(), "failed to restore previous file");
        }
    }
}

fn discard(staged: &[Staged<'_>]) {
    for file in staged {
        if file.tmp.exists()
            && let Err(err) = remove_file(&file.tmp)
        {
            warn!(%err, "failed to clean up temporary file");
        }
    }
}
