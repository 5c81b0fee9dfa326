use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::LockError;
use crate::Result;

const LOCK_SUFFIX: &str = ".lock";

/// An exclusively created `<target>.lock` file.
///
/// Whatever is written to it replaces the target on [`commit`](Self::commit).
/// Dropping it uncommitted deletes the lock file and leaves the target as
/// it was.
pub struct LockFile {
    target: PathBuf,
    lock: PathBuf,
    /// `None` once committed.
    file: Option<File>,
}

impl LockFile {
    /// Fails with [`LockError::AlreadyLocked`] while someone else holds the lock.
    pub fn acquire(target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let mut lock = OsString::from(target.as_os_str());
        lock.push(LOCK_SUFFIX);
        let lock = PathBuf::from(lock);

        match OpenOptions::new().write(true).create_new(true).open(&lock) {
            Ok(file) => Ok(Self {
                target,
                lock,
                file: Some(file),
            }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(LockError::AlreadyLocked { path: lock }.into())
            }
            Err(source) => Err(LockError::Create { path: lock, source }.into()),
        }
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock
    }

    /// Sync the lock file and rename it over the target.
    pub fn commit(mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        let renamed = file
            .sync_all()
            .and_then(|()| fs::rename(&self.lock, &self.target));
        if let Err(source) = renamed {
            let _ = fs::remove_file(&self.lock);
            return Err(LockError::Commit {
                path: self.lock.clone(),
                source,
            }
            .into());
        }
        Ok(())
    }

    fn open_file(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("lock file already committed"))
    }
}

impl Write for LockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.open_file()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.open_file()?.flush()
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            let _ = fs::remove_file(&self.lock);
        }
    }
}

/// Replace `path` with `contents` through a lock file, keeping the
/// permissions of an existing file.
pub fn write_atomically(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let mut lock = LockFile::acquire(path)?;
    lock.write_all(contents)?;
    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(lock.lock_path(), meta.permissions())?;
    }
    lock.commit()
}
