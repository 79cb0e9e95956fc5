use std::fs::{self, File, OpenOptions, TryLockError};
use std::io;
use std::path::{Path, PathBuf};

/// Lock file shared by every process polling the same data dir.
///
/// The OS drops the lock when the holder exits, so a crashed poll never leaves it stuck.
#[derive(Clone, Debug)]
pub struct PollLock {
    path: PathBuf,
}

/// Held for the length of one poll cycle
#[derive(Debug)]
pub struct PollGuard(File);

impl PollLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` if another poll holds the lock
    pub fn try_acquire(&self) -> io::Result<Option<PollGuard>> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        match file.try_lock() {
            Ok(()) => Ok(Some(PollGuard(file))),
            Err(TryLockError::WouldBlock) => Ok(None),
            Err(TryLockError::Error(e)) => Err(e),
        }
    }
}

impl Drop for PollGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.unlock() {
            log::warn!("Could not release poll lock: {e}");
        }
    }
}
