//! Advisory whole-file locks between Cornwall processes.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Held `flock` on a lock file. Released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl FileLock {
    pub fn exclusive(path: &Path) -> io::Result<Self> {
        Self::acquire(path, true)
    }

    pub fn shared(path: &Path) -> io::Result<Self> {
        Self::acquire(path, false)
    }

    fn acquire(path: &Path, exclusive: bool) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        flock(&file, exclusive)?;
        log::trace!(target: "store", "locked {} (exclusive={})", path.display(), exclusive);
        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        unlock(&self.file);
    }
}

#[cfg(unix)]
fn flock(file: &File, exclusive: bool) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let op = if exclusive { libc::LOCK_EX } else { libc::LOCK_SH };
    loop {
        // SAFETY: the descriptor is owned by `file` and open for the call.
        let rc = unsafe { libc::flock(file.as_raw_fd(), op) };
        if rc == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(unix)]
fn unlock(file: &File) {
    use std::os::unix::io::AsRawFd;
    // SAFETY: as above; closing the file would also release the lock.
    unsafe {
        libc::flock(file.as_raw_fd(), libc::LOCK_UN);
    }
}

#[cfg(not(unix))]
fn flock(_file: &File, _exclusive: bool) -> io::Result<()> {
    Ok(())
}

#[cfg(not(unix))]
fn unlock(_file: &File) {}
