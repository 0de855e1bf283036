use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use uuid::Uuid;

/// How the finished temp file is moved onto its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    /// Atomically replace whatever is at the target.
    Replace,
    /// Fail with `AlreadyExists` if the target is present.
    CreateNew,
}

/// Removes the registered temp file when dropped unless it was consumed.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temp file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temp file {}: {}", self.path.display(), e),
        }
    }
}

/// Writes `bytes` to `target` so that readers only ever observe either the
/// previous state or the complete new file.
///
/// The data goes to an exclusively created sibling temp file first, is
/// flushed to disk and then moved into place. The temp file is removed on
/// every error path.
pub fn write_atomically(target: &Path, bytes: &[u8], mode: Publish) -> io::Result<()> {
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = target.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("No file name in {}", target.display()))
    })?;
    fs::create_dir_all(&dir)?;

    let temp_path = dir.join(format!(".{}.{}.tmp", file_name.to_string_lossy(), Uuid::new_v4()));
    let mut guard = TempFileGuard::new(temp_path);

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(guard.path())?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    match mode {
        Publish::Replace => {
            fs::rename(guard.path(), target)?;
            guard.disarm();
        }
        Publish::CreateNew => match fs::hard_link(guard.path(), target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(e),
            Err(e) => {
                // Filesystems without hard links: fall back to a checked rename.
                debug!("hard_link unavailable ({}), falling back to rename", e);
                if target.exists() {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{} already exists", target.display()),
                    ));
                }
                fs::rename(guard.path(), target)?;
                guard.disarm();
            }
        },
    }

    Ok(())
}

/// Deletes `path`, returning whether anything was removed.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
