use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::DockhandError;

const HELD_MESSAGE: &str = "another dockhand run is in progress (lock held); try again later";

/// Host-wide run lock; the lock file is removed on drop.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        // Best-effort unlock; ignore errors
        let _ = self.file.unlock();
        let _ = fs::remove_file(&self.path);
    }
}

fn try_lock(p: &Path) -> io::Result<RunLock> {
    if let Some(parent) = p.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(true)
        .open(p)?;
    f.try_lock_exclusive()?;
    Ok(RunLock {
        file: f,
        path: p.to_path_buf(),
    })
}

fn is_held(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Acquire a lock at a specific path.
pub fn acquire_lock_at(p: &Path) -> Result<RunLock, DockhandError> {
    try_lock(p).map_err(|e| {
        if is_held(&e) {
            DockhandError::Message(HELD_MESSAGE.to_string())
        } else {
            DockhandError::Message(format!("cannot create lock file {}: {e}", p.display()))
        }
    })
}

/// Acquire a non-blocking exclusive lock at the first usable candidate path.
pub fn acquire_lock() -> Result<RunLock, DockhandError> {
    let paths = candidate_lock_paths(|k| std::env::var(k).ok());
    let mut last_err: Option<io::Error> = None;

    for p in &paths {
        match try_lock(p) {
            Ok(lock) => {
                tracing::debug!(path = %p.display(), "run lock acquired");
                return Ok(lock);
            }
            // Another run owns this candidate; falling through would defeat the lock
            Err(e) if is_held(&e) => return Err(DockhandError::Message(HELD_MESSAGE.to_string())),
            Err(e) => last_err = Some(e),
        }
    }

    let mut msg = String::from("failed to create a lock file in any candidate location: ");
    msg.push_str(
        &paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    );
    if let Some(e) = last_err {
        msg.push_str(&format!(" (last error: {e})"));
    }
    Err(DockhandError::Message(msg))
}

/// Ordered candidates: `$DOCKHAND_LOCK_FILE`, `/run/lock/dockhand.lock`,
/// `$XDG_RUNTIME_DIR/dockhand.lock`, `/tmp/dockhand.lock`.
pub fn candidate_lock_paths<F>(lookup: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let mut paths = Vec::new();
    if let Some(p) = lookup("DOCKHAND_LOCK_FILE").filter(|s| !s.trim().is_empty()) {
        paths.push(PathBuf::from(p));
    }
    paths.push(PathBuf::from("/run/lock/dockhand.lock"));
    if let Some(rt) = lookup("XDG_RUNTIME_DIR").filter(|s| !s.is_empty()) {
        paths.push(PathBuf::from(rt).join("dockhand.lock"));
    }
    paths.push(PathBuf::from("/tmp/dockhand.lock"));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_lock_file_comes_first() {
        let paths = candidate_lock_paths(|k| match k {
            "DOCKHAND_LOCK_FILE" => Some("/srv/x.lock".to_string()),
            "XDG_RUNTIME_DIR" => Some("/run/user/1000".to_string()),
            _ => None,
        });
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/srv/x.lock"),
                PathBuf::from("/run/lock/dockhand.lock"),
                PathBuf::from("/run/user/1000/dockhand.lock"),
                PathBuf::from("/tmp/dockhand.lock"),
            ]
        );
    }

    #[test]
    fn second_lock_is_refused_and_file_removed_on_drop() {
        let td = tempfile::tempdir().expect("tmpdir");
        let p = td.path().join("dockhand.lock");
        let first = acquire_lock_at(&p).expect("first lock");
        let err = acquire_lock_at(&p).unwrap_err();
        assert!(err.to_string().contains("another dockhand run"), "{err}");
        drop(first);
        assert!(!p.exists());
        assert!(acquire_lock_at(&p).is_ok());
    }
}
