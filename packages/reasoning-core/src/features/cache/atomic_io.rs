//! Atomic File I/O (C2): crash-safe write, validated read with retry,
//! orphan cleanup. Temp-file-plus-rename gives POSIX atomicity within a
//! filesystem; a crash mid-write leaves the temp file behind and the
//! target untouched.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::errors::{CoreError, CoreResult};

const TMP_PREFIX: &str = ".tmp_";

fn tmp_path_for(path: &Path) -> PathBuf {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("entry");
    dir.join(format!("{TMP_PREFIX}{file_name}.{}", std::process::id()))
}

/// Best-effort exclusive lock: the corpus carries no `fs2`/`fcntl` crate, so
/// this takes the form of a sidecar lock file created with `create_new`,
/// removed once the write completes. Advisory only — it does not block
/// readers, only concurrent `atomic_write` callers that also opt in.
struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    fn acquire(target: &Path) -> std::io::Result<Self> {
        let path = target.with_extension("lock");
        OpenOptions::new().write(true).create_new(true).open(&path)?;
        Ok(Self { path })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn classify_io_error(err: &std::io::Error) -> CoreError {
    match err.raw_os_error() {
        Some(28) => CoreError::CacheDiskFull, // ENOSPC
        Some(13) => CoreError::CachePermission(err.to_string()), // EACCES
        _ => CoreError::Io(std::io::Error::new(err.kind(), err.to_string())),
    }
}

/// Write `data` to `path` via temp file + optional fsync + atomic rename.
/// `advisory_lock` takes the best-effort sidecar lock described above
/// before the temp file is written.
pub fn atomic_write(path: &Path, data: &[u8], fsync: bool, advisory_lock: bool) -> CoreResult<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let _lock = if advisory_lock {
        Some(LockGuard::acquire(path).map_err(|e| classify_io_error(&e))?)
    } else {
        None
    };

    let tmp_path = tmp_path_for(path);
    let write_result = (|| -> std::io::Result<()> {
        let mut file = File::create(&tmp_path)?;
        file.write_all(data)?;
        file.flush()?;
        if fsync {
            file.sync_all()?;
        }
        Ok(())
    })();

    if let Err(e) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(classify_io_error(&e));
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        classify_io_error(&e)
    })?;

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Missing,
    Corrupt,
}

/// Read `path`, retrying transient failures (missing/permission/short-read)
/// up to `max_retries` times with linear backoff. `validator`, if given, is
/// applied to the bytes on the final successful read; a failed validation
/// is reported as `Corrupt` and is not retried.
pub fn read_with_retry(
    path: &Path,
    max_retries: u32,
    backoff_ms: u64,
    validator: Option<&dyn Fn(&[u8]) -> bool>,
) -> Result<Vec<u8>, ReadOutcome> {
    if !path.exists() {
        return Err(ReadOutcome::Missing);
    }

    let mut attempt = 0;
    loop {
        match read_once(path) {
            Ok(bytes) => {
                if let Some(validate) = validator {
                    if !validate(&bytes) {
                        return Err(ReadOutcome::Corrupt);
                    }
                }
                return Ok(bytes);
            }
            Err(_transient) => {
                attempt += 1;
                if attempt >= max_retries {
                    return Err(ReadOutcome::Missing);
                }
                thread::sleep(Duration::from_millis(backoff_ms));
            }
        }
    }
}

fn read_once(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Delete files in `dir` whose name starts with the temp prefix and ends
/// with `suffix`. Called once at cache open to sweep crash leftovers.
pub fn cleanup_orphans(dir: &Path, suffix: &str) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    let mut count = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(TMP_PREFIX) && name.ends_with(suffix) {
            if fs::remove_file(&path).is_ok() {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn atomic_write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry.bin");
        atomic_write(&path, b"payload", true, false).unwrap();

        let bytes = read_with_retry(&path, 3, 1, None).unwrap();
        assert_eq!(bytes, b"payload");
    }

    #[test]
    fn atomic_write_leaves_no_temp_file_on_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry.bin");
        atomic_write(&path, b"data", false, false).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(TMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn read_with_retry_reports_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.bin");
        assert_eq!(read_with_retry(&path, 2, 1, None), Err(ReadOutcome::Missing));
    }

    #[test]
    fn read_with_retry_reports_corrupt_without_retrying_forever() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry.bin");
        atomic_write(&path, b"bad", false, false).unwrap();

        let validator: &dyn Fn(&[u8]) -> bool = &|b| b == b"good";
        assert_eq!(
            read_with_retry(&path, 3, 1, Some(validator)),
            Err(ReadOutcome::Corrupt)
        );
    }

    #[test]
    fn cleanup_orphans_removes_matching_temp_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(format!("{TMP_PREFIX}a.bin")), b"x").unwrap();
        fs::write(dir.path().join("real.bin"), b"y").unwrap();

        let removed = cleanup_orphans(dir.path(), ".bin");
        assert_eq!(removed, 1);
        assert!(dir.path().join("real.bin").exists());
        assert!(!dir.path().join(format!("{TMP_PREFIX}a.bin")).exists());
    }
}
