//! Write-to-temp-then-rename file replacement.
//!
//! The rename is the atomicity boundary: a reader opening the target path
//! sees either the complete old content or the complete new content, never
//! a mix. Temp files get a random suffix so concurrent writers to different
//! files in the same directory cannot collide.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::warn;
use uuid::Uuid;

use crate::error::Result;

/// Atomically replace the file at `path` with `bytes`.
///
/// The parent directory is created if missing. If the rename fails because
/// the destination is in use in a way that prevents in-place replacement
/// (a Windows sharing-violation shape), the destination is removed and the
/// rename retried once; every other failure propagates.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let tmp = dir.join(format!(".{}-{}.tmp", base, Uuid::new_v4()));

    fs::write(&tmp, bytes)?;

    if let Err(err) = fs::rename(&tmp, path) {
        if !matches!(
            err.kind(),
            ErrorKind::PermissionDenied | ErrorKind::AlreadyExists
        ) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        warn!(path = %path.display(), "rename blocked by destination, replacing");
        if let Err(err) = fs::remove_file(path).and_then(|_| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
    }

    Ok(())
}
