//! I/O utility functions

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Temp file written next to `path` before the rename
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write bytes to a file atomically using write-then-rename pattern.
///
/// The content is first written to `<file name>.tmp` in the same directory,
/// then renamed over the target. A failed write leaves any existing target
/// untouched.
pub fn atomic_write_bytes(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp = temp_path(path);
    if let Err(e) = fs::write(&temp, content) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }
    fs::rename(&temp, path)
}

/// Write text to a file atomically
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    atomic_write_bytes(path, content.as_bytes())
}
