use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Name of the log file inside the data directory
pub const LOG_FILE: &str = "fibersweep.log";

/// Rotate once the log grows past 5 MB
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Bytes of recent history carried over by a rotation
const KEEP_SIZE: u64 = 1024 * 1024;

const ROTATION_MARKER: &[u8] = b"--- Log rotated (older entries removed) ---\n";

/// Trim `log_path` to its last `keep_size` bytes once it exceeds `max_size`.
///
/// The kept tail starts on a line boundary. Returns whether a rotation happened.
fn rotate_log_if_needed(log_path: &Path, max_size: u64, keep_size: u64) -> io::Result<bool> {
    let len = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if len <= max_size {
        return Ok(false);
    }

    let back = i64::try_from(keep_size.min(len)).map_err(io::Error::other)?;
    let mut tail = Vec::new();
    let mut file = File::open(log_path)?;
    file.seek(SeekFrom::End(-back))?;
    file.read_to_end(&mut tail)?;

    let whole_lines = match tail.iter().position(|&b| b == b'\n') {
        Some(i) => &tail[i + 1..],
        None => &tail[..],
    };

    let mut rotated = Vec::with_capacity(ROTATION_MARKER.len() + whole_lines.len());
    rotated.extend_from_slice(ROTATION_MARKER);
    rotated.extend_from_slice(whole_lines);
    fs::write(log_path, rotated)?;
    Ok(true)
}

/// Send `tracing` output to `{data_dir}/fibersweep.log`.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(data_dir: &Path, level: &str) -> color_eyre::Result<()> {
    fs::create_dir_all(data_dir)?;
    let log_path = data_dir.join(LOG_FILE);

    if let Err(e) = rotate_log_if_needed(&log_path, MAX_LOG_SIZE, KEEP_SIZE) {
        eprintln!("Warning: Failed to rotate log file: {e}");
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("fibersweep={level},fibersweep_core={level}"))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    tracing::info!(log_path = %log_path.display(), "fibersweep logging initialized");
    Ok(())
}
