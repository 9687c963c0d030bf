//! Log setup for the tau binary.
//!
//! The library only talks to the `log` facade. The binary installs `env_logger` when `RUST_LOG`
//! is set, writing to a file so log lines never end up on the terminal the UI draws on.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;

/// `<cache dir>/tau/tau.log`, or `./tau.log` without a cache directory.
pub fn log_path() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("tau"))
        .unwrap_or_default()
        .join("tau.log")
}

/// Installs the file logger if `RUST_LOG` is set.
///
/// Returns the log file path when logging was enabled.
pub fn init_logging() -> io::Result<Option<PathBuf>> {
    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(None);
    }

    let path = log_path();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(io::Error::other)?;

    log::info!("tau {} logging to {}", env!("CARGO_PKG_VERSION"), path.display());
    Ok(Some(path))
}
