//! Logger setup: every record goes to stderr and to a timestamped log file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Log file stem for an install run.
pub const INSTALL_LOG_PREFIX: &str = "ngt_install_log";
/// Log file stem for an uninstall run.
pub const UNINSTALL_LOG_PREFIX: &str = "ngt_uninstall_log";

/// Writer duplicating everything into two sinks.
struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

/// `<dir>/<prefix>_<YYYYmmddHHMMSS>.txt`
pub fn log_file_path(dir: &Path, prefix: &str) -> PathBuf {
    dir.join(format!("{prefix}_{}.txt", Local::now().format("%Y%m%d%H%M%S")))
}

/// Install the global logger. `RUST_LOG` overrides the default `info` level.
pub fn init(dir: &Path, prefix: &str) -> Result<PathBuf> {
    let path = log_file_path(dir, prefix);
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee {
            first: file,
            second: io::stderr(),
        })))
        .try_init()
        .context("Failed to initialize logger")?;

    Ok(path)
}
