//! The `CU_DEBUG` logger.
//!
//! Setting the `CU_DEBUG` environment variable to `stdout` sends the crate's
//! `log` output to standard output; any other value names a file the lines are
//! appended to. When the variable is unset nothing is installed and logging
//! stays with whatever logger the host process set up.
//!
//! Each line looks like:
//!
//! ```text
//! [2026-10-18 13:37:00.123456] [ThreadId(1)]: src/std_association.rs(312): Getting handler ...
//! ```

use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::io::{self, LineWriter, Write};
use std::path::PathBuf;
use std::thread;

use chrono::Local;
use env_logger::fmt::Formatter;
use env_logger::{Builder, Target};
use lazy_static::lazy_static;
use log::{debug, LevelFilter, Record};

pub const CU_DEBUG: &str = "CU_DEBUG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugTarget {
    Stdout,
    File(PathBuf),
}

impl DebugTarget {
    pub fn parse(value: &OsStr) -> Self {
        if value == "stdout" {
            DebugTarget::Stdout
        } else {
            DebugTarget::File(PathBuf::from(value))
        }
    }

    /// The target named by `CU_DEBUG`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var_os(CU_DEBUG).map(|value| Self::parse(&value))
    }
}

fn format_record(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    writeln!(
        buf,
        "[{}] [{:?}]: {}({}): {}",
        Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
        thread::current().id(),
        record.file().unwrap_or("<unknown>"),
        record.line().unwrap_or(0),
        record.args()
    )
}

/// A logger builder writing every record, in the `CU_DEBUG` line format, to `target`.
///
/// File targets are opened for appending and written line by line.
pub fn builder(target: DebugTarget) -> io::Result<Builder> {
    let target = match target {
        DebugTarget::Stdout => Target::Stdout,
        DebugTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Target::Pipe(Box::new(LineWriter::new(file)))
        }
    };

    let mut builder = Builder::new();
    builder
        .target(target)
        .filter_level(LevelFilter::Trace)
        .format(format_record);

    Ok(builder)
}

fn install(target: Option<DebugTarget>) -> bool {
    let target = match target {
        Some(target) => target,
        None => return false,
    };

    let mut builder = match builder(target) {
        Ok(builder) => builder,
        Err(e) => {
            // No logger of ours yet; this reaches a host logger if there is one.
            debug!("Unable to open {} target: {}", CU_DEBUG, e);
            return false;
        }
    };

    builder.try_init().is_ok()
}

lazy_static! {
    static ref INSTALLED: bool = install(DebugTarget::from_env());
}

/// Install the `CU_DEBUG` logger as the global logger.
///
/// Only the first call does anything. Returns whether the logger is installed:
/// `false` if `CU_DEBUG` is unset, its file can't be opened or another logger was
/// installed first.
pub fn init() -> bool {
    *INSTALLED
}
