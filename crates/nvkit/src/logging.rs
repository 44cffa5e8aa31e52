#[cfg(debug_assertions)]
use simplelog::{ColorChoice, SharedLogger, TermLogger, TerminalMode};
use simplelog::{CombinedLogger, Config, ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use nvkit_platform::AppPaths;

/// File writer that reopens its target when the log file disappears under
/// it, so rotation or manual deletion never kills logging for the rest of
/// the host process lifetime.
struct ReopeningFileWriter {
    path: PathBuf,
    file: Mutex<File>,
}

impl ReopeningFileWriter {
    fn create(path: PathBuf) -> io::Result<Self> {
        let file = append_handle(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }
}

fn append_handle(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

impl Write for ReopeningFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.path.exists() {
            *file = append_handle(&self.path)?;
        }
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

/// Drops the older half of the log, cut at a line boundary, once it grows
/// past the configured limit.
fn trim_oversized_log(path: &Path, max_size: u64) {
    let Ok(metadata) = std::fs::metadata(path) else {
        return;
    };
    if metadata.len() <= max_size {
        return;
    }
    let Ok(contents) = std::fs::read(path) else {
        return;
    };

    let midpoint = contents.len() / 2;
    let cut = contents[midpoint..]
        .iter()
        .position(|&byte| byte == b'\n')
        .map_or(midpoint, |offset| midpoint + offset + 1);
    let _ = std::fs::write(path, &contents[cut..]);
}

fn logger_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("nvkit")
        .build()
}

#[cfg(debug_assertions)]
fn install_loggers(log_path: &Path) {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Debug,
        logger_config(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Ok(writer) = ReopeningFileWriter::create(log_path.to_path_buf()) {
        loggers.push(WriteLogger::new(LevelFilter::Debug, logger_config(), writer));
    }

    let _ = CombinedLogger::init(loggers);
}

#[cfg(not(debug_assertions))]
fn install_loggers(log_path: &Path) {
    if let Ok(writer) = ReopeningFileWriter::create(log_path.to_path_buf()) {
        let _ = CombinedLogger::init(vec![WriteLogger::new(
            LevelFilter::Debug,
            logger_config(),
            writer,
        )]);
    }
}

fn resolve_log_path() -> Option<PathBuf> {
    let paths = AppPaths::new().ok()?;
    let _ = paths.ensure_dirs();
    Some(paths.log_file())
}

/// Installs the global logger: a file logger always, plus a terminal logger
/// in debug builds. Failures are swallowed since the library must work
/// without a writable data directory.
pub fn init_logging(debug_enabled: bool, max_log_size: u64) {
    let Some(log_path) = resolve_log_path() else {
        return;
    };

    trim_oversized_log(&log_path, max_log_size);
    install_loggers(&log_path);
    set_logging_enabled(debug_enabled);

    if debug_enabled {
        log::info!("Logging to {}", log_path.display());
    }
}

/// Toggles logging globally. Used when the debug-logging setting changes at
/// runtime, without tearing down the installed logger.
pub fn set_logging_enabled(enabled: bool) {
    let level = if enabled {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Off
    };
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::{ReopeningFileWriter, set_logging_enabled, trim_oversized_log};

    fn scratch_log(name: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(name);
        (dir, path)
    }

    #[test]
    fn writer_recreates_missing_file_on_write() {
        let (_dir, path) = scratch_log("debug.log");
        let mut writer = ReopeningFileWriter::create(path.clone()).expect("open writer");

        writer.write_all(b"before\n").expect("write before");
        std::fs::remove_file(&path).expect("delete log");
        writer.write_all(b"after\n").expect("write after delete");

        assert_eq!(std::fs::read_to_string(&path).expect("reread"), "after\n");
    }

    #[test]
    fn trim_keeps_the_recent_half_of_the_log() {
        let (_dir, path) = scratch_log("debug.log");
        let entries = "entry-1\nentry-2\nentry-3\nentry-4\nentry-5\n";
        std::fs::write(&path, entries).expect("seed log");

        trim_oversized_log(&path, 10);

        let trimmed = std::fs::read_to_string(&path).expect("reread");
        assert!(trimmed.len() < entries.len());
        assert!(trimmed.ends_with("entry-5\n"));
        assert!(!trimmed.contains("entry-1"));
    }

    #[test]
    fn trim_leaves_small_files_alone() {
        let (_dir, path) = scratch_log("debug.log");
        std::fs::write(&path, "short\n").expect("seed log");

        trim_oversized_log(&path, 1024);

        assert_eq!(std::fs::read_to_string(&path).expect("reread"), "short\n");
    }

    #[test]
    fn logging_toggle_switches_max_level() {
        set_logging_enabled(true);
        assert_eq!(log::max_level(), log::LevelFilter::Debug);

        set_logging_enabled(false);
        assert_eq!(log::max_level(), log::LevelFilter::Off);
    }
}
