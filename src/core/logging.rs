//! Logging setup.
//!
//! The TUI owns the terminal, so all log output goes to a daily-rolling JSON
//! file under the data directory. `log` macros are bridged into `tracing`,
//! older log files are gzip-compressed in the background, and miette is
//! configured for whatever the terminal supports.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use supports_color::Stream;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE: &str = "campaign-forge.log";

/// Terminal color support levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLevel {
    TrueColor,
    Ansi256,
    Ansi16,
    NoColor,
}

/// Detected terminal capabilities
#[derive(Debug, Clone)]
pub struct TerminalCapabilities {
    pub color_level: ColorLevel,
    pub supports_unicode: bool,
    pub is_interactive: bool,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        use is_terminal::IsTerminal;

        let color_level = match supports_color::on(Stream::Stderr) {
            Some(support) if support.has_16m => ColorLevel::TrueColor,
            Some(support) if support.has_256 => ColorLevel::Ansi256,
            Some(support) if support.has_basic => ColorLevel::Ansi16,
            _ => ColorLevel::NoColor,
        };

        let supports_unicode = std::env::var("TERM")
            .map(|t| !t.contains("dumb"))
            .unwrap_or(true)
            && std::env::var("LANG")
                .map(|l| l.contains("UTF-8") || l.contains("utf8"))
                .unwrap_or(true);

        Self {
            color_level,
            supports_unicode,
            is_interactive: io::stderr().is_terminal(),
        }
    }

    pub fn should_colorize(&self) -> bool {
        self.is_interactive && self.color_level != ColorLevel::NoColor
    }
}

/// Default log directory: `<data_dir>/campaign-forge/logs`.
pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("campaign-forge").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Initialize file-only logging for TUI mode.
///
/// Returns a `WorkerGuard` that must live until shutdown so buffered lines
/// are flushed.
pub fn init_tui(log_dir: &Path) -> WorkerGuard {
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("Failed to create logs directory: {}", e);
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter);

    if let Err(e) = tracing_subscriber::registry().with(file_layer).try_init() {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }

    // Already installed when tracing-subscriber carries its tracing-log feature.
    if tracing_log::LogTracer::init().is_err() {
        log::debug!("log bridge already installed");
    }

    init_miette();

    let dir = log_dir.to_path_buf();
    std::thread::spawn(move || compress_old_logs(&dir));

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE)
    );

    guard
}

/// Gzip every rolled log file except today's.
fn compress_old_logs(log_dir: &Path) {
    let today = today_suffix();

    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };

    for path in entries.flatten().map(|e| e.path()) {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !should_compress(name, &today) {
            continue;
        }
        match compress_file(&path) {
            Ok(()) => log::info!("Compressed old log: {:?}", path),
            Err(e) => log::warn!("Failed to compress old log {:?}: {}", path, e),
        }
    }
}

/// Date suffix of the file the daily appender is writing. The appender rolls on UTC dates.
fn today_suffix() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn should_compress(name: &str, today_suffix: &str) -> bool {
    name.starts_with(&format!("{LOG_FILE}."))
        && !name.ends_with(today_suffix)
        && !name.ends_with(".gz")
}

fn compress_file(path: &Path) -> io::Result<()> {
    let mut gz_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No filename"))?
        .to_os_string();
    gz_name.push(".gz");
    let gz_path = path.with_file_name(gz_name);

    if gz_path.exists() {
        return Ok(());
    }

    let mut reader = io::BufReader::new(fs::File::open(path)?);
    let mut encoder = GzEncoder::new(fs::File::create(&gz_path)?, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)
}

/// Configure miette's report handler for the current terminal.
pub fn init_miette() {
    let caps = TerminalCapabilities::detect();

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(caps.color_level == ColorLevel::TrueColor)
                .unicode(caps.supports_unicode)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .color(caps.should_colorize())
                .build(),
        )
    }))
    .ok();
}
