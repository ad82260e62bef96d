use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log files are `backcast.<YYYY-MM-DD>.log` inside the log directory
pub const LOG_FILE_PREFIX: &str = "backcast";
pub const LOG_FILE_SUFFIX: &str = "log";

/// Daily files kept before the oldest is deleted
const MAX_LOG_FILES: usize = 7;

/// Default directive set for a level: both crates at `level`.
pub fn default_filter(level: &str) -> String {
    format!("backcast={level},backcast_core={level}")
}

/// Daily-rotated appender in `log_dir`, keeping the last week of files
fn file_appender(log_dir: &Path) -> color_eyre::Result<RollingFileAppender> {
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)?)
}

/// Initialize tracing for the CLI.
///
/// Without a log directory, logs go to stderr so stdout stays clean for results.
/// With one, they go to a daily file under it through a non-blocking writer;
/// the returned guard must be held until exit so buffered lines are flushed.
/// `RUST_LOG` overrides `level` when set.
pub fn init_logging(
    log_dir: Option<&Path>,
    level: &str,
) -> color_eyre::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(log_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender(log_dir)?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    tracing::info!(log_dir = %log_dir.display(), "backcast logging initialized");
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_filter_covers_both_crates() {
        assert_eq!(default_filter("debug"), "backcast=debug,backcast_core=debug");
    }

    #[test]
    fn test_appender_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut appender = file_appender(dir.path()).unwrap();
        appender.write_all(b"run started\n").unwrap();
        appender.flush().unwrap();
        drop(appender);

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1, "{names:?}");
        let name = &names[0];
        assert!(name.starts_with("backcast."), "{name}");
        assert!(name.ends_with(".log"), "{name}");

        let contents = std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(contents, "run started\n");
    }

    #[test]
    fn test_appender_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        assert!(file_appender(&blocker).is_err());
    }
}
