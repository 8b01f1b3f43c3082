//! Logging Infrastructure
//!
//! Structured logging for development and production:
//! - Console output (pretty or JSON)
//! - Daily rotating application logs (deleted after 14 days)
//! - Daily rotating security logs (`target: "security"`, never deleted)

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Days an application log file is kept
const APP_LOG_RETENTION_DAYS: i64 = 14;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Clean up application log files older than the retention window
///
/// Rolling files are named `app.YYYY-MM-DD`.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);

    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date) = name
            .strip_prefix("app.")
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        if date < cutoff {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(())
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the logging system with optional daily rotating files
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn")
/// * `json_format` - JSON output (production) instead of pretty output
/// * `log_dir` - Optional directory for file logging (e.g., Some("./data/logs"))
///
/// # Examples
/// ```no_run
/// // Development setup (console only)
/// pos_server::init_logger_with_file("debug", false, None)?;
///
/// // Production setup (console + file)
/// pos_server::init_logger_with_file("info", true, Some("./data/logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    // Console layer
    let console = fmt::layer().with_target(true).with_file(true).with_line_number(true);
    if json_format {
        layers.push(
            console
                .json()
                .with_current_span(true)
                .with_thread_ids(true)
                .with_filter(env_filter(level))
                .boxed(),
        );
    } else {
        layers.push(console.with_filter(env_filter(level)).boxed());
    }

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        let app_log_dir = log_dir.join("app");
        let security_log_dir = log_dir.join("security");
        fs::create_dir_all(&app_log_dir)?;
        fs::create_dir_all(&security_log_dir)?;

        // Application logs: everything except security events
        let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
        let app_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::sync::Mutex::new(app_log))
            .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                meta.target() != "security"
            }))
            .with_filter(env_filter(level));
        layers.push(app_layer.boxed());

        // Security logs: auth failures and permission denials
        let security_log = RollingFileAppender::new(Rotation::DAILY, security_log_dir, "security");
        let security_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::sync::Mutex::new(security_log))
            .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                meta.target() == "security"
            }));
        layers.push(security_layer.boxed());

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

/// Periodic cleanup task - runs every hour to clean old logs
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
        sleep(Duration::from_secs(3600)).await;
    }
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}
