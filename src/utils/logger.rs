use tracing_appender::non_blocking::WorkerGuard;

/// Initialize logging based on VIDEOPLAYER_DEBUG environment variable
pub fn init_logging() -> Option<WorkerGuard> {
    if std::env::var("VIDEOPLAYER_DEBUG").is_ok() {
        let log_dir = log_dir();
        let _ = std::fs::create_dir_all(&log_dir);

        let file_appender = tracing_appender::rolling::daily(&log_dir, "videoplayer-bridge.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::fmt()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive(tracing::Level::DEBUG.into()),
            )
            .init();

        tracing::info!("Video player bridge logging initialized in {}", log_dir.display());
        Some(guard)
    } else {
        None
    }
}

/// Directory holding the rolling log files
pub fn log_dir() -> std::path::PathBuf {
    std::env::var_os("XDG_DATA_HOME")
        .map(std::path::PathBuf::from)
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("videoplayer-bridge")
}
