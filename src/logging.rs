use crate::config::Config;
use crate::errors::{ChatterError, ChatterResult};
use flexi_logger::{FileSpec, Logger, LoggerHandle, WriteMode};
use std::path::Path;

/// Starts file logging into `log_dir/chatter.log`.
///
/// The terminal is owned by the UI, so nothing is ever logged to stdout.
/// `RUST_LOG` takes precedence over the configured level. The returned handle
/// must be kept alive for the lifetime of the program; dropping it flushes and
/// stops the logger.
pub fn init_logging(config: &Config, log_dir: &Path) -> ChatterResult<LoggerHandle> {
    Logger::try_with_env_or_str(&config.log_level)
        .map_err(|e| ChatterError::config_error(format!("Invalid log spec: {}", e)))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename("chatter")
                .suppress_timestamp(),
        )
        .append()
        .format(flexi_logger::detailed_format)
        .write_mode(WriteMode::BufferAndFlush)
        .start()
        .map_err(|e| ChatterError::config_error(format!("Failed to start logger: {}", e)))
}
