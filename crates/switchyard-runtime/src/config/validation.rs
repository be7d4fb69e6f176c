//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{
    FallbackConfig, LogOutput, LogRotation, LoggingConfig, StatusLine, SwitchyardConfig,
};

/// Validates the entire configuration.
pub fn validate_config(config: &SwitchyardConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_fallback_config(&config.fallback)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File {
        let Some(path) = &logging.file_path else {
            return Err(ConfigError::missing_field("logging.file_path"));
        };
        if path.file_name().is_none() {
            return Err(ConfigError::validation(format!(
                "log file path `{}` does not name a file",
                path.display()
            )));
        }
    }

    if logging.rotation != LogRotation::Never && logging.output != LogOutput::File {
        return Err(ConfigError::validation(
            "log rotation requires `logging.output = \"file\"`",
        ));
    }

    if let Some(target) = logging.filters.keys().find(|t| t.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "log filter target `{target}` is empty"
        )));
    }

    Ok(())
}

fn validate_fallback_config(fallback: &FallbackConfig) -> ConfigResult<()> {
    validate_status_line("fallback.not_found", &fallback.not_found)?;
    validate_status_line("fallback.internal_error", &fallback.internal_error)?;
    Ok(())
}

fn validate_status_line(field: &str, line: &StatusLine) -> ConfigResult<()> {
    if !(100..=599).contains(&line.status) {
        return Err(ConfigError::invalid_status(
            format!("{field}.status"),
            line.status,
        ));
    }

    if line.reason.trim().is_empty() {
        return Err(ConfigError::missing_field(format!("{field}.reason")));
    }

    Ok(())
}
