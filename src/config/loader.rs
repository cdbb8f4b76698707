//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::LoggingConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::logger::Level;

pub const ENV_LEVEL: &str = "CTXLOG_LEVEL";
pub const ENV_CONSOLE_DISABLE: &str = "CTXLOG_CONSOLE_DISABLE";
pub const ENV_CONSOLE_FORCE_JSON: &str = "CTXLOG_CONSOLE_FORCE_JSON";
pub const ENV_CONSOLE_FORCE_TTY: &str = "CTXLOG_CONSOLE_FORCE_TTY";
pub const ENV_REMOTE_ENABLED: &str = "CTXLOG_REMOTE_ENABLED";
pub const ENV_REMOTE_USE_LOGGING_AGENT: &str = "CTXLOG_REMOTE_USE_LOGGING_AGENT";
pub const ENV_REMOTE_USE_METADATA_SERVER: &str = "CTXLOG_REMOTE_USE_METADATA_SERVER";
pub const ENV_REMOTE_USE_CREDENTIALS_FILE: &str = "CTXLOG_REMOTE_USE_CREDENTIALS_FILE";
pub const ENV_REMOTE_LOG_NAME: &str = "CTXLOG_REMOTE_LOG_NAME";
pub const ENV_CREDENTIALS_PATH: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoggingConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: LoggingConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Defaults overlaid with the process environment, validated.
pub fn from_env() -> Result<LoggingConfig, ConfigError> {
    let mut config = LoggingConfig::default();
    apply_env_overrides(&mut config, std::env::vars())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay recognised variables from `vars` onto `config`.
///
/// Unknown variables are ignored. Empty values leave the setting untouched.
pub fn apply_env_overrides<I, K, V>(config: &mut LoggingConfig, vars: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (key, value) in vars {
        let value = value.as_ref().trim();
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            ENV_LEVEL => {
                config.level = value.parse::<Level>().map_err(|e| ConfigError::Env {
                    var: ENV_LEVEL,
                    message: e.to_string(),
                })?;
            }
            ENV_CONSOLE_DISABLE => config.console.disable = parse_bool(ENV_CONSOLE_DISABLE, value)?,
            ENV_CONSOLE_FORCE_JSON => config.console.force_json = parse_bool(ENV_CONSOLE_FORCE_JSON, value)?,
            ENV_CONSOLE_FORCE_TTY => config.console.force_tty = parse_bool(ENV_CONSOLE_FORCE_TTY, value)?,
            ENV_REMOTE_ENABLED => config.remote.enabled = parse_bool(ENV_REMOTE_ENABLED, value)?,
            ENV_REMOTE_USE_LOGGING_AGENT => {
                config.remote.use_logging_agent = parse_bool(ENV_REMOTE_USE_LOGGING_AGENT, value)?
            }
            ENV_REMOTE_USE_METADATA_SERVER => {
                config.remote.use_metadata_server = parse_bool(ENV_REMOTE_USE_METADATA_SERVER, value)?
            }
            ENV_REMOTE_USE_CREDENTIALS_FILE => {
                config.remote.use_credentials_file = parse_bool(ENV_REMOTE_USE_CREDENTIALS_FILE, value)?
            }
            ENV_REMOTE_LOG_NAME => config.remote.log_name = value.to_string(),
            ENV_CREDENTIALS_PATH => config.remote.credentials_path = PathBuf::from(value),
            _ => {}
        }
    }
    Ok(())
}

/// Boolean spellings accepted by Go's `strconv.ParseBool`.
fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(ConfigError::Env {
            var,
            message: format!("'{other}' is not a boolean"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "level = \"debug\"\n[console]\ndisable = true\n[remote]\nlog_name = \"api\""
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.level, Level::Debug);
        assert!(config.console.disable);
        assert_eq!(config.remote.log_name, "api");
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/ctxlog.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[remote]\nenabled = true\nbatch_size = 0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("remote.batch_size"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = LoggingConfig::default();
        apply_env_overrides(
            &mut config,
            [
                (ENV_LEVEL, "WARNING"),
                (ENV_CONSOLE_FORCE_JSON, "true"),
                (ENV_CONSOLE_FORCE_TTY, "1"),
                (ENV_REMOTE_ENABLED, "T"),
                (ENV_REMOTE_USE_METADATA_SERVER, "false"),
                (ENV_CREDENTIALS_PATH, "/secrets/key.json"),
                (ENV_REMOTE_LOG_NAME, "orders"),
                ("PATH", "/usr/bin"),
            ],
        )
        .unwrap();

        assert_eq!(config.level, Level::Warn);
        assert!(config.console.force_json);
        assert!(config.console.force_tty);
        assert!(!config.console.disable);
        assert!(config.remote.enabled);
        assert!(!config.remote.use_metadata_server);
        assert_eq!(config.remote.credentials_path, PathBuf::from("/secrets/key.json"));
        assert_eq!(config.remote.log_name, "orders");
    }

    #[test]
    fn test_env_empty_value_is_ignored() {
        let mut config = LoggingConfig::default();
        config.console.force_json = true;
        apply_env_overrides(&mut config, [(ENV_CONSOLE_FORCE_JSON, "")]).unwrap();
        assert!(config.console.force_json);
    }

    #[test]
    fn test_env_bad_values() {
        let mut config = LoggingConfig::default();
        let err = apply_env_overrides(&mut config, [(ENV_REMOTE_ENABLED, "yes")]).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_REMOTE_ENABLED, .. }));

        let err = apply_env_overrides(&mut config, [(ENV_LEVEL, "loud")]).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_LEVEL, .. }));
    }
}
