//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{CommandsConfig, LogOutput, LoggingConfig, RelayConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &RelayConfig) -> ConfigResult<()> {
    validate_commands_config(&config.commands)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates command trigger settings.
fn validate_commands_config(commands: &CommandsConfig) -> ConfigResult<()> {
    if commands.prefix.is_empty() {
        return Err(ConfigError::missing_field("commands.prefix"));
    }

    if commands.prefix.starts_with(char::is_whitespace) {
        return Err(ConfigError::validation(
            "Command prefix cannot start with whitespace",
        ));
    }

    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.max_files == 0 {
        return Err(ConfigError::validation("logging.max_files must be at least 1"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = RelayConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_prefix() {
        let mut config = RelayConfig::default();
        config.commands.prefix = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.commands.prefix = " !".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_file_output() {
        let mut config = RelayConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("logs/relay.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
