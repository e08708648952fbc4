//! Errors from loading `placecost.toml`.

/// A configuration that could not be read, parsed, or accepted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the configuration schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting is outside its accepted range.
    #[error("invalid value for `{key}`: {reason}")]
    Invalid {
        /// Dotted key of the offending setting, e.g. `cost.place_cost_exp`.
        key: &'static str,
        /// What the accepted range is and what was found.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_names_the_key() {
        let err = ConfigError::Invalid {
            key: "stress.range_limit",
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for `stress.range_limit`: must be at least 1"
        );
    }

    #[test]
    fn io_error_converts() {
        fn read() -> Result<(), ConfigError> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))?;
            Ok(())
        }
        assert!(read()
            .unwrap_err()
            .to_string()
            .starts_with("failed to read configuration:"));
    }
}
