//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::CostConfig;
use std::path::Path;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "placecost.toml";

/// Loads `<dir>/placecost.toml`, or the defaults if the directory has none.
pub fn load_config(dir: &Path) -> Result<CostConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        return Ok(CostConfig::default());
    }
    load_config_from_path(&config_path)
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_from_path(path: &Path) -> Result<CostConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<CostConfig, ConfigError> {
    let config: CostConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks that numeric settings are in range.
pub fn validate_config(config: &CostConfig) -> Result<(), ConfigError> {
    let cost = &config.cost;
    if !cost.place_cost_exp.is_finite() || cost.place_cost_exp <= 0.0 {
        return Err(invalid(
            "cost.place_cost_exp",
            format!("must be a positive number, got {}", cost.place_cost_exp),
        ));
    }
    if cost.small_net_threshold == 0 {
        return Err(invalid("cost.small_net_threshold", "must be at least 1"));
    }
    if !(cost.error_tolerance > 0.0 && cost.error_tolerance < 1.0) {
        return Err(invalid(
            "cost.error_tolerance",
            format!("must be in (0, 1), got {}", cost.error_tolerance),
        ));
    }
    if !(0.0..=1.0).contains(&config.timing.tradeoff) {
        return Err(invalid(
            "timing.tradeoff",
            format!("must be in [0, 1], got {}", config.timing.tradeoff),
        ));
    }
    let stress = &config.stress;
    if !(0.0..=1.0).contains(&stress.accept_probability) {
        return Err(invalid(
            "stress.accept_probability",
            format!("must be in [0, 1], got {}", stress.accept_probability),
        ));
    }
    if stress.range_limit == 0 {
        return Err(invalid("stress.range_limit", "must be at least 1"));
    }
    if stress.recompute_interval == 0 {
        return Err(invalid("stress.recompute_interval", "must be at least 1"));
    }
    Ok(())
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBoxType;

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, CostConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[cost]
place_cost_exp = 2.0
small_net_threshold = 8
bounding_box = "per_layer"
error_tolerance = 0.05

[timing]
enabled = true
tradeoff = 0.3

[stress]
moves = 500
recompute_interval = 50
accept_probability = 0.25
range_limit = 3
seed = 42
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.cost.place_cost_exp, 2.0);
        assert_eq!(config.cost.small_net_threshold, 8);
        assert_eq!(config.cost.bounding_box, BoundingBoxType::PerLayer);
        assert_eq!(config.cost.error_tolerance, 0.05);
        assert!(config.timing.enabled);
        assert_eq!(config.timing.tradeoff, 0.3);
        assert_eq!(config.stress.moves, 500);
        assert_eq!(config.stress.recompute_interval, 50);
        assert_eq!(config.stress.range_limit, 3);
        assert_eq!(config.stress.seed, 42);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = load_config_from_str("[cost]\nplace_cost_exp = 3.0\n").unwrap();
        assert_eq!(config.cost.place_cost_exp, 3.0);
        assert_eq!(config.cost.small_net_threshold, 4);
        assert_eq!(config.stress.moves, 10_000);
    }

    #[test]
    fn reject_non_positive_exponent() {
        let err = load_config_from_str("[cost]\nplace_cost_exp = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn reject_zero_small_net_threshold() {
        let err = load_config_from_str("[cost]\nsmall_net_threshold = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "cost.small_net_threshold",
                ..
            }
        ));
    }

    #[test]
    fn reject_tolerance_out_of_range() {
        let err = load_config_from_str("[cost]\nerror_tolerance = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn reject_bad_accept_probability() {
        let err = load_config_from_str("[stress]\naccept_probability = -0.1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn reject_unknown_bounding_box() {
        let err = load_config_from_str("[cost]\nbounding_box = \"sphere\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = std::env::temp_dir().join("placecost_config_missing_dir_test");
        let config = load_config(&dir).unwrap();
        assert_eq!(config, CostConfig::default());
    }
}
