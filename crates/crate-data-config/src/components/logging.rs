//! Logging configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `crate_data_web=debug,info`.
    /// Unset defers to `RUST_LOG`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    pub format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_is_unset_by_default() {
        let config: LoggingConfig = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(config.level, None);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(LoggingConfig::default().level, None);
    }
}
