//! Empty-value handling for incoming records

use serde::{Serialize, Deserialize};

use crate::record::Value;

/// Cell text that stands for "no value"
pub const EMPTY_DATUM: &str = "None";

/// Which values count as empty when sampling or loading records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullConfig {
    /// Text patterns to treat as empty
    pub patterns: Vec<String>,

    /// Whether to trim whitespace before checking
    pub trim_whitespace: bool,

    /// Case sensitive matching
    pub case_sensitive: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                String::new(),
                EMPTY_DATUM.to_string(),
                "null".to_string(),
                "NaN".to_string(),
                "N/A".to_string(),
            ],
            trim_whitespace: true,
            case_sensitive: false,
        }
    }
}

impl NullConfig {
    /// Check if raw cell text should be treated as empty
    pub fn is_null(&self, text: &str) -> bool {
        let candidate = if self.trim_whitespace {
            text.trim()
        } else {
            text
        };

        self.patterns.iter().any(|pattern| {
            if self.case_sensitive {
                candidate == pattern
            } else {
                candidate.eq_ignore_ascii_case(pattern)
            }
        })
    }

    /// Check if a record value should be treated as empty
    pub fn is_empty_value(&self, value: &Value) -> bool {
        match value {
            Value::Text(text) => self.is_null(text),
            other => other.is_null(),
        }
    }

    /// Add a pattern
    pub fn add_pattern(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns() {
        let config = NullConfig::default();
        assert!(config.is_null(""));
        assert!(config.is_null("  none "));
        assert!(config.is_null("NULL"));
        assert!(!config.is_null("SEA"));

        assert!(config.is_empty_value(&Value::Null));
        assert!(config.is_empty_value(&Value::Number(f64::NAN)));
        assert!(!config.is_empty_value(&Value::Number(0.0)));
    }

    #[test]
    fn test_case_sensitive_patterns() {
        let mut config = NullConfig { case_sensitive: true, ..NullConfig::default() };
        config.add_pattern("-");
        config.add_pattern("-");
        assert_eq!(config.patterns.iter().filter(|p| p.as_str() == "-").count(), 1);
        assert!(config.is_null("-"));
        assert!(!config.is_null("NONE"));
    }
}
