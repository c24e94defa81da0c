//! Conversation defaults

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::{SessionDefaults, DEFAULT_GREETING};
use crate::domain::conversation::{SessionConfig, DEFAULT_CANCELLED_NOTICE, DEFAULT_FAILURE_NOTICE};

/// Conversation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Shown in place of a reply whose turn failed
    #[serde(default = "default_failure_notice")]
    pub failure_notice: String,

    /// Shown in place of a reply whose turn was cancelled
    #[serde(default = "default_cancelled_notice")]
    pub cancelled_notice: String,

    /// Greeting for sessions with neither persona nor concept
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Reply language when the client names none
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Size of the recommended list when the client names none
    #[serde(default = "default_max_recommended")]
    pub default_max_recommended: usize,

    /// Sessions untouched for this many seconds are closed
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl ConversationConfig {
    pub fn session_defaults(&self) -> SessionDefaults {
        SessionDefaults {
            language: self.default_language.clone(),
            greeting: self.greeting.clone(),
            config: SessionConfig {
                failure_notice: self.failure_notice.clone(),
                cancelled_notice: self.cancelled_notice.clone(),
            },
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("failure_notice", &self.failure_notice),
            ("cancelled_notice", &self.cancelled_notice),
            ("greeting", &self.greeting),
            ("default_language", &self.default_language),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyNotice(name));
            }
        }
        if !(1..=50).contains(&self.default_max_recommended) {
            return Err(ValidationError::InvalidMaxRecommended);
        }
        if self.idle_timeout_secs == 0 {
            return Err(ValidationError::InvalidIdleTimeout);
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            failure_notice: default_failure_notice(),
            cancelled_notice: default_cancelled_notice(),
            greeting: default_greeting(),
            default_language: default_language(),
            default_max_recommended: default_max_recommended(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

fn default_failure_notice() -> String {
    DEFAULT_FAILURE_NOTICE.to_string()
}

fn default_cancelled_notice() -> String {
    DEFAULT_CANCELLED_NOTICE.to_string()
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

fn default_language() -> String {
    "English".to_string()
}

fn default_max_recommended() -> usize {
    3
}

fn default_idle_timeout() -> u64 {
    30 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ConversationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_blank_notice_is_rejected() {
        let config = ConversationConfig {
            failure_notice: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::EmptyNotice("failure_notice")));
    }

    #[test]
    fn test_max_recommended_bounds() {
        let config = ConversationConfig {
            default_max_recommended: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidMaxRecommended));
    }

    #[test]
    fn test_zero_idle_timeout_is_rejected() {
        let config = ConversationConfig {
            idle_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidIdleTimeout));
        assert_eq!(ConversationConfig::default().idle_timeout().as_secs(), 1800);
    }

    #[test]
    fn test_session_defaults_carry_notices() {
        let config = ConversationConfig {
            cancelled_notice: "Stopped.".to_string(),
            ..Default::default()
        };
        assert_eq!(config.session_defaults().config.cancelled_notice, "Stopped.");
    }
}
