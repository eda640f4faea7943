//! Notification center configuration.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum length of [`CenterConfig::label`].
pub const MAX_LABEL_LEN: usize = 64;

/// Configuration for a [`NotificationCenter`](crate::NotificationCenter).
///
/// Missing fields take their default when deserialized.
///
/// # Examples
///
/// ```
/// use protocast::CenterConfig;
///
/// let cfg = CenterConfig::from_json_str(r#"{"label": "ui", "prune_stale": false}"#).unwrap();
/// assert_eq!(cfg.label, "ui");
/// assert!(cfg.catch_panics);
/// assert!(!cfg.prune_stale);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CenterConfig {
    /// Name attached to this center's log events.
    pub label: String,
    /// Isolate panics raised by delivery callbacks and report them as
    /// per-observer failures instead of unwinding through `send`.
    pub catch_panics: bool,
    /// Remove entries whose observer was dropped without being removed,
    /// after the broadcast that found them.
    pub prune_stale: bool,
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self {
            label: "default".to_string(),
            catch_panics: true,
            prune_stale: true,
        }
    }
}

impl CenterConfig {
    /// Checks field constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let label = self.label.trim();
        if label.is_empty() {
            return Err(ValidationError::MissingField {
                field: "label".to_string(),
            });
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(ValidationError::FieldTooLong {
                field: "label".to_string(),
                max_length: MAX_LABEL_LEN,
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }
}
