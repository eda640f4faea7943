//! Regular-expression filter adapter.
//!
//! `PatternFilter` is a custom adapter with an intentionally asymmetric
//! relation: as the outgoing filter it matches any stored text filter whose
//! content the expression matches. Stored text filters never match a pattern
//! in the other direction.

use std::any::Any;

use regex::Regex;

use crate::error::ValidationError;

use super::{Filter, FilterMatch};

/// Filter that matches stored text by regular expression.
///
/// The expression is unanchored; use `^...$` for whole-string matches.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    regex: Regex,
}

impl PatternFilter {
    /// Compiles `pattern`.
    pub fn new(pattern: &str) -> Result<Self, ValidationError> {
        let regex = Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    /// The source expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl FilterMatch for PatternFilter {
    fn matches(&self, other: &Filter) -> bool {
        match other {
            Filter::Text(text) => self.regex.is_match(text),
            Filter::Custom(_) => other
                .as_custom::<Self>()
                .is_some_and(|p| p.as_str() == self.as_str()),
            _ => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
