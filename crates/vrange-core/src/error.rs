#![forbid(unsafe_code)]

//! Configuration faults.
//!
//! Only construction can fail. Scroll offsets past the end, empty lists and
//! zero-height viewports are ordinary inputs and are clamped downstream.

use std::fmt;

/// Errors raised while building a virtualizer from its configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Fixed item height was zero, negative, or not finite.
    InvalidItemHeight(f64),
    /// Estimated height for unmeasured items was zero, negative, or not finite.
    InvalidEstimatedHeight(f64),
    /// Container height was negative or not finite.
    InvalidContainerHeight(f64),
    /// A configuration value could not be parsed.
    InvalidValue {
        field: &'static str,
        value: String,
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid_value(
        field: &'static str,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
            message: message.into(),
        }
    }

    /// Name of the configuration field this error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidItemHeight(_) => "item_height",
            Self::InvalidEstimatedHeight(_) => "estimated_height",
            Self::InvalidContainerHeight(_) => "container_height",
            Self::InvalidValue { field, .. } => field,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidItemHeight(h) => {
                write!(f, "invalid item height {h}: must be positive and finite")
            }
            Self::InvalidEstimatedHeight(h) => {
                write!(f, "invalid estimated height {h}: must be positive and finite")
            }
            Self::InvalidContainerHeight(h) => {
                write!(
                    f,
                    "invalid container height {h}: must be non-negative and finite"
                )
            }
            Self::InvalidValue {
                field,
                value,
                message,
            } => write!(f, "{field}={value} ({message})"),
        }
    }
}

impl std::error::Error for ConfigError {}
