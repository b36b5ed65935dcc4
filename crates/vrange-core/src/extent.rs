#![forbid(unsafe_code)]

//! Validated item extents.

use crate::error::ConfigError;

/// A positive, finite item height in logical pixels.
///
/// Used both for fixed-height lists and as the estimate for items that have
/// not been measured yet. Construction is the only place a height is checked,
/// so every division by an `ItemExtent` downstream is well defined.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ItemExtent(f64);

impl ItemExtent {
    /// Validate a fixed item height.
    pub fn fixed(height: f64) -> Result<Self, ConfigError> {
        if is_positive_finite(height) {
            Ok(Self(height))
        } else {
            Err(ConfigError::InvalidItemHeight(height))
        }
    }

    /// Validate the estimate used for unmeasured items.
    pub fn estimate(height: f64) -> Result<Self, ConfigError> {
        if is_positive_finite(height) {
            Ok(Self(height))
        } else {
            Err(ConfigError::InvalidEstimatedHeight(height))
        }
    }

    /// The height in logical pixels.
    #[inline]
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for ItemExtent {
    fn default() -> Self {
        Self(1.0)
    }
}

impl From<ItemExtent> for f64 {
    fn from(extent: ItemExtent) -> Self {
        extent.0
    }
}

#[inline]
fn is_positive_finite(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Clamp a scroll offset or viewport height to a usable value.
///
/// NaN, infinities and negatives all map to `0.0`.
#[inline]
#[must_use]
pub fn sanitize_offset(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}
