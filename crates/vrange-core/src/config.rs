#![forbid(unsafe_code)]

//! Virtualizer configuration (deterministic, env-overridable).

use std::env;
use std::fmt;

use crate::error::ConfigError;
use crate::extent::ItemExtent;

const ENV_ITEM_HEIGHT: &str = "VRANGE_ITEM_HEIGHT";
const ENV_ESTIMATED_HEIGHT: &str = "VRANGE_ESTIMATED_HEIGHT";
const ENV_OVERSCAN: &str = "VRANGE_OVERSCAN";
const ENV_CONTAINER_HEIGHT: &str = "VRANGE_CONTAINER_HEIGHT";
const ENV_HEIGHT_INDEX: &str = "VRANGE_HEIGHT_INDEX";
const ENV_FOLLOW: &str = "VRANGE_FOLLOW";

/// Default estimate for items that have not reported a measurement.
pub const DEFAULT_ESTIMATED_HEIGHT: f64 = 50.0;
/// Default number of extra items rendered on each side of the viewport.
pub const DEFAULT_OVERSCAN: usize = 5;
/// Default container height in logical pixels.
pub const DEFAULT_CONTAINER_HEIGHT: f64 = 400.0;

/// How item heights are determined.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ItemHeightSpec {
    /// Every item has the same height.
    Fixed(f64),
    /// Heights are estimated, then replaced by measurements as items render.
    #[default]
    Auto,
}

impl ItemHeightSpec {
    /// Parse `auto` or a decimal height.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("auto") {
            return Some(Self::Auto);
        }
        value.parse::<f64>().ok().map(Self::Fixed)
    }
}

impl fmt::Display for ItemHeightSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(h) => write!(f, "fixed({h})"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

/// Index structure backing measured heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum HeightIndex {
    /// Walk heights from index 0 on every query. O(n).
    Linear,
    /// Prefix sums in a Fenwick tree. O(log n).
    #[default]
    Fenwick,
}

impl HeightIndex {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linear" | "scan" => Some(Self::Linear),
            "fenwick" | "prefix" | "prefix-sum" => Some(Self::Fenwick),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Fenwick => "fenwick",
        }
    }
}

impl fmt::Display for HeightIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration surface of a virtualized list.
///
/// # Environment Variables
/// - `VRANGE_ITEM_HEIGHT` = auto | positive number
/// - `VRANGE_ESTIMATED_HEIGHT` (positive number)
/// - `VRANGE_OVERSCAN` (usize)
/// - `VRANGE_CONTAINER_HEIGHT` (non-negative number)
/// - `VRANGE_HEIGHT_INDEX` = linear | fenwick
/// - `VRANGE_FOLLOW` (bool)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct VirtualizerConfig {
    pub item_height: ItemHeightSpec,
    pub estimated_height: f64,
    pub overscan: usize,
    pub container_height: f64,
    pub height_index: HeightIndex,
    pub follow: bool,
}

impl Default for VirtualizerConfig {
    fn default() -> Self {
        Self {
            item_height: ItemHeightSpec::Auto,
            estimated_height: DEFAULT_ESTIMATED_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
            container_height: DEFAULT_CONTAINER_HEIGHT,
            height_index: HeightIndex::Fenwick,
            follow: false,
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct VirtualizerConfigParse {
    pub config: VirtualizerConfig,
    pub errors: Vec<ConfigError>,
}

impl VirtualizerConfig {
    /// Fixed-height configuration with defaults for everything else.
    #[must_use]
    pub fn fixed(item_height: f64, container_height: f64) -> Self {
        Self {
            item_height: ItemHeightSpec::Fixed(item_height),
            container_height,
            ..Self::default()
        }
    }

    /// Measured-height configuration with defaults for everything else.
    #[must_use]
    pub fn auto(estimated_height: f64, container_height: f64) -> Self {
        Self {
            item_height: ItemHeightSpec::Auto,
            estimated_height,
            container_height,
            ..Self::default()
        }
    }

    /// Set overscan.
    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Set the measured-height index strategy.
    #[must_use]
    pub fn with_height_index(mut self, index: HeightIndex) -> Self {
        self.height_index = index;
        self
    }

    /// Enable follow mode.
    #[must_use]
    pub fn with_follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> VirtualizerConfig {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> VirtualizerConfigParse {
        from_env_with(|key| env::var(key).ok())
    }

    /// Parse config from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(get: F) -> VirtualizerConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        from_env_with(get)
    }

    /// Fixed item height, if configured, validated.
    pub fn fixed_extent(&self) -> Result<Option<ItemExtent>, ConfigError> {
        match self.item_height {
            ItemHeightSpec::Fixed(h) => ItemExtent::fixed(h).map(Some),
            ItemHeightSpec::Auto => Ok(None),
        }
    }

    /// Estimate for unmeasured items, validated.
    pub fn estimated_extent(&self) -> Result<ItemExtent, ConfigError> {
        ItemExtent::estimate(self.estimated_height)
    }

    /// Container height, validated.
    pub fn checked_container_height(&self) -> Result<f64, ConfigError> {
        let h = self.container_height;
        if h.is_finite() && h >= 0.0 {
            Ok(h)
        } else {
            Err(ConfigError::InvalidContainerHeight(h))
        }
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if let Err(e) = self.fixed_extent() {
            errors.push(e);
        }
        if let Err(e) = self.estimated_extent() {
            errors.push(e);
        }
        if let Err(e) = self.checked_container_height() {
            errors.push(e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Short human-readable summary for logs.
    #[must_use]
    pub fn summary_short(&self) -> String {
        format!(
            "height={} est={} overscan={} container={} index={}",
            self.item_height,
            self.estimated_height,
            self.overscan,
            self.container_height,
            self.height_index
        )
    }
}

fn from_env_with<F>(mut get: F) -> VirtualizerConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = VirtualizerConfig::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_ITEM_HEIGHT) {
        match ItemHeightSpec::parse(&value) {
            Some(parsed) => config.item_height = parsed,
            None => errors.push(ConfigError::invalid_value(
                "item_height",
                value,
                "expected auto or a number",
            )),
        }
    }

    if let Some(value) = get(ENV_ESTIMATED_HEIGHT) {
        match parse_f64(&value) {
            Some(parsed) => config.estimated_height = parsed,
            None => errors.push(ConfigError::invalid_value(
                "estimated_height",
                value,
                "expected a number",
            )),
        }
    }

    if let Some(value) = get(ENV_OVERSCAN) {
        match parse_usize(&value) {
            Some(parsed) => config.overscan = parsed,
            None => errors.push(ConfigError::invalid_value(
                "overscan",
                value,
                "expected non-negative integer",
            )),
        }
    }

    if let Some(value) = get(ENV_CONTAINER_HEIGHT) {
        match parse_f64(&value) {
            Some(parsed) => config.container_height = parsed,
            None => errors.push(ConfigError::invalid_value(
                "container_height",
                value,
                "expected a number",
            )),
        }
    }

    if let Some(value) = get(ENV_HEIGHT_INDEX) {
        match HeightIndex::parse(&value) {
            Some(parsed) => config.height_index = parsed,
            None => errors.push(ConfigError::invalid_value(
                "height_index",
                value,
                "expected linear|fenwick",
            )),
        }
    }

    if let Some(value) = get(ENV_FOLLOW) {
        match parse_bool(&value) {
            Some(parsed) => config.follow = parsed,
            None => errors.push(ConfigError::invalid_value(
                "follow",
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }

    if let Err(mut violations) = config.validate() {
        errors.append(&mut violations);
    }

    VirtualizerConfigParse { config, errors }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse().ok()
}

fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}
