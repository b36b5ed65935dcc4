#![forbid(unsafe_code)]

//! Height models for virtualized lists.
//!
//! - [`ItemHeight::Fixed`]: uniform height, everything is arithmetic.
//! - [`ItemHeight::Measured`]: [`HeightCache`], measured heights with an
//!   estimate for the rest, queried by walking from index 0.
//! - [`ItemHeight::MeasuredFenwick`]: [`VariableHeightsFenwick`], same
//!   answers as `Measured` with O(log n) queries.
//!
//! Every query takes the current item count. Heights recorded at indices at
//! or beyond that count are never read, so a shrinking list cannot surface
//! stale measurements.
//!
//! # Units
//!
//! Measured models store heights as integer multiples of
//! `1 / SUBPIXEL_SCALE` px. A height is rounded to that grid when it is
//! recorded; offsets are exact integer sums converted back to pixels at the
//! query boundary. Both measured models therefore return bit-identical
//! results regardless of summation order.
//!
//! # Bounds
//!
//! Measurements are tracked for indices below [`MAX_TRACKED_ITEMS`]. A
//! measurement past that bound is dropped and the item keeps the estimate.
//! A single height is capped at `u32::MAX` units (about 16.7 million px).

use vrange_core::{ConfigError, HeightIndex, ItemExtent, VirtualizerConfig, sanitize_offset};

use crate::fenwick::FenwickTree;

/// Fixed-point units per pixel in the measured height models.
pub const SUBPIXEL_SCALE: f64 = 256.0;

/// Number of leading items whose measurements are tracked.
pub const MAX_TRACKED_ITEMS: usize = 1 << 24;

const MAX_HEIGHT_UNITS: u64 = u32::MAX as u64;

/// Height in pixels to units, rounded to the nearest unit.
/// Non-finite and negative heights become zero.
#[inline]
fn to_units(height: f64) -> u64 {
    let scaled = (sanitize_offset(height) * SUBPIXEL_SCALE).round();
    (scaled as u64).min(MAX_HEIGHT_UNITS)
}

#[inline]
fn to_px(units: u64) -> f64 {
    units as f64 / SUBPIXEL_SCALE
}

/// Largest unit count whose pixel value is at or before `offset`.
///
/// Scaling by a power of two is exact, so for any sum `u` of units,
/// `to_px(u) <= offset` holds exactly when `u <= offset_to_units(offset)`.
/// Callers handle negative and NaN offsets first.
#[inline]
fn offset_to_units(offset: f64) -> u64 {
    // `as` saturates: infinity maps to u64::MAX.
    (offset * SUBPIXEL_SCALE).floor() as u64
}

#[inline]
fn units_for(count: usize, unit: u64) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX).saturating_mul(unit)
}

/// Items of `unit` height that fit entirely in `span` units.
#[inline]
fn items_within(span: u64, unit: u64) -> usize {
    usize::try_from(span / unit).unwrap_or(usize::MAX)
}

fn estimate_units(estimate: ItemExtent) -> u64 {
    to_units(estimate.get()).max(1)
}

/// Height calculation strategy for items.
#[derive(Debug, Clone)]
pub enum ItemHeight {
    /// All items have the same height.
    Fixed(ItemExtent),
    /// Measured heights, linear scan.
    Measured(HeightCache),
    /// Measured heights with O(log n) offset/index mapping via Fenwick tree.
    MeasuredFenwick(VariableHeightsFenwick),
}

impl Default for ItemHeight {
    fn default() -> Self {
        Self::Fixed(ItemExtent::default())
    }
}

impl ItemHeight {
    /// Build the height model a config asks for.
    pub fn from_config(config: &VirtualizerConfig) -> Result<Self, ConfigError> {
        if let Some(fixed) = config.fixed_extent()? {
            return Ok(Self::Fixed(fixed));
        }
        let estimate = config.estimated_extent()?;
        Ok(match config.height_index {
            HeightIndex::Linear => Self::Measured(HeightCache::new(estimate)),
            HeightIndex::Fenwick => Self::MeasuredFenwick(VariableHeightsFenwick::new(estimate, 0)),
        })
    }

    /// Whether every item has the same height.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }

    /// Height assumed for items with no measurement (the fixed height in
    /// fixed mode). Used to size the visible count before layout.
    #[must_use]
    pub fn estimated_height(&self) -> f64 {
        match self {
            Self::Fixed(h) => h.get(),
            Self::Measured(cache) => cache.estimate(),
            Self::MeasuredFenwick(tracker) => tracker.estimate(),
        }
    }

    /// Items needed to fill `viewport_height` at the estimated height.
    #[must_use]
    pub fn visible_count(&self, viewport_height: f64) -> usize {
        let viewport_height = sanitize_offset(viewport_height);
        (viewport_height / self.estimated_height()).ceil() as usize
    }

    /// Height of a single item.
    #[must_use]
    pub fn height_of(&self, idx: usize) -> f64 {
        match self {
            Self::Fixed(h) => h.get(),
            Self::Measured(cache) => cache.get(idx),
            Self::MeasuredFenwick(tracker) => tracker.get(idx),
        }
    }

    /// Sum of heights of items before `idx` (clamped to `len`).
    #[must_use]
    pub fn offset_of_item(&self, idx: usize, len: usize) -> f64 {
        match self {
            Self::Fixed(h) => idx.min(len) as f64 * h.get(),
            Self::Measured(cache) => cache.offset_of_item(idx, len),
            Self::MeasuredFenwick(tracker) => tracker.offset_of_item_for_len(idx, len),
        }
    }

    /// Sum of heights of the first `len` items.
    #[must_use]
    pub fn total_extent(&self, len: usize) -> f64 {
        self.offset_of_item(len, len)
    }

    /// Index of the item whose span `[top, top + height)` contains `offset`,
    /// i.e. the number of items that end at or before `offset`.
    ///
    /// Returns `len` when `offset` is at or past the total extent.
    #[must_use]
    pub fn index_at_offset(&self, offset: f64, len: usize) -> usize {
        match self {
            Self::Fixed(h) => ((offset.max(0.0) / h.get()).floor() as usize).min(len),
            Self::Measured(cache) => cache.find_item_at_offset(offset, len),
            Self::MeasuredFenwick(tracker) => tracker.find_item_at_offset_for_len(offset, len),
        }
    }

    /// Record a measured height for `idx` in a list of `len` items.
    ///
    /// Returns the height the model used for `idx` before the call, or `None`
    /// in fixed mode where measurements are not tracked.
    pub fn set_measured(&mut self, idx: usize, height: f64, len: usize) -> Option<f64> {
        match self {
            Self::Fixed(_) => None,
            Self::Measured(cache) => Some(cache.set(idx, height)),
            Self::MeasuredFenwick(tracker) => {
                let wanted = len.min(MAX_TRACKED_ITEMS);
                if tracker.len() < wanted {
                    tracker.resize(wanted);
                }
                Some(tracker.set(idx, height))
            }
        }
    }

    /// Drop every measurement. Fixed mode is unaffected.
    pub fn clear_measurements(&mut self) {
        match self {
            Self::Fixed(_) => {}
            Self::Measured(cache) => cache.clear(),
            Self::MeasuredFenwick(tracker) => tracker.clear(),
        }
    }
}

// ============================================================================
// HeightCache - linear scan baseline
// ============================================================================

/// Measured item heights, estimate for the rest.
///
/// Offsets and index lookups walk the measured prefix from index 0, so they
/// cost O(n). Fine for typical list sizes; [`VariableHeightsFenwick`] gives
/// the same answers in O(log n).
#[derive(Debug, Clone)]
pub struct HeightCache {
    /// Height measurements in units, indexed by item index.
    cache: Vec<Option<u64>>,
    /// Height for unmeasured items, in units.
    estimate_units: u64,
}

impl Default for HeightCache {
    fn default() -> Self {
        Self::new(ItemExtent::default())
    }
}

impl HeightCache {
    #[must_use]
    pub fn new(estimate: ItemExtent) -> Self {
        Self {
            cache: Vec::new(),
            estimate_units: estimate_units(estimate),
        }
    }

    /// Height used for unmeasured items, rounded to the unit grid.
    #[must_use]
    pub fn estimate(&self) -> f64 {
        to_px(self.estimate_units)
    }

    #[inline]
    fn units(&self, idx: usize) -> u64 {
        self.cache
            .get(idx)
            .copied()
            .flatten()
            .unwrap_or(self.estimate_units)
    }

    /// Get height for item, returning the estimate if not measured.
    #[must_use]
    pub fn get(&self, idx: usize) -> f64 {
        to_px(self.units(idx))
    }

    /// Whether `idx` has a measurement.
    #[must_use]
    pub fn is_measured(&self, idx: usize) -> bool {
        matches!(self.cache.get(idx), Some(Some(_)))
    }

    /// Number of measured items.
    #[must_use]
    pub fn measured_len(&self) -> usize {
        self.cache.iter().filter(|h| h.is_some()).count()
    }

    /// Set height for item. Returns the previous effective height.
    ///
    /// Indices at or past [`MAX_TRACKED_ITEMS`] are ignored.
    pub fn set(&mut self, idx: usize, height: f64) -> f64 {
        let previous = self.get(idx);
        if idx >= MAX_TRACKED_ITEMS {
            return previous;
        }
        if idx >= self.cache.len() {
            self.cache.resize(idx + 1, None);
        }
        self.cache[idx] = Some(to_units(height));
        previous
    }

    /// Clear cached heights.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    fn offset_units(&self, idx: usize, len: usize) -> u64 {
        let end = idx.min(len);
        let measured_end = end.min(self.cache.len());
        let measured = (0..measured_end).fold(0u64, |acc, i| acc.saturating_add(self.units(i)));
        measured.saturating_add(units_for(end - measured_end, self.estimate_units))
    }

    /// Sum of heights before `idx` among the first `len` items.
    #[must_use]
    pub fn offset_of_item(&self, idx: usize, len: usize) -> f64 {
        to_px(self.offset_units(idx, len))
    }

    /// Total height of the first `len` items.
    #[must_use]
    pub fn total_height(&self, len: usize) -> f64 {
        self.offset_of_item(len, len)
    }

    /// Number of items among the first `len` whose bottom edge is at or
    /// before `offset`.
    #[must_use]
    pub fn find_item_at_offset(&self, offset: f64, len: usize) -> usize {
        if offset.is_nan() || offset < 0.0 {
            return 0;
        }
        let target = offset_to_units(offset);
        let tracked = self.cache.len().min(len);
        let mut bottom = 0u64;
        for idx in 0..tracked {
            bottom = bottom.saturating_add(self.units(idx));
            if bottom > target {
                return idx;
            }
        }
        let past = items_within(target - bottom, self.estimate_units);
        tracked.saturating_add(past).min(len)
    }
}

// ============================================================================
// VariableHeightsFenwick - O(log n) scroll-to-index mapping
// ============================================================================

/// Variable height tracker using a Fenwick tree for O(log n) prefix sums.
///
/// | Operation | Time |
/// |-----------|------|
/// | `find_item_at_offset` | O(log n) |
/// | `offset_of_item` | O(log n) |
/// | `set` | O(log n) |
/// | `total_height` | O(log n) |
/// | `resize` | O(n) |
///
/// The tree covers `len()` items, at most [`MAX_TRACKED_ITEMS`]. The
/// `_for_len` queries extend it with the estimate for items past the tracked
/// range, so a list may grow without an immediate resize.
#[derive(Debug, Clone)]
pub struct VariableHeightsFenwick {
    tree: FenwickTree,
    estimate_units: u64,
}

impl Default for VariableHeightsFenwick {
    fn default() -> Self {
        Self::new(ItemExtent::default(), 0)
    }
}

impl VariableHeightsFenwick {
    /// Tracker for `len` items, all at the estimate.
    #[must_use]
    pub fn new(estimate: ItemExtent, len: usize) -> Self {
        let unit = estimate_units(estimate);
        let len = len.min(MAX_TRACKED_ITEMS);
        let tree = if len > 0 {
            FenwickTree::from_values(&vec![unit; len])
        } else {
            FenwickTree::new(0)
        };
        Self {
            tree,
            estimate_units: unit,
        }
    }

    /// Create from a slice of heights in pixels.
    #[must_use]
    pub fn from_heights(heights: &[f64], estimate: ItemExtent) -> Self {
        let mut this = Self::new(estimate, 0);
        this.rebuild(heights);
        this
    }

    /// Number of items tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Height used for unmeasured items, rounded to the unit grid.
    #[must_use]
    pub fn estimate(&self) -> f64 {
        to_px(self.estimate_units)
    }

    /// Height of a specific item.
    #[must_use]
    pub fn get(&self, idx: usize) -> f64 {
        if idx < self.tree.len() {
            to_px(self.tree.get(idx))
        } else {
            self.estimate()
        }
    }

    /// Set height of an item, growing the tracker if needed. Returns the
    /// previous effective height.
    ///
    /// Indices at or past [`MAX_TRACKED_ITEMS`] are ignored.
    pub fn set(&mut self, idx: usize, height: f64) -> f64 {
        let previous = self.get(idx);
        if idx >= MAX_TRACKED_ITEMS {
            return previous;
        }
        if idx >= self.tree.len() {
            self.resize(idx + 1);
        }
        self.tree.set(idx, to_units(height));
        previous
    }

    fn offset_units(&self, idx: usize) -> u64 {
        if idx == 0 || self.tree.is_empty() {
            return 0;
        }
        self.tree.prefix(idx.min(self.tree.len()) - 1)
    }

    /// Sum of heights of tracked items before `idx`.
    #[must_use]
    pub fn offset_of_item(&self, idx: usize) -> f64 {
        to_px(self.offset_units(idx))
    }

    fn offset_units_for_len(&self, idx: usize, len: usize) -> u64 {
        let idx = idx.min(len);
        let tracked = self.tree.len();
        if idx <= tracked {
            self.offset_units(idx)
        } else {
            self.tree
                .total()
                .saturating_add(units_for(idx - tracked, self.estimate_units))
        }
    }

    /// Sum of heights before `idx` in a list of `len` items.
    #[must_use]
    pub fn offset_of_item_for_len(&self, idx: usize, len: usize) -> f64 {
        to_px(self.offset_units_for_len(idx, len))
    }

    /// Total height of tracked items.
    #[must_use]
    pub fn total_height(&self) -> f64 {
        to_px(self.tree.total())
    }

    /// Total height of a list of `len` items.
    #[must_use]
    pub fn total_height_for_len(&self, len: usize) -> f64 {
        self.offset_of_item_for_len(len, len)
    }

    /// Index of the tracked item occupying `offset`; `len()` past the end.
    ///
    /// Item i occupies offsets `[offset_of_item(i), offset_of_item(i + 1))`.
    #[must_use]
    pub fn find_item_at_offset(&self, offset: f64) -> usize {
        self.find_item_at_offset_for_len(offset, self.tree.len())
    }

    /// Index of the item occupying `offset` in a list of `len` items.
    #[must_use]
    pub fn find_item_at_offset_for_len(&self, offset: f64, len: usize) -> usize {
        if offset.is_nan() || offset < 0.0 {
            return 0;
        }
        let target = offset_to_units(offset);
        let tracked = self.tree.len().min(len);
        let covered = self.offset_units(tracked);
        if target < covered {
            // prefix(i) is the bottom edge of item i; the item containing
            // `offset` follows the last one ending at or before it.
            return match self.tree.find_prefix(target) {
                Some(i) => (i + 1).min(tracked),
                None => 0,
            };
        }
        if tracked == len {
            return len;
        }
        let past = items_within(target - covered, self.estimate_units);
        tracked.saturating_add(past).min(len)
    }

    /// Resize the tracker; new items start at the estimate.
    pub fn resize(&mut self, new_len: usize) {
        self.tree
            .resize(new_len.min(MAX_TRACKED_ITEMS), self.estimate_units);
    }

    /// Clear all height data.
    pub fn clear(&mut self) {
        self.tree = FenwickTree::new(0);
    }

    /// Rebuild from a fresh set of heights in pixels.
    pub fn rebuild(&mut self, heights: &[f64]) {
        let units: Vec<u64> = heights
            .iter()
            .take(MAX_TRACKED_ITEMS)
            .map(|&h| to_units(h))
            .collect();
        self.tree = FenwickTree::from_values(&units);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn est(h: f64) -> ItemExtent {
        ItemExtent::estimate(h).unwrap()
    }

    #[test]
    fn visible_count_rounds_up() {
        let fixed = ItemHeight::Fixed(ItemExtent::fixed(50.0).unwrap());
        assert_eq!(fixed.visible_count(400.0), 8);
        assert_eq!(fixed.visible_count(401.0), 9);
        assert_eq!(fixed.visible_count(0.0), 0);
        assert_eq!(fixed.visible_count(f64::NAN), 0);
        let measured = ItemHeight::Measured(HeightCache::new(est(30.0)));
        assert_eq!(measured.visible_count(100.0), 4);
    }

    // HeightCache

    #[test]
    fn height_cache_defaults_to_estimate() {
        let cache = HeightCache::new(est(50.0));
        assert_eq!(cache.get(0), 50.0);
        assert_eq!(cache.get(10_000), 50.0);
        assert_eq!(cache.measured_len(), 0);
        assert!(!cache.is_measured(0));
    }

    #[test]
    fn height_cache_set_returns_previous() {
        let mut cache = HeightCache::new(est(50.0));
        assert_eq!(cache.set(3, 80.0), 50.0);
        assert_eq!(cache.set(3, 20.0), 80.0);
        assert_eq!(cache.get(3), 20.0);
        assert!(cache.is_measured(3));
        assert!(!cache.is_measured(2));
        assert_eq!(cache.measured_len(), 1);
    }

    #[test]
    fn height_cache_offsets() {
        let mut cache = HeightCache::new(est(10.0));
        cache.set(1, 30.0);
        // Heights: [10, 30, 10, 10]
        assert_eq!(cache.offset_of_item(0, 4), 0.0);
        assert_eq!(cache.offset_of_item(2, 4), 40.0);
        assert_eq!(cache.total_height(4), 60.0);
        // idx past len clamps
        assert_eq!(cache.offset_of_item(9, 4), 60.0);
    }

    #[test]
    fn height_cache_ignores_entries_past_len() {
        let mut cache = HeightCache::new(est(10.0));
        cache.set(5, 1000.0);
        assert_eq!(cache.total_height(3), 30.0);
        assert_eq!(cache.find_item_at_offset(500.0, 3), 3);
    }

    #[test]
    fn height_cache_find_item_at_offset() {
        let mut cache = HeightCache::new(est(1.0));
        for (i, h) in [3.0, 2.0, 5.0, 1.0, 4.0].into_iter().enumerate() {
            cache.set(i, h);
        }
        assert_eq!(cache.find_item_at_offset(0.0, 5), 0);
        assert_eq!(cache.find_item_at_offset(2.5, 5), 0);
        assert_eq!(cache.find_item_at_offset(3.0, 5), 1);
        assert_eq!(cache.find_item_at_offset(10.0, 5), 3);
        assert_eq!(cache.find_item_at_offset(15.0, 5), 5);
    }

    #[test]
    fn height_cache_clear() {
        let mut cache = HeightCache::new(est(5.0));
        cache.set(0, 9.0);
        cache.clear();
        assert_eq!(cache.get(0), 5.0);
        assert_eq!(cache.measured_len(), 0);
    }

    // VariableHeightsFenwick

    #[test]
    fn fenwick_new() {
        let tracker = VariableHeightsFenwick::new(est(2.0), 10);
        assert_eq!(tracker.len(), 10);
        assert!(!tracker.is_empty());
        assert_eq!(tracker.estimate(), 2.0);
        assert_eq!(tracker.total_height(), 20.0);
    }

    #[test]
    fn fenwick_default_is_empty() {
        let tracker = VariableHeightsFenwick::default();
        assert!(tracker.is_empty());
        assert_eq!(tracker.total_height(), 0.0);
    }

    #[test]
    fn fenwick_offset_of_item() {
        // Heights: [3, 2, 5, 1, 4] -> offsets: [0, 3, 5, 10, 11]
        let tracker = VariableHeightsFenwick::from_heights(&[3.0, 2.0, 5.0, 1.0, 4.0], est(1.0));
        assert_eq!(tracker.offset_of_item(0), 0.0);
        assert_eq!(tracker.offset_of_item(1), 3.0);
        assert_eq!(tracker.offset_of_item(2), 5.0);
        assert_eq!(tracker.offset_of_item(3), 10.0);
        assert_eq!(tracker.offset_of_item(4), 11.0);
        assert_eq!(tracker.offset_of_item(5), 15.0);
        assert_eq!(tracker.offset_of_item(50), 15.0);
    }

    #[test]
    fn fenwick_find_item_at_offset() {
        let tracker = VariableHeightsFenwick::from_heights(&[3.0, 2.0, 5.0, 1.0, 4.0], est(1.0));
        assert_eq!(tracker.find_item_at_offset(0.0), 0);
        assert_eq!(tracker.find_item_at_offset(1.0), 0);
        assert_eq!(tracker.find_item_at_offset(3.0), 1);
        assert_eq!(tracker.find_item_at_offset(5.0), 2);
        assert_eq!(tracker.find_item_at_offset(10.0), 3);
        assert_eq!(tracker.find_item_at_offset(11.0), 4);
        assert_eq!(tracker.find_item_at_offset(15.0), 5);
    }

    #[test]
    fn fenwick_for_len_extends_with_estimate() {
        // Two tracked items, list of five: [4, 6, 10, 10, 10]
        let tracker = VariableHeightsFenwick::from_heights(&[4.0, 6.0], est(10.0));
        assert_eq!(tracker.total_height_for_len(5), 40.0);
        assert_eq!(tracker.offset_of_item_for_len(3, 5), 20.0);
        assert_eq!(tracker.find_item_at_offset_for_len(9.0, 5), 1);
        assert_eq!(tracker.find_item_at_offset_for_len(10.0, 5), 2);
        assert_eq!(tracker.find_item_at_offset_for_len(29.9, 5), 3);
        assert_eq!(tracker.find_item_at_offset_for_len(40.0, 5), 5);
        assert_eq!(tracker.find_item_at_offset_for_len(1e9, 5), 5);
    }

    #[test]
    fn fenwick_for_len_shorter_than_tracked() {
        let tracker = VariableHeightsFenwick::from_heights(&[4.0, 6.0, 8.0], est(10.0));
        assert_eq!(tracker.total_height_for_len(2), 10.0);
        assert_eq!(tracker.find_item_at_offset_for_len(12.0, 2), 2);
        assert_eq!(tracker.find_item_at_offset_for_len(5.0, 2), 1);
    }

    #[test]
    fn fenwick_set_grows_and_returns_previous() {
        let mut tracker = VariableHeightsFenwick::new(est(1.0), 5);
        assert_eq!(tracker.set(2, 10.0), 1.0);
        assert_eq!(tracker.total_height(), 14.0);
        assert_eq!(tracker.set(7, 3.0), 1.0);
        assert_eq!(tracker.len(), 8);
        assert_eq!(tracker.total_height(), 19.0);
    }

    #[test]
    fn fenwick_resize() {
        let mut tracker = VariableHeightsFenwick::new(est(2.0), 3);
        tracker.resize(5);
        assert_eq!(tracker.total_height(), 10.0);
        assert_eq!(tracker.get(4), 2.0);
        tracker.resize(2);
        assert_eq!(tracker.total_height(), 4.0);
    }

    #[test]
    fn fenwick_clear_and_rebuild() {
        let mut tracker = VariableHeightsFenwick::from_heights(&[5.0, 5.0], est(1.0));
        tracker.clear();
        assert!(tracker.is_empty());
        assert_eq!(tracker.get(0), 1.0);
        tracker.rebuild(&[7.0, 8.0, 9.0]);
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.total_height(), 24.0);
    }

    // ItemHeight

    #[test]
    fn from_config_selects_model() {
        let fixed = ItemHeight::from_config(&VirtualizerConfig::fixed(20.0, 100.0)).unwrap();
        assert!(fixed.is_fixed());
        assert_eq!(fixed.estimated_height(), 20.0);

        let fenwick = ItemHeight::from_config(&VirtualizerConfig::auto(30.0, 100.0)).unwrap();
        assert!(matches!(fenwick, ItemHeight::MeasuredFenwick(_)));

        let linear = ItemHeight::from_config(
            &VirtualizerConfig::auto(30.0, 100.0).with_height_index(HeightIndex::Linear),
        )
        .unwrap();
        assert!(matches!(linear, ItemHeight::Measured(_)));
        assert_eq!(linear.estimated_height(), 30.0);
    }

    #[test]
    fn from_config_rejects_bad_heights() {
        let err = ItemHeight::from_config(&VirtualizerConfig::fixed(0.0, 100.0)).unwrap_err();
        assert_eq!(err, ConfigError::InvalidItemHeight(0.0));
        let err = ItemHeight::from_config(&VirtualizerConfig::auto(-5.0, 100.0)).unwrap_err();
        assert_eq!(err, ConfigError::InvalidEstimatedHeight(-5.0));
    }

    #[test]
    fn fixed_queries() {
        let heights = ItemHeight::Fixed(ItemExtent::fixed(50.0).unwrap());
        assert_eq!(heights.total_extent(1000), 50_000.0);
        assert_eq!(heights.offset_of_item(5, 1000), 250.0);
        assert_eq!(heights.index_at_offset(499.0, 1000), 9);
        assert_eq!(heights.index_at_offset(500.0, 1000), 10);
        assert_eq!(heights.index_at_offset(1e12, 1000), 1000);
        assert_eq!(heights.height_of(7), 50.0);
    }

    #[test]
    fn fixed_ignores_measurements() {
        let mut heights = ItemHeight::Fixed(ItemExtent::fixed(50.0).unwrap());
        assert_eq!(heights.set_measured(0, 10.0, 3), None);
        assert_eq!(heights.total_extent(3), 150.0);
    }

    #[test]
    fn measured_models_agree() {
        let mut linear = ItemHeight::Measured(HeightCache::new(est(50.0)));
        let mut fenwick = ItemHeight::MeasuredFenwick(VariableHeightsFenwick::new(est(50.0), 0));
        for (idx, h) in [(0, 20.0), (3, 90.0), (4, 0.0), (7, 65.0)] {
            assert_eq!(linear.set_measured(idx, h, 10), Some(50.0));
            assert_eq!(fenwick.set_measured(idx, h, 10), Some(50.0));
        }
        assert_eq!(linear.total_extent(10), fenwick.total_extent(10));
        for offset in [0.0, 19.0, 20.0, 69.0, 170.0, 215.0, 400.0, 525.0, 1000.0] {
            assert_eq!(
                linear.index_at_offset(offset, 10),
                fenwick.index_at_offset(offset, 10),
                "offset {offset}"
            );
        }
        for idx in 0..=10 {
            assert_eq!(linear.offset_of_item(idx, 10), fenwick.offset_of_item(idx, 10));
        }
    }

    #[test]
    fn clear_measurements_resets_to_estimate() {
        let mut heights = ItemHeight::MeasuredFenwick(VariableHeightsFenwick::new(est(50.0), 0));
        heights.set_measured(1, 10.0, 3);
        assert_eq!(heights.total_extent(3), 110.0);
        heights.clear_measurements();
        assert_eq!(heights.total_extent(3), 150.0);
    }
    #[test]
    fn measured_heights_round_to_unit_grid() {
        let mut cache = HeightCache::new(est(10.0));
        cache.set(0, 33.3);
        assert_eq!(cache.get(0), 8525.0 / SUBPIXEL_SCALE);
        cache.set(1, f64::NAN);
        cache.set(2, -4.0);
        assert_eq!(cache.get(1), 0.0);
        assert_eq!(cache.get(2), 0.0);
        let cache = HeightCache::new(est(0.1));
        assert_eq!(cache.estimate(), 26.0 / SUBPIXEL_SCALE);
    }

    #[test]
    fn tiny_estimate_keeps_one_unit() {
        let tracker = VariableHeightsFenwick::new(est(1e-9), 4);
        assert_eq!(tracker.estimate(), 1.0 / SUBPIXEL_SCALE);
        assert_eq!(tracker.total_height(), 4.0 / SUBPIXEL_SCALE);
    }

    #[test]
    fn fractional_heights_sum_exactly() {
        let tenths = [0.1, 0.2, 0.3, 0.1, 0.06];
        let mut linear = ItemHeight::Measured(HeightCache::new(est(0.1)));
        let mut fenwick = ItemHeight::MeasuredFenwick(VariableHeightsFenwick::new(est(0.1), 0));
        for (idx, h) in tenths.into_iter().enumerate() {
            linear.set_measured(idx, h, tenths.len());
            fenwick.set_measured(idx, h, tenths.len());
        }
        // Rebuilding the tree from scratch gives the same bits as the
        // point-updated tree and the linear walk.
        let rebuilt = VariableHeightsFenwick::from_heights(&tenths, est(0.1));
        let total = linear.total_extent(tenths.len());
        assert_eq!(total, fenwick.total_extent(tenths.len()));
        assert_eq!(total, rebuilt.total_height());
        assert_eq!(total, 195.0 / SUBPIXEL_SCALE);
    }

    #[test]
    fn fractional_models_agree_at_every_boundary() {
        for n in 7..100usize {
            let mut linear = ItemHeight::Measured(HeightCache::new(est(33.3)));
            let mut fenwick = ItemHeight::MeasuredFenwick(VariableHeightsFenwick::new(est(33.3), 0));
            for idx in 0..n {
                let h = 33.3 * [1.0, 1.1, 1.2][idx % 3];
                linear.set_measured(idx, h, n);
                fenwick.set_measured(idx, h, n);
            }
            for idx in 0..=n {
                let boundary = linear.offset_of_item(idx, n);
                assert_eq!(boundary, fenwick.offset_of_item(idx, n), "n={n} idx={idx}");
                for offset in [boundary, boundary - 0.001, boundary + 0.001] {
                    assert_eq!(
                        linear.index_at_offset(offset, n),
                        fenwick.index_at_offset(offset, n),
                        "n={n} offset={offset}"
                    );
                }
                assert_eq!(linear.index_at_offset(boundary, n), idx.min(n), "n={n} idx={idx}");
            }
        }
    }

    #[test]
    fn set_past_tracked_bound_is_ignored() {
        let mut cache = HeightCache::new(est(10.0));
        assert_eq!(cache.set(usize::MAX, 500.0), 10.0);
        assert_eq!(cache.set(MAX_TRACKED_ITEMS, 500.0), 10.0);
        assert_eq!(cache.measured_len(), 0);
        assert_eq!(cache.get(MAX_TRACKED_ITEMS), 10.0);

        let mut tracker = VariableHeightsFenwick::new(est(10.0), 3);
        assert_eq!(tracker.set(usize::MAX, 500.0), 10.0);
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.total_height(), 30.0);

        let mut heights = ItemHeight::MeasuredFenwick(VariableHeightsFenwick::new(est(10.0), 0));
        assert_eq!(heights.set_measured(usize::MAX, 500.0, usize::MAX), Some(10.0));
        assert_eq!(heights.total_extent(4), 40.0);
    }

    #[test]
    fn huge_lists_saturate_instead_of_overflowing() {
        let cache = HeightCache::new(est(50.0));
        let tracker = VariableHeightsFenwick::new(est(50.0), 2);
        assert!(cache.total_height(usize::MAX).is_finite());
        assert_eq!(cache.total_height(usize::MAX), tracker.total_height_for_len(usize::MAX));
        assert_eq!(
            cache.find_item_at_offset(f64::INFINITY, usize::MAX),
            tracker.find_item_at_offset_for_len(f64::INFINITY, usize::MAX)
        );
        assert_eq!(tracker.find_item_at_offset_for_len(f64::INFINITY, 10), 10);
    }
}
