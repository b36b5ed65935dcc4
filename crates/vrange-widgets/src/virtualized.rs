#![forbid(unsafe_code)]

//! Virtualization primitives for rendering large lists.
//!
//! Only the items intersecting the viewport (plus an overscan margin) are
//! rendered, so render cost is bounded by the viewport, not the list length.
//!
//! # Core Types
//!
//! - [`compute_visible_range`] - pure scroll-offset to index-range mapping
//! - [`VirtualizedState`] - viewport state, height model, scroll callback
//! - [`VirtualizedRangeRenderer`] - renders the visible slice of a borrowed list
//! - [`RenderedWindow`] - what the host lays out
//!
//! # Example
//!
//! ```
//! use vrange_core::VirtualizerConfig;
//! use vrange_widgets::{VirtualizedRangeRenderer, VirtualizedState};
//!
//! let items: Vec<String> = (0..1000).map(|i| format!("Row {i}")).collect();
//! let config = VirtualizerConfig::fixed(50.0, 400.0).with_overscan(5);
//! let mut state = VirtualizedState::new(&config).unwrap();
//!
//! state.on_scroll(500.0);
//! let renderer = VirtualizedRangeRenderer::new(&items, |item: &String, _idx| item.len());
//! let window = renderer.render(&mut state);
//!
//! assert_eq!(window.range, 5..23);
//! assert_eq!(window.offset, 250.0);
//! assert_eq!(window.total_extent, 50_000.0);
//! ```

use std::fmt;
use std::ops::Range;

use vrange_core::{ConfigError, VirtualizerConfig, sanitize_offset};

use crate::height::ItemHeight;

/// Scroll position and viewport size, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Distance from the top of the content to the top of the viewport.
    pub scroll_offset: f64,
    /// Height of the visible window.
    pub viewport_height: f64,
}

impl Viewport {
    /// Build a viewport; negative or non-finite inputs become `0.0`.
    #[must_use]
    pub fn new(scroll_offset: f64, viewport_height: f64) -> Self {
        Self {
            scroll_offset: sanitize_offset(scroll_offset),
            viewport_height: sanitize_offset(viewport_height),
        }
    }
}

/// Result of a range computation.
///
/// `range` is half-open and satisfies `range.start <= range.end <= item_count`.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleWindow {
    /// Indices to render, overscan included.
    pub range: Range<usize>,
    /// Top of the first rendered item.
    pub offset: f64,
    /// Height of all items together; sizes the scroll track.
    pub total_extent: f64,
}

impl VisibleWindow {
    /// The window of an empty list.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            range: 0..0,
            offset: 0.0,
            total_extent: 0.0,
        }
    }

    #[must_use]
    pub fn start(&self) -> usize {
        self.range.start
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// Number of items to render.
    #[must_use]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    #[must_use]
    pub fn contains(&self, idx: usize) -> bool {
        self.range.contains(&idx)
    }
}

/// Compute the index range covering `viewport`, plus `overscan` items per side.
///
/// Fixed heights:
/// - `first = floor(scroll / h)`
/// - `start = first - overscan` (saturating)
/// - `end = first + ceil(viewport / h) + overscan`
///
/// Measured heights:
/// - `start` is the item containing `scroll - overscan * estimate`
/// - `end = start + ceil(viewport / estimate) + 2 * overscan`
///
/// Both ends are clamped to `item_count`, so scrolling past the end yields a
/// short or empty range rather than an error. Pure: identical inputs give
/// identical windows.
#[must_use]
pub fn compute_visible_range(
    item_count: usize,
    heights: &ItemHeight,
    overscan: usize,
    viewport: Viewport,
) -> VisibleWindow {
    if item_count == 0 {
        return VisibleWindow::empty();
    }
    let scroll = sanitize_offset(viewport.scroll_offset);
    let viewport_height = sanitize_offset(viewport.viewport_height);

    let (start, end) = match heights {
        ItemHeight::Fixed(h) => {
            let h = h.get();
            let first = (scroll / h).floor() as usize;
            let visible = heights.visible_count(viewport_height);
            let start = first.saturating_sub(overscan).min(item_count);
            let end = first
                .saturating_add(visible)
                .saturating_add(overscan)
                .min(item_count);
            (start, end.max(start))
        }
        ItemHeight::Measured(_) | ItemHeight::MeasuredFenwick(_) => {
            let estimate = heights.estimated_height();
            let threshold = (scroll - overscan as f64 * estimate).max(0.0);
            // At the top nothing has scrolled past, zero-height leaders included.
            let start = if threshold > 0.0 {
                heights.index_at_offset(threshold, item_count).min(item_count)
            } else {
                0
            };
            let visible = heights.visible_count(viewport_height);
            let end = start
                .saturating_add(visible)
                .saturating_add(overscan.saturating_mul(2))
                .min(item_count);
            (start, end)
        }
    };

    VisibleWindow {
        range: start..end,
        offset: heights.offset_of_item(start, item_count),
        total_extent: heights.total_extent(item_count),
    }
}

// ============================================================================
// VirtualizedState
// ============================================================================

type ScrollCallback = Box<dyn FnMut(f64)>;

/// Viewport state and height model of one mounted list.
///
/// Created once per mount and kept for its lifetime. The scroll offset is
/// last-write-wins; the height model only changes through
/// [`report_measured_height`](Self::report_measured_height) and
/// [`items_replaced`](Self::items_replaced).
pub struct VirtualizedState {
    viewport: Viewport,
    overscan: usize,
    heights: ItemHeight,
    /// Keep the viewport pinned to the bottom as items are appended.
    follow_mode: bool,
    /// Item count seen by the last `visible_window` call.
    last_item_count: usize,
    on_scroll: Option<ScrollCallback>,
}

impl fmt::Debug for VirtualizedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualizedState")
            .field("viewport", &self.viewport)
            .field("overscan", &self.overscan)
            .field("heights", &self.heights)
            .field("follow_mode", &self.follow_mode)
            .field("last_item_count", &self.last_item_count)
            .field("on_scroll", &self.on_scroll.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl VirtualizedState {
    /// Build from configuration. Invalid heights are rejected here, before
    /// any range is computed.
    pub fn new(config: &VirtualizerConfig) -> Result<Self, ConfigError> {
        let heights = ItemHeight::from_config(config)?;
        let container_height = config.checked_container_height()?;
        Ok(Self {
            viewport: Viewport::new(0.0, container_height),
            overscan: config.overscan,
            heights,
            follow_mode: config.follow,
            last_item_count: 0,
            on_scroll: None,
        })
    }

    /// Replace the height model.
    #[must_use]
    pub fn with_item_height(mut self, heights: ItemHeight) -> Self {
        self.heights = heights;
        self
    }

    /// Set overscan amount.
    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Enable follow mode.
    #[must_use]
    pub fn with_follow(mut self, follow: bool) -> Self {
        self.follow_mode = follow;
        self
    }

    /// Callback invoked with the new offset after every scroll update.
    #[must_use]
    pub fn with_on_scroll(mut self, callback: impl FnMut(f64) + 'static) -> Self {
        self.on_scroll = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.viewport.scroll_offset
    }

    #[must_use]
    pub fn viewport_height(&self) -> f64 {
        self.viewport.viewport_height
    }

    #[must_use]
    pub fn overscan(&self) -> usize {
        self.overscan
    }

    #[must_use]
    pub fn heights(&self) -> &ItemHeight {
        &self.heights
    }

    #[must_use]
    pub fn follow_mode(&self) -> bool {
        self.follow_mode
    }

    /// Update the container height (e.g. on resize).
    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport.viewport_height = sanitize_offset(height);
    }

    /// Scroll event from the host. Last write wins.
    ///
    /// The offset is not clamped to the content: an overscrolled offset just
    /// yields a short window. Scrolling up, or to any offset above the
    /// bottom of the last list phase 1 saw, ends follow mode.
    pub fn on_scroll(&mut self, scroll_offset: f64) {
        let offset = sanitize_offset(scroll_offset);
        if self.follow_mode
            && (offset < self.viewport.scroll_offset
                || offset < self.max_scroll_offset(self.last_item_count))
        {
            self.follow_mode = false;
        }
        self.apply_scroll(offset);
    }

    fn apply_scroll(&mut self, offset: f64) {
        self.viewport.scroll_offset = offset;
        if let Some(callback) = self.on_scroll.as_mut() {
            callback(offset);
        }
    }

    /// Largest offset that still fills the viewport.
    #[must_use]
    pub fn max_scroll_offset(&self, item_count: usize) -> f64 {
        (self.heights.total_extent(item_count) - self.viewport.viewport_height).max(0.0)
    }

    /// Check if scrolled to bottom.
    #[must_use]
    pub fn is_at_bottom(&self, item_count: usize) -> bool {
        self.viewport.scroll_offset >= self.max_scroll_offset(item_count)
    }

    /// Scroll by delta (positive = down), clamped to the content.
    pub fn scroll_by(&mut self, delta: f64, item_count: usize) {
        if !delta.is_finite() || delta == 0.0 {
            return;
        }
        let max = self.max_scroll_offset(item_count);
        let target = (self.viewport.scroll_offset + delta).clamp(0.0, max);
        self.follow_mode = false;
        self.apply_scroll(target);
    }

    /// Scroll so item `idx` sits at the top of the viewport (as far as the
    /// content allows).
    pub fn scroll_to_index(&mut self, idx: usize, item_count: usize) {
        if item_count == 0 {
            return;
        }
        let idx = idx.min(item_count - 1);
        let target = self
            .heights
            .offset_of_item(idx, item_count)
            .min(self.max_scroll_offset(item_count));
        self.follow_mode = false;
        self.apply_scroll(target);
    }

    /// Scroll to top.
    pub fn scroll_to_top(&mut self) {
        self.follow_mode = false;
        self.apply_scroll(0.0);
    }

    /// Scroll to bottom.
    pub fn scroll_to_bottom(&mut self, item_count: usize) {
        let target = self.max_scroll_offset(item_count);
        self.apply_scroll(target);
    }

    /// Scroll to bottom and enable follow mode.
    pub fn scroll_to_end(&mut self, item_count: usize) {
        self.scroll_to_bottom(item_count);
        self.follow_mode = true;
    }

    /// Page up (scroll by viewport height).
    pub fn page_up(&mut self, item_count: usize) {
        self.scroll_by(-self.viewport.viewport_height, item_count);
    }

    /// Page down (scroll by viewport height).
    pub fn page_down(&mut self, item_count: usize) {
        self.scroll_by(self.viewport.viewport_height, item_count);
    }

    /// Window for the current state, without side effects.
    #[must_use]
    pub fn window(&self, item_count: usize) -> VisibleWindow {
        compute_visible_range(item_count, &self.heights, self.overscan, self.viewport)
    }

    /// Phase 1: window to render for a list of `item_count` items.
    ///
    /// In follow mode a changed item count re-anchors the viewport to the
    /// bottom first.
    pub fn visible_window(&mut self, item_count: usize) -> VisibleWindow {
        if self.follow_mode && item_count != self.last_item_count {
            self.scroll_to_bottom(item_count);
        }
        self.last_item_count = item_count;
        self.window(item_count)
    }

    /// Phase 2: feed back the laid-out height of item `index`.
    ///
    /// Returns `true` if the height model changed, in which case the window
    /// may have moved and phase 1 should run again. Out-of-range indices,
    /// negative or non-finite heights, and fixed-height lists are ignored.
    pub fn report_measured_height(&mut self, index: usize, item_count: usize, height: f64) -> bool {
        if index >= item_count {
            #[cfg(feature = "tracing")]
            vrange_core::trace!(index, item_count, "measurement past end ignored");
            return false;
        }
        if !height.is_finite() || height < 0.0 {
            #[cfg(feature = "tracing")]
            vrange_core::warn!(index, height, "invalid measured height ignored");
            return false;
        }
        let Some(previous) = self.heights.set_measured(index, height, item_count) else {
            return false;
        };
        // Compare what the model stored, not the raw report: stored heights
        // are rounded, so a repeated report must not count as a change.
        let stored = self.heights.height_of(index);
        if previous == stored {
            return false;
        }
        #[cfg(feature = "tracing")]
        vrange_core::trace!(index, previous, stored, "measured height updated");
        true
    }

    /// The list changed identity; drop all measurements.
    pub fn items_replaced(&mut self) {
        #[cfg(feature = "tracing")]
        vrange_core::debug!(
            last_item_count = self.last_item_count,
            "items replaced, clearing height cache"
        );
        self.heights.clear_measurements();
    }
}

// ============================================================================
// VirtualizedRangeRenderer
// ============================================================================

/// Output of a render pass, consumed by the host.
///
/// The host draws a container `container_height` tall holding a scrollable
/// region `total_extent` tall, and stacks `items` starting at `offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedWindow<R> {
    pub container_height: f64,
    pub total_extent: f64,
    pub offset: f64,
    pub range: Range<usize>,
    /// Rendered items paired with their list index, in order.
    pub items: Vec<(usize, R)>,
}

impl<R> RenderedWindow<R> {
    /// Space left below the rendered items, assuming they lay out at
    /// `heights`.
    #[must_use]
    pub fn trailing_space(&self, heights: &ItemHeight, item_count: usize) -> f64 {
        (self.total_extent - heights.offset_of_item(self.range.end, item_count)).max(0.0)
    }
}

/// A virtualized list renderer that renders only visible items.
///
/// Borrows the item list; never mutates it. `render_item` is called once per
/// index in the visible window and for no other index.
pub struct VirtualizedRangeRenderer<'a, T, F> {
    items: &'a [T],
    render_item: F,
}

impl<T, F> fmt::Debug for VirtualizedRangeRenderer<'_, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualizedRangeRenderer")
            .field("items", &self.items.len())
            .finish_non_exhaustive()
    }
}

impl<'a, T, F, R> VirtualizedRangeRenderer<'a, T, F>
where
    F: Fn(&T, usize) -> R,
{
    /// Create a renderer over `items`.
    #[must_use]
    pub fn new(items: &'a [T], render_item: F) -> Self {
        Self { items, render_item }
    }

    #[must_use]
    pub fn items(&self) -> &'a [T] {
        self.items
    }

    /// Render the visible window for `state`.
    pub fn render(&self, state: &mut VirtualizedState) -> RenderedWindow<R> {
        #[cfg(feature = "tracing")]
        let _span = vrange_core::debug_span!(
            "virtualized_render",
            items = self.items.len(),
            scroll = state.scroll_offset(),
            viewport = state.viewport_height()
        )
        .entered();

        let window = state.visible_window(self.items.len());
        let rendered = self.items[window.range.clone()]
            .iter()
            .zip(window.range.clone())
            .map(|(item, idx)| (idx, (self.render_item)(item, idx)))
            .collect();

        #[cfg(feature = "tracing")]
        vrange_core::trace!(
            start = window.range.start,
            end = window.range.end,
            offset = window.offset,
            total = window.total_extent,
            "rendered window"
        );

        RenderedWindow {
            container_height: state.viewport_height(),
            total_extent: window.total_extent,
            offset: window.offset,
            range: window.range,
            items: rendered,
        }
    }
}
