#![forbid(unsafe_code)]

//! Scripted scroll session.
//!
//! Plays the host side of the two-phase contract: scroll, render the window,
//! lay each rendered item out at its simulated height, report the heights
//! back, and re-render until the window stops moving.

use std::ops::Range;

use serde_json::json;
use tracing::{debug, warn};
use vrange_core::{ConfigError, VirtualizerConfig};
use vrange_widgets::{RenderedWindow, VirtualizedRangeRenderer, VirtualizedState};
use web_time::Instant;

/// Smallest simulated item height.
const MIN_HEIGHT: u64 = 24;
/// Span of simulated heights above the minimum.
const HEIGHT_SPAN: u64 = 137;

/// Deterministic height generator (64-bit LCG).
#[derive(Debug, Clone)]
pub struct HeightGen {
    state: u64,
}

impl HeightGen {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next height in `24..161`.
    pub fn next_height(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (MIN_HEIGHT + (self.state >> 33) % HEIGHT_SPAN) as f64
    }

    pub fn take(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.next_height()).collect()
    }
}

/// One step of the session, as printed by the demo.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub step: usize,
    pub item_count: usize,
    pub scroll_offset: f64,
    pub range: Range<usize>,
    pub offset: f64,
    pub total_extent: f64,
    /// Render passes until no measurement changed the height model.
    pub passes: usize,
    pub settled: bool,
    pub follow: bool,
    pub elapsed_us: u64,
}

impl StepRecord {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "event": "step",
            "step": self.step,
            "items": self.item_count,
            "scroll": self.scroll_offset,
            "start": self.range.start,
            "end": self.range.end,
            "offset": self.offset,
            "total": self.total_extent,
            "passes": self.passes,
            "settled": self.settled,
            "follow": self.follow,
            "elapsed_us": self.elapsed_us,
        })
    }

    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "step {:>3}  scroll {:>10.1}  items {:>5}..{:<5}  offset {:>10.1}  total {:>11.1}  passes {}{}{}",
            self.step,
            self.scroll_offset,
            self.range.start,
            self.range.end,
            self.offset,
            self.total_extent,
            self.passes,
            if self.settled { "" } else { " (unsettled)" },
            if self.follow { " [follow]" } else { "" },
        )
    }
}

/// A list of simulated items plus the virtualizer state over it.
#[derive(Debug)]
pub struct Session {
    heights: Vec<f64>,
    generator: HeightGen,
    state: VirtualizedState,
    settle_passes: usize,
}

impl Session {
    /// Build a session of `items` simulated rows.
    pub fn new(
        config: &VirtualizerConfig,
        items: usize,
        seed: u64,
        settle_passes: usize,
    ) -> Result<Self, ConfigError> {
        let state = VirtualizedState::new(config)?;
        let mut generator = HeightGen::new(seed);
        let heights = generator.take(items);
        Ok(Self {
            heights,
            generator,
            state,
            settle_passes: settle_passes.max(1),
        })
    }

    #[must_use]
    pub fn state(&self) -> &VirtualizedState {
        &self.state
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.heights.len()
    }

    /// Append `n` rows to the end of the list.
    pub fn append(&mut self, n: usize) {
        let more = self.generator.take(n);
        self.heights.extend(more);
    }

    /// Scroll by `delta`, then render and measure until the window settles.
    pub fn step(&mut self, step: usize, delta: f64) -> StepRecord {
        let started = Instant::now();
        let count = self.heights.len();
        self.state.scroll_by(delta, count);

        let fixed = self.state.heights().is_fixed();
        let renderer = VirtualizedRangeRenderer::new(&self.heights, |h: &f64, _| *h);
        let mut window: RenderedWindow<f64> = renderer.render(&mut self.state);
        let mut passes = 1;
        let mut settled = fixed;
        while !settled && passes < self.settle_passes {
            let mut changed = false;
            for &(idx, height) in &window.items {
                changed |= self.state.report_measured_height(idx, count, height);
            }
            if !changed {
                settled = true;
                break;
            }
            window = renderer.render(&mut self.state);
            passes += 1;
        }

        if settled {
            debug!(step, passes, start = window.range.start, end = window.range.end, "window settled");
        } else {
            warn!(step, passes, "window did not settle within pass limit");
        }

        StepRecord {
            step,
            item_count: count,
            scroll_offset: self.state.scroll_offset(),
            range: window.range,
            offset: window.offset,
            total_extent: window.total_extent,
            passes,
            settled,
            follow: self.state.follow_mode(),
            elapsed_us: u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
        }
    }
}
