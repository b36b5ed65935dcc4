#![forbid(unsafe_code)]

//! Widgets: visible-range math and the virtualized list renderer.
//!
//! # Role in vrange
//! `vrange-widgets` turns a scroll position into the minimal slice of a large
//! list that has to be rendered. It never touches the item list beyond
//! indexing into it and performs no I/O.
//!
//! # Modules
//! - [`fenwick`]: binary indexed tree over integer height units.
//! - [`height`]: height models (fixed, linear measured cache, Fenwick
//!   measured cache) behind [`height::ItemHeight`].
//! - [`virtualized`]: [`virtualized::compute_visible_range`], viewport state,
//!   and [`virtualized::VirtualizedRangeRenderer`].
//!
//! # Two-phase contract
//! 1. The host asks for a window (`VirtualizedState::visible_window` or
//!    `VirtualizedRangeRenderer::render`) and lays out the returned items.
//! 2. The host feeds real heights back through
//!    `VirtualizedState::report_measured_height`. If any call returns `true`
//!    the window may have moved and phase 1 should run again.

pub mod fenwick;
pub mod height;
pub mod virtualized;

pub use height::{
    HeightCache, ItemHeight, MAX_TRACKED_ITEMS, SUBPIXEL_SCALE, VariableHeightsFenwick,
};
pub use virtualized::{
    RenderedWindow, Viewport, VirtualizedRangeRenderer, VirtualizedState, VisibleWindow,
    compute_visible_range,
};
