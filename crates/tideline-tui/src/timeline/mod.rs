//! The virtualized timeline: windowing, scroll anchoring, pagination wiring

pub mod anchor;
pub mod paginator;
pub mod view;
pub mod virtualizer;
pub mod widget;

pub use anchor::{AnchorController, AnchorEffect, AnchorSnapshot, AnchorState};
pub use paginator::{PageEvent, Paginator};
pub use view::TimelineView;
pub use virtualizer::{Align, VisibleRange, Virtualizer};
pub use widget::{ItemRenderable, TextItemWidget};

/// Snapshot of the scrollable viewport, sampled on every event that needs it.
///
/// `offset` is the first content row in view; `total_rows` is the virtual
/// content height; `viewport_rows` is the window height. Nothing caches this
/// authoritatively - handlers re-read it rather than trusting values taken
/// before a suspension point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportState {
    pub offset: usize,
    pub total_rows: usize,
    pub viewport_rows: usize,
}

impl ViewportState {
    /// Rows of content below the bottom edge of the window
    pub fn bottom_gap(&self) -> usize {
        self.total_rows
            .saturating_sub(self.offset.saturating_add(self.viewport_rows))
    }

    /// Largest offset that still fills the window
    pub fn max_offset(&self) -> usize {
        self.total_rows.saturating_sub(self.viewport_rows)
    }
}
