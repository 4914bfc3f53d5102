//! Scroll-anchor policy - what "keep my place" means for each disruption
//!
//! The controller is a pure state machine over explicit [`ViewportState`]
//! values: every handler takes the current viewport, updates the anchor
//! state, and returns effects for the view to execute. It never touches the
//! terminal itself, which keeps the interleaving rules testable - a resize
//! arriving mid-pagination is just two handler calls in either order.

use tracing::debug;

use super::ViewportState;

/// Index/boolean pair used to restore perceived position across disruptions.
///
/// Absolute row offsets do not survive a hide/show cycle that may have
/// re-wrapped unrelated content, so the restore contract is defined on item
/// index, not rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorSnapshot {
    pub was_at_bottom: bool,
    pub first_visible: usize,
}

impl Default for AnchorSnapshot {
    fn default() -> Self {
        Self {
            was_at_bottom: true,
            first_visible: 0,
        }
    }
}

/// Viewport attachment state.
///
/// Pagination serialization is deliberately not a variant here: a page load
/// can be in flight while the viewport hides, resizes or keeps scrolling, so
/// it lives in the paginator's guard instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorState {
    /// At the bottom; tail growth pulls the viewport along
    Following,
    /// Scrolled up; tail growth must not move the viewport
    Free { first_visible: usize },
    /// Container collapsed to zero size; `snapshot` restores on resume
    Hidden { snapshot: AnchorSnapshot },
}

/// Instructions for the view, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorEffect {
    /// Pin the viewport to the last row of content
    StickToBottom,
    /// Scroll so the given item index is at the top of the window
    RestoreIndex(usize),
    /// Shift the offset down by this many rows (prepend compensation)
    AdjustOffset(usize),
    /// Discard cached heights and re-lay out
    Remeasure,
    /// Ask the paginator for an older page (view gates on has_more/loading)
    RequestOlder,
}

#[derive(Debug)]
pub struct AnchorController {
    state: AnchorState,
    snapshot: AnchorSnapshot,
    live: bool,
    follow_threshold_rows: usize,
    prefetch_threshold_rows: usize,
    width_tolerance_cols: u16,
}

impl AnchorController {
    pub fn new(
        follow_threshold_rows: usize,
        prefetch_threshold_rows: usize,
        width_tolerance_cols: u16,
    ) -> Self {
        Self {
            state: AnchorState::Following,
            snapshot: AnchorSnapshot::default(),
            live: true,
            follow_threshold_rows,
            prefetch_threshold_rows,
            width_tolerance_cols,
        }
    }

    pub fn state(&self) -> AnchorState {
        self.state
    }

    pub fn snapshot(&self) -> AnchorSnapshot {
        self.snapshot
    }

    pub fn is_following(&self) -> bool {
        matches!(self.state, AnchorState::Following)
    }

    /// Whether auto-follow is permitted at all; a finished conversation
    /// never pulls the viewport
    pub fn set_live(&mut self, live: bool) {
        self.live = live;
        if !live && matches!(self.state, AnchorState::Following) {
            self.state = AnchorState::Free {
                first_visible: self.snapshot.first_visible,
            };
        }
    }

    /// Continuous recording of the top-of-window item, called after each
    /// settled layout so a later disruption restores the position the user
    /// actually saw. Never transitions state; a hidden anchor keeps its
    /// captured snapshot.
    pub fn record_first_visible(&mut self, first_visible: usize) {
        if matches!(self.state, AnchorState::Hidden { .. }) {
            return;
        }
        self.snapshot.first_visible = first_visible;
        if let AnchorState::Free { first_visible: fv } = &mut self.state {
            *fv = first_visible;
        }
    }

    /// Scroll notification: recompute the snapshot and the follow state,
    /// and trigger pagination when the top edge is close.
    pub fn on_scroll(
        &mut self,
        viewport: &ViewportState,
        first_visible: usize,
    ) -> Vec<AnchorEffect> {
        if matches!(self.state, AnchorState::Hidden { .. }) {
            return Vec::new();
        }

        let was_at_bottom = viewport.bottom_gap() < self.follow_threshold_rows;
        self.snapshot = AnchorSnapshot {
            was_at_bottom,
            first_visible,
        };
        self.state = if was_at_bottom && self.live {
            AnchorState::Following
        } else {
            AnchorState::Free { first_visible }
        };

        let mut effects = Vec::new();
        if viewport.offset <= self.prefetch_threshold_rows
            && viewport.total_rows > viewport.viewport_rows
        {
            effects.push(AnchorEffect::RequestOlder);
        }
        effects
    }

    /// New content arrived at the tail
    pub fn on_items_appended(&mut self) -> Vec<AnchorEffect> {
        match self.state {
            AnchorState::Following if self.live => vec![AnchorEffect::StickToBottom],
            _ => Vec::new(),
        }
    }

    /// Older content was inserted above the viewport, `row_delta` rows tall.
    ///
    /// The visual position must not change even though every visible index
    /// just shifted, so the raw offset moves down by exactly the added
    /// height. A zero delta means nothing changed and nothing moves; a
    /// hidden viewport is detached and gets no compensation - its restore
    /// path is index-based.
    pub fn on_prepended(&mut self, row_delta: usize) -> Vec<AnchorEffect> {
        if row_delta == 0 || matches!(self.state, AnchorState::Hidden { .. }) {
            return Vec::new();
        }
        debug!(target: "tui.timeline", row_delta, "compensating prepend");
        vec![AnchorEffect::AdjustOffset(row_delta)]
    }

    /// Container size change, including collapse to zero and back
    pub fn on_resize(
        &mut self,
        old: (u16, u16),
        new: (u16, u16),
    ) -> Vec<AnchorEffect> {
        let (old_w, old_h) = old;
        let (new_w, new_h) = new;
        let was_hidden = matches!(self.state, AnchorState::Hidden { .. });

        if new_w == 0 || new_h == 0 {
            if !was_hidden {
                debug!(target: "tui.timeline", "viewport hidden, capturing anchor");
                self.state = AnchorState::Hidden {
                    snapshot: self.snapshot,
                };
            }
            return Vec::new();
        }

        if let AnchorState::Hidden { snapshot } = self.state {
            // Resumed: absolute rows are meaningless now, restore by index
            self.state = if snapshot.was_at_bottom && self.live {
                AnchorState::Following
            } else {
                AnchorState::Free {
                    first_visible: snapshot.first_visible,
                }
            };
            let restore = if snapshot.was_at_bottom {
                AnchorEffect::StickToBottom
            } else {
                AnchorEffect::RestoreIndex(snapshot.first_visible)
            };
            return vec![AnchorEffect::Remeasure, restore];
        }

        let mut effects = Vec::new();
        if old_w.abs_diff(new_w) > self.width_tolerance_cols {
            // Wrapped text re-flows; heights are stale but the anchor holds
            effects.push(AnchorEffect::Remeasure);
        }
        if new_h < old_h && matches!(self.state, AnchorState::Following) {
            // Panel shrink while followed: keep the tail pinned
            effects.push(AnchorEffect::StickToBottom);
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> AnchorController {
        AnchorController::new(4, 2, 2)
    }

    fn viewport(offset: usize, total: usize, window: usize) -> ViewportState {
        ViewportState {
            offset,
            total_rows: total,
            viewport_rows: window,
        }
    }

    #[test]
    fn test_append_sticks_while_following() {
        // Tail appends keep the last item visible while at bottom.
        let mut anchor = controller();
        assert!(anchor.is_following());
        assert_eq!(
            anchor.on_items_appended(),
            vec![AnchorEffect::StickToBottom]
        );
    }

    #[test]
    fn test_scroll_up_past_threshold_suspends_follow() {
        let mut anchor = controller();
        // Gap of 10 rows from the bottom: well past the threshold.
        anchor.on_scroll(&viewport(30, 100, 60), 3);
        assert!(matches!(anchor.state(), AnchorState::Free { first_visible: 3 }));

        // Appends no longer move the viewport.
        assert!(anchor.on_items_appended().is_empty());
    }

    #[test]
    fn test_small_gap_still_counts_as_bottom() {
        let mut anchor = controller();
        // Gap of 3 rows, threshold is 4.
        anchor.on_scroll(&viewport(37, 100, 60), 10);
        assert!(anchor.is_following());
        assert!(anchor.snapshot().was_at_bottom);
    }

    #[test]
    fn test_scroll_back_down_resumes_follow() {
        let mut anchor = controller();
        anchor.on_scroll(&viewport(10, 100, 60), 2);
        assert!(!anchor.is_following());
        anchor.on_scroll(&viewport(40, 100, 60), 12);
        assert!(anchor.is_following());
    }

    #[test]
    fn test_near_top_requests_older_page() {
        let mut anchor = controller();
        let effects = anchor.on_scroll(&viewport(1, 100, 20), 0);
        assert!(effects.contains(&AnchorEffect::RequestOlder));
    }

    #[test]
    fn test_scroll_away_from_top_does_not_request() {
        let mut anchor = controller();
        let effects = anchor.on_scroll(&viewport(50, 100, 20), 10);
        assert!(!effects.contains(&AnchorEffect::RequestOlder));
    }

    #[test]
    fn test_underfull_content_does_not_request() {
        // Everything already fits in the window; offset 0 is not "near the
        // top of more content".
        let mut anchor = controller();
        let effects = anchor.on_scroll(&viewport(0, 10, 20), 0);
        assert!(!effects.contains(&AnchorEffect::RequestOlder));
    }

    #[test]
    fn test_prepend_compensates_by_exact_delta() {
        // The offset shifts by exactly the added height.
        let mut anchor = controller();
        anchor.on_scroll(&viewport(10, 100, 20), 2);
        assert_eq!(
            anchor.on_prepended(800),
            vec![AnchorEffect::AdjustOffset(800)]
        );
    }

    #[test]
    fn test_zero_delta_prepend_is_silent() {
        let mut anchor = controller();
        assert!(anchor.on_prepended(0).is_empty());
    }

    #[test]
    fn test_hidden_viewport_gets_no_compensation() {
        let mut anchor = controller();
        anchor.on_scroll(&viewport(10, 100, 20), 2);
        anchor.on_resize((80, 20), (0, 0));
        assert!(anchor.on_prepended(50).is_empty());
    }

    #[test]
    fn test_hide_show_restores_free_position_by_index() {
        // Hide then show with no content change restores first_visible.
        let mut anchor = controller();
        anchor.on_scroll(&viewport(10, 100, 20), 7);
        assert!(!anchor.snapshot().was_at_bottom);

        assert!(anchor.on_resize((80, 20), (0, 0)).is_empty());
        let effects = anchor.on_resize((0, 0), (80, 20));
        assert_eq!(
            effects,
            vec![AnchorEffect::Remeasure, AnchorEffect::RestoreIndex(7)]
        );
        assert!(matches!(anchor.state(), AnchorState::Free { first_visible: 7 }));
    }

    #[test]
    fn test_hide_show_snaps_to_bottom_when_was_following() {
        let mut anchor = controller();
        anchor.on_scroll(&viewport(80, 100, 20), 30);
        assert!(anchor.is_following());

        anchor.on_resize((80, 20), (0, 0));
        let effects = anchor.on_resize((0, 0), (80, 24));
        assert_eq!(
            effects,
            vec![AnchorEffect::Remeasure, AnchorEffect::StickToBottom]
        );
        assert!(anchor.is_following());
    }

    #[test]
    fn test_scroll_while_hidden_is_ignored() {
        let mut anchor = controller();
        anchor.on_scroll(&viewport(10, 100, 20), 7);
        anchor.on_resize((80, 20), (0, 0));
        assert!(anchor.on_scroll(&viewport(0, 100, 20), 0).is_empty());
        assert!(matches!(anchor.state(), AnchorState::Hidden { .. }));
    }

    #[test]
    fn test_width_change_beyond_tolerance_remeasures() {
        let mut anchor = controller();
        let effects = anchor.on_resize((80, 20), (120, 20));
        assert_eq!(effects, vec![AnchorEffect::Remeasure]);

        // Within tolerance: nothing.
        assert!(anchor.on_resize((80, 20), (81, 20)).is_empty());
    }

    #[test]
    fn test_height_shrink_while_following_sticks() {
        let mut anchor = controller();
        assert!(anchor.is_following());
        let effects = anchor.on_resize((80, 20), (80, 10));
        assert_eq!(effects, vec![AnchorEffect::StickToBottom]);
    }

    #[test]
    fn test_height_shrink_while_free_does_nothing() {
        let mut anchor = controller();
        anchor.on_scroll(&viewport(10, 100, 20), 2);
        assert!(anchor.on_resize((80, 20), (80, 10)).is_empty());
    }

    #[test]
    fn test_record_first_visible_tracks_free_state() {
        let mut anchor = controller();
        anchor.on_scroll(&viewport(10, 100, 20), 2);
        anchor.record_first_visible(5);
        assert_eq!(anchor.snapshot().first_visible, 5);
        assert!(matches!(anchor.state(), AnchorState::Free { first_visible: 5 }));
    }

    #[test]
    fn test_record_first_visible_ignored_while_hidden() {
        let mut anchor = controller();
        anchor.on_scroll(&viewport(10, 100, 20), 7);
        anchor.on_resize((80, 20), (0, 0));
        anchor.record_first_visible(0);

        let effects = anchor.on_resize((0, 0), (80, 20));
        assert!(effects.contains(&AnchorEffect::RestoreIndex(7)), "captured snapshot must survive");
    }

    #[test]
    fn test_not_live_never_follows() {
        let mut anchor = controller();
        anchor.set_live(false);
        assert!(!anchor.is_following());
        assert!(anchor.on_items_appended().is_empty());

        // Even a scroll to the very bottom stays Free.
        anchor.on_scroll(&viewport(80, 100, 20), 30);
        assert!(!anchor.is_following());
    }
}
