//! Windowed renderer - positions render items without materializing them all
//!
//! Heights are cached under each item's stable id rather than its index, so a
//! head-prepend shifts every index without invalidating a single cached
//! height. Offsets (`start_rows`) are a derived segment index rebuilt lazily
//! whenever items or heights change. Every operation taking an index is
//! defensive: out of `[0, count)` is a no-op, because index and count can
//! change between an operation being scheduled and executed.

use std::collections::HashMap;

use tideline_core::RenderItem;
use tracing::trace;

use super::ViewportState;

/// Placement of the target item after a programmatic scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    Center,
    End,
}

/// Contiguous index window to instantiate, overscan included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    pub first_index: usize,
    pub last_index: usize,
}

#[derive(Debug)]
pub struct Virtualizer {
    /// Item id per index, in list order
    ids: Vec<String>,
    /// Last observed height per item id
    heights: HashMap<String, usize>,
    /// Top row per item index; derived, rebuilt when dirty
    start_rows: Vec<usize>,
    total_rows: usize,
    layout_dirty: bool,
    estimated_rows: usize,
    overscan: usize,
}

impl Virtualizer {
    pub fn new(estimated_rows: usize, overscan: usize) -> Self {
        Self {
            ids: Vec::new(),
            heights: HashMap::new(),
            start_rows: Vec::new(),
            total_rows: 0,
            layout_dirty: true,
            // A zero estimate would make unmeasured items invisible to the
            // windowing scan
            estimated_rows: estimated_rows.max(1),
            overscan,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Re-key the layout against a fresh item list.
    ///
    /// Measured heights survive for ids still present; entries for removed
    /// ids are dropped so a measurement arriving for a vanished item cannot
    /// resurrect it.
    pub fn set_items(&mut self, items: &[RenderItem]) {
        self.ids.clear();
        self.ids
            .extend(items.iter().map(|item| item.item_id().to_string()));
        self.heights.retain(|id, _| items.iter().any(|item| item.item_id() == id));
        self.layout_dirty = true;
    }

    /// Record the true height of an item once it has been laid out.
    ///
    /// Offsets of every later item shift accordingly on the next layout.
    /// Out-of-range indices are ignored.
    pub fn measure(&mut self, index: usize, rows: usize) {
        let Some(id) = self.ids.get(index) else {
            trace!(target: "tui.timeline", index, "measurement for vanished index ignored");
            return;
        };
        let rows = rows.max(1);
        if self.heights.get(id) != Some(&rows) {
            self.heights.insert(id.clone(), rows);
            self.layout_dirty = true;
        }
    }

    /// Forget the measured height of one item (its content changed)
    pub fn invalidate_id(&mut self, id: &str) {
        if self.heights.remove(id).is_some() {
            self.layout_dirty = true;
        }
    }

    /// Drop every measured height, forcing remeasurement on next layout.
    /// Used when the width changes enough to re-wrap text.
    pub fn invalidate_all(&mut self) {
        if !self.heights.is_empty() {
            self.heights.clear();
            self.layout_dirty = true;
        }
    }

    /// Whether the item at `index` has a measured (not estimated) height
    pub fn is_measured(&self, index: usize) -> bool {
        self.ids
            .get(index)
            .is_some_and(|id| self.heights.contains_key(id))
    }

    fn height_of_id(&self, id: &str) -> usize {
        self.heights.get(id).copied().unwrap_or(self.estimated_rows)
    }

    /// Best-known height for the item at `index`
    pub fn height_of(&self, index: usize) -> Option<usize> {
        self.ids.get(index).map(|id| self.height_of_id(id))
    }

    fn ensure_layout(&mut self) {
        if !self.layout_dirty {
            return;
        }
        self.start_rows.clear();
        self.start_rows.reserve(self.ids.len());
        let mut cursor = 0usize;
        for id in &self.ids {
            self.start_rows.push(cursor);
            cursor = cursor.saturating_add(self.heights.get(id).copied().unwrap_or(self.estimated_rows));
        }
        self.total_rows = cursor;
        self.layout_dirty = false;
    }

    /// Sum of all known and estimated heights
    pub fn total_rows(&mut self) -> usize {
        self.ensure_layout();
        self.total_rows
    }

    /// Top row of the item at `index`
    pub fn offset_of(&mut self, index: usize) -> Option<usize> {
        self.ensure_layout();
        self.start_rows.get(index).copied()
    }

    /// Index of the item occupying `row`
    pub fn index_at(&mut self, row: usize) -> Option<usize> {
        self.ensure_layout();
        if self.ids.is_empty() || row >= self.total_rows {
            return None;
        }
        // First item whose top is past `row`, minus one
        let after = self.start_rows.partition_point(|&start| start <= row);
        after.checked_sub(1)
    }

    /// Contiguous index range covering the viewport, padded with overscan
    pub fn visible_range(&mut self, viewport: &ViewportState) -> Option<VisibleRange> {
        self.ensure_layout();
        if self.ids.is_empty() || viewport.viewport_rows == 0 {
            return None;
        }
        let offset = viewport.offset.min(self.total_rows.saturating_sub(1));
        let last_row = offset.saturating_add(viewport.viewport_rows.saturating_sub(1));

        let first = self.index_at(offset).unwrap_or(0);
        let last = self
            .index_at(last_row)
            .unwrap_or_else(|| self.ids.len().saturating_sub(1));

        Some(VisibleRange {
            first_index: first.saturating_sub(self.overscan),
            last_index: (last + self.overscan).min(self.ids.len() - 1),
        })
    }

    /// Compute and apply the scroll offset that places `index` per `align`.
    ///
    /// Uses the best current height estimates; idempotent for an unchanged
    /// viewport. Out-of-range indices are ignored.
    pub fn scroll_to_index(&mut self, index: usize, align: Align, viewport: &mut ViewportState) {
        self.ensure_layout();
        let Some(&item_start) = self.start_rows.get(index) else {
            trace!(target: "tui.timeline", index, "scroll_to_index out of range ignored");
            return;
        };
        let item_rows = self.height_of(index).unwrap_or(self.estimated_rows);
        let window = viewport.viewport_rows;

        let target = match align {
            Align::Start => item_start,
            Align::End => item_start
                .saturating_add(item_rows)
                .saturating_sub(window),
            Align::Center => item_start
                .saturating_add(item_rows / 2)
                .saturating_sub(window / 2),
        };

        viewport.total_rows = self.total_rows;
        viewport.offset = target.min(viewport.max_offset());
    }
}
