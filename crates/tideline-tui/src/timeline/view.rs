//! TimelineView - composes store, builder, virtualizer, anchor and paginator
//!
//! Only the visible index range is ever instantiated. Rendering is also the
//! measurement pass: an item entering the window gets laid out at the current
//! width and its true height recorded, which is what keeps the virtual total
//! honest as variable-height items scroll in.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use tideline_core::{
    EventId, EventStore, HistoryPage, HistorySource, RawEvent, RenderItem, build_render_items,
};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use super::anchor::{AnchorController, AnchorEffect, AnchorState};
use super::paginator::Paginator;
use super::virtualizer::{Align, Virtualizer};
use super::widget::{ItemRenderable, TextItemWidget};
use super::ViewportState;
use crate::config::TimelineConfig;

struct WidgetEntry {
    widget: Box<dyn ItemRenderable>,
    content_hash: u64,
}

fn content_hash(item: &RenderItem) -> u64 {
    let mut hasher = DefaultHasher::new();
    format!("{item:?}").hash(&mut hasher);
    hasher.finish()
}

pub struct TimelineView {
    store: EventStore,
    items: Vec<RenderItem>,
    widgets: HashMap<String, WidgetEntry>,
    virtualizer: Virtualizer,
    anchor: AnchorController,
    paginator: Paginator,
    viewport: ViewportState,
    last_size: (u16, u16),
    last_revision: u64,
    /// Index restore deferred until after the next measurement pass
    pending_restore: Option<usize>,
}

impl TimelineView {
    pub fn new(source: Arc<dyn HistorySource>, config: &TimelineConfig) -> Self {
        Self {
            store: EventStore::new(),
            items: Vec::new(),
            widgets: HashMap::new(),
            virtualizer: Virtualizer::new(config.estimated_item_rows, config.overscan_items),
            anchor: AnchorController::new(
                config.follow_threshold_rows,
                config.prefetch_threshold_rows,
                config.width_tolerance_cols,
            ),
            paginator: Paginator::new(source, config.page_size),
            viewport: ViewportState::default(),
            last_size: (0, 0),
            last_revision: 0,
            pending_restore: None,
        }
    }

    /// Load a conversation, discarding whatever was shown before.
    /// Any in-flight page fetch for the old conversation becomes stale.
    pub fn load_conversation(&mut self, events: Vec<RawEvent>, has_more: bool) {
        self.store.replace_all(events);
        self.paginator.set_has_more(has_more);
        self.rebuild_items();
        self.viewport.offset = self.viewport.max_offset();
    }

    /// Whether the conversation is still producing events; a finished one
    /// never auto-follows
    pub fn set_live(&mut self, live: bool) {
        self.anchor.set_live(live);
    }

    pub fn set_has_more(&mut self, has_more: bool) {
        self.paginator.set_has_more(has_more);
    }

    pub fn anchor_state(&self) -> AnchorState {
        self.anchor.state()
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_loading_older(&self) -> bool {
        self.paginator.is_loading()
    }

    /// Index of the item at the top of the window
    pub fn first_visible_index(&mut self) -> Option<usize> {
        self.virtualizer.index_at(self.viewport.offset)
    }

    /// Apply one event pushed by the transport layer (insert or edit-in-place)
    pub fn apply_event(&mut self, event: RawEvent) {
        let len_before = self.store.len();
        self.store.upsert(event);
        self.rebuild_items();
        if self.store.len() > len_before {
            let effects = self.anchor.on_items_appended();
            self.apply_effects(effects);
        }
    }

    pub fn apply_events(&mut self, events: impl IntoIterator<Item = RawEvent>) {
        for event in events {
            self.apply_event(event);
        }
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.viewport.total_rows = self.virtualizer.total_rows();
        self.viewport.offset = self.viewport.offset.saturating_sub(rows);
        self.after_user_scroll();
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.viewport.total_rows = self.virtualizer.total_rows();
        self.viewport.offset = self
            .viewport
            .offset
            .saturating_add(rows)
            .min(self.viewport.max_offset());
        self.after_user_scroll();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.viewport.total_rows = self.virtualizer.total_rows();
        self.viewport.offset = self.viewport.max_offset();
        self.after_user_scroll();
    }

    /// Jump to the item containing the given event
    pub fn scroll_to_message(&mut self, id: &EventId) {
        let Some(index) = self.items.iter().position(|item| item.contains_event(id)) else {
            return;
        };
        self.virtualizer
            .scroll_to_index(index, Align::Center, &mut self.viewport);
        self.after_user_scroll();
    }

    fn after_user_scroll(&mut self) {
        let first_visible = self
            .virtualizer
            .index_at(self.viewport.offset)
            .unwrap_or(0);
        let effects = self.anchor.on_scroll(&self.viewport, first_visible);
        self.apply_effects(effects);
    }

    /// Notify that the timeline's container left the screen (tab switch,
    /// collapsed panel). The anchor is captured for the next show.
    pub fn hide(&mut self) {
        let effects = self.anchor.on_resize(self.last_size, (0, 0));
        self.last_size = (0, 0);
        self.apply_effects(effects);
    }

    /// Drain a completed page fetch, if any. Call once per UI tick.
    pub fn poll_pagination(&mut self) {
        if let Some(page) = self.paginator.poll(self.store.epoch()) {
            self.finish_page(page);
        }
    }

    fn finish_page(&mut self, page: HistoryPage) {
        if page.events.is_empty() {
            return;
        }
        let old_total = self.virtualizer.total_rows();
        let old_item_count = self.items.len();

        let added = self.store.prepend_older(page.events);
        if added == 0 {
            return;
        }
        self.rebuild_items();

        // Measure the new head items now so the compensation delta is exact.
        // The boundary item is included: a prepend can extend the old first
        // group and change its height.
        if self.last_size.0 > 0 {
            let new_head_items = self.items.len().saturating_sub(old_item_count) + 1;
            for index in 0..new_head_items.min(self.items.len()) {
                self.measure_item(index, self.last_size.0);
            }
        }

        let delta = self.virtualizer.total_rows().saturating_sub(old_total);
        debug!(target: "tui.timeline", added, delta, "older page applied");
        let effects = self.anchor.on_prepended(delta);
        self.apply_effects(effects);
    }

    fn rebuild_items(&mut self) {
        if self.store.revision() == self.last_revision && !self.items.is_empty() {
            return;
        }
        self.last_revision = self.store.revision();
        self.items = build_render_items(&self.store);

        // Reuse widgets by id; rebuild only when content actually changed.
        let items = &self.items;
        self.widgets
            .retain(|id, _| items.iter().any(|item| item.item_id() == id));
        for item in &self.items {
            let hash = content_hash(item);
            match self.widgets.get_mut(item.item_id()) {
                Some(entry) if entry.content_hash == hash => {}
                Some(entry) => {
                    entry.widget = Box::new(TextItemWidget::new(item.clone()));
                    entry.content_hash = hash;
                    // Height may have changed with the content; remeasure on
                    // the next pass
                    self.virtualizer.invalidate_id(item.item_id());
                }
                None => {
                    self.widgets.insert(
                        item.item_id().to_string(),
                        WidgetEntry {
                            widget: Box::new(TextItemWidget::new(item.clone())),
                            content_hash: hash,
                        },
                    );
                }
            }
        }

        self.virtualizer.set_items(&self.items);
        self.viewport.total_rows = self.virtualizer.total_rows();
    }

    fn measure_item(&mut self, index: usize, width: u16) {
        let Some(item) = self.items.get(index) else {
            return;
        };
        let rows = match self.widgets.get(item.item_id()) {
            Some(entry) => entry.widget.line_count(width),
            None => return,
        };
        self.virtualizer.measure(index, rows);
    }

    fn apply_effects(&mut self, effects: Vec<AnchorEffect>) {
        for effect in effects {
            match effect {
                AnchorEffect::StickToBottom => {
                    self.viewport.total_rows = self.virtualizer.total_rows();
                    self.viewport.offset = self.viewport.max_offset();
                }
                AnchorEffect::RestoreIndex(index) => {
                    // Heights were just invalidated; resolve the index to an
                    // offset only after the next measurement pass.
                    self.pending_restore = Some(index);
                }
                AnchorEffect::AdjustOffset(delta) => {
                    self.viewport.offset = self.viewport.offset.saturating_add(delta);
                }
                AnchorEffect::Remeasure => {
                    self.virtualizer.invalidate_all();
                }
                AnchorEffect::RequestOlder => {
                    let epoch = self.store.epoch();
                    let before = self.store.first_sequence();
                    self.paginator.maybe_request_older(epoch, before);
                }
            }
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let new_size = (area.width, area.height);
        if new_size != self.last_size {
            let effects = self.anchor.on_resize(self.last_size, new_size);
            self.last_size = new_size;
            self.apply_effects(effects);
        }
        if area.width == 0 || area.height == 0 {
            return;
        }

        self.viewport.viewport_rows = usize::from(area.height);
        self.rebuild_items();

        if self.items.is_empty() {
            let text = if self.paginator.is_loading() {
                "loading history..."
            } else {
                "no activity yet"
            };
            let line = Line::from(text).style(Style::default().add_modifier(Modifier::DIM));
            f.buffer_mut().set_line(area.x, area.y, &line, area.width);
            return;
        }

        // Measurement pass over the window (plus overscan), then settle the
        // anchor against the corrected totals before painting.
        if let Some(range) = self.virtualizer.visible_range(&self.viewport) {
            for index in range.first_index..=range.last_index {
                if !self.virtualizer.is_measured(index) {
                    self.measure_item(index, area.width);
                }
            }
        }
        self.viewport.total_rows = self.virtualizer.total_rows();
        if let Some(index) = self.pending_restore.take() {
            self.virtualizer
                .scroll_to_index(index, Align::Start, &mut self.viewport);
        } else if self.anchor.is_following() {
            self.viewport.offset = self.viewport.max_offset();
        } else {
            self.viewport.offset = self.viewport.offset.min(self.viewport.max_offset());
        }

        let first_visible = self
            .virtualizer
            .index_at(self.viewport.offset)
            .unwrap_or(0);
        self.anchor.record_first_visible(first_visible);

        self.paint(f, area);

        if self.paginator.is_loading() {
            let label = "· loading earlier activity ·";
            let pad = usize::from(area.width).saturating_sub(label.width()) / 2;
            let banner = format!("{}{label}", " ".repeat(pad));
            let line = Line::from(banner).style(Style::default().add_modifier(Modifier::DIM));
            f.buffer_mut().set_line(area.x, area.y, &line, area.width);
        }
    }

    fn paint(&mut self, f: &mut Frame, area: Rect) {
        let Some(mut index) = self.virtualizer.index_at(self.viewport.offset) else {
            return;
        };
        let mut skip = self
            .viewport
            .offset
            .saturating_sub(self.virtualizer.offset_of(index).unwrap_or(0));

        let buf = f.buffer_mut();
        let mut y = area.y;
        let bottom = area.y.saturating_add(area.height);

        while y < bottom {
            let Some(item) = self.items.get(index) else {
                break;
            };
            let Some(entry) = self.widgets.get(item.item_id()) else {
                break;
            };
            let lines = entry.widget.lines(area.width);
            for line in lines.iter().skip(skip) {
                if y >= bottom {
                    break;
                }
                buf.set_line(area.x, y, line, area.width);
                y += 1;
            }
            skip = 0;
            index += 1;
        }
    }
}
