//! Item model builder - collapse raw events into render items
//!
//! The timeline positions render items, not raw events: a run of consecutive
//! events that share a `turn_id` (one agent turn: status lines, tool calls,
//! the final message) collapses into a single group item. The builder is a
//! pure function of the event list and preserves relative order, so a group
//! gaining a trailing member while it is the last item - the live-streaming
//! case - never moves an earlier item's index.

use crate::event::RawEvent;
use crate::store::EventStore;

/// The unit the virtualizer positions
#[derive(Debug, Clone, PartialEq)]
pub enum RenderItem {
    /// A lone event with no turn marker
    Single { event: RawEvent },
    /// One collapsed agent turn
    TurnGroup { id: String, events: Vec<RawEvent> },
}

impl RenderItem {
    /// Stable identifier, used as the height-cache key.
    ///
    /// A group's id derives from its first member, so it survives the group
    /// growing at the tail; it changes only if the group's head changes,
    /// which also changes what the item is.
    pub fn item_id(&self) -> &str {
        match self {
            RenderItem::Single { event } => event.id.as_str(),
            RenderItem::TurnGroup { id, .. } => id,
        }
    }

    /// Number of raw events summarized by this item
    pub fn event_count(&self) -> usize {
        match self {
            RenderItem::Single { .. } => 1,
            RenderItem::TurnGroup { events, .. } => events.len(),
        }
    }

    /// Whether this item contains the given event id
    pub fn contains_event(&self, id: &crate::event::EventId) -> bool {
        match self {
            RenderItem::Single { event } => event.id == *id,
            RenderItem::TurnGroup { events, .. } => events.iter().any(|e| e.id == *id),
        }
    }
}

fn group_id(first: &RawEvent) -> String {
    format!("turn-{}", first.id)
}

/// Build the ordered render-item list from the store.
///
/// Deterministic: identical input produces identical output, including group
/// ids, so id-keyed caches stay warm across rebuilds.
pub fn build_render_items(store: &EventStore) -> Vec<RenderItem> {
    build_from_iter(store.iter())
}

/// Build render items from an explicit event slice
pub fn build_from_events(events: &[RawEvent]) -> Vec<RenderItem> {
    build_from_iter(events.iter())
}

fn build_from_iter<'a>(events: impl Iterator<Item = &'a RawEvent>) -> Vec<RenderItem> {
    let mut items: Vec<RenderItem> = Vec::new();
    let mut open_turn: Option<(String, Vec<RawEvent>)> = None;

    for event in events {
        match (&event.turn_id, &mut open_turn) {
            (Some(turn), Some((current_turn, members))) if turn == current_turn => {
                members.push(event.clone());
            }
            (Some(turn), _) => {
                flush_turn(&mut items, open_turn.take());
                open_turn = Some((turn.clone(), vec![event.clone()]));
            }
            (None, _) => {
                flush_turn(&mut items, open_turn.take());
                items.push(RenderItem::Single {
                    event: event.clone(),
                });
            }
        }
    }
    flush_turn(&mut items, open_turn);

    items
}

fn flush_turn(items: &mut Vec<RenderItem>, open_turn: Option<(String, Vec<RawEvent>)>) {
    if let Some((_, events)) = open_turn {
        if let Some(first) = events.first() {
            let id = group_id(first);
            items.push(RenderItem::TurnGroup { id, events });
        }
    }
}
