//! EventStore - ordered storage for timeline events

use crate::event::{EventId, RawEvent};

use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

/// Stable key for accessing stored events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey(u64);

/// Ordered storage for the events of one conversation.
///
/// Events are kept in chronological order with O(1) id-based access. Three
/// mutation paths exist and they are the only ones: `append`/`upsert` at the
/// tail (live streaming and edit-in-place), `prepend_older` at the head
/// (backward pagination), and `replace_all` (conversation switch). The
/// `revision` counter moves on every mutation so callers can rebuild derived
/// state lazily; the `epoch` counter moves only on `replace_all` and is used
/// to discard async results that raced a conversation switch.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    /// All events stored in order with O(1) key-based access
    events: IndexMap<EventKey, RawEvent>,
    /// Fast lookup id -> key
    id_to_key: HashMap<EventId, EventKey>,
    /// Key generator
    next_key: u64,
    /// Revision number for dirty tracking
    revision: u64,
    /// Bumped when the whole conversation is swapped out
    epoch: u64,
}

impl EventStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current revision number for dirty tracking
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Current conversation epoch
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Current number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over all events in order
    pub fn iter(&self) -> impl Iterator<Item = &RawEvent> + '_ {
        self.events.values()
    }

    /// Direct access by index
    pub fn get(&self, idx: usize) -> Option<&RawEvent> {
        self.events.get_index(idx).map(|(_, event)| event)
    }

    /// Get immutable reference by id
    pub fn get_by_id(&self, id: &EventId) -> Option<&RawEvent> {
        let key = self.id_to_key.get(id)?;
        self.events.get(key)
    }

    /// Sequence number of the oldest loaded event, the backward-pagination cursor
    pub fn first_sequence(&self) -> Option<u64> {
        self.events.values().next().map(|event| event.sequence)
    }

    fn generate_key(&mut self) -> EventKey {
        let key = EventKey(self.next_key);
        self.next_key += 1;
        key
    }

    /// Append a new event at the tail
    pub fn append(&mut self, event: RawEvent) -> EventKey {
        let key = self.generate_key();
        self.id_to_key.insert(event.id.clone(), key);
        self.events.insert(key, event);
        self.revision += 1;
        key
    }

    /// Insert or replace by id.
    ///
    /// An event whose id is already present replaces the stored one in place,
    /// keeping its position in the order; anything else is appended at the
    /// tail. This is the edit-in-place contract: a superseding event must not
    /// look like an insert to downstream consumers.
    pub fn upsert(&mut self, event: RawEvent) -> EventKey {
        if let Some(&key) = self.id_to_key.get(&event.id) {
            if let Some(slot) = self.events.get_mut(&key) {
                *slot = event;
                self.revision += 1;
                return key;
            }
        }
        self.append(event)
    }

    /// Prepend a page of older events at the head.
    ///
    /// `older` must be in chronological order and strictly older than the
    /// current head. Events whose id is already present are skipped. Returns
    /// the number of events actually inserted.
    pub fn prepend_older(&mut self, older: Vec<RawEvent>) -> usize {
        let fresh: Vec<RawEvent> = older
            .into_iter()
            .filter(|event| !self.id_to_key.contains_key(&event.id))
            .collect();
        if fresh.is_empty() {
            return 0;
        }

        let added = fresh.len();
        let mut rebuilt = IndexMap::with_capacity(self.events.len() + added);
        for event in fresh {
            let key = self.generate_key();
            self.id_to_key.insert(event.id.clone(), key);
            rebuilt.insert(key, event);
        }
        for (key, event) in self.events.drain(..) {
            rebuilt.insert(key, event);
        }
        self.events = rebuilt;
        self.revision += 1;
        debug!(target: "core.store", added, total = self.events.len(), "prepended older events");
        added
    }

    /// Swap in a different conversation; bumps the epoch
    pub fn replace_all(&mut self, events: Vec<RawEvent>) {
        self.events.clear();
        self.id_to_key.clear();
        for event in events {
            let key = self.generate_key();
            self.id_to_key.insert(event.id.clone(), key);
            self.events.insert(key, event);
        }
        self.revision += 1;
        self.epoch += 1;
        debug!(target: "core.store", total = self.events.len(), epoch = self.epoch, "replaced conversation");
    }

    /// Clear all events; bumps the epoch like a replace
    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }
}
