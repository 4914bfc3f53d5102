//! History paging - the backward-pagination seam
//!
//! The timeline consumes history through this trait and nothing else; the
//! backing request/cache logic lives behind it and is owned elsewhere.

use crate::error::Result;
use crate::event::RawEvent;

use async_trait::async_trait;

/// One page of older events
#[derive(Debug, Clone)]
pub struct HistoryPage {
    /// Events in chronological order, all strictly older than the cursor
    pub events: Vec<RawEvent>,
    /// Whether more history remains beyond this page
    pub has_more: bool,
}

impl HistoryPage {
    /// Terminal page: nothing older exists
    pub fn exhausted() -> Self {
        Self {
            events: Vec::new(),
            has_more: false,
        }
    }
}

/// Source of older conversation events, backed by a remote store.
///
/// `fetch_older` returns up to `limit` events with sequence numbers strictly
/// below `before`, in chronological order. Callers serialize their requests;
/// implementations are not required to tolerate concurrent fetches for the
/// same conversation.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch_older(&self, before: u64, limit: usize) -> Result<HistoryPage>;
}
