//! Serialized backward pagination over a [`HistorySource`]
//!
//! At most one fetch is in flight at a time; the guard is a plain boolean
//! because everything runs on the UI task. Completions come back through a
//! channel tagged with the store epoch they were issued against, so a page
//! that resolves after a conversation switch is discarded wholesale - no
//! store mutation, no scroll compensation. A fetch resolving after the view
//! was torn down hits a dropped receiver and goes nowhere.

use std::sync::Arc;

use tideline_core::{HistoryPage, HistorySource};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Completion of one fetch, tagged with the epoch it was issued against
#[derive(Debug)]
pub enum PageEvent {
    Loaded { epoch: u64, page: HistoryPage },
    Failed { epoch: u64 },
}

pub struct Paginator {
    source: Arc<dyn HistorySource>,
    page_size: usize,
    has_more: bool,
    loading: bool,
    tx: mpsc::UnboundedSender<PageEvent>,
    rx: mpsc::UnboundedReceiver<PageEvent>,
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("page_size", &self.page_size)
            .field("has_more", &self.has_more)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

impl Paginator {
    pub fn new(source: Arc<dyn HistorySource>, page_size: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            page_size,
            has_more: true,
            loading: false,
            tx,
            rx,
        }
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Set from outside when the conversation is (re)loaded
    pub fn set_has_more(&mut self, has_more: bool) {
        self.has_more = has_more;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Issue a fetch for the page older than `before`, unless one is already
    /// in flight or history is exhausted. Returns whether a fetch was issued.
    pub fn maybe_request_older(&mut self, epoch: u64, before: Option<u64>) -> bool {
        if self.loading || !self.has_more {
            return false;
        }
        let Some(before) = before else {
            return false;
        };

        self.loading = true;
        debug!(target: "tui.timeline", epoch, before, limit = self.page_size, "fetching older events");

        let source = Arc::clone(&self.source);
        let limit = self.page_size;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match source.fetch_older(before, limit).await {
                Ok(page) => PageEvent::Loaded { epoch, page },
                Err(error) => {
                    warn!(target: "tui.timeline", %error, "history fetch failed");
                    PageEvent::Failed { epoch }
                }
            };
            // Receiver gone means the view was torn down; nothing to do.
            let _ = tx.send(event);
        });
        true
    }

    /// Drain one completion if available.
    ///
    /// Clears the in-flight guard on any completion. Returns the page only
    /// when it was issued against `current_epoch`; failures and stale pages
    /// yield `None` (a failure simply re-arms the near-top trigger for the
    /// next scroll - no backoff).
    pub fn poll(&mut self, current_epoch: u64) -> Option<HistoryPage> {
        match self.rx.try_recv() {
            Ok(PageEvent::Loaded { epoch, page }) => {
                self.loading = false;
                if epoch == current_epoch {
                    self.has_more = page.has_more;
                    Some(page)
                } else {
                    debug!(target: "tui.timeline", epoch, current_epoch, "dropping stale history page");
                    None
                }
            }
            Ok(PageEvent::Failed { .. }) => {
                self.loading = false;
                None
            }
            Err(_) => None,
        }
    }
}
