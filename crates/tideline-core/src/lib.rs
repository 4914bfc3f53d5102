pub mod builder;
pub mod error;
pub mod event;
pub mod history;
pub mod store;

pub use builder::{RenderItem, build_render_items};
pub use error::{Error, Result};
pub use event::{EventId, EventPayload, RawEvent, Role, generate_event_id};
pub use history::{HistoryPage, HistorySource};
pub use store::EventStore;
