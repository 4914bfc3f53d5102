pub mod config;
pub mod error;
pub mod timeline;

pub use config::TimelineConfig;
pub use error::{Error, Result};
pub use timeline::TimelineView;
