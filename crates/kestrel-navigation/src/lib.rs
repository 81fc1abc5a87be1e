//! Kestrel Navigation
//!
//! Address-bar input resolution (URL vs. search query) and the append-only
//! history recorder for page visits and downloads.

mod error;
mod history;
mod input;

pub use error::NavigationError;
pub use history::{
    DownloadRecord, DownloadStatus, HistoryRecorder, Suggestion, VisitRecord,
};
pub use input::{InputResolver, Resolution};

pub type Result<T> = std::result::Result<T, NavigationError>;
