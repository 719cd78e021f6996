//! Courtside Processing Library
//!
//! Derived metadata for remote assets: duration probing via ffprobe and the
//! human-readable formatting the read-path payloads carry next to every
//! media URL.

pub mod duration;
pub mod probe;

// Re-export commonly used types
pub use duration::{format_duration, uploaded_ago};
pub use probe::MediaProbe;
