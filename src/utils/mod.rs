//! Supporting utilities
//!
//! - [`path_validation`] - lexical normalization of archive entry paths
//! - [`progress`] - console rendering of pipeline progress

pub mod path_validation;
pub mod progress;

pub use path_validation::{is_confined, normalize_entry_path};
pub use progress::ConsoleObserver;
