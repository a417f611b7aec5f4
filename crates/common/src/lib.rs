//! Common utilities for the weft crates.
//!
//! - [`debug`] - Per-module logging controlled via the `WEFT_LOG` environment variable
//! - [`source`] - Byte offset to line/column mapping for diagnostics

pub mod debug;
pub mod source;

pub use debug::{configure, create_logger, LogConfig, Logger};
pub use source::{locate, LineIndex, SourceLoc};
