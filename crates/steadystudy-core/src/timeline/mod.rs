//! Free time discovery.
//!
//! This module provides:
//! - Busy interval clipping and merging
//! - Gap detection across a bounded horizon
//! - Filtering by preferred daily windows and weekdays

mod gap;

pub use gap::{find_free_blocks, merge_busy, FreeBlock};
