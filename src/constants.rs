//! Shared crate-wide constants.

use std::time::Duration;

/// How long a multi-step binding chain stays open without further input
/// before the next key is evaluated against the root again.
pub const DEFAULT_CHAIN_TIMEOUT: Duration = Duration::from_millis(5000);

/// Maximum gap between two presses of the same button for the second one
/// to count as a double click.
pub const DEFAULT_DOUBLE_CLICK: Duration = Duration::from_millis(250);

/// Default edge-snapping threshold during interactive moves, in pixels.
/// Candidate alignments farther away than this are discarded.
pub const DEFAULT_SNAP_THRESHOLD: u32 = 10;

/// Default corner hit-box for pointer-relative resize detection: a press
/// within this many pixels of a window corner resizes from that corner.
pub const DEFAULT_CORNER_SIZE_PX: u32 = 28;

/// Cap on the corner hit-box as a percentage of the window dimension, so
/// tiny windows still keep a usable center region.
pub const DEFAULT_CORNER_SIZE_PERCENT: u8 = 50;
