//! Contracts to the decoration and screen collaborators.
//!
//! The core never knows concrete decoration types; it drives a `Frame`
//! and queries a `Screen`, both injected at construction. Implementations
//! must tolerate the underlying window vanishing mid-operation by turning
//! every call into a no-op.

use crate::window::{FrameMetrics, WinRect};

/// The decoration collaborator for one managed window.
pub trait Frame {
    /// Current decoration extents; gravity translation is derived from
    /// these.
    fn metrics(&self) -> FrameMetrics;

    /// Move and resize the whole frame in one request.
    fn move_resize(&mut self, geom: WinRect);

    /// Collapse to (or restore from) the titlebar-only shaded form.
    fn set_shaded(&mut self, shaded: bool);

    /// Tab-button boxes in tab-list order, in screen coordinates. Empty
    /// when the frame shows no tabs.
    fn tab_boxes(&self) -> Vec<WinRect>;
}

/// Monitor arrangement queries. `head` indices are dense, starting at 0.
pub trait Screen {
    fn head_count(&self) -> usize;

    /// Usable boundary of a head, excluding struts (panels, docks).
    fn max_left(&self, head: usize) -> i32;
    fn max_right(&self, head: usize) -> i32;
    fn max_top(&self, head: usize) -> i32;
    fn max_bottom(&self, head: usize) -> i32;

    fn usable(&self, head: usize) -> WinRect {
        let left = self.max_left(head);
        let top = self.max_top(head);
        WinRect::new(
            left,
            top,
            (self.max_right(head) - left).max(0) as u32,
            (self.max_bottom(head) - top).max(0) as u32,
        )
    }

    /// The head containing the point, or head 0 for off-screen points.
    fn head_at(&self, x: i32, y: i32) -> usize {
        (0..self.head_count())
            .find(|&h| self.usable(h).contains(x, y))
            .unwrap_or(0)
    }

    /// Usable boundaries of every head, for snapping candidates.
    fn head_boxes(&self) -> Vec<WinRect> {
        (0..self.head_count()).map(|h| self.usable(h)).collect()
    }
}

/// Single fixed monitor; the common case and the test default.
#[derive(Debug, Clone, Copy)]
pub struct SingleHead(pub WinRect);

impl Screen for SingleHead {
    fn head_count(&self) -> usize {
        1
    }

    fn max_left(&self, _head: usize) -> i32 {
        self.0.left()
    }

    fn max_right(&self, _head: usize) -> i32 {
        self.0.right()
    }

    fn max_top(&self, _head: usize) -> i32 {
        self.0.top()
    }

    fn max_bottom(&self, _head: usize) -> i32 {
        self.0.bottom()
    }
}
