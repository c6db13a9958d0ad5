//! Edge snapping during interactive move and resize.
//!
//! For a proposed position, each axis independently gets the smallest
//! adjustment (within the threshold) that aligns one of the moving box's
//! edges with an edge of a head boundary or another window's box. An edge
//! only counts when the two boxes also overlap on the perpendicular axis,
//! so far-away windows never yank the drag sideways.

use super::{ResizeCorner, WinRect};

/// Per-axis best candidate: smallest magnitude wins, first seen breaks
/// ties.
#[derive(Debug, Clone, Copy)]
struct Best(Option<i32>);

impl Best {
    fn offer(&mut self, delta: i32, threshold: u32) {
        if delta.unsigned_abs() > threshold {
            return;
        }
        match self.0 {
            Some(cur) if cur.abs() <= delta.abs() => {}
            _ => self.0 = Some(delta),
        }
    }
}

/// Snap a proposed move position. Returns the adjusted top-left corner.
pub fn snap_move(
    proposed: WinRect,
    threshold: u32,
    heads: &[WinRect],
    others: &[WinRect],
) -> (i32, i32) {
    let mut dx = Best(None);
    let mut dy = Best(None);

    for head in heads {
        if proposed.overlaps_vertically(head) {
            dx.offer(head.left() - proposed.left(), threshold);
            dx.offer(head.right() - proposed.right(), threshold);
        }
        if proposed.overlaps_horizontally(head) {
            dy.offer(head.top() - proposed.top(), threshold);
            dy.offer(head.bottom() - proposed.bottom(), threshold);
        }
    }
    for other in others {
        if proposed.overlaps_vertically(other) {
            for edge in [other.left(), other.right()] {
                dx.offer(edge - proposed.left(), threshold);
                dx.offer(edge - proposed.right(), threshold);
            }
        }
        if proposed.overlaps_horizontally(other) {
            for edge in [other.top(), other.bottom()] {
                dy.offer(edge - proposed.top(), threshold);
                dy.offer(edge - proposed.bottom(), threshold);
            }
        }
    }

    (
        proposed.x + dx.0.unwrap_or(0),
        proposed.y + dy.0.unwrap_or(0),
    )
}

/// Snap a proposed resize. Only the edges the active corner moves are
/// candidates; the anchored edges never shift, so the window cannot grow
/// by being snapped on both sides at once.
pub fn snap_resize(
    proposed: WinRect,
    corner: ResizeCorner,
    threshold: u32,
    heads: &[WinRect],
    others: &[WinRect],
) -> WinRect {
    let mut left = Best(None);
    let mut right = Best(None);
    let mut top = Best(None);
    let mut bottom = Best(None);

    let mut offer_box = |b: &WinRect, is_head: bool| {
        if proposed.overlaps_vertically(b) {
            let edges: &[i32] = if is_head {
                &[b.left()]
            } else {
                &[b.left(), b.right()]
            };
            for &e in edges {
                left.offer(e - proposed.left(), threshold);
            }
            let edges: &[i32] = if is_head {
                &[b.right()]
            } else {
                &[b.left(), b.right()]
            };
            for &e in edges {
                right.offer(e - proposed.right(), threshold);
            }
        }
        if proposed.overlaps_horizontally(b) {
            let edges: &[i32] = if is_head {
                &[b.top()]
            } else {
                &[b.top(), b.bottom()]
            };
            for &e in edges {
                top.offer(e - proposed.top(), threshold);
            }
            let edges: &[i32] = if is_head {
                &[b.bottom()]
            } else {
                &[b.top(), b.bottom()]
            };
            for &e in edges {
                bottom.offer(e - proposed.bottom(), threshold);
            }
        }
    };
    for head in heads {
        offer_box(head, true);
    }
    for other in others {
        offer_box(other, false);
    }

    let mut out = proposed;
    if corner.moves_left()
        && let Some(d) = left.0
    {
        out.x += d;
        out.width = (out.width as i32 - d).max(1) as u32;
    }
    if corner.moves_right()
        && let Some(d) = right.0
    {
        out.width = (out.width as i32 + d).max(1) as u32;
    }
    if corner.moves_top()
        && let Some(d) = top.0
    {
        out.y += d;
        out.height = (out.height as i32 - d).max(1) as u32;
    }
    if corner.moves_bottom()
        && let Some(d) = bottom.0
    {
        out.height = (out.height as i32 + d).max(1) as u32;
    }
    out
}
