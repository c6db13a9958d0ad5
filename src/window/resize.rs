//! Interactive resize arithmetic.
//!
//! A resize is anchored at the corner opposite the active one; the active
//! corner follows the pointer delta. CENTER resizes grow and shrink
//! symmetrically, by even increments only, so the window center never
//! drifts.

use super::{SizeHints, WinRect};

/// The nine resize reference directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeCorner {
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl ResizeCorner {
    pub fn moves_left(self) -> bool {
        matches!(
            self,
            ResizeCorner::TopLeft | ResizeCorner::Left | ResizeCorner::BottomLeft
        )
    }

    pub fn moves_right(self) -> bool {
        matches!(
            self,
            ResizeCorner::TopRight | ResizeCorner::Right | ResizeCorner::BottomRight
        )
    }

    pub fn moves_top(self) -> bool {
        matches!(
            self,
            ResizeCorner::TopLeft | ResizeCorner::Top | ResizeCorner::TopRight
        )
    }

    pub fn moves_bottom(self) -> bool {
        matches!(
            self,
            ResizeCorner::BottomLeft | ResizeCorner::Bottom | ResizeCorner::BottomRight
        )
    }
}

/// Corner hit-box dimension: absolute pixels, or a percentage of the
/// window dimension for small windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerSize {
    Pixels(u32),
    Percent(u8),
}

impl CornerSize {
    fn resolve(self, dimension: u32) -> u32 {
        match self {
            CornerSize::Pixels(px) => px,
            CornerSize::Percent(pct) => dimension * u32::from(pct.min(100)) / 100,
        }
    }
}

/// Pointer-relative auto-detection: split the window into a 3x3 grid
/// using the corner hit-boxes and pick the direction the press landed in.
/// A press in the middle region resizes from the nearest edge's corner on
/// that axis, and dead center resizes symmetrically.
pub fn corner_for_pointer(
    rect: WinRect,
    px: i32,
    py: i32,
    corner_w: CornerSize,
    corner_h: CornerSize,
) -> ResizeCorner {
    let cw = corner_w.resolve(rect.width).min(rect.width / 2) as i32;
    let ch = corner_h.resolve(rect.height).min(rect.height / 2) as i32;

    let col = if px < rect.left() + cw {
        0
    } else if px >= rect.right() - cw {
        2
    } else {
        1
    };
    let row = if py < rect.top() + ch {
        0
    } else if py >= rect.bottom() - ch {
        2
    } else {
        1
    };

    match (row, col) {
        (0, 0) => ResizeCorner::TopLeft,
        (0, 1) => ResizeCorner::Top,
        (0, 2) => ResizeCorner::TopRight,
        (1, 0) => ResizeCorner::Left,
        (1, 2) => ResizeCorner::Right,
        (2, 0) => ResizeCorner::BottomLeft,
        (2, 1) => ResizeCorner::Bottom,
        (2, 2) => ResizeCorner::BottomRight,
        _ => ResizeCorner::Center,
    }
}

/// Apply a pointer delta to `start`, keeping the opposite corner fixed,
/// then re-apply the size hints and re-anchor so hint rounding never
/// moves the fixed corner.
pub fn apply_resize(start: WinRect, corner: ResizeCorner, dx: i32, dy: i32, hints: &SizeHints) -> WinRect {
    if corner == ResizeCorner::Center {
        return apply_center_resize(start, dx, dy, hints);
    }

    let mut width = start.width as i32;
    let mut height = start.height as i32;
    if corner.moves_left() {
        width -= dx;
    } else if corner.moves_right() {
        width += dx;
    }
    if corner.moves_top() {
        height -= dy;
    } else if corner.moves_bottom() {
        height += dy;
    }

    let (w, h) = hints.apply(width.max(1) as u32, height.max(1) as u32);

    let x = if corner.moves_left() {
        start.right() - w as i32
    } else {
        start.x
    };
    let y = if corner.moves_top() {
        start.bottom() - h as i32
    } else {
        start.y
    };
    WinRect::new(x, y, w, h)
}

/// Symmetric resize: each axis grows by the pointer delta rounded toward
/// zero to an even amount, half on each side.
fn apply_center_resize(start: WinRect, dx: i32, dy: i32, hints: &SizeHints) -> WinRect {
    // d - d % 2 rounds toward zero to the nearest even value
    let gw = dx - dx % 2;
    let gh = dy - dy % 2;

    let width = (start.width as i32 + gw).max(1) as u32;
    let height = (start.height as i32 + gh).max(1) as u32;
    let (w, h) = hints.apply(width, height);

    let x = start.x - (w as i32 - start.width as i32) / 2;
    let y = start.y - (h as i32 - start.height as i32) / 2;
    WinRect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints() -> SizeHints {
        SizeHints::default()
    }

    #[test]
    fn bottom_right_follows_pointer() {
        let start = WinRect::new(10, 10, 100, 80);
        let out = apply_resize(start, ResizeCorner::BottomRight, 15, -20, &hints());
        assert_eq!(out, WinRect::new(10, 10, 115, 60));
    }

    #[test]
    fn top_left_keeps_bottom_right_fixed() {
        let start = WinRect::new(10, 10, 100, 80);
        let out = apply_resize(start, ResizeCorner::TopLeft, 15, 20, &hints());
        assert_eq!(out.right(), start.right());
        assert_eq!(out.bottom(), start.bottom());
        assert_eq!(out, WinRect::new(25, 30, 85, 60));
    }

    #[test]
    fn hint_rounding_does_not_move_the_anchor() {
        let hints = SizeHints {
            width_inc: 10,
            height_inc: 10,
            ..SizeHints::default()
        };
        let start = WinRect::new(10, 10, 100, 80);
        let out = apply_resize(start, ResizeCorner::Left, -7, 0, &hints);
        // 107 rounds down to 100, the right edge must not drift
        assert_eq!(out.right(), start.right());
        assert_eq!(out.width, 100);
    }

    #[test]
    fn center_resize_grows_by_even_amounts_only() {
        let start = WinRect::new(50, 50, 100, 100);
        let out = apply_resize(start, ResizeCorner::Center, 3, 3, &hints());
        assert_eq!(out.width, 102);
        assert_eq!(out.height, 102);
        assert_eq!(out.x, 49);
        assert_eq!(out.y, 49);
    }

    #[test]
    fn center_resize_shrinks_symmetrically() {
        let start = WinRect::new(50, 50, 100, 100);
        let out = apply_resize(start, ResizeCorner::Center, -5, -4, &hints());
        assert_eq!(out, WinRect::new(52, 52, 96, 96));
    }

    #[test]
    fn corner_detection_grid() {
        let rect = WinRect::new(0, 0, 100, 100);
        let (cw, ch) = (CornerSize::Pixels(30), CornerSize::Pixels(30));
        assert_eq!(corner_for_pointer(rect, 5, 5, cw, ch), ResizeCorner::TopLeft);
        assert_eq!(
            corner_for_pointer(rect, 95, 5, cw, ch),
            ResizeCorner::TopRight
        );
        assert_eq!(corner_for_pointer(rect, 50, 5, cw, ch), ResizeCorner::Top);
        assert_eq!(corner_for_pointer(rect, 5, 50, cw, ch), ResizeCorner::Left);
        assert_eq!(
            corner_for_pointer(rect, 50, 50, cw, ch),
            ResizeCorner::Center
        );
        assert_eq!(
            corner_for_pointer(rect, 95, 95, cw, ch),
            ResizeCorner::BottomRight
        );
    }

    #[test]
    fn percent_hit_box_scales_with_window() {
        let rect = WinRect::new(0, 0, 200, 100);
        let cw = CornerSize::Percent(25); // 50 px
        let ch = CornerSize::Percent(25); // 25 px
        assert_eq!(
            corner_for_pointer(rect, 49, 60, cw, ch),
            ResizeCorner::Left
        );
        assert_eq!(
            corner_for_pointer(rect, 60, 60, cw, ch),
            ResizeCorner::Center
        );
    }
}
