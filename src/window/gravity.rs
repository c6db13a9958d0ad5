//! X11 gravity handling for framed windows.
//!
//! When the manager wraps a bare client in a frame, the client's gravity
//! decides which reference point of the new frame must land where the bare
//! client would have been. Constants match the core protocol bit-for-bit.

pub const FORGET: i32 = 0;
pub const NORTH_WEST: i32 = 1;
pub const NORTH: i32 = 2;
pub const NORTH_EAST: i32 = 3;
pub const WEST: i32 = 4;
pub const CENTER: i32 = 5;
pub const EAST: i32 = 6;
pub const SOUTH_WEST: i32 = 7;
pub const SOUTH: i32 = 8;
pub const SOUTH_EAST: i32 = 9;
pub const STATIC: i32 = 10;

/// Frame extents that feed gravity translation: the decoration heights
/// above and below the client area plus the frame's own border width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameMetrics {
    pub title_height: u32,
    pub handle_height: u32,
    pub border_width: u32,
}

impl FrameMetrics {
    /// Extra total width the frame adds versus the bare client with its
    /// original border (negative when the frame border is wider).
    fn width_diff(&self, client_bw: u32) -> i32 {
        2 * client_bw as i32 - 2 * self.border_width as i32
    }

    fn height_diff(&self, client_bw: u32) -> i32 {
        2 * client_bw as i32
            - (2 * self.border_width as i32
                + self.title_height as i32
                + self.handle_height as i32)
    }

    /// Translate a client position into the frame position that keeps the
    /// gravity reference point on screen where the bare client put it.
    ///
    /// A negative `gravity` inverts the translation, so
    /// `translate(translate(x, y, g, bw), -g, bw) == (x, y)` for every
    /// gravity; the two CENTER-axis cases use floor division in the same
    /// direction both ways, which keeps the round trip exact.
    pub fn translate(&self, x: i32, y: i32, gravity: i32, client_bw: u32) -> (i32, i32) {
        let invert = gravity < 0;
        let gravity = gravity.abs();
        let (dx, dy) = self.offsets(gravity, client_bw);
        if invert {
            (x - dx, y - dy)
        } else {
            (x + dx, y + dy)
        }
    }

    fn offsets(&self, gravity: i32, client_bw: u32) -> (i32, i32) {
        let wd = self.width_diff(client_bw);
        let hd = self.height_diff(client_bw);
        let cbw = client_bw as i32;
        let bw = self.border_width as i32;

        let dx = match gravity {
            NORTH_WEST | WEST | SOUTH_WEST | FORGET => 0,
            NORTH | CENTER | SOUTH => wd.div_euclid(2),
            NORTH_EAST | EAST | SOUTH_EAST => wd,
            STATIC => cbw - bw,
            _ => 0,
        };
        let dy = match gravity {
            NORTH_WEST | NORTH | NORTH_EAST | FORGET => 0,
            WEST | CENTER | EAST => hd.div_euclid(2),
            SOUTH_WEST | SOUTH | SOUTH_EAST => hd,
            STATIC => cbw - (bw + self.title_height as i32),
            _ => 0,
        };
        (dx, dy)
    }
}
