pub mod gravity;
mod machine;
pub mod resize;
pub mod snap;
pub mod tabs;

pub use gravity::FrameMetrics;
pub use machine::{MoveResizeOptions, WindowMachine};
pub use resize::{CornerSize, ResizeCorner};
pub use tabs::{ClientHandle, TabGroup};

use bitflags::bitflags;

/// Signed screen-space rectangle: origin may be off-screen, size is
/// always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WinRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }

    /// Half-open ranges `[top, bottom)` share at least one row.
    pub fn overlaps_vertically(&self, other: &WinRect) -> bool {
        self.top() < other.bottom() && other.top() < self.bottom()
    }

    pub fn overlaps_horizontally(&self, other: &WinRect) -> bool {
        self.left() < other.right() && other.left() < self.right()
    }
}

bitflags! {
    /// Which frame elements a window carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DecorMask: u16 {
        const TITLEBAR = 1 << 0;
        const HANDLE = 1 << 1;
        const BORDER = 1 << 2;
        const ICONIFY_BUTTON = 1 << 3;
        const MAXIMIZE_BUTTON = 1 << 4;
        const CLOSE_BUTTON = 1 << 5;
        const MENU_BUTTON = 1 << 6;
        const TAB = 1 << 7;
    }
}

impl DecorMask {
    pub const NORMAL: DecorMask = DecorMask::all();
    pub const BORDERLESS: DecorMask = DecorMask::empty();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Maximize {
    #[default]
    None,
    Horz,
    Vert,
    Full,
}

/// ICCCM size constraints, re-applied on every intermediate resize frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeHints {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub width_inc: u32,
    pub height_inc: u32,
    pub base_width: u32,
    pub base_height: u32,
    /// width/height ratio bounds as (numerator, denominator); a zero
    /// denominator disables the constraint.
    pub min_aspect: (u32, u32),
    pub max_aspect: (u32, u32),
}

impl Default for SizeHints {
    fn default() -> Self {
        Self {
            min_width: 1,
            min_height: 1,
            max_width: u32::MAX,
            max_height: u32::MAX,
            width_inc: 1,
            height_inc: 1,
            base_width: 0,
            base_height: 0,
            min_aspect: (0, 0),
            max_aspect: (0, 0),
        }
    }
}

impl SizeHints {
    /// Clamp a proposed size to the hints: min/max first, then resize
    /// increments relative to the base size, then aspect bounds.
    pub fn apply(&self, width: u32, height: u32) -> (u32, u32) {
        let mut w = width.clamp(self.min_width.max(1), self.max_width);
        let mut h = height.clamp(self.min_height.max(1), self.max_height);

        if self.width_inc > 1 && w > self.base_width {
            w = self.base_width + ((w - self.base_width) / self.width_inc) * self.width_inc;
        }
        if self.height_inc > 1 && h > self.base_height {
            h = self.base_height + ((h - self.base_height) / self.height_inc) * self.height_inc;
        }

        // too tall for the minimum ratio: shrink the height
        if self.min_aspect.1 > 0
            && (w as u64 * self.min_aspect.1 as u64) < (h as u64 * self.min_aspect.0 as u64)
        {
            h = (w as u64 * self.min_aspect.1 as u64 / self.min_aspect.0.max(1) as u64) as u32;
        }
        // too wide for the maximum ratio: shrink the width
        if self.max_aspect.1 > 0
            && (w as u64 * self.max_aspect.1 as u64) > (h as u64 * self.max_aspect.0 as u64)
        {
            w = (h as u64 * self.max_aspect.0 as u64 / self.max_aspect.1 as u64) as u32;
        }

        (w.max(1), h.max(1))
    }

    /// Displayed size in client increments (the `80x24` readout for
    /// terminals), or the pixel size when no increments are set.
    pub fn display_size(&self, width: u32, height: u32) -> (u32, u32) {
        let w = if self.width_inc > 1 {
            width.saturating_sub(self.base_width) / self.width_inc
        } else {
            width
        };
        let h = if self.height_inc > 1 {
            height.saturating_sub(self.base_height) / self.height_inc
        } else {
            height
        };
        (w, h)
    }
}

/// The value state of one managed window: geometry plus every independent
/// state axis. Mutated only by its owning `WindowMachine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowState {
    pub geom: WinRect,
    pub decor: DecorMask,
    pub maximize: Maximize,
    pub shaded: bool,
    pub stuck: bool,
    pub fullscreen: bool,
    pub focused: bool,
    pub iconic: bool,
    pub layer: u8,
    pub hints: SizeHints,
}

impl WindowState {
    pub fn new(geom: WinRect) -> Self {
        Self {
            geom,
            decor: DecorMask::NORMAL,
            maximize: Maximize::None,
            shaded: false,
            stuck: false,
            fullscreen: false,
            focused: false,
            iconic: false,
            layer: crate::stacking::band::NORMAL,
            hints: SizeHints::default(),
        }
    }
}

/// Process-wide pointer-grab bookkeeping. Single-threaded, so a plain
/// counter is enough; overlapping grabs from nested event delivery are
/// refused, never queued.
#[derive(Debug, Default)]
pub struct GrabCounter {
    outstanding: u32,
    cycling: bool,
}

impl GrabCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the pointer. Returns false if some operation already holds it.
    pub fn try_acquire(&mut self) -> bool {
        if self.outstanding > 0 {
            return false;
        }
        self.outstanding += 1;
        true
    }

    pub fn release(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    pub fn is_grabbed(&self) -> bool {
        self.outstanding > 0
    }

    pub fn is_cycling(&self) -> bool {
        self.cycling
    }

    pub fn set_cycling(&mut self, cycling: bool) {
        self.cycling = cycling;
    }
}
