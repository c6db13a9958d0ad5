pub mod layer;
pub mod manager;

pub use layer::{Layer, LayerItem};
pub use manager::LayerManager;

/// Opaque server-side window handle. The core never owns the OS window and
/// never dereferences the id; it only hands it back to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackWindow(pub u32);

/// Arena key identifying a stacked item inside a `LayerManager`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub(crate) u64);

/// Standard band priorities. Lower bands are always below higher bands.
///
/// The EWMH state mapping is fixed by convention: `_NET_WM_STATE_BELOW`
/// puts a window in `BELOW`, `_NET_WM_STATE_ABOVE` in `ABOVE`, and a
/// fullscreen window rides in `FULLSCREEN` until it leaves the state.
pub mod band {
    pub const DESKTOP: u8 = 0;
    pub const BELOW: u8 = 2;
    pub const NORMAL: u8 = 4;
    pub const ABOVE: u8 = 6;
    pub const DOCK: u8 = 8;
    pub const FULLSCREEN: u8 = 10;
    pub const MENU: u8 = 12;

    pub const ALL: &[u8] = &[DESKTOP, BELOW, NORMAL, ABOVE, DOCK, FULLSCREEN, MENU];
}

/// Band priority for a window advertising EWMH above/below state.
pub fn band_for_ewmh(above: bool, below: bool) -> u8 {
    if above {
        band::ABOVE
    } else if below {
        band::BELOW
    } else {
        band::NORMAL
    }
}

/// Server-side restack effects.
///
/// The live implementation wraps the display connection; tests use a
/// recording fake. All window lists are ordered top-to-bottom, matching
/// the sibling conventions of `XRestackWindows`. Implementations must
/// tolerate ids for windows that have already been destroyed.
pub trait ServerStack {
    /// Place `windows` at the very top of the global stack.
    fn raise_to_top(&mut self, windows: &[StackWindow]);

    /// Place `windows` at the very bottom of the global stack.
    fn lower_to_bottom(&mut self, windows: &[StackWindow]);

    /// Place `windows` directly below `sibling`.
    fn restack_below(&mut self, sibling: StackWindow, windows: &[StackWindow]);

    /// Replace the entire stacking order in one bulk call.
    fn restack(&mut self, windows: &[StackWindow]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ewmh_band_mapping() {
        assert_eq!(band_for_ewmh(false, false), band::NORMAL);
        assert_eq!(band_for_ewmh(true, false), band::ABOVE);
        assert_eq!(band_for_ewmh(false, true), band::BELOW);
        // above wins if a client sets both
        assert_eq!(band_for_ewmh(true, true), band::ABOVE);
    }
}
