//! Persistence collaborator: per-window saved state across restarts.

use crate::window::{DecorMask, Maximize, WinRect};

/// What survives a restart for one window, keyed by an app identity
/// string (class/instance) chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedWindow {
    pub geom: WinRect,
    pub decor: DecorMask,
    pub layer: u8,
    pub stuck: bool,
    pub shaded: bool,
    pub maximize: Maximize,
}

pub trait Remember {
    fn restore(&self, key: &str) -> Option<SavedWindow>;
    fn save(&mut self, key: &str, state: &SavedWindow);
    fn forget(&mut self, key: &str);
}

/// Persistence disabled: restores nothing, saves nowhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRemember;

impl Remember for NoRemember {
    fn restore(&self, _key: &str) -> Option<SavedWindow> {
        None
    }

    fn save(&mut self, _key: &str, _state: &SavedWindow) {}

    fn forget(&mut self, _key: &str) {}
}
