use super::{ItemId, StackWindow};

/// One stacking unit: a managed frame window plus any auxiliary windows
/// (tab dropdown, input indicator) that must move with it.
///
/// Window order is top-to-bottom; the frame window usually comes first.
#[derive(Debug, Clone)]
pub struct LayerItem {
    windows: Vec<StackWindow>,
    band: u8,
}

impl LayerItem {
    pub(crate) fn new(windows: Vec<StackWindow>, band: u8) -> Self {
        Self { windows, band }
    }

    pub fn windows(&self) -> &[StackWindow] {
        &self.windows
    }

    pub fn band(&self) -> u8 {
        self.band
    }

    pub(crate) fn set_band(&mut self, band: u8) {
        self.band = band;
    }

    pub(crate) fn set_windows(&mut self, windows: Vec<StackWindow>) {
        self.windows = windows;
    }

    /// Bottom-most window of this item, used as a restack anchor by the
    /// layer below it.
    pub(crate) fn bottom_window(&self) -> Option<StackWindow> {
        self.windows.last().copied()
    }
}

/// One priority band: an ordered run of items at a fixed numeric priority.
///
/// Vector order is authoritative within the band: index 0 is the bottom,
/// the last index is the top.
#[derive(Debug, Clone)]
pub struct Layer {
    priority: u8,
    items: Vec<ItemId>,
}

impl Layer {
    pub(crate) fn new(priority: u8) -> Self {
        Self {
            priority,
            items: Vec::new(),
        }
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn bottom(&self) -> Option<ItemId> {
        self.items.first().copied()
    }

    pub(crate) fn is_top(&self, id: ItemId) -> bool {
        self.items.last() == Some(&id)
    }

    pub(crate) fn push_top(&mut self, id: ItemId) {
        self.items.push(id);
    }

    pub(crate) fn remove(&mut self, id: ItemId) -> bool {
        if let Some(pos) = self.items.iter().position(|&it| it == id) {
            self.items.remove(pos);
            true
        } else {
            false
        }
    }

    /// Move an already-present item to the top of the band. Returns false
    /// if the item is not in this band.
    pub(crate) fn move_to_top(&mut self, id: ItemId) -> bool {
        if self.remove(id) {
            self.items.push(id);
            true
        } else {
            false
        }
    }

    /// Move an already-present item to the bottom of the band.
    pub(crate) fn move_to_bottom(&mut self, id: ItemId) -> bool {
        if self.remove(id) {
            self.items.insert(0, id);
            true
        } else {
            false
        }
    }

    /// Item directly above `id` within this band, if any.
    pub(crate) fn above(&self, id: ItemId) -> Option<ItemId> {
        let pos = self.items.iter().position(|&it| it == id)?;
        self.items.get(pos + 1).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_to_top_and_bottom_keep_order() {
        let mut layer = Layer::new(4);
        let (a, b, c) = (ItemId(1), ItemId(2), ItemId(3));
        layer.push_top(a);
        layer.push_top(b);
        layer.push_top(c);
        assert!(layer.is_top(c));

        assert!(layer.move_to_top(a));
        assert_eq!(layer.items(), &[b, c, a]);

        assert!(layer.move_to_bottom(c));
        assert_eq!(layer.items(), &[c, b, a]);

        assert_eq!(layer.above(b), Some(a));
        assert_eq!(layer.above(a), None);
    }

    #[test]
    fn remove_unknown_is_false() {
        let mut layer = Layer::new(4);
        assert!(!layer.remove(ItemId(9)));
        assert!(!layer.move_to_top(ItemId(9)));
    }
}
