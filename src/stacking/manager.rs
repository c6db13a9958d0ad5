use std::collections::BTreeMap;

use super::layer::{Layer, LayerItem};
use super::{ItemId, ServerStack, StackWindow, band};

/// Owns every priority band and brokers all restacking.
///
/// The invariant after any `restack()` (and along every O(1) path): the
/// band-ordered, bottom-to-top concatenation of item windows equals the
/// live server stacking order. Cheap operations anchor an item below the
/// lowest window of the next non-empty higher band instead of rewriting
/// the whole order.
#[derive(Debug)]
pub struct LayerManager {
    layers: BTreeMap<u8, Layer>,
    items: BTreeMap<ItemId, LayerItem>,
    next_id: u64,
    needs_restack: bool,
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::with_bands(band::ALL)
    }
}

impl LayerManager {
    pub fn with_bands(priorities: &[u8]) -> Self {
        let layers = priorities
            .iter()
            .map(|&p| (p, Layer::new(p)))
            .collect::<BTreeMap<_, _>>();
        Self {
            layers,
            items: BTreeMap::new(),
            next_id: 0,
            needs_restack: false,
        }
    }

    pub fn item(&self, id: ItemId) -> Option<&LayerItem> {
        self.items.get(&id)
    }

    pub fn layer(&self, priority: u8) -> Option<&Layer> {
        self.layers.get(&priority)
    }

    /// A deferred (temp-raise) order is pending until the next `restack()`.
    pub fn needs_restack(&self) -> bool {
        self.needs_restack
    }

    /// Requested priorities that fall between configured bands are clamped
    /// to the nearest band at or below, or to the lowest band.
    fn clamp_band(&self, priority: u8) -> u8 {
        self.layers
            .range(..=priority)
            .next_back()
            .or_else(|| self.layers.iter().next())
            .map(|(&p, _)| p)
            .expect("LayerManager constructed with at least one band")
    }

    /// Create a new item at the top of `priority`'s band and stack it on
    /// the server. O(1): one anchored restack call.
    pub fn insert<S: ServerStack>(
        &mut self,
        windows: Vec<StackWindow>,
        priority: u8,
        server: &mut S,
    ) -> ItemId {
        let band = self.clamp_band(priority);
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items.insert(id, LayerItem::new(windows, band));
        self.layers
            .get_mut(&band)
            .expect("clamped band exists")
            .push_top(id);
        self.restack_to_band_top(id, server);
        id
    }

    /// Drop an item from its band. The relative order of everything else
    /// is unaffected, so no server call is needed.
    pub fn remove(&mut self, id: ItemId) -> Option<LayerItem> {
        let item = self.items.remove(&id)?;
        if let Some(layer) = self.layers.get_mut(&item.band()) {
            layer.remove(id);
        }
        Some(item)
    }

    /// Replace the windows carried by an item (e.g. an auxiliary window
    /// appeared or went away). Takes effect on the next restack.
    pub fn set_windows(&mut self, id: ItemId, windows: Vec<StackWindow>) {
        match self.items.get_mut(&id) {
            Some(item) => item.set_windows(windows),
            None => missing(id, "set_windows"),
        }
    }

    /// Move an item to the top of its band. Issues zero server calls when
    /// the item is already on top and no deferred restack is owed.
    pub fn raise<S: ServerStack>(&mut self, id: ItemId, server: &mut S) {
        let Some(band) = self.items.get(&id).map(|it| it.band()) else {
            missing(id, "raise");
            return;
        };
        let layer = self.layers.get_mut(&band).expect("item band exists");
        if layer.is_top(id) {
            if self.needs_restack {
                self.restack(server);
            }
            return;
        }
        layer.move_to_top(id);
        self.restack_to_band_top(id, server);
    }

    /// Move an item to the bottom of its band.
    pub fn lower<S: ServerStack>(&mut self, id: ItemId, server: &mut S) {
        let Some(band) = self.items.get(&id).map(|it| it.band()) else {
            missing(id, "lower");
            return;
        };
        let layer = self.layers.get_mut(&band).expect("item band exists");
        if layer.bottom() == Some(id) && !layer.is_top(id) {
            if self.needs_restack {
                self.restack(server);
            }
            return;
        }
        layer.move_to_bottom(id);
        let above = self.layers[&band].above(id);
        match above {
            Some(anchor) => self.restack_below_item(id, anchor, server),
            // Only item in its band: nothing to anchor on, commit the
            // whole order instead.
            None => self.restack(server),
        }
    }

    /// Raise an item on the server without touching list order. The next
    /// full `restack()` reverts it; used by peek/cycle UIs.
    pub fn temp_raise<S: ServerStack>(&mut self, id: ItemId, server: &mut S) {
        let Some(band) = self.items.get(&id).map(|it| it.band()) else {
            missing(id, "temp_raise");
            return;
        };
        if self.layers[&band].is_top(id) && !self.needs_restack {
            return;
        }
        self.restack_to_band_top(id, server);
        self.needs_restack = true;
    }

    /// Transfer an item to another band: remove then insert, with the O(1)
    /// anchored restack. No intermediate state is observable.
    pub fn move_to_layer<S: ServerStack>(&mut self, id: ItemId, priority: u8, server: &mut S) {
        let band = self.clamp_band(priority);
        let Some(item) = self.items.get_mut(&id) else {
            missing(id, "move_to_layer");
            return;
        };
        let old = item.band();
        if old == band {
            self.raise(id, server);
            return;
        }
        item.set_band(band);
        self.layers
            .get_mut(&old)
            .expect("item band exists")
            .remove(id);
        self.layers
            .get_mut(&band)
            .expect("clamped band exists")
            .push_top(id);
        self.restack_to_band_top(id, server);
    }

    /// Commit the authoritative order in a single bulk server call and
    /// clear any deferred temp-raise.
    pub fn restack<S: ServerStack>(&mut self, server: &mut S) {
        server.restack(&self.flatten_top_to_bottom());
        self.needs_restack = false;
    }

    /// Bottom item of the first non-empty band strictly above `priority`.
    pub fn lowest_item_above(&self, priority: u8) -> Option<ItemId> {
        self.layers
            .range(priority + 1..)
            .find(|(_, layer)| !layer.is_empty())
            .and_then(|(_, layer)| layer.bottom())
    }

    /// Full window order, top-to-bottom, as the vectors dictate it.
    pub fn flatten_top_to_bottom(&self) -> Vec<StackWindow> {
        let mut out = Vec::new();
        for layer in self.layers.values().rev() {
            for &id in layer.items().iter().rev() {
                out.extend_from_slice(self.items[&id].windows());
            }
        }
        out
    }

    /// Server calls placing `id`'s windows at the top of its band region:
    /// directly below the lowest item of the next non-empty higher band,
    /// or at the very top of the stack when no such item exists.
    fn restack_to_band_top<S: ServerStack>(&mut self, id: ItemId, server: &mut S) {
        let band = self.items[&id].band();
        match self.lowest_item_above(band) {
            Some(anchor) => self.restack_below_item(id, anchor, server),
            None => server.raise_to_top(self.items[&id].windows()),
        }
    }

    fn restack_below_item<S: ServerStack>(&mut self, id: ItemId, anchor: ItemId, server: &mut S) {
        let Some(sibling) = self.items[&anchor].bottom_window() else {
            // Anchor item carries no windows; fall back to the bulk path.
            self.restack(server);
            return;
        };
        server.restack_below(sibling, self.items[&id].windows());
    }
}

fn missing(id: ItemId, op: &str) {
    // Programmer error: debug builds log it, release builds stay silent.
    if cfg!(debug_assertions) {
        tracing::warn!(?id, op, "stacking operation on unknown item");
    }
}
