//! The per-window state machine.
//!
//! One machine owns one `WindowState` and the ordered client list sharing
//! its frame. All state axes are independent and combined freely:
//! {normal, iconic} x {maximize} x {shaded} x {fullscreen} x {stuck}.
//! The machine delegates actual layout to its `Frame` collaborator and
//! restacking to the `LayerManager` handed into each transition.

use tracing::debug;

use super::gravity::FrameMetrics;
use super::resize::{apply_resize, corner_for_pointer};
use super::snap::{snap_move, snap_resize};
use super::tabs::drop_index;
use super::{
    ClientHandle, CornerSize, DecorMask, GrabCounter, Maximize, ResizeCorner, SizeHints, TabGroup,
    WinRect, WindowState,
};
use crate::constants::{
    DEFAULT_CORNER_SIZE_PERCENT, DEFAULT_CORNER_SIZE_PX, DEFAULT_SNAP_THRESHOLD,
};
use crate::frame::{Frame, Screen};
use crate::remember::{Remember, SavedWindow};
use crate::stacking::{ItemId, LayerManager, ServerStack, band};

/// Tunables for interactive move/resize.
#[derive(Debug, Clone, Copy)]
pub struct MoveResizeOptions {
    pub snap_threshold: u32,
    pub corner_width: CornerSize,
    pub corner_height: CornerSize,
}

impl Default for MoveResizeOptions {
    fn default() -> Self {
        Self {
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            corner_width: CornerSize::Pixels(DEFAULT_CORNER_SIZE_PX),
            corner_height: CornerSize::Percent(DEFAULT_CORNER_SIZE_PERCENT),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MoveOp {
    start: WinRect,
    grab_x: i32,
    grab_y: i32,
}

#[derive(Debug, Clone, Copy)]
struct ResizeOp {
    start: WinRect,
    corner: ResizeCorner,
    grab_x: i32,
    grab_y: i32,
}

/// State requests that arrive before `init()` completes are staged here
/// and applied once, in a fixed order, when initialization finishes.
#[derive(Debug, Default, Clone, Copy)]
struct Staged {
    maximize: Option<Maximize>,
    shaded: Option<bool>,
    stuck: Option<bool>,
    iconic: Option<bool>,
    fullscreen: Option<bool>,
    layer: Option<u8>,
}

pub struct WindowMachine<F: Frame> {
    state: WindowState,
    frame: F,
    clients: TabGroup,
    stack_item: Option<ItemId>,
    options: MoveResizeOptions,

    initialized: bool,
    retired: bool,
    staged: Staged,

    // pre-fullscreen / pre-maximize restore data, per axis
    saved_layer: Option<u8>,
    saved_h: Option<(i32, u32)>,
    saved_v: Option<(i32, u32)>,

    moving: Option<MoveOp>,
    resizing: Option<ResizeOp>,
    tab_drag: Option<ClientHandle>,
    interrupted: bool,
}

impl<F: Frame> WindowMachine<F> {
    pub fn new(frame: F, first_client: ClientHandle, geom: WinRect) -> Self {
        let mut clients = TabGroup::new();
        clients.attach(first_client);
        Self {
            state: WindowState::new(geom),
            frame,
            clients,
            stack_item: None,
            options: MoveResizeOptions::default(),
            initialized: false,
            retired: false,
            staged: Staged::default(),
            saved_layer: None,
            saved_h: None,
            saved_v: None,
            moving: None,
            resizing: None,
            tab_drag: None,
            interrupted: false,
        }
    }

    pub fn with_options(mut self, options: MoveResizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> &WindowState {
        &self.state
    }

    pub fn geometry(&self) -> WinRect {
        self.state.geom
    }

    pub fn frame(&self) -> &F {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut F {
        &mut self.frame
    }

    pub fn set_hints(&mut self, hints: SizeHints) {
        self.state.hints = hints;
    }

    pub fn set_decor(&mut self, decor: DecorMask) {
        self.state.decor = decor;
        // a titlebar-less window cannot stay shaded
        if !decor.contains(DecorMask::TITLEBAR) && self.state.shaded {
            self.set_shaded(false);
        }
    }

    pub fn stack_item(&self) -> Option<ItemId> {
        self.stack_item
    }

    pub fn set_stack_item(&mut self, item: Option<ItemId>) {
        self.stack_item = item;
    }

    /// Finish managing the window: restore persisted state, flush the
    /// initial geometry, then apply everything that was staged while the
    /// machine was still settling.
    pub fn init<S: ServerStack>(
        &mut self,
        restored: Option<SavedWindow>,
        screen: &dyn Screen,
        layers: &mut LayerManager,
        server: &mut S,
    ) {
        if self.initialized {
            return;
        }
        if let Some(saved) = restored {
            self.state.geom = saved.geom;
            self.state.decor = saved.decor;
            self.state.stuck = saved.stuck;
            self.staged.layer.get_or_insert(saved.layer);
            if saved.shaded {
                self.staged.shaded.get_or_insert(true);
            }
            if saved.maximize != Maximize::None {
                self.staged.maximize.get_or_insert(saved.maximize);
            }
        }
        self.initialized = true;
        self.frame.move_resize(self.state.geom);

        let staged = std::mem::take(&mut self.staged);
        if let Some(layer) = staged.layer {
            self.change_layer(layer, layers, server);
        }
        if let Some(mode) = staged.maximize {
            self.apply_maximize(mode, screen);
        }
        if staged.shaded == Some(true) {
            self.set_shaded(true);
        }
        if let Some(stuck) = staged.stuck {
            self.state.stuck = stuck;
        }
        if let Some(iconic) = staged.iconic {
            self.state.iconic = iconic;
        }
        if staged.fullscreen == Some(true) {
            self.set_fullscreen(true, screen, layers, server);
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ---- tab group ------------------------------------------------------

    pub fn clients(&self) -> &[ClientHandle] {
        self.clients.clients()
    }

    pub fn attach_client(&mut self, client: ClientHandle) {
        self.clients.attach(client);
    }

    /// Attach at the position a dragged tab was dropped: against the
    /// midpoints of the frame's current tab buttons.
    pub fn attach_client_at(&mut self, client: ClientHandle, drop_x: i32) {
        let idx = drop_index(drop_x, &self.frame.tab_boxes());
        self.clients.attach_at(client, idx);
    }

    /// Detach a client; when the last one leaves, the machine retires and
    /// the owner must drop it.
    pub fn detach_client(&mut self, client: ClientHandle) -> bool {
        let removed = self.clients.detach(client);
        if removed && self.clients.is_empty() {
            self.retired = true;
        }
        removed
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    // ---- state axes ------------------------------------------------------

    /// Toggle-style maximize: requesting the current mode restores the
    /// window, requesting another mode switches axes, restoring the axis
    /// that is no longer maximized.
    pub fn set_maximize(&mut self, mode: Maximize, screen: &dyn Screen) {
        if !self.initialized {
            self.staged.maximize = Some(mode);
            return;
        }
        let target = if self.state.maximize == mode {
            Maximize::None
        } else {
            mode
        };
        self.apply_maximize(target, screen);
    }

    fn apply_maximize(&mut self, mode: Maximize, screen: &dyn Screen) {
        let usable = screen.usable(self.head(screen));
        let want_h = matches!(mode, Maximize::Horz | Maximize::Full);
        let want_v = matches!(mode, Maximize::Vert | Maximize::Full);

        let mut geom = self.state.geom;
        if want_h {
            if self.saved_h.is_none() {
                self.saved_h = Some((geom.x, geom.width));
            }
            geom.x = usable.left();
            geom.width = usable.width;
        } else if let Some((x, w)) = self.saved_h.take() {
            geom.x = x;
            geom.width = w;
        }
        if want_v {
            if self.saved_v.is_none() {
                self.saved_v = Some((geom.y, geom.height));
            }
            geom.y = usable.top();
            geom.height = usable.height;
        } else if let Some((y, h)) = self.saved_v.take() {
            geom.y = y;
            geom.height = h;
        }

        self.state.maximize = mode;
        self.update_geometry(geom);
    }

    /// Shading collapses the frame to its titlebar; without a titlebar
    /// there is nothing to collapse to, so the request is refused.
    pub fn set_shaded(&mut self, on: bool) {
        if !self.initialized {
            self.staged.shaded = Some(on);
            return;
        }
        if on && !self.state.decor.contains(DecorMask::TITLEBAR) {
            debug!("shade refused: no titlebar");
            return;
        }
        if on == self.state.shaded {
            return;
        }
        self.state.shaded = on;
        self.frame.set_shaded(on);
    }

    pub fn toggle_shaded(&mut self) {
        self.set_shaded(!self.state.shaded);
    }

    /// Fullscreen rides in its own band and overrides whatever geometry
    /// maximize computed; both are restored when the state is left.
    pub fn set_fullscreen<S: ServerStack>(
        &mut self,
        on: bool,
        screen: &dyn Screen,
        layers: &mut LayerManager,
        server: &mut S,
    ) {
        if !self.initialized {
            self.staged.fullscreen = Some(on);
            return;
        }
        if on == self.state.fullscreen {
            return;
        }
        if on {
            self.set_shaded(false);
            self.state.fullscreen = true;
            self.saved_layer = Some(self.state.layer);
            self.change_layer(band::FULLSCREEN, layers, server);
            let full = screen.usable(self.head(screen));
            self.frame.move_resize(full);
        } else {
            self.state.fullscreen = false;
            if let Some(prev) = self.saved_layer.take() {
                self.change_layer(prev, layers, server);
            }
            self.frame.move_resize(self.state.geom);
        }
    }

    pub fn iconify(&mut self) {
        if !self.initialized {
            self.staged.iconic = Some(true);
            return;
        }
        self.state.iconic = true;
    }

    pub fn deiconify(&mut self) {
        if !self.initialized {
            self.staged.iconic = Some(false);
            return;
        }
        self.state.iconic = false;
    }

    pub fn set_stuck(&mut self, on: bool) {
        if !self.initialized {
            self.staged.stuck = Some(on);
            return;
        }
        self.state.stuck = on;
    }

    pub fn set_focused(&mut self, on: bool) {
        self.state.focused = on;
    }

    /// Change stacking band. While fullscreen the window stays in the
    /// fullscreen band; the request lands when fullscreen is left.
    pub fn set_layer<S: ServerStack>(
        &mut self,
        priority: u8,
        layers: &mut LayerManager,
        server: &mut S,
    ) {
        if !self.initialized {
            self.staged.layer = Some(priority);
            return;
        }
        if self.state.fullscreen {
            self.saved_layer = Some(priority);
            return;
        }
        self.change_layer(priority, layers, server);
    }

    fn change_layer<S: ServerStack>(
        &mut self,
        priority: u8,
        layers: &mut LayerManager,
        server: &mut S,
    ) {
        self.state.layer = priority;
        if let Some(item) = self.stack_item {
            layers.move_to_layer(item, priority, server);
        }
    }

    pub fn raise<S: ServerStack>(&mut self, layers: &mut LayerManager, server: &mut S) {
        if let Some(item) = self.stack_item {
            layers.raise(item, server);
        }
    }

    pub fn lower<S: ServerStack>(&mut self, layers: &mut LayerManager, server: &mut S) {
        if let Some(item) = self.stack_item {
            layers.lower(item, server);
        }
    }

    // ---- geometry --------------------------------------------------------

    /// Gravity translation against the current frame metrics; see
    /// `FrameMetrics::translate`.
    pub fn gravity_translate(&self, x: i32, y: i32, gravity: i32, client_bw: u32) -> (i32, i32) {
        self.frame.metrics().translate(x, y, gravity, client_bw)
    }

    /// Program-requested move/resize (configure request), hints applied.
    pub fn move_resize_to(&mut self, geom: WinRect) {
        let hints = self.frame_hints();
        let (w, h) = hints.apply(geom.width, geom.height);
        self.update_geometry(WinRect::new(geom.x, geom.y, w, h));
    }

    /// Current client size in hint increments, for the resize readout.
    pub fn display_size(&self) -> (u32, u32) {
        let metrics = self.frame.metrics();
        let deco = metrics.title_height + metrics.handle_height;
        self.state
            .hints
            .display_size(self.state.geom.width, self.state.geom.height.saturating_sub(deco))
    }

    fn head(&self, screen: &dyn Screen) -> usize {
        let geom = self.state.geom;
        screen.head_at(
            geom.x + geom.width as i32 / 2,
            geom.y + geom.height as i32 / 2,
        )
    }

    /// Size hints shifted into frame space: the decorations above and
    /// below the client area are opaque to the client's constraints.
    fn frame_hints(&self) -> SizeHints {
        let metrics = self.frame.metrics();
        let deco = metrics.title_height + metrics.handle_height;
        let mut hints = self.state.hints;
        hints.base_height = hints.base_height.saturating_add(deco);
        hints.min_height = hints.min_height.saturating_add(deco);
        hints.max_height = hints.max_height.saturating_add(deco);
        hints
    }

    fn update_geometry(&mut self, geom: WinRect) {
        self.state.geom = geom;
        if !self.state.fullscreen {
            self.frame.move_resize(geom);
        }
    }

    // ---- interactive operations -----------------------------------------

    fn operation_pending(&self) -> bool {
        self.moving.is_some() || self.resizing.is_some() || self.tab_drag.is_some()
    }

    /// Start an interactive move. Refused while another operation holds
    /// the pointer, or for windows that cannot move (iconic, fullscreen).
    pub fn begin_move(&mut self, grabs: &mut GrabCounter, px: i32, py: i32) -> bool {
        if self.operation_pending() || self.state.iconic || self.state.fullscreen {
            return false;
        }
        if !grabs.try_acquire() {
            return false;
        }
        self.interrupted = false;
        self.moving = Some(MoveOp {
            start: self.state.geom,
            grab_x: px,
            grab_y: py,
        });
        true
    }

    pub fn motion_move(&mut self, px: i32, py: i32, screen: &dyn Screen, others: &[WinRect]) {
        if self.interrupted {
            return;
        }
        let Some(op) = self.moving else {
            return;
        };
        let proposed = WinRect::new(
            op.start.x + (px - op.grab_x),
            op.start.y + (py - op.grab_y),
            op.start.width,
            op.start.height,
        );
        let (x, y) = snap_move(
            proposed,
            self.options.snap_threshold,
            &screen.head_boxes(),
            others,
        );
        self.update_geometry(WinRect { x, y, ..proposed });
    }

    pub fn end_move(&mut self, grabs: &mut GrabCounter) {
        if let Some(op) = self.moving.take() {
            if self.interrupted {
                self.update_geometry(op.start);
            }
            grabs.release();
        }
        self.interrupted = false;
    }

    pub fn is_moving(&self) -> bool {
        self.moving.is_some()
    }

    /// Start an interactive resize. `corner` of `None` auto-detects from
    /// where the pointer pressed, against the configured corner hit-box.
    pub fn begin_resize(
        &mut self,
        grabs: &mut GrabCounter,
        px: i32,
        py: i32,
        corner: Option<ResizeCorner>,
    ) -> bool {
        if self.operation_pending()
            || self.state.iconic
            || self.state.fullscreen
            || self.state.shaded
        {
            return false;
        }
        if !grabs.try_acquire() {
            return false;
        }
        let corner = corner.unwrap_or_else(|| {
            corner_for_pointer(
                self.state.geom,
                px,
                py,
                self.options.corner_width,
                self.options.corner_height,
            )
        });
        self.interrupted = false;
        self.resizing = Some(ResizeOp {
            start: self.state.geom,
            corner,
            grab_x: px,
            grab_y: py,
        });
        true
    }

    /// One pointer step of an interactive resize: corner arithmetic,
    /// hints, then edge snapping of the moving edges, hints re-applied
    /// last so every displayed frame honors them.
    pub fn motion_resize(&mut self, px: i32, py: i32, screen: &dyn Screen, others: &[WinRect]) {
        if self.interrupted {
            return;
        }
        let Some(op) = self.resizing else {
            return;
        };
        let hints = self.frame_hints();
        let rect = apply_resize(op.start, op.corner, px - op.grab_x, py - op.grab_y, &hints);
        let snapped = snap_resize(
            rect,
            op.corner,
            self.options.snap_threshold,
            &screen.head_boxes(),
            others,
        );
        let (w, h) = hints.apply(snapped.width, snapped.height);
        let x = if op.corner.moves_left() {
            snapped.right() - w as i32
        } else {
            snapped.x
        };
        let y = if op.corner.moves_top() {
            snapped.bottom() - h as i32
        } else {
            snapped.y
        };
        self.update_geometry(WinRect::new(x, y, w, h));
    }

    pub fn end_resize(&mut self, grabs: &mut GrabCounter) {
        if let Some(op) = self.resizing.take() {
            if self.interrupted {
                self.update_geometry(op.start);
            }
            grabs.release();
        }
        self.interrupted = false;
    }

    pub fn is_resizing(&self) -> bool {
        self.resizing.is_some()
    }

    pub fn begin_tab_drag(&mut self, grabs: &mut GrabCounter, client: ClientHandle) -> bool {
        if self.operation_pending() || !self.clients.contains(client) {
            return false;
        }
        if !grabs.try_acquire() {
            return false;
        }
        self.tab_drag = Some(client);
        true
    }

    /// Drop the dragged tab at `drop_x`, reordering within this group.
    pub fn end_tab_drag(&mut self, grabs: &mut GrabCounter, drop_x: i32) {
        if let Some(client) = self.tab_drag.take() {
            if !self.interrupted {
                let idx = drop_index(drop_x, &self.frame.tab_boxes());
                self.clients.attach_at(client, idx.min(self.clients.len()));
            }
            grabs.release();
        }
        self.interrupted = false;
    }

    /// Stop the active operation without async cancellation: the flag is
    /// checked on the next motion/end call.
    pub fn interrupt(&mut self) {
        if self.operation_pending() {
            self.interrupted = true;
        }
    }

    // ---- persistence -----------------------------------------------------

    pub fn saved_state(&self) -> SavedWindow {
        // persist the unmaximized geometry; the maximize flag re-derives
        // the rest on restore
        let mut geom = self.state.geom;
        if let Some((x, w)) = self.saved_h {
            geom.x = x;
            geom.width = w;
        }
        if let Some((y, h)) = self.saved_v {
            geom.y = y;
            geom.height = h;
        }
        SavedWindow {
            geom,
            decor: self.state.decor,
            layer: if self.state.fullscreen {
                self.saved_layer.unwrap_or(self.state.layer)
            } else {
                self.state.layer
            },
            stuck: self.state.stuck,
            shaded: self.state.shaded,
            maximize: self.state.maximize,
        }
    }

    pub fn remember_to(&self, key: &str, remember: &mut dyn Remember) {
        remember.save(key, &self.saved_state());
    }
}

/// Convenience for collaborators that only need the metrics.
impl<F: Frame> WindowMachine<F> {
    pub fn frame_metrics(&self) -> FrameMetrics {
        self.frame.metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SingleHead;

    #[derive(Debug, Default)]
    struct FakeFrame {
        geom: Option<WinRect>,
        shaded: bool,
        metrics: FrameMetrics,
        tab_boxes: Vec<WinRect>,
        move_calls: usize,
    }

    impl Frame for FakeFrame {
        fn metrics(&self) -> FrameMetrics {
            self.metrics
        }

        fn move_resize(&mut self, geom: WinRect) {
            self.geom = Some(geom);
            self.move_calls += 1;
        }

        fn set_shaded(&mut self, shaded: bool) {
            self.shaded = shaded;
        }

        fn tab_boxes(&self) -> Vec<WinRect> {
            self.tab_boxes.clone()
        }
    }

    #[derive(Default)]
    struct NullServer;

    impl ServerStack for NullServer {
        fn raise_to_top(&mut self, _windows: &[crate::stacking::StackWindow]) {}
        fn lower_to_bottom(&mut self, _windows: &[crate::stacking::StackWindow]) {}
        fn restack_below(
            &mut self,
            _sibling: crate::stacking::StackWindow,
            _windows: &[crate::stacking::StackWindow],
        ) {
        }
        fn restack(&mut self, _windows: &[crate::stacking::StackWindow]) {}
    }

    fn screen() -> SingleHead {
        SingleHead(WinRect::new(0, 0, 1280, 1024))
    }

    fn machine() -> WindowMachine<FakeFrame> {
        let mut m = WindowMachine::new(
            FakeFrame::default(),
            ClientHandle(1),
            WinRect::new(100, 100, 400, 300),
        );
        let mut layers = LayerManager::default();
        let mut server = NullServer;
        m.init(None, &screen(), &mut layers, &mut server);
        m
    }

    #[test]
    fn staged_flags_apply_after_init() {
        let mut m = WindowMachine::new(
            FakeFrame::default(),
            ClientHandle(1),
            WinRect::new(100, 100, 400, 300),
        );
        m.set_shaded(true);
        m.set_stuck(true);
        m.set_maximize(Maximize::Horz, &screen());
        // nothing visible yet
        assert!(!m.state().shaded);
        assert!(!m.state().stuck);

        let mut layers = LayerManager::default();
        let mut server = NullServer;
        m.init(None, &screen(), &mut layers, &mut server);
        assert!(m.state().shaded);
        assert!(m.state().stuck);
        assert_eq!(m.state().maximize, Maximize::Horz);
        assert_eq!(m.geometry().width, 1280);
    }

    #[test]
    fn shade_requires_titlebar() {
        let mut m = machine();
        m.set_decor(DecorMask::BORDER);
        m.set_shaded(true);
        assert!(!m.state().shaded);
        m.set_decor(DecorMask::NORMAL);
        m.set_shaded(true);
        assert!(m.state().shaded);
        // dropping the titlebar unshades
        m.set_decor(DecorMask::BORDER | DecorMask::HANDLE);
        assert!(!m.state().shaded);
    }

    #[test]
    fn maximize_toggles_and_restores_per_axis() {
        let mut m = machine();
        let original = m.geometry();

        m.set_maximize(Maximize::Horz, &screen());
        assert_eq!(m.geometry(), WinRect::new(0, 100, 1280, 300));

        // switching the axis restores the horizontal one
        m.set_maximize(Maximize::Vert, &screen());
        assert_eq!(m.geometry(), WinRect::new(100, 0, 400, 1024));

        // requesting the current mode toggles back to normal
        m.set_maximize(Maximize::Vert, &screen());
        assert_eq!(m.geometry(), original);
        assert_eq!(m.state().maximize, Maximize::None);
    }

    #[test]
    fn fullscreen_saves_layer_and_overrides_maximize() {
        let mut m = machine();
        let mut layers = LayerManager::default();
        let mut server = NullServer;
        let item = layers.insert(vec![crate::stacking::StackWindow(5)], band::NORMAL, &mut server);
        m.set_stack_item(Some(item));

        m.set_maximize(Maximize::Full, &screen());
        m.set_fullscreen(true, &screen(), &mut layers, &mut server);
        assert!(m.state().fullscreen);
        assert_eq!(layers.item(item).unwrap().band(), band::FULLSCREEN);
        assert_eq!(m.frame().geom, Some(WinRect::new(0, 0, 1280, 1024)));

        m.set_fullscreen(false, &screen(), &mut layers, &mut server);
        assert_eq!(layers.item(item).unwrap().band(), band::NORMAL);
        // maximize geometry is back in charge
        assert_eq!(m.state().maximize, Maximize::Full);
        assert_eq!(m.frame().geom, Some(m.geometry()));
    }

    #[test]
    fn layer_change_while_fullscreen_lands_on_exit() {
        let mut m = machine();
        let mut layers = LayerManager::default();
        let mut server = NullServer;
        let item = layers.insert(vec![crate::stacking::StackWindow(5)], band::NORMAL, &mut server);
        m.set_stack_item(Some(item));

        m.set_fullscreen(true, &screen(), &mut layers, &mut server);
        m.set_layer(band::ABOVE, &mut layers, &mut server);
        assert_eq!(layers.item(item).unwrap().band(), band::FULLSCREEN);
        m.set_fullscreen(false, &screen(), &mut layers, &mut server);
        assert_eq!(layers.item(item).unwrap().band(), band::ABOVE);
        assert_eq!(m.state().layer, band::ABOVE);
    }

    #[test]
    fn move_snaps_against_neighbors() {
        let mut m = machine();
        let mut grabs = GrabCounter::new();
        assert!(m.begin_move(&mut grabs, 150, 150));
        // neighbor's right edge at 95 with overlapping y range
        let neighbor = WinRect::new(15, 100, 80, 300);
        m.motion_move(147, 150, &screen(), &[neighbor]);
        assert_eq!(m.geometry().x, 95);
        m.end_move(&mut grabs);
        assert!(!grabs.is_grabbed());
    }

    #[test]
    fn overlapping_operations_are_refused() {
        let mut m = machine();
        let mut grabs = GrabCounter::new();
        assert!(m.begin_move(&mut grabs, 0, 0));
        assert!(!m.begin_resize(&mut grabs, 0, 0, None));
        assert!(!m.begin_tab_drag(&mut grabs, ClientHandle(1)));
        m.end_move(&mut grabs);

        // a grab held elsewhere (another window's operation) refuses too
        assert!(grabs.try_acquire());
        assert!(!m.begin_move(&mut grabs, 0, 0));
        grabs.release();
    }

    #[test]
    fn interrupt_restores_start_geometry() {
        let mut m = machine();
        let mut grabs = GrabCounter::new();
        let start = m.geometry();
        assert!(m.begin_move(&mut grabs, 0, 0));
        m.motion_move(500, 500, &screen(), &[]);
        assert_ne!(m.geometry(), start);
        m.interrupt();
        m.motion_move(600, 600, &screen(), &[]);
        m.end_move(&mut grabs);
        assert_eq!(m.geometry(), start);
        assert!(!grabs.is_grabbed());
    }

    #[test]
    fn center_resize_grows_evenly_through_machine() {
        let mut m = machine();
        let mut grabs = GrabCounter::new();
        assert!(m.begin_resize(&mut grabs, 300, 250, Some(ResizeCorner::Center)));
        m.motion_resize(303, 253, &screen(), &[]);
        assert_eq!(m.geometry().width, 402);
        assert_eq!(m.geometry().height, 302);
        m.end_resize(&mut grabs);
    }

    #[test]
    fn resize_applies_hints_every_step() {
        let mut m = machine();
        m.set_hints(SizeHints {
            width_inc: 10,
            height_inc: 10,
            ..SizeHints::default()
        });
        let mut grabs = GrabCounter::new();
        assert!(m.begin_resize(&mut grabs, 500, 400, Some(ResizeCorner::BottomRight)));
        m.motion_resize(517, 400, &screen(), &[]);
        assert_eq!(m.geometry().width, 410);
        m.end_resize(&mut grabs);
    }

    #[test]
    fn shaded_window_refuses_resize() {
        let mut m = machine();
        let mut grabs = GrabCounter::new();
        m.set_shaded(true);
        assert!(!m.begin_resize(&mut grabs, 0, 0, None));
        assert!(!grabs.is_grabbed());
    }

    #[test]
    fn last_client_detaching_retires_machine() {
        let mut m = machine();
        m.attach_client(ClientHandle(2));
        assert!(m.detach_client(ClientHandle(1)));
        assert!(!m.is_retired());
        assert!(m.detach_client(ClientHandle(2)));
        assert!(m.is_retired());
    }

    #[test]
    fn tab_drop_reorders_clients() {
        let mut m = machine();
        m.attach_client(ClientHandle(2));
        m.attach_client(ClientHandle(3));
        // three 40px tab buttons starting at x=100
        let boxes = vec![
            WinRect::new(100, 100, 40, 16),
            WinRect::new(140, 100, 40, 16),
            WinRect::new(180, 100, 40, 16),
        ];
        m.frame.tab_boxes = boxes;
        let mut grabs = GrabCounter::new();
        assert!(m.begin_tab_drag(&mut grabs, ClientHandle(3)));
        // dropped on the left half of the first button: insert before it
        m.end_tab_drag(&mut grabs, 105);
        assert_eq!(
            m.clients(),
            &[ClientHandle(3), ClientHandle(1), ClientHandle(2)]
        );
        assert!(!grabs.is_grabbed());
    }

    #[test]
    fn gravity_passthrough_round_trips() {
        let mut m = machine();
        m.frame.metrics = FrameMetrics {
            title_height: 21,
            handle_height: 6,
            border_width: 1,
        };
        let (x, y) = m.gravity_translate(10, 10, super::super::gravity::SOUTH_EAST, 2);
        assert_eq!(
            m.gravity_translate(x, y, -super::super::gravity::SOUTH_EAST, 2),
            (10, 10)
        );
    }
}
