use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::{BindingNode, BindingQuery, BindingTree, ContextMask, EventKind, ModMask, Sym};
use crate::constants::{DEFAULT_CHAIN_TIMEOUT, DEFAULT_DOUBLE_CLICK};
use crate::stacking::StackWindow;

/// Raw input, as delivered by the event pump with its context already
/// resolved. Key events carry both the symbol and the hardware code so
/// keysym and raw-keycode bindings can both match.
#[derive(Debug, Clone, Copy)]
pub enum InputEvent {
    KeyPress {
        keysym: u32,
        keycode: u8,
        mods: ModMask,
        context: ContextMask,
    },
    ButtonPress {
        button: u8,
        mods: ModMask,
        context: ContextMask,
    },
    ButtonRelease {
        button: u8,
        mods: ModMask,
        context: ContextMask,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    pub double_click: Duration,
    pub chain_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            double_click: DEFAULT_DOUBLE_CLICK,
            chain_timeout: DEFAULT_CHAIN_TIMEOUT,
        }
    }
}

/// Where the next lookup starts. `InChain` records the path of child
/// indices from the keymode root that was active when the chain opened;
/// indices go stale on reload, which resets cleanly to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChainState {
    Idle,
    InChain {
        keymode: String,
        path: Vec<usize>,
        entered_at: Instant,
    },
}

/// Grab side effects on the server. GLOBAL key bindings become keyboard
/// grabs; button bindings become per-window button grabs scoped to the
/// contexts the window accepts.
pub trait GrabOps {
    fn grab_key(&mut self, win: StackWindow, sym: Sym, mods: ModMask);
    fn grab_button(&mut self, win: StackWindow, button: u8, mods: ModMask);
    fn ungrab_window(&mut self, win: StackWindow);
}

/// Resolves raw input events against a `BindingTree` into at most one
/// command per event, tracking multi-step chains, double clicks, and the
/// per-window grab set.
#[derive(Debug)]
pub struct Dispatcher {
    config: DispatchConfig,
    keymode: String,
    chain: ChainState,
    last_button: Option<(u8, Instant)>,
    registered: BTreeMap<StackWindow, ContextMask>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            keymode: "default".to_string(),
            chain: ChainState::Idle,
            last_button: None,
            registered: BTreeMap::new(),
        }
    }

    pub fn keymode(&self) -> &str {
        &self.keymode
    }

    /// Switch the active keymode. Any open chain is abandoned.
    pub fn set_keymode(&mut self, name: &str) {
        self.keymode = name.to_string();
        self.chain = ChainState::Idle;
    }

    /// True while a chain is open and not yet expired.
    pub fn in_keychain(&self) -> bool {
        self.in_keychain_at(Instant::now())
    }

    pub fn in_keychain_at(&self, now: Instant) -> bool {
        match &self.chain {
            ChainState::Idle => false,
            ChainState::InChain { entered_at, .. } => {
                now.duration_since(*entered_at) <= self.config.chain_timeout
            }
        }
    }

    /// Resolve one event. Returns true if the event was consumed, either
    /// by running a command or by advancing a chain. `now` is the event
    /// timestamp, as the server reported it.
    pub fn dispatch(&mut self, tree: &BindingTree, event: InputEvent, now: Instant) -> bool {
        if !self.in_keychain_at(now) {
            self.chain = ChainState::Idle;
        }

        let double = self.note_press(&event, now);
        let root_name = match &self.chain {
            ChainState::InChain { keymode, .. } => keymode.clone(),
            ChainState::Idle => self.keymode.clone(),
        };
        let Some(root) = tree
            .keymode(&root_name)
            .or_else(|| tree.keymode("default"))
        else {
            return false;
        };
        let Some(node) = self.search_node(root) else {
            // Stale chain path after a wholesale reload.
            self.chain = ChainState::Idle;
            return false;
        };

        let hit = lookup(node, &event, double);
        match hit {
            Some(idx) => {
                let child = &node.children[idx];
                if !child.children.is_empty() {
                    let mut path = match std::mem::replace(&mut self.chain, ChainState::Idle) {
                        ChainState::InChain { path, .. } => path,
                        ChainState::Idle => Vec::new(),
                    };
                    path.push(idx);
                    self.chain = ChainState::InChain {
                        keymode: root_name,
                        path,
                        entered_at: now,
                    };
                    return true;
                }
                if let Some(cmd) = &child.command {
                    cmd.run();
                }
                self.chain = ChainState::Idle;
                true
            }
            None => {
                // An ordinary key-press that matches nothing lets the user
                // escape an open chain. Button events never abort one.
                if matches!(self.chain, ChainState::InChain { .. })
                    && matches!(event, InputEvent::KeyPress { keysym, .. } if !is_modifier_keysym(keysym))
                {
                    self.chain = ChainState::Idle;
                }
                false
            }
        }
    }

    /// Track press times for double-click detection and report whether
    /// this press is the second of a pair.
    fn note_press(&mut self, event: &InputEvent, now: Instant) -> bool {
        let InputEvent::ButtonPress { button, .. } = *event else {
            return false;
        };
        let double = matches!(
            self.last_button,
            Some((last, at)) if last == button && now.duration_since(at) <= self.config.double_click
        );
        // A completed double click should not chain into a triple.
        self.last_button = if double { None } else { Some((button, now)) };
        double
    }

    fn search_node<'t>(&self, root: &'t BindingNode) -> Option<&'t BindingNode> {
        let mut node = root;
        if let ChainState::InChain { path, .. } = &self.chain {
            for &idx in path {
                node = node.children.get(idx)?;
            }
        }
        Some(node)
    }

    /// Record the contexts a window accepts and issue its grabs. Must be
    /// called before any binding can fire on the window.
    pub fn register_window(
        &mut self,
        win: StackWindow,
        contexts: ContextMask,
        tree: &BindingTree,
        grabs: &mut dyn GrabOps,
    ) {
        self.registered.insert(win, contexts);
        self.grab_window(win, contexts, tree, grabs);
    }

    pub fn unregister_window(&mut self, win: StackWindow, grabs: &mut dyn GrabOps) {
        if self.registered.remove(&win).is_some() {
            grabs.ungrab_window(win);
        }
    }

    /// Re-issue every grab, e.g. after the tree was rebuilt on reload.
    pub fn regrab_all(&self, tree: &BindingTree, grabs: &mut dyn GrabOps) {
        for (&win, &contexts) in &self.registered {
            grabs.ungrab_window(win);
            self.grab_window(win, contexts, tree, grabs);
        }
    }

    fn grab_window(
        &self,
        win: StackWindow,
        contexts: ContextMask,
        tree: &BindingTree,
        grabs: &mut dyn GrabOps,
    ) {
        for name in tree.keymode_names() {
            let Some(root) = tree.keymode(name) else {
                continue;
            };
            for node in &root.children {
                match node.sym {
                    // Only GLOBAL key bindings are grabbed: they must work
                    // no matter where the focus is.
                    Sym::Keysym(_) | Sym::Keycode(_) => {
                        if node.context == ContextMask::GLOBAL {
                            grabs.grab_key(win, node.sym, node.mods);
                        }
                    }
                    // Button grabs are scoped to the contexts the window
                    // accepts. The desktop gets events anyway and needs no
                    // explicit grab.
                    Sym::Button(button) => {
                        let scope = if node.context == ContextMask::GLOBAL {
                            contexts
                        } else {
                            node.context & contexts
                        };
                        if !(scope & !ContextMask::DESKTOP).is_empty() {
                            grabs.grab_button(win, button, node.mods);
                        }
                    }
                }
            }
        }
    }
}

/// Double bindings are tried first; a press with no double binding falls
/// back to the single-click variant.
fn lookup(node: &BindingNode, event: &InputEvent, double: bool) -> Option<usize> {
    let mut query = query_for(event, double);
    match event {
        InputEvent::KeyPress { keycode, .. } => node.find_child(&query).or_else(|| {
            query.sym = Sym::Keycode(*keycode);
            node.find_child(&query)
        }),
        InputEvent::ButtonPress { .. } | InputEvent::ButtonRelease { .. } => {
            let first = node.find_child(&query);
            if first.is_none() && double {
                query.double = false;
                return node.find_child(&query);
            }
            first
        }
    }
}

fn query_for(event: &InputEvent, double: bool) -> BindingQuery {
    match *event {
        InputEvent::KeyPress {
            keysym,
            mods,
            context,
            ..
        } => BindingQuery {
            kind: EventKind::KeyPress,
            mods: ModMask::isolate(mods.bits()),
            sym: Sym::Keysym(keysym),
            context,
            double: false,
        },
        InputEvent::ButtonPress {
            button,
            mods,
            context,
        } => BindingQuery {
            kind: EventKind::ButtonPress,
            mods: ModMask::isolate(mods.bits()),
            sym: Sym::Button(button),
            context,
            double,
        },
        InputEvent::ButtonRelease {
            button,
            mods,
            context,
        } => BindingQuery {
            kind: EventKind::ButtonRelease,
            mods: ModMask::isolate(mods.bits()),
            sym: Sym::Button(button),
            context,
            double: false,
        },
    }
}

/// Shift_L through Hyper_R in keysymdef.h.
pub fn is_modifier_keysym(keysym: u32) -> bool {
    (0xffe1..=0xffee).contains(&keysym)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::parse::parse_str;
    use crate::commands::CommandRegistry;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_registry() -> (CommandRegistry, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut reg = CommandRegistry::new();
        for name in ["exit", "shade", "raise", "nextwindow", "showdesktop"] {
            let log = log.clone();
            reg.register(name, move |_args| {
                let log = log.clone();
                let name = name.to_string();
                Some(Box::new(move || log.borrow_mut().push(name.clone())))
            });
        }
        (reg, log)
    }

    fn key(keysym: u32, mods: ModMask) -> InputEvent {
        InputEvent::KeyPress {
            keysym,
            keycode: 0,
            mods,
            context: ContextMask::GLOBAL,
        }
    }

    fn press(button: u8, context: ContextMask) -> InputEvent {
        InputEvent::ButtonPress {
            button,
            mods: ModMask::empty(),
            context,
        }
    }

    #[test]
    fn simple_binding_runs_command() {
        let (reg, log) = recording_registry();
        let (tree, _) = parse_str("mod1 Tab :NextWindow\n", &reg);
        let mut d = Dispatcher::default();
        assert!(d.dispatch(&tree, key(0xff09, ModMask::MOD1), Instant::now()));
        assert_eq!(log.borrow().as_slice(), ["nextwindow"]);
    }

    #[test]
    fn chain_runs_only_on_final_link() {
        let (reg, log) = recording_registry();
        let (tree, _) = parse_str("control x l :Exit\n", &reg);
        let mut d = Dispatcher::default();
        let t0 = Instant::now();
        assert!(d.dispatch(&tree, key('x' as u32, ModMask::CONTROL), t0));
        assert!(d.in_keychain_at(t0));
        assert!(log.borrow().is_empty());
        assert!(d.dispatch(&tree, key('l' as u32, ModMask::empty()), t0));
        assert!(!d.in_keychain_at(t0));
        assert_eq!(log.borrow().as_slice(), ["exit"]);
    }

    #[test]
    fn unmatched_key_aborts_chain_but_modifier_does_not() {
        let (reg, _log) = recording_registry();
        let (tree, _) = parse_str("control x l :Exit\n", &reg);
        let mut d = Dispatcher::default();
        let t0 = Instant::now();
        d.dispatch(&tree, key('x' as u32, ModMask::CONTROL), t0);
        // a bare Shift_L press keeps the chain open
        assert!(!d.dispatch(&tree, key(0xffe1, ModMask::SHIFT), t0));
        assert!(d.in_keychain_at(t0));
        // an ordinary unmatched key aborts it
        assert!(!d.dispatch(&tree, key('z' as u32, ModMask::empty()), t0));
        assert!(!d.in_keychain_at(t0));
    }

    #[test]
    fn unmatched_button_does_not_abort_chain() {
        let (reg, _log) = recording_registry();
        let (tree, _) = parse_str("control x l :Exit\n", &reg);
        let mut d = Dispatcher::default();
        let t0 = Instant::now();
        d.dispatch(&tree, key('x' as u32, ModMask::CONTROL), t0);
        assert!(!d.dispatch(&tree, press(1, ContextMask::WINDOW), t0));
        assert!(d.in_keychain_at(t0));
    }

    #[test]
    fn chain_expires_after_timeout() {
        let (reg, log) = recording_registry();
        let (tree, _) = parse_str("control x l :Exit\nl :Raise\n", &reg);
        let mut d = Dispatcher::default();
        let t0 = Instant::now();
        d.dispatch(&tree, key('x' as u32, ModMask::CONTROL), t0);
        let late = t0 + Duration::from_millis(5001);
        assert!(!d.in_keychain_at(late));
        // the next key is evaluated against the root again
        assert!(d.dispatch(&tree, key('l' as u32, ModMask::empty()), late));
        assert_eq!(log.borrow().as_slice(), ["raise"]);
    }

    #[test]
    fn double_click_prefers_double_binding() {
        let (reg, log) = recording_registry();
        let (tree, _) =
            parse_str("OnWindow Mouse1 :Raise\nOnWindow double Mouse1 :Shade\n", &reg);
        let mut d = Dispatcher::default();
        let t0 = Instant::now();
        assert!(d.dispatch(&tree, press(1, ContextMask::WINDOW), t0));
        assert!(d.dispatch(
            &tree,
            press(1, ContextMask::WINDOW),
            t0 + Duration::from_millis(100)
        ));
        assert_eq!(log.borrow().as_slice(), ["raise", "shade"]);
    }

    #[test]
    fn double_click_falls_back_to_single_binding() {
        let (reg, log) = recording_registry();
        let (tree, _) = parse_str("OnWindow Mouse1 :Raise\n", &reg);
        let mut d = Dispatcher::default();
        let t0 = Instant::now();
        d.dispatch(&tree, press(1, ContextMask::WINDOW), t0);
        d.dispatch(
            &tree,
            press(1, ContextMask::WINDOW),
            t0 + Duration::from_millis(100),
        );
        assert_eq!(log.borrow().as_slice(), ["raise", "raise"]);
    }

    #[test]
    fn slow_second_click_is_not_a_double() {
        let (reg, log) = recording_registry();
        let (tree, _) =
            parse_str("OnWindow Mouse1 :Raise\nOnWindow double Mouse1 :Shade\n", &reg);
        let mut d = Dispatcher::default();
        let t0 = Instant::now();
        d.dispatch(&tree, press(1, ContextMask::WINDOW), t0);
        d.dispatch(
            &tree,
            press(1, ContextMask::WINDOW),
            t0 + Duration::from_millis(800),
        );
        assert_eq!(log.borrow().as_slice(), ["raise", "raise"]);
    }

    #[test]
    fn keymode_switch_changes_root() {
        let (reg, log) = recording_registry();
        let (tree, _) = parse_str("resize:\nLeft :Raise\ndefault:\nLeft :Exit\n", &reg);
        let mut d = Dispatcher::default();
        let t0 = Instant::now();
        d.dispatch(&tree, key(0xff51, ModMask::empty()), t0);
        d.set_keymode("resize");
        d.dispatch(&tree, key(0xff51, ModMask::empty()), t0);
        assert_eq!(log.borrow().as_slice(), ["exit", "raise"]);
    }

    #[test]
    fn raw_keycode_binding_matches_hardware_code() {
        let (reg, log) = recording_registry();
        let (tree, _) = parse_str("+64 :Raise\n", &reg);
        let mut d = Dispatcher::default();
        let ev = InputEvent::KeyPress {
            keysym: 0,
            keycode: 64,
            mods: ModMask::empty(),
            context: ContextMask::GLOBAL,
        };
        assert!(d.dispatch(&tree, ev, Instant::now()));
        assert_eq!(log.borrow().as_slice(), ["raise"]);
    }

    #[derive(Default)]
    struct FakeGrabs {
        keys: Vec<(StackWindow, Sym, ModMask)>,
        buttons: Vec<(StackWindow, u8, ModMask)>,
        ungrabs: Vec<StackWindow>,
    }

    impl GrabOps for FakeGrabs {
        fn grab_key(&mut self, win: StackWindow, sym: Sym, mods: ModMask) {
            self.keys.push((win, sym, mods));
        }

        fn grab_button(&mut self, win: StackWindow, button: u8, mods: ModMask) {
            self.buttons.push((win, button, mods));
        }

        fn ungrab_window(&mut self, win: StackWindow) {
            self.ungrabs.push(win);
        }
    }

    #[test]
    fn grabs_follow_context_registration() {
        let (reg, _log) = recording_registry();
        let (tree, _) = parse_str(
            "mod1 Tab :Raise\nOnTitlebar Mouse1 :Raise\nOnDesktop Mouse3 :Raise\n",
            &reg,
        );
        let mut d = Dispatcher::default();
        let mut grabs = FakeGrabs::default();
        let frame = StackWindow(7);
        let root = StackWindow(1);

        d.register_window(
            frame,
            ContextMask::TITLEBAR | ContextMask::WINDOW,
            &tree,
            &mut grabs,
        );
        // the desktop-only binding must not grab on a frame window
        assert_eq!(grabs.buttons.len(), 1);
        assert_eq!(grabs.buttons[0], (frame, 1, ModMask::empty()));
        // the global key binding grabs everywhere
        assert_eq!(grabs.keys.len(), 1);

        d.register_window(root, ContextMask::DESKTOP, &tree, &mut grabs);
        // desktop context needs no explicit button grab
        assert_eq!(grabs.buttons.len(), 1);

        d.unregister_window(frame, &mut grabs);
        assert_eq!(grabs.ungrabs, vec![frame]);
    }
}
