pub mod dispatch;
pub mod parse;

pub use dispatch::{DispatchConfig, Dispatcher, GrabOps, InputEvent};
pub use parse::{Diagnostic, KeysError, default_tree, load_file, load_or_default, parse_str};

use std::collections::HashMap;

use bitflags::bitflags;

use crate::commands::Command;

bitflags! {
    /// UI zone an input event originated in.
    ///
    /// The empty mask is GLOBAL: a global binding matches any query and a
    /// global query matches any binding.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContextMask: u32 {
        const DESKTOP = 1 << 0;
        const TITLEBAR = 1 << 1;
        const WINDOW = 1 << 2;
        const WINBUTTON = 1 << 3;
        const MINBUTTON = 1 << 4;
        const MAXBUTTON = 1 << 5;
        const WINDOW_BORDER = 1 << 6;
        const LEFT_GRIP = 1 << 7;
        const RIGHT_GRIP = 1 << 8;
        const TAB = 1 << 9;
    }
}

impl ContextMask {
    pub const GLOBAL: ContextMask = ContextMask::empty();

    /// GLOBAL on either side matches everything; otherwise the masks must
    /// intersect.
    pub fn accepts(self, query: ContextMask) -> bool {
        self.is_empty() || query.is_empty() || self.intersects(query)
    }
}

bitflags! {
    /// The 8 real X modifier bits, numerically identical to
    /// `ShiftMask`..`Mod5Mask` from the core protocol.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModMask: u16 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        const MOD2 = 1 << 4;
        const MOD3 = 1 << 5;
        const MOD4 = 1 << 6;
        const MOD5 = 1 << 7;
    }
}

impl ModMask {
    /// Strip button-state and vendor bits down to the 8 real modifiers.
    pub fn isolate(raw: u16) -> ModMask {
        ModMask::from_bits_truncate(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyPress,
    ButtonPress,
    ButtonRelease,
}

/// What a binding is keyed on. Keysym bindings match the resolved symbol
/// of a key event; raw keycode bindings match the hardware code, for keys
/// that have no symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sym {
    Keysym(u32),
    Keycode(u8),
    Button(u8),
}

/// A fully-resolved lookup request against one node's children.
#[derive(Debug, Clone, Copy)]
pub struct BindingQuery {
    pub kind: EventKind,
    pub mods: ModMask,
    pub sym: Sym,
    pub context: ContextMask,
    pub double: bool,
}

/// One node of the binding forest. Identity is the full tuple
/// `(kind, mods, sym, context, double)`; a node owns either a command, a
/// list of chain children, or neither.
pub struct BindingNode {
    pub kind: EventKind,
    pub mods: ModMask,
    pub sym: Sym,
    pub context: ContextMask,
    pub double: bool,
    pub command: Option<Box<dyn Command>>,
    pub children: Vec<BindingNode>,
}

impl std::fmt::Debug for BindingNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingNode")
            .field("kind", &self.kind)
            .field("mods", &self.mods)
            .field("sym", &self.sym)
            .field("context", &self.context)
            .field("double", &self.double)
            .field("command", &self.command.is_some())
            .field("children", &self.children)
            .finish()
    }
}

impl BindingNode {
    pub fn new(kind: EventKind, mods: ModMask, sym: Sym, context: ContextMask, double: bool) -> Self {
        Self {
            kind,
            mods,
            sym,
            context,
            double,
            command: None,
            children: Vec::new(),
        }
    }

    /// An empty container used as a keymode root: never matched itself,
    /// only its children are searched.
    pub(crate) fn root() -> Self {
        Self::new(
            EventKind::KeyPress,
            ModMask::empty(),
            Sym::Keysym(0),
            ContextMask::GLOBAL,
            false,
        )
    }

    pub fn matches(&self, q: &BindingQuery) -> bool {
        self.kind == q.kind
            && self.sym == q.sym
            && self.double == q.double
            && self.mods == q.mods
            && self.context.accepts(q.context)
    }

    /// Linear scan of the children, first match wins.
    pub fn find_child(&self, q: &BindingQuery) -> Option<usize> {
        self.children.iter().position(|c| c.matches(q))
    }

    /// Find-or-append a child with `proto`'s identity, returning its index.
    pub(crate) fn merge_child(&mut self, proto: BindingNode) -> usize {
        let pos = self.children.iter().position(|c| {
            c.kind == proto.kind
                && c.mods == proto.mods
                && c.sym == proto.sym
                && c.context == proto.context
                && c.double == proto.double
        });
        match pos {
            Some(i) => i,
            None => {
                self.children.push(proto);
                self.children.len() - 1
            }
        }
    }
}

/// The whole binding configuration: one root node per named keymode.
///
/// Rebuilt wholesale on reconfigure; `"default"` always exists.
#[derive(Debug)]
pub struct BindingTree {
    keymodes: HashMap<String, BindingNode>,
}

impl Default for BindingTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingTree {
    pub fn new() -> Self {
        let mut keymodes = HashMap::new();
        keymodes.insert("default".to_string(), BindingNode::root());
        Self { keymodes }
    }

    pub fn keymode(&self, name: &str) -> Option<&BindingNode> {
        self.keymodes.get(name)
    }

    pub fn keymode_mut(&mut self, name: &str) -> &mut BindingNode {
        self.keymodes
            .entry(name.to_string())
            .or_insert_with(BindingNode::root)
    }

    pub fn keymode_names(&self) -> impl Iterator<Item = &str> {
        self.keymodes.keys().map(String::as_str)
    }

    /// Total binding count across all keymodes (chain links included).
    pub fn len(&self) -> usize {
        fn count(node: &BindingNode) -> usize {
            node.children.len() + node.children.iter().map(count).sum::<usize>()
        }
        self.keymodes.values().map(count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
