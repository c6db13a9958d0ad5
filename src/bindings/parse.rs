use std::io;
use std::path::{Path, PathBuf};

use indoc::indoc;
use thiserror::Error;

use super::{BindingNode, BindingTree, ContextMask, EventKind, ModMask, Sym};
use crate::commands::CommandFactory;

/// Minimal fallback bindings, loaded whenever the keys file yields zero
/// bindings. Keeps the window manager usable no matter how broken the
/// configuration is: menus, click-to-focus, moving, cycling, exit.
pub const DEFAULT_KEYS: &str = indoc! {r#"
    ! fallback bindings
    default:
    OnDesktop Mouse3 :RootMenu
    OnTitlebar Mouse1 :RaiseFocus
    OnTitlebar double Mouse1 :Shade
    OnTitlebar Mouse3 :WindowMenu
    mod1 OnWindow Mouse1 :StartMoving
    mod1 OnWindow Mouse3 :StartResizing
    mod1 Tab :NextWindow
    mod1 shift Tab :PrevWindow
    control mod1 Delete :Exit
    control mod1 r :Restart
"#};

#[derive(Debug, Error)]
pub enum KeysError {
    #[error("cannot read keys file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A reported-but-recovered parse problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

pub fn load_file(
    path: &Path,
    factory: &dyn CommandFactory,
) -> Result<(BindingTree, Vec<Diagnostic>), KeysError> {
    let text = std::fs::read_to_string(path).map_err(|source| KeysError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_str(&text, factory))
}

/// Load the keys file, falling back to the hardcoded defaults when the
/// file is missing, unreadable, or yields zero bindings. Never fails.
pub fn load_or_default(
    path: Option<&Path>,
    factory: &dyn CommandFactory,
) -> (BindingTree, Vec<Diagnostic>) {
    if let Some(path) = path {
        match load_file(path, factory) {
            Ok((tree, diags)) => {
                if !tree.is_empty() {
                    return (tree, diags);
                }
                tracing::warn!(?path, "keys file yielded no bindings, using defaults");
                for d in &diags {
                    tracing::warn!(%d, "keys file");
                }
            }
            Err(err) => {
                tracing::warn!(%err, "using default bindings");
            }
        }
    }
    (default_tree(factory), Vec::new())
}

/// The hardcoded default set. `DEFAULT_KEYS` only uses command names the
/// factory is required to know, so this cannot come back empty.
pub fn default_tree(factory: &dyn CommandFactory) -> BindingTree {
    let (tree, diags) = parse_str(DEFAULT_KEYS, factory);
    debug_assert!(diags.is_empty(), "default keys must parse clean: {diags:?}");
    debug_assert!(!tree.is_empty());
    tree
}

/// Parse binding-file text. Malformed lines are reported with their line
/// number and skipped; parsing always continues.
pub fn parse_str(text: &str, factory: &dyn CommandFactory) -> (BindingTree, Vec<Diagnostic>) {
    let mut tree = BindingTree::new();
    let mut diags = Vec::new();
    let mut mode = String::from("default");

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        if let Some(name) = keymode_header(line) {
            mode = name.to_string();
            tree.keymode_mut(&mode);
            continue;
        }
        if let Err(message) = parse_binding_line(line, &mut tree, &mode, factory) {
            let d = Diagnostic {
                line: lineno,
                message,
            };
            tracing::warn!(%d, "skipping binding line");
            diags.push(d);
        }
    }
    (tree, diags)
}

/// A bare token ending in `:` selects (and creates) a keymode.
fn keymode_header(line: &str) -> Option<&str> {
    if line.contains(char::is_whitespace) {
        return None;
    }
    let name = line.strip_suffix(':')?;
    (!name.is_empty()).then_some(name)
}

struct LinkSpec {
    kind: EventKind,
    mods: ModMask,
    sym: Sym,
    context: ContextMask,
    double: bool,
}

fn parse_binding_line(
    line: &str,
    tree: &mut BindingTree,
    mode: &str,
    factory: &dyn CommandFactory,
) -> Result<(), String> {
    let mut rest = line;
    let mut links: Vec<LinkSpec> = Vec::new();
    let mut mods = ModMask::empty();
    let mut context = ContextMask::empty();
    let mut double = false;
    let mut command = None;

    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix(':') {
            command = Some(stripped.trim());
            break;
        }
        let (token, tail) = match rest.split_once(char::is_whitespace) {
            Some((t, rest)) => (t, rest.trim_start()),
            None => (rest, ""),
        };
        rest = tail;

        if let Some(m) = modifier_token(token) {
            mods |= m;
        } else if let Some(c) = context_token(token) {
            context |= c;
        } else if token.eq_ignore_ascii_case("double") {
            double = true;
        } else if let Some((kind, sym)) = key_spec(token)? {
            // Consecutive key-specs build a chain; each link carries the
            // modifier/context tokens seen since the previous one.
            links.push(LinkSpec {
                kind,
                mods: std::mem::take(&mut mods),
                sym,
                context: std::mem::take(&mut context),
                double: std::mem::replace(&mut double, false),
            });
        } else {
            return Err(format!("unrecognized token '{token}'"));
        }
    }

    if links.is_empty() {
        return Err("binding has no key or button".to_string());
    }
    let Some(text) = command else {
        return Err("binding has no command".to_string());
    };
    let Some(cmd) = factory.parse(text) else {
        return Err(format!("unknown command '{text}'"));
    };

    let mut node = tree.keymode_mut(mode);
    for link in links {
        let idx = node.merge_child(BindingNode::new(
            link.kind,
            link.mods,
            link.sym,
            link.context,
            link.double,
        ));
        node = &mut node.children[idx];
    }
    node.command = Some(cmd);
    Ok(())
}

fn modifier_token(token: &str) -> Option<ModMask> {
    Some(match token.to_ascii_lowercase().as_str() {
        "shift" => ModMask::SHIFT,
        "control" | "ctrl" => ModMask::CONTROL,
        "lock" => ModMask::LOCK,
        "alt" | "mod1" => ModMask::MOD1,
        "mod2" => ModMask::MOD2,
        "mod3" => ModMask::MOD3,
        "win" | "super" | "mod4" => ModMask::MOD4,
        "mod5" => ModMask::MOD5,
        "none" => ModMask::empty(),
        _ => return None,
    })
}

fn context_token(token: &str) -> Option<ContextMask> {
    Some(match token.to_ascii_lowercase().as_str() {
        "ondesktop" => ContextMask::DESKTOP,
        "ontitlebar" => ContextMask::TITLEBAR,
        "onwindow" => ContextMask::WINDOW,
        "onwinbutton" => ContextMask::WINBUTTON,
        "onminbutton" => ContextMask::MINBUTTON,
        "onmaxbutton" => ContextMask::MAXBUTTON,
        "onwindowborder" => ContextMask::WINDOW_BORDER,
        "onleftgrip" => ContextMask::LEFT_GRIP,
        "onrightgrip" => ContextMask::RIGHT_GRIP,
        "ontab" => ContextMask::TAB,
        _ => return None,
    })
}

/// `MouseN`, `ClickN`, a raw keycode (`64`, `+64`, `0x40`) or a keysym
/// name. `Ok(None)` is never returned for tokens this function claims;
/// an unknown keysym name is an error so the caller reports the line.
fn key_spec(token: &str) -> Result<Option<(EventKind, Sym)>, String> {
    let lower = token.to_ascii_lowercase();
    if let Some(n) = lower.strip_prefix("mouse") {
        let button = n
            .parse::<u8>()
            .map_err(|_| format!("bad button number in '{token}'"))?;
        return Ok(Some((EventKind::ButtonPress, Sym::Button(button))));
    }
    if let Some(n) = lower.strip_prefix("click") {
        let button = n
            .parse::<u8>()
            .map_err(|_| format!("bad button number in '{token}'"))?;
        return Ok(Some((EventKind::ButtonRelease, Sym::Button(button))));
    }
    let keycode = if let Some(hex) = lower.strip_prefix("0x") {
        u8::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = token.strip_prefix('+') {
        dec.parse::<u8>().ok()
    } else if token.chars().all(|c| c.is_ascii_digit()) {
        token.parse::<u8>().ok()
    } else {
        None
    };
    if let Some(code) = keycode {
        return Ok(Some((EventKind::KeyPress, Sym::Keycode(code))));
    }
    if lower.starts_with("0x") || token.starts_with('+') {
        return Err(format!("bad keycode '{token}'"));
    }
    match keysym_from_name(token) {
        Some(sym) => Ok(Some((EventKind::KeyPress, Sym::Keysym(sym)))),
        None => Err(format!("unknown key '{token}'")),
    }
}

/// Core-protocol keysym values for the names binding files actually use.
/// Single printable ASCII characters map to their codepoint, like the
/// Latin-1 block of keysymdef.h.
pub fn keysym_from_name(name: &str) -> Option<u32> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && c.is_ascii_graphic()
    {
        return Some(c.to_ascii_lowercase() as u32);
    }
    if let Some(n) = name.strip_prefix(['F', 'f'])
        && let Ok(n) = n.parse::<u32>()
        && (1..=35).contains(&n)
    {
        return Some(0xffbd + n);
    }
    Some(match name.to_ascii_lowercase().as_str() {
        "space" => 0x20,
        "backspace" => 0xff08,
        "tab" => 0xff09,
        "return" | "enter" => 0xff0d,
        "pause" => 0xff13,
        "escape" => 0xff1b,
        "home" => 0xff50,
        "left" => 0xff51,
        "up" => 0xff52,
        "right" => 0xff53,
        "down" => 0xff54,
        "prior" | "page_up" => 0xff55,
        "next" | "page_down" => 0xff56,
        "end" => 0xff57,
        "print" => 0xff61,
        "insert" => 0xff63,
        "menu" => 0xff67,
        "delete" => 0xffff,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::BindingQuery;
    use crate::commands::CommandRegistry;

    fn factory() -> CommandRegistry {
        CommandRegistry::logging()
    }

    fn key_query(sym: u32, mods: ModMask) -> BindingQuery {
        BindingQuery {
            kind: EventKind::KeyPress,
            mods,
            sym: Sym::Keysym(sym),
            context: ContextMask::GLOBAL,
            double: false,
        }
    }

    #[test]
    fn parses_simple_key_binding() {
        let (tree, diags) = parse_str("mod1 Tab :NextWindow\n", &factory());
        assert!(diags.is_empty());
        let root = tree.keymode("default").unwrap();
        let idx = root.find_child(&key_query(0xff09, ModMask::MOD1)).unwrap();
        assert!(root.children[idx].command.is_some());
        assert!(root.children[idx].children.is_empty());
    }

    #[test]
    fn consecutive_key_specs_build_a_chain() {
        let (tree, diags) = parse_str("control x l :Exit\n", &factory());
        assert!(diags.is_empty());
        let root = tree.keymode("default").unwrap();
        let first = &root.children[root
            .find_child(&key_query('x' as u32, ModMask::CONTROL))
            .unwrap()];
        assert!(first.command.is_none());
        // the second link resets the modifier accumulator
        let second = &first.children[first
            .find_child(&key_query('l' as u32, ModMask::empty()))
            .unwrap()];
        assert!(second.command.is_some());
    }

    #[test]
    fn keymode_header_switches_target_root() {
        let text = "resize:\nLeft :Exit\n";
        let (tree, diags) = parse_str(text, &factory());
        assert!(diags.is_empty());
        assert!(tree.keymode("resize").is_some());
        let root = tree.keymode("resize").unwrap();
        assert_eq!(root.children.len(), 1);
        assert!(tree.keymode("default").unwrap().children.is_empty());
    }

    #[test]
    fn malformed_lines_are_reported_and_skipped() {
        let text = "bogus line here\nmod1 Tab :NextWindow\nmod1 q :NoSuchCommand\n";
        let (tree, diags) = parse_str(text, &factory());
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].line, 1);
        assert_eq!(diags[1].line, 3);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn comments_and_blanks_are_ignored() {
        let text = "# comment\n! other comment\n\n   \n";
        let (tree, diags) = parse_str(text, &factory());
        assert!(diags.is_empty());
        assert!(tree.is_empty());
    }

    #[test]
    fn keycode_forms() {
        for text in ["64 :Exit\n", "+64 :Exit\n", "0x40 :Exit\n"] {
            let (tree, diags) = parse_str(text, &factory());
            assert!(diags.is_empty(), "{text}");
            let root = tree.keymode("default").unwrap();
            assert_eq!(root.children[0].sym, Sym::Keycode(64), "{text}");
        }
    }

    #[test]
    fn double_and_contexts_are_recognized() {
        let (tree, diags) = parse_str("OnTitlebar double Mouse1 :Shade\n", &factory());
        assert!(diags.is_empty());
        let node = &tree.keymode("default").unwrap().children[0];
        assert!(node.double);
        assert_eq!(node.context, ContextMask::TITLEBAR);
        assert_eq!(node.sym, Sym::Button(1));
        assert_eq!(node.kind, EventKind::ButtonPress);
    }

    #[test]
    fn default_keys_parse_clean() {
        let tree = default_tree(&factory());
        assert!(!tree.is_empty());
    }

    #[test]
    fn empty_input_falls_back_to_defaults() {
        let (tree, diags) = load_or_default(None, &factory());
        assert!(diags.is_empty());
        assert!(!tree.is_empty());
    }
}
