use std::collections::HashMap;

/// A zero-argument action bound to a key or button.
///
/// Commands capture everything they need at construction time, so running
/// one takes no parameters; the dispatcher neither knows nor cares what a
/// command does.
pub trait Command {
    fn run(&self);
}

impl<F: Fn()> Command for F {
    fn run(&self) {
        self()
    }
}

/// Turns the `Command args` text of a binding line into a runnable
/// command. Returns `None` for unknown commands; the parser reports and
/// skips the line.
pub trait CommandFactory {
    fn parse(&self, text: &str) -> Option<Box<dyn Command>>;
}

type Builder = Box<dyn Fn(&str) -> Option<Box<dyn Command>>>;

/// Name-indexed command factory. The first whitespace-separated word of
/// the command text selects the builder (case-insensitive); the rest is
/// passed through as the argument string.
#[derive(Default)]
pub struct CommandRegistry {
    builders: HashMap<String, Builder>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, builder: F)
    where
        F: Fn(&str) -> Option<Box<dyn Command>> + 'static,
    {
        self.builders.insert(name.to_lowercase(), Box::new(builder));
    }

    /// A registry that resolves every known command name to a command
    /// that just logs its invocation. Used by the binary's lint mode and
    /// anywhere a real window manager backend is not wired up yet.
    pub fn logging() -> Self {
        let mut reg = Self::new();
        for &name in KNOWN_COMMANDS {
            reg.register(name, move |args| {
                let label = if args.is_empty() {
                    name.to_string()
                } else {
                    format!("{name} {args}")
                };
                Some(Box::new(move || tracing::info!(command = %label, "run")))
            });
        }
        reg
    }
}

impl CommandFactory for CommandRegistry {
    fn parse(&self, text: &str) -> Option<Box<dyn Command>> {
        let text = text.trim();
        let (name, args) = match text.split_once(char::is_whitespace) {
            Some((n, a)) => (n, a.trim()),
            None => (text, ""),
        };
        if name.is_empty() {
            return None;
        }
        self.builders.get(&name.to_lowercase())?(args)
    }
}

/// Command names every backend is expected to provide. The hardcoded
/// fallback bindings only use names from this list.
pub const KNOWN_COMMANDS: &[&str] = &[
    "Close",
    "Exec",
    "Exit",
    "Focus",
    "Fullscreen",
    "Iconify",
    "KeyMode",
    "Lower",
    "Maximize",
    "MaximizeHorizontal",
    "MaximizeVertical",
    "NextWindow",
    "PrevWindow",
    "Raise",
    "RaiseFocus",
    "Reconfigure",
    "Restart",
    "RootMenu",
    "Shade",
    "StartMoving",
    "StartResizing",
    "Stick",
    "WindowMenu",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn registry_dispatches_by_first_word() {
        let hits = Rc::new(Cell::new(0u32));
        let mut reg = CommandRegistry::new();
        {
            let hits = hits.clone();
            reg.register("raise", move |args| {
                assert_eq!(args, "");
                let hits = hits.clone();
                Some(Box::new(move || hits.set(hits.get() + 1)))
            });
        }
        let cmd = reg.parse("Raise").expect("known command");
        cmd.run();
        cmd.run();
        assert_eq!(hits.get(), 2);
        assert!(reg.parse("NoSuchCommand foo").is_none());
    }

    #[test]
    fn args_are_passed_through() {
        let mut reg = CommandRegistry::new();
        reg.register("exec", |args| {
            let args = args.to_string();
            Some(Box::new(move || {
                let _ = &args;
            }))
        });
        assert!(reg.parse("Exec xterm -rv").is_some());
    }

    #[test]
    fn logging_registry_knows_every_default_name() {
        let reg = CommandRegistry::logging();
        for name in KNOWN_COMMANDS {
            assert!(reg.parse(name).is_some(), "missing builder for {name}");
        }
    }
}
