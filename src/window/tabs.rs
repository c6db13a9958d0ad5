//! Tab-group membership: several clients sharing one frame.
//!
//! The group is a plain ordered list, independent of stacking and focus.
//! Attach, detach and reorder are list splices; the drop position of a
//! dragged tab is decided against the midpoints of the existing tab
//! buttons.

use super::WinRect;

/// Non-owning client identity. The machine owns the group; clients only
/// hold their handle back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientHandle(pub u32);

#[derive(Debug, Clone, Default)]
pub struct TabGroup {
    clients: Vec<ClientHandle>,
}

impl TabGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clients(&self) -> &[ClientHandle] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn contains(&self, client: ClientHandle) -> bool {
        self.clients.contains(&client)
    }

    pub fn position(&self, client: ClientHandle) -> Option<usize> {
        self.clients.iter().position(|&c| c == client)
    }

    /// Insert at `index` (clamped). Re-attaching an existing member moves
    /// it instead of duplicating it.
    pub fn attach_at(&mut self, client: ClientHandle, index: usize) {
        self.detach(client);
        let index = index.min(self.clients.len());
        self.clients.insert(index, client);
    }

    pub fn attach(&mut self, client: ClientHandle) {
        self.attach_at(client, self.clients.len());
    }

    /// Remove a client; true if it was a member. An empty group means the
    /// owning machine should retire.
    pub fn detach(&mut self, client: ClientHandle) -> bool {
        match self.position(client) {
            Some(pos) => {
                self.clients.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn move_left(&mut self, client: ClientHandle) -> bool {
        match self.position(client) {
            Some(pos) if pos > 0 => {
                self.clients.swap(pos, pos - 1);
                true
            }
            _ => false,
        }
    }

    pub fn move_right(&mut self, client: ClientHandle) -> bool {
        match self.position(client) {
            Some(pos) if pos + 1 < self.clients.len() => {
                self.clients.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }
}

/// Insertion index for a tab dropped at `drop_x`, given the tab-button
/// boxes in list order: landing on the left half of a button inserts
/// before it, on the right half after it.
pub fn drop_index(drop_x: i32, buttons: &[WinRect]) -> usize {
    for (i, button) in buttons.iter().enumerate() {
        let mid = button.left() + button.width as i32 / 2;
        if drop_x < mid {
            return i;
        }
        if drop_x < button.right() {
            return i + 1;
        }
    }
    buttons.len()
}
