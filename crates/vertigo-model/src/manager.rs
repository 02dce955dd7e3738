//! Per-field change tracking.

use vertigo_core::Value;

/// Tracks one field's live value against its last committed value.
///
/// `changed` compares the two structurally on every call, so mutating the
/// live value in place through [`ValueManager::get_mut`] is detected without
/// an explicit `set`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueManager {
    previous: Value,
    current: Value,
}

impl ValueManager {
    /// Start tracking a value; it counts as already committed.
    pub fn new(initial: Value) -> Self {
        Self {
            previous: initial.clone(),
            current: initial,
        }
    }

    pub fn get(&self) -> &Value {
        &self.current
    }

    pub fn get_mut(&mut self) -> &mut Value {
        &mut self.current
    }

    /// Replace the live value. The committed value is left alone.
    pub fn set(&mut self, value: Value) {
        self.current = value;
    }

    /// The last committed value.
    pub fn previous(&self) -> &Value {
        &self.previous
    }

    pub fn changed(&self) -> bool {
        self.current != self.previous
    }

    /// Record the live value as persisted. Takes a copy, so later in-place
    /// edits of the live value show up as changes again.
    pub fn commit(&mut self) {
        self.previous = self.current.clone();
    }

    /// Replace live and committed values together, as after a reload.
    pub fn reset(&mut self, value: Value) {
        self.previous = value.clone();
        self.current = value;
    }
}
