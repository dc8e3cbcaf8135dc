//! Global shortcuts.
//!
//! A binding matches an exact `(key, button, axis, modifiers)` tuple. Fields
//! that do not apply to a trigger are stored as `0`, so a key binding has
//! `button == 0 && axis == 0` and dispatch is a plain equality scan.
//!
//! Every matching binding fires, in registration order. After a key binding
//! fires, the seat's keyboard gets a [`BindingGrab`](crate::grab::BindingGrab)
//! unless the handler already grabbed it, so the focused client sees neither
//! half of the shortcut's key press.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::seat::{Modifiers, Seat};
use crate::{Error, Result};

/// Handle to a registered binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

impl BindingId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        BindingId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// The input event that triggered a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingEvent {
    pub time: u32,
    pub key: u32,
    pub button: u32,
    pub axis: u32,
    /// Key/button state or axis magnitude; never zero when handlers run
    pub value: i32,
}

pub type BindingHandler = Box<dyn FnMut(&mut Seat, &BindingEvent)>;

struct Binding {
    id: BindingId,
    key: u32,
    button: u32,
    axis: u32,
    modifier: Modifiers,
    handler: BindingHandler,
}

impl Binding {
    fn matches(&self, key: u32, button: u32, axis: u32, modifier: Modifiers) -> bool {
        self.key == key && self.button == button && self.axis == axis && self.modifier == modifier
    }
}

/// Bindings in registration order.
#[derive(Default)]
pub struct BindingList {
    bindings: Vec<Binding>,
}

impl BindingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding on a raw trigger tuple.
    ///
    /// Pass `0` for every field the trigger does not use.
    pub fn add<F>(&mut self, key: u32, button: u32, axis: u32, modifier: Modifiers, handler: F) -> BindingId
    where
        F: FnMut(&mut Seat, &BindingEvent) + 'static,
    {
        let id = BindingId::next();
        self.bindings.push(Binding {
            id,
            key,
            button,
            axis,
            modifier,
            handler: Box::new(handler),
        });
        id
    }

    pub fn add_key_binding<F>(&mut self, key: u32, modifier: Modifiers, handler: F) -> BindingId
    where
        F: FnMut(&mut Seat, &BindingEvent) + 'static,
    {
        self.add(key, 0, 0, modifier, handler)
    }

    pub fn add_button_binding<F>(&mut self, button: u32, modifier: Modifiers, handler: F) -> BindingId
    where
        F: FnMut(&mut Seat, &BindingEvent) + 'static,
    {
        self.add(0, button, 0, modifier, handler)
    }

    pub fn add_axis_binding<F>(&mut self, axis: u32, modifier: Modifiers, handler: F) -> BindingId
    where
        F: FnMut(&mut Seat, &BindingEvent) + 'static,
    {
        self.add(0, 0, axis, modifier, handler)
    }

    /// Unregister one binding.
    pub fn remove(&mut self, id: BindingId) -> Result<()> {
        let index = self
            .bindings
            .iter()
            .position(|b| b.id == id)
            .ok_or(Error::UnknownBinding(id))?;
        self.bindings.remove(index);
        Ok(())
    }

    /// Unregister every binding.
    pub fn remove_all(&mut self) {
        self.bindings.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Fire every binding matching the event and the seat's modifiers.
    ///
    /// A zero `value` is a release (or an empty axis event) and never fires
    /// anything.
    pub fn run(&mut self, seat: &mut Seat, time: u32, key: u32, button: u32, axis: u32, value: i32) {
        if value == 0 {
            return;
        }

        let event = BindingEvent {
            time,
            key,
            button,
            axis,
            value,
        };

        for binding in self.bindings.iter_mut() {
            if !binding.matches(key, button, axis, seat.modifier_state()) {
                continue;
            }

            log::debug!(
                "Running binding {:?} (key {}, button {}, axis {}, modifiers {:?})",
                binding.id,
                key,
                button,
                axis,
                binding.modifier
            );
            (binding.handler)(seat, &event);

            // The handler may have grabbed the keyboard itself; if not, take
            // it so the key release never reaches the client.
            if binding.key != 0 && seat.keyboard.is_default_grab() {
                seat.keyboard.start_binding_grab(key);
            }
        }
    }
}
