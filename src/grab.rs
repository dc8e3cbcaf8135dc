//! Keyboard grabs.
//!
//! A keyboard normally delivers every event to its focused client. A grab
//! takes over that routing until it releases itself. Two kinds exist:
//!
//! - [`BindingGrab`], installed after a key binding fires. It hides the
//!   rest of that key's press/release cycle from the client and passes
//!   everything else through.
//! - Any [`KeyboardGrab`] a binding handler installs for its own purposes.

use crate::seat::{Focus, KeyState, ModifierEvent, SerialCounter};

/// What a grab wants after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabStatus {
    /// Keep routing events through this grab.
    Continue,
    /// Hand the keyboard back to its default routing.
    Release,
}

/// Routing installed on a keyboard by a binding handler.
pub trait KeyboardGrab {
    fn key(
        &mut self,
        focus: &mut Focus,
        serials: &SerialCounter,
        time: u32,
        key: u32,
        state: KeyState,
    ) -> GrabStatus;

    fn modifiers(&mut self, focus: &mut Focus, event: &ModifierEvent) -> GrabStatus;
}

/// Who currently routes a keyboard's events.
#[derive(Default)]
pub enum Grab {
    /// Deliver to the focused client.
    #[default]
    Default,
    /// Swallow the release of a key that triggered a binding.
    Binding(BindingGrab),
    /// Installed by a binding handler.
    Custom(Box<dyn KeyboardGrab>),
}

impl Grab {
    pub fn is_default(&self) -> bool {
        matches!(self, Grab::Default)
    }
}

impl std::fmt::Debug for Grab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grab::Default => f.write_str("Default"),
            Grab::Binding(grab) => f.debug_tuple("Binding").field(grab).finish(),
            Grab::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Watches one key and consumes its release.
///
/// While installed, events for other keys are forwarded to focus exactly as
/// the default routing would. Repeated presses of the watched key are
/// dropped. Its release is dropped too, and ends the grab.
///
/// Nothing times this out: if the key never comes back up the keyboard stays
/// grabbed until someone calls
/// [`Keyboard::end_grab`](crate::seat::Keyboard::end_grab).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingGrab {
    key: u32,
}

impl BindingGrab {
    pub fn new(key: u32) -> Self {
        Self { key }
    }

    pub fn key(&self) -> u32 {
        self.key
    }

    pub fn handle_key(
        &self,
        focus: &mut Focus,
        serials: &SerialCounter,
        time: u32,
        key: u32,
        state: KeyState,
    ) -> GrabStatus {
        if key != self.key {
            focus.send_key(serials, time, key, state);
            return GrabStatus::Continue;
        }

        match state {
            KeyState::Released => {
                log::debug!("Swallowed release of bound key {}", key);
                GrabStatus::Release
            }
            KeyState::Pressed => GrabStatus::Continue,
        }
    }

    /// Modifier changes always reach the client.
    pub fn handle_modifiers(&self, focus: &mut Focus, event: &ModifierEvent) -> GrabStatus {
        focus.send_modifiers(event);
        GrabStatus::Continue
    }
}
