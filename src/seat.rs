//! Seats, keyboards and delivery to the focused client.

use std::cell::Cell;

use bitflags::bitflags;

use crate::grab::{BindingGrab, Grab, GrabStatus, KeyboardGrab};

bitflags! {
    /// Modifier keys held on a seat, as matched by bindings
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        const CTRL  = 1 << 0;
        const ALT   = 1 << 1;
        const SUPER = 1 << 2;
        const SHIFT = 1 << 3;
    }
}

/// Linux evdev key codes the seat tracks for its modifier state.
pub mod keycodes {
    pub const KEY_LEFTCTRL: u32 = 29;
    pub const KEY_LEFTSHIFT: u32 = 42;
    pub const KEY_RIGHTSHIFT: u32 = 54;
    pub const KEY_LEFTALT: u32 = 56;
    pub const KEY_RIGHTCTRL: u32 = 97;
    pub const KEY_RIGHTALT: u32 = 100;
    pub const KEY_LEFTMETA: u32 = 125;
    pub const KEY_RIGHTMETA: u32 = 126;
}

/// Map a key code to the modifier it toggles, if any.
pub fn modifier_for_key(key: u32) -> Option<Modifiers> {
    use self::keycodes::*;

    match key {
        KEY_LEFTCTRL | KEY_RIGHTCTRL => Some(Modifiers::CTRL),
        KEY_LEFTALT | KEY_RIGHTALT => Some(Modifiers::ALT),
        KEY_LEFTMETA | KEY_RIGHTMETA => Some(Modifiers::SUPER),
        KEY_LEFTSHIFT | KEY_RIGHTSHIFT => Some(Modifiers::SHIFT),
        _ => None,
    }
}

/// Physical state of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Released = 0,
    Pressed = 1,
}

impl KeyState {
    /// Decode a wire state; anything non-zero is a press.
    pub fn from_raw(state: u32) -> Self {
        if state == 0 {
            KeyState::Released
        } else {
            KeyState::Pressed
        }
    }
}

impl From<KeyState> for i32 {
    fn from(state: KeyState) -> Self {
        state as i32
    }
}

/// Serialized modifier state sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierEvent {
    pub serial: u32,
    pub depressed: u32,
    pub latched: u32,
    pub locked: u32,
    pub group: u32,
}

/// Display-wide source of event serials.
#[derive(Debug, Default)]
pub struct SerialCounter {
    serial: Cell<u32>,
}

impl SerialCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next serial. Wraps around like the protocol's.
    pub fn next_serial(&self) -> u32 {
        let serial = self.serial.get().wrapping_add(1);
        self.serial.set(serial);
        serial
    }

    /// Last serial handed out.
    pub fn current(&self) -> u32 {
        self.serial.get()
    }
}

/// A client keyboard that can receive events.
pub trait KeyboardFocus {
    fn key(&mut self, serial: u32, time: u32, key: u32, state: KeyState);
    fn modifiers(&mut self, event: &ModifierEvent);
}

/// The keyboard's focused client, if there is one.
#[derive(Default)]
pub struct Focus {
    target: Option<Box<dyn KeyboardFocus>>,
}

impl Focus {
    pub fn new(target: Option<Box<dyn KeyboardFocus>>) -> Self {
        Self { target }
    }

    pub fn is_some(&self) -> bool {
        self.target.is_some()
    }

    /// Deliver a key event with a fresh serial. Returns false without
    /// allocating a serial when nothing has focus.
    pub fn send_key(&mut self, serials: &SerialCounter, time: u32, key: u32, state: KeyState) -> bool {
        match self.target.as_mut() {
            Some(target) => {
                target.key(serials.next_serial(), time, key, state);
                true
            }
            None => false,
        }
    }

    pub fn send_modifiers(&mut self, event: &ModifierEvent) -> bool {
        match self.target.as_mut() {
            Some(target) => {
                target.modifiers(event);
                true
            }
            None => false,
        }
    }
}

/// A seat's keyboard: its focus and whoever currently routes its events.
#[derive(Default)]
pub struct Keyboard {
    focus: Focus,
    grab: Grab,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_focus(&mut self, target: Option<Box<dyn KeyboardFocus>>) {
        self.focus = Focus::new(target);
    }

    pub fn has_focus(&self) -> bool {
        self.focus.is_some()
    }

    pub fn grab(&self) -> &Grab {
        &self.grab
    }

    pub fn is_default_grab(&self) -> bool {
        self.grab.is_default()
    }

    /// Route events through `grab` until it releases or is ended.
    pub fn start_grab(&mut self, grab: Box<dyn KeyboardGrab>) {
        self.grab = Grab::Custom(grab);
    }

    /// Install the interceptor that swallows the release of `key`.
    pub fn start_binding_grab(&mut self, key: u32) {
        log::debug!("Installing binding grab for key {}", key);
        self.grab = Grab::Binding(BindingGrab::new(key));
    }

    /// Drop whatever grab is installed and restore default routing.
    pub fn end_grab(&mut self) {
        self.grab = Grab::Default;
    }

    /// Route a key event.
    pub fn key(&mut self, serials: &SerialCounter, time: u32, key: u32, state: KeyState) {
        let status = match &mut self.grab {
            Grab::Default => {
                self.focus.send_key(serials, time, key, state);
                GrabStatus::Continue
            }
            Grab::Binding(grab) => grab.handle_key(&mut self.focus, serials, time, key, state),
            Grab::Custom(grab) => grab.key(&mut self.focus, serials, time, key, state),
        };
        self.apply(status);
    }

    /// Route a modifier event.
    pub fn modifiers(&mut self, event: &ModifierEvent) {
        let status = match &mut self.grab {
            Grab::Default => {
                self.focus.send_modifiers(event);
                GrabStatus::Continue
            }
            Grab::Binding(grab) => grab.handle_modifiers(&mut self.focus, event),
            Grab::Custom(grab) => grab.modifiers(&mut self.focus, event),
        };
        self.apply(status);
    }

    fn apply(&mut self, status: GrabStatus) {
        if status == GrabStatus::Release {
            self.end_grab();
        }
    }
}

/// A group of input devices operated by one user.
#[derive(Default)]
pub struct Seat {
    name: String,
    modifier_state: Modifiers,
    pub keyboard: Keyboard,
}

impl Seat {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modifier_state(&self) -> Modifiers {
        self.modifier_state
    }

    pub fn set_modifier_state(&mut self, modifiers: Modifiers) {
        self.modifier_state = modifiers;
    }

    /// Track modifier keys as they go down and up.
    pub fn update_modifier_state(&mut self, key: u32, state: KeyState) {
        if let Some(modifier) = modifier_for_key(key) {
            self.modifier_state.set(modifier, state == KeyState::Pressed);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::keycodes::*;
    use super::*;

    const KEY_A: u32 = 30;
    const KEY_S: u32 = 31;

    struct Recorder(Rc<RefCell<Vec<(u32, KeyState)>>>);

    impl KeyboardFocus for Recorder {
        fn key(&mut self, _serial: u32, _time: u32, key: u32, state: KeyState) {
            self.0.borrow_mut().push((key, state));
        }

        fn modifiers(&mut self, _event: &ModifierEvent) {}
    }

    struct SwallowAll;

    impl KeyboardGrab for SwallowAll {
        fn key(
            &mut self,
            _focus: &mut Focus,
            _serials: &SerialCounter,
            _time: u32,
            key: u32,
            _state: KeyState,
        ) -> GrabStatus {
            if key == KEY_S {
                GrabStatus::Release
            } else {
                GrabStatus::Continue
            }
        }

        fn modifiers(&mut self, _focus: &mut Focus, _event: &ModifierEvent) -> GrabStatus {
            GrabStatus::Continue
        }
    }

    fn keyboard() -> (Keyboard, Rc<RefCell<Vec<(u32, KeyState)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut keyboard = Keyboard::new();
        keyboard.set_focus(Some(Box::new(Recorder(log.clone()))));
        (keyboard, log)
    }

    #[test]
    fn test_serials_increase() {
        let serials = SerialCounter::new();
        assert_eq!(serials.next_serial(), 1);
        assert_eq!(serials.next_serial(), 2);
        assert_eq!(serials.current(), 2);
    }

    #[test]
    fn test_key_state_from_raw() {
        assert_eq!(KeyState::from_raw(0), KeyState::Released);
        assert_eq!(KeyState::from_raw(1), KeyState::Pressed);
        assert_eq!(i32::from(KeyState::Pressed), 1);
    }

    #[test]
    fn test_modifier_state_tracks_keys() {
        let mut seat = Seat::new("seat0");
        seat.update_modifier_state(KEY_LEFTCTRL, KeyState::Pressed);
        seat.update_modifier_state(KEY_RIGHTALT, KeyState::Pressed);
        seat.update_modifier_state(KEY_A, KeyState::Pressed);
        assert_eq!(seat.modifier_state(), Modifiers::CTRL | Modifiers::ALT);

        seat.update_modifier_state(KEY_LEFTCTRL, KeyState::Released);
        assert_eq!(seat.modifier_state(), Modifiers::ALT);
    }

    #[test]
    fn test_default_grab_delivers_to_focus() {
        let (mut keyboard, log) = keyboard();
        let serials = SerialCounter::new();

        keyboard.key(&serials, 0, KEY_A, KeyState::Pressed);
        keyboard.key(&serials, 1, KEY_A, KeyState::Released);

        assert_eq!(
            *log.borrow(),
            vec![(KEY_A, KeyState::Pressed), (KEY_A, KeyState::Released)]
        );
        assert_eq!(serials.current(), 2);
    }

    #[test]
    fn test_binding_grab_ends_on_release() {
        let (mut keyboard, log) = keyboard();
        let serials = SerialCounter::new();

        keyboard.start_binding_grab(KEY_A);
        keyboard.key(&serials, 0, KEY_S, KeyState::Pressed);
        keyboard.key(&serials, 1, KEY_A, KeyState::Released);
        assert!(keyboard.is_default_grab());

        keyboard.key(&serials, 2, KEY_S, KeyState::Released);
        assert_eq!(
            *log.borrow(),
            vec![(KEY_S, KeyState::Pressed), (KEY_S, KeyState::Released)]
        );
    }

    #[test]
    fn test_custom_grab_routes_until_released() {
        let (mut keyboard, log) = keyboard();
        let serials = SerialCounter::new();

        keyboard.start_grab(Box::new(SwallowAll));
        keyboard.key(&serials, 0, KEY_A, KeyState::Pressed);
        assert!(!keyboard.is_default_grab());

        keyboard.key(&serials, 1, KEY_S, KeyState::Pressed);
        assert!(keyboard.is_default_grab());
        assert!(log.borrow().is_empty());
    }
}
