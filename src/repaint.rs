// ============================================================================
// Repaint Scheduling
// ============================================================================

use std::cell::Cell;

use calloop::ping::Ping;

/// Tracks whether a frame is wanted and wakes the event loop when it is.
///
/// While a frame timer is pacing the loop, requests only raise the flag; the
/// timer picks them up on its next expiry.
#[derive(Default)]
pub struct RepaintScheduler {
    requested: Cell<bool>,
    pacing: Cell<bool>,
    wakeup: Option<Ping>,
}

impl RepaintScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the handle used to wake the event loop.
    pub fn set_wakeup(&mut self, ping: Ping) {
        self.wakeup = Some(ping);
    }

    /// Request that the event loop repaint.
    pub fn schedule_repaint(&self) {
        // Only ping on the first request of an idle loop
        let was_requested = self.requested.replace(true);
        if !was_requested && !self.pacing.get() {
            if let Some(ping) = &self.wakeup {
                ping.ping();
            }
        }
    }

    pub fn is_requested(&self) -> bool {
        self.requested.get()
    }

    /// Check if a repaint has been requested and clear the flag
    pub fn take_request(&self) -> bool {
        self.requested.replace(false)
    }

    pub fn is_pacing(&self) -> bool {
        self.pacing.get()
    }

    pub(crate) fn set_pacing(&self, pacing: bool) {
        self.pacing.set(pacing);
    }
}

impl std::fmt::Debug for RepaintScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepaintScheduler")
            .field("requested", &self.requested.get())
            .field("pacing", &self.pacing.get())
            .field("wakeup", &self.wakeup.is_some())
            .finish()
    }
}
