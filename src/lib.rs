//! Animation and input interception core for a Wayland compositor.
//!
//! Two independent halves live here:
//!
//! - **Animations**: a fixed-step damped spring ([`animation::Spring`]) drives
//!   self-terminating zoom and fade effects on scene surfaces. The
//!   [`Compositor`] ticks them from its repaint loop and tears them down when
//!   they settle or when their surface is destroyed.
//! - **Bindings**: an ordered registry of key/button/axis shortcuts. Firing a
//!   key binding installs a short-lived keyboard grab that swallows the
//!   matching key release, so the focused client never sees half a key press.

pub mod animation;
pub mod binding;
pub mod clock;
pub mod compositor;
pub mod grab;
pub mod repaint;
pub mod scene;
pub mod seat;
pub mod signal;
pub mod surface;
pub mod transform;

use std::time::Duration;

use animation::SpringConfig;
use binding::BindingId;
use surface::SurfaceId;

pub use compositor::Compositor;

pub mod prelude {
    pub use crate::animation::{AnimationId, Spring, SpringConfig};
    pub use crate::binding::{BindingEvent, BindingId};
    pub use crate::clock::{Clock, ManualClock, MonotonicClock};
    pub use crate::seat::{KeyState, KeyboardFocus, ModifierEvent, Modifiers, Seat};
    pub use crate::surface::{Geometry, Surface, SurfaceId};
    pub use crate::transform::Transform;
    pub use crate::{Compositor, CompositorConfig, Error, Result};
}

/// Errors reported by the compositor core.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("surface {0:?} is not part of the scene")]
    UnknownSurface(SurfaceId),
    #[error("binding {0:?} is not registered")]
    UnknownBinding(BindingId),
    #[error("event loop error: {0}")]
    EventLoop(#[from] calloop::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Tunables for the compositor core.
#[derive(Clone, Debug)]
pub struct CompositorConfig {
    /// Spring used by zoom and fade animations.
    pub animation_spring: SpringConfig,
    /// Time between frames while animations keep requesting repaints.
    pub frame_interval: Duration,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            animation_spring: SpringConfig::ANIMATION,
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl CompositorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the spring used by zoom and fade animations.
    pub fn animation_spring(mut self, spring: SpringConfig) -> Self {
        self.animation_spring = spring;
        self
    }

    /// Set the pacing of frames driven by the event loop.
    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }
}
