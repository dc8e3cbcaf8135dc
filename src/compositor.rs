//! The compositor core: one owner for the scene, the running animations, the
//! binding registry and the clock they share.
//!
//! Everything runs on the compositor's single event loop. Input arrives via
//! the `notify_*` methods; frames are driven by [`Compositor::repaint`], which
//! [`Compositor::attach_repaint_source`] wires to a calloop ping.

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};

use crate::animation::{AnimationId, AnimationList, DoneCallback, Effect};
use crate::binding::{BindingEvent, BindingId, BindingList};
use crate::clock::{Clock, MonotonicClock};
use crate::repaint::RepaintScheduler;
use crate::scene::Scene;
use crate::seat::{KeyState, ModifierEvent, Modifiers, Seat, SerialCounter};
use crate::surface::{Surface, SurfaceId};
use crate::{CompositorConfig, Error, Result};

pub struct Compositor {
    config: CompositorConfig,
    clock: Box<dyn Clock>,
    repaint: RepaintScheduler,
    scene: Scene,
    animations: AnimationList,
    bindings: BindingList,
    serials: SerialCounter,
}

impl Compositor {
    /// Create a compositor driven by the system clock.
    pub fn new(config: CompositorConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }

    pub fn with_clock(config: CompositorConfig, clock: impl Clock + 'static) -> Self {
        Self {
            config,
            clock: Box::new(clock),
            repaint: RepaintScheduler::new(),
            scene: Scene::new(),
            animations: AnimationList::new(),
            bindings: BindingList::new(),
            serials: SerialCounter::new(),
        }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Current time of the compositor clock, in milliseconds.
    pub fn get_time(&self) -> u32 {
        self.clock.now_ms()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn animations(&self) -> &AnimationList {
        &self.animations
    }

    pub fn bindings(&self) -> &BindingList {
        &self.bindings
    }

    pub fn serials(&self) -> &SerialCounter {
        &self.serials
    }

    pub fn repaint_scheduler(&self) -> &RepaintScheduler {
        &self.repaint
    }

    pub fn schedule_repaint(&self) {
        self.repaint.schedule_repaint();
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    /// Drive [`Compositor::repaint`] from `handle`'s loop.
    ///
    /// A repaint request on an idle loop pings it awake and starts a frame.
    /// As long as frames keep requesting repaints, the next ones are paced by
    /// a timer every [`CompositorConfig::frame_interval`].
    pub fn attach_repaint_source(
        &mut self,
        handle: &LoopHandle<'_, Compositor>,
    ) -> Result<RegistrationToken> {
        let (ping, source) = calloop::ping::make_ping()?;
        let timers = handle.clone();
        let token = handle
            .insert_source(source, move |_, _, compositor| {
                compositor.start_frame(&timers);
            })
            .map_err(|e| e.error)?;
        self.repaint.set_wakeup(ping);
        log::info!("Repaint source attached to event loop");
        Ok(token)
    }

    fn start_frame(&mut self, handle: &LoopHandle<'_, Compositor>) {
        // A paced frame is already due
        if self.repaint.is_pacing() {
            return;
        }

        self.repaint.set_pacing(true);
        self.repaint();
        if !self.repaint.is_requested() {
            self.repaint.set_pacing(false);
            return;
        }

        let timer = Timer::from_duration(self.config.frame_interval);
        if let Err(err) = handle.insert_source(timer, |_, _, compositor| compositor.paced_frame()) {
            log::error!("Failed to arm frame timer: {}", err.error);
            self.repaint.set_pacing(false);
            // Let the next request ping again
            self.repaint.take_request();
        }
    }

    fn paced_frame(&mut self) -> TimeoutAction {
        self.repaint();
        if self.repaint.is_requested() {
            TimeoutAction::ToDuration(self.config.frame_interval)
        } else {
            log::trace!("Scene idle, frame timer dropped");
            self.repaint.set_pacing(false);
            TimeoutAction::Drop
        }
    }

    /// Run one frame: advance every animation to the current time.
    ///
    /// Animations still in flight schedule the next frame themselves.
    pub fn repaint(&mut self) {
        self.repaint.take_request();
        let now = self.clock.now_ms();
        self.animations.frame(&mut self.scene, &self.repaint, now);
    }

    // ------------------------------------------------------------------
    // Surfaces and animations
    // ------------------------------------------------------------------

    pub fn add_surface(&mut self, surface: Surface) -> SurfaceId {
        self.scene.add(surface)
    }

    /// Destroy a surface, ending every animation attached to it first.
    pub fn destroy_surface(&mut self, id: SurfaceId) -> Result<Surface> {
        let listeners = self
            .scene
            .get(id)
            .ok_or(Error::UnknownSurface(id))?
            .destroy_signal()
            .emit();

        for animation in listeners {
            self.animations.destroy(animation, &mut self.scene);
        }

        log::debug!("Destroying surface {:?}", id);
        self.scene.remove(id).ok_or(Error::UnknownSurface(id))
    }

    /// Zoom a surface about its center from `start` to `stop` scale while
    /// fading it in.
    pub fn zoom_run(
        &mut self,
        surface: SurfaceId,
        start: f32,
        stop: f32,
        done: Option<DoneCallback>,
    ) -> Result<AnimationId> {
        self.run_animation(surface, Effect::Zoom { start, stop }, done)
    }

    /// Fade a surface in.
    pub fn fade_run(&mut self, surface: SurfaceId, done: Option<DoneCallback>) -> Result<AnimationId> {
        self.run_animation(surface, Effect::Fade, done)
    }

    fn run_animation(
        &mut self,
        surface: SurfaceId,
        effect: Effect,
        done: Option<DoneCallback>,
    ) -> Result<AnimationId> {
        let now = self.clock.now_ms();
        self.animations.run(
            &mut self.scene,
            &self.repaint,
            surface,
            effect,
            self.config.animation_spring,
            now,
            done,
        )
    }

    // ------------------------------------------------------------------
    // Bindings
    // ------------------------------------------------------------------

    pub fn add_binding<F>(
        &mut self,
        key: u32,
        button: u32,
        axis: u32,
        modifier: Modifiers,
        handler: F,
    ) -> BindingId
    where
        F: FnMut(&mut Seat, &BindingEvent) + 'static,
    {
        self.bindings.add(key, button, axis, modifier, handler)
    }

    pub fn add_key_binding<F>(&mut self, key: u32, modifier: Modifiers, handler: F) -> BindingId
    where
        F: FnMut(&mut Seat, &BindingEvent) + 'static,
    {
        self.bindings.add_key_binding(key, modifier, handler)
    }

    pub fn add_button_binding<F>(&mut self, button: u32, modifier: Modifiers, handler: F) -> BindingId
    where
        F: FnMut(&mut Seat, &BindingEvent) + 'static,
    {
        self.bindings.add_button_binding(button, modifier, handler)
    }

    pub fn add_axis_binding<F>(&mut self, axis: u32, modifier: Modifiers, handler: F) -> BindingId
    where
        F: FnMut(&mut Seat, &BindingEvent) + 'static,
    {
        self.bindings.add_axis_binding(axis, modifier, handler)
    }

    pub fn remove_binding(&mut self, id: BindingId) -> Result<()> {
        self.bindings.remove(id)
    }

    pub fn remove_all_bindings(&mut self) {
        self.bindings.remove_all();
    }

    /// Fire the bindings matching a raw input event.
    pub fn run_binding(
        &mut self,
        seat: &mut Seat,
        time: u32,
        key: u32,
        button: u32,
        axis: u32,
        value: i32,
    ) {
        self.bindings.run(seat, time, key, button, axis, value);
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Route a key event from a seat's keyboard.
    ///
    /// Bindings only get a look while the keyboard is not grabbed. The event
    /// then goes through whatever grab is installed, which is how the press
    /// that fired a key binding is hidden from the client as well.
    pub fn notify_key(&mut self, seat: &mut Seat, time: u32, key: u32, state: KeyState) {
        seat.update_modifier_state(key, state);

        if seat.keyboard.is_default_grab() {
            self.bindings.run(seat, time, key, 0, 0, state.into());
        }

        seat.keyboard.key(&self.serials, time, key, state);
    }

    /// Route a modifier state change from a seat's keyboard.
    pub fn notify_modifiers(&mut self, seat: &mut Seat, event: ModifierEvent) {
        seat.keyboard.modifiers(&event);
    }

    pub fn notify_button(&mut self, seat: &mut Seat, time: u32, button: u32, state: KeyState) {
        self.bindings.run(seat, time, 0, button, 0, state.into());
    }

    pub fn notify_axis(&mut self, seat: &mut Seat, time: u32, axis: u32, value: i32) {
        self.bindings.run(seat, time, 0, 0, axis, value);
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(CompositorConfig::default())
    }
}
