//! Self-terminating surface animations.
//!
//! Every animation owns a [`Spring`] running from 0 to 1 and applies its
//! progress to one surface each frame. An animation ends in exactly one of
//! two ways, both funnelled through [`AnimationList::destroy`]:
//!
//! - the spring settles during a frame tick, or
//! - the surface is destroyed and its destroy signal names the animation.
//!
//! Teardown removes the animation from the active list before doing anything
//! else, so whichever path comes second finds nothing to do and the done
//! callback fires once.

mod spring;

use std::sync::atomic::{AtomicU64, Ordering};

pub use spring::{Spring, SpringConfig, STEP_MS};

use crate::repaint::RepaintScheduler;
use crate::scene::Scene;
use crate::surface::{SurfaceId, TransformId};
use crate::transform::Transform;
use crate::{Error, Result};

/// Handle to a running animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

impl AnimationId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        AnimationId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Called once when an animation finishes, whatever ended it.
pub type DoneCallback = Box<dyn FnOnce(AnimationId)>;

/// What an animation does to its surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Scale about the surface center from `start` to `stop`, fading in.
    Zoom { start: f32, stop: f32 },
    /// Fade in, opacity only.
    Fade,
}

impl Effect {
    /// Surface opacity at spring position `progress`.
    pub fn alpha(&self, progress: f64) -> f32 {
        match self {
            // Only the overshoot is cut off.
            Effect::Zoom { .. } => progress.min(1.0) as f32,
            Effect::Fade => progress.clamp(0.0, 1.0) as f32,
        }
    }

    /// Scale factor at spring position `progress`, if the effect scales.
    pub fn scale(&self, progress: f64) -> Option<f32> {
        match *self {
            Effect::Zoom { start, stop } => Some(start + (stop - start) * progress as f32),
            Effect::Fade => None,
        }
    }
}

struct Animation {
    id: AnimationId,
    surface: SurfaceId,
    spring: Spring,
    effect: Effect,
    /// Link in the surface's transform chain, zoom only
    transform: Option<TransformId>,
    done: Option<DoneCallback>,
}

/// The set of animations ticked every frame, in start order.
#[derive(Default)]
pub struct AnimationList {
    animations: Vec<Animation>,
}

impl AnimationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `effect` on a surface.
    ///
    /// The animation is registered on the surface and ticked once at `now`
    /// before this returns, so the next frame already shows its first state.
    /// Fails without touching anything if the surface is not in the scene.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
        scene: &mut Scene,
        repaint: &RepaintScheduler,
        surface_id: SurfaceId,
        effect: Effect,
        config: SpringConfig,
        now: u32,
        done: Option<DoneCallback>,
    ) -> Result<AnimationId> {
        let surface = scene
            .get_mut(surface_id)
            .ok_or(Error::UnknownSurface(surface_id))?;

        let id = AnimationId::next();
        let transform = match effect {
            Effect::Zoom { .. } => Some(surface.insert_transform(Transform::IDENTITY)),
            Effect::Fade => None,
        };
        surface.destroy_signal_mut().add(id);

        self.animations.push(Animation {
            id,
            surface: surface_id,
            spring: Spring::with_config(config, 0.0, 1.0, now),
            effect,
            transform,
            done,
        });

        log::debug!("Starting {:?} animation {:?} on {:?}", effect, id, surface_id);

        self.tick(id, scene, repaint, now);
        Ok(id)
    }

    /// Advance every animation to `msecs`, in start order.
    ///
    /// Animations that settle are torn down along the way.
    pub fn frame(&mut self, scene: &mut Scene, repaint: &RepaintScheduler, msecs: u32) {
        // Snapshot: ticks remove finished animations from the list.
        let ids: Vec<AnimationId> = self.animations.iter().map(|a| a.id).collect();
        for id in ids {
            self.tick(id, scene, repaint, msecs);
        }
    }

    fn tick(&mut self, id: AnimationId, scene: &mut Scene, repaint: &RepaintScheduler, msecs: u32) {
        let Some(animation) = self.animations.iter_mut().find(|a| a.id == id) else {
            return;
        };

        animation.spring.update(msecs);

        if animation.spring.is_settled() {
            self.destroy(id, scene);
            repaint.schedule_repaint();
            return;
        }

        let Some(surface) = scene.get_mut(animation.surface) else {
            log::warn!("Animation {:?} outlived its surface {:?}", id, animation.surface);
            self.destroy(id, scene);
            return;
        };

        let progress = animation.spring.current;
        if let (Some(scale), Some(link)) = (animation.effect.scale(progress), animation.transform) {
            let transform = Transform::scale_about(
                scale,
                0.5 * surface.geometry.width,
                0.5 * surface.geometry.height,
            );
            surface.set_transform(link, transform);
        }
        surface.alpha = animation.effect.alpha(progress);

        surface.geometry.dirty = true;
        repaint.schedule_repaint();
    }

    /// Tear an animation down. Returns false if it had already ended.
    ///
    /// Unsubscribes from the surface, unlinks the zoom transform, marks the
    /// surface dirty and finally runs the done callback.
    pub fn destroy(&mut self, id: AnimationId, scene: &mut Scene) -> bool {
        let Some(index) = self.animations.iter().position(|a| a.id == id) else {
            return false;
        };
        let mut animation = self.animations.remove(index);

        if let Some(surface) = scene.get_mut(animation.surface) {
            surface.destroy_signal_mut().remove(id);
            if let Some(link) = animation.transform {
                surface.remove_transform(link);
            }
            surface.geometry.dirty = true;
        }

        log::debug!(
            "Animation {:?} on {:?} finished at {}ms",
            id,
            animation.surface,
            animation.spring.timestamp
        );

        if let Some(done) = animation.done.take() {
            done(id);
        }
        true
    }

    pub fn contains(&self, id: AnimationId) -> bool {
        self.animations.iter().any(|a| a.id == id)
    }

    /// Iterate over active animation IDs in start order.
    pub fn ids(&self) -> impl Iterator<Item = AnimationId> + '_ {
        self.animations.iter().map(|a| a.id)
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}
