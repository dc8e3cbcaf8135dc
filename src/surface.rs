//! Scene-graph surfaces.
//!
//! A [`Surface`] is the compositor-side view of a client buffer: where it sits,
//! how opaque it is, and an ordered chain of transforms that animations and
//! shells push onto it. Anything that needs to know when the surface goes
//! away subscribes to its destroy signal.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::animation::AnimationId;
use crate::signal::DestroySignal;
use crate::transform::Transform;

/// Unique identifier for each surface in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Create a new unique surface ID.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        SurfaceId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value (for debugging/logging).
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Identifier of one link in a surface's transform chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransformId(u64);

impl TransformId {
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        TransformId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Position and size of a surface in compositor space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Set whenever anything affecting placement changes; cleared by the
    /// renderer once it has recomputed the surface matrix.
    pub dirty: bool,
}

impl Geometry {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            dirty: true,
        }
    }
}

/// A surface placed in the scene.
#[derive(Debug)]
pub struct Surface {
    id: SurfaceId,
    pub geometry: Geometry,
    /// Opacity; at most 1
    pub alpha: f32,
    transforms: Vec<(TransformId, Transform)>,
    destroy_signal: DestroySignal<AnimationId>,
}

impl Surface {
    /// Create a fully opaque surface with no transforms.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: SurfaceId::next(),
            geometry,
            alpha: 1.0,
            transforms: Vec::new(),
            destroy_signal: DestroySignal::new(),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Insert a transform at the front of the chain.
    pub fn insert_transform(&mut self, transform: Transform) -> TransformId {
        let id = TransformId::next();
        self.transforms.insert(0, (id, transform));
        self.geometry.dirty = true;
        id
    }

    /// Replace the matrix of an existing link. Returns false if unknown.
    pub fn set_transform(&mut self, id: TransformId, transform: Transform) -> bool {
        match self.transforms.iter_mut().find(|(link, _)| *link == id) {
            Some((_, slot)) => {
                *slot = transform;
                true
            }
            None => false,
        }
    }

    /// Unlink a transform from the chain. Returns false if unknown.
    pub fn remove_transform(&mut self, id: TransformId) -> bool {
        let before = self.transforms.len();
        self.transforms.retain(|(link, _)| *link != id);
        self.transforms.len() != before
    }

    pub fn transform_count(&self) -> usize {
        self.transforms.len()
    }

    /// Fold the chain into one matrix; the first link is applied first.
    pub fn transform(&self) -> Transform {
        self.transforms
            .iter()
            .fold(Transform::IDENTITY, |acc, (_, t)| t.then(&acc))
    }

    pub fn destroy_signal(&self) -> &DestroySignal<AnimationId> {
        &self.destroy_signal
    }

    pub fn destroy_signal_mut(&mut self) -> &mut DestroySignal<AnimationId> {
        &mut self.destroy_signal
    }
}
