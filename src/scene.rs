//! Ownership of every surface known to the compositor.

use std::collections::HashMap;

use crate::surface::{Surface, SurfaceId};

/// Manages all surfaces in the compositor.
#[derive(Debug, Default)]
pub struct Scene {
    surfaces: HashMap<SurfaceId, Surface>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self {
            surfaces: HashMap::new(),
        }
    }

    /// Add a surface and return its ID.
    pub fn add(&mut self, surface: Surface) -> SurfaceId {
        let id = surface.id();
        self.surfaces.insert(id, surface);
        id
    }

    /// Remove a surface by ID.
    ///
    /// This does not notify destroy listeners; go through
    /// [`Compositor::destroy_surface`](crate::Compositor::destroy_surface)
    /// for that.
    pub fn remove(&mut self, id: SurfaceId) -> Option<Surface> {
        self.surfaces.remove(&id)
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.get_mut(&id)
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    /// Iterate over all surface IDs.
    pub fn ids(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.surfaces.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
