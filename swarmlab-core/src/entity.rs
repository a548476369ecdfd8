use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::species::SpeciesId;

/// Stable handle for one simulated agent.
///
/// Ids are never reused within a swarm's lifetime, so a handle held by an
/// external visual layer can't silently start pointing at a different agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    pub const fn new(id: u64) -> Self {
        EntityId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Hands out monotonically increasing entity ids.
#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next_id: u64,
}

impl EntityIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next_id
    }
}

/// Mutable simulation state for one agent.
///
/// The species is a handle into the registry, not a copy of its constants, so
/// edits to a species between ticks are seen on the next tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    species: SpeciesId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
}

impl Entity {
    pub fn new(id: EntityId, species: SpeciesId, position: Vec3, velocity: Vec3) -> Self {
        Entity {
            id,
            species,
            position,
            velocity,
            orientation: Quat::IDENTITY,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn species(&self) -> SpeciesId {
        self.species
    }

    /// Points the entity at a different species handle, used when a registry
    /// is rebuilt and handles shift.
    pub fn reassign_species(&mut self, species: SpeciesId) {
        self.species = species;
    }

    /// Distance to another entity.
    #[inline]
    pub fn distance_to(&self, other: &Entity) -> f32 {
        self.position.distance(other.position)
    }

    /// True when position, velocity and orientation hold no NaN or infinity.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.orientation.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_never_repeats() {
        let mut ids = EntityIdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        let c = ids.allocate();
        assert!(a < b && b < c);
        assert_eq!(ids.allocated(), 3);
    }

    #[test]
    fn new_entity_starts_unrotated() {
        let e = Entity::new(EntityId::new(7), SpeciesId::new(0), Vec3::ONE, Vec3::Y);
        assert_eq!(e.orientation, Quat::IDENTITY);
        assert_eq!(e.id().value(), 7);
        assert!(e.is_finite());
    }

    #[test]
    fn detects_non_finite_state() {
        let mut e = Entity::new(EntityId::new(0), SpeciesId::new(0), Vec3::ZERO, Vec3::ZERO);
        e.velocity.x = f32::NAN;
        assert!(!e.is_finite());
    }
}
