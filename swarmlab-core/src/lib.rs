//! Data model shared by every SwarmLab crate: species, entities, and the
//! one-way boundary through which simulation output leaves the core.

pub mod entity;
pub mod math;
pub mod sink;
pub mod species;

pub use entity::{Entity, EntityId, EntityIdAllocator};
pub use math::{clamp_magnitude, look_rotation, WEIGHT_EPSILON};
pub use sink::{NullSink, TransformSink};
pub use species::{Species, SpeciesId, SpeciesRegistry};

// Re-exported so downstream crates agree on a single vector type.
pub use glam::{Quat, Vec3};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_and_entities_work_together() {
        let mut registry = SpeciesRegistry::new();
        let boid = registry.register(Species::new("boid", 5.0));
        let shark = registry.register(Species::new("shark", 8.0));

        let mut ids = EntityIdAllocator::new();
        let e1 = Entity::new(ids.allocate(), boid, Vec3::ZERO, Vec3::X);
        let e2 = Entity::new(ids.allocate(), shark, Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO);

        assert_ne!(e1.id(), e2.id());
        assert_eq!(registry.get(e1.species()).map(|s| s.max_speed), Some(5.0));
        assert_eq!(registry.get(e2.species()).map(|s| s.name.as_str()), Some("shark"));
    }
}
