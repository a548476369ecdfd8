//! Steering rules and the contract they share.
//!
//! A rule turns one entity plus a read-only snapshot of the swarm into a
//! force. Rules never mutate anything; the swarm scales each force by the
//! rule's global weight and sums them.

mod alignment;
mod bounding_box;
mod cohesion;
mod separation;

pub use alignment::AlignmentRule;
pub use bounding_box::BoundingBoxRule;
pub use cohesion::CohesionRule;
pub use separation::SeparationRule;

use std::collections::HashMap;
use std::fmt;

use swarmlab_core::{clamp_magnitude, Entity, Species, SpeciesId, Vec3, WEIGHT_EPSILON};

/// Core trait that every steering rule implements.
pub trait SteeringRule: fmt::Debug + Send + Sync {
    /// Force this rule applies to `entity`, whose constants are `species`.
    ///
    /// `neighbors` is the whole swarm snapshot and may contain `entity`
    /// itself. Must return `Vec3::ZERO` when nothing contributes, and never a
    /// non-finite vector.
    fn compute_force(&self, entity: &Entity, species: &Species, neighbors: &[Entity]) -> Vec3;

    /// Scale applied to the whole output before it is summed.
    fn global_weight(&self) -> f32;

    fn weights(&self) -> &InteractionWeights;

    fn weights_mut(&mut self) -> &mut InteractionWeights;

    /// Interaction weight for a neighbor of the given species, 0.0 if unset.
    fn weight_for(&self, neighbor: SpeciesId) -> f32 {
        self.weights().weight_for(neighbor)
    }

    /// Optional name for debugging and logging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// How strongly the owning species reacts to neighbors of each species.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionWeights {
    weights: HashMap<SpeciesId, f32>,
}

impl InteractionWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, species: SpeciesId, weight: f32) -> Self {
        self.set(species, weight);
        self
    }

    pub fn set(&mut self, species: SpeciesId, weight: f32) {
        self.weights.insert(species, weight);
    }

    pub fn remove(&mut self, species: SpeciesId) -> Option<f32> {
        self.weights.remove(&species)
    }

    /// Unknown species simply have no influence.
    pub fn weight_for(&self, species: SpeciesId) -> f32 {
        self.weights.get(&species).copied().unwrap_or(0.0)
    }

    /// Keeps exactly one entry per listed species. New species get 0.0 and
    /// entries for species no longer listed are dropped.
    pub fn sync_species(&mut self, species: &[SpeciesId]) {
        self.weights.retain(|id, _| species.contains(id));
        for id in species {
            self.weights.entry(*id).or_insert(0.0);
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpeciesId, f32)> + '_ {
        self.weights.iter().map(|(id, w)| (*id, *w))
    }
}

impl FromIterator<(SpeciesId, f32)> for InteractionWeights {
    fn from_iter<I: IntoIterator<Item = (SpeciesId, f32)>>(iter: I) -> Self {
        InteractionWeights {
            weights: iter.into_iter().collect(),
        }
    }
}

/// Neighbors of `entity` strictly inside `radius`, paired with their distance.
///
/// Every neighbor-dependent rule goes through here so self exclusion is the
/// same everywhere: the entity's own id is skipped, and so is anything at
/// distance zero.
pub(crate) fn neighbors_within<'a>(
    entity: &'a Entity,
    neighbors: &'a [Entity],
    radius: f32,
) -> impl Iterator<Item = (&'a Entity, f32)> + 'a {
    neighbors
        .iter()
        .filter(move |neighbor| neighbor.id() != entity.id())
        .filter_map(move |neighbor| {
            let distance = entity.distance_to(neighbor);
            (distance > 0.0 && distance < radius).then_some((neighbor, distance))
        })
}

/// `true` when a weight is large enough to matter.
#[inline]
pub(crate) fn is_influential(weight: f32) -> bool {
    weight > WEIGHT_EPSILON
}

/// Reynolds steering: head along `direction` at `max_speed`, correct the
/// current `velocity` toward that, and limit the correction to `max_force`.
/// A zero-length direction produces no force.
pub(crate) fn steer(direction: Vec3, max_speed: f32, velocity: Vec3, max_force: f32) -> Vec3 {
    match direction.try_normalize() {
        Some(heading) => clamp_magnitude(heading * max_speed - velocity, max_force),
        None => Vec3::ZERO,
    }
}
