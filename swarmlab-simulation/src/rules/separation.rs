use swarmlab_core::{Entity, Species, Vec3};

use super::{is_influential, neighbors_within, steer, InteractionWeights, SteeringRule};

/// Pushes away from neighbors closer than `min_distance`; the closer the
/// neighbor, the harder the push.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparationRule {
    pub global_weight: f32,
    pub min_distance: f32,
    pub max_force: f32,
    pub weights: InteractionWeights,
}

impl SeparationRule {
    pub const DEFAULT_MIN_DISTANCE: f32 = 2.5;
    pub const DEFAULT_MAX_FORCE: f32 = 5.0;

    pub fn new(weights: InteractionWeights) -> Self {
        SeparationRule {
            global_weight: 1.0,
            min_distance: Self::DEFAULT_MIN_DISTANCE,
            max_force: Self::DEFAULT_MAX_FORCE,
            weights,
        }
    }
}

impl SteeringRule for SeparationRule {
    fn compute_force(&self, entity: &Entity, species: &Species, neighbors: &[Entity]) -> Vec3 {
        let mut push = Vec3::ZERO;
        let mut count = 0usize;

        for (neighbor, distance) in neighbors_within(entity, neighbors, self.min_distance) {
            let weight = self.weights.weight_for(neighbor.species());
            if !is_influential(weight) {
                continue;
            }
            let away = (entity.position - neighbor.position).normalize_or_zero() / distance;
            push += away * weight;
            count += 1;
        }

        if count == 0 {
            return Vec3::ZERO;
        }

        push /= count as f32;
        steer(push, species.max_speed, entity.velocity, self.max_force)
    }

    fn global_weight(&self) -> f32 {
        self.global_weight
    }

    fn weights(&self) -> &InteractionWeights {
        &self.weights
    }

    fn weights_mut(&mut self) -> &mut InteractionWeights {
        &mut self.weights
    }

    fn name(&self) -> &str {
        "separation"
    }
}
