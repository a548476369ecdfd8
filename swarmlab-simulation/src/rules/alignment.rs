use swarmlab_core::{Entity, Species, Vec3};

use super::{is_influential, neighbors_within, steer, InteractionWeights, SteeringRule};

/// Matches heading with nearby neighbors.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRule {
    pub global_weight: f32,
    pub neighbor_radius: f32,
    pub max_force: f32,
    pub weights: InteractionWeights,
}

impl AlignmentRule {
    pub const DEFAULT_NEIGHBOR_RADIUS: f32 = 10.0;
    pub const DEFAULT_MAX_FORCE: f32 = 2.0;

    pub fn new(weights: InteractionWeights) -> Self {
        AlignmentRule {
            global_weight: 1.0,
            neighbor_radius: Self::DEFAULT_NEIGHBOR_RADIUS,
            max_force: Self::DEFAULT_MAX_FORCE,
            weights,
        }
    }
}

impl SteeringRule for AlignmentRule {
    fn compute_force(&self, entity: &Entity, species: &Species, neighbors: &[Entity]) -> Vec3 {
        let mut heading = Vec3::ZERO;
        let mut total_weight = 0.0;
        let mut count = 0usize;

        for (neighbor, _) in neighbors_within(entity, neighbors, self.neighbor_radius) {
            let weight = self.weights.weight_for(neighbor.species());
            if !is_influential(weight) {
                continue;
            }
            heading += neighbor.velocity * weight;
            total_weight += weight;
            count += 1;
        }

        if count == 0 || !is_influential(total_weight) {
            return Vec3::ZERO;
        }

        heading /= count as f32;
        steer(heading, species.max_speed, entity.velocity, self.max_force)
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
        "alignment"
    }
}
