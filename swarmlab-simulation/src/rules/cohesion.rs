use swarmlab_core::{Entity, Species, Vec3};

use super::{is_influential, neighbors_within, steer, InteractionWeights, SteeringRule};

/// Steers toward the weighted center of the neighbors it can see.
#[derive(Debug, Clone, PartialEq)]
pub struct CohesionRule {
    pub global_weight: f32,
    /// Neighbors at or beyond this distance are ignored.
    pub vision_radius: f32,
    pub max_force: f32,
    pub weights: InteractionWeights,
}

impl CohesionRule {
    pub const DEFAULT_VISION_RADIUS: f32 = 100.0;
    pub const DEFAULT_MAX_FORCE: f32 = 2.0;

    pub fn new(weights: InteractionWeights) -> Self {
        CohesionRule {
            global_weight: 1.0,
            vision_radius: Self::DEFAULT_VISION_RADIUS,
            max_force: Self::DEFAULT_MAX_FORCE,
            weights,
        }
    }
}

impl SteeringRule for CohesionRule {
    fn compute_force(&self, entity: &Entity, species: &Species, neighbors: &[Entity]) -> Vec3 {
        let mut center_of_mass = Vec3::ZERO;
        let mut total_weight = 0.0;
        let mut count = 0usize;

        for (neighbor, _) in neighbors_within(entity, neighbors, self.vision_radius) {
            let weight = self.weights.weight_for(neighbor.species());
            if !is_influential(weight) {
                continue;
            }
            center_of_mass += neighbor.position * weight;
            total_weight += weight;
            count += 1;
        }

        if count == 0 {
            return Vec3::ZERO;
        }

        center_of_mass /= total_weight;
        steer(
            center_of_mass - entity.position,
            species.max_speed,
            entity.velocity,
            self.max_force,
        )
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
        "cohesion"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarmlab_core::{EntityId, SpeciesId};

    const A: SpeciesId = SpeciesId::new(0);
    const B: SpeciesId = SpeciesId::new(1);

    fn entity(id: u64, species: SpeciesId, position: Vec3) -> Entity {
        Entity::new(EntityId::new(id), species, position, Vec3::ZERO)
    }

    #[test]
    fn alone_means_no_force() {
        let rule = CohesionRule::new(InteractionWeights::new().with(A, 1.0));
        let me = entity(0, A, Vec3::ZERO);
        let species = Species::new("a", 5.0);

        assert_eq!(rule.compute_force(&me, &species, &[]), Vec3::ZERO);
        assert_eq!(rule.compute_force(&me, &species, &[me.clone()]), Vec3::ZERO);
    }

    #[test]
    fn pulls_toward_heavier_species() {
        let rule = CohesionRule {
            max_force: 100.0,
            ..CohesionRule::new(InteractionWeights::new().with(A, 1.0).with(B, 3.0))
        };
        let me = entity(0, A, Vec3::ZERO);
        let snapshot = vec![
            me.clone(),
            entity(1, A, Vec3::new(-4.0, 0.0, 0.0)),
            entity(2, B, Vec3::new(4.0, 0.0, 0.0)),
        ];

        // Weighted center is (-4 + 12) / 4 = +2 on X.
        let force = rule.compute_force(&me, &Species::new("a", 5.0), &snapshot);
        assert!((force - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn ignores_species_without_weight_and_out_of_range() {
        let rule = CohesionRule {
            vision_radius: 10.0,
            ..CohesionRule::new(InteractionWeights::new().with(A, 1.0).with(B, 0.0005))
        };
        let me = entity(0, A, Vec3::ZERO);
        let snapshot = vec![
            entity(1, B, Vec3::new(1.0, 0.0, 0.0)),
            entity(2, A, Vec3::new(10.0, 0.0, 0.0)),
        ];

        assert_eq!(
            rule.compute_force(&me, &Species::new("a", 5.0), &snapshot),
            Vec3::ZERO
        );
    }

    #[test]
    fn centroid_on_top_of_entity_is_no_force() {
        let rule = CohesionRule::new(InteractionWeights::new().with(A, 1.0));
        let me = entity(0, A, Vec3::ZERO);
        let snapshot = vec![
            entity(1, A, Vec3::new(-2.0, 0.0, 0.0)),
            entity(2, A, Vec3::new(2.0, 0.0, 0.0)),
        ];

        let force = rule.compute_force(&me, &Species::new("a", 5.0), &snapshot);
        assert_eq!(force, Vec3::ZERO);
    }
}
