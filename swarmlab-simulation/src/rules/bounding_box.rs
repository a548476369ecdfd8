use swarmlab_core::{Entity, Species, Vec3};

use super::{steer, InteractionWeights, SteeringRule};

/// Keeps entities inside an axis-aligned box by steering inward once they
/// come within `edge_threshold` of a face.
///
/// The wall treats every species alike, so interaction weights are carried
/// for a uniform weight table but never consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBoxRule {
    pub global_weight: f32,
    pub center: Vec3,
    pub size: Vec3,
    pub edge_threshold: f32,
    pub max_force: f32,
    pub weights: InteractionWeights,
}

impl BoundingBoxRule {
    pub const DEFAULT_SIZE: Vec3 = Vec3::splat(20.0);
    pub const DEFAULT_EDGE_THRESHOLD: f32 = 5.0;
    pub const DEFAULT_MAX_FORCE: f32 = 10.0;

    pub fn new(center: Vec3, size: Vec3) -> Self {
        BoundingBoxRule {
            global_weight: 1.0,
            center,
            size,
            edge_threshold: Self::DEFAULT_EDGE_THRESHOLD,
            max_force: Self::DEFAULT_MAX_FORCE,
            weights: InteractionWeights::new(),
        }
    }

    /// Inward direction per axis: +1 near the low face, -1 near the high
    /// face, 0 in the safe interior.
    fn inward(&self, position: Vec3) -> Vec3 {
        let half = self.size * 0.5;
        let low = self.center - half + Vec3::splat(self.edge_threshold);
        let high = self.center + half - Vec3::splat(self.edge_threshold);

        let axis = |p: f32, lo: f32, hi: f32| {
            if p < lo {
                1.0
            } else if p > hi {
                -1.0
            } else {
                0.0
            }
        };

        Vec3::new(
            axis(position.x, low.x, high.x),
            axis(position.y, low.y, high.y),
            axis(position.z, low.z, high.z),
        )
    }
}

impl Default for BoundingBoxRule {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Self::DEFAULT_SIZE)
    }
}

impl SteeringRule for BoundingBoxRule {
    fn compute_force(&self, entity: &Entity, species: &Species, _neighbors: &[Entity]) -> Vec3 {
        let desired = self.inward(entity.position);
        if desired == Vec3::ZERO {
            return Vec3::ZERO;
        }
        steer(desired, species.max_speed, entity.velocity, self.max_force)
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
        "bounding_box"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarmlab_core::{EntityId, SpeciesId};

    fn at(position: Vec3) -> Entity {
        Entity::new(EntityId::new(0), SpeciesId::new(0), position, Vec3::ZERO)
    }

    #[test]
    fn safe_interior_is_quiet() {
        let rule = BoundingBoxRule::default();
        let species = Species::new("a", 5.0);
        for p in [Vec3::ZERO, Vec3::splat(4.9), Vec3::splat(-4.9)] {
            assert_eq!(rule.compute_force(&at(p), &species, &[]), Vec3::ZERO);
        }
    }

    #[test]
    fn near_high_x_face_pushes_negative_x() {
        let rule = BoundingBoxRule::default();
        let position = Vec3::new(rule.center.x + rule.size.x / 2.0 - 0.1, 0.0, 0.0);

        let force = rule.compute_force(&at(position), &Species::new("a", 5.0), &[]);
        assert!(force.x < 0.0);
        assert_eq!(force.y, 0.0);
        assert_eq!(force.z, 0.0);
    }

    #[test]
    fn corner_pushes_diagonally_inward() {
        let rule = BoundingBoxRule {
            max_force: 100.0,
            ..BoundingBoxRule::default()
        };
        let force = rule.compute_force(&at(Vec3::new(-9.0, 9.0, 0.0)), &Species::new("a", 5.0), &[]);

        assert!(force.x > 0.0 && force.y < 0.0);
        assert!((force.x + force.y).abs() < 1e-5);
        assert!((force.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn outside_the_box_still_points_inward() {
        let rule = BoundingBoxRule::new(Vec3::new(100.0, 0.0, 0.0), Vec3::splat(10.0));
        let force = rule.compute_force(&at(Vec3::ZERO), &Species::new("a", 5.0), &[]);
        assert!(force.x > 0.0);
    }
}
