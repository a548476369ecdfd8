//! Steering rules and the two-phase integrator that drives a swarm.
//!
//! Each species owns an ordered rule set. Every tick, each rule computes a
//! force for every entity against the same snapshot; the forces are weighted,
//! summed, and only then integrated into velocity and position.
//!
//! Neighbor search is all-pairs, O(R * N^2) per tick. That's fine for a few
//! hundred entities and is the known scaling limit of this engine.

pub mod rule_set;
pub mod rules;
pub mod spawn;
pub mod swarm;

pub use rule_set::{RuleSet, RuleSets};
pub use rules::{
    AlignmentRule, BoundingBoxRule, CohesionRule, InteractionWeights, SeparationRule, SteeringRule,
};
pub use spawn::{random_in_unit_ball, random_unit_vector, Population};
pub use swarm::{Swarm, SwarmParams};
