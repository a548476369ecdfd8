//! Turns a loaded `SwarmConfig` into the runtime registry, rule sets and
//! populations a `Swarm` is built from.

use log::{info, warn};
use rand::Rng;
use std::collections::HashSet;

use swarmlab_core::{Species, SpeciesRegistry, Vec3};
use swarmlab_simulation::{
    AlignmentRule, BoundingBoxRule, CohesionRule, InteractionWeights, Population, RuleSets,
    SeparationRule, SteeringRule, Swarm, SwarmParams,
};

use crate::types::{Interactions, RuleConfig, SwarmConfig};

/// Everything needed to start, or restart, a swarm.
#[derive(Debug)]
pub struct SwarmBlueprint {
    pub registry: SpeciesRegistry,
    pub rule_sets: RuleSets,
    pub populations: Vec<Population>,
    pub params: SwarmParams,
    pub initial_speed: f32,
}

impl SwarmBlueprint {
    /// Builds a swarm and spawns its initial populations.
    pub fn instantiate<R: Rng + ?Sized>(self, rng: &mut R) -> Swarm {
        let mut swarm = Swarm::new(self.registry, self.rule_sets, self.params);
        let spawned = swarm.populate(&self.populations, self.initial_speed, rng);
        info!("Swarm initialized with {} entities", spawned);
        swarm
    }

    /// Applies a rebuilt configuration to a running swarm. Existing entities
    /// keep their state; populations are not respawned.
    pub fn apply_to(self, swarm: &mut Swarm) {
        swarm.reconfigure(self.registry, self.rule_sets);
        *swarm.params_mut() = self.params;
    }
}

impl SwarmConfig {
    pub fn swarm_params(&self) -> SwarmParams {
        SwarmParams {
            max_velocity: self.simulation.max_velocity,
            turn_rate: self.simulation.turn_rate,
            orientation_threshold: self.simulation.orientation_threshold,
            parallel: self.simulation.parallel,
        }
    }

    /// Builds the derived indices. Duplicate species are ignored after their
    /// first occurrence, and interactions naming unknown species are dropped.
    pub fn build(&self) -> SwarmBlueprint {
        let mut registry = SpeciesRegistry::new();
        for species in &self.species {
            registry.register(Species::new(species.name.clone(), species.max_speed));
        }

        let mut rule_sets = RuleSets::new();
        let mut populations = Vec::new();
        let mut seen = HashSet::new();

        for species in &self.species {
            if !seen.insert(species.name.as_str()) {
                warn!("Duplicate species '{}' in configuration ignored", species.name);
                continue;
            }
            let Some(id) = registry.id_of(&species.name) else {
                continue;
            };

            let rules: Vec<Box<dyn SteeringRule>> = species
                .rules
                .iter()
                .map(|rule| build_rule(rule, &species.name, &registry))
                .collect();
            rule_sets.insert(id, rules);

            populations.push(Population {
                species: id,
                count: species.count,
                spawn_offset: Vec3::from_array(species.spawn_offset),
                spawn_radius: species.spawn_radius,
            });
        }

        rule_sets.sync_species(&registry.ids());
        info!(
            "Built {} species with {} rules",
            registry.len(),
            rule_sets.rule_count()
        );

        SwarmBlueprint {
            registry,
            rule_sets,
            populations,
            params: self.swarm_params(),
            initial_speed: self.simulation.initial_speed,
        }
    }
}

fn build_rule(rule: &RuleConfig, owner: &str, registry: &SpeciesRegistry) -> Box<dyn SteeringRule> {
    match rule {
        RuleConfig::Cohesion(c) => Box::new(CohesionRule {
            global_weight: c.weight,
            vision_radius: c.vision_radius,
            max_force: c.max_force,
            weights: resolve_interactions(&c.interactions, owner, rule.kind(), registry),
        }),
        RuleConfig::Separation(c) => Box::new(SeparationRule {
            global_weight: c.weight,
            min_distance: c.min_distance,
            max_force: c.max_force,
            weights: resolve_interactions(&c.interactions, owner, rule.kind(), registry),
        }),
        RuleConfig::Alignment(c) => Box::new(AlignmentRule {
            global_weight: c.weight,
            neighbor_radius: c.neighbor_radius,
            max_force: c.max_force,
            weights: resolve_interactions(&c.interactions, owner, rule.kind(), registry),
        }),
        RuleConfig::BoundingBox(c) => Box::new(BoundingBoxRule {
            global_weight: c.weight,
            center: Vec3::from_array(c.center),
            size: Vec3::from_array(c.size),
            edge_threshold: c.edge_threshold,
            max_force: c.max_force,
            weights: InteractionWeights::new(),
        }),
    }
}

fn resolve_interactions(
    interactions: &Interactions,
    owner: &str,
    kind: &str,
    registry: &SpeciesRegistry,
) -> InteractionWeights {
    interactions
        .iter()
        .filter_map(|(name, weight)| match registry.id_of(name) {
            Some(id) => Some((id, *weight)),
            None => {
                warn!(
                    "{} rule of '{}' references unknown species '{}'; ignored",
                    kind, owner, name
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_json;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ZOMBIES: &str = r#"{
      "simulation": { "max_velocity": 8.0, "seed": 4 },
      "species": [
        {
          "name": "human", "max_speed": 4.0, "count": 20,
          "spawn_offset": [10.0, 0.0, 0.0], "spawn_radius": 3.0,
          "rules": [
            { "rule": "cohesion", "interactions": { "human": 1.0 } },
            { "rule": "separation", "weight": 2.0, "interactions": { "human": 0.5, "zombie": 3.0 } },
            { "rule": "bounding_box", "size": [40.0, 40.0, 40.0] }
          ]
        },
        {
          "name": "zombie", "max_speed": 2.0, "count": 5, "spawn_radius": 1.0,
          "rules": [
            { "rule": "cohesion", "vision_radius": 50.0, "interactions": { "human": 1.0, "ghost": 9.0 } }
          ]
        },
        { "name": "human", "max_speed": 99.0, "count": 100 }
      ]
    }"#;

    #[test]
    fn builds_registry_rules_and_populations() {
        let config = parse_json(ZOMBIES).unwrap();
        let blueprint = config.build();

        assert_eq!(blueprint.registry.len(), 2);
        let human = blueprint.registry.id_of("human").unwrap();
        let zombie = blueprint.registry.id_of("zombie").unwrap();
        assert_eq!(blueprint.registry.get(human).map(|s| s.max_speed), Some(4.0));

        let human_rules = blueprint.rule_sets.get(human).unwrap();
        assert_eq!(human_rules.len(), 3);
        assert_eq!(human_rules[1].global_weight(), 2.0);
        assert_eq!(human_rules[1].weight_for(zombie), 3.0);

        let zombie_rules = blueprint.rule_sets.get(zombie).unwrap();
        assert_eq!(zombie_rules[0].weight_for(human), 1.0);
        // Unknown "ghost" dropped; table padded to one row per species.
        assert_eq!(zombie_rules[0].weights().len(), 2);

        assert_eq!(blueprint.populations.len(), 2);
        assert_eq!(blueprint.populations[0].count, 20);
        assert_eq!(blueprint.params.max_velocity, 8.0);
    }

    #[test]
    fn instantiate_spawns_configured_counts() {
        let blueprint = parse_json(ZOMBIES).unwrap().build();
        let swarm = blueprint.instantiate(&mut StdRng::seed_from_u64(4));

        assert_eq!(swarm.len(), 25);
        let human = swarm.registry().id_of("human").unwrap();
        let humans = swarm.entities().iter().filter(|e| e.species() == human).count();
        assert_eq!(humans, 20);
    }

    #[test]
    fn apply_to_swaps_configuration_in_place() {
        let mut swarm = parse_json(ZOMBIES)
            .unwrap()
            .build()
            .instantiate(&mut StdRng::seed_from_u64(4));

        let mut config = parse_json(ZOMBIES).unwrap();
        config.species.retain(|s| s.name == "zombie");
        config.simulation.max_velocity = 1.5;
        config.build().apply_to(&mut swarm);

        assert_eq!(swarm.len(), 5);
        assert_eq!(swarm.params().max_velocity, 1.5);
        assert!(swarm.registry().id_of("human").is_none());
    }
}
