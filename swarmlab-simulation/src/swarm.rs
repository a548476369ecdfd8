//! The swarm owns every entity and advances them one tick at a time.
//!
//! A tick runs in two strict phases. The force phase reads a snapshot of the
//! whole swarm and produces one acceleration per entity without touching any
//! state. The integration phase then applies those accelerations. Because the
//! snapshot is only borrowed immutably while forces are computed, no entity
//! can observe a neighbor that has already moved this tick.

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use swarmlab_core::{
    clamp_magnitude, look_rotation, Entity, EntityId, EntityIdAllocator, NullSink, SpeciesId,
    SpeciesRegistry, TransformSink, Vec3,
};

use crate::rule_set::RuleSets;

/// Tunables of the integrator that aren't tied to a species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwarmParams {
    /// Safety ceiling on speed after forces are applied, independent of each
    /// species' `max_speed`.
    pub max_velocity: f32,
    /// How quickly orientation follows the direction of travel (per second).
    pub turn_rate: f32,
    /// Squared speed below which orientation is left alone.
    pub orientation_threshold: f32,
    /// Compute forces on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SwarmParams {
    fn default() -> Self {
        SwarmParams {
            max_velocity: 5.0,
            turn_rate: 5.0,
            orientation_threshold: 0.1,
            parallel: false,
        }
    }
}

/// Explicitly owned simulation context: species, rules and entities.
#[derive(Debug)]
pub struct Swarm {
    registry: SpeciesRegistry,
    rules: RuleSets,
    entities: Vec<Entity>,
    ids: EntityIdAllocator,
    params: SwarmParams,
    tick: u64,
    elapsed: f64,
}

impl Swarm {
    pub fn new(registry: SpeciesRegistry, rules: RuleSets, params: SwarmParams) -> Self {
        let swarm = Swarm {
            registry,
            rules,
            entities: Vec::new(),
            ids: EntityIdAllocator::new(),
            params,
            tick: 0,
            elapsed: 0.0,
        };
        swarm.report_uncovered_species();
        swarm
    }

    pub fn registry(&self) -> &SpeciesRegistry {
        &self.registry
    }

    /// Species constants may be edited between ticks; the next tick reads them.
    pub fn registry_mut(&mut self) -> &mut SpeciesRegistry {
        &mut self.registry
    }

    pub fn rules(&self) -> &RuleSets {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleSets {
        &mut self.rules
    }

    pub fn params(&self) -> &SwarmParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut SwarmParams {
        &mut self.params
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds across all completed ticks.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Adds an already-provisioned entity. Returns `None` if `species` isn't
    /// registered, since entities may only reference registered species.
    pub fn spawn(&mut self, species: SpeciesId, position: Vec3, velocity: Vec3) -> Option<EntityId> {
        if !self.registry.contains(species) {
            warn!("Refusing to spawn entity for unregistered species {:?}", species);
            return None;
        }
        let id = self.ids.allocate();
        self.entities.push(Entity::new(id, species, position, velocity));
        Some(id)
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let before = self.entities.len();
        self.entities.retain(|e| e.id() != id);
        self.entities.len() != before
    }

    /// Removes every entity. Ids keep counting up.
    pub fn clear(&mut self) {
        info!("Clearing swarm of {} entities", self.entities.len());
        self.entities.clear();
    }

    /// Swaps in a freshly built registry and rule sets.
    ///
    /// Entities are matched to the new registry by species name; entities
    /// whose species no longer exists are removed.
    pub fn reconfigure(&mut self, registry: SpeciesRegistry, rules: RuleSets) {
        let old = std::mem::replace(&mut self.registry, registry);
        self.rules = rules;

        let before = self.entities.len();
        let new_registry = &self.registry;
        self.entities.retain_mut(|entity| {
            let remapped = old
                .get(entity.species())
                .and_then(|species| new_registry.id_of(&species.name));
            match remapped {
                Some(id) => {
                    entity.reassign_species(id);
                    true
                }
                None => false,
            }
        });

        let dropped = before - self.entities.len();
        if dropped > 0 {
            warn!("Reconfiguration removed {} entities of species no longer configured", dropped);
        }
        info!(
            "Swarm reconfigured: {} species, {} rule sets",
            self.registry.len(),
            self.rules.len()
        );
        self.report_uncovered_species();
    }

    /// Sum of every rule's weighted force on `entity`, read against the
    /// current snapshot. Zero when the species or its rule set is missing.
    pub fn acceleration_for(&self, entity: &Entity) -> Vec3 {
        let Some(species) = self.registry.get(entity.species()) else {
            return Vec3::ZERO;
        };
        let Some(rules) = self.rules.get(entity.species()) else {
            return Vec3::ZERO;
        };

        rules.iter().fold(Vec3::ZERO, |total, rule| {
            total + rule.compute_force(entity, species, &self.entities) * rule.global_weight()
        })
    }

    /// Force phase: one acceleration per entity, in entity order.
    pub fn compute_accelerations(&self) -> Vec<Vec3> {
        if self.params.parallel {
            self.entities
                .par_iter()
                .map(|entity| self.acceleration_for(entity))
                .collect()
        } else {
            self.entities
                .iter()
                .map(|entity| self.acceleration_for(entity))
                .collect()
        }
    }

    /// Advances the swarm by `dt` seconds without reporting transforms.
    pub fn tick(&mut self, dt: f32) {
        self.step(dt, &mut NullSink);
    }

    /// Advances the swarm by `dt` seconds and reports each new transform to
    /// `sink`. A negative or non-finite `dt` skips the tick entirely.
    pub fn step(&mut self, dt: f32, sink: &mut dyn TransformSink) {
        if !dt.is_finite() || dt < 0.0 {
            warn!("Skipping tick with invalid dt {}", dt);
            return;
        }

        // Phase 1: every force comes from the same untouched snapshot.
        let accelerations = self.compute_accelerations();

        // Phase 2: commit all entities.
        let params = self.params;
        let turn = (dt * params.turn_rate).clamp(0.0, 1.0);
        let mut rejected = 0usize;

        for (entity, acceleration) in self.entities.iter_mut().zip(accelerations) {
            let acceleration = if acceleration.is_finite() {
                acceleration
            } else {
                rejected += 1;
                Vec3::ZERO
            };

            entity.velocity = clamp_magnitude(entity.velocity + acceleration * dt, params.max_velocity);
            entity.position += entity.velocity * dt;

            if entity.velocity.length_squared() > params.orientation_threshold {
                if let Some(target) = look_rotation(entity.velocity) {
                    entity.orientation = entity.orientation.slerp(target, turn).normalize();
                }
            }

            sink.update_transform(entity.id(), entity.position, entity.orientation);
        }

        if rejected > 0 {
            warn!("Discarded {} non-finite accelerations this tick", rejected);
        }

        self.tick += 1;
        self.elapsed += f64::from(dt);
        sink.end_tick(self.tick);
        debug!("Tick {} done for {} entities", self.tick, self.entities.len());
    }

    fn report_uncovered_species(&self) {
        for (id, species) in self.registry.iter() {
            if !self.rules.contains(id) {
                warn!(
                    "Species '{}' has no rule set; its entities drift under zero force",
                    species.name
                );
            }
        }
    }
}
