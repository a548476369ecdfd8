//! Initial population generation.

use log::{info, warn};
use rand::Rng;

use swarmlab_core::{SpeciesId, Vec3};

use crate::swarm::Swarm;

/// How many entities of one species to create, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    pub species: SpeciesId,
    pub count: usize,
    /// Center of the spawn sphere.
    pub spawn_offset: Vec3,
    pub spawn_radius: f32,
}

/// Uniform point inside the unit ball.
pub fn random_in_unit_ball<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

/// Uniform direction on the unit sphere.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        if let Some(dir) = random_in_unit_ball(rng).try_normalize() {
            return dir;
        }
    }
}

impl Swarm {
    /// Spawns every population in order. Each entity starts somewhere in its
    /// population's spawn sphere, moving in a random direction at
    /// `initial_speed`. Returns how many entities were created.
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        populations: &[Population],
        initial_speed: f32,
        rng: &mut R,
    ) -> usize {
        let mut spawned = 0;

        for population in populations {
            let Some(name) = self.registry().get(population.species).map(|s| s.name.clone()) else {
                warn!(
                    "Skipping population of {} for unregistered species {:?}",
                    population.count, population.species
                );
                continue;
            };

            info!("Creating {} '{}' entities", population.count, name);
            for _ in 0..population.count {
                let position =
                    population.spawn_offset + random_in_unit_ball(rng) * population.spawn_radius;
                let velocity = random_unit_vector(rng) * initial_speed;
                if self.spawn(population.species, position, velocity).is_some() {
                    spawned += 1;
                }
            }
        }

        spawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_set::RuleSets;
    use crate::swarm::SwarmParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use swarmlab_core::{Species, SpeciesRegistry};

    #[test]
    fn entities_land_inside_their_sphere() {
        let mut registry = SpeciesRegistry::new();
        let fish = registry.register(Species::new("fish", 3.0));
        let shark = registry.register(Species::new("shark", 6.0));
        let mut swarm = Swarm::new(registry, RuleSets::new(), SwarmParams::default());

        let populations = vec![
            Population {
                species: fish,
                count: 40,
                spawn_offset: Vec3::new(10.0, 0.0, 0.0),
                spawn_radius: 2.0,
            },
            Population {
                species: shark,
                count: 3,
                spawn_offset: Vec3::ZERO,
                spawn_radius: 0.5,
            },
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let spawned = swarm.populate(&populations, 2.0, &mut rng);

        assert_eq!(spawned, 43);
        for entity in swarm.entities() {
            let population = populations
                .iter()
                .find(|p| p.species == entity.species())
                .unwrap();
            assert!(entity.position.distance(population.spawn_offset) <= population.spawn_radius + 1e-4);
            assert!((entity.velocity.length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn unknown_species_population_is_skipped() {
        let mut swarm = Swarm::new(SpeciesRegistry::new(), RuleSets::new(), SwarmParams::default());
        let populations = vec![Population {
            species: SpeciesId::new(3),
            count: 10,
            spawn_offset: Vec3::ZERO,
            spawn_radius: 1.0,
        }];
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(swarm.populate(&populations, 1.0, &mut rng), 0);
        assert!(swarm.is_empty());
    }

    #[test]
    fn same_seed_same_swarm() {
        let build = || {
            let mut registry = SpeciesRegistry::new();
            let a = registry.register(Species::new("a", 1.0));
            let mut swarm = Swarm::new(registry, RuleSets::new(), SwarmParams::default());
            let populations = vec![Population {
                species: a,
                count: 5,
                spawn_offset: Vec3::ZERO,
                spawn_radius: 3.0,
            }];
            swarm.populate(&populations, 1.0, &mut StdRng::seed_from_u64(99));
            swarm.entities().to_vec()
        };
        assert_eq!(build(), build());
    }
}
