use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Handle to a registered species. Used as the key of every interaction
/// weight table, so equality and hashing are by registration slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpeciesId(u32);

impl SpeciesId {
    pub const fn new(index: u32) -> Self {
        SpeciesId(index)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Per-species constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    /// Speed that steering rules scale their desired velocity to.
    pub max_speed: f32,
}

impl Species {
    pub fn new(name: impl Into<String>, max_speed: f32) -> Self {
        Species {
            name: name.into(),
            max_speed,
        }
    }
}

/// Owns every species known to a swarm.
///
/// Registration is first-occurrence-wins: registering a name twice returns
/// the existing handle and keeps the existing constants.
#[derive(Debug, Clone, Default)]
pub struct SpeciesRegistry {
    species: Vec<Species>,
    by_name: HashMap<String, SpeciesId>,
}

impl SpeciesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, species: Species) -> SpeciesId {
        if let Some(existing) = self.by_name.get(&species.name) {
            warn!(
                "Species '{}' is already registered; ignoring the duplicate definition",
                species.name
            );
            return *existing;
        }

        let id = SpeciesId(self.species.len() as u32);
        self.by_name.insert(species.name.clone(), id);
        self.species.push(species);
        id
    }

    pub fn get(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(id.index())
    }

    /// Mutable access for tooling that edits species constants between ticks.
    pub fn get_mut(&mut self, id: SpeciesId) -> Option<&mut Species> {
        self.species.get_mut(id.index())
    }

    pub fn id_of(&self, name: &str) -> Option<SpeciesId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, id: SpeciesId) -> bool {
        id.index() < self.species.len()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<SpeciesId> {
        (0..self.species.len() as u32).map(SpeciesId).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpeciesId, &Species)> {
        self.species
            .iter()
            .enumerate()
            .map(|(idx, species)| (SpeciesId(idx as u32), species))
    }
}
