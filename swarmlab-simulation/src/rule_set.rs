use log::warn;
use smallvec::SmallVec;
use std::collections::HashMap;

use swarmlab_core::SpeciesId;

use crate::rules::SteeringRule;

/// Ordered rules for one species. Order fixes the summation order, nothing more.
pub type RuleSet = SmallVec<[Box<dyn SteeringRule>; 4]>;

/// Rule sets indexed by the species they steer.
///
/// Built once from configuration and read-only during ticks; rebuild it and
/// hand it to `Swarm::reconfigure` when configuration changes.
#[derive(Debug, Default)]
pub struct RuleSets {
    sets: HashMap<SpeciesId, RuleSet>,
}

impl RuleSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the rule set for `species`. The first set registered for a
    /// species wins; later ones are dropped and `false` is returned.
    pub fn insert<I>(&mut self, species: SpeciesId, rules: I) -> bool
    where
        I: IntoIterator<Item = Box<dyn SteeringRule>>,
    {
        if self.sets.contains_key(&species) {
            warn!("Rule set for {:?} already present; ignoring duplicate", species);
            return false;
        }
        self.sets.insert(species, rules.into_iter().collect());
        true
    }

    pub fn get(&self, species: SpeciesId) -> Option<&[Box<dyn SteeringRule>]> {
        self.sets.get(&species).map(|set| set.as_slice())
    }

    pub fn get_mut(&mut self, species: SpeciesId) -> Option<&mut RuleSet> {
        self.sets.get_mut(&species)
    }

    pub fn contains(&self, species: SpeciesId) -> bool {
        self.sets.contains_key(&species)
    }

    /// Brings every rule's weight table in line with the given species list.
    pub fn sync_species(&mut self, species: &[SpeciesId]) {
        for rule in self.sets.values_mut().flat_map(|set| set.iter_mut()) {
            rule.weights_mut().sync_species(species);
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total number of rule instances across all species.
    pub fn rule_count(&self) -> usize {
        self.sets.values().map(|set| set.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{BoundingBoxRule, CohesionRule, InteractionWeights};

    #[test]
    fn first_rule_set_wins() {
        let a = SpeciesId::new(0);
        let mut sets = RuleSets::new();

        let first: Vec<Box<dyn SteeringRule>> = vec![Box::new(BoundingBoxRule::default())];
        let second: Vec<Box<dyn SteeringRule>> = vec![
            Box::new(CohesionRule::new(InteractionWeights::new())),
            Box::new(BoundingBoxRule::default()),
        ];

        assert!(sets.insert(a, first));
        assert!(!sets.insert(a, second));
        assert_eq!(sets.get(a).map(|rules| rules.len()), Some(1));
        assert_eq!(sets.get(a).map(|rules| rules[0].name()), Some("bounding_box"));
    }

    #[test]
    fn missing_species_has_no_rules() {
        let sets = RuleSets::new();
        assert!(sets.get(SpeciesId::new(3)).is_none());
        assert!(sets.is_empty());
    }

    #[test]
    fn sync_reaches_every_rule() {
        let a = SpeciesId::new(0);
        let b = SpeciesId::new(1);
        let mut sets = RuleSets::new();
        let rules: Vec<Box<dyn SteeringRule>> = vec![
            Box::new(CohesionRule::new(InteractionWeights::new().with(a, 1.0))),
            Box::new(BoundingBoxRule::default()),
        ];
        sets.insert(a, rules);

        sets.sync_species(&[a, b]);

        for rule in sets.get(a).into_iter().flatten() {
            assert_eq!(rule.weights().len(), 2);
        }
        assert_eq!(sets.rule_count(), 2);
    }
}
