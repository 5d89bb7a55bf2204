//! Unified reaction network of a composed circuit.

use serde::Serialize;

use crate::component::{DomainMultiset, DomainRef, Rates, ReactionKind};

/// One chemical species of the circuit.
///
/// `domains` refer to the circuit's merged domain table, so two species
/// from different components share domain ids when their domains were
/// unified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSpecies {
    /// `component.name`; a bound input uses the producing output's name
    pub name: String,
    pub domains: Vec<DomainRef>,
    /// True for free single-stranded signals (connectors)
    pub signal: bool,
}

/// A reaction over network species.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkReaction {
    /// Component that declared the reaction
    pub component: String,
    pub kind: ReactionKind,
    pub reactants: Vec<usize>,
    pub products: Vec<usize>,
    pub rates: Option<Rates>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReactionNetwork {
    pub species: Vec<NetworkSpecies>,
    pub reactions: Vec<NetworkReaction>,
}

impl ReactionNetwork {
    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s.name == name)
    }

    fn multiset(&self, species: &[usize]) -> DomainMultiset {
        species
            .iter()
            .flat_map(|&s| self.species[s].domains.iter().copied())
            .collect()
    }

    /// Every reaction conserves merged domains.
    pub fn is_conserved(&self) -> bool {
        self.reactions
            .iter()
            .all(|r| self.multiset(&r.reactants) == self.multiset(&r.products))
    }

    /// Render one reaction with species names.
    pub fn describe(&self, reaction: &NetworkReaction) -> String {
        let side = |ids: &[usize]| {
            ids.iter()
                .map(|&i| self.species[i].name.as_str())
                .collect::<Vec<_>>()
                .join(" + ")
        };
        format!("{} -> {}", side(&reaction.reactants), side(&reaction.products))
    }
}
