//! Reactions and the domain-conservation check.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::connector::ConnectorId;
use super::domain::{DomainRef, DomainRefVec, DomainRegistry};
use super::structure::StructureId;
use crate::error::{CompileError, Result};

/// Kinetic classification, taken from the statement keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReactionKind {
    /// Single irreversible step (`kinetic`, `irreversible`)
    Irreversible,
    /// Forward and reverse step (`reversible`)
    Reversible,
    /// A species is consumed and regenerated (`catalytic`)
    Catalytic,
}

impl ReactionKind {
    /// Parse a reaction keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "kinetic" | "irreversible" => Some(Self::Irreversible),
            "reversible" => Some(Self::Reversible),
            "catalytic" => Some(Self::Catalytic),
            _ => None,
        }
    }

    /// How many rate constants a statement of this kind may carry.
    pub fn max_rates(&self) -> usize {
        match self {
            Self::Reversible => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Irreversible => write!(f, "irreversible"),
            Self::Reversible => write!(f, "reversible"),
            Self::Catalytic => write!(f, "catalytic"),
        }
    }
}

/// A reaction participant: a declared structure, or a connector acting
/// as a free single-stranded signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Species {
    Structure(StructureId),
    Signal(ConnectorId),
}

/// Rate constants as declared in the description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rates {
    pub forward: f64,
    pub reverse: Option<f64>,
}

/// A validated, domain-conserving reaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reaction {
    pub kind: ReactionKind,
    pub reactants: Vec<Species>,
    pub products: Vec<Species>,
    pub rates: Option<Rates>,
    pub line: usize,
}

impl Reaction {
    /// Species present on both sides.
    pub fn catalysts(&self) -> Vec<Species> {
        let mut shared: Vec<Species> = self
            .reactants
            .iter()
            .filter(|s| self.products.contains(s))
            .copied()
            .collect();
        shared.sort_unstable();
        shared.dedup();
        shared
    }
}

/// Anything that can expand a species into its domain occurrences.
pub trait SpeciesDomains {
    fn registry(&self) -> &DomainRegistry;
    fn species_domains(&self, species: &Species) -> DomainRefVec;
}

/// Multiset of oriented domain occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainMultiset {
    counts: BTreeMap<DomainRef, usize>,
}

impl DomainMultiset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, domain: DomainRef) {
        *self.counts.entry(domain).or_insert(0) += 1;
    }

    pub fn extend(&mut self, domains: impl IntoIterator<Item = DomainRef>) {
        for d in domains {
            self.add(d);
        }
    }

    pub fn count(&self, domain: &DomainRef) -> usize {
        self.counts.get(domain).copied().unwrap_or(0)
    }

    /// Total number of occurrences.
    pub fn len(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Signed surplus of `self` over `other` for every unequal entry.
    pub fn surplus(&self, other: &DomainMultiset) -> Vec<(DomainRef, i64)> {
        let mut keys: Vec<&DomainRef> = self.counts.keys().chain(other.counts.keys()).collect();
        keys.sort_unstable();
        keys.dedup();
        keys.into_iter()
            .filter_map(|d| {
                let diff = self.count(d) as i64 - other.count(d) as i64;
                (diff != 0).then_some((*d, diff))
            })
            .collect()
    }
}

impl FromIterator<DomainRef> for DomainMultiset {
    fn from_iter<I: IntoIterator<Item = DomainRef>>(iter: I) -> Self {
        let mut set = DomainMultiset::new();
        set.extend(iter);
        set
    }
}

/// Checks domain conservation of declared reactions.
pub struct ReactionBalancer<'a, S: SpeciesDomains> {
    source: &'a S,
}

impl<'a, S: SpeciesDomains> ReactionBalancer<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Multiset of every domain occurrence over a list of species.
    pub fn multiset(&self, species: &[Species]) -> DomainMultiset {
        species
            .iter()
            .flat_map(|s| self.source.species_domains(s))
            .collect()
    }

    /// Build the reaction if reactants and products hold the same domains.
    pub fn check(
        &self,
        kind: ReactionKind,
        reactants: Vec<Species>,
        products: Vec<Species>,
        rates: Option<Rates>,
        line: usize,
    ) -> Result<Reaction> {
        let left = self.multiset(&reactants);
        let right = self.multiset(&products);
        let surplus = left.surplus(&right);

        if !surplus.is_empty() {
            let registry = self.source.registry();
            let mut unmatched: Vec<(String, String)> = surplus
                .iter()
                .map(|(d, diff)| {
                    let name = registry.display_ref(d);
                    let text = format!("{name} ({diff:+})");
                    (name, text)
                })
                .collect();
            unmatched.sort();
            return Err(CompileError::Balance {
                line,
                unmatched: unmatched.into_iter().map(|(_, text)| text).collect(),
            });
        }

        Ok(Reaction {
            kind,
            reactants,
            products,
            rates,
            line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::domain::{DomainId, LengthClass};

    struct Toy {
        registry: DomainRegistry,
        species: Vec<DomainRefVec>,
    }

    impl SpeciesDomains for Toy {
        fn registry(&self) -> &DomainRegistry {
            &self.registry
        }

        fn species_domains(&self, species: &Species) -> DomainRefVec {
            match species {
                Species::Structure(id) => self.species[id.0].clone(),
                Species::Signal(id) => self.species[id.0].clone(),
            }
        }
    }

    fn toy() -> Toy {
        let mut registry = DomainRegistry::new();
        for name in ["a", "b", "c"] {
            registry.declare(name, LengthClass::Fixed(6), None, 1).unwrap();
        }
        let d = |i: usize| DomainRef::sense(DomainId(i));
        Toy {
            registry,
            species: vec![
                vec![d(0), d(1).complement()],          // 0: gate
                vec![d(1)],                             // 1: input
                vec![d(0), d(1), d(1).complement()],    // 2: waste
                vec![d(2)],                             // 3: unrelated
            ],
        }
    }

    #[test]
    fn test_keywords() {
        assert_eq!(ReactionKind::from_keyword("kinetic"), Some(ReactionKind::Irreversible));
        assert_eq!(ReactionKind::from_keyword("Reversible"), Some(ReactionKind::Reversible));
        assert_eq!(ReactionKind::from_keyword("catalytic"), Some(ReactionKind::Catalytic));
        assert_eq!(ReactionKind::from_keyword("sometimes"), None);
        assert_eq!(ReactionKind::Reversible.max_rates(), 2);
    }

    #[test]
    fn test_balanced_reaction() {
        let toy = toy();
        let balancer = ReactionBalancer::new(&toy);
        let s = |i| Species::Structure(StructureId(i));
        let r = balancer
            .check(ReactionKind::Irreversible, vec![s(0), s(1)], vec![s(2)], None, 7)
            .unwrap();
        assert_eq!(r.line, 7);
        assert!(r.catalysts().is_empty());
    }

    #[test]
    fn test_unbalanced_reports_both_sides() {
        let toy = toy();
        let balancer = ReactionBalancer::new(&toy);
        let s = |i| Species::Structure(StructureId(i));
        match balancer.check(ReactionKind::Irreversible, vec![s(0), s(3)], vec![s(2)], None, 9) {
            Err(CompileError::Balance { line, unmatched }) => {
                assert_eq!(line, 9);
                assert_eq!(
                    unmatched,
                    vec!["b (-1)".to_string(), "c (+1)".to_string()]
                );
            }
            other => panic!("expected balance error, got {other:?}"),
        }
    }

    #[test]
    fn test_orientation_counts() {
        let a = DomainRef::sense(DomainId(0));
        let left: DomainMultiset = [a, a].into_iter().collect();
        let right: DomainMultiset = [a, a.complement()].into_iter().collect();
        assert_eq!(left.len(), right.len());
        assert_eq!(left.surplus(&right), vec![(a, 1), (a.complement(), -1)]);
    }

    #[test]
    fn test_catalysts() {
        let s = |i| Species::Structure(StructureId(i));
        let r = Reaction {
            kind: ReactionKind::Catalytic,
            reactants: vec![s(0), s(1)],
            products: vec![s(0), s(2)],
            rates: None,
            line: 1,
        };
        assert_eq!(r.catalysts(), vec![s(0)]);
    }
}
