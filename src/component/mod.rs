//! Compiled component model.
//!
//! A [`Component`] is built once from a parsed description by
//! [`compile`] and is immutable afterwards. Every table is indexed by the
//! matching id type (`DomainId`, `StrandId`, ...), so cross references
//! inside a component are plain indices.

mod compile;
mod connector;
mod domain;
mod reaction;
mod strand;
mod structure;
mod validate;

pub use compile::{compile, compile_str, Compilation};
pub use connector::{Connector, ConnectorId, ConnectorRole};
pub use domain::{
    reverse_complement, Domain, DomainId, DomainRef, DomainRefVec, DomainRegistry, LengthClass,
    Orientation,
};
pub use reaction::{
    DomainMultiset, Rates, Reaction, ReactionBalancer, ReactionKind, Species, SpeciesDomains,
};
pub use strand::{Strand, StrandBuilder, StrandId};
pub use structure::{NotationError, Pair, PairGraph, Structure, StructureBuilder, StructureId};
pub use validate::lint;

use std::collections::BTreeSet;

use serde::Serialize;

/// One compiled strand-displacement component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub name: String,
    /// Symbolic length parameters from the header
    pub params: Vec<String>,
    /// Line of the `declare component` header
    pub line: usize,
    pub domains: DomainRegistry,
    pub connectors: Vec<Connector>,
    pub strands: Vec<Strand>,
    pub structures: Vec<Structure>,
    pub reactions: Vec<Reaction>,
}

impl Component {
    /// Create an empty component shell.
    pub fn new(name: impl Into<String>, params: Vec<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            params,
            line,
            domains: DomainRegistry::new(),
            connectors: Vec::new(),
            strands: Vec::new(),
            structures: Vec::new(),
            reactions: Vec::new(),
        }
    }

    pub fn connector(&self, id: ConnectorId) -> &Connector {
        &self.connectors[id.0]
    }

    pub fn strand(&self, id: StrandId) -> &Strand {
        &self.strands[id.0]
    }

    pub fn structure(&self, id: StructureId) -> &Structure {
        &self.structures[id.0]
    }

    /// Find a connector by name.
    pub fn find_connector(&self, name: &str) -> Option<ConnectorId> {
        self.connectors
            .iter()
            .position(|c| c.name == name)
            .map(ConnectorId)
    }

    /// Find a strand by name.
    pub fn find_strand(&self, name: &str) -> Option<StrandId> {
        self.strands.iter().position(|s| s.name == name).map(StrandId)
    }

    /// Find a structure by name.
    pub fn find_structure(&self, name: &str) -> Option<StructureId> {
        self.structures
            .iter()
            .position(|s| s.name == name)
            .map(StructureId)
    }

    fn with_role(&self, role: ConnectorRole) -> impl Iterator<Item = (ConnectorId, &Connector)> {
        self.connectors
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.role == role)
            .map(|(i, c)| (ConnectorId(i), c))
    }

    /// Input connectors in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = (ConnectorId, &Connector)> {
        self.with_role(ConnectorRole::Input)
    }

    /// Output connectors in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = (ConnectorId, &Connector)> {
        self.with_role(ConnectorRole::Output)
    }

    /// Domains that occur in no input or output connector.
    ///
    /// They are validated exactly like exposed domains; this only reports
    /// which part of the sequence never crosses the component boundary.
    pub fn internal_domains(&self) -> Vec<DomainId> {
        let exposed: BTreeSet<DomainId> = self
            .connectors
            .iter()
            .filter(|c| c.is_external())
            .flat_map(|c| c.domains.iter().map(|d| d.id))
            .collect();
        self.domains
            .iter()
            .map(|(id, _)| id)
            .filter(|id| !exposed.contains(id))
            .collect()
    }

    /// Display name of a species.
    pub fn species_name(&self, species: &Species) -> &str {
        match species {
            Species::Structure(id) => &self.structure(*id).name,
            Species::Signal(id) => &self.connector(*id).name,
        }
    }
}

impl SpeciesDomains for Component {
    fn registry(&self) -> &DomainRegistry {
        &self.domains
    }

    fn species_domains(&self, species: &Species) -> DomainRefVec {
        match species {
            Species::Structure(id) => self.structure(*id).domains(&self.strands),
            Species::Signal(id) => self.connector(*id).domains.clone(),
        }
    }
}
