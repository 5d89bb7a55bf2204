//! Domains and the per-component domain registry.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::{CompileError, Result};

/// Index of a domain inside one component's [`DomainRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DomainId(pub usize);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Symbolic length of a domain.
///
/// Concrete nucleotide counts for parameters are assigned by sequence
/// design, never by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum LengthClass {
    /// A component length parameter such as `long` or `short`
    Param(String),
    /// A literal nucleotide count
    Fixed(u32),
}

impl LengthClass {
    /// Zero-length domains are allowed but cannot repeat within a strand.
    pub fn is_zero(&self) -> bool {
        matches!(self, LengthClass::Fixed(0))
    }
}

impl fmt::Display for LengthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthClass::Param(name) => write!(f, "{name}"),
            LengthClass::Fixed(n) => write!(f, "{n}"),
        }
    }
}

/// Direction a domain is read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Orientation {
    Sense,
    Complement,
}

impl Orientation {
    pub fn flip(self) -> Self {
        match self {
            Orientation::Sense => Orientation::Complement,
            Orientation::Complement => Orientation::Sense,
        }
    }

    pub fn from_marker(complement: bool) -> Self {
        if complement {
            Orientation::Complement
        } else {
            Orientation::Sense
        }
    }
}

/// A named unit of sequence. Its complement is implicit: same name,
/// same length, opposite orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Domain {
    pub name: String,
    pub length: LengthClass,
    /// Optional IUPAC constraint; `None` means unconstrained.
    pub constraint: Option<String>,
    pub line: usize,
}

impl Domain {
    /// The constraint, unless it leaves every nucleotide open (`N`).
    pub fn pattern(&self) -> Option<&str> {
        self.constraint
            .as_deref()
            .filter(|c| !c.chars().all(|b| b == 'N'))
    }

    /// True when the constraint pins every nucleotide.
    pub fn is_fixed(&self) -> bool {
        self.constraint
            .as_ref()
            .is_some_and(|c| c.chars().all(|b| matches!(b, 'A' | 'C' | 'G' | 'T' | 'U')))
    }
}

/// An oriented occurrence of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DomainRef {
    pub id: DomainId,
    pub orientation: Orientation,
}

impl DomainRef {
    pub fn new(id: DomainId, orientation: Orientation) -> Self {
        Self { id, orientation }
    }

    pub fn sense(id: DomainId) -> Self {
        Self::new(id, Orientation::Sense)
    }

    /// The same domain read in the opposite direction.
    pub fn complement(&self) -> Self {
        Self::new(self.id, self.orientation.flip())
    }
}

/// Vector of domain references (one strand, connector, or species).
pub type DomainRefVec = Vec<DomainRef>;

/// Reverse complement of a domain sequence.
pub fn reverse_complement(domains: &[DomainRef]) -> DomainRefVec {
    domains.iter().rev().map(DomainRef::complement).collect()
}

/// Owns every domain declared by one component.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomainRegistry {
    domains: Vec<Domain>,
    #[serde(skip)]
    index: HashMap<String, DomainId>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new domain.
    pub fn declare(
        &mut self,
        name: &str,
        length: LengthClass,
        constraint: Option<String>,
        line: usize,
    ) -> Result<DomainId> {
        if let Some(existing) = self.index.get(name) {
            return Err(CompileError::DuplicateDeclaration {
                name: name.to_string(),
                line,
                first_line: self.domains[existing.0].line,
            });
        }
        let id = DomainId(self.domains.len());
        self.domains.push(Domain {
            name: name.to_string(),
            length,
            constraint,
            line,
        });
        self.index.insert(name.to_string(), id);
        Ok(id)
    }

    /// Look up a domain by name.
    pub fn get(&self, name: &str) -> Option<DomainId> {
        self.index.get(name).copied()
    }

    /// Look up a domain by name, failing on undeclared names.
    pub fn resolve(&self, name: &str, line: usize) -> Result<DomainId> {
        self.get(name).ok_or_else(|| CompileError::UnknownDomain {
            name: name.to_string(),
            line,
            hint: String::new(),
        })
    }

    /// The domain behind an id handed out by this registry.
    pub fn domain(&self, id: DomainId) -> &Domain {
        &self.domains[id.0]
    }

    /// The complement of an oriented reference.
    pub fn complement_of(&self, domain: &DomainRef) -> DomainRef {
        debug_assert!(domain.id.0 < self.domains.len());
        domain.complement()
    }

    /// Two references can pair iff they name the same domain in opposite orientations.
    pub fn are_complements(&self, a: &DomainRef, b: &DomainRef) -> bool {
        a.id == b.id && a.orientation != b.orientation
    }

    /// Source form of a reference: `a` or `a*`.
    pub fn display_ref(&self, domain: &DomainRef) -> String {
        let name = &self.domain(domain.id).name;
        match domain.orientation {
            Orientation::Sense => name.clone(),
            Orientation::Complement => format!("{name}*"),
        }
    }

    /// Source form of a sequence of references.
    pub fn display_seq(&self, domains: &[DomainRef]) -> String {
        domains
            .iter()
            .map(|d| self.display_ref(d))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn iter(&self) -> impl Iterator<Item = (DomainId, &Domain)> {
        self.domains.iter().enumerate().map(|(i, d)| (DomainId(i), d))
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
