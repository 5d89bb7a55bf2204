//! Strands: ordered domain sequences forming one physical molecule.

use std::fmt;

use serde::Serialize;

use super::domain::{DomainRef, DomainRefVec, DomainRegistry};
use crate::error::{CompileError, Result};

/// Index of a strand inside one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StrandId(pub usize);

impl fmt::Display for StrandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// One strand, domains listed from the 5' end to the 3' end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Strand {
    pub name: String,
    pub domains: DomainRefVec,
    pub line: usize,
}

impl Strand {
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Domain at the 5' end.
    pub fn five_prime(&self) -> Option<&DomainRef> {
        self.domains.first()
    }

    /// Domain at the 3' end.
    pub fn three_prime(&self) -> Option<&DomainRef> {
        self.domains.last()
    }
}

/// Builds strands against a registry.
pub struct StrandBuilder<'r> {
    registry: &'r DomainRegistry,
}

impl<'r> StrandBuilder<'r> {
    pub fn new(registry: &'r DomainRegistry) -> Self {
        Self { registry }
    }

    /// Build a strand from resolved references.
    pub fn build(&self, name: &str, domains: DomainRefVec, line: usize) -> Result<Strand> {
        let degenerate = |message: String| CompileError::DegenerateStrand {
            strand: name.to_string(),
            line,
            message,
        };

        if domains.is_empty() {
            return Err(degenerate("strand has no domains".to_string()));
        }

        for (i, d) in domains.iter().enumerate() {
            if !self.registry.domain(d.id).length.is_zero() {
                continue;
            }
            if let Some(j) = domains[i + 1..].iter().position(|e| e == d) {
                return Err(degenerate(format!(
                    "zero-length domain '{}' repeats at positions {} and {}",
                    self.registry.display_ref(d),
                    i + 1,
                    i + j + 2
                )));
            }
        }

        Ok(Strand {
            name: name.to_string(),
            domains,
            line,
        })
    }
}
