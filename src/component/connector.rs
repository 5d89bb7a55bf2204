//! I/O connectors: the domain sequences a component exposes.

use std::fmt;

use serde::Serialize;

use super::domain::DomainRefVec;

/// Index of a connector inside one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConnectorId(pub usize);

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Which side of the component boundary a connector sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConnectorRole {
    Input,
    Output,
    /// Composite sequence not named in the header; usable inside the
    /// component but not exported.
    Internal,
}

impl fmt::Display for ConnectorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorRole::Input => write!(f, "input"),
            ConnectorRole::Output => write!(f, "output"),
            ConnectorRole::Internal => write!(f, "internal"),
        }
    }
}

/// A named, oriented domain sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connector {
    pub name: String,
    pub role: ConnectorRole,
    pub domains: DomainRefVec,
    pub line: usize,
}

impl Connector {
    pub fn is_external(&self) -> bool {
        self.role != ConnectorRole::Internal
    }
}
