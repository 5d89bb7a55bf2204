//! Core types for circuit composition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Index of a component inside one composer or circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentIdx(pub usize);

impl fmt::Display for ComponentIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// A connector named from outside its component: `component.connector`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectorRef {
    pub component: String,
    pub connector: String,
}

impl ConnectorRef {
    pub fn new(component: impl Into<String>, connector: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            connector: connector.into(),
        }
    }
}

impl fmt::Display for ConnectorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.connector)
    }
}

impl FromStr for ConnectorRef {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().split_once('.') {
            Some((component, connector))
                if !component.is_empty() && !connector.is_empty() && !connector.contains('.') =>
            {
                Ok(Self::new(component, connector))
            }
            _ => Err(format!("expected 'component.connector', found '{s}'")),
        }
    }
}

/// One output connector feeding one input connector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub output: ConnectorRef,
    pub input: ConnectorRef,
}

impl Binding {
    pub fn new(output: ConnectorRef, input: ConnectorRef) -> Self {
        Self { output, input }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.output, self.input)
    }
}

/// Command-line form: `producer.OUT=consumer.IN`.
impl FromStr for Binding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (output, input) = s
            .split_once('=')
            .ok_or_else(|| format!("expected 'component.OUT=component.IN', found '{s}'"))?;
        Ok(Self::new(output.parse()?, input.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binding() {
        let b: Binding = "leakless_and.F=leakless_translate.AB".parse().unwrap();
        assert_eq!(b.output, ConnectorRef::new("leakless_and", "F"));
        assert_eq!(b.input.connector, "AB");
        assert_eq!(b.to_string(), "leakless_and.F -> leakless_translate.AB");
    }

    #[test]
    fn test_reject_malformed() {
        assert!("F".parse::<ConnectorRef>().is_err());
        assert!(".F".parse::<ConnectorRef>().is_err());
        assert!("a.b.c".parse::<ConnectorRef>().is_err());
        assert!("a.F".parse::<Binding>().is_err());
        assert!("a.F=b".parse::<Binding>().is_err());
    }
}
