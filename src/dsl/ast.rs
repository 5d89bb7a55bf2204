//! Abstract Syntax Tree types for the component description language.

use serde::{Deserialize, Serialize};

/// Complete AST representation of one parsed component description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentAst {
    /// The `declare component` header
    pub header: Header,
    /// All declarations in source order
    pub declarations: Vec<Declaration>,
}

impl ComponentAst {
    /// Iterate over the declarations belonging to one section kind.
    pub fn in_section(&self, section: Section) -> impl Iterator<Item = &Declaration> {
        self.declarations
            .iter()
            .filter(move |d| d.section() == section)
    }
}

/// `declare component <name>(<params>): <inputs> -> <outputs>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    /// Symbolic length parameters, e.g. `long`, `short`
    pub params: Vec<String>,
    /// Input connector names
    pub inputs: Vec<String>,
    /// Output connector names
    pub outputs: Vec<String>,
    /// Source line number
    pub line: usize,
}

/// One statement of a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Declaration {
    Domain(DomainDecl),
    Connector(ConnectorDecl),
    Strand(StrandDecl),
    Structure(StructureDecl),
    Reaction(ReactionDecl),
}

impl Declaration {
    /// Source line of the statement.
    pub fn line(&self) -> usize {
        match self {
            Declaration::Domain(d) => d.line,
            Declaration::Connector(d) => d.line,
            Declaration::Strand(d) => d.line,
            Declaration::Structure(d) => d.line,
            Declaration::Reaction(d) => d.line,
        }
    }

    /// Declared name; reactions are anonymous.
    pub fn name(&self) -> Option<&str> {
        match self {
            Declaration::Domain(d) => Some(&d.name),
            Declaration::Connector(d) => Some(&d.name),
            Declaration::Strand(d) => Some(&d.name),
            Declaration::Structure(d) => Some(&d.name),
            Declaration::Reaction(_) => None,
        }
    }

    /// The section this statement kind belongs to.
    pub fn section(&self) -> Section {
        match self {
            Declaration::Domain(_) => Section::Domains,
            Declaration::Connector(_) => Section::Connectors,
            Declaration::Strand(_) => Section::Strands,
            Declaration::Structure(_) => Section::Structures,
            Declaration::Reaction(_) => Section::Reactions,
        }
    }
}

/// `sequence <name> = "<constraint>" : <length>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDecl {
    pub name: String,
    /// Optional nucleotide constraint (IUPAC letters)
    pub constraint: Option<String>,
    pub length: LengthSpec,
    pub line: usize,
}

/// Length of a domain as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthSpec {
    /// A symbolic component parameter
    Param(String),
    /// A literal nucleotide count
    Literal(u32),
}

/// A reference to a sequence, optionally marked complementary with `*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqRef {
    pub name: String,
    pub complement: bool,
}

/// `sequence <name> = <ref> <ref> ...` in the I/O connectors section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDecl {
    pub name: String,
    pub refs: Vec<SeqRef>,
    pub line: usize,
}

/// `strand <name> = <ref> <ref> ...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrandDecl {
    pub name: String,
    pub refs: Vec<SeqRef>,
    pub line: usize,
}

/// `structure <name> = <strand> + <strand> ... : "<notation>"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureDecl {
    pub name: String,
    pub strands: Vec<String>,
    pub notation: String,
    /// Column of the opening quote of the notation
    pub notation_column: usize,
    pub line: usize,
}

/// One entry on a reaction side: `[count] name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesTerm {
    /// Stoichiometric coefficient, 1 when omitted
    pub count: usize,
    pub name: String,
}

impl SpeciesTerm {
    pub fn new(count: usize, name: impl Into<String>) -> Self {
        Self {
            count,
            name: name.into(),
        }
    }
}

/// `<kind> [rates] <reactants> -> <products>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionDecl {
    /// Kind keyword as written, checked during compilation
    pub keyword: String,
    /// Optional rate constants (forward, then reverse)
    pub rates: Vec<f64>,
    pub reactants: Vec<SpeciesTerm>,
    pub products: Vec<SpeciesTerm>,
    pub line: usize,
}

/// Section headers, in the order their declarations are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    Domains,
    Connectors,
    Strands,
    Structures,
    Reactions,
}

impl Section {
    /// All sections in resolution order.
    pub const ALL: [Section; 5] = [
        Section::Domains,
        Section::Connectors,
        Section::Strands,
        Section::Structures,
        Section::Reactions,
    ];

    /// Parse a header title (whitespace already normalized).
    pub fn from_title(title: &str) -> Option<Self> {
        match title.to_ascii_lowercase().as_str() {
            "domains" => Some(Self::Domains),
            "i/o connectors" | "connectors" => Some(Self::Connectors),
            "strands" => Some(Self::Strands),
            "structures" => Some(Self::Structures),
            "reactions" => Some(Self::Reactions),
            _ => None,
        }
    }

    /// Canonical header title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Domains => "Domains",
            Self::Connectors => "I/O connectors",
            Self::Strands => "Strands",
            Self::Structures => "Structures",
            Self::Reactions => "Reactions",
        }
    }
}
