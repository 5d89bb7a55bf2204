//! Error types for the dsdcomp component compiler.
//!
//! This module provides a unified error type [`CompileError`] that covers
//! every error condition found while parsing a component description,
//! resolving and validating it, and composing components into circuits.
//! [`Diagnostic`] is the user-facing record the CLI prints.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`CompileError`].
pub type Result<T> = std::result::Result<T, CompileError>;

/// Unified error type for all dsdcomp operations.
#[derive(Error, Debug)]
pub enum CompileError {
    // ============ Syntax Errors ============
    /// Malformed statement, section or token
    #[error("Syntax error at line {line}, column {column}: expected {expected}, found {found}")]
    Syntax {
        line: usize,
        column: usize,
        expected: String,
        found: String,
    },

    /// A name was declared twice in the same namespace
    #[error("Duplicate declaration '{name}' at line {line} (first declared at line {first_line})")]
    DuplicateDeclaration {
        name: String,
        line: usize,
        first_line: usize,
    },

    // ============ Resolution Errors ============
    /// Reference to an undeclared domain
    #[error("Unknown domain '{name}' at line {line}{hint}")]
    UnknownDomain {
        name: String,
        line: usize,
        hint: String,
    },

    /// Reference to an undeclared strand
    #[error("Unknown strand '{name}' at line {line}{hint}")]
    UnknownStrand {
        name: String,
        line: usize,
        hint: String,
    },

    /// Reference to an undeclared structure or signal
    #[error("Unknown structure '{name}' at line {line}{hint}")]
    UnknownStructure {
        name: String,
        line: usize,
        hint: String,
    },

    /// Header connector without an I/O declaration
    #[error("Unknown connector '{name}' at line {line}")]
    UnknownConnector { name: String, line: usize },

    /// Domain length names something that is not a component parameter
    #[error("Unknown length parameter '{name}' at line {line}")]
    UnknownParameter { name: String, line: usize },

    // ============ Structural Errors ============
    /// Empty strand or repeated zero-length domain
    #[error("Degenerate strand '{strand}' at line {line}: {message}")]
    DegenerateStrand {
        strand: String,
        line: usize,
        message: String,
    },

    /// Unmatched bracket in pairing notation
    #[error("Unbalanced structure '{structure}' at line {line}: {message}")]
    UnbalancedStructure {
        structure: String,
        line: usize,
        message: String,
    },

    /// Two paired positions hold domains that are not complements
    #[error(
        "Non-complementary pair in structure '{structure}' at line {line}: \
         '{first}' at position {first_position} cannot pair with '{second}' at position {second_position}"
    )]
    NonComplementaryPair {
        structure: String,
        line: usize,
        first: String,
        first_position: usize,
        second: String,
        second_position: usize,
    },

    /// Notation length differs from the domain count of the listed strands
    #[error(
        "Structure '{structure}' at line {line}: notation has {notation} positions \
         but the strands hold {domains} domains{detail}"
    )]
    StructureLengthMismatch {
        structure: String,
        line: usize,
        notation: usize,
        domains: usize,
        detail: String,
    },

    // ============ Reaction Errors ============
    /// Reaction keyword is not a known kind
    #[error("Unknown reaction kind '{keyword}' at line {line}")]
    UnknownReactionKind { keyword: String, line: usize },

    /// Domains are created or destroyed by a reaction
    #[error("Reaction at line {line} does not conserve domains; unmatched: {}", unmatched.join(", "))]
    Balance { line: usize, unmatched: Vec<String> },

    // ============ Composition Errors ============
    /// Bound connectors differ in their domain sequence
    #[error("Connector mismatch binding '{output}' to '{input}' at position {position}: {message}")]
    ConnectorMismatch {
        output: String,
        input: String,
        position: usize,
        message: String,
    },

    /// Binding refers to a connector with the wrong role or an already fed input
    #[error("Invalid binding '{output}' -> '{input}': {message}")]
    InvalidBinding {
        output: String,
        input: String,
        message: String,
    },

    /// Unified domains disagree on their length class or sequence constraint
    #[error("Domain '{domain}' is {first} in '{first_component}' but {second} in '{second_component}'")]
    DomainConflict {
        domain: String,
        first_component: String,
        first: String,
        second_component: String,
        second: String,
    },

    /// Two components with the same name were added to one circuit
    #[error("Component '{name}' was already added to this circuit")]
    DuplicateComponent { name: String },

    /// Component referenced by a binding was never added
    #[error("Unknown component '{name}'")]
    UnknownComponent { name: String },

    /// Binding graph contains a cycle and feedback was not requested
    #[error("Cyclic binding between components: {}", cycle.join(" -> "))]
    CyclicBinding { cycle: Vec<String> },

    // ============ I/O Errors ============
    /// Error reading a description file
    #[error("Failed to read component description '{path}': {source}")]
    InputUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing an export file
    #[error("Failed to write '{path}': {source}")]
    OutputUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Model could not be serialized
    #[error("Failed to export model: {0}")]
    Export(#[from] serde_json::Error),

    /// Warnings promoted to errors by strict mode
    #[error("{count} warning(s) treated as errors in strict mode")]
    StrictWarnings { count: usize },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl CompileError {
    /// Create a syntax error
    pub fn syntax(
        line: usize,
        column: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            line,
            column,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unbalanced structure error
    pub fn unbalanced(structure: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::UnbalancedStructure {
            structure: structure.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid binding error
    pub fn invalid_binding(
        output: impl fmt::Display,
        input: impl fmt::Display,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidBinding {
            output: output.to_string(),
            input: input.to_string(),
            message: message.into(),
        }
    }

    /// Source line the error was detected on, if it belongs to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. }
            | Self::DuplicateDeclaration { line, .. }
            | Self::UnknownDomain { line, .. }
            | Self::UnknownStrand { line, .. }
            | Self::UnknownStructure { line, .. }
            | Self::UnknownConnector { line, .. }
            | Self::UnknownParameter { line, .. }
            | Self::DegenerateStrand { line, .. }
            | Self::UnbalancedStructure { line, .. }
            | Self::NonComplementaryPair { line, .. }
            | Self::StructureLengthMismatch { line, .. }
            | Self::UnknownReactionKind { line, .. }
            | Self::Balance { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Hint appended to `Unknown*` errors when the name exists further down.
pub(crate) fn later_hint(later_line: Option<usize>) -> String {
    match later_line {
        Some(l) => format!(" (declared later at line {l}; declare before use)"),
        None => String::new(),
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A reported problem with optional file and line context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub file: Option<String>,
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    /// Create a warning attached to a source line.
    pub fn warning(line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            file: None,
            line,
            message: message.into(),
        }
    }

    /// Turn an error into an error-severity diagnostic.
    pub fn from_error(error: &CompileError) -> Self {
        Self {
            severity: Severity::Error,
            file: None,
            line: error.line(),
            message: error.to_string(),
        }
    }

    /// Attach a file name.
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{file}:{line}: ")?,
            (Some(file), None) => write!(f, "{file}: ")?,
            (None, Some(line)) => write!(f, "line {line}: ")?,
            (None, None) => {}
        }
        write!(f, "{}: {}", self.severity, self.message)
    }
}
