//! Structures: strands held together by explicit domain pairing.
//!
//! Pairing is written in dot-bracket notation over domain positions:
//! `.` marks an unpaired domain, a matching pair of brackets marks two
//! paired domains, and `+` separates consecutive strands. Each bracket
//! class (`()`, `[]`, `{}`, `<>`) is matched on its own stack, so crossing
//! pairs are expressible with different classes.
//!
//! Parsing produces a [`PairGraph`]: positions are nodes and pairs are
//! edges stored as a symmetric partner table.

use std::fmt;

use serde::Serialize;

use super::domain::{DomainRefVec, DomainRegistry};
use super::strand::{Strand, StrandId};
use crate::error::{CompileError, Result};

/// Opening and closing symbols of each bracket class.
const BRACKETS: [(char, char); 4] = [('(', ')'), ('[', ']'), ('{', '}'), ('<', '>')];

/// Strand separator in the notation.
pub const STRAND_BREAK: char = '+';

/// Index of a structure inside one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StructureId(pub usize);

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}", self.0)
    }
}

/// A pair of 0-based positions (i, j) with i < j.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Pair {
    i: usize,
    j: usize,
}

impl Pair {
    /// Create a new pair (i, j). Panics in debug if i >= j.
    pub fn new(i: usize, j: usize) -> Self {
        debug_assert!(i < j);
        Pair { i, j }
    }

    pub fn i(&self) -> usize {
        self.i
    }

    pub fn j(&self) -> usize {
        self.j
    }
}

/// Why a notation string could not be turned into a pair graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// Character that is neither `.`, `+`, whitespace nor a bracket (1-based column)
    InvalidSymbol { column: usize, symbol: char },
    /// Closing bracket with no open partner (1-based position)
    UnmatchedClose { position: usize, symbol: char },
    /// Opening bracket never closed (1-based position)
    UnmatchedOpen { position: usize, symbol: char },
}

impl fmt::Display for NotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotationError::InvalidSymbol { column, symbol } => {
                write!(f, "invalid symbol '{symbol}' at column {column}")
            }
            NotationError::UnmatchedClose { position, symbol } => {
                write!(f, "unmatched '{symbol}' at position {position}")
            }
            NotationError::UnmatchedOpen { position, symbol } => {
                write!(f, "unclosed '{symbol}' at position {position}")
            }
        }
    }
}

/// Pairing of one structure as a graph over domain positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairGraph {
    partner: Vec<Option<usize>>,
    #[serde(skip)]
    symbols: Vec<char>,
    strand_lengths: Vec<usize>,
}

impl PairGraph {
    /// Match brackets class by class; one stack per class.
    pub fn from_notation(notation: &str) -> std::result::Result<Self, NotationError> {
        let mut partner = Vec::new();
        let mut symbols = Vec::new();
        let mut strand_lengths = vec![0];
        let mut stacks: [Vec<usize>; BRACKETS.len()] = Default::default();

        for (column, ch) in notation.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            if ch == STRAND_BREAK {
                strand_lengths.push(0);
                continue;
            }

            let pos = partner.len();
            if ch == '.' {
                // unpaired
            } else if let Some(class) = BRACKETS.iter().position(|&(open, _)| open == ch) {
                stacks[class].push(pos);
            } else if let Some(class) = BRACKETS.iter().position(|&(_, close)| close == ch) {
                let Some(open) = stacks[class].pop() else {
                    return Err(NotationError::UnmatchedClose {
                        position: pos + 1,
                        symbol: ch,
                    });
                };
                partner[open] = Some(pos);
                partner.push(Some(open));
                symbols.push(ch);
                if let Some(n) = strand_lengths.last_mut() {
                    *n += 1;
                }
                continue;
            } else {
                return Err(NotationError::InvalidSymbol {
                    column: column + 1,
                    symbol: ch,
                });
            }

            partner.push(None);
            symbols.push(ch);
            if let Some(n) = strand_lengths.last_mut() {
                *n += 1;
            }
        }

        // Report the earliest unclosed opening across all classes.
        let unclosed = stacks
            .iter()
            .enumerate()
            .filter_map(|(class, stack)| stack.first().map(|&pos| (pos, BRACKETS[class].0)))
            .min();
        if let Some((pos, symbol)) = unclosed {
            return Err(NotationError::UnmatchedOpen {
                position: pos + 1,
                symbol,
            });
        }

        Ok(Self {
            partner,
            symbols,
            strand_lengths,
        })
    }

    /// Number of domain positions (separators excluded).
    pub fn len(&self) -> usize {
        self.partner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partner.is_empty()
    }

    /// Partner of a position, if paired.
    pub fn partner(&self, pos: usize) -> Option<usize> {
        self.partner.get(pos).copied().flatten()
    }

    /// Positions per strand segment, in notation order.
    pub fn strand_lengths(&self) -> &[usize] {
        &self.strand_lengths
    }

    /// All pairs, sorted by their 5' position.
    pub fn pairs(&self) -> Vec<Pair> {
        self.partner
            .iter()
            .enumerate()
            .filter_map(|(i, &p)| p.filter(|&j| i < j).map(|j| Pair::new(i, j)))
            .collect()
    }

    /// Every edge is stored in both directions.
    pub fn is_symmetric(&self) -> bool {
        self.partner
            .iter()
            .enumerate()
            .all(|(i, &p)| p.map_or(true, |j| j != i && self.partner(j) == Some(i)))
    }

    /// Map a position to (strand segment, offset within the strand).
    pub fn locate(&self, pos: usize) -> Option<(usize, usize)> {
        let mut start = 0;
        for (strand, &len) in self.strand_lengths.iter().enumerate() {
            if pos < start + len {
                return Some((strand, pos - start));
            }
            start += len;
        }
        None
    }

    /// True when pairs link every strand segment into one complex.
    pub fn strands_connected(&self) -> bool {
        let n = self.strand_lengths.len();
        let mut parent: Vec<usize> = (0..n).collect();
        fn find(parent: &mut [usize], x: usize) -> usize {
            let mut root = x;
            while parent[root] != root {
                root = parent[root];
            }
            parent[x] = root;
            root
        }
        for pair in self.pairs() {
            if let (Some((a, _)), Some((b, _))) = (self.locate(pair.i()), self.locate(pair.j())) {
                let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
                parent[ra] = rb;
            }
        }
        let root = find(&mut parent, 0);
        (1..n).all(|s| find(&mut parent, s) == root)
    }

    /// Write the graph back as notation, keeping the original bracket classes.
    pub fn to_notation(&self) -> String {
        let mut out = String::with_capacity(self.len() + self.strand_lengths.len());
        let mut pos = 0;
        for (k, &len) in self.strand_lengths.iter().enumerate() {
            if k > 0 {
                out.push(STRAND_BREAK);
            }
            for symbol in &self.symbols[pos..pos + len] {
                out.push(*symbol);
            }
            pos += len;
        }
        out
    }
}

/// A complex of one or more strands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Structure {
    pub name: String,
    pub strands: Vec<StrandId>,
    pub pairs: PairGraph,
    /// Notation as written, kept for export
    pub notation: String,
    pub line: usize,
}

impl Structure {
    /// Concatenated domains of all strands, in notation order.
    pub fn domains(&self, strands: &[Strand]) -> DomainRefVec {
        self.strands
            .iter()
            .flat_map(|id| strands[id.0].domains.iter().copied())
            .collect()
    }
}

/// Builds and validates structures against a component's strands.
pub struct StructureBuilder<'a> {
    registry: &'a DomainRegistry,
    strands: &'a [Strand],
    /// Source column just before the first notation character
    column: usize,
}

impl<'a> StructureBuilder<'a> {
    pub fn new(registry: &'a DomainRegistry, strands: &'a [Strand]) -> Self {
        Self {
            registry,
            strands,
            column: 0,
        }
    }

    /// Report notation symbols at source columns, given the column of the opening quote.
    pub fn at_column(mut self, quote_column: usize) -> Self {
        self.column = quote_column;
        self
    }

    /// Build a structure: bracket matching, then lengths, then complementarity.
    pub fn build(
        &self,
        name: &str,
        strand_ids: Vec<StrandId>,
        notation: &str,
        line: usize,
    ) -> Result<Structure> {
        let pairs = PairGraph::from_notation(notation).map_err(|e| match e {
            NotationError::InvalidSymbol { column, symbol } => CompileError::syntax(
                line,
                self.column + column,
                "'.', '+' or a bracket in structure notation",
                format!("'{symbol}'"),
            ),
            other => CompileError::unbalanced(name, line, other.to_string()),
        })?;

        let expected: Vec<usize> = strand_ids.iter().map(|id| self.strands[id.0].len()).collect();
        let total: usize = expected.iter().sum();
        if pairs.len() != total || pairs.strand_lengths() != expected.as_slice() {
            return Err(CompileError::StructureLengthMismatch {
                structure: name.to_string(),
                line,
                notation: pairs.len(),
                domains: total,
                detail: self.length_detail(&strand_ids, pairs.strand_lengths()),
            });
        }

        let structure = Structure {
            name: name.to_string(),
            strands: strand_ids,
            pairs,
            notation: notation.to_string(),
            line,
        };

        let domains = structure.domains(self.strands);
        for pair in structure.pairs.pairs() {
            let (a, b) = (&domains[pair.i()], &domains[pair.j()]);
            if !self.registry.are_complements(a, b) {
                return Err(CompileError::NonComplementaryPair {
                    structure: name.to_string(),
                    line,
                    first: self.registry.display_ref(a),
                    first_position: pair.i() + 1,
                    second: self.registry.display_ref(b),
                    second_position: pair.j() + 1,
                });
            }
        }

        Ok(structure)
    }

    fn length_detail(&self, strand_ids: &[StrandId], segments: &[usize]) -> String {
        if segments.len() != strand_ids.len() {
            return format!(
                " ({} notation segments for {} strands)",
                segments.len(),
                strand_ids.len()
            );
        }
        strand_ids
            .iter()
            .zip(segments)
            .find(|&(id, &seg)| self.strands[id.0].len() != seg)
            .map(|(id, seg)| {
                let strand = &self.strands[id.0];
                format!(
                    " (strand '{}' has {} domains, its segment has {})",
                    strand.name,
                    strand.len(),
                    seg
                )
            })
            .unwrap_or_default()
    }
}
