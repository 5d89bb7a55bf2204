//! DSL (Domain Specific Language) parser for component descriptions.
//!
//! A description declares one strand-displacement component: its length
//! parameters, the input/output connectors it exposes, the domains those
//! are made of, the strands and structures it contains, and the reactions
//! between them. The language is line-oriented and human-editable.
//!
//! # Grammar Overview
//!
//! ```text
//! file        = header { line }
//! header      = "declare" "component" name [ "(" [ name { "," name } ] ")" ] ":" ports "->" ports
//! ports       = [ name { "+" name } ]
//! line        = comment | section | statement | empty
//! comment     = '#' { any_char }
//! section     = "###" ( "Domains" | "I/O connectors" | "Strands" | "Structures" | "Reactions" )
//!
//! domain      = "sequence" name [ "=" string ] ":" length
//! connector   = "sequence" name "=" ref { ref }
//! strand      = "strand" name "=" ref { ref }
//! structure   = "structure" name "=" name { "+" name } ":" string
//! reaction    = kind [ "[" number [ "," number ] "]" ] names "->" names
//!
//! ref         = name [ "*" ]
//! length      = name | integer
//! kind        = "kinetic" | "irreversible" | "reversible" | "catalytic"
//! ```
//!
//! A `*` after a reference selects the complementary orientation. A strand
//! may reference a connector, which expands to the connector's domains.
//! Structure notation has one character per domain position: `.` for an
//! unpaired domain, matching `()`, `[]`, `{}` or `<>` for a paired one, and
//! `+` between strands.
//!
//! # Example
//!
//! ```text
//! declare component relay(long, short): X -> Y
//!
//! ### Domains
//! sequence a = "N" : long
//! sequence t : short
//! sequence u : short
//!
//! ### I/O connectors
//! sequence X = t a
//! sequence Y = a u
//!
//! ### Strands
//! strand SX = X
//! strand SY = Y
//! strand SB = u* a* t*
//!
//! ### Structures
//! structure G = SY + SB : "((+))."
//! structure W = SX + SB : "((+.))"
//!
//! ### Reactions
//! kinetic G + X -> Y + W
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::{CompileError, Result};

/// Parse a component description string into an AST.
pub fn parse(input: &str) -> Result<ComponentAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Read a description file into memory.
pub fn read_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CompileError::InputUnavailable {
        path: path.display().to_string(),
        source: e,
    })
}

/// Parse a component description file.
pub fn parse_file(path: &std::path::Path) -> Result<ComponentAst> {
    parse(&read_file(path)?)
}
