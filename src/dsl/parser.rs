//! Parser for the component description language.

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use crate::error::{CompileError, Result};

/// Reaction keywords recognized without a `### Reactions` header.
const REACTION_KEYWORDS: [&str; 4] = ["kinetic", "irreversible", "reversible", "catalytic"];

/// IUPAC nucleotide codes accepted in domain constraints.
const IUPAC: &str = "ACGTUNRYSWKMBDHV";

/// Parser for component descriptions.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser over the tokens of the given lexer.
    pub fn new(lexer: Lexer<'_>) -> Result<Self> {
        Ok(Self {
            tokens: lexer.tokenize()?,
            pos: 0,
        })
    }

    /// Parse the entire component description.
    pub fn parse(&mut self) -> Result<ComponentAst> {
        self.skip_newlines();
        let header = self.parse_header()?;
        let mut declarations = Vec::new();
        let mut section: Option<Section> = None;

        loop {
            match self.current().kind {
                TokenKind::Newline => self.advance(),
                TokenKind::Eof => break,
                TokenKind::Section => {
                    section = Section::from_title(&self.current().text);
                    self.advance();
                    self.expect_line_end()?;
                }
                TokenKind::Identifier => {
                    let declaration = self.parse_statement(section)?;
                    declarations.push(declaration);
                    self.expect_line_end()?;
                }
                _ => return Err(self.unexpected("a statement")),
            }
        }

        Ok(ComponentAst {
            header,
            declarations,
        })
    }

    fn current(&self) -> &Token {
        // The token list always ends with Eof, and `advance` never moves past it.
        &self.tokens[self.pos]
    }

    fn peek(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn advance(&mut self) {
        if self.current().kind != TokenKind::Eof {
            self.pos += 1;
        }
    }

    fn skip_newlines(&mut self) {
        while self.current().kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        let tok = self.current();
        let found = match tok.kind {
            TokenKind::Identifier | TokenKind::Number => format!("'{}'", tok.text),
            TokenKind::Str => format!("\"{}\"", tok.text),
            _ => tok.kind.describe().to_string(),
        };
        CompileError::syntax(tok.line, tok.column, expected, found)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current().kind == kind {
            let tok = self.current().clone();
            self.advance();
            Ok(tok)
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<Token> {
        if self.current().kind == TokenKind::Identifier && self.current().text == keyword {
            let tok = self.current().clone();
            self.advance();
            Ok(tok)
        } else {
            Err(self.unexpected(&format!("'{keyword}'")))
        }
    }

    fn expect_line_end(&mut self) -> Result<()> {
        match self.current().kind {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn parse_header(&mut self) -> Result<Header> {
        let line = self.expect_keyword("declare")?.line;
        self.expect_keyword("component")?;
        let name = self.expect(TokenKind::Identifier)?.text;

        let mut params = Vec::new();
        if self.current().kind == TokenKind::OpenParen {
            self.advance();
            while self.current().kind != TokenKind::CloseParen {
                params.push(self.expect(TokenKind::Identifier)?.text);
                if self.current().kind == TokenKind::Comma {
                    self.advance();
                } else if self.current().kind != TokenKind::CloseParen {
                    return Err(self.unexpected("',' or ')'"));
                }
            }
            self.advance();
        }

        self.expect(TokenKind::Colon)?;
        let inputs = self.parse_name_list(TokenKind::Arrow, true)?;
        self.expect(TokenKind::Arrow)?;
        let outputs = self.parse_name_list(TokenKind::Newline, true)?;
        self.expect_line_end()?;

        Ok(Header {
            name,
            params,
            inputs,
            outputs,
            line,
        })
    }

    /// Parse `name + name + ...` up to (not including) `stop` or the end of line.
    fn parse_name_list(&mut self, stop: TokenKind, allow_empty: bool) -> Result<Vec<String>> {
        let mut names = Vec::new();
        if self.current().kind == stop || self.at_line_end() {
            if allow_empty {
                return Ok(names);
            }
            return Err(self.unexpected("a name"));
        }
        loop {
            names.push(self.expect(TokenKind::Identifier)?.text);
            if self.current().kind == TokenKind::Plus {
                self.advance();
            } else {
                return Ok(names);
            }
        }
    }

    fn parse_statement(&mut self, section: Option<Section>) -> Result<Declaration> {
        let keyword = self.current().text.clone();
        let line = self.current().line;

        if section == Some(Section::Reactions) {
            return self.parse_reaction().map(Declaration::Reaction);
        }

        let declaration = match keyword.as_str() {
            "sequence" => self.parse_sequence(section)?,
            "strand" => Declaration::Strand(self.parse_strand()?),
            "structure" => Declaration::Structure(self.parse_structure()?),
            k if REACTION_KEYWORDS.contains(&k) || self.line_has_arrow() => {
                Declaration::Reaction(self.parse_reaction()?)
            }
            _ => {
                return Err(self.unexpected("'sequence', 'strand', 'structure' or a reaction"));
            }
        };

        if let Some(section) = section {
            if declaration.section() != section {
                return Err(CompileError::syntax(
                    line,
                    1,
                    format!("a statement of section '{}'", section.title()),
                    format!("'{keyword}' statement"),
                ));
            }
        }
        Ok(declaration)
    }

    fn line_has_arrow(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .take_while(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Eof))
            .any(|t| t.kind == TokenKind::Arrow)
    }

    /// Domain or connector; the section decides, otherwise the body shape does.
    fn parse_sequence(&mut self, section: Option<Section>) -> Result<Declaration> {
        let line = self.expect_keyword("sequence")?.line;
        let name = self.expect(TokenKind::Identifier)?.text;

        let domain_shaped = match self.current().kind {
            TokenKind::Colon => true,
            TokenKind::Equals => self.peek(1).kind == TokenKind::Str,
            _ => return Err(self.unexpected("'=' or ':'")),
        };
        let is_domain = match section {
            Some(Section::Domains) => true,
            Some(Section::Connectors) => false,
            _ => domain_shaped,
        };

        if is_domain {
            let mut constraint = None;
            if self.current().kind == TokenKind::Equals {
                self.advance();
                let tok = self.expect(TokenKind::Str)?;
                if tok.text.is_empty()
                    || !tok.text.chars().all(|c| IUPAC.contains(c.to_ascii_uppercase()))
                {
                    return Err(CompileError::syntax(
                        tok.line,
                        tok.column,
                        "IUPAC nucleotide letters",
                        format!("\"{}\"", tok.text),
                    ));
                }
                constraint = Some((tok.text.to_ascii_uppercase(), tok.line, tok.column));
            }
            self.expect(TokenKind::Colon)?;
            let length = self.parse_length()?;
            // One letter is a pattern for every position; longer constraints spell the domain out.
            if let (Some((text, line, column)), LengthSpec::Literal(n)) = (&constraint, &length) {
                let letters = text.chars().count();
                if letters > 1 && letters != *n as usize {
                    return Err(CompileError::syntax(
                        *line,
                        *column,
                        format!("one letter or {n} letters"),
                        format!("\"{text}\" ({letters} letters)"),
                    ));
                }
            }
            let constraint = constraint.map(|(text, _, _)| text);
            Ok(Declaration::Domain(DomainDecl {
                name,
                constraint,
                length,
                line,
            }))
        } else {
            self.expect(TokenKind::Equals)?;
            let refs = self.parse_refs()?;
            Ok(Declaration::Connector(ConnectorDecl { name, refs, line }))
        }
    }

    fn parse_length(&mut self) -> Result<LengthSpec> {
        match self.current().kind {
            TokenKind::Identifier => {
                let name = self.current().text.clone();
                self.advance();
                Ok(LengthSpec::Param(name))
            }
            TokenKind::Number => match self.current().text.parse::<u32>() {
                Ok(n) => {
                    self.advance();
                    Ok(LengthSpec::Literal(n))
                }
                Err(_) => Err(self.unexpected("an integer length")),
            },
            _ => Err(self.unexpected("a length parameter or integer")),
        }
    }

    /// Parse `name[*] name[*] ...` to the end of the line.
    fn parse_refs(&mut self) -> Result<Vec<SeqRef>> {
        let mut refs = Vec::new();
        while !self.at_line_end() {
            let name = self.expect(TokenKind::Identifier)?.text;
            let complement = self.current().kind == TokenKind::Star;
            if complement {
                self.advance();
            }
            refs.push(SeqRef { name, complement });
        }
        if refs.is_empty() {
            return Err(self.unexpected("a domain reference"));
        }
        Ok(refs)
    }

    fn parse_strand(&mut self) -> Result<StrandDecl> {
        let line = self.expect_keyword("strand")?.line;
        let name = self.expect(TokenKind::Identifier)?.text;
        self.expect(TokenKind::Equals)?;
        let refs = self.parse_refs()?;
        Ok(StrandDecl { name, refs, line })
    }

    fn parse_structure(&mut self) -> Result<StructureDecl> {
        let line = self.expect_keyword("structure")?.line;
        let name = self.expect(TokenKind::Identifier)?.text;
        self.expect(TokenKind::Equals)?;
        let strands = self.parse_name_list(TokenKind::Colon, false)?;
        self.expect(TokenKind::Colon)?;
        let notation = self.expect(TokenKind::Str)?;
        Ok(StructureDecl {
            name,
            strands,
            notation: notation.text,
            notation_column: notation.column,
            line,
        })
    }

    /// Parse `[n] name + [n] name + ...`; a side may not be empty.
    fn parse_species_list(&mut self, stop: TokenKind) -> Result<Vec<SpeciesTerm>> {
        let mut terms = Vec::new();
        if self.current().kind == stop || self.at_line_end() {
            return Err(self.unexpected("a name"));
        }
        loop {
            let mut count = 1;
            if self.current().kind == TokenKind::Number {
                let tok = self.current().clone();
                count = match tok.text.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        return Err(CompileError::syntax(
                            tok.line,
                            tok.column,
                            "a positive integer coefficient",
                            &tok.text,
                        ))
                    }
                };
                self.advance();
            }
            let name = self.expect(TokenKind::Identifier)?.text;
            terms.push(SpeciesTerm::new(count, name));
            if self.current().kind == TokenKind::Plus {
                self.advance();
            } else {
                return Ok(terms);
            }
        }
    }

    fn parse_reaction(&mut self) -> Result<ReactionDecl> {
        let keyword_tok = self.expect(TokenKind::Identifier)?;

        let mut rates = Vec::new();
        if self.current().kind == TokenKind::OpenBracket {
            self.advance();
            loop {
                let tok = self.expect(TokenKind::Number)?;
                let rate = tok.text.parse::<f64>().map_err(|_| {
                    CompileError::syntax(tok.line, tok.column, "a rate constant", &tok.text)
                })?;
                rates.push(rate);
                match self.current().kind {
                    TokenKind::Comma if rates.len() < 2 => self.advance(),
                    TokenKind::CloseBracket => {
                        self.advance();
                        break;
                    }
                    _ => return Err(self.unexpected("',' or ']'")),
                }
            }
        }

        let reactants = self.parse_species_list(TokenKind::Arrow)?;
        self.expect(TokenKind::Arrow)?;
        let products = self.parse_species_list(TokenKind::Newline)?;

        Ok(ReactionDecl {
            keyword: keyword_tok.text,
            rates,
            reactants,
            products,
            line: keyword_tok.line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;

    const SMALL: &str = "\
# A toy component
declare component relay(long, short): X -> Y

### Domains
sequence a = \"N\" : long
# comment inside a block

sequence t : 5

### I/O connectors
sequence X = t a
sequence Y = a t*

### Strands
strand SX = X
strand SB = a* t*

### Structures
structure G = SX + SB : \"((+))\"

### Reactions
kinetic [1e6] G + Y -> X + G   # trailing comment
";

    #[test]
    fn test_parse_header() {
        let ast = parse(SMALL).unwrap();
        assert_eq!(ast.header.name, "relay");
        assert_eq!(ast.header.params, vec!["long", "short"]);
        assert_eq!(ast.header.inputs, vec!["X"]);
        assert_eq!(ast.header.outputs, vec!["Y"]);
        assert_eq!(ast.header.line, 2);
    }

    #[test]
    fn test_parse_declarations() {
        let ast = parse(SMALL).unwrap();
        assert_eq!(ast.declarations.len(), 8);
        assert_eq!(
            ast.declarations[0],
            Declaration::Domain(DomainDecl {
                name: "a".into(),
                constraint: Some("N".into()),
                length: LengthSpec::Param("long".into()),
                line: 5,
            })
        );
        assert!(matches!(
            &ast.declarations[1],
            Declaration::Domain(DomainDecl { length: LengthSpec::Literal(5), constraint: None, .. })
        ));
        match &ast.declarations[3] {
            Declaration::Connector(c) => {
                assert_eq!(c.name, "Y");
                assert!(c.refs[1].complement);
            }
            other => panic!("expected connector, got {other:?}"),
        }
        match &ast.declarations[7] {
            Declaration::Reaction(r) => {
                assert_eq!(r.keyword, "kinetic");
                assert_eq!(r.rates, vec![1e6]);
                assert_eq!(r.reactants, vec![SpeciesTerm::new(1, "G"), SpeciesTerm::new(1, "Y")]);
                assert_eq!(r.products, vec![SpeciesTerm::new(1, "X"), SpeciesTerm::new(1, "G")]);
            }
            other => panic!("expected reaction, got {other:?}"),
        }
        assert_eq!(ast.in_section(Section::Strands).count(), 2);
    }

    #[test]
    fn test_parse_without_sections() {
        let input = "declare component c: -> \nsequence a : 4\nsequence A = a a*\nstrand S = A\nkinetic S -> S\n";
        let ast = parse(input).unwrap();
        let sections: Vec<_> = ast.declarations.iter().map(|d| d.section()).collect();
        assert_eq!(
            sections,
            vec![Section::Domains, Section::Connectors, Section::Strands, Section::Reactions]
        );
        assert!(ast.header.inputs.is_empty() && ast.header.outputs.is_empty());
    }

    #[test]
    fn test_parse_coefficients() {
        let input = "declare component c: ->\n### Reactions\nkinetic [2e5] 2 X + G -> 3 Y\n";
        match &parse(input).unwrap().declarations[0] {
            Declaration::Reaction(r) => {
                assert_eq!(r.rates, vec![2e5]);
                assert_eq!(r.reactants, vec![SpeciesTerm::new(2, "X"), SpeciesTerm::new(1, "G")]);
                assert_eq!(r.products, vec![SpeciesTerm::new(3, "Y")]);
            }
            other => panic!("expected reaction, got {other:?}"),
        }

        for bad in ["kinetic 0 X -> Y", "kinetic 1.5 X -> Y", "kinetic 2 -> Y"] {
            let input = format!("declare component c: ->\n{bad}\n");
            assert!(
                matches!(parse(&input), Err(CompileError::Syntax { line: 2, .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_unknown_keyword_in_reactions_is_deferred() {
        let input = "declare component c: ->\n### Reactions\nsometimes A -> B\n";
        let ast = parse(input).unwrap();
        assert!(matches!(&ast.declarations[0], Declaration::Reaction(r) if r.keyword == "sometimes"));
    }

    #[test]
    fn test_syntax_errors_name_line() {
        let missing_header = "sequence a : 4\n";
        assert!(matches!(
            parse(missing_header),
            Err(CompileError::Syntax { line: 1, .. })
        ));

        let wrong_section = "declare component c: ->\n### Domains\nstrand S = a\n";
        assert!(matches!(
            parse(wrong_section),
            Err(CompileError::Syntax { line: 3, .. })
        ));

        let bad_constraint = "declare component c: ->\nsequence a = \"NXZ\" : 4\n";
        match parse(bad_constraint) {
            Err(CompileError::Syntax { line, expected, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(expected, "IUPAC nucleotide letters");
            }
            other => panic!("expected syntax error, got {other:?}"),
        }

        let long_constraint = "declare component c: ->\nsequence a = \"ACGTA\" : 4\n";
        match parse(long_constraint) {
            Err(CompileError::Syntax { line, column, expected, .. }) => {
                assert_eq!((line, column), (2, 14));
                assert_eq!(expected, "one letter or 4 letters");
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
        assert!(parse("declare component c: ->\nsequence a = \"ACGT\" : 4\n").is_ok());
        assert!(parse("declare component c(long): ->\nsequence a = \"ACGTA\" : long\n").is_ok());

        let dangling_plus = "declare component c: ->\nstructure G = A + : \"..\"\n";
        assert!(matches!(parse(dangling_plus), Err(CompileError::Syntax { line: 2, .. })));

        let garbage = "declare component c: ->\nfrobnicate the widget\n";
        assert!(matches!(parse(garbage), Err(CompileError::Syntax { line: 2, .. })));
    }
}
