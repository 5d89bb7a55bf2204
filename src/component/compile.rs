//! Two-pass resolution of a parsed description into a [`Component`].
//!
//! Pass one records where every name is declared and rejects duplicates.
//! Pass two resolves domains, connectors, strands, structures and
//! reactions in that order. A reference only resolves to a declaration on
//! an earlier line; pass one's table turns a forward reference into a hint
//! naming the later line.

use std::collections::HashMap;

use log::{debug, info};

use super::connector::{Connector, ConnectorId, ConnectorRole};
use super::domain::{reverse_complement, DomainRef, DomainRefVec, LengthClass, Orientation};
use super::reaction::{ReactionBalancer, ReactionKind, Rates, Species};
use super::strand::{StrandBuilder, StrandId};
use super::structure::{StructureBuilder, StructureId};
use super::validate::lint;
use super::Component;
use crate::dsl::{
    self, ComponentAst, ConnectorDecl, Declaration, DomainDecl, LengthSpec, ReactionDecl, SeqRef,
    Section, SpeciesTerm, StrandDecl, StructureDecl,
};
use crate::error::{later_hint, CompileError, Diagnostic, Result};

/// A compiled component plus the warnings found while linting it.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub component: Component,
    pub warnings: Vec<Diagnostic>,
}

impl Compilation {
    /// Reject the component if any warning was raised.
    pub fn strict(self) -> Result<Component> {
        if self.warnings.is_empty() {
            Ok(self.component)
        } else {
            Err(CompileError::StrictWarnings {
                count: self.warnings.len(),
            })
        }
    }
}

/// Parse and compile a description.
pub fn compile_str(text: &str) -> Result<Compilation> {
    compile(&dsl::parse(text)?)
}

/// Compile a parsed description.
pub fn compile(ast: &ComponentAst) -> Result<Compilation> {
    let names = NameTable::collect(ast)?;
    let mut resolver = Resolver::new(ast, &names);

    for section in Section::ALL {
        let before = resolver.count(section);
        for declaration in ast.in_section(section) {
            resolver.resolve(declaration)?;
        }
        debug!(
            "{}: resolved {} {}",
            ast.header.name,
            resolver.count(section) - before,
            section.title().to_ascii_lowercase()
        );
        if section == Section::Connectors {
            resolver.check_header_connectors()?;
        }
    }

    let component = resolver.component;
    let warnings = lint(&component);
    info!(
        "compiled component '{}': {} domains, {} strands, {} structures, {} reactions, {} warnings",
        component.name,
        component.domains.len(),
        component.strands.len(),
        component.structures.len(),
        component.reactions.len(),
        warnings.len()
    );
    Ok(Compilation {
        component,
        warnings,
    })
}

/// Declaration lines per namespace. Domains and connectors share one.
#[derive(Debug, Default)]
struct NameTable {
    sequences: HashMap<String, usize>,
    strands: HashMap<String, usize>,
    structures: HashMap<String, usize>,
}

impl NameTable {
    fn collect(ast: &ComponentAst) -> Result<Self> {
        let mut table = Self::default();
        for declaration in &ast.declarations {
            let (Some(name), line) = (declaration.name(), declaration.line()) else {
                continue;
            };
            let namespace = match declaration {
                Declaration::Domain(_) | Declaration::Connector(_) => &mut table.sequences,
                Declaration::Strand(_) => &mut table.strands,
                Declaration::Structure(_) => &mut table.structures,
                Declaration::Reaction(_) => continue,
            };
            if let Some(&first_line) = namespace.get(name) {
                return Err(CompileError::DuplicateDeclaration {
                    name: name.to_string(),
                    line,
                    first_line,
                });
            }
            namespace.insert(name.to_string(), line);
        }
        Ok(table)
    }
}

struct Resolver<'a> {
    ast: &'a ComponentAst,
    names: &'a NameTable,
    component: Component,
    connectors: HashMap<&'a str, ConnectorId>,
    strands: HashMap<&'a str, StrandId>,
    structures: HashMap<&'a str, StructureId>,
}

impl<'a> Resolver<'a> {
    fn new(ast: &'a ComponentAst, names: &'a NameTable) -> Self {
        let header = &ast.header;
        Self {
            ast,
            names,
            component: Component::new(header.name.clone(), header.params.clone(), header.line),
            connectors: HashMap::new(),
            strands: HashMap::new(),
            structures: HashMap::new(),
        }
    }

    fn count(&self, section: Section) -> usize {
        match section {
            Section::Domains => self.component.domains.len(),
            Section::Connectors => self.component.connectors.len(),
            Section::Strands => self.component.strands.len(),
            Section::Structures => self.component.structures.len(),
            Section::Reactions => self.component.reactions.len(),
        }
    }

    fn resolve(&mut self, declaration: &'a Declaration) -> Result<()> {
        match declaration {
            Declaration::Domain(d) => self.domain(d),
            Declaration::Connector(c) => self.connector(c),
            Declaration::Strand(s) => self.strand(s),
            Declaration::Structure(s) => self.structure(s),
            Declaration::Reaction(r) => self.reaction(r),
        }
    }

    fn domain(&mut self, decl: &DomainDecl) -> Result<()> {
        let length = match &decl.length {
            LengthSpec::Literal(n) => LengthClass::Fixed(*n),
            LengthSpec::Param(p) if self.component.params.contains(p) => LengthClass::Param(p.clone()),
            LengthSpec::Param(p) => {
                return Err(CompileError::UnknownParameter {
                    name: p.clone(),
                    line: decl.line,
                })
            }
        };
        self.component
            .domains
            .declare(&decl.name, length, decl.constraint.clone(), decl.line)?;
        Ok(())
    }

    /// A domain reference visible from `line`.
    fn domain_ref(&self, r: &SeqRef, line: usize) -> Result<DomainRef> {
        match self.component.domains.get(&r.name) {
            Some(id) if self.component.domains.domain(id).line < line => {
                Ok(DomainRef::new(id, Orientation::from_marker(r.complement)))
            }
            _ => Err(CompileError::UnknownDomain {
                name: r.name.clone(),
                line,
                hint: self.later(&self.names.sequences, &r.name, line),
            }),
        }
    }

    /// Hint for a name declared on or after the line that uses it.
    fn later(&self, table: &HashMap<String, usize>, name: &str, line: usize) -> String {
        later_hint(table.get(name).copied().filter(|&l| l >= line))
    }

    fn connector(&mut self, decl: &'a ConnectorDecl) -> Result<()> {
        let domains = decl
            .refs
            .iter()
            .map(|r| self.domain_ref(r, decl.line))
            .collect::<Result<DomainRefVec>>()?;

        let header = &self.ast.header;
        let role = if header.inputs.contains(&decl.name) {
            ConnectorRole::Input
        } else if header.outputs.contains(&decl.name) {
            ConnectorRole::Output
        } else {
            ConnectorRole::Internal
        };

        let id = ConnectorId(self.component.connectors.len());
        self.component.connectors.push(Connector {
            name: decl.name.clone(),
            role,
            domains,
            line: decl.line,
        });
        self.connectors.insert(&decl.name, id);
        Ok(())
    }

    fn check_header_connectors(&self) -> Result<()> {
        let header = &self.ast.header;
        for name in header.inputs.iter().chain(&header.outputs) {
            if !self.connectors.contains_key(name.as_str()) {
                return Err(CompileError::UnknownConnector {
                    name: name.clone(),
                    line: header.line,
                });
            }
        }
        Ok(())
    }

    /// A connector declared before `line`.
    fn visible_connector(&self, name: &str, line: usize) -> Option<ConnectorId> {
        self.connectors
            .get(name)
            .copied()
            .filter(|id| self.component.connector(*id).line < line)
    }

    fn strand(&mut self, decl: &'a StrandDecl) -> Result<()> {
        let mut domains = DomainRefVec::new();
        for r in &decl.refs {
            if let Ok(d) = self.domain_ref(r, decl.line) {
                domains.push(d);
                continue;
            }
            match self.visible_connector(&r.name, decl.line) {
                Some(id) => {
                    let seq = &self.component.connector(id).domains;
                    if r.complement {
                        domains.extend(reverse_complement(seq));
                    } else {
                        domains.extend(seq.iter().copied());
                    }
                }
                None => {
                    return Err(CompileError::UnknownDomain {
                        name: r.name.clone(),
                        line: decl.line,
                        hint: self.later(&self.names.sequences, &r.name, decl.line),
                    })
                }
            }
        }

        let strand = StrandBuilder::new(&self.component.domains).build(&decl.name, domains, decl.line)?;
        let id = StrandId(self.component.strands.len());
        self.component.strands.push(strand);
        self.strands.insert(&decl.name, id);
        Ok(())
    }

    fn structure(&mut self, decl: &'a StructureDecl) -> Result<()> {
        let strand_ids = decl
            .strands
            .iter()
            .map(|name| {
                self.strands
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| CompileError::UnknownStrand {
                        name: name.clone(),
                        line: decl.line,
                        hint: self.later(&self.names.strands, name, decl.line),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let structure = StructureBuilder::new(&self.component.domains, &self.component.strands)
            .at_column(decl.notation_column)
            .build(&decl.name, strand_ids, &decl.notation, decl.line)?;
        let id = StructureId(self.component.structures.len());
        self.component.structures.push(structure);
        self.structures.insert(&decl.name, id);
        Ok(())
    }

    /// Structures take precedence; a connector name is a free signal strand.
    fn species(&self, name: &str, line: usize) -> Result<Species> {
        let structure = self
            .structures
            .get(name)
            .copied()
            .filter(|id| self.component.structure(*id).line < line);
        if let Some(id) = structure {
            return Ok(Species::Structure(id));
        }
        if let Some(id) = self.visible_connector(name, line) {
            return Ok(Species::Signal(id));
        }
        let later = self
            .names
            .structures
            .get(name)
            .or_else(|| self.names.sequences.get(name))
            .copied()
            .filter(|&l| l >= line);
        Err(CompileError::UnknownStructure {
            name: name.to_string(),
            line,
            hint: later_hint(later),
        })
    }

    fn reaction(&mut self, decl: &ReactionDecl) -> Result<()> {
        let kind = ReactionKind::from_keyword(&decl.keyword).ok_or_else(|| {
            CompileError::UnknownReactionKind {
                keyword: decl.keyword.clone(),
                line: decl.line,
            }
        })?;
        if decl.rates.len() > kind.max_rates() {
            return Err(CompileError::syntax(
                decl.line,
                1,
                format!("at most {} rate for a {kind} reaction", kind.max_rates()),
                format!("{} rates", decl.rates.len()),
            ));
        }
        let rates = decl.rates.first().map(|&forward| Rates {
            forward,
            reverse: decl.rates.get(1).copied(),
        });

        // A coefficient repeats the species, so balance counts every copy.
        let side = |terms: &[SpeciesTerm]| -> Result<Vec<Species>> {
            let mut species = Vec::new();
            for term in terms {
                let s = self.species(&term.name, decl.line)?;
                species.extend(std::iter::repeat(s).take(term.count));
            }
            Ok(species)
        };
        let reactants = side(&decl.reactants)?;
        let products = side(&decl.products)?;

        let reaction = ReactionBalancer::new(&self.component).check(
            kind,
            reactants,
            products,
            rates,
            decl.line,
        )?;
        self.component.reactions.push(reaction);
        Ok(())
    }
}
