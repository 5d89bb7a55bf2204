//! Warning-level checks over a compiled component.
//!
//! Nothing here stops compilation; callers decide whether warnings matter
//! (see [`Compilation::strict`](super::Compilation::strict)).

use std::collections::HashSet;

use super::domain::DomainId;
use super::reaction::{ReactionKind, Species};
use super::strand::StrandId;
use super::structure::StructureId;
use super::Component;
use crate::error::Diagnostic;

/// Run every lint; diagnostics come back ordered by source line.
pub fn lint(component: &Component) -> Vec<Diagnostic> {
    let mut warnings = Vec::new();
    unused_domains(component, &mut warnings);
    unused_strands(component, &mut warnings);
    disconnected_structures(component, &mut warnings);
    unused_structures(component, &mut warnings);
    catalysts(component, &mut warnings);
    warnings.sort_by_key(|d| d.line);
    warnings
}

fn unused_domains(component: &Component, warnings: &mut Vec<Diagnostic>) {
    let used: HashSet<DomainId> = component
        .connectors
        .iter()
        .map(|c| &c.domains)
        .chain(component.strands.iter().map(|s| &s.domains))
        .flat_map(|refs| refs.iter().map(|d| d.id))
        .collect();

    for (id, domain) in component.domains.iter() {
        if !used.contains(&id) {
            warnings.push(Diagnostic::warning(
                Some(domain.line),
                format!("domain '{}' is declared but never used", domain.name),
            ));
        }
    }
}

fn unused_strands(component: &Component, warnings: &mut Vec<Diagnostic>) {
    let used: HashSet<StrandId> = component
        .structures
        .iter()
        .flat_map(|s| s.strands.iter().copied())
        .collect();

    for (i, strand) in component.strands.iter().enumerate() {
        if !used.contains(&StrandId(i)) {
            warnings.push(Diagnostic::warning(
                Some(strand.line),
                format!("strand '{}' is not part of any structure", strand.name),
            ));
        }
    }
}

fn disconnected_structures(component: &Component, warnings: &mut Vec<Diagnostic>) {
    for structure in &component.structures {
        if !structure.pairs.strands_connected() {
            warnings.push(Diagnostic::warning(
                Some(structure.line),
                format!(
                    "structure '{}' has strands that are not held together by any pair",
                    structure.name
                ),
            ));
        }
    }
}

fn unused_structures(component: &Component, warnings: &mut Vec<Diagnostic>) {
    let used: HashSet<StructureId> = component
        .reactions
        .iter()
        .flat_map(|r| r.reactants.iter().chain(&r.products))
        .filter_map(|s| match s {
            Species::Structure(id) => Some(*id),
            Species::Signal(_) => None,
        })
        .collect();

    for (i, structure) in component.structures.iter().enumerate() {
        if !used.contains(&StructureId(i)) {
            warnings.push(Diagnostic::warning(
                Some(structure.line),
                format!("structure '{}' takes part in no reaction", structure.name),
            ));
        }
    }
}

fn catalysts(component: &Component, warnings: &mut Vec<Diagnostic>) {
    for reaction in &component.reactions {
        if reaction.kind == ReactionKind::Catalytic && reaction.catalysts().is_empty() {
            warnings.push(Diagnostic::warning(
                Some(reaction.line),
                "catalytic reaction has no species on both sides",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::compile_str;

    fn warnings(text: &str) -> Vec<String> {
        compile_str(text)
            .unwrap()
            .warnings
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn test_clean_component() {
        let text = "\
declare component hairpin(long): ->
sequence a : long
sequence b : 3
strand H = a b a*
structure Hp = H : \"(.)\"
catalytic Hp -> Hp
";
        assert!(warnings(text).is_empty());
    }

    #[test]
    fn test_each_lint_fires() {
        let text = "\
declare component messy(long): ->
sequence a : long
sequence spare : long
sequence L = a
sequence R = a*
strand Lone = L
strand Other = R
strand H = a a*
structure Hp = H : \"()\"
structure Apart = Lone + Other : \".+.\"
structure Idle = H : \"..\"
catalytic Hp -> Hp
catalytic Apart -> L + R
";
        let found = warnings(text);
        assert_eq!(
            found,
            vec![
                "domain 'spare' is declared but never used".to_string(),
                "structure 'Apart' has strands that are not held together by any pair".to_string(),
                "structure 'Idle' takes part in no reaction".to_string(),
                "catalytic reaction has no species on both sides".to_string(),
            ]
        );
    }

    #[test]
    fn test_unused_strand() {
        let text = "\
declare component c: ->
sequence a : 5
strand S = a
strand T = a a*
structure D = T : \"()\"
kinetic D -> D
";
        assert_eq!(warnings(text), vec!["strand 'S' is not part of any structure".to_string()]);
    }
}
