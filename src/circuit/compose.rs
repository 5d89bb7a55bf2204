//! Circuit composition.
//!
//! A [`Composer`] collects compiled components, validates each binding as
//! it is added, and finally builds a [`Circuit`]: one merged domain table
//! and one reaction network over all components.
//!
//! Domains are unified with a union-find over `(component, domain)` keys.
//! Binding two components unifies every domain name they share; domains
//! of components that are never bound together stay distinct even when
//! their names coincide.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Serialize, Serializer};

use super::graph::BindingGraph;
use super::network::{NetworkReaction, NetworkSpecies, ReactionNetwork};
use super::types::{Binding, ComponentIdx, ConnectorRef};
use super::validate::{check_roles, check_sequences, check_shared_domains};
use crate::component::{
    Component, ConnectorId, ConnectorRole, DomainId, DomainRef, LengthClass, Species,
    SpeciesDomains, StructureId,
};
use crate::error::{CompileError, Diagnostic, Result};

/// Options for [`Composer::compose`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Accept binding cycles as an intended feedback topology.
    pub allow_feedback: bool,
}

impl ComposeOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept (and flag) cyclic bindings instead of rejecting them.
    pub fn with_allow_feedback(mut self, allow_feedback: bool) -> Self {
        self.allow_feedback = allow_feedback;
        self
    }
}

/// A domain of the composed circuit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedDomain {
    /// Bare domain name, or `component.domain` when two unrelated
    /// domains share the bare name
    pub name: String,
    pub length: LengthClass,
    pub constraint: Option<String>,
    /// Every `component.domain` unified into this domain
    pub members: Vec<String>,
}

/// A connector left unbound, forming the circuit's interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalConnector {
    pub connector: ConnectorRef,
    pub role: ConnectorRole,
    /// Sequence in merged domain ids
    pub domains: Vec<DomainRef>,
    /// Index of the signal species in the network
    pub species: usize,
}

/// A validated composition of components.
#[derive(Debug, Clone, Serialize)]
pub struct Circuit {
    /// Shared, read-only components; exported by name only
    #[serde(serialize_with = "component_names")]
    pub components: Vec<Arc<Component>>,
    pub bindings: Vec<Binding>,
    pub domains: Vec<MergedDomain>,
    pub network: ReactionNetwork,
    pub interface: Vec<ExternalConnector>,
    /// The binding graph contains a cycle that was explicitly allowed
    pub feedback: bool,
    pub diagnostics: Vec<Diagnostic>,
}

fn component_names<S: Serializer>(
    components: &[Arc<Component>],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(components.iter().map(|c| c.name.as_str()))
}

impl Circuit {
    /// Unbound input connectors.
    pub fn inputs(&self) -> impl Iterator<Item = &ExternalConnector> {
        self.interface.iter().filter(|c| c.role == ConnectorRole::Input)
    }

    /// Unbound output connectors.
    pub fn outputs(&self) -> impl Iterator<Item = &ExternalConnector> {
        self.interface.iter().filter(|c| c.role == ConnectorRole::Output)
    }

    /// The merged domain a component's domain ended up in.
    pub fn merged_domain(&self, component: &str, domain: &str) -> Option<&MergedDomain> {
        let member = format!("{component}.{domain}");
        self.domains.iter().find(|d| d.members.contains(&member))
    }
}

/// Disjoint sets over dense integer keys.
#[derive(Debug, Clone, Default)]
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn grow(&mut self, extra: usize) {
        let start = self.parent.len();
        self.parent.extend(start..start + extra);
    }

    fn find(&self, mut x: usize) -> usize {
        while self.parent[x] != x {
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Keep the earlier key as root so merged names are stable.
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

#[derive(Debug, Clone)]
struct ResolvedBinding {
    binding: Binding,
    output: (ComponentIdx, ConnectorId),
    input: (ComponentIdx, ConnectorId),
}

/// Incrementally builds a circuit.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    components: Vec<Arc<Component>>,
    by_name: HashMap<String, ComponentIdx>,
    /// First union-find key of each component's domains
    offsets: Vec<usize>,
    domains: UnionFind,
    bindings: Vec<ResolvedBinding>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a compiled component. Names must be unique within a circuit.
    pub fn add(&mut self, component: Arc<Component>) -> Result<ComponentIdx> {
        if self.by_name.contains_key(&component.name) {
            return Err(CompileError::DuplicateComponent {
                name: component.name.clone(),
            });
        }
        let idx = ComponentIdx(self.components.len());
        self.offsets.push(self.domains.parent.len());
        self.domains.grow(component.domains.len());
        self.by_name.insert(component.name.clone(), idx);
        debug!("added component '{}' as {idx}", component.name);
        self.components.push(component);
        Ok(idx)
    }

    pub fn component(&self, name: &str) -> Option<&Arc<Component>> {
        self.by_name.get(name).map(|idx| &self.components[idx.0])
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().map(|b| &b.binding)
    }

    fn locate(&self, r: &ConnectorRef, binding: &Binding) -> Result<(ComponentIdx, ConnectorId)> {
        let idx = *self
            .by_name
            .get(&r.component)
            .ok_or_else(|| CompileError::UnknownComponent {
                name: r.component.clone(),
            })?;
        let connector = self.components[idx.0]
            .find_connector(&r.connector)
            .ok_or_else(|| {
                CompileError::invalid_binding(
                    &binding.output,
                    &binding.input,
                    format!("component '{}' has no connector '{}'", r.component, r.connector),
                )
            })?;
        Ok((idx, connector))
    }

    fn key(&self, component: ComponentIdx, domain: DomainId) -> usize {
        self.offsets[component.0] + domain.0
    }

    /// Bind an output connector to an input connector.
    ///
    /// Everything is checked before anything is recorded, so a failed
    /// binding leaves the composer unchanged.
    pub fn bind(&mut self, output: &ConnectorRef, input: &ConnectorRef) -> Result<()> {
        let binding = Binding::new(output.clone(), input.clone());
        let (pc, po) = self.locate(output, &binding)?;
        let (cc, ci) = self.locate(input, &binding)?;
        let producer = Arc::clone(&self.components[pc.0]);
        let consumer = Arc::clone(&self.components[cc.0]);

        check_roles(&binding, producer.connector(po), consumer.connector(ci))?;
        if let Some(existing) = self.bindings.iter().find(|b| b.input == (cc, ci)) {
            return Err(CompileError::invalid_binding(
                output,
                input,
                format!("'{input}' is already fed by '{}'", existing.binding.output),
            ));
        }
        check_sequences(
            &binding,
            &producer,
            producer.connector(po),
            &consumer,
            consumer.connector(ci),
        )?;
        check_shared_domains(&producer, &consumer)?;

        for (id, domain) in producer.domains.iter() {
            if let Some(other) = consumer.domains.get(&domain.name) {
                let (a, b) = (self.key(pc, id), self.key(cc, other));
                self.domains.union(a, b);
            }
        }
        debug!("bound {binding}");
        self.bindings.push(ResolvedBinding {
            binding,
            output: (pc, po),
            input: (cc, ci),
        });
        Ok(())
    }

    /// Build the circuit from everything added and bound so far.
    pub fn compose(&self, options: &ComposeOptions) -> Result<Circuit> {
        let mut diagnostics = Vec::new();
        let mut graph = BindingGraph::new(self.components.len());
        for b in &self.bindings {
            graph.add_edge(b.output.0, b.input.0);
        }

        let feedback = match graph.find_cycle() {
            None => false,
            Some(cycle) => {
                let names: Vec<String> = cycle
                    .iter()
                    .map(|idx| self.components[idx.0].name.clone())
                    .collect();
                if !options.allow_feedback {
                    return Err(CompileError::CyclicBinding { cycle: names });
                }
                let message = format!("feedback binding cycle accepted: {}", names.join(" -> "));
                warn!("{message}");
                diagnostics.push(Diagnostic::warning(None, message));
                true
            }
        };

        let (domains, domain_map) = self.merge_domains();
        let mut builder = NetworkBuilder::new(&self.components, &domain_map, &self.bindings);
        for (ci, component) in self.components.iter().enumerate() {
            for s in 0..component.structures.len() {
                builder.species(ci, Species::Structure(StructureId(s)));
            }
            for reaction in &component.reactions {
                let reactants = reaction.reactants.iter().map(|s| builder.species(ci, *s)).collect();
                let products = reaction.products.iter().map(|s| builder.species(ci, *s)).collect();
                builder.network.reactions.push(NetworkReaction {
                    component: component.name.clone(),
                    kind: reaction.kind,
                    reactants,
                    products,
                    rates: reaction.rates,
                });
            }
        }

        let mut interface = Vec::new();
        for (ci, component) in self.components.iter().enumerate() {
            for (id, connector) in component.connectors.iter().enumerate() {
                let key = (ComponentIdx(ci), ConnectorId(id));
                let bound = match connector.role {
                    ConnectorRole::Input => self.bindings.iter().any(|b| b.input == key),
                    ConnectorRole::Output => self.bindings.iter().any(|b| b.output == key),
                    ConnectorRole::Internal => continue,
                };
                if bound {
                    continue;
                }
                let species = builder.species(ci, Species::Signal(ConnectorId(id)));
                interface.push(ExternalConnector {
                    connector: ConnectorRef::new(&component.name, &connector.name),
                    role: connector.role,
                    domains: builder.network.species[species].domains.clone(),
                    species,
                });
            }
        }

        let network = builder.network;
        info!(
            "composed circuit: {} components, {} bindings, {} domains, {} species, {} reactions",
            self.components.len(),
            self.bindings.len(),
            domains.len(),
            network.species.len(),
            network.reactions.len()
        );

        Ok(Circuit {
            components: self.components.clone(),
            bindings: self.bindings.iter().map(|b| b.binding.clone()).collect(),
            domains,
            network,
            interface,
            feedback,
            diagnostics,
        })
    }

    /// Merged domain table plus, per component, the merged index of each domain.
    fn merge_domains(&self) -> (Vec<MergedDomain>, Vec<Vec<usize>>) {
        let mut merged: Vec<MergedDomain> = Vec::new();
        let mut by_root: HashMap<usize, usize> = HashMap::new();
        let mut bare_names: Vec<String> = Vec::new();
        let mut domain_map = Vec::with_capacity(self.components.len());

        for (ci, component) in self.components.iter().enumerate() {
            let mut local = Vec::with_capacity(component.domains.len());
            for (id, domain) in component.domains.iter() {
                let root = self.domains.find(self.key(ComponentIdx(ci), id));
                let member = format!("{}.{}", component.name, domain.name);
                let index = *by_root.entry(root).or_insert_with(|| {
                    merged.push(MergedDomain {
                        name: member.clone(),
                        length: domain.length.clone(),
                        constraint: domain.constraint.clone(),
                        members: Vec::new(),
                    });
                    bare_names.push(domain.name.clone());
                    merged.len() - 1
                });
                if merged[index].constraint.is_none() {
                    merged[index].constraint = domain.constraint.clone();
                }
                merged[index].members.push(member);
                local.push(index);
            }
            domain_map.push(local);
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for name in &bare_names {
            *counts.entry(name.as_str()).or_insert(0) += 1;
        }
        for (domain, bare) in merged.iter_mut().zip(&bare_names) {
            if counts[bare.as_str()] == 1 {
                domain.name = bare.clone();
            }
        }
        (merged, domain_map)
    }
}

/// Allocates network species, aliasing bound inputs to their producers.
struct NetworkBuilder<'a> {
    components: &'a [Arc<Component>],
    domain_map: &'a [Vec<usize>],
    fed_by: HashMap<(usize, ConnectorId), (usize, ConnectorId)>,
    index: HashMap<(usize, Species), usize>,
    network: ReactionNetwork,
}

impl<'a> NetworkBuilder<'a> {
    fn new(
        components: &'a [Arc<Component>],
        domain_map: &'a [Vec<usize>],
        bindings: &[ResolvedBinding],
    ) -> Self {
        let fed_by = bindings
            .iter()
            .map(|b| ((b.input.0 .0, b.input.1), (b.output.0 .0, b.output.1)))
            .collect();
        Self {
            components,
            domain_map,
            fed_by,
            index: HashMap::new(),
            network: ReactionNetwork::default(),
        }
    }

    fn species(&mut self, component: usize, species: Species) -> usize {
        let (component, species) = match species {
            Species::Signal(id) => match self.fed_by.get(&(component, id)) {
                Some(&(producer, output)) => (producer, Species::Signal(output)),
                None => (component, species),
            },
            Species::Structure(_) => (component, species),
        };
        if let Some(&i) = self.index.get(&(component, species)) {
            return i;
        }

        let owner = &self.components[component];
        let domains = owner
            .species_domains(&species)
            .into_iter()
            .map(|d| DomainRef::new(DomainId(self.domain_map[component][d.id.0]), d.orientation))
            .collect();
        let i = self.network.species.len();
        self.network.species.push(NetworkSpecies {
            name: format!("{}.{}", owner.name, owner.species_name(&species)),
            domains,
            signal: matches!(species, Species::Signal(_)),
        });
        self.index.insert((component, species), i);
        i
    }
}

/// Compose components in one call.
pub fn compose(
    components: impl IntoIterator<Item = Arc<Component>>,
    bindings: &[Binding],
    options: &ComposeOptions,
) -> Result<Circuit> {
    let mut composer = Composer::new();
    for component in components {
        composer.add(component)?;
    }
    for binding in bindings {
        composer.bind(&binding.output, &binding.input)?;
    }
    composer.compose(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::compile_str;

    fn component(text: &str) -> Arc<Component> {
        Arc::new(compile_str(text).unwrap().component)
    }

    fn r(text: &str) -> ConnectorRef {
        text.parse().unwrap()
    }

    /// Consumes `x = a b`, releases `y = b a`.
    fn stage(name: &str, x: &str, y: &str, a: &str, b: &str) -> Arc<Component> {
        component(&format!(
            "declare component {name}: {x} -> {y}
sequence {a} : 10
sequence {b} : 10
sequence {x} = {a} {b}
sequence {y} = {b} {a}
strand Top = {y}
strand Sx = {x}
strand Bot = {a}* {b}* {a}*
structure Gate = Top + Bot : \"((+)).\"
structure Waste = Sx + Bot : \"((+.))\"
kinetic Gate + {x} -> {y} + Waste
"
        ))
    }

    #[test]
    fn test_stage_is_valid() {
        let c = stage("s", "X", "Y", "u", "v");
        assert_eq!(c.reactions.len(), 1);
    }

    #[test]
    fn test_chain_merges_domains_and_signals() {
        let mut composer = Composer::new();
        composer.add(stage("p", "X", "Y", "u", "v")).unwrap();
        composer.add(stage("q", "Y", "Z", "v", "u")).unwrap();
        composer.bind(&r("p.Y"), &r("q.Y")).unwrap();
        let circuit = composer.compose(&ComposeOptions::new()).unwrap();

        assert!(!circuit.feedback);
        assert_eq!(circuit.domains.len(), 2);
        assert_eq!(circuit.merged_domain("q", "v").unwrap().name, "v");
        assert_eq!(circuit.merged_domain("p", "u").unwrap().members, vec!["p.u", "q.u"]);

        let network = &circuit.network;
        assert!(network.is_conserved());
        assert_eq!(network.reactions.len(), 2);
        assert_eq!(network.describe(&network.reactions[1]), "q.Gate + p.Y -> q.Z + q.Waste");
        assert_eq!(network.species_index("q.Y"), None);

        let interface: Vec<String> = circuit.interface.iter().map(|c| c.connector.to_string()).collect();
        assert_eq!(interface, vec!["p.X", "q.Z"]);
        assert_eq!(circuit.inputs().count(), 1);
        assert_eq!(circuit.outputs().count(), 1);
    }

    #[test]
    fn test_shared_domain_keeps_constraint() {
        let src = component("declare component src: -> Y\nsequence u = \"ACGT\" : 4\nsequence Y = u\n");
        let same = component("declare component same: Y ->\nsequence u = \"acgt\" : 4\nsequence Y = u\n");
        let other = component("declare component other: Y ->\nsequence u = \"CCCC\" : 4\nsequence Y = u\n");

        let mut composer = Composer::new();
        composer.add(src).unwrap();
        composer.add(same).unwrap();
        composer.add(other).unwrap();
        let err = composer.bind(&r("src.Y"), &r("other.Y")).unwrap_err();
        assert!(matches!(err, CompileError::DomainConflict { ref domain, .. } if domain == "u"));

        composer.bind(&r("src.Y"), &r("same.Y")).unwrap();
        let circuit = composer.compose(&ComposeOptions::new()).unwrap();
        let u = circuit.merged_domain("same", "u").unwrap();
        assert_eq!(u.constraint.as_deref(), Some("ACGT"));
        assert_eq!(u.members, vec!["src.u", "same.u"]);
    }

    #[test]
    fn test_unbound_components_keep_domains_apart() {
        let circuit = compose(
            [stage("p", "X", "Y", "u", "v"), stage("q", "A", "B", "u", "v")],
            &[],
            &ComposeOptions::new(),
        )
        .unwrap();
        let names: Vec<&str> = circuit.domains.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["p.u", "p.v", "q.u", "q.v"]);
        assert_eq!(circuit.interface.len(), 4);
    }

    #[test]
    fn test_rejected_binding_leaves_composer_unchanged() {
        let mut composer = Composer::new();
        composer.add(stage("p", "X", "Y", "u", "v")).unwrap();
        composer.add(stage("q", "Y", "Z", "v", "u")).unwrap();
        assert!(matches!(
            composer.bind(&r("p.X"), &r("q.Y")),
            Err(CompileError::InvalidBinding { .. })
        ));
        assert!(matches!(
            composer.bind(&r("p.Y"), &r("nobody.Y")),
            Err(CompileError::UnknownComponent { .. })
        ));
        assert!(matches!(
            composer.bind(&r("p.Q"), &r("q.Y")),
            Err(CompileError::InvalidBinding { .. })
        ));
        assert_eq!(composer.bindings().count(), 0);

        composer.bind(&r("p.Y"), &r("q.Y")).unwrap();
        let err = composer.bind(&r("p.Y"), &r("q.Y")).unwrap_err();
        assert!(err.to_string().contains("already fed"));
        assert_eq!(composer.bindings().count(), 1);
    }

    #[test]
    fn test_duplicate_component() {
        let mut composer = Composer::new();
        composer.add(stage("p", "X", "Y", "u", "v")).unwrap();
        assert!(matches!(
            composer.add(stage("p", "A", "B", "u", "v")),
            Err(CompileError::DuplicateComponent { .. })
        ));
        assert!(composer.component("p").is_some());
    }

    #[test]
    fn test_self_binding_checks_sequence() {
        let looped = stage("loop", "X", "X2", "u", "v");
        let mut composer = Composer::new();
        composer.add(looped).unwrap();
        // X2 = v u, X = u v
        assert!(matches!(
            composer.bind(&r("loop.X2"), &r("loop.X")),
            Err(CompileError::ConnectorMismatch { position: 1, .. })
        ));
    }

    #[test]
    fn test_cycle_rejected_unless_feedback() {
        let parts = || [stage("p", "X", "Y", "u", "v"), stage("q", "Y", "X", "v", "u")];
        let bindings = [
            "p.Y=q.Y".parse::<Binding>().unwrap(),
            "q.X=p.X".parse::<Binding>().unwrap(),
        ];
        match compose(parts(), &bindings, &ComposeOptions::new()) {
            Err(CompileError::CyclicBinding { cycle }) => assert_eq!(cycle, vec!["p", "q", "p"]),
            other => panic!("expected cyclic binding, got {other:?}"),
        }

        let options = ComposeOptions::new().with_allow_feedback(true);
        let circuit = compose(parts(), &bindings, &options).unwrap();
        assert!(circuit.feedback);
        assert_eq!(circuit.diagnostics.len(), 1);
        assert!(!circuit.diagnostics[0].is_error());
        assert!(circuit.interface.is_empty());
        assert!(circuit.network.is_conserved());
    }

    #[test]
    fn test_serialized_circuit_names_components() {
        let circuit = compose([stage("p", "X", "Y", "u", "v")], &[], &ComposeOptions::new()).unwrap();
        let json = serde_json::to_value(&circuit).unwrap();
        assert_eq!(json["components"], serde_json::json!(["p"]));
        assert_eq!(json["feedback"], serde_json::json!(false));
    }
}
