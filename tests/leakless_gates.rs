//! End-to-end checks over the leakless gate descriptions in `fixtures/`.

use std::sync::Arc;

use dsdcomp_core::circuit::{compose, Binding, ComposeOptions, Composer, ConnectorRef};
use dsdcomp_core::component::{compile_str, Component, ConnectorRole};
use dsdcomp_core::error::CompileError;
use dsdcomp_core::export::ModelExport;
use dsdcomp_core::rates::{annotate_circuit, DefaultRates};

const AND: &str = include_str!("../fixtures/leakless_and.comp");
const TRANSLATE: &str = include_str!("../fixtures/leakless_translate.comp");

fn component(text: &str) -> Arc<Component> {
    Arc::new(compile_str(text).unwrap().component)
}

fn r(text: &str) -> ConnectorRef {
    text.parse().unwrap()
}

#[test]
fn test_and_gate_compiles_cleanly() {
    let compilation = compile_str(AND).unwrap();
    assert!(compilation.warnings.is_empty(), "{:?}", compilation.warnings);

    let and = compilation.component;
    assert_eq!(and.name, "leakless_and");
    assert_eq!(and.params, vec!["long".to_string(), "short".to_string()]);
    assert_eq!(and.domains.len(), 12);
    assert_eq!(and.strands.len(), 4);
    assert_eq!(and.structures.len(), 2);
    assert_eq!(and.reactions.len(), 1);

    let inputs: Vec<&str> = and.inputs().map(|(_, c)| c.name.as_str()).collect();
    let outputs: Vec<&str> = and.outputs().map(|(_, c)| c.name.as_str()).collect();
    assert_eq!(inputs, vec!["AB", "CD"]);
    assert_eq!(outputs, vec!["F"]);

    let gate = and.structure(and.find_structure("And").unwrap());
    assert_eq!(gate.pairs.pairs().len(), 10);
    assert!(gate.pairs.strands_connected());
}

#[test]
fn test_translate_gate_compiles_cleanly() {
    let compilation = compile_str(TRANSLATE).unwrap();
    assert!(compilation.warnings.is_empty(), "{:?}", compilation.warnings);
    let translate = compilation.component;
    let cd = translate.connector(translate.find_connector("CD").unwrap());
    assert_eq!(cd.role, ConnectorRole::Output);
    assert_eq!(cd.domains.len(), 3);
}

#[test]
fn test_missing_output_domain_breaks_balance() {
    let text = AND.replace("sequence F = d2 d1 c3", "sequence F = d1 c3");
    match compile_str(&text) {
        Err(CompileError::Balance { line, unmatched }) => {
            assert_eq!(line, 36);
            assert_eq!(unmatched, vec!["d2 (+1)".to_string()]);
        }
        other => panic!("expected a balance error, got {other:?}"),
    }
}

#[test]
fn test_unmatched_bracket_in_gate() {
    let text = AND.replace("\"((((((((((+.", "\".(((((((((+.");
    match compile_str(&text) {
        Err(CompileError::UnbalancedStructure { structure, line, .. }) => {
            assert_eq!(structure, "And");
            assert_eq!(line, 32);
        }
        other => panic!("expected an unbalanced structure, got {other:?}"),
    }
}

#[test]
fn test_and_feeds_translate() {
    let and = component(AND);
    let translate = component(TRANSLATE);

    let mut composer = Composer::new();
    composer.add(Arc::clone(&and)).unwrap();
    composer.add(Arc::clone(&translate)).unwrap();
    composer
        .bind(&r("leakless_and.F"), &r("leakless_translate.AB"))
        .unwrap();
    let circuit = composer.compose(&ComposeOptions::new()).unwrap();

    assert!(!circuit.feedback);
    assert!(circuit.diagnostics.is_empty());
    assert!(circuit.network.is_conserved());

    // F and AB are one species; the translator consumes what the AND releases.
    let f = circuit.network.species_index("leakless_and.F").unwrap();
    assert!(circuit.network.species_index("leakless_translate.AB").is_none());
    assert!(circuit.network.reactions[0].products.contains(&f));
    assert!(circuit.network.reactions[1].reactants.contains(&f));

    let shared = circuit.merged_domain("leakless_and", "d2").unwrap();
    assert_eq!(shared.name, "d2");
    assert_eq!(
        shared.members,
        vec!["leakless_and.d2".to_string(), "leakless_translate.d2".to_string()]
    );
    // Both components declare connectors named CD, but the domains differ.
    assert_eq!(circuit.merged_domain("leakless_and", "d3").unwrap().name, "d3");
    assert_eq!(circuit.merged_domain("leakless_translate", "g1").unwrap().name, "g1");

    let inputs: Vec<String> = circuit.inputs().map(|c| c.connector.to_string()).collect();
    let outputs: Vec<String> = circuit.outputs().map(|c| c.connector.to_string()).collect();
    assert_eq!(inputs, vec!["leakless_and.AB", "leakless_and.CD"]);
    assert_eq!(outputs, vec!["leakless_translate.CD"]);
}

#[test]
fn test_swapped_domains_are_rejected() {
    let text = TRANSLATE
        .replace("sequence AB = d2 d1", "sequence AB = d1 d2")
        .replace(
            "strand S_AB = AB",
            "strand S_AB = d2 d1 c3 c2 c1 b3 b2 b1 a3 a2",
        );
    let translate = component(&text);
    let bindings = vec![Binding::new(r("leakless_and.F"), r("leakless_translate.AB"))];
    let err = compose(vec![component(AND), translate], &bindings, &ComposeOptions::new()).unwrap_err();
    match err {
        CompileError::ConnectorMismatch { position, message, .. } => {
            assert_eq!(position, 1);
            assert_eq!(message, "output has 'd2', input expects 'd1'");
        }
        other => panic!("expected a connector mismatch, got {other:?}"),
    }
}

#[test]
fn test_orientation_flip_is_reported() {
    let src = component("declare component src: -> Y\nsequence u : 4\nsequence v : 6\nsequence Y = u v\n");
    let dst = component("declare component dst: Y ->\nsequence u : 4\nsequence v : 6\nsequence Y = u v*\n");
    let bindings = vec![Binding::new(r("src.Y"), r("dst.Y"))];
    match compose(vec![src, dst], &bindings, &ComposeOptions::new()) {
        Err(CompileError::ConnectorMismatch { position, .. }) => assert_eq!(position, 2),
        other => panic!("expected a connector mismatch, got {other:?}"),
    }
}

#[test]
fn test_feedback_loop() {
    // A translator whose output feeds a second copy, and back again.
    let forth = component(
        "declare component forth: X -> Y\nsequence a : 8\nsequence b : 8\nsequence X = a\nsequence Y = b\n",
    );
    let back = component(
        "declare component back: Y -> X\nsequence a : 8\nsequence b : 8\nsequence X = a\nsequence Y = b\n",
    );
    let bindings = vec![
        Binding::new(r("forth.Y"), r("back.Y")),
        Binding::new(r("back.X"), r("forth.X")),
    ];

    let err = compose(
        vec![Arc::clone(&forth), Arc::clone(&back)],
        &bindings,
        &ComposeOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::CyclicBinding { .. }));

    let circuit = compose(
        vec![forth, back],
        &bindings,
        &ComposeOptions::new().with_allow_feedback(true),
    )
    .unwrap();
    assert!(circuit.feedback);
    assert_eq!(circuit.diagnostics.len(), 1);
    assert!(circuit.interface.is_empty());
}

#[test]
fn test_circuit_export() {
    let and = component(AND);
    let translate = component(TRANSLATE);
    let bindings = vec!["leakless_and.F=leakless_translate.AB".parse::<Binding>().unwrap()];
    let circuit = compose(
        vec![Arc::clone(&and), Arc::clone(&translate)],
        &bindings,
        &ComposeOptions::new(),
    )
    .unwrap();

    let rates = annotate_circuit(&circuit, &DefaultRates::new());
    assert_eq!(rates.len(), 2);

    let json = ModelExport::new(vec![and.as_ref(), translate.as_ref()])
        .with_circuit(&circuit)
        .with_rates(rates)
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["components"].as_array().unwrap().len(), 2);
    assert_eq!(value["circuit"]["components"][1], "leakless_translate");
    assert_eq!(value["circuit"]["feedback"], false);
    assert_eq!(
        value["circuit"]["network"]["reactions"].as_array().unwrap().len(),
        2
    );
}
