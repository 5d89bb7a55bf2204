//! Property checks over compilation and composition.

use std::sync::Arc;

use dsdcomp_core::circuit::{compose, Binding, ComposeOptions};
use dsdcomp_core::component::compile_str;
use dsdcomp_core::error::CompileError;
use dsdcomp_core::export::ModelExport;
use proptest::prelude::*;

const AND: &str = include_str!("../fixtures/leakless_and.comp");
const TRANSLATE: &str = include_str!("../fixtures/leakless_translate.comp");
const AND_NOTATION: &str = "((((((((((+.)))))))))).";

fn circuit_json(translate_name: &str) -> String {
    let and = Arc::new(compile_str(AND).unwrap().component);
    let text = TRANSLATE.replace("leakless_translate", translate_name);
    let translate = Arc::new(compile_str(&text).unwrap().component);
    let binding: Binding = format!("leakless_and.F={translate_name}.AB").parse().unwrap();
    let circuit = compose(
        vec![Arc::clone(&and), Arc::clone(&translate)],
        &[binding],
        &ComposeOptions::new(),
    )
    .unwrap();
    ModelExport::new(vec![and.as_ref(), translate.as_ref()])
        .with_circuit(&circuit)
        .to_json()
        .unwrap()
}

proptest! {
    #[test]
    fn composition_is_deterministic(name in "[a-z][a-z0-9_]{0,8}") {
        prop_assume!(name != "leakless_and");
        prop_assert_eq!(circuit_json(&name), circuit_json(&name));
    }

    #[test]
    fn bad_notation_is_an_error_not_a_panic(notation in "[().+]{0,30}") {
        prop_assume!(notation != AND_NOTATION);
        let text = AND.replace(AND_NOTATION, &notation);
        match compile_str(&text) {
            Ok(_) => {}
            Err(e) => prop_assert!(
                matches!(
                    e,
                    CompileError::UnbalancedStructure { .. }
                        | CompileError::StructureLengthMismatch { .. }
                        | CompileError::NonComplementaryPair { .. }
                ),
                "unexpected error: {}",
                e
            ),
        }
    }

    #[test]
    fn flipping_an_output_domain_breaks_balance(i in 0usize..10) {
        let domains = ["d2", "d1", "c3", "c2", "c1", "b3", "b2", "b1", "a3", "a2"];
        let mut flipped: Vec<String> = domains.iter().map(|d| d.to_string()).collect();
        flipped[i].push('*');
        let text = AND.replace(
            &format!("sequence F = {}", domains.join(" ")),
            &format!("sequence F = {}", flipped.join(" ")),
        );
        match compile_str(&text) {
            Err(CompileError::Balance { unmatched, .. }) => {
                prop_assert_eq!(
                    unmatched,
                    vec![format!("{} (+1)", domains[i]), format!("{}* (-1)", domains[i])]
                );
            }
            other => prop_assert!(false, "expected a balance error, got {:?}", other),
        }
    }

    #[test]
    fn compilation_is_repeatable(extra in 1usize..40) {
        let text = AND.replace("### Domains\n", &format!("### Domains\nsequence spare : {extra}\n"));
        let first = compile_str(&text).unwrap();
        let second = compile_str(&text).unwrap();
        prop_assert_eq!(&first.component, &second.component);
        prop_assert_eq!(first.warnings.len(), 1);
    }
}
