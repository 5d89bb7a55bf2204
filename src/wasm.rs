//! WASM bindings for dsdcomp core.
//!
//! Browser editors compile a description and receive the same JSON the
//! CLI writes with `--json`.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { compile_component } from 'dsdcomp_core';
//!
//! await init();
//!
//! const model = JSON.parse(compile_component(editor.getValue()));
//! for (const d of model.diagnostics) {
//!   markLine(d.line, d.message);
//! }
//! ```

use std::sync::Arc;

use wasm_bindgen::prelude::*;

use crate::circuit::{compose, Binding, ComposeOptions};
use crate::component::compile_str;
use crate::error::CompileError;
use crate::export::ModelExport;
use crate::rates::{annotate_circuit, annotate_component, DefaultRates};

fn to_js(error: CompileError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Compile one description and return the exported model as JSON.
///
/// A compile error is thrown as its message, which names the line.
#[wasm_bindgen]
pub fn compile_component(text: &str) -> Result<String, JsValue> {
    let compilation = compile_str(text).map_err(to_js)?;
    let rates = annotate_component(&compilation.component, &DefaultRates::new());
    ModelExport::new(vec![&compilation.component])
        .with_rates(rates)
        .with_diagnostics(compilation.warnings.clone())
        .to_json()
        .map_err(to_js)
}

/// Compile several descriptions, bind them and return the circuit as JSON.
///
/// Each binding is written `component.OUT=component.IN`.
#[wasm_bindgen]
pub fn compose_components(
    texts: Vec<String>,
    bindings: Vec<String>,
    allow_feedback: bool,
) -> Result<String, JsValue> {
    let mut components = Vec::with_capacity(texts.len());
    let mut warnings = Vec::new();
    for text in &texts {
        let compilation = compile_str(text).map_err(to_js)?;
        warnings.extend(compilation.warnings);
        components.push(Arc::new(compilation.component));
    }

    let bindings = bindings
        .iter()
        .map(|b| b.parse::<Binding>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|message| to_js(CompileError::WasmError { message }))?;

    let options = ComposeOptions::new().with_allow_feedback(allow_feedback);
    let circuit = compose(components.iter().cloned(), &bindings, &options).map_err(to_js)?;
    warnings.extend(circuit.diagnostics.iter().cloned());

    let rates = annotate_circuit(&circuit, &DefaultRates::new());
    ModelExport::new(components.iter().map(|c| c.as_ref()).collect())
        .with_circuit(&circuit)
        .with_rates(rates)
        .with_diagnostics(warnings)
        .to_json()
        .map_err(to_js)
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
