//! Structured JSON export of compiled models.

use serde::Serialize;

use crate::circuit::Circuit;
use crate::component::Component;
use crate::error::{Diagnostic, Result};
use crate::rates::RateAnnotation;

/// Everything a downstream simulator or renderer needs from one run.
#[derive(Debug, Serialize)]
pub struct ModelExport<'a> {
    pub components: Vec<&'a Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit: Option<&'a Circuit>,
    pub rates: Vec<RateAnnotation>,
    /// Warnings only; a run with errors is never exported
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> ModelExport<'a> {
    pub fn new(components: Vec<&'a Component>) -> Self {
        Self {
            components,
            circuit: None,
            rates: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_circuit(mut self, circuit: &'a Circuit) -> Self {
        self.circuit = Some(circuit);
        self
    }

    pub fn with_rates(mut self, rates: Vec<RateAnnotation>) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
