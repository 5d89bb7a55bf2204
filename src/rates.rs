//! Rate annotations.
//!
//! Physical rate prediction lives outside this crate. A [`RateEstimator`]
//! is the seam an external predictor plugs into; [`DefaultRates`] is the
//! built-in one, which keeps declared rates and fills the rest from the
//! reaction's molecularity. Annotations are returned alongside the model
//! and never written back into it.

use serde::Serialize;

use crate::circuit::Circuit;
use crate::component::{Component, Reaction, ReactionKind};

/// Default bimolecular rate constant (/M/s).
pub const DEFAULT_BIMOLECULAR: f64 = 1e6;

/// Default unimolecular rate constant (/s).
pub const DEFAULT_UNIMOLECULAR: f64 = 1e-3;

/// Where an annotated rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RateSource {
    Declared,
    Estimated,
}

/// Rate constants attached to one reaction of one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateAnnotation {
    pub component: String,
    /// Index into the component's reactions
    pub reaction: usize,
    pub forward: f64,
    /// Only reversible reactions have one
    pub reverse: Option<f64>,
    pub source: RateSource,
}

/// Anything that can put numbers on a reaction.
pub trait RateEstimator {
    fn estimate(&self, component: &Component, reaction: &Reaction) -> (f64, Option<f64>);
}

/// Molecularity-based defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultRates {
    /// Rate used for reactions with one reactant
    pub unimolecular: f64,
    /// Rate used for reactions with two or more reactants
    pub bimolecular: f64,
}

impl Default for DefaultRates {
    fn default() -> Self {
        Self {
            unimolecular: DEFAULT_UNIMOLECULAR,
            bimolecular: DEFAULT_BIMOLECULAR,
        }
    }
}

impl DefaultRates {
    /// Create an estimator with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unimolecular rate constant (/s).
    pub fn with_unimolecular(mut self, rate: f64) -> Self {
        self.unimolecular = rate;
        self
    }

    /// Set the bimolecular rate constant (/M/s).
    pub fn with_bimolecular(mut self, rate: f64) -> Self {
        self.bimolecular = rate;
        self
    }

    fn by_molecularity(&self, species: usize) -> f64 {
        if species <= 1 {
            self.unimolecular
        } else {
            self.bimolecular
        }
    }
}

impl RateEstimator for DefaultRates {
    fn estimate(&self, _component: &Component, reaction: &Reaction) -> (f64, Option<f64>) {
        let forward = reaction
            .rates
            .map(|r| r.forward)
            .unwrap_or_else(|| self.by_molecularity(reaction.reactants.len()));
        let reverse = match reaction.kind {
            ReactionKind::Reversible => Some(
                reaction
                    .rates
                    .and_then(|r| r.reverse)
                    .unwrap_or_else(|| self.by_molecularity(reaction.products.len())),
            ),
            _ => None,
        };
        (forward, reverse)
    }
}

/// Annotate every reaction of a component.
pub fn annotate_component(component: &Component, estimator: &dyn RateEstimator) -> Vec<RateAnnotation> {
    component
        .reactions
        .iter()
        .enumerate()
        .map(|(i, reaction)| {
            let (forward, reverse) = estimator.estimate(component, reaction);
            let fully_declared = match (reaction.rates, reaction.kind) {
                (Some(r), ReactionKind::Reversible) => r.reverse.is_some(),
                (Some(_), _) => true,
                (None, _) => false,
            };
            RateAnnotation {
                component: component.name.clone(),
                reaction: i,
                forward,
                reverse,
                source: if fully_declared {
                    RateSource::Declared
                } else {
                    RateSource::Estimated
                },
            }
        })
        .collect()
}

/// Annotate every reaction of every component in a circuit.
pub fn annotate_circuit(circuit: &Circuit, estimator: &dyn RateEstimator) -> Vec<RateAnnotation> {
    circuit
        .components
        .iter()
        .flat_map(|c| annotate_component(c, estimator))
        .collect()
}
