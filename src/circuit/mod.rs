//! Circuit composition.
//!
//! Compiled components are wired together by binding output connectors to
//! input connectors. The [`Composer`] validates each binding as it is
//! made; [`Composer::compose`] then produces a [`Circuit`] holding the
//! merged domain table, the unified [`ReactionNetwork`] and the unbound
//! connectors that form the circuit's external interface.

mod compose;
mod graph;
mod network;
mod types;
mod validate;

pub use compose::{compose, Circuit, ComposeOptions, Composer, ExternalConnector, MergedDomain};
pub use graph::BindingGraph;
pub use network::{NetworkReaction, NetworkSpecies, ReactionNetwork};
pub use types::*;
pub use validate::{check_roles, check_sequences, check_shared_domains};
