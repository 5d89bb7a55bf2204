//! # dsdcomp core
//!
//! A compiler for DNA strand-displacement gate components.
//!
//! This library provides:
//! - A small line-oriented language for describing one gate component
//! - Resolution and validation of domains, strands, structures and reactions
//! - Composition of compiled components into circuits with a unified reaction network
//! - Rate annotations and a JSON export for downstream simulators
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Parser for the component description language
//! - [`component`] - Compiled component model and its validation
//! - [`circuit`] - Binding components together into circuits
//! - [`rates`] - Rate constants attached as separate annotations
//! - [`batch`] - Compiling many descriptions, in parallel when enabled
//! - [`export`] - Structured JSON output
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! dsdcomp leakless_and.comp leakless_translate.comp \
//!     --bind leakless_and.F=leakless_translate.AB --json
//! ```
//!
//! ### Library
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use dsdcomp_core::circuit::{ComposeOptions, Composer, ConnectorRef};
//! use dsdcomp_core::{compile_str, dsl};
//!
//! # fn main() -> dsdcomp_core::Result<()> {
//! let and = compile_str(&dsl::read_file(Path::new("leakless_and.comp"))?)?;
//! let translate = compile_str(&dsl::read_file(Path::new("leakless_translate.comp"))?)?;
//!
//! let mut composer = Composer::new();
//! composer.add(Arc::new(and.component))?;
//! composer.add(Arc::new(translate.component))?;
//! composer.bind(
//!     &ConnectorRef::new("leakless_and", "F"),
//!     &ConnectorRef::new("leakless_translate", "AB"),
//! )?;
//! let circuit = composer.compose(&ComposeOptions::new())?;
//! assert!(circuit.network.is_conserved());
//! # Ok(())
//! # }
//! ```
//!
//! ## Validation
//!
//! Compilation stops at the first error in a component. Each error carries
//! the source line it was found on. Problems that do not make a component
//! unusable (an unused domain, a structure no reaction mentions) are
//! reported as warnings next to the compiled component.

pub mod batch;
pub mod circuit;
pub mod component;
pub mod dsl;
pub mod error;
pub mod export;
pub mod rates;

// Re-export main types for convenience
pub use circuit::{Circuit, Composer};
pub use component::{compile, compile_str, Component};
pub use error::{CompileError, Diagnostic, Result};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::compile_component;
