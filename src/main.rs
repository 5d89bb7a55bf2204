//! dsdcomp - strand-displacement component compiler
//!
//! Compiles component descriptions, optionally binds them into a circuit,
//! and prints every diagnostic to stderr.
//!
//! # Usage
//!
//! ```bash
//! dsdcomp leakless_and.comp leakless_translate.comp \
//!     --bind leakless_and.F=leakless_translate.AB --json -o circuit.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dsdcomp_core::{
    batch::{compile_files, CompileOptions},
    circuit::{compose, Binding, ComposeOptions},
    error::{CompileError, Diagnostic, Result},
    export::ModelExport,
    rates::{annotate_circuit, DefaultRates},
};
use log::LevelFilter;

/// DNA strand-displacement component compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Component description files
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Feed an output connector into an input connector (repeatable)
    #[arg(short, long = "bind", value_name = "COMP.OUT=COMP.IN")]
    bind: Vec<Binding>,

    /// Accept cyclic bindings as feedback instead of rejecting them
    #[arg(long)]
    allow_feedback: bool,

    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,

    /// Compile files one after another
    #[arg(long)]
    sequential: bool,

    /// Print the compiled model as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Write the compiled model as JSON to a file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", Diagnostic::from_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every stage succeeded; diagnostics are already printed.
fn run(args: &Args) -> Result<bool> {
    let options = CompileOptions::new()
        .with_strict(args.strict)
        .with_parallel(!args.sequential);
    let reports = compile_files(&args.files, &options);

    let mut warnings = Vec::new();
    for report in &reports {
        for diagnostic in &report.diagnostics {
            eprintln!("{diagnostic}");
            if !diagnostic.is_error() {
                warnings.push(diagnostic.clone());
            }
        }
    }
    if !reports.iter().all(|r| r.is_ok()) {
        return Ok(false);
    }

    let components: Vec<Arc<_>> = reports.into_iter().filter_map(|r| r.component).collect();
    let compose_options = ComposeOptions::new().with_allow_feedback(args.allow_feedback);
    let circuit = match compose(components.iter().cloned(), &args.bind, &compose_options) {
        Ok(circuit) => circuit,
        Err(e) => {
            eprintln!("{}", Diagnostic::from_error(&e));
            return Ok(false);
        }
    };
    for diagnostic in &circuit.diagnostics {
        eprintln!("{diagnostic}");
    }
    warnings.extend(circuit.diagnostics.iter().cloned());

    if args.strict && !circuit.diagnostics.is_empty() {
        let e = CompileError::StrictWarnings {
            count: circuit.diagnostics.len(),
        };
        eprintln!("{}", Diagnostic::from_error(&e));
        return Ok(false);
    }

    if args.json || args.output.is_some() {
        let rates = annotate_circuit(&circuit, &DefaultRates::new());
        let json = ModelExport::new(components.iter().map(|c| c.as_ref()).collect())
            .with_circuit(&circuit)
            .with_rates(rates)
            .with_diagnostics(warnings)
            .to_json()?;
        match &args.output {
            Some(path) => {
                std::fs::write(path, json).map_err(|e| CompileError::OutputUnavailable {
                    path: path.display().to_string(),
                    source: e,
                })?;
            }
            None => println!("{json}"),
        }
    } else {
        for component in &components {
            println!(
                "{}: {} domains, {} strands, {} structures, {} reactions",
                component.name,
                component.domains.len(),
                component.strands.len(),
                component.structures.len(),
                component.reactions.len()
            );
        }
        println!(
            "circuit: {} bindings, {} species, {} reactions, {} external connectors{}",
            circuit.bindings.len(),
            circuit.network.species.len(),
            circuit.network.reactions.len(),
            circuit.interface.len(),
            if circuit.feedback { " (feedback)" } else { "" }
        );
    }

    Ok(true)
}
