//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::{InputArgs, Outcome};
use crate::config::FerryConfig;
use ferry_core::{
    Aggregator, AggregatorOptions, Catalog, CppParser, Diagnostic, FerryError, Policy,
    RejectStructs, SourceInput, simple_var_type,
};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, FerryError> {
    serde_json::to_string_pretty(value).map_err(|e| FerryError::Serialization(e.to_string()))
}

// =============================================================================
// BATCH EXECUTION
// =============================================================================

/// The result of one input.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// The input path, or `<source N>` for inline text.
    pub input: String,
    pub catalog: Catalog,
    pub diagnostics: Vec<Diagnostic>,
}

/// Configuration values with command-line flags applied on top.
#[must_use]
pub fn effective_options(config: &FerryConfig, args: &InputArgs) -> AggregatorOptions {
    let mut options = config.aggregator_options();
    options.include_dirs.extend(args.include_dirs.iter().cloned());
    options
        .include_patterns
        .extend(args.include_patterns.iter().cloned());
    options
        .exclude_patterns
        .extend(args.exclude_patterns.iter().cloned());
    if args.no_follow_includes {
        options.follow_includes = false;
    }
    options
}

fn labelled_inputs(args: &InputArgs) -> Vec<(String, SourceInput)> {
    let files = args
        .inputs
        .iter()
        .map(|path| (path.display().to_string(), SourceInput::Path(path.clone())));
    let inline = args
        .sources
        .iter()
        .enumerate()
        .map(|(i, text)| (format!("<source {}>", i + 1), SourceInput::Inline(text.clone())));
    files.chain(inline).collect()
}

/// Run every input as an independent aggregation, in parallel.
///
/// Reports come back in input order. The first failing input fails the batch.
pub fn run_inputs(config: &FerryConfig, args: &InputArgs) -> Result<Vec<RunReport>, FerryError> {
    let inputs = labelled_inputs(args);
    if inputs.is_empty() {
        return Err(FerryError::Config(
            "no input given (pass a file or --source)".to_string(),
        ));
    }

    let parser = CppParser::new();
    let policy = config.policy();
    let aggregator = Aggregator::new(&parser, &policy, effective_options(config, args))?;
    tracing::info!(inputs = inputs.len(), "Extraction started");

    inputs
        .par_iter()
        .map(|(label, input)| -> Result<RunReport, FerryError> {
            let mut diagnostics = Vec::new();
            let mut sink = |diagnostic: &Diagnostic| {
                tracing::warn!(
                    input = %label,
                    entity = %diagnostic.entity,
                    reasons = diagnostic.reasons.len(),
                    "Entity rejected"
                );
                diagnostics.push(diagnostic.clone());
            };
            let catalog = aggregator.obtain(input, &mut sink)?;
            tracing::info!(
                input = %label,
                files = catalog.len(),
                functions = catalog.function_count(),
                structs = catalog.struct_count(),
                rejected = diagnostics.len(),
                "Input processed"
            );
            Ok(RunReport {
                input: label.clone(),
                catalog,
                diagnostics,
            })
        })
        .collect()
}

// =============================================================================
// EXTRACT COMMAND
// =============================================================================

/// Write the JSON report of every input to `output` or stdout.
pub fn cmd_extract(
    config: &FerryConfig,
    args: &InputArgs,
    output: Option<&Path>,
) -> Result<(), FerryError> {
    let reports = run_inputs(config, args)?;
    let json = to_pretty_json(&reports)?;

    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .map_err(|e| FerryError::Io(format!("{}: {}", path.display(), e)))?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Print every rejection; `Outcome::Rejections` when there was any.
pub fn cmd_check(
    config: &FerryConfig,
    args: &InputArgs,
    json_mode: bool,
) -> Result<Outcome, FerryError> {
    let reports = run_inputs(config, args)?;
    let rejected: usize = reports.iter().map(|r| r.diagnostics.len()).sum();
    let functions: usize = reports.iter().map(|r| r.catalog.function_count()).sum();
    let structs: usize = reports.iter().map(|r| r.catalog.struct_count()).sum();

    if json_mode {
        let output = serde_json::json!({
            "functions": functions,
            "structs": structs,
            "rejected": rejected,
            "diagnostics": reports
                .iter()
                .map(|r| serde_json::json!({ "input": r.input, "diagnostics": r.diagnostics }))
                .collect::<Vec<_>>(),
        });
        println!("{}", to_pretty_json(&output)?);
    } else {
        for report in &reports {
            for diagnostic in &report.diagnostics {
                let location = match (&diagnostic.origin, diagnostic.line) {
                    (Some(origin), Some(line)) => format!("{}:{}", origin.display(), line),
                    (Some(origin), None) => origin.display().to_string(),
                    (None, Some(line)) => format!("{}:{}", report.input, line),
                    (None, None) => report.input.clone(),
                };
                println!("{}", location);
                print!("{}", diagnostic);
            }
        }
        println!();
        println!("Ferry Check");
        println!("===========");
        println!("Inputs:    {}", reports.len());
        println!("Functions: {}", functions);
        println!("Structs:   {}", structs);
        println!("Rejected:  {}", rejected);
    }

    Ok(if rejected == 0 {
        Outcome::Clean
    } else {
        Outcome::Rejections
    })
}

// =============================================================================
// NORMALIZE COMMAND
// =============================================================================

/// Show the simple form of a spelling and whether the policy accepts it.
///
/// No source is loaded, so struct names are never accepted here.
pub fn cmd_normalize(config: &FerryConfig, spelling: &str, json_mode: bool) -> Result<(), FerryError> {
    let simple = simple_var_type(spelling);
    let accepted = config.policy().accept(&simple, &mut RejectStructs);

    if json_mode {
        let output = serde_json::json!({
            "spelling": spelling,
            "simple_type": simple,
            "accepted": accepted,
        });
        println!("{}", to_pretty_json(&output)?);
        return Ok(());
    }

    println!("Spelling:    {}", spelling);
    println!("Simple type: {}", simple);
    println!(
        "Verdict:     {}",
        if accepted { "accepted" } else { "rejected" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn json_output_is_pretty() {
        let json = to_pretty_json(&serde_json::json!({ "rejected": 1 })).expect("json");
        assert_eq!(json, "{\n  \"rejected\": 1\n}");
    }

    #[test]
    fn json_failure_is_an_error() {
        let mut keyed_by_tuple = BTreeMap::new();
        keyed_by_tuple.insert((1_u8, 2_u8), 3_u8);
        let error = to_pretty_json(&keyed_by_tuple).err().expect("error");
        assert!(matches!(error, FerryError::Serialization(_)));
    }
}
