//! CLI parsing and batch execution tests.

use clap::Parser;
use ferry::cli::{Cli, Commands, InputArgs, effective_options, run_inputs};
use ferry::config::FerryConfig;
use ferry_core::FerryError;
use std::path::PathBuf;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("arguments parse")
}

// =============================================================================
// ARGUMENTS
// =============================================================================

#[test]
fn extract_collects_repeated_flags() {
    let cli = parse(&[
        "ferry",
        "--json-mode",
        "extract",
        "a.cpp",
        "b.cpp",
        "-I",
        "include",
        "-I",
        "vendor",
        "--exclude-pattern",
        "/usr/",
        "--no-follow-includes",
        "-o",
        "out.json",
    ]);

    assert!(cli.json_mode);
    let Some(Commands::Extract { input, output }) = cli.command else {
        unreachable!("extract expected");
    };
    assert_eq!(input.inputs, vec![PathBuf::from("a.cpp"), PathBuf::from("b.cpp")]);
    assert_eq!(
        input.include_dirs,
        vec![PathBuf::from("include"), PathBuf::from("vendor")]
    );
    assert_eq!(input.exclude_patterns, vec!["/usr/"]);
    assert!(input.no_follow_includes);
    assert_eq!(output, Some(PathBuf::from("out.json")));
}

#[test]
fn global_flags_follow_the_subcommand() {
    let cli = parse(&["ferry", "check", "--source", "int f();", "-v", "-c", "alt.toml"]);
    assert!(cli.verbose);
    assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
    let Some(Commands::Check { input }) = cli.command else {
        unreachable!("check expected");
    };
    assert_eq!(input.sources, vec!["int f();"]);
}

#[test]
fn verbose_and_quiet_conflict() {
    assert!(Cli::try_parse_from(["ferry", "-v", "-q", "normalize", "int"]).is_err());
}

#[test]
fn normalize_takes_one_spelling() {
    let cli = parse(&["ferry", "normalize", "const int &"]);
    assert!(matches!(
        cli.command,
        Some(Commands::Normalize { spelling }) if spelling == "const int &"
    ));
}

// =============================================================================
// EXECUTION
// =============================================================================

#[test]
fn flags_extend_configuration() {
    let mut config = FerryConfig::default();
    config.parser.include_dirs.push(PathBuf::from("include"));
    let args = InputArgs {
        include_dirs: vec![PathBuf::from("vendor")],
        no_follow_includes: true,
        ..InputArgs::default()
    };

    let options = effective_options(&config, &args);
    assert_eq!(
        options.include_dirs,
        vec![PathBuf::from("include"), PathBuf::from("vendor")]
    );
    assert!(!options.follow_includes);
}

#[test]
fn no_input_is_an_error() {
    let error = run_inputs(&FerryConfig::default(), &InputArgs::default())
        .err()
        .expect("error");
    assert!(matches!(error, FerryError::Config(_)));
}

#[test]
fn reports_keep_input_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("api.cpp");
    std::fs::write(
        &file,
        "#include <cstdint>\nstd::int32_t add(std::int32_t a, std::int32_t b) { return a + b; }\n",
    )
    .expect("write");

    let args = InputArgs {
        inputs: vec![file.clone()],
        sources: vec!["int * raw();".to_string()],
        ..InputArgs::default()
    };
    let reports = run_inputs(&FerryConfig::default(), &args).expect("reports");

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].input, file.display().to_string());
    assert_eq!(reports[0].catalog.function_count(), 1);
    assert!(reports[0].diagnostics.is_empty());

    assert_eq!(reports[1].input, "<source 1>");
    assert_eq!(reports[1].catalog.function_count(), 0);
    assert_eq!(reports[1].diagnostics.len(), 1);

    let json = serde_json::to_value(&reports).expect("serialize");
    assert_eq!(json[0]["catalog"][0]["function_list"][0]["name"], "add");
    assert_eq!(json[1]["diagnostics"][0]["entity"], "raw");
}
