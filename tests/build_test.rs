//! Integration tests for `cackle build`
//!
//! - Builds every named package and reports each one
//! - A failing package does not stop or hide the others; exit status 1
//! - Unknown packages are reported as not found
//! - Run options reach the backend

mod common;

use cackle::core::global_config::ToolsConfig;
use common::{output_text, sh, succeed, TestProject, MIXED_MANIFEST};

#[test]
fn test_partial_failure_reports_both_packages() {
    let project = TestProject::new()
        .with_manifest(MIXED_MANIFEST)
        .with_package("ckl-a")
        .with_package("ckl-b")
        .with_tools(ToolsConfig {
            webpack: sh("echo boom >&2; exit 1"),
            rollup: succeed(),
            ..ToolsConfig::default()
        });

    let output = project.cackle(&["build", "a", "b"]);
    let text = output_text(&output);

    assert_eq!(output.status.code(), Some(1), "{text}");
    assert!(text.contains("build ckl-a"), "{text}");
    assert!(text.contains("boom"), "{text}");
    assert!(text.contains("ckl-b: built with rollup"), "{text}");
    assert!(text.contains("1 of 2 targets failed"), "{text}");
}

#[test]
fn test_build_success() {
    let project = TestProject::new()
        .with_manifest(MIXED_MANIFEST)
        .with_package("ckl-a")
        .with_tools(ToolsConfig {
            webpack: succeed(),
            ..ToolsConfig::default()
        });

    let output = project.cackle(&["build", "a"]);
    assert!(output.status.success(), "{}", output_text(&output));
    assert!(project.file_exists(".cackle/webpack/ckl-a.config.js"));
}

#[test]
fn test_generated_config_follows_run_options() {
    let project = TestProject::new()
        .with_manifest(MIXED_MANIFEST)
        .with_package("ckl-a")
        .with_tools(ToolsConfig {
            webpack: succeed(),
            ..ToolsConfig::default()
        });

    let output = project.cackle(&["build", "a", "-p", "--app", "--features", "typescript"]);
    assert!(output.status.success(), "{}", output_text(&output));

    let config = project.read_file(".cackle/webpack/ckl-a.config.js");
    assert!(config.contains("\"mode\": \"production\""));
    assert!(config.contains("@babel/polyfill"));
    assert!(config.contains("@babel/preset-typescript"));
    assert!(config.contains("\"library\": \"cklA\""));
}

#[test]
fn test_missing_package_is_not_found() {
    let project = TestProject::new()
        .with_manifest(MIXED_MANIFEST)
        .with_tools(ToolsConfig {
            webpack: succeed(),
            ..ToolsConfig::default()
        });

    let output = project.cackle(&["build", "missing"]);
    let text = output_text(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(text.contains("Package 'ckl-missing' not found in manifest"), "{text}");
}

#[test]
fn test_missing_entry_point_is_reported() {
    let project = TestProject::new()
        .with_manifest(MIXED_MANIFEST)
        .with_tools(ToolsConfig {
            webpack: succeed(),
            ..ToolsConfig::default()
        });

    let output = project.cackle(&["build", "a"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output_text(&output).contains("No entry point"));
}

#[test]
fn test_broken_manifest_degrades_to_empty() {
    let project = TestProject::new().with_manifest("packages = [[[");

    let output = project.cackle(&["build", "a"]);
    let text = output_text(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(text.contains("Failed to load manifest"), "{text}");
    assert!(text.contains("not found in manifest"), "{text}");
}
