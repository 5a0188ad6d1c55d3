//! Integration tests for `cackle init`
//!
//! - Creates cackle.toml, packages/, static/ and tsconfig.json
//! - Installs the base tooling, then the runtime dependency
//! - Refuses an existing project without --force

mod common;

use cackle::core::global_config::ToolsConfig;
use cackle::core::manifest::Manifest;
use common::{output_text, sh, TestProject};

fn recording_npm() -> ToolsConfig {
    ToolsConfig {
        npm: sh("echo \"$@\" >> npm.log"),
        ..ToolsConfig::default()
    }
}

#[test]
fn test_init_creates_project() {
    let project = TestProject::new().with_tools(recording_npm());

    let output = project.cackle(&["init"]);
    assert!(output.status.success(), "{}", output_text(&output));

    assert!(project.file_exists("packages"));
    assert!(project.file_exists("static"));
    assert!(project.file_exists("tsconfig.json"));

    let manifest = Manifest::from_toml(&project.read_file("cackle.toml")).unwrap();
    assert_eq!(manifest.prefix, "ckl");
    assert!(manifest.packages.is_empty());
}

#[test]
fn test_init_installs_tooling_in_order() {
    let project = TestProject::new().with_tools(recording_npm());

    let output = project.cackle(&["init"]);
    assert!(output.status.success(), "{}", output_text(&output));

    let log = project.read_file("npm.log");
    let calls: Vec<&str> = log.lines().collect();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].starts_with("install --save-dev"));
    assert!(calls[0].contains("webpack"));
    assert_eq!(calls[1], "install --save @babel/runtime");
}

#[test]
fn test_init_refuses_existing_project() {
    let project = TestProject::new()
        .with_manifest("prefix = \"mine\"\npackages = []\n")
        .with_tools(recording_npm());

    let output = project.cackle(&["init"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output_text(&output).contains("--force"));
    assert!(project.read_file("cackle.toml").contains("mine"));
    assert!(!project.file_exists("npm.log"));
}

#[test]
fn test_init_force_overwrites() {
    let project = TestProject::new()
        .with_manifest("prefix = \"mine\"\npackages = []\n")
        .with_tools(recording_npm());

    let output = project.cackle(&["init", "--force"]);
    assert!(output.status.success(), "{}", output_text(&output));
    assert!(project.read_file("cackle.toml").contains("prefix = \"ckl\""));
}

#[test]
fn test_init_reports_install_failure() {
    let project = TestProject::new().with_tools(ToolsConfig {
        npm: sh("echo 'network down' >&2; exit 1"),
        ..ToolsConfig::default()
    });

    let output = project.cackle(&["init"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output_text(&output).contains("network down"));
}
