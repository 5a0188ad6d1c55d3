//! Integration tests for `cackle package` and `cackle bootstrap`
//!
//! Both run the registry client in every manifest package and report one
//! outcome per package.

mod common;

use cackle::core::global_config::ToolsConfig;
use common::{output_text, sh, TestProject, MIXED_MANIFEST};

#[test]
fn test_package_packs_every_entry() {
    let project = TestProject::new()
        .with_manifest(MIXED_MANIFEST)
        .with_package("ckl-a")
        .with_package("ckl-b")
        .with_tools(ToolsConfig {
            npm: sh("echo \"$1\" > called.txt; echo \"$(basename \"$(pwd -P)\")-0.1.0.tgz\""),
            ..ToolsConfig::default()
        });

    let output = project.cackle(&["package"]);
    let text = output_text(&output);

    assert!(output.status.success(), "{text}");
    assert!(text.contains("ckl-a: packed ckl-a-0.1.0.tgz"), "{text}");
    assert!(text.contains("ckl-b: packed ckl-b-0.1.0.tgz"), "{text}");
    assert_eq!(project.read_file("packages/ckl-a/called.txt").trim(), "pack");
}

#[test]
fn test_bootstrap_failure_is_per_package() {
    let project = TestProject::new()
        .with_manifest(MIXED_MANIFEST)
        .with_package("ckl-a")
        .with_package("ckl-b")
        .with_tools(ToolsConfig {
            // only ckl-b fails
            npm: sh("case \"$(pwd -P)\" in *ckl-b) echo 'EACCES' >&2; exit 1;; esac"),
            ..ToolsConfig::default()
        });

    let output = project.cackle(&["bootstrap"]);
    let text = output_text(&output);

    assert_eq!(output.status.code(), Some(1), "{text}");
    assert!(text.contains("ckl-a: linked"), "{text}");
    assert!(text.contains("bootstrap ckl-b"), "{text}");
    assert!(text.contains("EACCES"), "{text}");
}

#[test]
fn test_package_with_empty_manifest_does_nothing() {
    let project = TestProject::new().with_manifest("packages = []\n");

    let output = project.cackle(&["package"]);
    assert!(output.status.success());
    assert!(output_text(&output).contains("nothing to do"));
}
