//! Integration tests: run the validator over fixture packages.
//!
//! Each fixture in tests/fixtures/ has:
//! - package.json: the authored package description
//! - expect.json: the expected diagnostics list (empty for golden cases)
//!
//! The tests parse the description, build the model, validate, and compare
//! the serialized diagnostics to the expected list, including exact
//! messages and ordering.

use refacet_check::validate;
use refacet_model::{PackageDescription, PackageModel};
use serde_json::Value;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);

    let package_path = dir.join("package.json");
    let expect_path = dir.join("expect.json");

    let package_str = std::fs::read_to_string(&package_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", package_path.display()));
    let expect_str = std::fs::read_to_string(&expect_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", expect_path.display()));

    let description: PackageDescription = serde_json::from_str(&package_str)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", package_path.display()));
    let expected: Value = serde_json::from_str(&expect_str)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", expect_path.display()));

    let model = PackageModel::from_description(&description)
        .unwrap_or_else(|e| panic!("fixture {name} failed shape checking: {e}"));

    let diagnostics = validate(&model);
    let got = serde_json::to_value(&diagnostics).expect("diagnostics serialize");

    assert_eq!(
        got,
        expected,
        "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
        serde_json::to_string_pretty(&got).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[test]
fn golden_token() {
    run_fixture("golden_token");
}

#[test]
fn adversarial_selector_collision() {
    run_fixture("adversarial_selector_collision");
}

#[test]
fn adversarial_unexported_binding() {
    run_fixture("adversarial_unexported_binding");
}

#[test]
fn adversarial_undeclared_slot() {
    run_fixture("adversarial_undeclared_slot");
}

#[test]
fn adversarial_internal_export() {
    run_fixture("adversarial_internal_export");
}

#[test]
fn adversarial_slot_type_mutation() {
    run_fixture("adversarial_slot_type_mutation");
}

#[test]
fn adversarial_self_dependency() {
    run_fixture("adversarial_self_dependency");
}
