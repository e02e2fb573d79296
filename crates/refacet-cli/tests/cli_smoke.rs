use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "refacet-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_refacet<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_refacet");
    Command::new(bin)
        .args(args)
        .output()
        .expect("refacet command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_exit_code(output: &Output, expected: i32) {
    assert_eq!(
        output.status.code(),
        Some(expected),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected valid JSON stdout, got error: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

const TOKEN_JSON: &str = r#"{
    "name": "Token",
    "functions": [
        {"name": "transfer", "selector": "0xa9059cbb",
         "inputs": ["address", "uint256"], "outputs": ["uint256"]}
    ],
    "interfaces": [{"name": "IToken", "functions": ["transfer"]}],
    "versions": [
        {"version": "v1", "exports": ["IToken"],
         "slots": [{"slot": "balances", "type": "mapping(address=>uint256)"}]}
    ],
    "implementations": [
        {"name": "im_transfer", "facet": "F1",
         "reads": ["balances"], "writes": ["balances"]}
    ],
    "bindings": {"transfer": "im_transfer"}
}"#;

const TOKEN_TOML: &str = r#"name = "Token"

[[functions]]
name = "transfer"
selector = "0xa9059cbb"
inputs = ["address", "uint256"]
outputs = ["uint256"]

[[interfaces]]
name = "IToken"
functions = ["transfer"]

[[versions]]
version = "v1"
exports = ["IToken"]

[[versions.slots]]
slot = "balances"
type = "mapping(address=>uint256)"

[[implementations]]
name = "im_transfer"
facet = "F1"
reads = ["balances"]
writes = ["balances"]

[bindings]
transfer = "im_transfer"
"#;

fn write_package(dir: &Path, file: &str, contents: &str) -> PathBuf {
    let path = dir.join(file);
    fs::write(&path, contents).expect("package file should be written");
    path
}

#[test]
fn validate_sound_package_exits_zero() {
    let tmp = TempDirGuard::new("validate-ok");
    let pkg = write_package(tmp.path(), "token.json", TOKEN_JSON);

    let output = run_refacet(["validate", pkg.to_str().unwrap()]);
    assert_success(&output);
    assert!(stdout_text(&output).contains("structurally sound"));
}

#[test]
fn validate_unsound_package_exits_one_and_writes_nothing() {
    let tmp = TempDirGuard::new("validate-bad");
    let tainted = TOKEN_JSON.replace(
        r#""writes": ["balances"]"#,
        r#""writes": ["balances", "reserve"]"#,
    );
    let pkg = write_package(tmp.path(), "token.json", &tainted);

    let output = run_refacet(["validate", pkg.to_str().unwrap()]);
    assert_exit_code(&output, 1);
    assert!(stdout_text(&output).contains("PKG-7"));

    // Validation is side-effect-free: only the input file exists.
    let entries: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn malformed_input_exits_two() {
    let tmp = TempDirGuard::new("validate-malformed");
    let pkg = write_package(tmp.path(), "broken.json", "{ not json");

    let output = run_refacet(["validate", pkg.to_str().unwrap()]);
    assert_exit_code(&output, 2);
}

#[test]
fn shape_error_exits_two() {
    let tmp = TempDirGuard::new("validate-shape");
    let bad_selector = TOKEN_JSON.replace("0xa9059cbb", "0xa9059c");
    let pkg = write_package(tmp.path(), "token.json", &bad_selector);

    let output = run_refacet(["validate", pkg.to_str().unwrap()]);
    assert_exit_code(&output, 2);
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("transfer"),
        "shape error should name the function"
    );
}

#[test]
fn emit_writes_artifacts_deterministically() {
    let tmp = TempDirGuard::new("emit-ok");
    let pkg = write_package(tmp.path(), "token.json", TOKEN_JSON);
    let out_dir = tmp.path().join("out");
    let out = out_dir.to_str().unwrap().to_string();

    let output = run_refacet(["emit", pkg.to_str().unwrap(), "--out", &out]);
    assert_success(&output);

    let ref_path = out_dir.join("PACKAGE_INST_Token.ref");
    let glue_path = out_dir.join("PACKAGE_GLUE_Token.mch");
    let first_ref = fs::read(&ref_path).expect("refinement should exist");
    let first_glue = fs::read(&glue_path).expect("glue should exist");
    assert!(
        String::from_utf8_lossy(&first_ref).contains("f_transfer|->im_transfer"),
        "refinement should contain the binding pair"
    );

    let output = run_refacet(["emit", pkg.to_str().unwrap(), "--out", &out]);
    assert_success(&output);
    assert_eq!(fs::read(&ref_path).unwrap(), first_ref);
    assert_eq!(fs::read(&glue_path).unwrap(), first_glue);
}

#[test]
fn emit_on_unsound_package_writes_nothing() {
    let tmp = TempDirGuard::new("emit-bad");
    let tainted = TOKEN_JSON.replace(
        r#""writes": ["balances"]"#,
        r#""writes": ["balances", "reserve"]"#,
    );
    let pkg = write_package(tmp.path(), "token.json", &tainted);
    let out_dir = tmp.path().join("out");

    let output = run_refacet([
        "emit",
        pkg.to_str().unwrap(),
        "--out",
        out_dir.to_str().unwrap(),
    ]);
    assert_exit_code(&output, 1);
    assert!(!out_dir.exists(), "no artifacts may exist for an unsafe package");
}

#[test]
fn toml_package_is_accepted() {
    let tmp = TempDirGuard::new("validate-toml");
    let pkg = write_package(tmp.path(), "token.toml", TOKEN_TOML);

    let output = run_refacet(["validate", pkg.to_str().unwrap()]);
    assert_success(&output);
}

#[test]
fn validate_json_output_is_parseable() {
    let tmp = TempDirGuard::new("validate-json");
    let pkg = write_package(tmp.path(), "token.json", TOKEN_JSON);

    let output = run_refacet(["validate", pkg.to_str().unwrap(), "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["package"], "Token");
    assert_eq!(payload["sound"], true);
    assert_eq!(payload["diagnostics"].as_array().unwrap().len(), 0);
}

#[test]
fn compose_detects_cross_package_overlap() {
    let tmp = TempDirGuard::new("compose-overlap");
    let token = write_package(tmp.path(), "token.json", TOKEN_JSON);
    let shadow = TOKEN_JSON
        .replace("\"Token\"", "\"Shadow\"")
        .replace("transfer", "sneak");
    let shadow = write_package(tmp.path(), "shadow.json", &shadow);

    let output = run_refacet([
        "compose",
        token.to_str().unwrap(),
        shadow.to_str().unwrap(),
    ]);
    assert_exit_code(&output, 1);
    let text = stdout_text(&output);
    assert!(text.contains("DIA-1"), "selector overlap should be reported:\n{text}");
    assert!(text.contains("DIA-2"), "storage overlap should be reported:\n{text}");
}

#[test]
fn compose_of_disjoint_packages_succeeds() {
    let tmp = TempDirGuard::new("compose-ok");
    let token = write_package(tmp.path(), "token.json", TOKEN_JSON);
    let vault = r#"{
        "name": "Vault",
        "functions": [
            {"name": "deposit", "selector": "0xd0e30db0", "inputs": [], "outputs": []}
        ],
        "interfaces": [{"name": "IVault", "functions": ["deposit"]}],
        "versions": [
            {"version": "v1", "exports": ["IVault"],
             "slots": [{"slot": "reserves", "type": "uint256"}]}
        ],
        "implementations": [
            {"name": "im_deposit", "facet": "F2",
             "reads": ["reserves"], "writes": ["reserves"]}
        ],
        "bindings": {"deposit": "im_deposit"},
        "dependsOn": [{"name": "Token", "version": "v1"}]
    }"#;
    let vault = write_package(tmp.path(), "vault.json", vault);

    let output = run_refacet([
        "compose",
        token.to_str().unwrap(),
        vault.to_str().unwrap(),
    ]);
    assert_success(&output);
    assert!(stdout_text(&output).contains("composition is structurally sound"));
}
