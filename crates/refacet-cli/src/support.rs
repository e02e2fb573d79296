use refacet_check::Diagnostic;
use refacet_model::{PackageDescription, PackageModel};
use std::path::Path;

/// At least one invariant violation: the package is not structurally safe.
pub const EXIT_DIAGNOSTICS: i32 = 1;
/// The input could not be read, parsed, or modeled at all.
pub const EXIT_MALFORMED: i32 = 2;

pub fn load_model_or_exit(path: &str) -> PackageModel {
    load_model(Path::new(path)).unwrap_or_else(|message| {
        eprintln!("error: {message}");
        std::process::exit(EXIT_MALFORMED);
    })
}

fn load_model(path: &Path) -> Result<PackageModel, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let description: PackageDescription = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&text)
            .map_err(|e| format!("failed to parse {}: {e}", path.display()))?,
        _ => serde_json::from_str(&text)
            .map_err(|e| format!("failed to parse {}: {e}", path.display()))?,
    };
    PackageModel::from_description(&description)
        .map_err(|e| format!("malformed package {}: {e}", path.display()))
}

pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        println!("  {diagnostic}");
    }
}
