use crate::support::{
    EXIT_DIAGNOSTICS, EXIT_MALFORMED, load_model_or_exit, print_diagnostics,
};
use refacet_emit::{emit, totalize};
use serde_json::json;
use std::path::Path;

pub fn run(package: String, out: String, json_output: bool) {
    let model = load_model_or_exit(&package);
    let diagnostics = refacet_check::validate(&model);

    // The gate: an unsafe package never produces output artifacts.
    if !diagnostics.is_empty() {
        if json_output {
            let payload = json!({
                "package": model.name.to_string(),
                "sound": false,
                "diagnostics": diagnostics,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).expect("json serialization")
            );
        } else {
            println!("refacet emit {}", model.name);
            println!("  {} violation(s), nothing emitted:", diagnostics.len());
            print_diagnostics(&diagnostics);
        }
        std::process::exit(EXIT_DIAGNOSTICS);
    }

    let artifacts = emit(&totalize(&model));

    let out_dir = Path::new(&out);
    if let Err(e) = std::fs::create_dir_all(out_dir) {
        eprintln!("error: failed to create {}: {e}", out_dir.display());
        std::process::exit(EXIT_MALFORMED);
    }
    let mut written = Vec::new();
    for artifact in [&artifacts.refinement, &artifacts.glue] {
        let path = out_dir.join(&artifact.file_name);
        if let Err(e) = std::fs::write(&path, &artifact.contents) {
            eprintln!("error: failed to write {}: {e}", path.display());
            std::process::exit(EXIT_MALFORMED);
        }
        written.push((path, &artifact.digest));
    }

    if json_output {
        let payload = json!({
            "package": model.name.to_string(),
            "sound": true,
            "artifacts": written
                .iter()
                .map(|(path, digest)| json!({
                    "path": path.display().to_string(),
                    "digest": digest,
                }))
                .collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!("refacet emit {}", model.name);
        for (path, digest) in &written {
            println!("  {} sha256:{digest}", path.display());
        }
    }
}
