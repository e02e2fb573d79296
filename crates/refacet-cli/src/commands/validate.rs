use crate::support::{EXIT_DIAGNOSTICS, load_model_or_exit, print_diagnostics};
use serde_json::json;

pub fn run(package: String, json_output: bool) {
    let model = load_model_or_exit(&package);
    let diagnostics = refacet_check::validate(&model);

    if json_output {
        let payload = json!({
            "package": model.name.to_string(),
            "sound": diagnostics.is_empty(),
            "diagnostics": diagnostics,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!("refacet validate {}", model.name);
        if diagnostics.is_empty() {
            println!("  structurally sound");
        } else {
            println!("  {} violation(s):", diagnostics.len());
            print_diagnostics(&diagnostics);
        }
    }

    if !diagnostics.is_empty() {
        std::process::exit(EXIT_DIAGNOSTICS);
    }
}
