use crate::support::{EXIT_DIAGNOSTICS, load_model_or_exit, print_diagnostics};
use refacet_check::{validate, validate_composition};
use refacet_model::PackageModel;
use serde_json::json;

pub fn run(packages: Vec<String>, json_output: bool) {
    let models: Vec<PackageModel> = packages
        .iter()
        .map(|path| load_model_or_exit(path))
        .collect();

    // Members must be individually sound before the cross-package pass.
    let mut member_failures = Vec::new();
    for model in &models {
        let diagnostics = validate(model);
        if !diagnostics.is_empty() {
            member_failures.push((model.name.to_string(), diagnostics));
        }
    }

    if !member_failures.is_empty() {
        if json_output {
            let payload = json!({
                "sound": false,
                "members": member_failures
                    .iter()
                    .map(|(name, diagnostics)| json!({
                        "package": name,
                        "diagnostics": diagnostics,
                    }))
                    .collect::<Vec<_>>(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).expect("json serialization")
            );
        } else {
            println!("refacet compose: member packages are not sound");
            for (name, diagnostics) in &member_failures {
                println!("  package {name}: {} violation(s)", diagnostics.len());
                print_diagnostics(diagnostics);
            }
        }
        std::process::exit(EXIT_DIAGNOSTICS);
    }

    let refs: Vec<&PackageModel> = models.iter().collect();
    let diagnostics = validate_composition(&refs);

    if json_output {
        let payload = json!({
            "sound": diagnostics.is_empty(),
            "packages": models.iter().map(|m| m.name.to_string()).collect::<Vec<_>>(),
            "diagnostics": diagnostics,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!("refacet compose ({} packages)", models.len());
        if diagnostics.is_empty() {
            println!("  composition is structurally sound");
        } else {
            println!("  {} violation(s):", diagnostics.len());
            print_diagnostics(&diagnostics);
        }
    }

    if !diagnostics.is_empty() {
        std::process::exit(EXIT_DIAGNOSTICS);
    }
}
