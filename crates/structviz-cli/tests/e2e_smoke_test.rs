use std::{fs, path::PathBuf};

use tempfile::tempdir;

use structviz_cli::{Args, run};

/// Collects all .json and .txt inputs from a directory
fn collect_inputs(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|s| s.to_str()),
                        Some("json" | "txt")
                    )
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

/// Demo inputs live at the workspace root, not in the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args(input: Option<String>, output: String) -> Args {
    Args {
        input,
        output,
        kind: "auto".to_string(),
        max_ticks: Some(50),
        log_level: Some("off".to_string()),
        ..Args::default()
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_inputs(demos_path());

    assert!(!demos.is_empty(), "No demos found in demos/");

    let mut failed = Vec::new();

    for demo_path in &demos {
        let output_path = temp_dir.path().join(format!(
            "{}.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));
        let args = args(
            Some(demo_path.to_string_lossy().to_string()),
            output_path.to_string_lossy().to_string(),
        );

        match run(&args) {
            Ok(()) => {
                let written = fs::read_to_string(&output_path).expect("Output was written");
                let json: serde_json::Value =
                    serde_json::from_str(&written).expect("Output is valid JSON");
                assert!(json["layout"]["nodes"].is_array(), "{}", demo_path.display());
            }
            Err(e) => failed.push((demo_path.clone(), e)),
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_inputs(demos_path().join("errors"));

    assert!(!demos.is_empty(), "No error demos found in demos/errors/");

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &demos {
        let output_path = temp_dir.path().join(format!(
            "error_{}.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));
        let args = args(
            Some(demo_path.to_string_lossy().to_string()),
            output_path.to_string_lossy().to_string(),
        );

        if run(&args).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
        assert!(!output_path.exists(), "{}", demo_path.display());
    }

    assert!(
        unexpectedly_succeeded.is_empty(),
        "Error demos that succeeded: {unexpectedly_succeeded:?}"
    );
}

#[test]
fn e2e_every_sample_runs() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    for kind in ["array", "grid", "heap", "tree", "linkedlist", "hashtable", "graph"] {
        let output_path = temp_dir.path().join(format!("{kind}.json"));
        let args = Args {
            sample: Some(kind.to_string()),
            ..args(None, output_path.to_string_lossy().to_string())
        };

        run(&args).unwrap_or_else(|err| panic!("{kind}: {err}"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
        assert_eq!(json["kind"], kind);
        assert_eq!(json["layout"]["type"], kind);
    }
}

#[test]
fn e2e_share_token_and_forced_type() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output_path = temp_dir.path().join("shared.json");
    let args = Args {
        share: Some("type=linkedlist&data=4+8+15+16".to_string()),
        ..args(None, output_path.to_string_lossy().to_string())
    };

    run(&args).expect("Share token replays");

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(json["kind"], "linkedlist");
    assert_eq!(json["layout"]["nodes"].as_array().unwrap().len(), 4);
}

#[test]
fn e2e_format_and_strict() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input_path = temp_dir.path().join("input.json");
    fs::write(&input_path, "{\"a\":[1,2]}").unwrap();
    let output_path = temp_dir.path().join("formatted.json");

    let format_args = Args {
        format: true,
        ..args(
            Some(input_path.to_string_lossy().to_string()),
            output_path.to_string_lossy().to_string(),
        )
    };
    run(&format_args).expect("Input formats");
    assert_eq!(
        fs::read_to_string(&output_path).unwrap(),
        "{\n  \"a\": [\n    1,\n    2\n  ]\n}"
    );

    fs::write(&input_path, "1, 2, 3").unwrap();
    let lenient = args(
        Some(input_path.to_string_lossy().to_string()),
        output_path.to_string_lossy().to_string(),
    );
    let formatting = Args {
        format: true,
        ..args(
            Some(input_path.to_string_lossy().to_string()),
            output_path.to_string_lossy().to_string(),
        )
    };
    run(&formatting).expect("Token input formats");
    assert_eq!(
        fs::read_to_string(&output_path).unwrap(),
        "[\n  1,\n  2,\n  3\n]"
    );
    assert!(run(&Args { strict: true, ..formatting }).is_err());

    assert!(run(&lenient).is_ok());
    assert!(run(&Args { strict: true, ..lenient }).is_err());
}
