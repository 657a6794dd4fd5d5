#[path = "../src/fixture.rs"]
mod fixture;

use class_deps::analysis::Analyzer;
use class_deps::error::DecodeError;
use fixture::ClassFileBuilder;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "class_deps_it_{}_{}_{}",
        std::process::id(),
        nanos,
        name
    ))
}

fn write_file(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn write_jar(path: &Path, entries: &[(&str, &[u8])]) -> anyhow::Result<()> {
    use std::io::Write;
    use zip::write::FileOptions;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in entries {
        zip.start_file(*name, options)?;
        zip.write_all(content)?;
    }
    zip.finish()?;
    Ok(())
}

fn run(args: &[&str]) -> anyhow::Result<std::process::Output> {
    let out = Command::new(env!("CARGO_BIN_EXE_class-deps"))
        .args(args)
        .env_remove("CLASS_DEPS_CONFIG")
        .output()?;
    if !out.status.success() {
        return Err(anyhow::anyhow!(
            "command failed: status={:?}, stderr={}",
            out.status.code(),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    Ok(out)
}

fn run_json(args: &[&str]) -> anyhow::Result<Value> {
    Ok(serde_json::from_slice(&run(args)?.stdout)?)
}

/// `classes/p1/A.class` depends on `p2.B`, which lives in `lib/dep.jar` next to
/// an inner class, a manifest and a truncated entry. `classes/Broken.class` is garbage.
fn write_project(base: &Path) -> anyhow::Result<()> {
    write_file(
        &base.join("classes/p1/A.class"),
        &ClassFileBuilder::new("p1/A")
            .source_file("A.java")
            .field("b", "Lp2/B;")
            .build(),
    )?;
    write_file(&base.join("classes/Broken.class"), b"not a class file")?;

    let b = ClassFileBuilder::new("p2/B").source_file("B.java").build();
    let inner = ClassFileBuilder::new("p2/B$Inner").class_ref("p2/B").build();
    write_jar(
        &base.join("lib/dep.jar"),
        &[
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
            ("p2/B.class", &b),
            ("p2/B$Inner.class", &inner),
            ("p2/Bad.class", &b[..12]),
        ],
    )
}

#[test]
fn library_pipeline_survives_bad_inputs() -> anyhow::Result<()> {
    let base = temp_dir("library");
    write_project(&base)?;

    let analysis = Analyzer::new().with_path(&base).analyze();

    assert_eq!(analysis.inputs(), 3);
    assert_eq!(analysis.graph().decoded_len(), 3);
    assert_eq!(analysis.number_of_classes(), 3);
    assert_eq!(analysis.skipped_entries(), 1);

    let mut failures: Vec<&str> = analysis.failures().iter().map(|f| f.origin.as_str()).collect();
    failures.sort();
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().any(|o| o.ends_with("Broken.class")));
    assert!(failures.iter().any(|o| o.ends_with("dep.jar!p2/Bad.class")));
    assert!(analysis.failures().iter().any(|f| matches!(f.error, DecodeError::Truncated { .. })));

    let graph = analysis.graph();
    let a = graph.find("p1.A").expect("p1.A decoded");
    let b = graph.find("p2.B").expect("p2.B decoded");
    assert!(a.depends_on(&b));
    assert_eq!(a.class().source_file(), Some("A.java"));
    assert_eq!(a.class().origin(), None);
    assert_eq!(b.class().origin(), Some("dep.jar"));
    assert_eq!(b.afferent_coupling(), 2);

    let packages = analysis.packages();
    let p1 = packages.get(&"p1".to_string()).unwrap();
    let p2 = packages.get(&"p2".to_string()).unwrap();
    assert_eq!(p1.efferent_coupling(), 1);
    assert_eq!(p2.afferent_coupling(), 1);
    assert_eq!(p2.member_count(), 2);
    assert!(packages.cycles().is_empty());

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn analyze_command_prints_json_report() -> anyhow::Result<()> {
    let base = temp_dir("cli_analyze");
    write_project(&base)?;
    let base_str = base.to_string_lossy().to_string();

    let report = run_json(&["analyze", &base_str, "--no-inner-classes"])?;
    assert_eq!(report["group_by"], "package");
    assert_eq!(report["summary"]["decoded"], 2);
    assert_eq!(report["summary"]["failures"], 2);

    let groups = report["groups"].as_array().unwrap();
    let names: Vec<&str> = groups.iter().filter_map(|g| g["name"].as_str()).collect();
    assert_eq!(names, vec!["p1", "p2"]);
    assert_eq!(groups[0]["efferents"], serde_json::json!(["p2"]));
    assert_eq!(groups[1]["afferents"], serde_json::json!(["p1"]));
    assert_eq!(groups[0]["instability"], 1.0);

    let report = run_json(&["analyze", &base_str, "--group-by", "class", "-x", "p2."])?;
    let classes: Vec<&str> = report["classes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(classes, vec!["p1.A"]);

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn cycles_command_reads_paths_from_config() -> anyhow::Result<()> {
    let base = temp_dir("cli_cycles");
    write_file(
        &base.join("a/A.class"),
        &ClassFileBuilder::new("a/A").class_ref("b/B").build(),
    )?;
    write_file(
        &base.join("b/B.class"),
        &ClassFileBuilder::new("b/B").class_ref("a/A").build(),
    )?;
    let config = base.join("config.json");
    write_file(
        &config,
        serde_json::json!({ "paths": [base] }).to_string().as_bytes(),
    )?;

    let report = run_json(&["cycles", "--config", &config.to_string_lossy()])?;
    assert_eq!(report["packages"], 2);
    assert_eq!(report["cycles"], serde_json::json!([["a", "b"]]));

    let out_path = base.join("out/cycles.txt");
    run(&[
        "cycles",
        "--config",
        &config.to_string_lossy(),
        "--format",
        "text",
        "--output",
        &out_path.to_string_lossy(),
    ])?;
    let text = std::fs::read_to_string(&out_path)?;
    assert!(text.contains("- a <-> b"));

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}
