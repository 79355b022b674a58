use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn buildinfo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_buildinfo"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run buildinfo")
}

fn path_str(p: &Path) -> &str {
    p.to_str().expect("utf-8 path")
}

fn write_input(dir: &Path, json: &str) -> std::path::PathBuf {
    let path = dir.join("input.json");
    std::fs::write(&path, json).expect("write input");
    path
}

#[test]
fn writes_header_and_source() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(dir.path(), r#"{"int8:Var": 0}"#);
    let out = dir.path().join("output");

    let o = buildinfo(&[path_str(&input), path_str(&out)]);
    assert!(o.status.success(), "stderr: {}", String::from_utf8_lossy(&o.stderr));
    assert!(o.stdout.is_empty());

    let h = std::fs::read_to_string(dir.path().join("output.h")).expect("read header");
    let c = std::fs::read_to_string(dir.path().join("output.c")).expect("read source");
    assert!(h.starts_with("/*"));
    assert!(h.contains("SHA-256: "));
    assert!(h.contains("#ifndef OUTPUT_H_\n#define OUTPUT_H_\n"));
    assert!(h.contains("int8_t GetVar(void);"));
    assert!(h.ends_with("#endif /* OUTPUT_H_ */\n"));
    assert!(c.contains("#include \"output.h\""));
    assert!(c.contains("static int8_t Var = 0;"));
    assert!(c.contains("int8_t GetVar(void) {"));
}

#[test]
fn strips_c_or_h_extension_from_output() {
    for ext in ["h", "C"] {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = write_input(dir.path(), r#"{"int8:Var": 0}"#);
        let out = dir.path().join(format!("output.{ext}"));

        let o = buildinfo(&[path_str(&input), path_str(&out)]);
        assert!(o.status.success(), "stderr: {}", String::from_utf8_lossy(&o.stderr));
        assert!(dir.path().join("output.h").is_file());
        assert!(dir.path().join("output.c").is_file());
    }
}

#[test]
fn unchanged_output_is_not_rewritten() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(dir.path(), r#"{"int8:Var": 0}"#);
    let out = dir.path().join("output");
    let header = dir.path().join("output.h");

    let o = buildinfo(&[path_str(&input), path_str(&out)]);
    assert!(o.status.success());

    // Hand edits that keep the digest line do not trigger a rewrite.
    let edited = std::fs::read_to_string(&header).expect("read header") + " /* Append a comment. */\n";
    std::fs::write(&header, &edited).expect("edit header");

    let o = buildinfo(&[path_str(&input), path_str(&out), "--report-json"]);
    assert!(o.status.success(), "stderr: {}", String::from_utf8_lossy(&o.stderr));
    assert_eq!(std::fs::read_to_string(&header).expect("reread"), edited);

    let report: Value = serde_json::from_slice(&o.stdout).expect("report JSON");
    assert_eq!(report["header"]["written"], Value::Bool(false));
    assert_eq!(report["source"]["written"], Value::Bool(false));
    assert_eq!(report["header"]["sha256"].as_str().map(str::len), Some(64));

    write_input(dir.path(), r#"{"int8:Var": 1}"#);
    let o = buildinfo(&[path_str(&input), path_str(&out), "--report-json"]);
    assert!(o.status.success());
    let report: Value = serde_json::from_slice(&o.stdout).expect("report JSON");
    assert_eq!(report["source"]["written"], Value::Bool(true));
    let c = std::fs::read_to_string(dir.path().join("output.c")).expect("read source");
    assert!(c.contains("static int8_t Var = 1;"));
}

#[test]
fn check_fails_on_stale_output_without_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(dir.path(), r#"{"int8:Var": 0}"#);
    let out = dir.path().join("output");

    let o = buildinfo(&[path_str(&input), path_str(&out), "--check"]);
    assert!(!o.status.success());
    assert!(String::from_utf8_lossy(&o.stderr).contains("generated output differs"));
    assert!(!dir.path().join("output.h").exists());

    let o = buildinfo(&[path_str(&input), path_str(&out)]);
    assert!(o.status.success());
    let o = buildinfo(&[path_str(&input), path_str(&out), "--check"]);
    assert!(o.status.success(), "stderr: {}", String::from_utf8_lossy(&o.stderr));
}

#[test]
fn stdout_prints_both_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(dir.path(), r#"{"Section_Prefix": "Build", "int8:w:Project_Name": 0}"#);
    let out = dir.path().join("info");

    let o = buildinfo(&[path_str(&input), path_str(&out), "--stdout", "--naming", "snake"]);
    assert!(o.status.success(), "stderr: {}", String::from_utf8_lossy(&o.stderr));
    let text = String::from_utf8(o.stdout).expect("utf-8 stdout");
    let h = text.find("#ifndef INFO_H_").expect("header printed");
    let c = text.find("#include \"info.h\"").expect("source printed");
    assert!(h < c);
    assert!(text.contains("void BUILD_set_project_name(int8_t val);"));
    assert!(!dir.path().join("info.h").exists());
}

#[test]
fn reports_conversion_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(dir.path(), r#"{"uint8:Level": 300}"#);
    let out = dir.path().join("output");

    let o = buildinfo(&[path_str(&input), path_str(&out)]);
    assert!(!o.status.success());
    let stderr = String::from_utf8_lossy(&o.stderr);
    assert!(stderr.contains("range error"), "stderr: {stderr}");
    assert!(stderr.contains("uint8:Level"), "stderr: {stderr}");
    assert!(!dir.path().join("output.c").exists());

    let o = buildinfo(&[path_str(&input), path_str(&out), "--report-json"]);
    assert!(!o.status.success());
    let report: Value = serde_json::from_slice(&o.stdout).expect("error report JSON");
    assert_eq!(report["error"]["kind"], Value::String("range".to_string()));

    let o = buildinfo(&[path_str(&dir.path().join("missing.json")), path_str(&out)]);
    assert!(!o.status.success());
    assert!(String::from_utf8_lossy(&o.stderr).contains("read input"));
}

#[test]
fn requires_input_and_output() {
    let o = buildinfo(&[]);
    assert!(!o.status.success());
    assert!(String::from_utf8_lossy(&o.stderr).contains("Usage"));
}
