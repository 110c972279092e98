use assert_cmd::Command;

const REVIEW: &str = r#"{
    "metadata": {"project_id": "P-1", "aimcr_date": "2025-12-14"},
    "models": [{"name": "phi-3", "checks": [
        {"name": "Model weights integrity (hash verification)", "score": 5, "notes": "hash mismatch"}
    ]}],
    "observations": "",
    "recommendation": "Reject"
}"#;

fn command(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_aimcr-report"));
    cmd.current_dir(dir).env_remove("AIMCR_LOG");
    cmd
}

#[test]
fn renders_markdown_next_to_input_by_default() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("review.json");
    std::fs::write(&input, REVIEW).unwrap();

    let output = command(tmp.path()).arg(&input).output().expect("run aimcr-report");
    assert!(output.status.success());

    let expected = tmp.path().join("review.md");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("Report created: {}", expected.display()));

    let doc = std::fs::read_to_string(&expected).unwrap();
    assert!(doc.contains("### 1. phi-3"));
    assert!(doc.contains("**Total Risk Score: 5**"));
    assert!(doc.contains("None recorded."));
}

#[test]
fn explicit_html_output() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("review.json");
    let out = tmp.path().join("out").join("final.html");
    std::fs::write(&input, REVIEW).unwrap();

    let output = command(tmp.path())
        .arg(&input)
        .arg(&out)
        .output()
        .expect("run aimcr-report");
    assert!(output.status.success());
    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains("<h3>1. phi-3</h3>"));
}

#[test]
fn malformed_input_exits_non_zero_without_output() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("broken.json");
    std::fs::write(&input, "{\"models\": [").unwrap();

    let output = command(tmp.path()).arg(&input).output().expect("run aimcr-report");
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: failed to read review from"));
    assert!(!tmp.path().join("broken.md").exists());
}
