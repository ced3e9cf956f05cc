use std::path::Path;
use std::process::{Command, Output};

fn stylekit(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stylekit"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run stylekit")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_expand_prints_expanded_source() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Tint.swift"), "let tint = #color(\"ff0000\")\n").unwrap();

    let output = stylekit(&["expand", "Tint.swift"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "let tint = Color(red: 255 / 255, green: 0 / 255, blue: 0 / 255, opacity: 255 / 255)\n"
    );
}

#[test]
fn test_expand_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Values.swift"), "@EnvironmentValue var gap = 4\n").unwrap();

    let output = stylekit(&["expand", "Values.swift", "-o", "Values.generated.swift"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "");
    let generated = std::fs::read_to_string(dir.path().join("Values.generated.swift")).unwrap();
    assert!(generated.contains("struct EnvironmentKey_gap: EnvironmentKey"));
}

#[test]
fn test_check_fails_on_errors() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Values.swift"), "@EnvironmentValue let gap = 4\n").unwrap();

    let output = stylekit(&["check", "Values.swift"], dir.path());
    assert!(!output.status.success());
    let errors = stderr(&output);
    assert!(errors.contains("error[invalidPropertyType]"));
    assert!(errors.contains("Values.swift:1:1"));
    assert!(errors.contains("fix-it: Replace 'let' with 'var'"));
    assert!(errors.contains("2 errors"));
}

#[test]
fn test_check_json_report() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Card.swift"), "@Stylable struct Card {}\n").unwrap();

    let output = stylekit(&["check", "Card.swift", "--format", "json"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["summary"]["notes"], 2);
    assert_eq!(report["diagnostics"][0]["id"], "missingViewConformance");
    assert!(report.get("expanded").is_none());
}

#[test]
fn test_fix_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Focus.swift");
    std::fs::write(&file, "@FocusValue var selection: Item\n").unwrap();

    let output = stylekit(&["fix", "Focus.swift", "--in-place"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        std::fs::read_to_string(&file).unwrap(),
        "@FocusValue var selection: Item?\n"
    );
}

#[test]
fn test_config_file_is_discovered() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("stylekit.toml"), "[macros]\ncolor = \"hex\"\n").unwrap();
    std::fs::write(dir.path().join("Tint.swift"), "let a = #hex(\"000000\")\n").unwrap();

    let output = stylekit(&["expand", "Tint.swift"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).starts_with("let a = Color(red: 0 / 255"));
}

#[test]
fn test_decode() {
    let dir = tempfile::tempdir().unwrap();
    let output = stylekit(&["decode", "676C6080"], dir.path());
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("#676c6080\n"));
    assert!(text.contains("red: 103, green: 108, blue: 96, opacity: 128"));

    let output = stylekit(&["decode", "#12345z"], dir.path());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid characters: z"));
}
