use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn project(words: &[&str]) -> TempDir {
    let dir = tempdir().unwrap();
    let data = dir.path().join("project_data");
    fs::create_dir_all(&data).unwrap();

    let entries: Vec<_> = words
        .iter()
        .map(|w| serde_json::json!({ "headWord": w, "level": "verified" }))
        .collect();
    fs::write(
        data.join("project.dictionary"),
        serde_json::json!({ "entries": entries }).to_string(),
    )
    .unwrap();

    dir
}

fn codexspell(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("codexspell").unwrap();
    cmd.current_dir(root)
        .env("HOME", root)
        .env("XDG_CONFIG_HOME", root.join(".config"))
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

#[test]
fn test_check_reports_unknown_words() {
    let dir = project(&["in", "the", "beginning"]);
    fs::write(dir.path().join("GEN.codex"), "In the begining\n").unwrap();

    codexspell(dir.path())
        .arg("GEN.codex")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("1:8 begining"))
        .stdout(predicate::str::contains("1 error found in 1 file"));
}

#[test]
fn test_clean_file_passes() {
    let dir = project(&["in", "the", "beginning"]);
    fs::write(dir.path().join("GEN.codex"), "In the beginning\n").unwrap();

    codexspell(dir.path())
        .arg("GEN.codex")
        .assert()
        .success()
        .stdout(predicate::str::contains("No spelling errors found"));
}

#[test]
fn test_no_fail_flag() {
    let dir = project(&[]);
    fs::write(dir.path().join("GEN.codex"), "selah\n").unwrap();

    codexspell(dir.path())
        .args(["--no-fail", "GEN.codex"])
        .assert()
        .success();
}

#[test]
fn test_json_output() {
    let dir = project(&["grace"]);
    fs::write(dir.path().join("GEN.codex"), "grace and\n").unwrap();

    let output = codexspell(dir.path())
        .args(["--format", "json", "GEN.codex"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["files_checked"], 1);
    assert_eq!(report["total_errors"], 1);
    assert_eq!(report["errors"][0]["word"], "and");
    assert_eq!(report["errors"][0]["severity"], "warning");
    assert_eq!(report["errors"][0]["source"], "spell-check");
}

#[test]
fn test_directory_walk_uses_document_extensions() {
    let dir = project(&[]);
    fs::create_dir(dir.path().join("drafts")).unwrap();
    fs::write(dir.path().join("drafts/GEN.codex"), "selah\n").unwrap();
    fs::write(dir.path().join("drafts/README.md"), "teh\n").unwrap();

    codexspell(dir.path())
        .arg("drafts")
        .assert()
        .failure()
        .stdout(predicate::str::contains("selah"))
        .stdout(predicate::str::contains("teh").not());
}

#[test]
fn test_fix_applies_near_matches() {
    let dir = project(&["grace", "and", "peace"]);
    let file = dir.path().join("GEN.codex");
    fs::write(&file, "grace and peac\n").unwrap();
    fs::write(
        dir.path().join(".codexspell.toml"),
        "max_normalized_distance = 0.25\n",
    )
    .unwrap();

    codexspell(dir.path())
        .args(["--fix", "GEN.codex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 correction applied"));

    assert_eq!(fs::read_to_string(&file).unwrap(), "grace and peace\n");
}

#[test]
fn test_dict_add_then_check() {
    let dir = project(&[]);
    fs::write(dir.path().join("GEN.codex"), "Selah shalom\n").unwrap();

    codexspell(dir.path())
        .args(["dict", "add", "selah", "shalom"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 2 of 2 words"));

    codexspell(dir.path()).arg("GEN.codex").assert().success();

    codexspell(dir.path())
        .args(["dict", "list", "--level", "verified"])
        .assert()
        .success()
        .stdout(predicate::str::contains("selah"))
        .stdout(predicate::str::contains("2 entries"));
}

#[test]
fn test_dict_remove() {
    let dir = project(&["amen", "selah"]);

    codexspell(dir.path())
        .args(["dict", "remove", "amen", "missing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("missing not in dictionary"));

    codexspell(dir.path())
        .args(["dict", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("amen").not())
        .stdout(predicate::str::contains("1 entry"));
}

#[test]
fn test_dict_suggest_and_complete() {
    let dir = project(&["prayer", "prophet"]);

    codexspell(dir.path())
        .args(["dict", "complete", "pro"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prophet"));

    codexspell(dir.path())
        .args(["dict", "suggest", "prayer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is correct"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = project(&[]);
    fs::write(dir.path().join(".codexspell.toml"), "ignore_patterns = [\"(\"]\n").unwrap();
    fs::write(dir.path().join("GEN.codex"), "word\n").unwrap();

    codexspell(dir.path())
        .arg("GEN.codex")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid ignore pattern"));
}

#[test]
fn test_completion_script() {
    let dir = tempdir().unwrap();
    codexspell(dir.path())
        .args(["--completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("codexspell"));
}
