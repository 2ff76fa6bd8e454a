//! CLI surface and JSON envelope tests

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::process::Command;
use tempfile::TempDir;

fn polyglot(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("polyglot").unwrap();
    cmd.env("POLYGLOT_HOME", home.path());
    cmd
}

fn json_of(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn home_with_component() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    polyglot(&home)
        .args(["project", "create", "web", "--name", "Web"])
        .assert()
        .success();
    let dir = home.path().join("components").join("web");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("docs.json"),
        r#"{
  "name": "Docs",
  "project": "web",
  "repo": "https://example.com/r.git",
  "branch": "main",
  "filemask": "po/*.po",
  "file_format": "po",
  "vcs": "git"
}"#,
    )
    .unwrap();
    home
}

#[test]
fn test_root_help() {
    Command::cargo_bin("polyglot")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bulk import translation components"));
}

#[test]
fn test_import_help_lists_options() {
    Command::cargo_bin("polyglot")
        .unwrap()
        .args(["import", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--main-component"))
        .stdout(predicate::str::contains("--no-skip-duplicates"));
}

#[test]
fn test_project_create_and_list() {
    let home = tempfile::tempdir().unwrap();
    polyglot(&home)
        .args(["project", "create", "web", "--name", "Web", "--web", "https://example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"project.create\""));

    let output = polyglot(&home).args(["project", "list"]).output().unwrap();
    let body = json_of(&output);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["projects"][0]["slug"], "web");
    assert_eq!(body["data"]["projects"][0]["web"], "https://example.com");
}

#[test]
fn test_missing_project_exits_with_four() {
    let home = tempfile::tempdir().unwrap();
    let output = polyglot(&home)
        .args(["import", "ghost", "https://example.com/r.git", "main", "po/*/**.po"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    let body = json_of(&output);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "project.not_found");
}

#[test]
fn test_invalid_vcs_exits_with_two() {
    let home = home_with_component();
    let output = polyglot(&home)
        .args([
            "import",
            "web",
            "https://example.com/r.git",
            "main",
            "po/*/**.po",
            "--vcs",
            "cvs",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(json_of(&output)["error"]["message"], "Invalid vcs: cvs");
}

#[test]
fn test_component_show_resolves_checkout() {
    let home = home_with_component();
    let output = polyglot(&home)
        .args(["component", "show", "web", "docs"])
        .output()
        .unwrap();
    let body = json_of(&output);
    assert_eq!(body["data"]["component"]["name"], "Docs");
    assert!(body["data"]["checkout"]
        .as_str()
        .unwrap()
        .ends_with("docs"));
}

#[test]
fn test_addon_configure_saves_settings() {
    let home = home_with_component();
    polyglot(&home)
        .args([
            "addon",
            "configure",
            "web",
            "docs",
            "json.customize",
            "--set",
            "indent=2",
            "--set",
            "sort_keys=true",
        ])
        .assert()
        .success();

    let output = polyglot(&home)
        .args(["component", "show", "web", "docs"])
        .output()
        .unwrap();
    let addons = &json_of(&output)["data"]["component"]["addons"];
    assert_eq!(addons["json.customize"]["indent"], 2);
    assert_eq!(addons["json.customize"]["sort_keys"], true);
}

#[test]
fn test_addon_field_errors_are_collected() {
    let home = home_with_component();
    let output = polyglot(&home)
        .args(["addon", "configure", "web", "docs", "generate"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let body = json_of(&output);
    assert_eq!(body["error"]["code"], "validation.multiple_errors");
    assert_eq!(body["error"]["details"]["errors"].as_array().unwrap().len(), 2);
}

#[test]
fn test_discovery_needs_confirmation() {
    let home = home_with_component();
    let pattern = r"match=(?P<component>[^/]*)/(?P<language>[^/.]*)\.po";

    let output = polyglot(&home)
        .args(["addon", "configure", "web", "docs", "discovery", "--set", pattern])
        .output()
        .unwrap();
    let body = json_of(&output);
    assert_eq!(body["data"]["saved"], false);
    assert_eq!(body["data"]["settings"]["preview"], true);
    assert_eq!(body["data"]["command"], "addon.configure");
    assert!(body["data"]["matches"].as_array().unwrap().is_empty());
    assert!(body["data"].get("addons").is_none());

    let output = polyglot(&home)
        .args([
            "addon",
            "configure",
            "web",
            "docs",
            "discovery",
            "--set",
            pattern,
            "--confirm",
        ])
        .output()
        .unwrap();
    let body = json_of(&output);
    assert_eq!(body["data"]["saved"], true);
    assert_eq!(body["data"]["settings"]["preview"], false);
    assert_eq!(body["data"]["settings"]["confirm"], false);
}

#[test]
fn test_config_set_and_show() {
    let home = tempfile::tempdir().unwrap();
    polyglot(&home)
        .args(["config", "set", "vcs", "mercurial"])
        .assert()
        .success();
    let output = polyglot(&home).args(["config", "show"]).output().unwrap();
    assert_eq!(json_of(&output)["data"]["config"]["defaults"]["vcs"], "mercurial");

    polyglot(&home)
        .args(["config", "set", "slug_max_length", "two"])
        .assert()
        .code(2);
}

#[test]
fn test_language_list_uses_builtin() {
    let home = tempfile::tempdir().unwrap();
    let output = polyglot(&home).args(["language", "list"]).output().unwrap();
    let body = json_of(&output);
    assert_eq!(body["data"]["custom"], false);
    assert!(body["data"]["languages"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l["code"] == "cs"));
}
