use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn hcl_from_stdin() {
    let dir = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("json-hcl");
    cmd.current_dir(dir.path()).arg("hcl").write_stdin(r#"{"variable":{"region":[{"type":"string"}]}}"#);
    cmd.assert().success().stdout("variable \"region\" {\n  type = string\n}\n");
}

#[test]
fn json_from_file_is_pretty_printed() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("main.tf"), "locals {\n  env = \"prod\"\n}\n").unwrap();

    let mut cmd = cargo_bin_cmd!("json-hcl");
    cmd.current_dir(dir.path()).args(["json", "-i", "main.tf"]);
    cmd.assert()
        .success()
        .stdout("{\n  \"locals\": [\n    {\n      \"env\": \"prod\"\n    }\n  ]\n}\n");
}

#[test]
fn out_dir_names_each_output() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.tf.json"), r#"{"a": 1}"#).unwrap();
    fs::write(dir.path().join("b.json"), r#"{"b": "x"}"#).unwrap();

    let mut cmd = cargo_bin_cmd!("json-hcl");
    cmd.current_dir(dir.path()).args(["hcl", "-i", "a.tf.json", "b.json", "--out-dir", "out"]);
    cmd.assert().success().stdout("");

    assert_eq!(fs::read_to_string(dir.path().join("out/a.tf")).unwrap(), "a = 1\n");
    assert_eq!(fs::read_to_string(dir.path().join("out/b.tf")).unwrap(), "b = \"x\"\n");
}

#[test]
fn several_inputs_need_an_out_dir() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.tf"), "a = 1\n").unwrap();
    fs::write(dir.path().join("b.tf"), "b = 2\n").unwrap();

    let mut cmd = cargo_bin_cmd!("json-hcl");
    cmd.current_dir(dir.path()).args(["json", "-i", "a.tf", "b.tf"]);
    cmd.assert().failure().stderr(predicate::str::contains("--out-dir"));
}

#[test]
fn glob_inputs_expand() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.tf"), "a = 1\n").unwrap();
    fs::write(dir.path().join("b.tf"), "b = 2\n").unwrap();

    let mut cmd = cargo_bin_cmd!("json-hcl");
    cmd.current_dir(dir.path()).args(["json", "-i", "*.tf", "--out-dir", "out", "--indent", "0"]);
    cmd.assert().success();

    assert_eq!(fs::read_to_string(dir.path().join("out/a.tf.json")).unwrap(), "{\"a\":1}\n");
    assert_eq!(fs::read_to_string(dir.path().join("out/b.tf.json")).unwrap(), "{\"b\":2}\n");
}

#[test]
fn invalid_hcl_reports_an_error() {
    let dir = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("json-hcl");
    cmd.current_dir(dir.path()).arg("json").write_stdin("a = \n");
    cmd.assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("error").and(predicate::str::contains("parse hcl: ")));
}

#[test]
fn one_bad_input_fails_the_run_but_not_the_others() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("good.tf"), "a = 1\n").unwrap();
    fs::write(dir.path().join("bad.tf"), "a = [\n").unwrap();

    let mut cmd = cargo_bin_cmd!("json-hcl");
    cmd.current_dir(dir.path()).args(["json", "-i", "good.tf", "bad.tf", "--out-dir", "out"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("bad.tf").and(predicate::str::contains("1 of 2 inputs failed")));

    assert!(dir.path().join("out/good.tf.json").exists());
    assert!(!dir.path().join("out/bad.tf.json").exists());
}

#[test]
fn nested_flag_keeps_objects_as_values() {
    let dir = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("json-hcl");
    cmd.current_dir(dir.path())
        .args(["hcl", "--nested"])
        .write_stdin(r#"{"variable":{"region":[{"type":"string"}]}}"#);
    cmd.assert().success().stdout(predicate::str::starts_with("variable = {"));
}

#[test]
fn tfvars_outputs_pick_the_nested_dialect() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("prod.tfvars.json"), r#"{"variable":{"region":[{"type":"string"}]}}"#).unwrap();

    let mut cmd = cargo_bin_cmd!("json-hcl");
    cmd.current_dir(dir.path()).args(["hcl", "-i", "prod.tfvars.json", "-o", "prod.tfvars"]);
    cmd.assert().success();

    let written = fs::read_to_string(dir.path().join("prod.tfvars")).unwrap();
    assert!(written.starts_with("variable = {"), "{written}");
}

#[test]
fn config_file_sets_the_json_indent() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("compact.toml");
    fs::write(&config_path, "[output]\njson_indent = 0\n").unwrap();

    let mut cmd = cargo_bin_cmd!("json-hcl");
    cmd.current_dir(dir.path())
        .arg("json")
        .arg("--config")
        .arg(config_path.as_os_str())
        .write_stdin("a = 1\nb = \"x\"\n");
    cmd.assert().success().stdout("{\"a\":1,\"b\":\"x\"}\n");
}

#[test]
fn project_file_is_picked_up_from_the_working_directory() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("json-hcl.toml"), "[output]\njson_indent = 0\ntrailing_newline = false\n").unwrap();

    let mut cmd = cargo_bin_cmd!("json-hcl");
    cmd.current_dir(dir.path()).arg("json").write_stdin("a = 1\n");
    cmd.assert().success().stdout("{\"a\":1}");
}

#[test]
fn version_flag() {
    let mut cmd = cargo_bin_cmd!("json-hcl");
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::starts_with("json-hcl "));
}
