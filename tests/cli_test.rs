//! Integration tests for the wheelhouse binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

const CONFIG: &str = r#"
objects:
  - web:
      deployment:
        replicas: ${var.replicas|2}
        ports:
          - http: { port: 80 }
          - metrics: { port: 9090 }
      configmap:
        - settings: { level: info }
        - features: { level: debug }
"#;

const DEPLOYMENT: &str = r#"{
  "kind": "Deployment",
  "replicas": "${cfg.deployment.replicas}",
  "ports": [
    // {% for p in cfg.deployment.ports %}
    { "name": "${p.__name__}", "containerPort": "${p.port}" },
    // {% end for %}
  ],
  // {% if cfg.deployment.replicas > 2 %}
  "strategy": "RollingUpdate",
  // {% end if %}
}
"#;

const CONFIGMAP: &str = "kind: ConfigMap\nname: ${cfg.__this__.__name__}\nlevel: ${cfg.__this__.level}\n";

fn setup_package() -> TempDir {
    let temp = TempDir::new().unwrap();
    let pkg = temp.path().join("pkg");
    write(&pkg, "config.yaml", CONFIG);
    write(&pkg, "interactive.yaml", "- prompt: Replicas\n  variable: replicas\n");
    write(&pkg, "templates/deployment/template.jsonc", DEPLOYMENT);
    write(&pkg, "templates/configmap/template.yaml", CONFIGMAP);
    temp
}

fn wheelhouse() -> Command {
    let mut cmd = Command::new(cargo_bin("wheelhouse"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn read_yaml(path: &Path) -> serde_yaml::Value {
    serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    wheelhouse()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compose"))
        .stdout(predicate::str::contains("render"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    wheelhouse()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn compose_writes_one_file_per_unit() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_package();

    wheelhouse()
        .current_dir(temp.path())
        .args(["compose", "pkg", "--non-interactive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 manifest(s)"));

    let out = temp.path().join("out");
    let deployment = read_yaml(&out.join("web-deployment.yaml"));
    assert_eq!(deployment["replicas"], 2);
    assert_eq!(deployment["ports"][1]["name"], "metrics");
    assert_eq!(deployment["ports"][1]["containerPort"], 9090);
    assert!(deployment.get("strategy").is_none());

    assert_eq!(read_yaml(&out.join("web-configmap-0.yaml"))["name"], "settings");
    assert_eq!(read_yaml(&out.join("web-configmap-1.yaml"))["level"], "debug");
    Ok(())
}

#[test]
fn compose_uses_answer_environment() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_package();

    wheelhouse()
        .current_dir(temp.path())
        .env("WHEELHOUSE_ANSWER_REPLICAS", "4")
        .args(["compose", "pkg", "--non-interactive"])
        .assert()
        .success();

    let deployment = read_yaml(&temp.path().join("out/web-deployment.yaml"));
    assert_eq!(deployment["replicas"], 4);
    assert_eq!(deployment["strategy"], "RollingUpdate");
    Ok(())
}

#[test]
fn compose_set_override_and_custom_out() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_package();

    wheelhouse()
        .current_dir(temp.path())
        .args([
            "compose",
            "pkg",
            "--non-interactive",
            "--out",
            "build",
            "--set",
            "objects.0.web.deployment.replicas=5",
        ])
        .assert()
        .success();

    let deployment = read_yaml(&temp.path().join("build/web-deployment.yaml"));
    assert_eq!(deployment["replicas"], 5);
    Ok(())
}

#[test]
fn compose_debug_dir_writes_json() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_package();

    wheelhouse()
        .current_dir(temp.path())
        .args(["compose", "pkg", "--non-interactive", "--debug-dir", "dbg"])
        .assert()
        .success();

    let debug = fs::read_to_string(temp.path().join("dbg/web-deployment.json"))?;
    let json: serde_json::Value = serde_json::from_str(&debug)?;
    assert_eq!(json["ports"][0]["name"], "http");
    Ok(())
}

#[test]
fn compose_without_config_exits_two() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new().unwrap();

    wheelhouse()
        .current_dir(temp.path())
        .args(["compose", ".", "--non-interactive"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No configuration found"));
    Ok(())
}

#[test]
fn compose_unbalanced_template_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_package();
    write(
        &temp.path().join("pkg"),
        "templates/configmap/template.yaml",
        "# {% for x in cfg.items %}\nname: x\n",
    );

    wheelhouse()
        .current_dir(temp.path())
        .args(["compose", "pkg", "--non-interactive"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unbalanced for blocks"));
    Ok(())
}

#[test]
fn render_prints_expanded_template() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_package();

    wheelhouse()
        .current_dir(temp.path())
        .args(["render", "pkg", "--object-type", "deployment"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"metrics\""))
        .stdout(predicate::str::contains("{% for").not());
    Ok(())
}

#[test]
fn config_prints_resolved_json() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_package();

    let output = wheelhouse()
        .current_dir(temp.path())
        .args(["config", "pkg", "--json", "--set", "objects.0.web.deployment.replicas=7"])
        .output()?;

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["objects"][0]["web"]["deployment"]["replicas"], 7);
    Ok(())
}

#[test]
fn init_then_compose_starter() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new().unwrap();

    wheelhouse()
        .current_dir(temp.path())
        .args(["init", "starter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created starter package"));

    wheelhouse()
        .current_dir(temp.path())
        .args(["compose", "starter", "--non-interactive"])
        .assert()
        .success();

    let out = temp.path().join("out");
    let deployment = read_yaml(&out.join("web-deployment.yaml"));
    assert_eq!(deployment["spec"]["replicas"], 2);
    assert_eq!(deployment["metadata"]["labels"]["tier"], "frontend");
    assert!(out.join("web-service.yaml").exists());
    assert!(out.join("web-configmap-0.yaml").exists());
    Ok(())
}

#[test]
fn init_refuses_existing_package() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_package();

    wheelhouse()
        .current_dir(temp.path())
        .args(["init", "pkg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--force"));
    Ok(())
}

#[test]
fn completions_bash() -> Result<(), Box<dyn std::error::Error>> {
    wheelhouse()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wheelhouse"));
    Ok(())
}
