//! Composition API tests against packages on disk.

use std::fs;
use std::path::Path;

use serde_yaml::Value;
use tempfile::TempDir;
use wheelhouse::compose::{
    Artifact, ComposeOptions, Composer, ManifestBuilder, PackageLayout, YamlManifestBuilder,
};
use wheelhouse::ui::MockUI;
use wheelhouse::{Result, WheelhouseError};

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn package(config: &str, templates: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "pkg/config.yaml", config);
    for (rel, contents) in templates {
        write(&temp.path().join("pkg/templates"), rel, contents);
    }
    temp
}

fn options(temp: &TempDir) -> ComposeOptions {
    ComposeOptions {
        out_dir: temp.path().join("out"),
        debug_dir: None,
    }
}

/// Writes the definition's `kind` only, as plain text.
struct KindBuilder;

struct KindArtifact(String);

impl Artifact for KindArtifact {
    fn to_text(&self) -> Result<String> {
        Ok(self.0.clone())
    }

    fn extension(&self) -> &str {
        "txt"
    }
}

impl ManifestBuilder for KindBuilder {
    fn build(&self, definition: &Value, _config: &Value) -> Result<Box<dyn Artifact>> {
        let kind = definition
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| WheelhouseError::InvalidConfig {
                message: "definition has no kind".into(),
            })?;
        Ok(Box::new(KindArtifact(kind.to_string())))
    }
}

#[test]
fn custom_builder_controls_output() {
    let temp = package(
        "objects:\n  - web:\n      service: {port: 80}\n",
        &[("service/template.yaml", "kind: Service\n")],
    );
    let layout = PackageLayout::discover(&temp.path().join("pkg"), None).unwrap();
    let config = layout.load_config(&mut MockUI::new(), &[]).unwrap();

    let report = Composer::new(layout.template_store(), &KindBuilder, options(&temp))
        .compose(&config)
        .unwrap();

    assert_eq!(report.units[0].path, temp.path().join("out/web-service.txt"));
    assert_eq!(
        fs::read_to_string(temp.path().join("out/web-service.txt")).unwrap(),
        "Service"
    );
}

#[test]
fn builder_errors_name_the_unit() {
    let temp = package(
        "objects:\n  - web:\n      service: {port: 80}\n",
        &[("service/template.yaml", "name: web\n")],
    );
    let layout = PackageLayout::discover(&temp.path().join("pkg"), None).unwrap();
    let config = layout.load_config(&mut MockUI::new(), &[]).unwrap();

    let err = Composer::new(layout.template_store(), &KindBuilder, options(&temp))
        .compose(&config)
        .unwrap_err();

    assert!(matches!(err, WheelhouseError::BuildFailed { .. }));
    assert!(err.to_string().contains("web/service"));
}

#[test]
fn units_do_not_share_state() {
    let temp = package(
        concat!(
            "objects:\n",
            "  - web:\n",
            "      configmap:\n",
            "        - first: {level: info}\n",
            "        - second: {}\n",
        ),
        &[(
            "configmap/template.yaml",
            "name: ${cfg.__this__.__name__}\nlevel: ${cfg.__this__.level}\n",
        )],
    );
    let layout = PackageLayout::discover(&temp.path().join("pkg"), None).unwrap();
    let config = layout.load_config(&mut MockUI::new(), &[]).unwrap();
    let builder = YamlManifestBuilder::new();

    Composer::new(layout.template_store(), &builder, options(&temp))
        .compose(&config)
        .unwrap();

    let second: Value = serde_yaml::from_str(
        &fs::read_to_string(temp.path().join("out/web-configmap-1.yaml")).unwrap(),
    )
    .unwrap();
    assert_eq!(second["name"], "second");
    assert!(second.get("level").is_none());
}

#[test]
fn json_template_with_comments_falls_back_to_jsonc() {
    let temp = package(
        "objects:\n  - web:\n      secret: {name: creds}\n",
        &[(
            "secret/template.json",
            "{\n  // generated\n  \"kind\": \"Secret\",\n  \"name\": \"${cfg.secret.name}\"\n}\n",
        )],
    );
    let layout = PackageLayout::discover(&temp.path().join("pkg"), None).unwrap();
    let config = layout.load_config(&mut MockUI::new(), &[]).unwrap();
    let builder = YamlManifestBuilder::new();

    Composer::new(layout.template_store(), &builder, options(&temp))
        .compose(&config)
        .unwrap();

    let secret: Value = serde_yaml::from_str(
        &fs::read_to_string(temp.path().join("out/web-secret.yaml")).unwrap(),
    )
    .unwrap();
    assert_eq!(secret["name"], "creds");
}

#[test]
fn invalid_loop_source_aborts_run() {
    let temp = package(
        "objects:\n  - web:\n      deployment: {ports: 80}\n",
        &[(
            "deployment/template.jsonc",
            "{\n  \"ports\": [\n    // {% for p in cfg.deployment.ports %}\n    \"${p.port}\",\n    // {% end for %}\n  ]\n}\n",
        )],
    );
    let layout = PackageLayout::discover(&temp.path().join("pkg"), None).unwrap();
    let config = layout.load_config(&mut MockUI::new(), &[]).unwrap();
    let builder = YamlManifestBuilder::new();

    let err = Composer::new(layout.template_store(), &builder, options(&temp))
        .compose(&config)
        .unwrap_err();

    assert!(matches!(err, WheelhouseError::InvalidLoopSource { line: 3, .. }));
    assert!(!temp.path().join("out/web-deployment.yaml").exists());
}
