//! Integration tests for CLI commands

use kubetype_core::TypedValue;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const APPS_V1: &str = r##"
components:
  schemas:
    io.k8s.api.apps.v1.Deployment:
      type: object
      x-kubernetes-group-version-kind:
        - group: apps
          version: v1
          kind: Deployment
      properties:
        apiVersion:
          type: string
        kind:
          type: string
        metadata:
          $ref: "#/components/schemas/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"
        spec:
          type: object
          properties:
            replicas:
              type: integer
        status:
          type: object
          properties:
            readyReplicas:
              type: integer
    io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta:
      type: object
      properties:
        name:
          type: string
        uid:
          type: string
        resourceVersion:
          type: string
        labels:
          type: object
          additionalProperties:
            type: string
        annotations:
          type: object
          additionalProperties:
            type: string
"##;

const DEPLOYMENT: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  uid: 6c7a0b1e
  resourceVersion: "4711"
  labels:
    app: web
spec:
  replicas: 3
status:
  readyReplicas: 3
"#;

/// Scratch directory holding the fixtures and an empty config home
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        let workspace = Self { dir };
        workspace.write("apps-v1.yaml", APPS_V1);
        workspace.write("deployment.yaml", DEPLOYMENT);
        workspace
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Run kubetype with the workspace as working directory and config home
    fn kubetype(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_kubetype"))
            .args(args)
            .current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.path("config"))
            .output()
            .expect("Failed to execute kubetype")
    }

    /// Decode the deployment fixture and store the typed result
    fn decode_to(&self, name: &str, extra: &[&str]) -> PathBuf {
        let mut args = vec!["decode", "apps-v1.yaml", "deployment.yaml"];
        args.extend_from_slice(extra);
        let output = self.kubetype(&args);
        assert!(output.status.success(), "decode failed: {}", stderr(&output));

        let path = self.path(name);
        std::fs::write(&path, &output.stdout).unwrap();
        path
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn typed(output: &Output) -> TypedValue {
    serde_json::from_slice(&output.stdout).expect("Output should be a typed value")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

mod derive_command {
    use super::*;

    #[test]
    fn test_derive_summary() {
        let ws = Workspace::new();
        let output = ws.kubetype(&[
            "derive",
            "apps-v1.yaml",
            "--api-version",
            "apps/v1",
            "--kind",
            "Deployment",
            "--summary",
        ]);

        assert!(output.status.success(), "{}", stderr(&output));
        let summary = stdout(&output);
        assert!(summary.starts_with("object{apiVersion: string, kind: string, metadata: object{"));
        assert!(summary.contains("labels: map(string)"));
        assert!(summary.contains("spec: object{replicas: number}"));
    }

    #[test]
    fn test_derive_component_json() {
        let ws = Workspace::new();
        let output = ws.kubetype(&[
            "derive",
            "apps-v1.yaml",
            "--component",
            "io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta",
        ]);

        assert!(output.status.success(), "{}", stderr(&output));
        let ty: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(ty["structured"]["name"], json!({"scalar": "string"}));
        assert_eq!(
            ty["structured"]["labels"],
            json!({"mapping": {"scalar": "string"}})
        );
    }

    #[test]
    fn test_derive_unknown_kind() {
        let ws = Workspace::new();
        let output = ws.kubetype(&[
            "derive",
            "apps-v1.yaml",
            "--api-version",
            "batch/v1",
            "--kind",
            "Job",
        ]);

        assert_eq!(output.status.code(), Some(3));
        assert!(stderr(&output).contains("schema for batch/v1 Job not found"));
    }

    #[test]
    fn test_derive_without_selector() {
        let ws = Workspace::new();
        let output = ws.kubetype(&["derive", "apps-v1.yaml"]);

        assert_eq!(output.status.code(), Some(64));
        assert!(stderr(&output).contains("no schema selected"));
    }

    #[test]
    fn test_derive_missing_file() {
        let ws = Workspace::new();
        let output = ws.kubetype(&["derive", "missing.yaml", "--component", "x"]);

        assert_eq!(output.status.code(), Some(5));
    }
}

mod decode_command {
    use super::*;

    #[test]
    fn test_decode_drops_server_fields() {
        let ws = Workspace::new();
        let output = ws.kubetype(&["decode", "apps-v1.yaml", "deployment.yaml"]);

        assert!(output.status.success(), "{}", stderr(&output));
        let value = typed(&output);
        assert_eq!(value.pointer("metadata.name").and_then(TypedValue::as_str), Some("web"));
        assert!(value.pointer("metadata.resourceVersion").is_none());
        assert!(value.get("status").is_none());
        assert_eq!(
            value.pointer("spec.replicas").and_then(TypedValue::as_number),
            Some(&serde_json::Number::from(3))
        );
    }

    #[test]
    fn test_decode_keep_server_fields_yaml() {
        let ws = Workspace::new();
        let output = ws.kubetype(&[
            "decode",
            "apps-v1.yaml",
            "deployment.yaml",
            "--keep-server-fields",
            "--output",
            "yaml",
        ]);

        assert!(output.status.success(), "{}", stderr(&output));
        let path = ws.write("typed.yaml", &stdout(&output));
        let check = ws.kubetype(&["check", path_str(&path)]);
        assert!(check.status.success(), "{}", stderr(&check));

        let encoded = ws.kubetype(&["encode", "typed.yaml"]);
        let plain: Value = serde_json::from_slice(&encoded.stdout).unwrap();
        assert_eq!(plain["status"], json!({"readyReplicas": 3}));
        assert_eq!(plain["metadata"]["resourceVersion"], json!("4711"));
    }

    #[test]
    fn test_decode_with_flags() {
        let ws = Workspace::new();
        let output = ws.kubetype(&[
            "decode",
            "apps-v1.yaml",
            "deployment.yaml",
            "--ignore",
            "metadata.labels",
            "--unknown",
            "spec.replicas",
        ]);

        assert!(output.status.success(), "{}", stderr(&output));
        let value = typed(&output);
        assert!(value.pointer("metadata.labels").is_none());
        assert!(value.pointer("spec.replicas").is_some_and(TypedValue::is_unknown));
        assert!(stderr(&output).contains("unknown values"));
    }

    #[test]
    fn test_decode_uses_config_home_policy() {
        let ws = Workspace::new();
        ws.write(
            "config/kubetype/policy.yaml",
            "ignoreFields:\n  - spec.replicas\nmode: declaredComplete\n",
        );

        let output = ws.kubetype(&["decode", "apps-v1.yaml", "deployment.yaml"]);
        assert!(output.status.success(), "{}", stderr(&output));

        let value = typed(&output);
        assert!(value.pointer("spec.replicas").is_none());
        assert!(value.pointer("metadata.annotations").is_some_and(TypedValue::is_null));
    }

    #[test]
    fn test_decode_explicit_policy_file() {
        let ws = Workspace::new();
        let policy = ws.write("policy.yaml", "serverManaged: false\n");

        let output = ws.kubetype(&[
            "decode",
            "apps-v1.yaml",
            "deployment.yaml",
            "--policy",
            path_str(&policy),
        ]);

        assert!(output.status.success(), "{}", stderr(&output));
        assert!(typed(&output).get("status").is_some());
    }

    #[test]
    fn test_decode_type_mismatch() {
        let ws = Workspace::new();
        ws.write(
            "broken.yaml",
            "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  replicas: three\n",
        );

        let output = ws.kubetype(&["decode", "apps-v1.yaml", "broken.yaml"]);
        assert_eq!(output.status.code(), Some(4));
        assert!(stderr(&output).contains("spec.replicas: expected number, got string"));
    }

    #[test]
    fn test_decode_invalid_expression() {
        let ws = Workspace::new();
        let output = ws.kubetype(&[
            "decode",
            "apps-v1.yaml",
            "deployment.yaml",
            "--ignore",
            "spec..replicas",
        ]);

        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn test_decode_list() {
        let ws = Workspace::new();
        ws.write(
            "list.json",
            r#"{
                "apiVersion": "apps/v1",
                "kind": "DeploymentList",
                "metadata": {"resourceVersion": "100"},
                "items": [
                    {"metadata": {"name": "web"}, "spec": {"replicas": 1}},
                    {"metadata": {"name": "worker"}, "spec": {"replicas": 2}}
                ]
            }"#,
        );

        let output = ws.kubetype(&["decode", "apps-v1.yaml", "list.json"]);
        assert!(output.status.success(), "{}", stderr(&output));

        let items: Vec<TypedValue> = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].pointer("metadata.name").and_then(TypedValue::as_str), Some("worker"));

        let plan = ws.kubetype(&["decode", "apps-v1.yaml", "list.json", "--plan"]);
        assert_eq!(plan.status.code(), Some(64));
    }
}

mod plan_workflow {
    use super::*;

    #[test]
    fn test_planned_object_has_unknowns() {
        let ws = Workspace::new();
        let planned = ws.decode_to("planned.json", &["--plan", "--creating"]);

        let output = ws.kubetype(&["check", path_str(&planned), "--json"]);
        assert_eq!(output.status.code(), Some(2));

        let report: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["fullyKnown"], json!(false));
        let paths = report["unknownPaths"].as_array().unwrap();
        assert!(paths.contains(&json!("metadata.uid")));
        assert!(paths.contains(&json!("metadata.annotations")));
    }

    #[test]
    fn test_encode_rejects_planned_object() {
        let ws = Workspace::new();
        let planned = ws.decode_to("planned.json", &["--plan"]);

        let output = ws.kubetype(&["encode", path_str(&planned)]);
        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("metadata.annotations"));
    }

    #[test]
    fn test_check_text_output() {
        let ws = Workspace::new();
        let planned = ws.decode_to("planned.json", &["--plan", "--creating"]);

        let output = ws.kubetype(&["check", path_str(&planned)]);
        assert_eq!(output.status.code(), Some(2));
        assert!(stdout(&output).contains("2 unknown value(s)"));
    }
}

mod encode_command {
    use super::*;

    #[test]
    fn test_decode_encode_round_trip() {
        let ws = Workspace::new();
        let typed_file = ws.decode_to("typed.json", &[]);

        let output = ws.kubetype(&["encode", path_str(&typed_file)]);
        assert!(output.status.success(), "{}", stderr(&output));

        let plain: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(
            plain,
            json!({
                "apiVersion": "apps/v1",
                "kind": "Deployment",
                "metadata": {
                    "name": "web",
                    "uid": "6c7a0b1e",
                    "labels": {"app": "web"}
                },
                "spec": {"replicas": 3}
            })
        );
    }

    #[test]
    fn test_encode_yaml() {
        let ws = Workspace::new();
        let typed_file = ws.decode_to("typed.json", &[]);

        let output = ws.kubetype(&["encode", path_str(&typed_file), "--output", "yaml"]);
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("replicas: 3"));
    }

    #[test]
    fn test_encode_rejects_plain_objects() {
        let ws = Workspace::new();
        let output = ws.kubetype(&["encode", "deployment.yaml"]);

        assert_eq!(output.status.code(), Some(64));
        assert!(stderr(&output).contains("kubetype decode"));
    }
}

mod narrow_command {
    use super::*;

    #[test]
    fn test_narrow_forces_unknown() {
        let ws = Workspace::new();
        let typed_file = ws.decode_to("typed.json", &[]);

        let output = ws.kubetype(&[
            "narrow",
            "apps-v1.yaml",
            path_str(&typed_file),
            "--api-version",
            "apps/v1",
            "--kind",
            "Deployment",
            "--unknown",
            "spec.replicas",
        ]);

        assert!(output.status.success(), "{}", stderr(&output));
        let narrowed = typed(&output);
        assert!(narrowed.pointer("spec.replicas").is_some_and(TypedValue::is_unknown));
        assert_eq!(
            narrowed.pointer("metadata.name").and_then(TypedValue::as_str),
            Some("web")
        );
    }

    #[test]
    fn test_narrow_shape_mismatch() {
        let ws = Workspace::new();
        let scalar = TypedValue::string("web");
        ws.write("scalar.json", &serde_json::to_string(&scalar).unwrap());

        let output = ws.kubetype(&[
            "narrow",
            "apps-v1.yaml",
            "scalar.json",
            "--component",
            "io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta",
        ]);

        assert_eq!(output.status.code(), Some(4));
        assert!(stderr(&output).contains("(root): cannot narrow string to object{name: string"));
    }
}
