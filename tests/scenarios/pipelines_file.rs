//! Test: Pipelines File - file-sourced pipelines get the same treatment as inline ones

use crate::helpers::*;
use pipeline_resource::core::ValidationError;
use pipeline_resource::{run_out, OutError};
use tempfile::TempDir;

fn sources_with(pipelines_yaml: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("repo/ci")).unwrap();
    std::fs::write(dir.path().join("repo/ci/pipelines.yml"), pipelines_yaml).unwrap();
    dir
}

/// P1, P2, P3 in the file come back in that order
#[tokio::test]
async fn test_file_order_is_preserved() {
    let dir = sources_with(
        r#"
pipelines:
  - name: p1
    config_file: repo/ci/p1.yml
  - name: p2
    config_file: repo/ci/p2.yml
    vars_files:
      - repo/ci/common.yml
  - name: p3
    config_file: repo/ci/p3.yml
"#,
    );

    let request = file_request("repo/ci/pipelines.yml");
    let mut orch = orchestrator(MockControlTool::new());

    let response = run_out(&request, dir.path(), None, &mut orch).await.unwrap();

    assert_eq!(orch.tool().set_order(), vec!["p1", "p2", "p3"]);
    assert_eq!(metadata_names(&response), vec!["p1", "p2", "p3"]);

    let expected_config = dir.path().join("repo/ci/p2.yml");
    assert!(orch.tool().calls().contains(&Call::SetPipeline {
        name: "p2".to_string(),
        config_file: expected_config.to_string_lossy().into_owned(),
    }));
}

/// Duplicates inside the file are caught by the second validation pass
#[tokio::test]
async fn test_file_duplicates_fail_before_login() {
    let dir = sources_with(
        r#"
pipelines:
  - name: same
    config_file: repo/ci/a.yml
  - name: same
    config_file: repo/ci/b.yml
"#,
    );

    let request = file_request("repo/ci/pipelines.yml");
    let mut orch = orchestrator(MockControlTool::new());

    let err = run_out(&request, dir.path(), None, &mut orch)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OutError::Config(ValidationError::DuplicateName { ref name }) if name == "same"
    ));
    assert!(orch.tool().calls().is_empty());
}

/// Missing config_file inside the file is a configuration error
#[tokio::test]
async fn test_file_entry_without_config() {
    let dir = sources_with("pipelines:\n  - name: lonely\n");

    let request = file_request("repo/ci/pipelines.yml");
    let mut orch = orchestrator(MockControlTool::new());

    let err = run_out(&request, dir.path(), None, &mut orch)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OutError::Config(ValidationError::MissingConfigFile { .. })
    ));
}

/// Unreadable or malformed files are resolution errors
#[tokio::test]
async fn test_resolution_errors() {
    let dir = sources_with("this: [is not, a pipelines file\n");
    let mut orch = orchestrator(MockControlTool::new());

    let err = run_out(&file_request("repo/ci/pipelines.yml"), dir.path(), None, &mut orch)
        .await
        .unwrap_err();
    assert!(matches!(err, OutError::Resolution(_)));

    let err = run_out(&file_request("repo/ci/missing.yml"), dir.path(), None, &mut orch)
        .await
        .unwrap_err();
    assert!(matches!(err, OutError::Resolution(_)));
    assert!(err.to_string().contains("missing.yml"));

    assert!(orch.tool().calls().is_empty());
}
