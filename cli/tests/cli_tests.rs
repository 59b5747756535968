//! End-to-end checks of the `terrascope` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn terrascope() -> Command {
    Command::cargo_bin("terrascope").expect("binary should build")
}

#[test]
fn help_lists_both_subcommands() {
    terrascope()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("summary"));
}

#[test]
fn run_requires_directories() {
    terrascope().arg("run").assert().failure();
}

#[test]
fn summary_prints_a_sorted_tree() {
    let root = tempfile::tempdir().expect("tempdir");
    for name in ["staging", "prod"] {
        let dir = root.path().join(name);
        std::fs::create_dir(&dir).expect("create dir");
        std::fs::write(
            dir.join("plan.json"),
            r#"{"resource_changes": [
                {"type": "aws_instance", "address": "aws_instance.web", "name": "web",
                 "change": {"actions": ["delete"]}}
            ]}"#,
        )
        .expect("write plan");
    }

    terrascope()
        .arg("summary")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("prod"))
        .stdout(predicate::str::contains("staging"))
        .stdout(predicate::str::contains("-1"));
}

#[cfg(unix)]
#[test]
fn run_reports_zero_plans_for_missing_directories() {
    let root = tempfile::tempdir().expect("tempdir");
    let missing = root.path().join("does-not-exist");

    terrascope()
        .arg("run")
        .arg("--command")
        .arg("true")
        .arg("--collector")
        .arg("http://127.0.0.1:1/plan")
        .arg(missing)
        .assert()
        .success()
        .stdout(predicate::str::contains("Plans completed 0"));
}
