//! Flat-file store round trips and metadata recovery.

use chrono::TimeZone;
use chrono::Utc;
use pretty_assertions::assert_eq;
use terrascope_core::Key;
use terrascope_core::Storage;
use terrascope_protocol::Branch;
use terrascope_protocol::PlanRecord;
use terrascope_protocol::Workspace;

fn record(branch: &str, workspace: &str) -> PlanRecord {
    PlanRecord {
        end: Utc.with_ymd_and_hms(2000, 1, 2, 3, 4, 5).unwrap(),
        branch: branch.into(),
        workspace: workspace.into(),
        ..Default::default()
    }
}

fn branch_names(storage: &Storage) -> Vec<String> {
    storage.branches().iter().map(Branch::to_string).collect()
}

fn workspace_names(storage: &Storage) -> Vec<String> {
    storage
        .workspaces()
        .iter()
        .map(Workspace::to_string)
        .collect()
}

#[test]
fn stores_records_under_distinct_keys_without_collisions() {
    let root = tempfile::tempdir().expect("tempdir");
    let storage = Storage::open(root.path());

    storage
        .store(&Key::parse("A/1/b"), &record("foo", "default"))
        .expect("store should succeed");
    assert!(
        root.path()
            .join("A/1/b/2000-01-02-03-04-05__foo__default.json")
            .is_file()
    );
    assert_eq!(vec!["foo".to_string()], branch_names(&storage));
    assert_eq!(vec!["default".to_string()], workspace_names(&storage));

    storage
        .store(&Key::parse("A/1/c"), &record("foo", "default"))
        .expect("store should succeed");
    assert!(
        root.path()
            .join("A/1/c/2000-01-02-03-04-05__foo__default.json")
            .is_file()
    );
    assert_eq!(vec!["foo".to_string()], branch_names(&storage));

    storage
        .store(&Key::parse("A/1/b"), &record("baz", "default"))
        .expect("store should succeed");
    assert_eq!(
        vec!["baz".to_string(), "foo".to_string()],
        branch_names(&storage),
        "branch snapshot is sorted"
    );
    assert_eq!(vec!["default".to_string()], workspace_names(&storage));
}

#[test]
fn reopening_recovers_metadata_from_file_names() {
    let root = tempfile::tempdir().expect("tempdir");
    {
        let storage = Storage::open(root.path());
        storage
            .store(&Key::parse("A/1/b"), &record("foo", "default"))
            .expect("store should succeed");
        storage
            .store(&Key::parse("A/1/b"), &record("baz", "default"))
            .expect("store should succeed");
    }

    let reopened = Storage::open(root.path());
    assert_eq!(
        vec!["baz".to_string(), "foo".to_string()],
        branch_names(&reopened)
    );
    assert_eq!(vec!["default".to_string()], workspace_names(&reopened));
}

#[test]
fn stored_records_parse_back() {
    let root = tempfile::tempdir().expect("tempdir");
    let storage = Storage::open(root.path());
    let original = record("main", "prod");

    let file = storage
        .store(&Key::parse("infra/vpc"), &original)
        .expect("store should succeed");

    let bytes = std::fs::read(file).expect("read stored record");
    let parsed: PlanRecord = serde_json::from_slice(&bytes).expect("record should parse");
    assert_eq!(original, parsed);
}

#[test]
fn key_path_blocked_by_a_file_is_an_error() {
    let root = tempfile::tempdir().expect("tempdir");
    std::fs::write(root.path().join("X"), b"in the way").expect("write blocker");

    let storage = Storage::open(root.path());
    let result = storage.store(&Key::parse("X"), &record("foo", "default"));
    assert!(result.is_err());
}
