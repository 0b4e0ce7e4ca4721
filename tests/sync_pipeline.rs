//! End-to-end pipeline tests against fixture files, with the network
//! resolution step replaced by a pre-resolved version list.

use std::fs;
use std::path::Path;

use talos_sync_cli::cluster::extract_talos_version;
use talos_sync_cli::renovate::{UpdateOutcome, update_policy_file};
use talos_sync_cli::{SyncError, renovate};

fn policy_copy(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("renovate.json5");
    fs::copy("tests/fixtures/renovate.json5", &path).unwrap();
    path
}

fn versions(list: &[u32]) -> Vec<String> {
    list.iter().map(|v| v.to_string()).collect()
}

#[test]
fn extracts_talos_version_from_cluster_config() {
    let version = extract_talos_version(Path::new("tests/fixtures/base-controlplane.yaml")).unwrap();
    assert_eq!(version, "1.12");
}

#[test]
fn updates_stale_constraint_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_copy(&dir);

    let outcome = update_policy_file(&policy, "1.12", &versions(&[30, 31]), false).unwrap();
    assert_eq!(outcome, UpdateOutcome::Updated);

    let content = fs::read_to_string(&policy).unwrap();
    assert!(content.contains(r"allowedVersions: '/^v1\.(30|31)\./'"));
    assert!(content.contains("// 3. Current: Talos 1.12.x supports Kubernetes 1.30.x, 1.31.x"));
    // The talos-images rule is untouched.
    assert!(content.contains(r#"allowedVersions: "/^v1\./","#));
}

#[test]
fn second_run_with_same_versions_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_copy(&dir);

    update_policy_file(&policy, "1.12", &versions(&[30, 31]), false).unwrap();
    let after_first = fs::read_to_string(&policy).unwrap();

    let outcome = update_policy_file(&policy, "1.12", &versions(&[30, 31]), false).unwrap();
    assert_eq!(outcome, UpdateOutcome::AlreadyCurrent);
    assert_eq!(fs::read_to_string(&policy).unwrap(), after_first);
}

#[test]
fn matching_constraint_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_copy(&dir);

    // Seed the policy with the exact constraint the builder would emit.
    let seeded = fs::read_to_string(&policy)
        .unwrap()
        .replace(r"/^v1\.(29)\./", r"/^v1\.(30|31)\./");
    fs::write(&policy, &seeded).unwrap();

    let outcome = update_policy_file(&policy, "1.12", &versions(&[30, 31]), false).unwrap();
    assert_eq!(outcome, UpdateOutcome::AlreadyCurrent);
    assert_eq!(fs::read_to_string(&policy).unwrap(), seeded);
}

#[test]
fn single_version_collapses_the_alternative_group() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_copy(&dir);

    update_policy_file(&policy, "1.11", &versions(&[29]), false).unwrap();
    let content = fs::read_to_string(&policy).unwrap();
    // Fixture holds the grouped single form; the builder emits the bare
    // form, so this run rewrites it once and is stable afterwards.
    assert!(content.contains(r"allowedVersions: '/^v1\.29\./'"));

    let outcome = update_policy_file(&policy, "1.11", &versions(&[29]), false).unwrap();
    assert_eq!(outcome, UpdateOutcome::AlreadyCurrent);
}

#[test]
fn dry_run_reports_update_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_copy(&dir);
    let before = fs::read_to_string(&policy).unwrap();

    let outcome = update_policy_file(&policy, "1.12", &versions(&[30, 31]), true).unwrap();
    assert_eq!(outcome, UpdateOutcome::Updated);
    assert_eq!(fs::read_to_string(&policy).unwrap(), before);
}

#[test]
fn missing_constraint_block_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let policy = dir.path().join("renovate.json5");
    fs::write(&policy, "{ packageRules: [] }\n").unwrap();

    let err = update_policy_file(&policy, "1.12", &versions(&[30]), false).unwrap_err();
    assert!(matches!(err, SyncError::ConstraintBlockNotFound(_)));
}

#[test]
fn missing_policy_file_is_fatal() {
    let err =
        update_policy_file(Path::new("does/not/exist.json5"), "1.12", &versions(&[30]), false)
            .unwrap_err();
    assert!(matches!(err, SyncError::ConfigMissing(_)));
}

#[test]
fn full_pipeline_from_config_to_policy() {
    // Config says v1.12.3 -> minor 1.12; pretend resolution returned
    // {30, 31, 32} and check the rewritten constraint end to end.
    let talos_minor =
        extract_talos_version(Path::new("tests/fixtures/base-controlplane.yaml")).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let policy = policy_copy(&dir);
    let outcome =
        update_policy_file(&policy, &talos_minor, &versions(&[30, 31, 32]), false).unwrap();
    assert_eq!(outcome, UpdateOutcome::Updated);

    let content = fs::read_to_string(&policy).unwrap();
    assert_eq!(
        renovate::build_allowed_versions(&versions(&[30, 31, 32])),
        r"/^v1\.(30|31|32)\./"
    );
    assert!(content.contains(r"allowedVersions: '/^v1\.(30|31|32)\./'"));
    assert!(
        content.contains("// 3. Current: Talos 1.12.x supports Kubernetes 1.30.x, 1.31.x, 1.32.x")
    );
}
