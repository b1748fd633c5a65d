//! End-to-end tests for the `foreach` command.

#![cfg(unix)]

mod common;
use common::prelude::*;

const RECORD_VISIT: &str =
    r#"echo "$SUBMODULE_REL_PATH $SUBMODULE_ENABLED $SUBMODULE_TARGET" >> visits.txt"#;

#[test]
fn test_foreach_visits_enabled_submodules_in_order() {
    let fixture = TestFixture::new().with_descriptor(descriptors::THREE_SUBMODULES);

    fixture
        .command()
        .args(["foreach", "--", "sh", "-c", RECORD_VISIT])
        .assert()
        .success();

    fixture.child("visits.txt").assert(
        "lib/x 1 1111111111111111111111111111111111111111\nlib/y 1 main\n",
    );
}

#[test]
fn test_foreach_all_includes_disabled() {
    let fixture = TestFixture::new().with_descriptor(descriptors::THREE_SUBMODULES);

    fixture
        .command()
        .args(["foreach", "--all", "--", "sh", "-c", RECORD_VISIT])
        .assert()
        .success();

    fixture
        .child("visits.txt")
        .assert(predicate::str::contains("vendor/z 0 3333333333333333333333333333333333333333"));
}

#[test]
fn test_foreach_recursive_sets_parents() {
    let fixture = TestFixture::new()
        .with_descriptor("[submodule \"outer\"]\n   commit = 1\n")
        .with_file("outer/.gitsubmodules", "[submodule \"inner\"]\n   commit = 2\n");

    fixture
        .command()
        .args([
            "foreach",
            "--recursive",
            "--",
            "sh",
            "-c",
            r#"echo "$SUBMODULE_REL_PATH:$SUBMODULE_PARENTS" >> "$SUBMODULE_ROOT_PATH/visits.txt""#,
        ])
        .assert()
        .success();

    let outer = fixture.path().canonicalize().unwrap().join("outer");
    fixture
        .child("visits.txt")
        .assert(format!("outer:\ninner:{}\n", outer.display()));
}

#[test]
fn test_foreach_failing_command_fails() {
    let fixture = TestFixture::new().with_descriptor(descriptors::THREE_SUBMODULES);

    fixture
        .command()
        .args(["foreach", "--", "sh", "-c", "echo visited >> visits.txt; exit 3"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed"));

    // The walk stops at the first failure
    fixture.child("visits.txt").assert("visited\n");
}

#[test]
fn test_foreach_relative_root_exports_absolute_paths() {
    let fixture = TestFixture::new()
        .with_file("ws/.gitsubmodules", "[submodule \"lib/x\"]\n   commit = 1\n");

    fixture
        .command()
        .args([
            "--root",
            "ws",
            "foreach",
            "--",
            "sh",
            "-c",
            r#"echo "$SUBMODULE_ROOT_PATH|$SUBMODULE_PATH" >> "$SUBMODULE_ROOT_PATH/paths.txt""#,
        ])
        .assert()
        .success();

    let ws = fixture.path().join("ws").canonicalize().unwrap();
    fixture.child("ws/paths.txt").assert(format!(
        "{}|{}\n",
        ws.display(),
        ws.join("lib/x").display()
    ));
}
