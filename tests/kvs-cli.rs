use once_cell::sync::Lazy;
use predicates::prelude::*;
use serde_json::{json, Value};

mod stubs;

use stubs::cmd_assert;

const TEST_KEY: &str = "somekey";
const TEST_VALUE_TEXT: &str = "somevalue";
static TEST_VALUE_JSON: Lazy<Value> = Lazy::new(|| {
    json!({
        "a": {"b": "c"},
        "d": [1, 2, 3]
    })
});

#[test]
fn set_and_get_string_value() {
    let tempdir = tempfile::tempdir().unwrap();

    cmd_assert(tempdir.path(), &["kvs-set", TEST_KEY, TEST_VALUE_TEXT]).success();
    cmd_assert(tempdir.path(), &["kvs-get", TEST_KEY])
        .success()
        .stdout(TEST_VALUE_TEXT);
}

#[test]
fn set_and_get_json_value() {
    let tempdir = tempfile::tempdir().unwrap();

    let value = TEST_VALUE_JSON.to_string();
    cmd_assert(tempdir.path(), &["kvs-set", TEST_KEY, &value]).success();
    cmd_assert(tempdir.path(), &["kvs-get", TEST_KEY])
        .success()
        .stdout(value);
}

#[test]
fn get_unset_value_fails() {
    let tempdir = tempfile::tempdir().unwrap();

    cmd_assert(tempdir.path(), &["kvs-get", TEST_KEY])
        .failure()
        .stdout("")
        .stderr(predicate::str::contains(format!(
            "Error: No value set for key '{TEST_KEY}'"
        )));
}

#[test]
fn unknown_subcommand_fails() {
    let tempdir = tempfile::tempdir().unwrap();

    cmd_assert(tempdir.path(), &["refill"])
        .failure()
        .stderr(predicate::str::contains("Subcommand must be one of"));
}
