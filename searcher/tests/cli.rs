//! CLI contract tests for `searcher`.

use assert_cmd::Command;
use predicates::prelude::*;
use search_core::{index_collection, IndexerConfig};
use std::fs;
use std::path::Path;

fn searcher() -> Command {
    Command::cargo_bin("searcher").expect("searcher binary")
}

fn build_index(root: &Path) {
    fs::create_dir(root.join("docs")).unwrap();
    fs::write(root.join("docs").join("garden.txt"), "tomatoes need sun").unwrap();
    fs::write(root.join("docs").join("sea.txt"), "boats need wind").unwrap();
    fs::write(root.join("docs").join("sky.txt"), "clouds bring rain").unwrap();
    fs::write(root.join("stop.txt"), "").unwrap();
    index_collection(&IndexerConfig::new(root.join("docs"), root.join("index"), root.join("stop.txt"))).unwrap();
}

#[test]
fn ranks_without_prompting() {
    let tmp = tempfile::tempdir().expect("tempdir");
    build_index(tmp.path());

    searcher()
        .arg("--index")
        .arg(tmp.path().join("index"))
        .args(["--k", "3", "--no-feedback", "tomatoes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("garden"))
        .stdout(predicate::str::contains("Only 1 of 3 requested results found."))
        .stdout(predicate::str::contains("relevance feedback").not());
}

#[test]
fn zero_k_is_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    build_index(tmp.path());

    searcher()
        .arg("--index")
        .arg(tmp.path().join("index"))
        .args(["--k", "0", "tomatoes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--k"));
}

#[test]
fn non_numeric_k_is_rejected() {
    searcher().args(["--k", "many", "tomatoes"]).assert().code(2);
}
