//! Symlink escape integration tests.

#![cfg(unix)]

use filedeck_core::FileDeck;
use filedeck_core::FileDeckConfig;
use filedeck_core::FileDeckError;
use filedeck_core::RootDir;
use std::fs;
use std::os::unix::fs::symlink;
use tempfile::TempDir;

fn setup() -> (TempDir, TempDir, FileDeck) {
    let outer = TempDir::new().unwrap();
    let root_path = outer.path().join("root");
    fs::create_dir_all(root_path.join("inner")).unwrap();
    fs::write(root_path.join("inner/file.txt"), "inner").unwrap();

    fs::create_dir(outer.path().join("outside")).unwrap();
    fs::write(outer.path().join("outside/secret.txt"), "secret").unwrap();

    let scratch = TempDir::new().unwrap();
    let config = FileDeckConfig::new(RootDir::new(&root_path).unwrap())
        .with_scratch_dir(scratch.path());
    (outer, scratch, FileDeck::new(config))
}

#[test]
fn test_symlink_to_outside_dir_rejected() {
    let (outer, _scratch, deck) = setup();
    symlink(
        outer.path().join("outside"),
        deck.root().as_path().join("escape"),
    )
    .unwrap();

    for raw in ["escape", "escape/secret.txt", "escape/.."] {
        let result = deck.resolve(raw);
        assert!(
            matches!(result, Err(FileDeckError::InvalidPath { .. })),
            "path should be rejected: {raw}"
        );
    }
}

#[test]
fn test_relative_symlink_escape_rejected() {
    let (_outer, _scratch, deck) = setup();
    symlink("../../outside", deck.root().as_path().join("inner/up")).unwrap();

    let result = deck.resolve("inner/up/secret.txt");
    assert!(matches!(result, Err(FileDeckError::InvalidPath { .. })));
}

#[test]
fn test_symlink_inside_root_resolves_to_target() {
    let (_outer, _scratch, deck) = setup();
    symlink("inner", deck.root().as_path().join("alias")).unwrap();

    let resolved = deck.resolve("alias/file.txt").unwrap();
    assert_eq!(resolved.display_relative(), "inner/file.txt");
}

#[test]
fn test_symlink_chain_escape_rejected() {
    let (outer, _scratch, deck) = setup();
    let root = deck.root().as_path().to_path_buf();
    symlink(outer.path().join("outside"), root.join("hop2")).unwrap();
    symlink("hop2", root.join("hop1")).unwrap();

    let result = deck.resolve("hop1/secret.txt");
    assert!(matches!(result, Err(FileDeckError::InvalidPath { .. })));
}

#[test]
fn test_escaping_link_listed_deletable_and_unlinked() {
    let (outer, _scratch, deck) = setup();
    symlink(
        outer.path().join("outside"),
        deck.root().as_path().join("escape"),
    )
    .unwrap();

    let listing = deck.list(&deck.resolve("").unwrap()).unwrap();
    let escape = listing.entries.iter().find(|e| e.name == "escape").unwrap();
    assert!(escape.deletable);
    assert!(listing.entries.iter().any(|e| e.name == "inner"));

    let node = deck.resolve_node("escape").unwrap();
    let report = deck.remove(&node).unwrap();

    assert_eq!(report.files_removed, 1);
    assert!(fs::symlink_metadata(deck.root().as_path().join("escape")).is_err());
    assert_eq!(
        fs::read_to_string(outer.path().join("outside/secret.txt")).unwrap(),
        "secret"
    );
}

#[test]
fn test_deleting_directory_alias_keeps_target_contents() {
    let (_outer, _scratch, deck) = setup();
    symlink("inner", deck.root().as_path().join("alias")).unwrap();

    let listing = deck.list(&deck.resolve("").unwrap()).unwrap();
    let alias = listing.entries.iter().find(|e| e.name == "alias").unwrap();
    assert!(alias.kind.is_directory());
    assert!(alias.deletable);

    let node = deck.resolve_node("alias").unwrap();
    assert_eq!(node.display_relative(), "alias");
    deck.remove(&node).unwrap();

    assert!(fs::symlink_metadata(deck.root().as_path().join("alias")).is_err());
    assert_eq!(
        fs::read_to_string(deck.root().as_path().join("inner/file.txt")).unwrap(),
        "inner"
    );
}

#[test]
fn test_removing_tree_keeps_outside_target() {
    let (outer, _scratch, deck) = setup();
    symlink(
        outer.path().join("outside"),
        deck.root().as_path().join("inner/link"),
    )
    .unwrap();

    let inner = deck.resolve("inner").unwrap();
    deck.remove(&inner).unwrap();

    assert!(!deck.root().as_path().join("inner").exists());
    assert_eq!(
        fs::read_to_string(outer.path().join("outside/secret.txt")).unwrap(),
        "secret"
    );
}

#[test]
fn test_archive_skips_symlinks() {
    let (outer, _scratch, deck) = setup();
    symlink(
        outer.path().join("outside/secret.txt"),
        deck.root().as_path().join("inner/leak.txt"),
    )
    .unwrap();

    let job = deck.archive(&deck.resolve("inner").unwrap()).unwrap();
    let names: Vec<&str> = job.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["file.txt"]);
    assert_eq!(job.report().files_skipped, 1);
}
