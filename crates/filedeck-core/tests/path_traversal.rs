//! Path traversal integration tests.
//!
//! Every client-supplied path below is hostile; none may resolve to anything
//! outside the root.

use filedeck_core::FileDeck;
use filedeck_core::FileDeckConfig;
use filedeck_core::FileDeckError;
use filedeck_core::RootDir;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, TempDir, FileDeck) {
    let outer = TempDir::new().unwrap();
    let root_path = outer.path().join("root");
    fs::create_dir_all(root_path.join("docs/sub")).unwrap();
    fs::write(root_path.join("docs/a.txt"), "a").unwrap();
    fs::write(outer.path().join("secret.txt"), "secret").unwrap();

    let scratch = TempDir::new().unwrap();
    let config = FileDeckConfig::new(RootDir::new(&root_path).unwrap())
        .with_scratch_dir(scratch.path());
    (outer, scratch, FileDeck::new(config))
}

#[test]
fn test_parent_traversal_rejected() {
    let (_outer, _scratch, deck) = setup();

    let attacks = [
        "..",
        "../",
        "../secret.txt",
        "../../etc/passwd",
        "docs/../../secret.txt",
        "docs/sub/../../../secret.txt",
        "./../secret.txt",
    ];

    for raw in attacks {
        let result = deck.resolve(raw);
        assert!(
            matches!(result, Err(FileDeckError::InvalidPath { .. })),
            "path should be rejected: {raw}"
        );
    }
}

#[test]
fn test_absolute_path_outside_rejected() {
    let (outer, _scratch, deck) = setup();

    let secret = outer.path().join("secret.txt");
    let result = deck.resolve(secret.to_str().unwrap());
    assert!(matches!(result, Err(FileDeckError::InvalidPath { .. })));

    #[cfg(unix)]
    assert!(deck.resolve("/etc/passwd").is_err());
}

#[test]
fn test_absolute_path_inside_accepted() {
    let (_outer, _scratch, deck) = setup();

    let inside = deck.root().as_path().join("docs/a.txt");
    let resolved = deck.resolve(inside.to_str().unwrap()).unwrap();
    assert_eq!(resolved.display_relative(), "docs/a.txt");
}

#[test]
fn test_sibling_prefix_rejected() {
    let (outer, _scratch, deck) = setup();
    fs::create_dir(outer.path().join("root-evil")).unwrap();

    let result = deck.resolve("../root-evil");
    assert!(matches!(result, Err(FileDeckError::InvalidPath { .. })));
}

#[test]
fn test_traversal_that_stays_inside_accepted() {
    let (_outer, _scratch, deck) = setup();

    let resolved = deck.resolve("docs/sub/../a.txt").unwrap();
    assert_eq!(resolved.display_relative(), "docs/a.txt");

    let root = deck.resolve("docs/..").unwrap();
    assert!(root.is_root());
}

#[test]
fn test_null_byte_rejected() {
    let (_outer, _scratch, deck) = setup();

    let result = deck.resolve("docs/a.txt\0.png");
    assert!(matches!(result, Err(FileDeckError::InvalidPath { .. })));
}

#[test]
fn test_missing_target_rejected() {
    let (_outer, _scratch, deck) = setup();

    let result = deck.resolve("docs/nope.txt");
    assert!(matches!(result, Err(FileDeckError::InvalidPath { .. })));
}

#[test]
fn test_delete_root_refused() {
    let (_outer, _scratch, deck) = setup();

    for raw in ["", ".", "docs/.."] {
        let target = deck.resolve(raw).unwrap();
        let result = deck.remove(&target);
        assert!(matches!(result, Err(FileDeckError::ProtectedPath)));
    }
    assert!(deck.root().as_path().join("docs/a.txt").exists());
}

#[test]
fn test_names_cannot_traverse() {
    let (outer, _scratch, deck) = setup();
    let docs = deck.resolve("docs").unwrap();

    deck.create_directory(&docs, "../../escaped").unwrap();
    deck.store_file(&docs, "../../escaped.txt", &b"x"[..]).unwrap();

    assert!(deck.root().as_path().join("docs/escaped").is_dir());
    assert!(deck.root().as_path().join("docs/escaped.txt").is_file());
    assert!(!outer.path().join("escaped").exists());
    assert!(!outer.path().join("escaped.txt").exists());
}
