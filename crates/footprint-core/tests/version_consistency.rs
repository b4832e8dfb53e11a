//! Ensures all workspace crates use `version.workspace = true` and that
//! the workspace version is consistent across all Cargo.toml files.

use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .unwrap()
        .to_path_buf()
}

fn workspace_manifest() -> toml::Value {
    let root_toml = std::fs::read_to_string(workspace_root().join("Cargo.toml")).unwrap();
    root_toml.parse().unwrap()
}

/// Workspace member paths as listed in the root Cargo.toml.
fn members() -> Vec<String> {
    workspace_manifest()["workspace"]["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_str().unwrap().to_string())
        .collect()
}

fn uses_workspace_version(manifest_dir: &Path) -> bool {
    let toml_str = std::fs::read_to_string(manifest_dir.join("Cargo.toml")).unwrap();
    let doc: toml::Value = toml_str.parse().unwrap();
    doc.get("package")
        .and_then(|pkg| pkg.get("version"))
        .and_then(|v| v.as_table())
        .and_then(|t| t.get("workspace"))
        .and_then(|w| w.as_bool())
        == Some(true)
}

#[test]
fn all_crates_use_workspace_version() {
    let root = workspace_root();
    let members = members();
    assert_eq!(members.len(), 4);

    for member in &members {
        assert!(
            uses_workspace_version(&root.join(member)),
            "{member} should use version.workspace = true"
        );
    }
}

#[test]
fn workspace_version_matches_cargo_pkg() {
    let ws_version = workspace_manifest()["workspace"]["package"]["version"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(ws_version, env!("CARGO_PKG_VERSION"));
    assert_eq!(ws_version, footprint_core::VERSION);
}
