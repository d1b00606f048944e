//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that the layer boundaries hold:
//! the domain stays pure and application services never reach into
//! infrastructure or presentation.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Read a file and strip comment lines to avoid false positives.
fn read_non_comment_lines(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| {
            let trimmed = l.trim();
            !trimmed.starts_with("//") && !trimmed.starts_with("/*") && !trimmed.starts_with('*')
        })
        .map(String::from)
        .collect()
}

/// Lines in `layer` containing any of `forbidden`, as `file:line: text`.
fn violations(layer: &str, forbidden: &[&str]) -> Vec<String> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(layer);
    let mut found = Vec::new();
    for file in collect_rs_files(&dir) {
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            if forbidden.iter().any(|f| line.contains(f)) {
                found.push(format!("{rel}:{}: {}", i + 1, line.trim()));
            }
        }
    }
    found
}

#[test]
fn domain_has_no_io_or_async() {
    let found = violations(
        "domain",
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
            "tokio",
            "std::fs",
            "std::process",
            "std::net",
            "async fn",
        ],
    );
    assert!(
        found.is_empty(),
        "Found I/O or outer-layer imports in domain/:\n{}",
        found.join("\n")
    );
}

#[test]
fn application_does_not_import_infra_or_presentation() {
    let found = violations(
        "application",
        &["crate::infra", "crate::commands", "crate::output", "bollard", "std::fs"],
    );
    assert!(
        found.is_empty(),
        "Found infra/presentation imports in application/:\n{}",
        found.join("\n")
    );
}

#[test]
fn infra_does_not_import_presentation() {
    let found = violations("infra", &["crate::commands", "crate::output"]);
    assert!(
        found.is_empty(),
        "Found presentation imports in infra/:\n{}",
        found.join("\n")
    );
}

#[test]
fn no_inline_json_branching_in_commands() {
    let found = violations("commands", &["json: bool", "if json", "if !json"]);
    assert!(
        found.is_empty(),
        "Found inline JSON branching in commands/: use app.is_json() / app.emit():\n{}",
        found.join("\n")
    );
}

#[test]
fn bollard_only_used_by_docker_adapter() {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut found = Vec::new();
    for file in collect_rs_files(&src) {
        if file.ends_with("infra/docker.rs") {
            continue;
        }
        if read_non_comment_lines(&file)
            .iter()
            .any(|l| l.contains("bollard"))
        {
            found.push(file.display().to_string());
        }
    }
    assert!(found.is_empty(), "bollard used outside infra/docker.rs: {found:?}");
}
