//! Structural tests for layer boundary enforcement.
//!
//! These tests scan source files so that `domain` stays pure, services only
//! talk to ports, and process execution stays inside `infra`.

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

fn src_dir(layer: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(layer)
}

/// Lines under `dir` containing any of `forbidden`, formatted for a failure message.
fn violations(dir: &Path, forbidden: &[&str]) -> Vec<String> {
    let mut found = Vec::new();
    for file in collect_rs_files(dir) {
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            if let Some(pattern) = forbidden.iter().find(|p| line.contains(*p)) {
                found.push(format!("{rel}:{}: `{pattern}`: {line}", i + 1));
            }
        }
    }
    found
}

#[test]
fn domain_has_no_io_or_outer_layer_imports() {
    let found = violations(
        &src_dir("domain"),
        &[
            "crate::application",
            "crate::infra",
            "crate::output",
            "crate::commands",
            "tokio",
            "std::fs",
            "std::process",
        ],
    );
    assert!(
        found.is_empty(),
        "domain/ must stay pure:\n{}",
        found.join("\n")
    );
}

#[test]
fn application_uses_ports_not_adapters() {
    let found = violations(
        &src_dir("application"),
        &["crate::infra", "crate::output", "crate::commands", "std::fs"],
    );
    assert!(
        found.is_empty(),
        "application/ must go through port traits:\n{}",
        found.join("\n")
    );
}

#[test]
fn infra_does_not_reach_presentation() {
    let found = violations(&src_dir("infra"), &["crate::output", "crate::commands"]);
    assert!(
        found.is_empty(),
        "infra/ must not import presentation modules:\n{}",
        found.join("\n")
    );
}

#[test]
fn processes_are_spawned_only_by_the_command_runner() {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let found: Vec<String> = violations(&src, &["process::Command::new"])
        .into_iter()
        .filter(|v| !v.contains("command_runner.rs"))
        .collect();
    assert!(
        found.is_empty(),
        "spawn processes through CommandRunner:\n{}",
        found.join("\n")
    );
}

#[test]
fn no_inline_json_branching_in_commands() {
    let found = violations(&src_dir("commands"), &["json: bool", "if json", "if !json"]);
    assert!(
        found.is_empty(),
        "use app.renderer() instead of branching on JSON mode:\n{}",
        found.join("\n")
    );
}
