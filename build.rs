// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=TEXT_SCANNER_VERSION");

    // Packagers (flatpak, distro builds) set the version explicitly
    let version = std::env::var("TEXT_SCANNER_VERSION")
        .ok()
        .or_else(git_version)
        .unwrap_or_else(|| std::env::var("CARGO_PKG_VERSION").unwrap_or_default());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version from `git describe`
///
/// - "v0.1.0" (exact tag) becomes "0.1.0-abcdef1"
/// - "v0.1.0-5-gabcdef1" (commits after a tag) becomes "0.1.0-dirty-abcdef1"
/// - no tag at all becomes "<CARGO_PKG_VERSION>-abcdef1"
fn git_version() -> Option<String> {
    let commit = run_git(&["rev-parse", "--short", "HEAD"])?;

    let Some(described) = run_git(&["describe", "--tags", "--match", "v*"]) else {
        let pkg = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
        return Some(format!("{}-{}", pkg, commit));
    };
    let described = described.strip_prefix('v').unwrap_or(&described);

    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    if parts.len() == 3 {
        let hash = parts[0].strip_prefix('g').unwrap_or(parts[0]);
        Some(format!("{}-dirty-{}", parts[2], hash))
    } else {
        Some(format!("{}-{}", described, commit))
    }
}

fn run_git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}
