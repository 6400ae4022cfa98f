//! Build script to derive the reported version from git tags
//!
//! `fw-meta --version` follows `git describe`, so releases don't need the
//! Cargo.toml version bumped in lockstep with tags.

fn main() {
    // Rerun if git HEAD changes
    println!("cargo:rerun-if-changed=../../.git/HEAD");

    let version = std::process::Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty=-dev"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().trim_start_matches('v').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=FW_META_VERSION={version}");
}
