// Injects CRASHRISK_VERSION from `git describe`, falling back to the package version

use std::process::Command;

fn main() {
    let version = describe_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=CRASHRISK_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

fn describe_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    if described.is_empty() {
        return None;
    }

    match described.strip_prefix('v') {
        // "v1.2.0" or "v1.2.0-3-gabc123[-dirty]": keep the tag version only
        Some(tagged) => Some(tagged.split('-').next().unwrap_or(tagged).to_string()),
        // Untagged repository: bare commit hash, possibly "-dirty"
        None => Some(format!("{}-{}", env!("CARGO_PKG_VERSION"), described)),
    }
}
