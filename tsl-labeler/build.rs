//! Embeds build identification for the startup log and `/api/buildinfo`:
//! `GIT_HASH`, `BUILD_TIMESTAMP` (UTC, RFC 3339) and `BUILD_PROFILE`.

use std::process::Command;

fn main() {
    emit("GIT_HASH", short_git_hash());
    emit(
        "BUILD_TIMESTAMP",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    );
    emit(
        "BUILD_PROFILE",
        std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
    );

    // Rebuild when the checked-out commit moves
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");
}

fn emit(key: &str, value: String) {
    println!("cargo:rustc-env={}={}", key, value);
}

/// `git rev-parse --short=8 HEAD`, or "unknown" outside a checkout
fn short_git_hash() -> String {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output();

    match output {
        Ok(out) if out.status.success() => {
            let hash = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if hash.is_empty() {
                "unknown".to_string()
            } else {
                hash
            }
        }
        _ => "unknown".to_string(),
    }
}
