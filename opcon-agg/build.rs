//! Stamps the service binary with the commit, build time and profile shown
//! in its startup banner.

use std::process::Command;

fn short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string())
}

fn main() {
    let stamps = [
        ("GIT_HASH", short_commit().unwrap_or_else(|| "unknown".to_string())),
        (
            "BUILD_TIMESTAMP",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        ),
        (
            "BUILD_PROFILE",
            std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
        ),
    ];
    for (key, value) in stamps {
        println!("cargo:rustc-env={}={}", key, value);
    }

    println!("cargo:rerun-if-changed=../.git/HEAD");
}
