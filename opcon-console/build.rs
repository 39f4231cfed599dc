//! Build identity for the console banner (`GIT_HASH`, `BUILD_TIMESTAMP`,
//! `BUILD_PROFILE`).

use std::process::Command;

fn main() {
    // Outside a checkout, or without git installed, the hash reads "unknown"
    let git_hash = match Command::new("git").args(["rev-parse", "--short=8", "HEAD"]).output() {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).trim().to_string(),
        _ => "unknown".to_string(),
    };
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    println!("cargo:rustc-env=GIT_HASH={git_hash}");
    println!("cargo:rustc-env=BUILD_TIMESTAMP={built_at}");
    println!("cargo:rustc-env=BUILD_PROFILE={profile}");
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
