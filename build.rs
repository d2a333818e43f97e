use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    let git_hash = command_stdout("git", &["rev-parse", "--short", "HEAD"])
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=FUNNEL_CORE_BUILD_HASH={git_hash}");

    let git_status = command_stdout("git", &["status", "--porcelain"])
        .map(|status| if status.is_empty() { "clean" } else { "dirty" })
        .unwrap_or("unknown");
    println!("cargo:rustc-env=FUNNEL_CORE_BUILD_STATUS={git_status}");

    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    println!("cargo:rustc-env=FUNNEL_CORE_BUILD_TIMESTAMP={timestamp}");

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown-target".to_string());
    println!("cargo:rustc-env=FUNNEL_CORE_BUILD_TARGET={target}");

    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown-profile".to_string());
    println!("cargo:rustc-env=FUNNEL_CORE_BUILD_PROFILE={profile}");

    let rustc = command_stdout("rustc", &["--version"]).unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=FUNNEL_CORE_BUILD_RUSTC={rustc}");
}

/// Runs a command and returns its trimmed stdout when it exits successfully.
fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}
