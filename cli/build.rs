#![allow(clippy::print_stdout)]

use std::process::Command;

fn main() {
    // Release builds pass HOSTKIT_VERSION explicitly; local builds use git describe.
    if let Ok(version) = std::env::var("HOSTKIT_VERSION") {
        println!("cargo:rustc-env=HOSTKIT_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !version.is_empty() {
            println!("cargo:rustc-env=HOSTKIT_VERSION={version}");
        }
    }

    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs/");
    println!("cargo:rerun-if-env-changed=HOSTKIT_VERSION");
}
