//! Command: print version information.

/// The build version: `HOSTKIT_VERSION` from the build script, falling back
/// to the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("HOSTKIT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the hostkit version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("hostkit {}", version());
}
