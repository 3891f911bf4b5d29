/// Get the version string for suite and libsuite
pub fn get_version_string() -> String {
    format!(
        "suite {}\nlibsuite {}",
        env!("CARGO_PKG_VERSION"),
        libsuite::version()
    )
}

/// Print version information to stdout
pub fn print_version() {
    println!("{}", get_version_string());
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
