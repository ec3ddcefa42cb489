//! Build script for NutriGap
//!
//! Bumps the build number on each recompilation and embeds build metadata.

use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let build_number_path = Path::new("build_number.txt");

    let previous: u64 = fs::read_to_string(build_number_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    let build_number = previous + 1;

    if let Err(e) = fs::write(build_number_path, build_number.to_string()) {
        println!("cargo:warning=Could not persist build number: {}", e);
    }

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=NUTRIGAP_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=NUTRIGAP_BUILD_TIMESTAMP={}", timestamp);
}
