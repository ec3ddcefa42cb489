//! Build metadata stamped in by `build.rs`

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build number and UTC timestamp of this binary, plus the package version
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self::from_stamps(
            option_env!("NUTRIGAP_BUILD_NUMBER"),
            option_env!("NUTRIGAP_BUILD_TIMESTAMP"),
        )
    }

    /// Missing or garbled stamps (a build without `build.rs`) fall back to
    /// build 0 at an unknown time
    fn from_stamps(number: Option<&str>, timestamp: Option<&'static str>) -> Self {
        Self {
            version: VERSION,
            build_number: number.and_then(|n| n.trim().parse().ok()).unwrap_or(0),
            build_timestamp: timestamp.unwrap_or("unknown"),
        }
    }
}

/// Print the startup banner to stderr (stdout carries the MCP stream)
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("NutriGap {} (build {}, {})", info.version, info.build_number, info.build_timestamp);
    eprintln!("Checks ingredient selections against minimum nutrient standards");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamps_from_build_script() {
        let info = BuildInfo::from_stamps(Some("42"), Some("2026-01-05T10:00:00Z"));
        assert_eq!(info.build_number, 42);
        assert_eq!(info.build_timestamp, "2026-01-05T10:00:00Z");
        assert_eq!(info.version, VERSION);
    }

    #[test]
    fn test_missing_or_bad_stamps() {
        let info = BuildInfo::from_stamps(Some("4x2"), None);
        assert_eq!(info.build_number, 0);
        assert_eq!(info.build_timestamp, "unknown");
        assert_eq!(BuildInfo::from_stamps(None, None).build_number, 0);
    }
}
