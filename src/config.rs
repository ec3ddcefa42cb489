//! Runtime configuration
//!
//! Everything is read from the environment; unset variables fall back to
//! files under `<project>/data/`.

use std::path::{Path, PathBuf};

pub const DATABASE_PATH_VAR: &str = "NUTRIGAP_DATABASE_PATH";
pub const INGREDIENTS_CSV_VAR: &str = "NUTRIGAP_INGREDIENTS_CSV";
pub const STANDARDS_CSV_VAR: &str = "NUTRIGAP_STANDARDS_CSV";

/// Paths the server and the import binary work with
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub ingredients_csv: PathBuf,
    pub standards_csv: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = default_data_dir();
        Self {
            database_path: env_path(DATABASE_PATH_VAR)
                .unwrap_or_else(|| data_dir.join("nutrigap.db")),
            ingredients_csv: env_path(INGREDIENTS_CSV_VAR)
                .unwrap_or_else(|| data_dir.join("ingredients.csv")),
            standards_csv: env_path(STANDARDS_CSV_VAR)
                .unwrap_or_else(|| data_dir.join("standards.csv")),
        }
    }

    /// Create the directory holding the database file
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        match self.database_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// `<project>/data`, resolved from the executable location
fn default_data_dir() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    project_root(&exe_dir).join("data")
}

/// Walk up out of `target/{debug,release}` when running from a cargo build
fn project_root(exe_dir: &Path) -> PathBuf {
    if exe_dir.ends_with("release") || exe_dir.ends_with("debug") {
        if let Some(grandparent) = exe_dir.parent().and_then(Path::parent) {
            return grandparent.to_path_buf();
        }
    }
    exe_dir.to_path_buf()
}
