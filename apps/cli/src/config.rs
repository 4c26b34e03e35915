//! # Store Path Resolution
//!
//! The ledger lives in one SQLite file at a well-known per-platform
//! location:
//!
//! ```text
//! Linux:   ~/.local/share/kiosco-ledger/kiosco.db
//! macOS:   ~/Library/Application Support/com.kiosco.ledger/kiosco.db
//! Windows: %APPDATA%\kiosco\ledger\data\kiosco.db
//! ```
//!
//! `--db-path` (or `KIOSCO_DB_PATH`) overrides the default, which is
//! how a backup copy gets opened for inspection or restore.

use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::debug;

/// Default filename of the store inside the data directory.
const STORE_FILE: &str = "kiosco.db";

/// Resolves the store path, creating parent directories as needed.
///
/// An explicit override is used as-is (after ensuring its parent
/// exists); otherwise the per-platform project data directory is used.
pub fn resolve_db_path(override_path: Option<PathBuf>) -> io::Result<PathBuf> {
    let path = match override_path {
        Some(path) => path,
        None => {
            let dirs = ProjectDirs::from("com", "kiosco", "ledger").ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    "no home directory available to place the ledger store",
                )
            })?;
            dirs.data_dir().join(STORE_FILE)
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    debug!(path = %path.display(), "Resolved store path");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_and_parent_is_created() {
        let dir = std::env::temp_dir().join(format!("kiosco-cfg-{}", std::process::id()));
        let target = dir.join("deep").join("store.db");

        let resolved = resolve_db_path(Some(target.clone())).unwrap();
        assert_eq!(resolved, target);
        assert!(target.parent().unwrap().is_dir());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_default_path_ends_with_store_file() {
        // Skipped in environments with no home directory
        if let Ok(path) = resolve_db_path(None) {
            assert!(path.ends_with(STORE_FILE));
        }
    }
}
