//! File logging. The terminal belongs to the TUI, so log output never goes to
//! stderr.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::Result;

/// Default log file inside the data directory.
pub fn default_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("bibnav.log")
}

/// Install a global subscriber appending to `path`.
///
/// `RUST_LOG` overrides `level`. Returns `false` if a subscriber was already
/// installed (e.g. by a test harness).
pub fn init(level: &str, path: &Path) -> Result<bool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(path = %path.display(), level, "logging initialized");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_log_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("logs").join("bibnav.log");

        init("debug", &path)?;

        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_default_log_path() {
        assert_eq!(
            default_log_path(Path::new("/data")),
            PathBuf::from("/data/bibnav.log")
        );
    }
}
