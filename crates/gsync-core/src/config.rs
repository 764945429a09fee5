//! Store configuration
//!
//! Resolves where the metadata database lives: the platform data
//! directory by default, overridable through a YAML config file and the
//! `GSYNC_DATABASE_PATH` environment variable (file, then environment,
//! in increasing precedence).

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Application directory name under the platform data dir
const APP_DIR: &str = "gsync";

/// Database file name
const DB_FILE: &str = "gsync.db";

/// Environment variable overriding the database path
const ENV_DATABASE_PATH: &str = "GSYNC_DATABASE_PATH";

/// Resolved store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Application data directory
    pub data_dir: PathBuf,
    /// Full path of the SQLite database file
    pub database_path: PathBuf,
}

/// Optional overrides read from the YAML config file
#[derive(Debug, Default, Deserialize)]
struct FileOverlay {
    data_dir: Option<PathBuf>,
    database_path: Option<PathBuf>,
}

impl StoreConfig {
    /// Resolves the default configuration from the platform data
    /// directory, applying the environment override if set
    ///
    /// # Errors
    /// Fails when the platform data directory cannot be determined.
    pub fn resolve() -> anyhow::Result<Self> {
        let data_dir = dirs::data_local_dir()
            .context("unable to resolve the user data directory")?
            .join(APP_DIR);
        let mut config = Self {
            database_path: data_dir.join(DB_FILE),
            data_dir,
        };
        config.apply_env();
        Ok(config)
    }

    /// Resolves defaults, then applies overrides from a YAML file
    ///
    /// Unset fields in the file keep their resolved defaults; the
    /// environment override still wins over the file.
    ///
    /// # Errors
    /// Fails when defaults cannot be resolved or the file is unreadable
    /// or not valid YAML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::resolve()?;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let overlay: FileOverlay = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        if let Some(dir) = overlay.data_dir {
            config.database_path = dir.join(DB_FILE);
            config.data_dir = dir;
        }
        if let Some(db) = overlay.database_path {
            config.database_path = db;
        }
        config.apply_env();

        Ok(config)
    }

    /// Try to load from `path`; fall back to [`StoreConfig::resolve`] on
    /// any error
    pub fn load_or_resolve(path: &Path) -> anyhow::Result<Self> {
        Self::load(path).or_else(|_| Self::resolve())
    }

    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var(ENV_DATABASE_PATH) {
            if !path.is_empty() {
                self.database_path = PathBuf::from(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolve_places_db_in_data_dir() {
        let config = StoreConfig::resolve().unwrap();
        assert!(config.data_dir.ends_with(APP_DIR));
        assert_eq!(config.database_path.file_name().unwrap(), DB_FILE);
    }

    #[test]
    fn test_load_applies_data_dir_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_dir: /var/lib/gsync").unwrap();

        let config = StoreConfig::load(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/gsync"));
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/gsync").join(DB_FILE)
        );
    }

    #[test]
    fn test_load_database_path_wins_over_data_dir() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_dir: /var/lib/gsync").unwrap();
        writeln!(file, "database_path: /tmp/elsewhere.db").unwrap();

        let config = StoreConfig::load(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/gsync"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/elsewhere.db"));
    }

    #[test]
    fn test_load_or_resolve_falls_back_on_missing_file() {
        let config = StoreConfig::load_or_resolve(Path::new("/nonexistent/gsync.yaml")).unwrap();
        assert_eq!(config.database_path.file_name().unwrap(), DB_FILE);
    }

    #[test]
    fn test_load_rejects_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_dir: [unclosed").unwrap();
        assert!(StoreConfig::load(file.path()).is_err());
    }
}
