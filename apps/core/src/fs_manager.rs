use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "WELCOMEBOOK_DATA_DIR";

/// File name of the question log inside the db directory.
pub const DB_FILENAME: &str = "questions.sqlite";

pub struct PortablePathManager;

impl PortablePathManager {
    /// Application root: the crate directory in debug builds, the executable's
    /// directory in release builds, the working directory as a last resort.
    pub fn root_dir() -> PathBuf {
        #[cfg(debug_assertions)]
        {
            let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            if manifest_dir.exists() {
                return manifest_dir;
            }
        }

        match env::current_exe() {
            Ok(mut path) => {
                path.pop(); // drop the executable name
                path
            }
            Err(e) => {
                warn!("Failed to get current exe path: {}. Falling back to current_dir.", e);
                env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            }
        }
    }

    /// Main data directory (`./data` unless overridden by `WELCOMEBOOK_DATA_DIR`).
    pub fn data_dir() -> PathBuf {
        match env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => Self::root_dir().join("data"),
        }
    }

    /// Database directory (`<data>/db`).
    pub fn db_dir() -> PathBuf {
        Self::data_dir().join("db")
    }

    /// The question log database file.
    pub fn db_path() -> PathBuf {
        Self::db_dir().join(DB_FILENAME)
    }

    /// Default location of the chatbot configuration document.
    pub fn default_config_path() -> PathBuf {
        Self::root_dir().join("config").join("responses.json")
    }

    /// Create the data and db directories if they don't exist.
    pub fn init() -> Result<(), std::io::Error> {
        for dir in [Self::data_dir(), Self::db_dir()] {
            if !dir.exists() {
                info!("Creating directory: {:?}", dir);
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_data_dir_override() {
        let dir = tempdir().unwrap();
        let expected = dir.path().to_path_buf();
        temp_env::with_var(DATA_DIR_ENV, Some(dir.path()), || {
            assert_eq!(PortablePathManager::data_dir(), expected);
            assert_eq!(PortablePathManager::db_path(), expected.join("db").join(DB_FILENAME));
        });
    }

    #[test]
    fn test_init_creates_directories() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("nested").join("data");
        temp_env::with_var(DATA_DIR_ENV, Some(&data), || {
            PortablePathManager::init().unwrap();
            assert!(data.join("db").is_dir());
        });
    }

    #[test]
    fn test_empty_override_ignored() {
        temp_env::with_var(DATA_DIR_ENV, Some(""), || {
            assert_eq!(PortablePathManager::data_dir(), PortablePathManager::root_dir().join("data"));
        });
    }
}
