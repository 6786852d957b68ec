use platform_dirs::AppDirs;
use ron::de::from_reader;
use ron::ser::{to_string_pretty, PrettyConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{HyperError, Result};
use crate::export::DEFAULT_EXPORT_FILE;
use crate::math::canonical::{Canonicalizer, DEFAULT_MAX_DENOMINATOR};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "defaults::max_denominator")]
    pub max_denominator: u64,
    #[serde(default = "defaults::export_file")]
    pub export_file: String,
}

macro_rules! default_ {
    ($name:ident, $type:ident) => {
        pub fn $name() -> $type {
            Config::default().$name
        }
    };
}

mod defaults {
    use super::Config;
    default_!(max_denominator, u64);
    default_!(export_file, String);
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_denominator: DEFAULT_MAX_DENOMINATOR,
            export_file: DEFAULT_EXPORT_FILE.to_owned(),
        }
    }
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        let dirs = AppDirs::new(Some("hyperreal"), false)?;
        Some(dirs.config_dir.join("hyperreal.cfg"))
    }

    // never fails: a missing or broken config falls back to the defaults
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            warn!("no config directory on this platform, using defaults");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(conf) => conf,
            Err(err) => {
                warn!(%err, "using default config");
                Self::default()
            }
        }
    }

    /// Reads the config at `path`, writing the defaults there first if it
    /// does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(_) => {
                debug!(path = %path.display(), "writing default config");
                let conf = Self::default();
                conf.save_to(path)?;
                return Ok(conf);
            }
        };
        let conf = from_reader::<fs::File, Self>(file)
            .map_err(|e| HyperError::Config(e.to_string()))?;
        // write back default values of any fields not present
        conf.save_to(path)?;
        Ok(conf)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| HyperError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let text = to_string_pretty(self, PrettyConfig::default())
            .map_err(|e| HyperError::Config(e.to_string()))?;
        fs::write(path, text).map_err(|source| HyperError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn canonicalizer(&self) -> Result<Canonicalizer> {
        Canonicalizer::new(self.max_denominator)
    }
}

#[test]
fn missing_config_is_created_test() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("hyperreal.cfg");
    let conf = Config::load_from(&path).unwrap();
    assert_eq!(conf, Config::default());
    assert!(path.exists());
    assert_eq!(Config::load_from(&path).unwrap(), conf);
}

#[test]
fn partial_config_gets_defaults_test() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hyperreal.cfg");
    fs::write(&path, "(max_denominator: 1000)").unwrap();
    let conf = Config::load_from(&path).unwrap();
    assert_eq!(conf.max_denominator, 1000);
    assert_eq!(conf.export_file, DEFAULT_EXPORT_FILE);
    // the missing field was written back
    assert!(fs::read_to_string(&path).unwrap().contains("export_file"));
    let bound = crate::math::NumComponent::from(1000u64);
    assert_eq!(conf.canonicalizer().unwrap().max_denominator(), &bound);
}

#[test]
fn broken_config_is_an_error_test() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hyperreal.cfg");
    fs::write(&path, "not ron at all (").unwrap();
    assert!(matches!(Config::load_from(&path), Err(HyperError::Config(_))));
}

#[test]
fn zero_bound_is_rejected_test() {
    let conf = Config {
        max_denominator: 0,
        ..Config::default()
    };
    assert!(matches!(conf.canonicalizer(), Err(HyperError::InvalidPrecision)));
}
