//! Settings from the config file, environment and flags.
//!
//! Later sources win: `config.json` in the platform config directory, then
//! `CLOUDPIN_STORE` / `CLOUDPIN_ASSET_DIR`, then `--store` / `--asset-dir`.
//! `CLOUDPIN_CONFIG` points at a different config file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::Deserialize;

use cloudpin_core::StoreUrl;
use cloudpin_sync::SyncConfig;

const STORE_VAR: &str = "CLOUDPIN_STORE";
const ASSET_DIR_VAR: &str = "CLOUDPIN_ASSET_DIR";
const CONFIG_VAR: &str = "CLOUDPIN_CONFIG";

/// Stored settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SettingsFile {
    store: Option<String>,
    asset_dir: Option<PathBuf>,
    sync: SyncConfig,
}

/// Values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub store: Option<String>,
    pub asset_dir: Option<PathBuf>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug)]
pub struct Settings {
    pub store: StoreUrl,
    pub asset_dir: PathBuf,
    pub sync: SyncConfig,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "cloudpin").context("Could not determine config directory")
}

fn read_file(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

fn env_overrides() -> Overrides {
    Overrides {
        store: std::env::var(STORE_VAR).ok().filter(|s| !s.is_empty()),
        asset_dir: std::env::var_os(ASSET_DIR_VAR)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from),
    }
}

impl Settings {
    /// Load settings, applying `flags` last.
    pub fn load(flags: &Overrides) -> Result<Self> {
        let dirs = project_dirs()?;
        let path = std::env::var_os(CONFIG_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| dirs.config_dir().join("config.json"));
        tracing::debug!(path = %path.display(), "Loading settings");

        let file = read_file(&path)?;
        Self::resolve(file, &env_overrides(), flags, &dirs.cache_dir().join("assets"))
    }

    fn resolve(
        file: SettingsFile,
        env: &Overrides,
        flags: &Overrides,
        default_asset_dir: &Path,
    ) -> Result<Self> {
        let Some(store) = flags.store.clone().or(env.store.clone()).or(file.store) else {
            bail!("No record store configured. Pass --store or set {STORE_VAR}.");
        };
        let store = StoreUrl::new(&store).context("Invalid store URL")?;

        let asset_dir = flags
            .asset_dir
            .clone()
            .or(env.asset_dir.clone())
            .or(file.asset_dir)
            .unwrap_or_else(|| default_asset_dir.to_path_buf());

        Ok(Self {
            store,
            asset_dir,
            sync: file.sync,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(json: &str) -> SettingsFile {
        serde_json::from_str(json).unwrap()
    }

    fn overrides(store: Option<&str>, asset_dir: Option<&str>) -> Overrides {
        Overrides {
            store: store.map(String::from),
            asset_dir: asset_dir.map(PathBuf::from),
        }
    }

    #[test]
    fn flags_beat_env_beat_file() {
        let settings = Settings::resolve(
            file(r#"{"store": "https://file.example.com", "assetDir": "/file"}"#),
            &overrides(Some("https://env.example.com"), Some("/env")),
            &overrides(Some("https://flag.example.com"), None),
            Path::new("/default"),
        )
        .unwrap();

        assert_eq!(settings.store.host(), Some("flag.example.com"));
        assert_eq!(settings.asset_dir, PathBuf::from("/env"));
    }

    #[test]
    fn file_values_and_defaults() {
        let settings = Settings::resolve(
            file(r#"{"store": "https://file.example.com"}"#),
            &Overrides::default(),
            &Overrides::default(),
            Path::new("/default"),
        )
        .unwrap();
        assert_eq!(settings.store.host(), Some("file.example.com"));
        assert_eq!(settings.asset_dir, PathBuf::from("/default"));
        assert_eq!(settings.sync.record_kind, "Restaurant");
    }

    #[test]
    fn sync_section_is_read() {
        let settings = Settings::resolve(
            file(r#"{"store": "https://a.example.com", "sync": {"recordKind": "Bakery", "thumbnailField": "photo", "limit": 10}}"#),
            &Overrides::default(),
            &Overrides::default(),
            Path::new("/default"),
        )
        .unwrap();
        assert_eq!(settings.sync.record_kind, "Bakery");
        assert_eq!(settings.sync.thumbnail_field, "photo");
        assert_eq!(settings.sync.limit(), 10);
    }

    #[test]
    fn missing_store_is_an_error() {
        let err = Settings::resolve(
            SettingsFile::default(),
            &Overrides::default(),
            &Overrides::default(),
            Path::new("/default"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("--store"));
    }

    #[test]
    fn invalid_store_is_an_error() {
        let result = Settings::resolve(
            SettingsFile::default(),
            &Overrides::default(),
            &overrides(Some("ftp://example.com"), None),
            Path::new("/default"),
        );
        assert!(result.is_err());
    }
}
