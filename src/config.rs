use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::audio_system::SoundEffectName;
use crate::error::ConfigError;

const CONFIG_FILE_NAME: &str = "sound_effects.json";

/// Playback-instance lifecycle, chosen once for the whole process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStrategy {
    /// Fresh instance per trigger; retriggers overlap, resource use is unbounded
    #[default]
    Ephemeral,

    /// One instance per name; retriggers interrupt and restart, resource use is bounded
    Pooled,
}

impl LifecycleStrategy {
    /// Whether assets are read and verified before the first trigger
    pub fn preloads(&self) -> bool {
        matches!(self, LifecycleStrategy::Pooled)
    }
}

impl fmt::Display for LifecycleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStrategy::Ephemeral => write!(f, "ephemeral"),
            LifecycleStrategy::Pooled => write!(f, "pooled"),
        }
    }
}

impl FromStr for LifecycleStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ephemeral" => Ok(LifecycleStrategy::Ephemeral),
            "pooled" => Ok(LifecycleStrategy::Pooled),
            other => Err(ConfigError::Invalid(format!(
                "unknown lifecycle strategy '{}' (expected 'ephemeral' or 'pooled')",
                other
            ))),
        }
    }
}

/// Static mapping of sound effect names to asset locations.
///
/// Serialized as a flat JSON object, e.g. `{"fire": "assets/audio/1.wav"}`.
/// There are no other options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, PathBuf>",
    into = "BTreeMap<String, PathBuf>"
)]
pub struct RegistryConfig {
    entries: BTreeMap<SoundEffectName, PathBuf>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        let audio_dir = Path::new("assets").join("audio");
        let entries = SoundEffectName::ALL
            .iter()
            .enumerate()
            .map(|(index, name)| (*name, audio_dir.join(format!("{}.wav", index + 1))))
            .collect();
        Self { entries }
    }
}

impl TryFrom<BTreeMap<String, PathBuf>> for RegistryConfig {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, PathBuf>) -> Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for (key, location) in raw {
            let name = key
                .parse::<SoundEffectName>()
                .map_err(|_| ConfigError::Invalid(format!("unknown sound effect '{}'", key)))?;
            if location.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "empty asset location for '{}'",
                    name
                )));
            }
            entries.insert(name, location);
        }
        Ok(Self { entries })
    }
}

impl From<RegistryConfig> for BTreeMap<String, PathBuf> {
    fn from(config: RegistryConfig) -> Self {
        config
            .entries
            .into_iter()
            .map(|(name, location)| (name.to_string(), location))
            .collect()
    }
}

impl RegistryConfig {
    /// Empty mapping
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with_entry(mut self, name: SoundEffectName, location: impl Into<PathBuf>) -> Self {
        self.insert(name, location);
        self
    }

    /// Map a name to a location, replacing any previous one
    pub fn insert(&mut self, name: SoundEffectName, location: impl Into<PathBuf>) {
        self.entries.insert(name, location.into());
    }

    pub fn location(&self, name: SoundEffectName) -> Option<&Path> {
        self.entries.get(&name).map(PathBuf::as_path)
    }

    /// Entries in name order
    pub fn entries(&self) -> impl Iterator<Item = (SoundEffectName, &Path)> {
        self.entries
            .iter()
            .map(|(name, location)| (*name, location.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve relative locations against `base_dir`; absolute ones are kept
    pub fn rebase(&self, base_dir: &Path) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(name, location)| {
                let location = if location.is_relative() {
                    base_dir.join(location)
                } else {
                    location.clone()
                };
                (*name, location)
            })
            .collect();
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Load a configuration file.
    ///
    /// Relative locations in the file are resolved against the file's directory.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        let config: RegistryConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;

        tracing::info!(
            "Loaded {} sound effect entries from {}",
            config.len(),
            path.display()
        );
        Ok(config.rebase(&config_dir_of(path)))
    }

    /// Load a configuration file, writing the default mapping first if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = RegistryConfig::default();
        config.save_to(path)?;
        tracing::info!("Created default sound effect config at {}", path.display());
        Ok(config.rebase(&config_dir_of(path)))
    }

    /// Save configuration to disk
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(|e| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    }

    /// Default config file path (in the executable's directory)
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let exe_path = env::current_exe().map_err(|e| ConfigError::LoadFailed {
            path: "<current executable>".to_string(),
            source: Box::new(e),
        })?;
        let exe_dir = exe_path.parent().ok_or_else(|| {
            ConfigError::Invalid("Could not determine executable directory".to_string())
        })?;

        Ok(exe_dir.join("config").join(CONFIG_FILE_NAME))
    }
}

fn config_dir_of(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_asset_layout() {
        let config = RegistryConfig::default();
        assert_eq!(config.len(), SoundEffectName::ALL.len());
        assert_eq!(
            config.location(SoundEffectName::Fire),
            Some(Path::new("assets/audio/1.wav"))
        );
        assert_eq!(
            config.location(SoundEffectName::UfoStep4),
            Some(Path::new("assets/audio/7.wav"))
        );
    }

    #[test]
    fn test_parse_flat_json_object() {
        let config =
            RegistryConfig::from_json(r#"{"fire": "a.wav", "hit": "b.wav"}"#).unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config.location(SoundEffectName::Fire), Some(Path::new("a.wav")));
        assert_eq!(config.location(SoundEffectName::Hit), Some(Path::new("b.wav")));
        assert_eq!(config.location(SoundEffectName::Explode), None);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = RegistryConfig::from_json(r#"{"fire": "a.wav", "laser": "z.wav"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("laser"));
    }

    #[test]
    fn test_non_location_option_is_rejected() {
        assert!(RegistryConfig::from_json(r#"{"fire": "a.wav", "volume": 0.5}"#).is_err());
    }

    #[test]
    fn test_empty_location_is_rejected() {
        assert!(RegistryConfig::from_json(r#"{"fire": ""}"#).is_err());
    }

    #[test]
    fn test_serialization_uses_wire_names() {
        let config = RegistryConfig::empty().with_entry(SoundEffectName::UfoStep1, "4.wav");
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"ufoStep1\""));

        let parsed = RegistryConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rebase_keeps_absolute_locations() {
        let absolute = std::env::temp_dir().join("explode.wav");
        let config = RegistryConfig::empty()
            .with_entry(SoundEffectName::Fire, "audio/1.wav")
            .with_entry(SoundEffectName::Explode, absolute.clone());

        let base = Path::new("/srv/game");
        let rebased = config.rebase(base);
        assert_eq!(
            rebased.location(SoundEffectName::Fire),
            Some(base.join("audio/1.wav").as_path())
        );
        assert_eq!(
            rebased.location(SoundEffectName::Explode),
            Some(absolute.as_path())
        );
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join(CONFIG_FILE_NAME);

        let created = RegistryConfig::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(
            created.location(SoundEffectName::Hit),
            Some(dir.path().join("config/assets/audio/3.wav").as_path())
        );

        // Second load reads the file that was just written
        let loaded = RegistryConfig::load_or_create(&path).unwrap();
        assert_eq!(loaded, created);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = RegistryConfig::load_from(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            "pooled".parse::<LifecycleStrategy>().unwrap(),
            LifecycleStrategy::Pooled
        );
        assert_eq!(
            "ephemeral".parse::<LifecycleStrategy>().unwrap(),
            LifecycleStrategy::Ephemeral
        );
        assert!("hybrid".parse::<LifecycleStrategy>().is_err());
    }

    #[test]
    fn test_default_strategy_is_ephemeral() {
        assert_eq!(LifecycleStrategy::default(), LifecycleStrategy::Ephemeral);
        assert!(!LifecycleStrategy::Ephemeral.preloads());
        assert!(LifecycleStrategy::Pooled.preloads());
    }
}
