use thiserror::Error;

use crate::audio_system::SoundEffectName;

/// Per-trigger dispatch failures.
///
/// Both kinds are local to a single trigger: the dispatch loop logs them and
/// moves on to the next name on the channel.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The name is outside the registered vocabulary.
    #[error("Unknown sound effect: {name}")]
    UnknownEffect { name: String },

    #[error("Failed to load sound effect {name} from {location}")]
    ResourceLoad {
        name: SoundEffectName,
        location: String,
        #[source]
        source: AudioError,
    },
}

impl DispatchError {
    pub fn unknown(name: impl Into<String>) -> Self {
        DispatchError::UnknownEffect { name: name.into() }
    }

    pub fn is_unknown_effect(&self) -> bool {
        matches!(self, DispatchError::UnknownEffect { .. })
    }

    pub fn is_resource_load(&self) -> bool {
        matches!(self, DispatchError::ResourceLoad { .. })
    }
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio file unreachable: {path}")]
    Unreachable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode audio format")]
    DecodeFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to initialize audio output stream")]
    StreamInitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Audio playback failed")]
    PlaybackFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Audio resource unavailable after a failed startup load")]
    Unavailable,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;
