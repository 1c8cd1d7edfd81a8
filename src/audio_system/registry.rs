//! Sound effect registry
//!
//! Fixed name → resource mapping, built once at startup and read-only after.

use std::collections::HashMap;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::output::verify_decodable;
use super::source::SoundEffectName;
use crate::config::{LifecycleStrategy, RegistryConfig};
use crate::error::{AudioError, DispatchError};

/// Encoded audio bytes held in memory
pub type AudioData = Arc<Vec<u8>>;

#[derive(Debug, Clone)]
enum ResourceState {
    /// Read on first use
    Deferred,
    Loaded(AudioData),
    /// Startup load failed and was already reported
    Failed,
}

/// An asset location plus its bytes once acquired
#[derive(Debug, Clone)]
pub struct AudioResourceHandle {
    name: SoundEffectName,
    location: PathBuf,
    state: ResourceState,
}

impl AudioResourceHandle {
    /// Handle whose asset is read on first [`acquire`](Self::acquire)
    pub fn deferred(name: SoundEffectName, location: PathBuf) -> Self {
        Self {
            name,
            location,
            state: ResourceState::Deferred,
        }
    }

    /// Read and verify the asset now
    pub fn preload(name: SoundEffectName, location: PathBuf) -> Result<Self, DispatchError> {
        let data = load_asset(name, &location)?;
        Ok(Self {
            name,
            location,
            state: ResourceState::Loaded(data),
        })
    }

    pub fn name(&self) -> SoundEffectName {
        self.name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Bytes loaded at startup, if any
    pub fn preloaded(&self) -> Option<&AudioData> {
        match &self.state {
            ResourceState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.state, ResourceState::Deferred)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, ResourceState::Failed)
    }

    /// Get playable bytes.
    ///
    /// Preloaded handles hand out their shared buffer. Deferred handles read
    /// and verify the asset on every call and keep nothing; caching is up to
    /// the caller.
    pub fn acquire(&self) -> Result<AudioData, DispatchError> {
        match &self.state {
            ResourceState::Loaded(data) => Ok(Arc::clone(data)),
            ResourceState::Deferred => load_asset(self.name, &self.location),
            ResourceState::Failed => Err(self.load_error(AudioError::Unavailable)),
        }
    }

    pub(crate) fn load_error(&self, source: AudioError) -> DispatchError {
        DispatchError::ResourceLoad {
            name: self.name,
            location: self.location.display().to_string(),
            source,
        }
    }
}

/// Read an asset into memory and check that it decodes
fn load_asset(name: SoundEffectName, location: &Path) -> Result<AudioData, DispatchError> {
    let to_error = |source: AudioError| DispatchError::ResourceLoad {
        name,
        location: location.display().to_string(),
        source,
    };

    let audio_data = std::fs::read(location).map_err(|e| {
        to_error(AudioError::Unreachable {
            path: location.display().to_string(),
            source: e,
        })
    })?;
    let audio_data = Arc::new(audio_data);
    verify_decodable(&audio_data).map_err(to_error)?;

    tracing::info!(
        "Loaded audio for {}: {} ({} bytes)",
        name,
        location.display(),
        audio_data.len()
    );
    Ok(audio_data)
}

/// Read-only mapping from sound effect names to resources
#[derive(Debug)]
pub struct Registry {
    strategy: LifecycleStrategy,
    entries: HashMap<SoundEffectName, AudioResourceHandle>,
}

impl Registry {
    /// Build one handle per configured entry.
    ///
    /// When the strategy preloads, every asset is read and verified here and
    /// the first failure aborts initialization. Otherwise nothing is read.
    pub fn initialize(
        config: &RegistryConfig,
        strategy: LifecycleStrategy,
    ) -> Result<Self, DispatchError> {
        Self::build(config, strategy, Err)
    }

    /// Like [`initialize`](Self::initialize), but an asset that fails to load
    /// is reported once and its entry kept in a failed state.
    pub fn initialize_degraded(config: &RegistryConfig, strategy: LifecycleStrategy) -> Self {
        let registry = Self::build(config, strategy, |e| -> Result<(), Infallible> {
            if let DispatchError::ResourceLoad { name, .. } = &e {
                tracing::error!("{} (triggers for {} will be silent)", error_chain(&e), name);
            }
            Ok(())
        });
        match registry {
            Ok(registry) => registry,
            Err(never) => match never {},
        }
    }

    /// Shared construction loop.
    ///
    /// `on_load_failure` decides what a failed preload does: `Err` aborts,
    /// `Ok` keeps the entry in the failed state.
    fn build<E>(
        config: &RegistryConfig,
        strategy: LifecycleStrategy,
        mut on_load_failure: impl FnMut(DispatchError) -> Result<(), E>,
    ) -> Result<Self, E> {
        let mut entries = HashMap::with_capacity(config.len());
        for (name, location) in config.entries() {
            let location = location.to_path_buf();
            let handle = if strategy.preloads() {
                match AudioResourceHandle::preload(name, location.clone()) {
                    Ok(handle) => handle,
                    Err(e) => {
                        on_load_failure(e)?;
                        AudioResourceHandle {
                            name,
                            location,
                            state: ResourceState::Failed,
                        }
                    }
                }
            } else {
                AudioResourceHandle::deferred(name, location)
            };
            entries.insert(name, handle);
        }

        let failed = entries.values().filter(|h| h.is_failed()).count();
        tracing::debug!(
            "Registry initialized with {} entries ({}), {} failed",
            entries.len(),
            strategy,
            failed
        );
        Ok(Self { strategy, entries })
    }

    /// Look up the handle for `name`
    pub fn resolve(&self, name: SoundEffectName) -> Result<&AudioResourceHandle, DispatchError> {
        self.entries
            .get(&name)
            .ok_or_else(|| DispatchError::unknown(name.as_str()))
    }

    pub fn strategy(&self) -> LifecycleStrategy {
        self.strategy
    }

    /// Registered names in declaration order
    pub fn names(&self) -> Vec<SoundEffectName> {
        SoundEffectName::ALL
            .iter()
            .copied()
            .filter(|name| self.entries.contains_key(name))
            .collect()
    }

    pub fn handles(&self) -> impl Iterator<Item = &AudioResourceHandle> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render an error with its sources, `outer: inner: root`
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
