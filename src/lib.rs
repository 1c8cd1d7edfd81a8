//! Sound effect dispatch for a game host.
//!
//! The game core emits sound effect names on a channel; this crate resolves
//! each name to an audio asset and plays it without blocking.

pub mod audio_system;
pub mod config;
pub mod error;
pub mod messaging;

#[cfg(test)]
mod test_support;

pub use audio_system::{Dispatcher, Registry, SoundEffectName};
pub use config::{LifecycleStrategy, RegistryConfig};
pub use error::{AppResult, AudioError, ConfigError, DispatchError};
