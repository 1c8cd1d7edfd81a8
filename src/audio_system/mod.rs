//! Sound effect dispatch
//!
//! Resolves sound effect names to audio resources and plays them with one
//! of two lifecycle strategies, fixed for the whole process:
//!
//! - **Ephemeral**: a new playback instance per trigger. Retriggering a name
//!   overlaps the previous rendering; instance count is unbounded.
//! - **Pooled**: one playback instance per name, created up front.
//!   Retriggering restarts it from the beginning; instance count is bounded
//!   by the number of names.
//!
//! ## Architecture
//!
//! ```text
//! Registry (Arc, read-only)
//!   ├── fire    -> AudioResourceHandle
//!   ├── explode -> AudioResourceHandle
//!   └── ...
//!
//! Dispatcher<O: AudioOutput>
//!   ├── Ephemeral: cached bytes per name, instances created per trigger
//!   └── Pooled:    one O::Instance per name
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sfx_dispatch::audio_system::{Dispatcher, Registry, RodioOutput, SoundEffectName};
//! use sfx_dispatch::config::{LifecycleStrategy, RegistryConfig};
//!
//! let config = RegistryConfig::default();
//! let registry = Arc::new(Registry::initialize(&config, LifecycleStrategy::Pooled)?);
//! let mut dispatcher = Dispatcher::new(registry, RodioOutput::new()?);
//!
//! dispatcher.dispatch(SoundEffectName::Fire)?;
//! dispatcher.dispatch(SoundEffectName::Fire)?; // restarts the first shot
//! ```

pub mod dispatcher;
pub mod output;
pub mod registry;
pub mod source;

// Re-export commonly used types
pub use dispatcher::{DispatchStats, Dispatcher, Playback};
pub use output::{
    verify_decodable, AudioOutput, InstanceId, PlaybackEvent, PlaybackInstance, Rendering,
    RenderingState, RodioInstance, RodioOutput, VirtualInstance, VirtualOutput,
};
pub use registry::{AudioData, AudioResourceHandle, Registry};
pub use source::SoundEffectName;
