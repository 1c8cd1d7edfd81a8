//! Sound effect dispatcher
//!
//! Turns each name from the inbound channel into a play command, using the
//! lifecycle strategy the registry was initialized with:
//!
//! ```text
//! Ephemeral: resolve ─> new instance ─> play ─> abandon    (retriggers overlap)
//! Pooled:    resolve ─> pooled instance ─> play from start  (retriggers restart)
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crossbeam_channel::Receiver;

use super::output::{AudioOutput, PlaybackInstance};
use super::registry::{error_chain, AudioData, Registry};
use super::source::SoundEffectName;
use crate::config::LifecycleStrategy;
use crate::error::{AudioError, DispatchError};

/// What a trigger did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// A rendering began with nothing of this name cut off
    Started,
    /// The pooled instance was already playing and started over
    Restarted,
    /// The name's resource failed to load earlier; nothing was played
    Muted,
}

/// Outcome counters for one dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub dispatched: usize,
    pub started: usize,
    pub restarted: usize,
    pub muted: usize,
    pub unknown: usize,
    pub load_failures: usize,
}

enum Lifecycle<I> {
    /// Bytes cached per name after the first successful acquisition
    Ephemeral { sources: HashMap<SoundEffectName, AudioData> },
    /// Exactly one instance per healthy registry entry
    Pooled { pool: HashMap<SoundEffectName, I> },
}

pub struct Dispatcher<O: AudioOutput> {
    registry: Arc<Registry>,
    output: O,
    lifecycle: Lifecycle<O::Instance>,
    muted: HashSet<SoundEffectName>,
    stats: DispatchStats,
}

impl<O: AudioOutput> Dispatcher<O> {
    /// Create a dispatcher over `registry`.
    ///
    /// Under the pooled strategy this creates the one instance per name; a
    /// name whose instance cannot be created is reported here and muted.
    pub fn new(registry: Arc<Registry>, output: O) -> Self {
        let mut muted: HashSet<SoundEffectName> = registry
            .handles()
            .filter(|h| h.is_failed())
            .map(|h| h.name())
            .collect();
        let mut stats = DispatchStats::default();

        let lifecycle = match registry.strategy() {
            LifecycleStrategy::Ephemeral => Lifecycle::Ephemeral {
                sources: HashMap::new(),
            },
            LifecycleStrategy::Pooled => {
                let mut pool = HashMap::with_capacity(registry.len());
                for handle in registry.handles().filter(|h| !h.is_failed()) {
                    let instance = handle.acquire().and_then(|data| {
                        output
                            .create_instance(handle, &data)
                            .map_err(|e| handle.load_error(e))
                    });
                    match instance {
                        Ok(instance) => {
                            pool.insert(handle.name(), instance);
                        }
                        Err(e) => {
                            report(&e);
                            stats.load_failures += 1;
                            muted.insert(handle.name());
                        }
                    }
                }
                tracing::debug!("Created {} pooled playback instances", pool.len());
                Lifecycle::Pooled { pool }
            }
        };

        Self {
            registry,
            output,
            lifecycle,
            muted,
            stats,
        }
    }

    /// Play one sound effect.
    ///
    /// Never blocks on playback. A resource load error is returned once; the
    /// name's later triggers return [`Playback::Muted`].
    pub fn dispatch(&mut self, name: SoundEffectName) -> Result<Playback, DispatchError> {
        tracing::debug!("Dispatching {}", name);
        self.stats.dispatched += 1;

        let result = self.trigger(name);
        match &result {
            Ok(Playback::Started) => self.stats.started += 1,
            Ok(Playback::Restarted) => self.stats.restarted += 1,
            Ok(Playback::Muted) => self.stats.muted += 1,
            Err(e) if e.is_unknown_effect() => self.stats.unknown += 1,
            Err(_) => {
                self.stats.load_failures += 1;
                self.muted.insert(name);
            }
        }
        result
    }

    fn trigger(&mut self, name: SoundEffectName) -> Result<Playback, DispatchError> {
        let handle = self.registry.resolve(name)?;
        if self.muted.contains(&name) {
            return Ok(Playback::Muted);
        }

        match &mut self.lifecycle {
            Lifecycle::Ephemeral { sources } => {
                let data = match sources.get(&name) {
                    Some(data) => Arc::clone(data),
                    None => {
                        let data = handle.acquire()?;
                        sources.insert(name, Arc::clone(&data));
                        data
                    }
                };

                let mut instance = self
                    .output
                    .create_instance(handle, &data)
                    .map_err(|e| handle.load_error(e))?;
                instance
                    .play_from_start()
                    .map_err(|e| handle.load_error(e))?;
                instance.abandon();
                Ok(Playback::Started)
            }
            Lifecycle::Pooled { pool } => {
                let instance = pool
                    .get_mut(&name)
                    .ok_or_else(|| handle.load_error(AudioError::Unavailable))?;
                let was_playing = instance.is_playing();
                instance
                    .play_from_start()
                    .map_err(|e| handle.load_error(e))?;

                Ok(if was_playing {
                    Playback::Restarted
                } else {
                    Playback::Started
                })
            }
        }
    }

    /// Consume `events` in order until every sender is gone
    pub fn run(&mut self, events: &Receiver<SoundEffectName>) -> DispatchStats {
        tracing::info!(
            "Dispatcher started ({}, {} sound effects)",
            self.strategy(),
            self.registry.len()
        );

        while let Ok(name) = events.recv() {
            if let Err(e) = self.dispatch(name) {
                report(&e);
            }
        }

        tracing::info!("Dispatcher stopped: {:?}", self.stats);
        self.stats
    }

    pub fn strategy(&self) -> LifecycleStrategy {
        self.registry.strategy()
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn is_muted(&self, name: SoundEffectName) -> bool {
        self.muted.contains(&name)
    }

    /// Number of pooled instances; always zero for the ephemeral strategy
    pub fn pooled_instances(&self) -> usize {
        match &self.lifecycle {
            Lifecycle::Ephemeral { .. } => 0,
            Lifecycle::Pooled { pool } => pool.len(),
        }
    }
}

fn report(err: &DispatchError) {
    match err {
        DispatchError::UnknownEffect { name } => {
            tracing::error!(
                "Sound effect '{}' has no registry entry; the event source and the sound effect configuration disagree",
                name
            );
        }
        DispatchError::ResourceLoad { name, .. } => {
            tracing::error!("{}; {} is muted from now on", error_chain(err), name);
        }
    }
}
