//! Inbound sound effect channel
//!
//! One-directional: the event source emits names, the dispatcher consumes
//! them. No replies, no acknowledgment, no backpressure.
use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::audio_system::SoundEffectName;

/// Create the channel between an event source and the dispatcher
pub fn sound_effect_channel() -> (SoundEffectPort, Receiver<SoundEffectName>) {
    let (tx, rx) = unbounded();
    (SoundEffectPort { sender: tx }, rx)
}

/// Producer side of the sound effect channel
#[derive(Debug, Clone)]
pub struct SoundEffectPort {
    sender: Sender<SoundEffectName>,
}

impl SoundEffectPort {
    /// Queue a sound effect (non-blocking).
    ///
    /// Returns `false` when the dispatcher is gone and the name was dropped.
    pub fn emit(&self, name: SoundEffectName) -> bool {
        self.sender.try_send(name).is_ok()
    }

    /// Queue several sound effects in order, stopping at the first dropped one.
    ///
    /// Returns how many were queued.
    pub fn emit_all(&self, names: impl IntoIterator<Item = SoundEffectName>) -> usize {
        names.into_iter().take_while(|name| self.emit(*name)).count()
    }
}
