//! Messaging between the application core and the dispatcher
//!
//! ```text
//! ┌──────────────┐   SoundEffectName   ┌─────────────────┐   play   ┌──────────────┐
//! │ Event source │ ──────────────────> │ Dispatch thread │ ───────> │ Audio output │
//! │  (game core) │   SoundEffectPort   │   (Dispatcher)  │          │  (host)      │
//! └──────────────┘                     └─────────────────┘          └──────────────┘
//! ```
//!
//! Nothing flows back to the event source.

pub mod executor;
pub mod port;

pub use executor::{spawn_dispatcher, DispatchThread};
pub use port::{sound_effect_channel, SoundEffectPort};
