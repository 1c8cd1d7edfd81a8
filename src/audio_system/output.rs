//! Host audio output
//!
//! The dispatcher only needs two things from the host: create a playable
//! instance from a resource, and play that instance from its first sample.
//! [`RodioOutput`] renders to the default output device. [`VirtualOutput`]
//! renders nothing and records every lifecycle step instead.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use super::registry::{AudioData, AudioResourceHandle};
use super::source::SoundEffectName;
use crate::error::AudioError;

/// One rendering unit bound to an audio resource
pub trait PlaybackInstance {
    /// Start rendering from the first sample, cutting off any rendering in progress
    fn play_from_start(&mut self) -> Result<(), AudioError>;

    fn is_playing(&self) -> bool;

    /// Stop tracking the instance and let the current rendering run to its end
    fn abandon(self)
    where
        Self: Sized;
}

/// Factory for playback instances
pub trait AudioOutput {
    type Instance: PlaybackInstance;

    fn create_instance(
        &self,
        handle: &AudioResourceHandle,
        data: &AudioData,
    ) -> Result<Self::Instance, AudioError>;
}

/// Shared bytes readable through a `Cursor` without copying the buffer per trigger
#[derive(Clone)]
struct SharedAudio(AudioData);

impl AsRef<[u8]> for SharedAudio {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

fn decoder_for(data: &AudioData) -> Result<Decoder<Cursor<SharedAudio>>, AudioError> {
    Decoder::new(Cursor::new(SharedAudio(Arc::clone(data))))
        .map_err(|e| AudioError::DecodeFailed(Box::new(e)))
}

/// Check that the format is recognized and the first sample decodes
pub fn verify_decodable(data: &AudioData) -> Result<(), AudioError> {
    if decoder_for(data)?.next().is_none() {
        return Err(AudioError::DecodeFailed("audio contains no samples".into()));
    }
    Ok(())
}

/// Default output device via rodio
pub struct RodioOutput {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl RodioOutput {
    /// Open the default output device.
    ///
    /// The stream is not `Send`; create it on the thread that dispatches.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;
        tracing::info!("Opened default audio output device");
        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }
}

impl AudioOutput for RodioOutput {
    type Instance = RodioInstance;

    fn create_instance(
        &self,
        handle: &AudioResourceHandle,
        data: &AudioData,
    ) -> Result<RodioInstance, AudioError> {
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| AudioError::PlaybackFailed(Box::new(e)))?;

        Ok(RodioInstance {
            name: handle.name(),
            stream_handle: self.stream_handle.clone(),
            sink,
            audio_data: Arc::clone(data),
        })
    }
}

/// A rodio sink dedicated to one sound effect
pub struct RodioInstance {
    name: SoundEffectName,
    stream_handle: OutputStreamHandle,
    sink: Sink,
    audio_data: AudioData,
}

impl PlaybackInstance for RodioInstance {
    fn play_from_start(&mut self) -> Result<(), AudioError> {
        let source = decoder_for(&self.audio_data)?;

        if !self.sink.empty() {
            // A stopped sink waits for its queue to drain on the next append,
            // so replace it rather than reuse it.
            self.sink.stop();
            self.sink = Sink::try_new(&self.stream_handle)
                .map_err(|e| AudioError::PlaybackFailed(Box::new(e)))?;
            tracing::debug!("Interrupted {} to restart it", self.name);
        }

        self.sink.append(source);
        self.sink.play();
        Ok(())
    }

    fn is_playing(&self) -> bool {
        !self.sink.empty()
    }

    fn abandon(self) {
        self.sink.detach();
    }
}

/// Identifier of an instance created by [`VirtualOutput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(pub usize);

/// Lifecycle step recorded by [`VirtualOutput`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Created {
        instance: InstanceId,
        name: SoundEffectName,
        location: PathBuf,
    },
    Started {
        instance: InstanceId,
        name: SoundEffectName,
    },
    Restarted {
        instance: InstanceId,
        name: SoundEffectName,
    },
    Abandoned {
        instance: InstanceId,
        name: SoundEffectName,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderingState {
    Playing,
    /// Cut off by a restart of the same instance
    Interrupted,
    /// Reached its natural end
    Completed,
}

/// One play-from-start of one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    pub instance: InstanceId,
    pub name: SoundEffectName,
    pub location: PathBuf,
    pub state: RenderingState,
}

#[derive(Debug, Default)]
struct Recording {
    next_id: usize,
    events: Vec<PlaybackEvent>,
    renderings: Vec<Rendering>,
}

/// Output that renders nothing and records instance lifecycles.
///
/// Clones share one recording, so a clone kept outside the dispatch thread
/// observes what the dispatcher did. Renderings stay `Playing` until
/// [`VirtualOutput::finish_all`] plays them out.
#[derive(Debug, Clone, Default)]
pub struct VirtualOutput {
    recording: Arc<Mutex<Recording>>,
}

impl VirtualOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlaybackEvent> {
        self.recording.lock().events.clone()
    }

    /// Every rendering in the order it was started
    pub fn renderings(&self) -> Vec<Rendering> {
        self.recording.lock().renderings.clone()
    }

    pub fn renderings_of(&self, name: SoundEffectName) -> Vec<Rendering> {
        self.recording
            .lock()
            .renderings
            .iter()
            .filter(|r| r.name == name)
            .cloned()
            .collect()
    }

    /// Number of instances ever created
    pub fn instance_count(&self) -> usize {
        self.recording.lock().next_id
    }

    /// Let every rendering still in progress reach its natural end
    pub fn finish_all(&self) {
        let mut recording = self.recording.lock();
        for rendering in recording
            .renderings
            .iter_mut()
            .filter(|r| r.state == RenderingState::Playing)
        {
            rendering.state = RenderingState::Completed;
        }
    }
}

impl AudioOutput for VirtualOutput {
    type Instance = VirtualInstance;

    fn create_instance(
        &self,
        handle: &AudioResourceHandle,
        _data: &AudioData,
    ) -> Result<VirtualInstance, AudioError> {
        let mut recording = self.recording.lock();
        let id = InstanceId(recording.next_id);
        recording.next_id += 1;
        recording.events.push(PlaybackEvent::Created {
            instance: id,
            name: handle.name(),
            location: handle.location().to_path_buf(),
        });
        tracing::debug!("Virtual instance {:?} created for {}", id, handle.name());

        Ok(VirtualInstance {
            id,
            name: handle.name(),
            location: handle.location().to_path_buf(),
            current: None,
            recording: Arc::clone(&self.recording),
        })
    }
}

pub struct VirtualInstance {
    id: InstanceId,
    name: SoundEffectName,
    location: PathBuf,
    current: Option<usize>,
    recording: Arc<Mutex<Recording>>,
}

impl VirtualInstance {
    pub fn id(&self) -> InstanceId {
        self.id
    }
}

impl PlaybackInstance for VirtualInstance {
    fn play_from_start(&mut self) -> Result<(), AudioError> {
        let mut recording = self.recording.lock();

        let interrupted = match self.current.and_then(|i| recording.renderings.get_mut(i)) {
            Some(rendering) if rendering.state == RenderingState::Playing => {
                rendering.state = RenderingState::Interrupted;
                true
            }
            _ => false,
        };

        recording.renderings.push(Rendering {
            instance: self.id,
            name: self.name,
            location: self.location.clone(),
            state: RenderingState::Playing,
        });
        self.current = Some(recording.renderings.len() - 1);

        let event = if interrupted {
            PlaybackEvent::Restarted {
                instance: self.id,
                name: self.name,
            }
        } else {
            PlaybackEvent::Started {
                instance: self.id,
                name: self.name,
            }
        };
        recording.events.push(event);
        Ok(())
    }

    fn is_playing(&self) -> bool {
        let recording = self.recording.lock();
        self.current
            .and_then(|i| recording.renderings.get(i))
            .is_some_and(|r| r.state == RenderingState::Playing)
    }

    fn abandon(self) {
        self.recording.lock().events.push(PlaybackEvent::Abandoned {
            instance: self.id,
            name: self.name,
        });
    }
}
