// Integration tests for sfx-dispatch
// These drive the full path: config -> registry -> channel -> dispatch thread -> output

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sfx_dispatch::audio_system::{PlaybackEvent, RenderingState, VirtualOutput};
use sfx_dispatch::messaging::{sound_effect_channel, spawn_dispatcher};
use sfx_dispatch::{LifecycleStrategy, Registry, RegistryConfig, SoundEffectName};

use SoundEffectName::{Explode, Fire, Hit, UfoStep2};

/// Helper to write a short mono WAV
fn write_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..800i32 {
            writer.write_sample(((i % 50) * 400) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    std::fs::write(path, cursor.into_inner()).unwrap();
}

/// Write `{fire: a.wav, hit: b.wav}` into `dir` and load it
fn fire_hit_config(dir: &Path) -> RegistryConfig {
    write_wav(&dir.join("a.wav"));
    write_wav(&dir.join("b.wav"));
    let config_path = dir.join("sound_effects.json");
    std::fs::write(&config_path, r#"{"fire": "a.wav", "hit": "b.wav"}"#).unwrap();
    RegistryConfig::load_from(&config_path).unwrap()
}

/// Run `names` through a dispatch thread and return what the output saw
fn run(config: &RegistryConfig, strategy: LifecycleStrategy, names: &[SoundEffectName]) -> VirtualOutput {
    let registry = Arc::new(Registry::initialize_degraded(config, strategy));
    let (port, events) = sound_effect_channel();
    let output = VirtualOutput::new();
    let observer = output.clone();

    let thread = spawn_dispatcher(registry, events, move || Ok(output)).unwrap();
    assert_eq!(port.emit_all(names.iter().copied()), names.len());
    drop(port);
    thread.join().unwrap();

    observer
}

fn rendered_files(output: &VirtualOutput) -> Vec<PathBuf> {
    output
        .renderings()
        .iter()
        .map(|r| PathBuf::from(r.location.file_name().unwrap()))
        .collect()
}

#[test]
fn test_ephemeral_fire_hit_fire() {
    let dir = tempfile::tempdir().unwrap();
    let config = fire_hit_config(dir.path());

    let output = run(&config, LifecycleStrategy::Ephemeral, &[Fire, Hit, Fire]);

    assert_eq!(
        rendered_files(&output),
        vec![PathBuf::from("a.wav"), PathBuf::from("b.wav"), PathBuf::from("a.wav")]
    );
    assert_eq!(output.instance_count(), 3);

    let created = output
        .events()
        .iter()
        .filter(|e| matches!(e, PlaybackEvent::Created { .. }))
        .count();
    assert_eq!(created, 3);

    output.finish_all();
    assert!(output
        .renderings()
        .iter()
        .all(|r| r.state == RenderingState::Completed));
}

#[test]
fn test_pooled_fire_hit_fire() {
    let dir = tempfile::tempdir().unwrap();
    let config = fire_hit_config(dir.path());

    let output = run(&config, LifecycleStrategy::Pooled, &[Fire, Hit, Fire]);

    assert_eq!(
        rendered_files(&output),
        vec![PathBuf::from("a.wav"), PathBuf::from("b.wav"), PathBuf::from("a.wav")]
    );
    assert_eq!(output.instance_count(), 2);

    let restarts: Vec<SoundEffectName> = output
        .events()
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::Restarted { name, .. } => Some(*name),
            _ => None,
        })
        .collect();
    assert_eq!(restarts, vec![Fire]);

    let hits = output.renderings_of(Hit);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].state, RenderingState::Playing);

    let fires = output.renderings_of(Fire);
    assert_eq!(fires[0].state, RenderingState::Interrupted);
}

#[test]
fn test_order_is_emission_order() {
    let dir = tempfile::tempdir().unwrap();
    for file in ["1.wav", "2.wav", "3.wav"] {
        write_wav(&dir.path().join(file));
    }
    let config = RegistryConfig::empty()
        .with_entry(Fire, dir.path().join("1.wav"))
        .with_entry(Explode, dir.path().join("2.wav"))
        .with_entry(Hit, dir.path().join("3.wav"));

    for strategy in [LifecycleStrategy::Ephemeral, LifecycleStrategy::Pooled] {
        let output = run(&config, strategy, &[Hit, Explode, Fire]);
        let names: Vec<SoundEffectName> = output.renderings().iter().map(|r| r.name).collect();
        assert_eq!(names, vec![Hit, Explode, Fire]);
    }
}

#[test]
fn test_missing_asset_does_not_silence_others() {
    let dir = tempfile::tempdir().unwrap();
    let config = fire_hit_config(dir.path()).with_entry(UfoStep2, dir.path().join("5.wav"));

    for strategy in [LifecycleStrategy::Ephemeral, LifecycleStrategy::Pooled] {
        let output = run(&config, strategy, &[UfoStep2, Fire, UfoStep2, Hit]);
        let names: Vec<SoundEffectName> = output.renderings().iter().map(|r| r.name).collect();
        assert_eq!(names, vec![Fire, Hit]);
    }
}

#[test]
fn test_unregistered_name_does_not_stop_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let config = fire_hit_config(dir.path());

    let output = run(&config, LifecycleStrategy::Ephemeral, &[Explode, Fire]);
    let names: Vec<SoundEffectName> = output.renderings().iter().map(|r| r.name).collect();
    assert_eq!(names, vec![Fire]);
}

#[test]
fn test_strict_pooled_initialization_rejects_missing_asset() {
    let dir = tempfile::tempdir().unwrap();
    let config = fire_hit_config(dir.path()).with_entry(UfoStep2, dir.path().join("5.wav"));

    let err = Registry::initialize(&config, LifecycleStrategy::Pooled).unwrap_err();
    assert!(err.is_resource_load());

    // Ephemeral initialization does not touch the files
    assert!(Registry::initialize(&config, LifecycleStrategy::Ephemeral).is_ok());
}
