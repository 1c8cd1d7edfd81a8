//! Fixtures shared by unit tests

use std::io::Cursor;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A short mono 16-bit WAV
pub(crate) fn wav_bytes(samples: usize) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..samples {
            writer.write_sample(((i % 64) as i16 - 32) * 512).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

pub(crate) fn garbage_bytes() -> Vec<u8> {
    b"definitely not a riff header".to_vec()
}

/// Temporary asset directory
pub(crate) struct AssetDir {
    dir: TempDir,
}

impl AssetDir {
    pub(crate) fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a valid WAV and return its path
    pub(crate) fn wav(&self, file_name: &str) -> PathBuf {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, wav_bytes(800)).unwrap();
        path
    }

    /// Write undecodable bytes and return the path
    pub(crate) fn garbage(&self, file_name: &str) -> PathBuf {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, garbage_bytes()).unwrap();
        path
    }
}
