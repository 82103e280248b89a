//! Sample resources: raw 16-bit mono PCM files at the engine rate.
//!
//! Failures are reported, never papered over with silence: a missing drum
//! sample is a [`SynthError::ResourceLoad`] at startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::dsp::oscillator::CyclicTable;
use crate::{SynthError, SynthResult};

/// Extension the bank appends to sample names.
pub const SAMPLE_EXTENSION: &str = "raw";

/// Decode little-endian signed 16-bit mono PCM to samples in [-1, 1].
pub fn decode_pcm16(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f64 / 32_768.0)
        .collect()
}

/// Load a raw PCM file.
pub fn load_raw_pcm(path: impl AsRef<Path>) -> SynthResult<Vec<f64>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| SynthError::resource(path, e.to_string()))?;

    if bytes.is_empty() {
        return Err(SynthError::resource(path, "file is empty"));
    }
    if bytes.len() % 2 != 0 {
        return Err(SynthError::resource(
            path,
            format!("odd length {} is not 16-bit PCM", bytes.len()),
        ));
    }

    let samples = decode_pcm16(&bytes);
    debug!(path = %path.display(), samples = samples.len(), "loaded raw pcm");
    Ok(samples)
}

/// Load one period of a waveform and pad it for cubic interpolation.
pub fn load_cyclic(path: impl AsRef<Path>) -> SynthResult<CyclicTable> {
    let path = path.as_ref();
    let samples = load_raw_pcm(path)?;
    CyclicTable::from_period(&samples).map_err(|e| SynthError::resource(path, e.to_string()))
}

/// Named, shared, read-only sample tables.
///
/// Loaded once at startup; voices hold clones of the `Arc`s.
#[derive(Debug, Clone, Default)]
pub struct SampleBank {
    tables: BTreeMap<String, Arc<[f64]>>,
}

impl SampleBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `<dir>/<name>.raw` for every name. Any failure aborts the load.
    pub fn load_dir(dir: impl AsRef<Path>, names: &[&str]) -> SynthResult<Self> {
        let dir = dir.as_ref();
        let mut bank = Self::new();
        for name in names {
            let path = dir.join(name).with_extension(SAMPLE_EXTENSION);
            bank.insert(*name, load_raw_pcm(&path)?.into());
        }
        info!(dir = %dir.display(), samples = bank.len(), "sample bank loaded");
        Ok(bank)
    }

    pub fn insert(&mut self, name: impl Into<String>, table: Arc<[f64]>) {
        self.tables.insert(name.into(), table);
    }

    pub fn get(&self, name: &str) -> Option<Arc<[f64]>> {
        self.tables.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn decodes_to_unit_range() {
        let out = decode_pcm16(&pcm(&[0, i16::MAX, i16::MIN, 16_384]));
        assert_eq!(out[0], 0.0);
        assert!(out[1] < 1.0 && out[1] > 0.999);
        assert_eq!(out[2], -1.0);
        assert_eq!(out[3], 0.5);
    }

    #[test]
    fn raw_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bd.raw");
        fs::write(&path, pcm(&[0, 8_192, -8_192])).unwrap();
        assert_eq!(load_raw_pcm(&path).unwrap(), vec![0.0, 0.25, -0.25]);
    }

    #[test]
    fn bad_files_are_resource_errors() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.raw");
        let odd = dir.path().join("odd.raw");
        fs::write(&empty, [0u8; 0]).unwrap();
        fs::write(&odd, [1u8, 2, 3]).unwrap();

        for path in [empty, odd, dir.path().join("missing.raw")] {
            let err = load_raw_pcm(&path).unwrap_err();
            assert!(matches!(err, SynthError::ResourceLoad { .. }), "{err}");
        }
    }

    #[test]
    fn cyclic_table_keeps_the_period() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saw.raw");
        fs::write(&path, pcm(&[-16_384, 0, 16_384, 0])).unwrap();
        let table = load_cyclic(&path).unwrap();
        assert_eq!(table.period(), 4);
        assert_eq!(table.samples(), &[-0.5, 0.0, 0.5, 0.0]);
    }

    #[test]
    fn bank_loads_every_name_or_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bd.raw"), pcm(&[100, 200])).unwrap();
        fs::write(dir.path().join("sd.raw"), pcm(&[300])).unwrap();

        let bank = SampleBank::load_dir(dir.path(), &["bd", "sd"]).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.get("sd").unwrap().len(), 1);
        assert_eq!(bank.names().collect::<Vec<_>>(), vec!["bd", "sd"]);

        assert!(SampleBank::load_dir(dir.path(), &["bd", "cy"]).is_err());
    }
}
