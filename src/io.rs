//! File collaborators: array and event-time readers, versioned persistence.
//!
//! * [`load_array`]: first tensor of a `.safetensors` file as `f64`.
//! * [`read_spk_file`] / [`read_spk_folder`]: `.spk` event-time files: a
//!   flat run of little-endian `i64` microsecond timestamps, one file per
//!   source.
//! * [`save_spikes`] / [`load_spikes`]: a [`SpikeTrain`] as safetensors with
//!   `spikes_arr`, `T`, `N`, `M` and a `{"type": "Spikes", "version": "1"}`
//!   metadata block.
use anyhow::{bail, Context, Result};
use ndarray::{Array, ArrayD, Dimension, IxDyn};
use std::path::{Path, PathBuf};

use crate::tensor::SpikeTrain;

/// `type` tag written into the metadata block.
pub const SAVE_TYPE: &str = "Spikes";
/// Current persistence format version.
pub const SAVE_VERSION: u32 = 1;

/// Extension of per-source event-time files.
pub const SPK_EXTENSION: &str = "spk";

// ── Low-level safetensors parser ─────────────────────────────────────────────

type Header = serde_json::Map<String, serde_json::Value>;

fn parse_header(bytes: &[u8]) -> Result<(Header, usize)> {
    if bytes.len() < 8 {
        bail!("safetensors file too small");
    }
    let mut len = [0u8; 8];
    len.copy_from_slice(&bytes[..8]);
    let n = u64::from_le_bytes(len);
    let end = usize::try_from(n)
        .ok()
        .and_then(|n| n.checked_add(8))
        .filter(|&end| end <= bytes.len())
        .with_context(|| format!("safetensors header length {n} exceeds file size {}", bytes.len()))?;
    let header: Header = serde_json::from_slice(&bytes[8..end])
        .context("failed to parse safetensors header")?;
    Ok((header, end))
}

fn shape_of(entry: &serde_json::Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .context("tensor entry has no 'shape'")?
        .iter()
        .map(|v| v.as_u64().map(|d| d as usize).context("non-integer shape entry"))
        .collect()
}

/// Decode one tensor to `f64`.  Handles F32, F64, I32, I64 and U8.
fn read_tensor_f64(bytes: &[u8], data_start: usize, entry: &serde_json::Value) -> Result<Vec<f64>> {
    let offsets = entry["data_offsets"]
        .as_array()
        .context("tensor entry has no 'data_offsets'")?;
    let (s, e) = match offsets.as_slice() {
        [s, e] => (
            s.as_u64().context("bad data offset")? as usize,
            e.as_u64().context("bad data offset")? as usize,
        ),
        _ => bail!("'data_offsets' must have two entries"),
    };
    let raw = data_start
        .checked_add(s)
        .zip(data_start.checked_add(e))
        .and_then(|(lo, hi)| bytes.get(lo..hi))
        .context("tensor data out of bounds")?;
    let dtype = entry["dtype"].as_str().context("tensor entry has no 'dtype'")?;

    fn le<const W: usize>(b: &[u8]) -> [u8; W] {
        let mut out = [0u8; W];
        out.copy_from_slice(b);
        out
    }

    Ok(match dtype {
        "F32" => raw.chunks_exact(4).map(|b| f32::from_le_bytes(le(b)) as f64).collect(),
        "F64" => raw.chunks_exact(8).map(|b| f64::from_le_bytes(le(b))).collect(),
        "I32" => raw.chunks_exact(4).map(|b| i32::from_le_bytes(le(b)) as f64).collect(),
        "I64" => raw.chunks_exact(8).map(|b| i64::from_le_bytes(le(b)) as f64).collect(),
        "U8" => raw.iter().map(|&b| b as f64).collect(),
        other => bail!("unsupported dtype {other}"),
    })
}

fn read_entry(bytes: &[u8], data_start: usize, header: &Header, key: &str) -> Result<ArrayD<f64>> {
    let entry = header.get(key).with_context(|| format!("missing '{key}' key"))?;
    let shape = shape_of(entry)?;
    let vals = read_tensor_f64(bytes, data_start, entry)?;
    Array::from_shape_vec(IxDyn(&shape), vals)
        .with_context(|| format!("tensor '{key}' does not match its shape {shape:?}"))
}

// ── Array source ──────────────────────────────────────────────────────────────

/// Load the first tensor (by key order) of a safetensors file.
pub fn load_array(path: &Path) -> Result<ArrayD<f64>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let (header, data_start) = parse_header(&bytes)?;
    let key = header
        .keys()
        .find(|k| k.as_str() != "__metadata__")
        .with_context(|| format!("{} contains no tensors", path.display()))?
        .clone();
    let arr = read_entry(&bytes, data_start, &header, &key)?;
    log::info!("loaded '{key}' {:?} from {}", arr.shape(), path.display());
    Ok(arr)
}

// ── Event-time sources ────────────────────────────────────────────────────────

/// Read one `.spk` file: little-endian `i64` microsecond timestamps.
pub fn read_spk_file(path: &Path) -> Result<Vec<i64>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if bytes.len() % 8 != 0 {
        bail!("{}: length {} is not a multiple of 8 bytes", path.display(), bytes.len());
    }
    Ok(bytes
        .chunks_exact(8)
        .map(|b| {
            let mut w = [0u8; 8];
            w.copy_from_slice(b);
            i64::from_le_bytes(w)
        })
        .collect())
}

/// Read every `.spk` file in `dir`, sorted by file name.
///
/// Returns the file paths alongside the timestamps so callers can map source
/// index back to file.
pub fn read_spk_folder(dir: &Path) -> Result<(Vec<PathBuf>, Vec<Vec<i64>>)> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|x| x == SPK_EXTENSION))
        .collect();
    files.sort();
    let times = files.iter().map(|p| read_spk_file(p)).collect::<Result<Vec<_>>>()?;
    log::info!("read {} spike files from {}", files.len(), dir.display());
    Ok((files, times))
}

/// Write timestamps in `.spk` layout.
pub fn write_spk_file(path: &Path, times: &[i64]) -> Result<()> {
    let bytes: Vec<u8> = times.iter().flat_map(|t| t.to_le_bytes()).collect();
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

// ── Generic safetensors builder ───────────────────────────────────────────────

/// Simple safetensors file writer for F64 and I64 tensors plus a metadata block.
///
/// Usage:
/// ```rust,no_run
/// use spikebin::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f64("signal", &[1.0, 2.0, 3.0], &[1, 3]);
/// w.add_metadata("source", "demo");
/// w.write(Path::new("/tmp/out.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
    metadata: serde_json::Map<String, serde_json::Value>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata values are stored as strings, as the format requires.
    pub fn add_metadata(&mut self, key: &str, value: impl ToString) {
        self.metadata.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }

    pub fn add_f64(&mut self, name: &str, data: &[f64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F64", shape.to_vec()));
    }

    /// Add an array of any dimensionality, in logical row-major order.
    pub fn add_f64_arr<D: Dimension>(&mut self, name: &str, arr: &Array<f64, D>) {
        let data: Vec<f64> = arr.iter().copied().collect();
        self.add_f64(name, &data, arr.shape());
    }

    pub fn add_i64(&mut self, name: &str, data: &[i64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "I64", shape.to_vec()));
    }

    /// Add the type/version tags and the `{spikes_arr, T, N, M}` attributes.
    ///
    /// Other tensors may be added alongside; [`load_spikes`] ignores them.
    pub fn add_spikes(&mut self, spikes: &SpikeTrain) {
        let [arr_key, t_key, n_key, m_key] = SpikeTrain::SAVE_ATTRIBUTES;
        self.add_metadata("type", SAVE_TYPE);
        self.add_metadata("version", SAVE_VERSION);
        self.add_f64_arr(arr_key, spikes.data());
        self.add_i64(t_key, &[spikes.t() as i64], &[1]);
        self.add_i64(n_key, &[spikes.n() as i64], &[1]);
        self.add_i64(m_key, &[spikes.m() as i64], &[1]);
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        use std::io::Write;
        let mut header_map = serde_json::Map::new();
        if !self.metadata.is_empty() {
            header_map.insert(
                "__metadata__".into(),
                serde_json::Value::Object(self.metadata.clone()),
            );
        }
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes.into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();
        let mut f = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        f.write_all(&(padded.len() as u64).to_le_bytes())?;
        f.write_all(&padded)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data)?;
        }
        Ok(())
    }
}

// ── Versioned persistence ─────────────────────────────────────────────────────

/// Save `spikes` with its `{spikes_arr, T, N, M}` attributes.
pub fn save_spikes(spikes: &SpikeTrain, path: &Path) -> Result<()> {
    let mut w = StWriter::new();
    w.add_spikes(spikes);
    w.write(path)?;
    log::info!("saved {spikes} → {}", path.display());
    Ok(())
}

/// Load a tensor written by [`save_spikes`].
///
/// Rejects files with a different type tag or an unknown version, and files
/// whose `T`, `N`, `M` disagree with the stored array.
pub fn load_spikes(path: &Path) -> Result<SpikeTrain> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let (header, data_start) = parse_header(&bytes)?;

    let meta = header.get("__metadata__").context("missing '__metadata__' block")?;
    let ty = meta["type"].as_str().unwrap_or_default();
    if ty != SAVE_TYPE {
        bail!("{}: expected type '{SAVE_TYPE}', found '{ty}'", path.display());
    }
    let version: u32 = meta["version"]
        .as_str()
        .context("missing format version")?
        .parse()
        .context("format version is not an integer")?;
    let spikes = match version {
        1 => load_v1(&bytes, data_start, &header),
        v => bail!("{}: unsupported Spikes format version {v}", path.display()),
    };
    spikes.with_context(|| format!("loading {}", path.display()))
}

fn load_v1(bytes: &[u8], data_start: usize, header: &Header) -> Result<SpikeTrain> {
    log::debug!("loading Spikes, format version 1");
    let [arr_key, t_key, n_key, m_key] = SpikeTrain::SAVE_ATTRIBUTES;
    let arr = read_entry(bytes, data_start, header, arr_key)?;
    let scalar = |key: &str| -> Result<usize> {
        let v = read_entry(bytes, data_start, header, key)?;
        v.iter().next().map(|&x| x as usize).with_context(|| format!("'{key}' is empty"))
    };
    let dims = (scalar(t_key)?, scalar(n_key)?, scalar(m_key)?);
    let spikes = SpikeTrain::from_array(arr)?;
    if spikes.dim() != dims {
        bail!("stored dimensions {dims:?} disagree with array shape {:?}", spikes.dim());
    }
    Ok(spikes)
}
