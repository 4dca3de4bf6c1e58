//! Rendering sink for visual inspection of rasters and covariance matrices.
//!
//! The core only produces arrays; a [`MatrixSink`] decides what to do with
//! them.  [`PgmSink`] writes binary greyscale PGM images, which any image
//! viewer opens without extra tooling.
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ndarray::{Array2, ArrayView2};

use crate::tensor::SpikeTrain;

/// How matrix values map to grey levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMap {
    /// Minimum → black, maximum → white.
    #[default]
    Gray,
    /// Minimum → white, maximum → black.
    GrayReversed,
}

/// Destination for 2-D matrices.
pub trait MatrixSink {
    fn save_matrix(&mut self, matrix: ArrayView2<f64>, cmap: ColorMap, name: &str) -> Result<()>;
}

/// Writes `<dir>/<name>.pgm` (P5, 8-bit).
#[derive(Debug, Clone)]
pub struct PgmSink {
    pub dir: PathBuf,
}

impl PgmSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    /// Path a matrix called `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.pgm"))
    }
}

/// Min–max scale to `0..=255`.  Constant (or empty) matrices map to 0.
/// Non-finite entries are treated as the minimum.
pub fn to_gray_levels(matrix: ArrayView2<f64>, cmap: ColorMap) -> Array2<u8> {
    let finite = || matrix.iter().copied().filter(|v| v.is_finite());
    let lo = finite().fold(f64::INFINITY, f64::min);
    let hi = finite().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    matrix.mapv(|v| {
        let x = if span > 0.0 && v.is_finite() { (v - lo) / span } else { 0.0 };
        let x = match cmap {
            ColorMap::Gray => x,
            ColorMap::GrayReversed => 1.0 - x,
        };
        (x * 255.0).round().clamp(0.0, 255.0) as u8
    })
}

impl MatrixSink for PgmSink {
    fn save_matrix(&mut self, matrix: ArrayView2<f64>, cmap: ColorMap, name: &str) -> Result<()> {
        let path = self.path_for(name);
        let (rows, cols) = matrix.dim();
        let levels = to_gray_levels(matrix, cmap);

        let mut f = std::fs::File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        write!(f, "P5\n{cols} {rows}\n255\n")?;
        let bytes: Vec<u8> = levels.iter().copied().collect();
        f.write_all(&bytes)?;
        log::info!("wrote {rows}×{cols} image → {}", path.display());
        Ok(())
    }
}

impl SpikeTrain {
    /// Render the raster of [`rasterize`](Self::rasterize) to `sink`.
    pub fn save_raster<S: MatrixSink>(
        &self,
        sink: &mut S,
        name: &str,
        trials: Option<&[usize]>,
        start: usize,
        stop: Option<usize>,
    ) -> Result<()> {
        let raster = self.rasterize(trials, start, stop)?;
        sink.save_matrix(raster.view(), ColorMap::Gray, name)
    }

    /// Render the normalised covariance stack as a `[|trials| · N, N]` image.
    pub fn save_covariance<S: MatrixSink>(
        &self,
        sink: &mut S,
        name: &str,
        trials: Option<&[usize]>,
        start: usize,
        stop: Option<usize>,
    ) -> Result<()> {
        let cov = self.covariance(trials, start, stop)?;
        let (t, n, _) = cov.dim();
        let flat = Array2::from_shape_fn((t * n, n), |(row, j)| cov[[row / n, row % n, j]]);
        sink.save_matrix(flat.view(), ColorMap::Gray, name)
    }
}
