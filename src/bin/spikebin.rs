//! spikebin: load spike data, bin and binarize it, then write the canonical
//! tensor plus any requested features to a safetensors file.
//!
//! Output keys:
//!   spikes_arr    [T, N, M]             f64  canonical binary tensor (after top-K)
//!   T, N, M       [1]                   i64
//!   selected_idx  [K]                   i64  original neuron indices  (--top-neurons)
//!   mean_activity [K]                   f64                           (--top-neurons)
//!   windowed      [T', w·N, M−w+1]      f64                           (--window-size)
//!   samples       [T'·(M−w+1), w·N]     f64                           (--window-size --reshape)
//!   covariance    [T', N, N]            f64                           (--covariance)
//!   raster        [T'·N, stop−start]    f64                           (--raster)
use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use spikebin::{io::StWriter, load, PgmSink, SpikeSource, SpikesConfig};

#[derive(Parser, Debug)]
#[command(name = "spikebin", about = "Spike-train binning and feature extraction")]
struct Args {
    /// Safetensors file holding an [N, M] or [T, N, M] array.
    #[arg(long, conflicts_with = "spk_folder")]
    input: Option<PathBuf>,

    /// Directory of .spk event-time files, one per neuron.
    #[arg(long)]
    spk_folder: Option<PathBuf>,

    /// Output safetensors path.
    #[arg(long)]
    output: PathBuf,

    /// Bin width in milliseconds for event-time input.
    #[arg(long, default_value_t = 1.0)]
    bin_size: f64,

    /// Keep raw values instead of binarizing.
    #[arg(long)]
    no_preprocess: bool,

    /// Keep only the K most active neurons.
    #[arg(long)]
    top_neurons: Option<usize>,

    /// Window width in bins for feature extraction.
    #[arg(long)]
    window_size: Option<usize>,

    /// Also write windowed features as a [samples, features] matrix.
    #[arg(long)]
    reshape: bool,

    /// Trial subset (comma-separated); default is all trials.
    #[arg(long, value_delimiter = ',')]
    trials: Vec<usize>,

    /// First bin for covariance / raster.
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// One past the last bin for covariance / raster (default: M).
    #[arg(long)]
    stop: Option<usize>,

    /// Compute normalised per-trial covariance.
    #[arg(long)]
    covariance: bool,

    /// Write the raster of the selected trials and bins.
    #[arg(long)]
    raster: bool,

    /// Also render covariance / raster as PGM images into this directory.
    #[arg(long)]
    render_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let source = match (&args.input, &args.spk_folder) {
        (Some(p), None) => SpikeSource::ArrayFile(p.clone()),
        (None, Some(d)) => SpikeSource::SpkFolder(d.clone()),
        _ => bail!("exactly one of --input or --spk-folder is required"),
    };
    let cfg = SpikesConfig {
        bin_size_ms: args.bin_size,
        preprocess: !args.no_preprocess,
    };

    let mut spikes = load(source, &cfg)?;
    let trials = (!args.trials.is_empty()).then_some(args.trials.as_slice());

    let mut w = StWriter::new();
    if let Some(k) = args.top_neurons {
        let sel = spikes.restrict_to_most_active(Some(k))?;
        log::info!("kept {} most active neurons: {:?}", k, sel.selected_indices);
        let idx: Vec<i64> = sel.selected_indices.iter().map(|&i| i as i64).collect();
        w.add_i64("selected_idx", &idx, &[idx.len()]);
        w.add_f64("mean_activity", &sel.mean_activity, &[sel.mean_activity.len()]);
    }

    w.add_spikes(&spikes);

    if let Some(ws) = args.window_size {
        let windowed = spikes.to_windowed(ws, trials)?;
        log::info!("windowed → {:?}", windowed.data().dim());
        if args.reshape {
            w.add_f64_arr("samples", &windowed.to_samples());
        }
        w.add_f64_arr("windowed", windowed.data());
    }

    if args.covariance {
        w.add_f64_arr("covariance", &spikes.covariance(trials, args.start, args.stop)?);
    }

    if args.raster {
        w.add_f64_arr("raster", &spikes.rasterize(trials, args.start, args.stop)?);
    }

    if let Some(dir) = &args.render_dir {
        std::fs::create_dir_all(dir)?;
        let mut sink = PgmSink::new(dir);
        if args.covariance {
            spikes.save_covariance(&mut sink, "covariance", trials, args.start, args.stop)?;
        }
        if args.raster {
            spikes.save_raster(&mut sink, "raster", trials, args.start, args.stop)?;
        }
    }

    w.write(&args.output)?;
    log::info!("written → {}", args.output.display());
    Ok(())
}
