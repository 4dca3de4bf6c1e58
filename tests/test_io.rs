mod common;
use common::{lcg_binary, scratch_path};
use ndarray::Array3;
use spikebin::io::{load_array, load_spikes, save_spikes, write_spk_file, StWriter};
use spikebin::{load, SpikeSource, SpikesConfig};

#[test]
fn save_then_load_restores_tensor() {
    let st = lcg_binary(2, 3, 7, 77, 50);
    let p = scratch_path("roundtrip.safetensors");
    save_spikes(&st, &p).unwrap();
    let back = load_spikes(&p).unwrap();
    assert_eq!(back, st);
    std::fs::remove_file(&p).ok();
}

#[test]
fn unknown_version_rejected() {
    let p = scratch_path("v9.safetensors");
    let mut w = StWriter::new();
    w.add_metadata("type", "Spikes");
    w.add_metadata("version", 9);
    w.add_f64_arr("spikes_arr", &Array3::<f64>::zeros((1, 1, 1)));
    w.write(&p).unwrap();
    let err = load_spikes(&p).unwrap_err();
    assert!(err.to_string().contains("version 9"), "{err}");
    std::fs::remove_file(&p).ok();
}

#[test]
fn mismatched_dimensions_rejected() {
    let p = scratch_path("dims.safetensors");
    let mut w = StWriter::new();
    w.add_metadata("type", "Spikes");
    w.add_metadata("version", 1);
    w.add_f64_arr("spikes_arr", &Array3::<f64>::zeros((1, 2, 3)));
    w.add_i64("T", &[1], &[1]);
    w.add_i64("N", &[3], &[1]);
    w.add_i64("M", &[3], &[1]);
    w.write(&p).unwrap();
    assert!(load_spikes(&p).is_err());
    std::fs::remove_file(&p).ok();
}

#[test]
fn array_file_source_is_normalised() {
    let p = scratch_path("raw.safetensors");
    let mut w = StWriter::new();
    w.add_f64("counts", &[0.0, 2.0, 5.0, 0.0, -1.0, 1.0], &[2, 3]);
    w.write(&p).unwrap();
    assert_eq!(load_array(&p).unwrap().shape(), &[2, 3]);
    let st = load(SpikeSource::ArrayFile(p.clone()), &SpikesConfig::default()).unwrap();
    assert_eq!(st.dim(), (1, 2, 3));
    assert_eq!(
        st.data().iter().copied().collect::<Vec<_>>(),
        vec![0.0, 1.0, 1.0, 0.0, 0.0, 1.0]
    );
    std::fs::remove_file(&p).ok();
}

#[test]
fn spk_folder_binned_in_file_name_order() {
    let dir = scratch_path("spk_dir");
    std::fs::create_dir_all(&dir).unwrap();
    write_spk_file(&dir.join("b.spk"), &[1500]).unwrap();
    write_spk_file(&dir.join("a.spk"), &[1000, 2000]).unwrap();
    std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();

    let st = load(SpikeSource::SpkFolder(dir.clone()), &SpikesConfig::default()).unwrap();
    let grid = st.into_single_trial().unwrap();
    assert_eq!(grid.row(0).to_vec(), vec![0.0, 1.0, 1.0]);
    assert_eq!(grid.row(1).to_vec(), vec![0.0, 1.0, 0.0]);

    let files = vec![dir.join("b.spk"), dir.join("a.spk")];
    let st = load(SpikeSource::SpkFiles(files), &SpikesConfig::default()).unwrap();
    assert_eq!(st.data()[[0, 0, 2]], 0.0);
    assert_eq!(st.data()[[0, 1, 2]], 1.0);
    std::fs::remove_dir_all(&dir).ok();
}
