use std::path::Path;

use crate::prelude::*;

/// Load weights for the topology from the weights file.
///
/// The file must contain exactly `Σ N[n] * N[n + 1]` doubles.
pub fn load_weights(path: impl AsRef<Path>, topology: &Topology) -> Result<Weights> {
    let values = super::read_doubles(path, topology.weights_count())?;

    Weights::from_values(topology, values)
}

/// Save all the weights, layer-major then row-major.
pub fn save_weights(path: impl AsRef<Path>, weights: &Weights) -> Result<()> {
    super::write_doubles(path, weights.as_slice())
}

#[test]
fn test_weights_round_trip() -> anyhow::Result<()> {
    let path = super::temp_path("round-trip-weights.bin");
    let topology = Topology::new([2, 5, 3, 2])?;

    let weights = Weights::random(&topology, -1.5, 1.5, &mut fastrand::Rng::with_seed(21));

    save_weights(&path, &weights)?;

    let loaded = load_weights(&path, &topology)?;

    assert!(weights.as_slice().iter()
        .zip(loaded.as_slice())
        .all(|(saved, loaded)| saved.to_bits() == loaded.to_bits()));

    // Same bytes, different topology.
    assert!(load_weights(&path, &Topology::new([2, 5, 3, 3])?).is_err());
    assert!(load_weights(&path, &Topology::new([2, 5, 3, 1])?).is_err());

    std::fs::remove_file(path)?;

    Ok(())
}

#[test]
fn test_weights_one_byte_short() -> anyhow::Result<()> {
    let path = super::temp_path("short-weights.bin");
    let topology = Topology::new([2, 2, 1])?;

    let weights = Weights::random(&topology, -1.0, 1.0, &mut fastrand::Rng::with_seed(5));

    save_weights(&path, &weights)?;

    let mut bytes = std::fs::read(&path)?;

    bytes.pop();

    std::fs::write(&path, bytes)?;

    let err = load_weights(&path, &topology).expect_err("file is one byte short");

    assert!(matches!(err, Error::DimensionMismatch { expected: 48, actual: 47, .. }));

    std::fs::remove_file(path)?;

    Ok(())
}
