//! Raw binary files of big-endian IEEE-754 doubles, without any
//! header or length prefix. A file is only accepted when its length
//! matches the expected amount of values exactly.

use std::path::Path;

use crate::prelude::*;

pub mod weights;
pub mod cases;
pub mod truth_table;

/// Size of a single stored value in bytes.
pub const DOUBLE_BYTES: usize = 8;

/// Read exactly `count` doubles from the file.
///
/// Return `Error::DimensionMismatch` when the file is shorter
/// (truncated) or longer (overflowing) than `count` values.
pub fn read_doubles(path: impl AsRef<Path>, count: usize) -> Result<Vec<f64>> {
    let path = path.as_ref();

    let bytes = std::fs::read(path)
        .map_err(|err| Error::io(path, err))?;

    let expected = count.checked_mul(DOUBLE_BYTES);

    if expected != Some(bytes.len()) {
        return Err(Error::DimensionMismatch {
            path: path.to_path_buf(),
            expected: (count as u64).saturating_mul(DOUBLE_BYTES as u64),
            actual: bytes.len() as u64
        });
    }

    let values = bytes.chunks_exact(DOUBLE_BYTES)
        .map(|chunk| {
            let mut value = [0; DOUBLE_BYTES];

            value.copy_from_slice(chunk);

            f64::from_be_bytes(value)
        })
        .collect();

    Ok(values)
}

/// Write doubles to the file, replacing its content.
pub fn write_doubles(path: impl AsRef<Path>, values: &[f64]) -> Result<()> {
    let path = path.as_ref();

    let mut bytes = Vec::with_capacity(values.len() * DOUBLE_BYTES);

    for value in values {
        bytes.extend_from_slice(&value.to_be_bytes());
    }

    std::fs::write(path, bytes)
        .map_err(|err| Error::io(path, err))
}

#[cfg(test)]
/// Unique file path in the system temp folder.
pub(crate) fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("sheetnet-{}-{name}", std::process::id()))
}

#[test]
fn test_doubles_file_length() -> anyhow::Result<()> {
    let path = temp_path("doubles.bin");

    write_doubles(&path, &[1.0, -2.5, f64::MAX])?;

    assert_eq!(std::fs::read(&path)?.len(), 3 * DOUBLE_BYTES);
    assert_eq!(std::fs::read(&path)?[..8], 1.0f64.to_be_bytes());

    assert_eq!(read_doubles(&path, 3)?, [1.0, -2.5, f64::MAX]);

    // Too long for 2 values, too short for 4.
    assert!(read_doubles(&path, 2).is_err_and(|err| err.is_dimension_mismatch()));
    assert!(read_doubles(&path, 4).is_err_and(|err| err.is_dimension_mismatch()));

    // Byte length of the count doesn't fit into usize.
    assert!(matches!(
        read_doubles(&path, usize::MAX / 4),
        Err(Error::DimensionMismatch { expected: u64::MAX, actual: 24, .. })
    ));

    std::fs::remove_file(&path)?;

    assert!(matches!(read_doubles(&path, 3), Err(Error::Io { .. })));

    Ok(())
}
