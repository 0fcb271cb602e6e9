use std::path::Path;

use crate::prelude::*;

/// Load `cases * dimension` doubles from a case file,
/// case-major then feature-major.
pub fn load_case_values(path: impl AsRef<Path>, cases: usize, dimension: usize) -> Result<Vec<f64>> {
    let Some(count) = cases.checked_mul(dimension) else {
        return Err(Error::InvalidCases(format!("{cases} cases of {dimension} values are too many to load")));
    };

    super::read_doubles(path, count)
}

/// Load inputs file and, when given, expected outputs file
/// into a case set.
pub fn load_cases(
    inputs: impl AsRef<Path>,
    outputs: Option<&Path>,
    cases: usize,
    topology: &Topology
) -> Result<CaseSet> {
    let values = load_case_values(inputs, cases, topology.input_size())?;
    let set = CaseSet::new(topology.input_size(), values)?;

    match outputs {
        Some(outputs) => {
            let values = load_case_values(outputs, cases, topology.output_size())?;

            set.with_expected(topology.output_size(), values)
        }

        None => Ok(set)
    }
}

/// Write inputs and, if present, expected outputs of the set
/// into two case files.
pub fn save_cases(inputs: impl AsRef<Path>, outputs: impl AsRef<Path>, cases: &CaseSet) -> Result<()> {
    super::write_doubles(inputs, cases.inputs())?;

    if let Some(expected) = cases.expected_outputs() {
        super::write_doubles(outputs, expected)?;
    }

    Ok(())
}

#[test]
fn test_case_files_boundaries() -> anyhow::Result<()> {
    let inputs = super::temp_path("boundary-inputs.bin");
    let outputs = super::temp_path("boundary-outputs.bin");

    let topology = Topology::new([2, 3, 1])?;

    let cases = CaseSet::from_rows([
        ([0.0, 0.0], [0.0]),
        ([0.0, 1.0], [1.0]),
        ([1.0, 0.0], [1.0]),
        ([1.0, 1.0], [0.0])
    ])?;

    save_cases(&inputs, &outputs, &cases)?;

    // Exactly the expected length.
    assert_eq!(load_cases(&inputs, Some(outputs.as_path()), 4, &topology)?, cases);
    assert_eq!(load_cases(&inputs, None, 4, &topology)?, cases.clone().unlabeled());

    // One value too long.
    let mut values = cases.inputs().to_vec();

    values.push(0.5);

    super::write_doubles(&inputs, &values)?;

    assert!(load_cases(&inputs, Some(outputs.as_path()), 4, &topology).is_err_and(|err| err.is_dimension_mismatch()));

    // Claiming more cases than stored.
    assert!(load_case_values(&outputs, 5, 1).is_err_and(|err| err.is_dimension_mismatch()));

    // Cases count too large to address.
    assert!(matches!(load_case_values(&outputs, usize::MAX, 2), Err(Error::InvalidCases(_))));

    std::fs::remove_file(inputs)?;
    std::fs::remove_file(outputs)?;

    Ok(())
}
