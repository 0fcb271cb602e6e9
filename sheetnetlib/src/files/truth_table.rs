use std::path::Path;

use crate::prelude::*;

/// Parse a text truth table.
///
/// First line is `cases inputs outputs`, followed by `cases` rows
/// of input values and then `cases` rows of expected outputs.
/// Values are whitespace separated, blank lines are skipped.
///
/// ```
/// use sheetnetlib::prelude::*;
///
/// let table = parse_truth_table("
///     2 2 1
///     0 1
///     1 1
///     1
///     0
/// ").unwrap();
///
/// assert_eq!(table.input(1), &[1.0, 1.0]);
/// assert_eq!(table.expected(1), Some([0.0].as_slice()));
/// ```
pub fn parse_truth_table(text: &str) -> Result<CaseSet> {
    let mut lines = text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let Some((number, header)) = lines.next() else {
        return Err(Error::InvalidCases(String::from("truth table is empty")));
    };

    let header = header.split_whitespace()
        .map(|value| value.parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| Error::InvalidCases(format!("line {number}: invalid header: {err}")))?;

    let [cases, input_size, output_size] = header[..] else {
        return Err(Error::InvalidCases(format!(
            "line {number}: header must be `cases inputs outputs`, got {} values",
            header.len()
        )));
    };

    let mut read_rows = |columns: usize| -> Result<Vec<f64>> {
        let mut values = Vec::with_capacity(cases * columns);

        for _ in 0..cases {
            let Some((number, line)) = lines.next() else {
                return Err(Error::InvalidCases(format!("expected {cases} input and {cases} output rows, table ended early")));
            };

            let row = line.split_whitespace()
                .map(|value| value.parse::<f64>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|err| Error::InvalidCases(format!("line {number}: {err}")))?;

            if row.len() != columns {
                return Err(Error::InvalidCases(format!(
                    "line {number}: expected {columns} values, got {}",
                    row.len()
                )));
            }

            values.extend(row);
        }

        Ok(values)
    };

    let inputs = read_rows(input_size)?;
    let outputs = read_rows(output_size)?;

    if let Some((number, _)) = lines.next() {
        return Err(Error::InvalidCases(format!("line {number}: unexpected rows after the truth table")));
    }

    CaseSet::new(input_size, inputs)?
        .with_expected(output_size, outputs)
}

/// Read a text truth table and write it into inputs and
/// expected outputs case files.
pub fn convert_truth_table(
    table: impl AsRef<Path>,
    inputs: impl AsRef<Path>,
    outputs: impl AsRef<Path>
) -> Result<CaseSet> {
    let table = table.as_ref();

    let text = std::fs::read_to_string(table)
        .map_err(|err| Error::io(table, err))?;

    let cases = parse_truth_table(&text)?;

    super::cases::save_cases(inputs, outputs, &cases)?;

    Ok(cases)
}

#[test]
fn test_parse_truth_table() -> anyhow::Result<()> {
    let cases = parse_truth_table("4 2 2\n0 0\n0 1\n1 0\n1 1\n\n0 0\n1 1\n1 1\n0 1\n")?;

    assert_eq!(cases.len(), 4);
    assert_eq!(cases.input(3), &[1.0, 1.0]);
    assert_eq!(cases.expected(3), Some([0.0, 1.0].as_slice()));

    Ok(())
}

#[test]
fn test_invalid_truth_tables() {
    let invalid = [
        "",
        "2 2",
        "2 two 1\n0 0\n1 1\n0\n1",
        "2 2 1\n0 0\n1\n0\n1",
        "2 2 1\n0 0\n1 x\n0\n1",
        "2 2 1\n0 0\n1 1\n0",
        "2 2 1\n0 0\n1 1\n0\n1\n1"
    ];

    for table in invalid {
        assert!(parse_truth_table(table).is_err(), "{table:?} must be rejected");
    }
}

#[test]
fn test_convert_truth_table() -> anyhow::Result<()> {
    let table = super::temp_path("convert-table.txt");
    let inputs = super::temp_path("convert-inputs.bin");
    let outputs = super::temp_path("convert-outputs.bin");

    std::fs::write(&table, "2 1 1\n0.25\n0.75\n1\n0\n")?;

    let cases = convert_truth_table(&table, &inputs, &outputs)?;

    assert_eq!(super::read_doubles(&inputs, 2)?, [0.25, 0.75]);
    assert_eq!(super::read_doubles(&outputs, 2)?, [1.0, 0.0]);
    assert_eq!(cases.len(), 2);

    for path in [table, inputs, outputs] {
        std::fs::remove_file(path)?;
    }

    Ok(())
}
