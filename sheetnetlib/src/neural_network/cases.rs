use std::fmt;

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Single labeled example.
pub struct Case<'a> {
    pub input: &'a [f64],
    pub expected: &'a [f64]
}

#[derive(Debug, Clone, PartialEq)]
/// Table of cases: input vectors and, optionally, expected outputs.
///
/// Values are stored case-major in flat arrays, the same order
/// the case files use.
pub struct CaseSet {
    len: usize,
    input_size: usize,
    output_size: usize,
    inputs: Vec<f64>,
    expected: Option<Vec<f64>>
}

impl CaseSet {
    /// Build unlabeled case set from flat input values.
    pub fn new(input_size: usize, inputs: impl Into<Vec<f64>>) -> Result<Self> {
        let inputs = inputs.into();

        if input_size == 0 || inputs.len() % input_size != 0 {
            return Err(Error::InvalidCases(format!(
                "{} input values can't be split into cases of {input_size} inputs",
                inputs.len()
            )));
        }

        Ok(Self {
            len: inputs.len() / input_size,
            input_size,
            output_size: 0,
            inputs,
            expected: None
        })
    }

    /// Attach flat expected output values, one row per case.
    pub fn with_expected(mut self, output_size: usize, expected: impl Into<Vec<f64>>) -> Result<Self> {
        let expected = expected.into();

        if output_size == 0 || expected.len() != self.len * output_size {
            return Err(Error::InvalidCases(format!(
                "{} expected values don't match {} cases of {output_size} outputs",
                expected.len(),
                self.len
            )));
        }

        self.output_size = output_size;
        self.expected = Some(expected);

        Ok(self)
    }

    /// Build labeled case set from rows.
    pub fn from_rows<I, O>(rows: impl IntoIterator<Item = (I, O)>) -> Result<Self>
    where
        I: AsRef<[f64]>,
        O: AsRef<[f64]>
    {
        let mut inputs = Vec::new();
        let mut expected = Vec::new();

        let mut input_size = 0;
        let mut output_size = 0;

        for (input, output) in rows {
            input_size = input.as_ref().len();
            output_size = output.as_ref().len();

            inputs.extend_from_slice(input.as_ref());
            expected.extend_from_slice(output.as_ref());
        }

        Self::new(input_size, inputs)?.with_expected(output_size, expected)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[inline]
    /// Amount of expected outputs per case, 0 if unlabeled.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    #[inline]
    pub fn is_labeled(&self) -> bool {
        self.expected.is_some()
    }

    #[inline]
    pub fn input(&self, case: usize) -> &[f64] {
        &self.inputs[case * self.input_size..(case + 1) * self.input_size]
    }

    #[inline]
    pub fn expected(&self, case: usize) -> Option<&[f64]> {
        self.expected.as_ref()
            .map(|expected| &expected[case * self.output_size..(case + 1) * self.output_size])
    }

    #[inline]
    /// Get labeled case, `None` if there are no expected outputs.
    pub fn case(&self, case: usize) -> Option<Case<'_>> {
        self.expected(case).map(|expected| Case {
            input: self.input(case),
            expected
        })
    }

    #[inline]
    /// Flat input values in the case file order.
    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    #[inline]
    /// Flat expected output values in the case file order.
    pub fn expected_outputs(&self) -> Option<&[f64]> {
        self.expected.as_deref()
    }

    /// Drop expected outputs, keeping only inputs.
    pub fn unlabeled(mut self) -> Self {
        self.expected = None;
        self.output_size = 0;

        self
    }

    #[inline]
    /// Printable truth table, `None` if the set is unlabeled.
    pub fn truth_table(&self) -> Option<TruthTable<'_>> {
        self.is_labeled().then_some(TruthTable(self))
    }
}

#[derive(Debug, Clone, Copy)]
/// Formats labeled cases as `| in ... | out ... | --> Case i` rows.
pub struct TruthTable<'a>(&'a CaseSet);

impl fmt::Display for TruthTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for case in 0..self.0.len() {
            write!(f, "| ")?;

            for input in self.0.input(case) {
                write!(f, "{input} ")?;
            }

            write!(f, "| ")?;

            for output in self.0.expected(case).unwrap_or_default() {
                write!(f, "{output} ")?;
            }

            writeln!(f, "| --> Case {}", case + 1)?;
        }

        Ok(())
    }
}

#[test]
fn test_case_set() -> anyhow::Result<()> {
    let cases = CaseSet::from_rows([
        ([0.0, 0.0], [0.0]),
        ([0.0, 1.0], [1.0]),
        ([1.0, 0.0], [1.0]),
        ([1.0, 1.0], [0.0])
    ])?;

    assert_eq!(cases.len(), 4);
    assert_eq!(cases.input_size(), 2);
    assert_eq!(cases.output_size(), 1);
    assert_eq!(cases.input(2), &[1.0, 0.0]);
    assert_eq!(cases.expected(3), Some([0.0].as_slice()));

    let case = cases.case(1).expect("labeled case");

    assert_eq!(case.input, &[0.0, 1.0]);
    assert_eq!(case.expected, &[1.0]);

    let table = cases.truth_table().expect("labeled set").to_string();

    assert_eq!(table.lines().count(), 4);
    assert_eq!(table.lines().nth(1), Some("| 0 1 | 1 | --> Case 2"));

    let unlabeled = cases.unlabeled();

    assert!(!unlabeled.is_labeled());
    assert!(unlabeled.case(0).is_none());
    assert!(unlabeled.truth_table().is_none());

    Ok(())
}

#[test]
fn test_case_set_dimensions() {
    assert!(CaseSet::new(2, [1.0, 2.0, 3.0]).is_err());
    assert!(CaseSet::new(0, Vec::<f64>::new()).is_err());

    let cases = CaseSet::new(2, [1.0, 2.0, 3.0, 4.0]).expect("two cases");

    assert_eq!(cases.len(), 2);
    assert!(cases.clone().with_expected(1, [1.0]).is_err());
    assert!(cases.with_expected(1, [1.0, 0.0]).is_ok());
}
