#[inline]
/// `0.5 * (expected - actual)^2`
pub fn quadratic_error(actual: f64, expected: f64) -> f64 {
    let diff = expected - actual;

    0.5 * diff * diff
}

/// Sum of quadratic errors over all the outputs of a single case.
pub fn case_error(actual: &[f64], expected: &[f64]) -> f64 {
    actual.iter()
        .zip(expected)
        .map(|(actual, expected)| quadratic_error(*actual, *expected))
        .sum()
}

#[test]
fn test_case_error() {
    assert_eq!(quadratic_error(0.0, 0.0), 0.0);
    assert_eq!(quadratic_error(1.0, 3.0), 2.0);
    assert_eq!(quadratic_error(3.0, 1.0), 2.0);

    assert_eq!(case_error(&[0.5, 1.0], &[1.0, 0.0]), 0.125 + 0.5);
}
