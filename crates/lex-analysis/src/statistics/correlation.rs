//! Pearson correlation over pairwise-complete observations.

use anofox_statistics::correlation::pearson as pearson_test;

/// Fewest complete pairs a correlation is computed on.
const MIN_PAIRS: usize = 3;

/// Pearson correlation of two equally long columns.
///
/// Only rows where both values are present are used. `None` when fewer than
/// three such rows exist, either side has zero variance, or the estimate is
/// not finite.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (a, b) in a.iter().zip(b) {
        if let (Some(a), Some(b)) = (a, b) {
            x.push(*a);
            y.push(*b);
        }
    }

    if x.len() < MIN_PAIRS || is_constant(&x) || is_constant(&y) {
        return None;
    }

    let result = pearson_test(&x, &y, None).ok()?;
    result
        .estimate
        .is_finite()
        .then(|| result.estimate.clamp(-1.0, 1.0))
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Symmetric correlation matrix with a unit diagonal.
pub fn correlation_matrix(columns: &[Vec<Option<f64>>]) -> Vec<Vec<Option<f64>>> {
    let k = columns.len();
    let mut matrix = vec![vec![None; k]; k];

    for i in 0..k {
        matrix[i][i] = Some(1.0);
        for j in (i + 1)..k {
            let r = pearson(&columns[i], &columns[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_perfect_positive_and_negative() {
        let a = some(&[1.0, 2.0, 3.0, 4.0]);
        let b = some(&[2.0, 4.0, 6.0, 8.0]);
        let c = some(&[8.0, 6.0, 4.0, 2.0]);
        assert!((pearson(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&a, &c).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_value() {
        let a = some(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = some(&[2.0, 1.0, 4.0, 3.0, 6.0]);
        // Sxy = 10, Sxx = 10, Syy = 14.8
        let expected = 10.0 / (10.0_f64 * 14.8).sqrt();
        assert!((pearson(&a, &b).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pairwise_complete_rows_only() {
        // The outlier row is dropped because its partner is missing
        let a = vec![Some(1.0), Some(2.0), Some(3.0), Some(100.0)];
        let b = vec![Some(1.0), Some(2.0), Some(3.0), None];
        assert!((pearson(&a, &b).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_undefined_cases() {
        assert_eq!(pearson(&some(&[1.0, 2.0, 3.0]), &some(&[5.0, 5.0, 5.0])), None);
        assert_eq!(pearson(&some(&[1.0, 2.0]), &some(&[2.0, 4.0])), None);
        assert_eq!(
            pearson(&[Some(1.0), None], &[None, Some(2.0)]),
            None
        );
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let columns = vec![
            some(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            some(&[2.0, 1.0, 4.0, 3.0, 6.0]),
            some(&[7.0, 7.0, 7.0, 7.0, 7.0]),
        ];
        let m = correlation_matrix(&columns);

        for i in 0..3 {
            assert_eq!(m[i][i], Some(1.0));
            for j in 0..3 {
                assert_eq!(m[i][j], m[j][i]);
            }
        }
        assert_eq!(m[0][2], None);
        assert!(m[0][1].unwrap() > 0.0);
    }
}
