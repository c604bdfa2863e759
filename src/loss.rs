//! Squared-error helpers.
//!
//! Training minimizes `0.5 * sum((pred - target)^2)` per sample, whose gradient w.r.t. the
//! prediction is the plain difference `pred - target`. Reported errors are the *mean*
//! squared difference, without the `0.5` factor.

/// Mean squared error.
///
/// Returns `mean((pred - target)^2)`, or 0 for empty slices.
#[inline]
pub fn mse(pred: &[f64], target: &[f64]) -> f64 {
    assert_eq!(
        pred.len(),
        target.len(),
        "pred len {} does not match target len {}",
        pred.len(),
        target.len()
    );

    if pred.is_empty() {
        return 0.0;
    }

    let mut sum_sq = 0.0_f64;
    for (&p, &t) in pred.iter().zip(target) {
        let diff = p - t;
        sum_sq = diff.mul_add(diff, sum_sq);
    }
    sum_sq / pred.len() as f64
}

/// Writes the output error signal `d_pred = pred - target`.
///
/// Shape contract:
/// - `pred.len() == target.len()`
/// - `pred.len() == d_pred.len()`
#[inline]
pub fn error_signal(pred: &[f64], target: &[f64], d_pred: &mut [f64]) {
    assert_eq!(
        pred.len(),
        target.len(),
        "pred len {} does not match target len {}",
        pred.len(),
        target.len()
    );
    assert_eq!(
        pred.len(),
        d_pred.len(),
        "pred len {} does not match d_pred len {}",
        pred.len(),
        d_pred.len()
    );

    for ((d, &p), &t) in d_pred.iter_mut().zip(pred).zip(target) {
        *d = p - t;
    }
}

/// Mean of squares of an already computed error signal.
#[inline]
pub fn mean_square(diff: &[f64]) -> f64 {
    if diff.is_empty() {
        return 0.0;
    }
    let sum_sq = diff.iter().fold(0.0_f64, |acc, &d| d.mul_add(d, acc));
    sum_sq / diff.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mse_basic() {
        assert_eq!(mse(&[1.0, 3.0], &[0.0, 1.0]), 2.5);
        assert_eq!(mse(&[], &[]), 0.0);
    }

    #[test]
    fn error_signal_and_mean_square_agree_with_mse() {
        let pred = [0.5, -0.25, 2.0];
        let target = [1.0, 0.0, 2.0];
        let mut d = [0.0; 3];
        error_signal(&pred, &target, &mut d);
        assert_eq!(d, [-0.5, -0.25, 0.0]);
        assert!((mean_square(&d) - mse(&pred, &target)).abs() < 1e-15);
    }

    #[test]
    #[should_panic]
    fn mse_panics_on_len_mismatch() {
        mse(&[1.0], &[1.0, 2.0]);
    }

    #[test]
    #[should_panic]
    fn error_signal_panics_on_short_output_buffer() {
        let mut d = [0.0; 1];
        error_signal(&[1.0, 2.0], &[0.0, 0.0], &mut d);
    }
}
