/// Half squared error, `0.5 · Σ (predicted - expected)²`.
///
/// The 0.5 cancels the exponent's 2, so the gradient is the plain residual.
/// The same value is used as the training signal and as the reported loss.
pub struct HalfMseLoss;

impl HalfMseLoss {
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        0.5 * predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
    }

    /// Per-output gradient: predicted - expected
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| a - b)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_is_half_the_squared_residual() {
        assert_eq!(HalfMseLoss::loss(&[0.5], &[1.0]), 0.125);
        assert_eq!(HalfMseLoss::loss(&[1.0, 3.0], &[0.0, 1.0]), 2.5);
        assert_eq!(HalfMseLoss::derivative(&[1.0, 3.0], &[0.0, 1.0]), vec![1.0, 2.0]);
    }
}
