//! Accuracy against reference labels
//!
//! Reference labels usually arrive one-hot encoded as a `(B, 10)` tensor;
//! [`labels_from_one_hot`] decodes them with the same argmax used for predictions.

use digitnet_core::{DigitNetError, DigitNetResult, Tensor};
use digitnet_kernels::argmax_rows;
use scirs2_core::numeric::Float;
use std::fmt;

/// Decode one-hot (or score) rows into class indices
pub fn labels_from_one_hot<T: Float>(y: &Tensor<T>) -> DigitNetResult<Vec<usize>> {
    argmax_rows(y)
}

/// Outcome of comparing predictions with reference labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalReport {
    pub correct: usize,
    pub total: usize,
}

impl EvalReport {
    /// Fraction of correct predictions; 0 for an empty batch
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} correct ({:.4})",
            self.correct,
            self.total,
            self.accuracy()
        )
    }
}

/// Count predictions that match the reference labels
///
/// # Errors
///
/// `LabelCountMismatch` if the sequences differ in length.
///
/// # Examples
///
/// ```
/// use digitnet_model::evaluate;
///
/// let report = evaluate(&[7, 2, 1, 0], &[7, 2, 1, 4]).unwrap();
/// assert_eq!(report.correct, 3);
/// assert_eq!(report.accuracy(), 0.75);
/// ```
pub fn evaluate(predicted: &[usize], reference: &[usize]) -> DigitNetResult<EvalReport> {
    if predicted.len() != reference.len() {
        return Err(DigitNetError::LabelCountMismatch {
            predicted: predicted.len(),
            reference: reference.len(),
        });
    }
    let correct = predicted
        .iter()
        .zip(reference)
        .filter(|(p, r)| p == r)
        .count();
    let report = EvalReport {
        correct,
        total: reference.len(),
    };
    tracing::info!(
        correct = report.correct,
        total = report.total,
        accuracy = report.accuracy(),
        "evaluation complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hot_decoding() {
        let mut data = vec![0.0f32; 30];
        data[7] = 1.0; // row 0 -> 7
        data[10 + 2] = 1.0; // row 1 -> 2
        data[20] = 1.0; // row 2 -> 0
        let y = Tensor::from_vec(data, &[3, 10]).unwrap();
        assert_eq!(labels_from_one_hot(&y).unwrap(), vec![7, 2, 0]);
    }

    #[test]
    fn test_length_mismatch() {
        let err = evaluate(&[1, 2], &[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            DigitNetError::LabelCountMismatch {
                predicted: 2,
                reference: 3
            }
        );
    }

    #[test]
    fn test_empty_batch_accuracy() {
        let report = evaluate(&[], &[]).unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(report.accuracy(), 0.0);
    }

    #[test]
    fn test_report_display() {
        let report = evaluate(&[1, 1, 1, 1], &[1, 1, 1, 0]).unwrap();
        assert_eq!(report.to_string(), "3/4 correct (0.7500)");
    }
}
