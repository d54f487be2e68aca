//! Row-wise argmax classification

use digitnet_core::{DigitNetError, DigitNetResult, Tensor};
use scirs2_core::numeric::Float;

/// Index of the largest element in each row of a `(B, N)` tensor
///
/// Ties resolve to the lowest index: the scan only moves on a strictly
/// greater value. NaN entries never win unless they sit in column 0.
///
/// # Errors
///
/// `ShapeMismatch` if the input is not rank 2 or has zero columns.
///
/// # Examples
///
/// ```
/// use digitnet_core::Tensor;
/// use digitnet_kernels::argmax_rows;
///
/// let logits = Tensor::from_vec(
///     vec![0.5, 0.9, 0.9, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1],
///     &[1, 10],
/// ).unwrap();
/// assert_eq!(argmax_rows(&logits).unwrap(), vec![1]);
/// ```
pub fn argmax_rows<T: Float>(x: &Tensor<T>) -> DigitNetResult<Vec<usize>> {
    let (rows, cols) = match *x.shape() {
        [r, c] if c > 0 => (r, c),
        _ => {
            return Err(DigitNetError::shape_mismatch(
                "argmax_rows",
                "rank 2 with at least one column",
                x.shape().to_vec(),
            ))
        }
    };

    let labels = x
        .as_slice()
        .chunks(cols)
        .take(rows)
        .map(|row| {
            let mut best = 0;
            for (j, &v) in row.iter().enumerate().skip(1) {
                if v > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect();

    Ok(labels)
}
