//! Fully connected (dense) layer without bias: `Y = X · W`

use digitnet_core::{DigitNetError, DigitNetResult, Tensor};
use scirs2_core::numeric::Float;

/// Validate a dense layer and return `(batch, in_features, out_features)`
///
/// # Errors
///
/// `ShapeMismatch` if either shape is not rank 2 or the inner extents differ.
pub fn dense_output_shape(
    input: &[usize],
    weight: &[usize],
) -> DigitNetResult<(usize, usize, usize)> {
    let (batch, k) = match *input {
        [b, k] => (b, k),
        _ => {
            return Err(DigitNetError::shape_mismatch(
                "dense_forward",
                "rank 2 input (batch, features)",
                input.to_vec(),
            ))
        }
    };
    let (k_w, n) = match *weight {
        [k_w, n] => (k_w, n),
        _ => {
            return Err(DigitNetError::shape_mismatch(
                "dense_forward",
                "rank 2 weight matrix (in_features, out_features)",
                weight.to_vec(),
            ))
        }
    };
    if k != k_w {
        return Err(DigitNetError::shape_mismatch(
            "dense_forward",
            format!("input width {} to match weight rows", k_w),
            input.to_vec(),
        ));
    }
    Ok((batch, k, n))
}

/// Multiply a `(B, K)` batch by a `(K, N)` weight matrix
///
/// Each output element accumulates over `k` in ascending order.
///
/// # Errors
///
/// `ShapeMismatch` if either operand is not rank 2 or the inner extents differ.
///
/// # Complexity
///
/// Time: O(B · K · N)
///
/// # Examples
///
/// ```
/// use digitnet_core::Tensor;
/// use digitnet_kernels::dense_forward;
///
/// let x = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// let w = Tensor::from_vec(vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0], &[3, 2]).unwrap();
/// let y = dense_forward(&x, &w).unwrap();
/// assert_eq!(y.shape(), &[2, 2]);
/// assert_eq!(y.as_slice(), &[4.0, 5.0, 10.0, 11.0]);
/// ```
pub fn dense_forward<T: Float>(x: &Tensor<T>, w: &Tensor<T>) -> DigitNetResult<Tensor<T>> {
    let (batch, k, n) = dense_output_shape(x.shape(), w.shape())?;

    let xd = x.as_slice();
    let wd = w.as_slice();
    let mut out = vec![T::zero(); batch * n];

    // i-k-j order: the weight row for each k is contiguous
    for i in 0..batch {
        let acc = &mut out[i * n..(i + 1) * n];
        for (kk, &a) in xd[i * k..(i + 1) * k].iter().enumerate() {
            for (o, &wv) in acc.iter_mut().zip(&wd[kk * n..(kk + 1) * n]) {
                *o = *o + a * wv;
            }
        }
    }

    Tensor::from_vec(out, &[batch, n])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_dimension_mismatch() {
        let x = Tensor::<f32>::zeros(&[2, 1000]);
        let w = Tensor::<f32>::zeros(&[1024, 128]);
        let err = dense_forward(&x, &w).unwrap_err();
        assert!(err.is_shape_mismatch());
        assert!(err.to_string().contains("1024"));
    }

    #[test]
    fn test_rank_errors() {
        let w = Tensor::<f32>::zeros(&[4, 2]);
        assert!(dense_forward(&Tensor::zeros(&[1, 2, 2]), &w).is_err());
        let x = Tensor::<f32>::zeros(&[1, 4]);
        assert!(dense_forward(&x, &Tensor::zeros(&[4, 2, 1])).is_err());
    }

    #[test]
    fn test_identity_weights() {
        let x = Tensor::from_fn(&[3, 4], |i| i as f64 * 1.5 - 2.0);
        let eye = Tensor::from_fn(&[4, 4], |i| if i / 4 == i % 4 { 1.0 } else { 0.0 });
        assert_eq!(dense_forward(&x, &eye).unwrap(), x);
    }

    #[test]
    fn test_matches_naive_dot() {
        let x = Tensor::from_fn(&[2, 5], |i| (i % 3) as f64 - 1.0);
        let w = Tensor::from_fn(&[5, 3], |i| (i % 4) as f64 * 0.5);
        let y = dense_forward(&x, &w).unwrap();
        for i in 0..2 {
            for j in 0..3 {
                let mut sum = 0.0;
                for k in 0..5 {
                    sum += x[&[i, k]] * w[&[k, j]];
                }
                assert_eq!(y[&[i, j]], sum);
            }
        }
    }

    #[test]
    fn test_empty_batch() {
        let y = dense_forward(&Tensor::<f32>::zeros(&[0, 8]), &Tensor::zeros(&[8, 3])).unwrap();
        assert_eq!(y.shape(), &[0, 3]);
    }
}
