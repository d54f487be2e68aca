//! Non-overlapping 2D average pooling over NHWC tensors
//!
//! With window `k` (stride `k`, no padding):
//!
//! ```text
//! Y[b,h,w,m] = (1/k²) Σ_p Σ_q X[b, k·h+p, k·w+q, m]
//! ```
//!
//! The window sum is accumulated first and divided by `k²` once, so a window
//! whose sum is exactly representable averages exactly (a constant window of
//! `v` yields `v`).

use digitnet_core::{DigitNetError, DigitNetResult, ShapeNhwc, Tensor};
use scirs2_core::numeric::Float;

/// Handling of spatial extents that are not a multiple of the pool size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolRemainder {
    /// Fail with `ShapeMismatch`
    #[default]
    Reject,
    /// Drop the trailing rows/columns that do not fill a window
    Truncate,
}

/// Compute the pooled shape of an NHWC input
///
/// # Errors
///
/// - `InvalidArgument` if `pool_size` is zero
/// - `ShapeMismatch` if the input is not rank 4, if `Reject` is in effect and
///   a spatial extent is not divisible by `pool_size`, or if the output would
///   have no rows or columns
pub fn pool_output_shape(
    input: &[usize],
    pool_size: usize,
    remainder: PoolRemainder,
) -> DigitNetResult<ShapeNhwc> {
    if pool_size == 0 {
        return Err(DigitNetError::invalid_argument(
            "avg_pool2d",
            "pool size must be positive",
        ));
    }
    let xs = ShapeNhwc::from_shape("avg_pool2d", input)?;

    if remainder == PoolRemainder::Reject
        && (xs.height % pool_size != 0 || xs.width % pool_size != 0)
    {
        return Err(DigitNetError::shape_mismatch(
            "avg_pool2d",
            format!("height and width divisible by pool size {}", pool_size),
            input.to_vec(),
        ));
    }

    let ys = ShapeNhwc::new(
        xs.batch,
        xs.height / pool_size,
        xs.width / pool_size,
        xs.channels,
    );
    if ys.height == 0 || ys.width == 0 {
        return Err(DigitNetError::shape_mismatch(
            "avg_pool2d",
            format!("height and width of at least pool size {}", pool_size),
            input.to_vec(),
        ));
    }
    Ok(ys)
}

/// Average-pool an NHWC tensor with a `pool_size` x `pool_size` window
///
/// # Examples
///
/// ```
/// use digitnet_core::Tensor;
/// use digitnet_kernels::{avg_pool2d, PoolRemainder};
///
/// let x = Tensor::from_vec(
///     vec![1.0, 2.0, 5.0, 6.0,
///          3.0, 4.0, 7.0, 8.0],
///     &[1, 2, 4, 1],
/// ).unwrap();
/// let y = avg_pool2d(&x, 2, PoolRemainder::Reject).unwrap();
/// assert_eq!(y.shape(), &[1, 1, 2, 1]);
/// assert_eq!(y.as_slice(), &[2.5, 6.5]);
/// ```
pub fn avg_pool2d<T: Float>(
    x: &Tensor<T>,
    pool_size: usize,
    remainder: PoolRemainder,
) -> DigitNetResult<Tensor<T>> {
    let ys = pool_output_shape(x.shape(), pool_size, remainder)?;
    let xs = ShapeNhwc::from_shape("avg_pool2d", x.shape())?;
    let window = T::from(pool_size * pool_size).ok_or_else(|| {
        DigitNetError::invalid_argument(
            "avg_pool2d",
            format!("pool area {} is not representable", pool_size * pool_size),
        )
    })?;

    let src = x.as_slice();
    let channels = xs.channels;
    let mut out = vec![T::zero(); ys.len()];

    for b in 0..ys.batch {
        for h in 0..ys.height {
            for w in 0..ys.width {
                let start = ys.offset(b, h, w, 0);
                let acc = &mut out[start..start + channels];
                for p in 0..pool_size {
                    for q in 0..pool_size {
                        let at = xs.offset(b, pool_size * h + p, pool_size * w + q, 0);
                        for (a, &v) in acc.iter_mut().zip(&src[at..at + channels]) {
                            *a = *a + v;
                        }
                    }
                }
                acc.iter_mut().for_each(|a| *a = *a / window);
            }
        }
    }

    Tensor::from_vec(out, &ys.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_layer_shapes() {
        assert_eq!(
            pool_output_shape(&[10, 24, 24, 32], 2, PoolRemainder::Reject)
                .unwrap()
                .to_vec(),
            vec![10, 12, 12, 32]
        );
        assert_eq!(
            pool_output_shape(&[10, 8, 8, 64], 2, PoolRemainder::Reject)
                .unwrap()
                .to_vec(),
            vec![10, 4, 4, 64]
        );
    }

    #[test]
    fn test_channels_pooled_independently() {
        // 2x2 spatial, 2 channels: channel 0 = 1..4, channel 1 = 10..40
        let x = Tensor::from_vec(
            vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0],
            &[1, 2, 2, 2],
        )
        .unwrap();
        let y = avg_pool2d(&x, 2, PoolRemainder::Reject).unwrap();
        assert_eq!(y.shape(), &[1, 1, 1, 2]);
        assert_eq!(y.as_slice(), &[2.5, 25.0]);
    }

    #[test]
    fn test_non_divisible_rejected_by_default() {
        let x = Tensor::<f32>::ones(&[1, 5, 4, 1]);
        let err = avg_pool2d(&x, 2, PoolRemainder::default()).unwrap_err();
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn test_non_divisible_truncated_on_request() {
        // 3x3 input, the last row and column are dropped
        let x = Tensor::from_vec(
            vec![1.0, 3.0, 100.0, 5.0, 7.0, 100.0, 100.0, 100.0, 100.0],
            &[1, 3, 3, 1],
        )
        .unwrap();
        let y = avg_pool2d(&x, 2, PoolRemainder::Truncate).unwrap();
        assert_eq!(y.shape(), &[1, 1, 1, 1]);
        assert_eq!(y.as_slice(), &[4.0]);
    }

    #[test]
    fn test_zero_pool_size() {
        let x = Tensor::<f32>::ones(&[1, 4, 4, 1]);
        assert!(matches!(
            avg_pool2d(&x, 0, PoolRemainder::Reject),
            Err(DigitNetError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_window_larger_than_input() {
        let x = Tensor::<f32>::ones(&[1, 1, 1, 1]);
        assert!(avg_pool2d(&x, 2, PoolRemainder::Truncate).is_err());
    }

    #[test]
    fn test_pool_size_one_is_identity() {
        let x = Tensor::from_fn(&[2, 3, 3, 2], |i| i as f64 - 7.5);
        let y = avg_pool2d(&x, 1, PoolRemainder::Reject).unwrap();
        assert_eq!(x, y);
    }

    #[test]
    fn test_constant_window_three() {
        let x = Tensor::from_elem(&[1, 6, 6, 3], 0.75f64);
        let y = avg_pool2d(&x, 3, PoolRemainder::Reject).unwrap();
        assert_eq!(y.shape(), &[1, 2, 2, 3]);
        assert!(y.as_slice().iter().all(|&v| v == 0.75));
    }
}
