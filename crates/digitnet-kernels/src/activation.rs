//! Rectified linear unit

use digitnet_core::Tensor;
use scirs2_core::numeric::Float;

/// Clamp negative elements to zero in place
///
/// Shape is preserved. NaN is left untouched since `NaN < 0` is false.
///
/// # Examples
///
/// ```
/// use digitnet_core::Tensor;
/// use digitnet_kernels::relu_inplace;
///
/// let mut t = Tensor::from_vec(vec![-1.5, 0.0, 2.0], &[3]).unwrap();
/// relu_inplace(&mut t);
/// assert_eq!(t.as_slice(), &[0.0, 0.0, 2.0]);
/// ```
pub fn relu_inplace<T: Float>(x: &mut Tensor<T>) {
    x.map_inplace(|v| {
        if *v < T::zero() {
            *v = T::zero();
        }
    });
}

/// Allocating variant of [`relu_inplace`]
pub fn relu<T: Float>(x: &Tensor<T>) -> Tensor<T> {
    x.map(|&v| if v < T::zero() { T::zero() } else { v })
}
