//! Valid (unpadded, stride 1) multi-channel 2D convolution
//!
//! Input is NHWC `(B, H, W, Cin)`, the kernel is `(Fh, Fw, Cin, Cout)` and the
//! output is `(B, H - Fh + 1, W - Fw + 1, Cout)`:
//!
//! ```text
//! Y[b,h,w,m] = Σ_c Σ_p Σ_q X[b, h+p, w+q, c] · K[p,q,c,m]
//! ```
//!
//! No bias term is applied.
//!
//! # Variants
//!
//! - [`conv2d_valid`]: direct loop nest
//! - [`conv2d_valid_im2col`]: im2col patch matrix followed by a GEMM against
//!   the kernel viewed as a `(Fh·Fw·Cin, Cout)` matrix
//! - [`conv2d_valid_parallel`]: either variant with samples spread across threads
//!   (feature `parallel`)
//!
//! Every variant reduces each output element in the same `(p, q, c)` order, so
//! they agree bit for bit.

#![allow(clippy::needless_range_loop)]

use digitnet_core::{DigitNetError, DigitNetResult, KernelShape, ShapeNhwc, Tensor};
use scirs2_core::ndarray_ext::Array2;
use scirs2_core::numeric::Float;

/// Convolution kernel implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvAlgorithm {
    /// Direct nested-loop reduction
    #[default]
    Direct,
    /// Patch gathering (im2col) plus matrix multiplication
    Im2col,
}

/// Validate a convolution and compute its output shape
///
/// Returns the parsed input, kernel and output shapes.
///
/// # Errors
///
/// `ShapeMismatch` when either operand is not rank 4, the channel extents
/// disagree, a filter extent is zero, or the filter is larger than the input.
///
/// # Examples
///
/// ```
/// use digitnet_kernels::conv_output_shape;
///
/// let (_, _, out) = conv_output_shape(&[2, 28, 28, 1], &[5, 5, 1, 32]).unwrap();
/// assert_eq!(out.to_vec(), vec![2, 24, 24, 32]);
///
/// assert!(conv_output_shape(&[2, 28, 28, 3], &[5, 5, 1, 32]).is_err());
/// ```
pub fn conv_output_shape(
    input: &[usize],
    kernel: &[usize],
) -> DigitNetResult<(ShapeNhwc, KernelShape, ShapeNhwc)> {
    let xs = ShapeNhwc::from_shape("conv2d_valid", input)?;
    let ks = KernelShape::from_shape("conv2d_valid", kernel)?;

    if ks.height == 0 || ks.width == 0 || ks.out_channels == 0 {
        return Err(DigitNetError::shape_mismatch(
            "conv2d_valid",
            "non-zero filter height, width and output channels",
            kernel.to_vec(),
        ));
    }
    if ks.in_channels != xs.channels {
        return Err(DigitNetError::shape_mismatch(
            "conv2d_valid",
            format!(
                "input channels {} to match kernel in_channels {}",
                xs.channels, ks.in_channels
            ),
            input.to_vec(),
        ));
    }
    if ks.height > xs.height || ks.width > xs.width {
        return Err(DigitNetError::shape_mismatch(
            "conv2d_valid",
            format!(
                "spatial extent of at least {}x{} for a {}x{} filter",
                ks.height, ks.width, ks.height, ks.width
            ),
            input.to_vec(),
        ));
    }

    let ys = ShapeNhwc::new(
        xs.batch,
        xs.height - ks.height + 1,
        xs.width - ks.width + 1,
        ks.out_channels,
    );
    Ok((xs, ks, ys))
}

/// Valid 2D convolution using the direct loop nest
///
/// # Complexity
///
/// O(B · Hout · Wout · Cout · Fh · Fw · Cin)
///
/// # Examples
///
/// ```
/// use digitnet_core::Tensor;
/// use digitnet_kernels::conv2d_valid;
///
/// let x = Tensor::<f32>::ones(&[1, 4, 4, 1]);
/// let k = Tensor::<f32>::ones(&[3, 3, 1, 2]);
/// let y = conv2d_valid(&x, &k).unwrap();
/// assert_eq!(y.shape(), &[1, 2, 2, 2]);
/// assert!(y.as_slice().iter().all(|&v| v == 9.0));
/// ```
pub fn conv2d_valid<T: Float>(x: &Tensor<T>, kernel: &Tensor<T>) -> DigitNetResult<Tensor<T>> {
    conv2d_valid_with(x, kernel, ConvAlgorithm::Direct)
}

/// Valid 2D convolution using im2col + GEMM
pub fn conv2d_valid_im2col<T: Float>(
    x: &Tensor<T>,
    kernel: &Tensor<T>,
) -> DigitNetResult<Tensor<T>> {
    conv2d_valid_with(x, kernel, ConvAlgorithm::Im2col)
}

/// Valid 2D convolution with an explicit algorithm, processing samples sequentially
pub fn conv2d_valid_with<T: Float>(
    x: &Tensor<T>,
    kernel: &Tensor<T>,
    algorithm: ConvAlgorithm,
) -> DigitNetResult<Tensor<T>> {
    let (xs, ks, ys) = conv_output_shape(x.shape(), kernel.shape())?;
    let mut out = vec![T::zero(); ys.len()];

    for (b, out_sample) in out.chunks_mut(ys.sample_len()).enumerate() {
        let x_sample = sample_slice(x.as_slice(), &xs, b);
        conv_sample(algorithm, x_sample, &xs, kernel.as_slice(), &ks, &ys, out_sample);
    }

    Tensor::from_vec(out, &ys.to_vec())
}

/// Valid 2D convolution with batch samples processed in parallel
///
/// Each task owns one sample's slice of the output, so no two tasks write the
/// same element.
///
/// # Examples
///
/// ```
/// use digitnet_core::Tensor;
/// use digitnet_kernels::{conv2d_valid, conv2d_valid_parallel, ConvAlgorithm};
///
/// let x = Tensor::from_fn(&[4, 8, 8, 2], |i| (i % 7) as f64 - 3.0);
/// let k = Tensor::from_fn(&[3, 3, 2, 4], |i| (i % 5) as f64 * 0.25);
/// let serial = conv2d_valid(&x, &k).unwrap();
/// let parallel = conv2d_valid_parallel(&x, &k, ConvAlgorithm::Im2col).unwrap();
/// assert_eq!(serial, parallel);
/// ```
#[cfg(feature = "parallel")]
pub fn conv2d_valid_parallel<T>(
    x: &Tensor<T>,
    kernel: &Tensor<T>,
    algorithm: ConvAlgorithm,
) -> DigitNetResult<Tensor<T>>
where
    T: Float + Send + Sync,
{
    use scirs2_core::parallel_ops::*;

    let (xs, ks, ys) = conv_output_shape(x.shape(), kernel.shape())?;
    let mut out = vec![T::zero(); ys.len()];
    let x_data = x.as_slice();
    let k_data = kernel.as_slice();

    out.par_chunks_mut(ys.sample_len())
        .enumerate()
        .for_each(|(b, out_sample)| {
            let x_sample = sample_slice(x_data, &xs, b);
            conv_sample(algorithm, x_sample, &xs, k_data, &ks, &ys, out_sample);
        });

    Tensor::from_vec(out, &ys.to_vec())
}

#[inline]
fn sample_slice<'a, T>(data: &'a [T], xs: &ShapeNhwc, b: usize) -> &'a [T] {
    let len = xs.sample_len();
    &data[b * len..(b + 1) * len]
}

fn conv_sample<T: Float>(
    algorithm: ConvAlgorithm,
    x: &[T],
    xs: &ShapeNhwc,
    k: &[T],
    ks: &KernelShape,
    ys: &ShapeNhwc,
    out: &mut [T],
) {
    match algorithm {
        ConvAlgorithm::Direct => conv_sample_direct(x, xs, k, ks, ys, out),
        ConvAlgorithm::Im2col => {
            let cols = im2col(x, xs, ks, ys);
            gemm_into(&cols, k, ks.out_channels, out);
        }
    }
}

/// Direct reduction for one sample; `x` and `out` hold a single sample.
fn conv_sample_direct<T: Float>(
    x: &[T],
    xs: &ShapeNhwc,
    k: &[T],
    ks: &KernelShape,
    ys: &ShapeNhwc,
    out: &mut [T],
) {
    let cout = ks.out_channels;
    for h in 0..ys.height {
        for w in 0..ys.width {
            let acc = &mut out[ys.offset(0, h, w, 0)..ys.offset(0, h, w, 0) + cout];
            for p in 0..ks.height {
                for q in 0..ks.width {
                    for c in 0..ks.in_channels {
                        let xv = x[xs.offset(0, h + p, w + q, c)];
                        let k_row = &k[ks.offset(p, q, c, 0)..ks.offset(p, q, c, 0) + cout];
                        for m in 0..cout {
                            acc[m] = acc[m] + xv * k_row[m];
                        }
                    }
                }
            }
        }
    }
}

/// Gather the receptive fields of one sample into a patch matrix.
///
/// Row `h * Wout + w` holds the patch under output position `(h, w)`, with
/// columns ordered `(p, q, c)` to line up with the kernel's row-major rows.
fn im2col<T: Float>(x: &[T], xs: &ShapeNhwc, ks: &KernelShape, ys: &ShapeNhwc) -> Array2<T> {
    let patch_len = ks.patch_len();
    let row_len = ks.width * ks.in_channels;
    let mut cols = Array2::zeros((ys.height * ys.width, patch_len));

    for h in 0..ys.height {
        for w in 0..ys.width {
            let mut row = cols.row_mut(h * ys.width + w);
            for p in 0..ks.height {
                // (q, c) for fixed p is one contiguous run of the input row
                let start = xs.offset(0, h + p, w, 0);
                let src = &x[start..start + row_len];
                for (j, &v) in src.iter().enumerate() {
                    row[p * row_len + j] = v;
                }
            }
        }
    }

    cols
}

/// `out = cols · K` where `K` is the kernel buffer viewed as `(patch_len, cout)`.
fn gemm_into<T: Float>(cols: &Array2<T>, k: &[T], cout: usize, out: &mut [T]) {
    for (r, patch) in cols.outer_iter().enumerate() {
        let acc = &mut out[r * cout..(r + 1) * cout];
        for (i, &a) in patch.iter().enumerate() {
            let k_row = &k[i * cout..(i + 1) * cout];
            for m in 0..cout {
                acc[m] = acc[m] + a * k_row[m];
            }
        }
    }
}
