//! # digitnet-kernels
//!
//! Numeric kernels for the digitnet forward pass. Each kernel is a pure
//! function from input tensors to a freshly allocated output tensor, except
//! [`relu_inplace`], which rectifies its argument in place.
//!
//! **Kernels:**
//! - **Convolution** - valid, stride 1, multi-channel; direct, im2col + GEMM,
//!   and batch-parallel variants
//! - **Average pooling** - non-overlapping windows with an explicit remainder policy
//! - **ReLU** - in place or allocating
//! - **Dense** - `(B, K) · (K, N)` without bias
//! - **Argmax** - per-row class decision, first maximum wins
//!
//! ## Quick Start
//!
//! ```rust
//! use digitnet_core::Tensor;
//! use digitnet_kernels::{argmax_rows, avg_pool2d, conv2d_valid, dense_forward, relu_inplace, PoolRemainder};
//!
//! let x = Tensor::<f32>::ones(&[2, 8, 8, 1]);
//! let k = Tensor::<f32>::ones(&[3, 3, 1, 4]);
//!
//! let mut y = conv2d_valid(&x, &k).unwrap();          // [2, 6, 6, 4]
//! relu_inplace(&mut y);
//! let pooled = avg_pool2d(&y, 2, PoolRemainder::Reject).unwrap(); // [2, 3, 3, 4]
//! let flat = pooled.flatten_batch().unwrap();          // [2, 36]
//!
//! let w = Tensor::<f32>::ones(&[36, 10]);
//! let logits = dense_forward(&flat, &w).unwrap();      // [2, 10]
//! assert_eq!(argmax_rows(&logits).unwrap(), vec![0, 0]);
//! ```
//!
//! ## Features
//!
//! - `parallel` (default) - enables [`conv2d_valid_parallel`] via `scirs2_core::parallel_ops`
//!
//! ## SciRS2 Integration
//!
//! Array storage and numeric traits come from `scirs2-core`; `ndarray`,
//! `rayon` and `num-traits` are not used directly.

#![deny(warnings)]

pub mod activation;
pub mod classify;
pub mod conv;
pub mod dense;
pub mod pool;


// Re-exports
pub use activation::*;
pub use classify::*;
pub use conv::*;
pub use dense::*;
pub use pool::*;
