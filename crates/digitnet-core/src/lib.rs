//! # digitnet-core
//!
//! Core tensor container and error types for the digitnet inference stack.
//!
//! - **Dense tensor** ([`Tensor`]): owned, contiguous, row-major buffer plus a shape
//! - **Layout helpers** ([`ShapeNhwc`], [`KernelShape`]) for NHWC activations and
//!   (Fh, Fw, Cin, Cout) kernels
//! - **Errors** ([`DigitNetError`]): shape mismatches and invalid weights
//!
//! ## Quick Start
//!
//! ```
//! use digitnet_core::Tensor;
//!
//! // A batch of two 28x28 single-channel images
//! let images = Tensor::<f32>::zeros(&[2, 28, 28, 1]);
//! assert_eq!(images.shape(), &[2, 28, 28, 1]);
//!
//! // Flatten everything after the batch axis
//! let flat = images.flatten_batch().unwrap();
//! assert_eq!(flat.shape(), &[2, 784]);
//! ```
//!
//! ## SciRS2 Integration
//!
//! Storage uses `scirs2_core::ndarray_ext`; numeric bounds come from
//! `scirs2_core::numeric`. Direct use of `ndarray` or `num-traits` is avoided.

#![deny(warnings)]

pub mod error;
pub mod shape;
pub mod tensor;


pub use error::{DigitNetError, DigitNetResult};
pub use shape::{KernelShape, ShapeNhwc};
pub use tensor::Tensor;
