//! # digitnet
//!
//! Inference for a small convolutional digit classifier over batches of
//! 28×28 grayscale images in NHWC layout.
//!
//! This is the **meta crate** that re-exports the digitnet components.
//!
//! ## Quick Start
//!
//! ```
//! use digitnet::prelude::*;
//!
//! let images = Tensor::<f32>::zeros(&[2, 28, 28, 1]);
//! let weights = ModelWeights::zeros_reference();
//!
//! let labels = forward(&images, &weights)?;
//! assert_eq!(labels, vec![0, 0]);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Components
//!
//! ### Tensors and errors ([`core`])
//!
//! ```
//! use digitnet::core::Tensor;
//!
//! let t = Tensor::<f64>::ones(&[2, 4, 4, 3]);
//! let flat = t.flatten_batch().unwrap();
//! assert_eq!(flat.shape(), &[2, 48]);
//! ```
//!
//! ### Layer kernels ([`kernels`])
//!
//! Valid convolution (direct and im2col), ReLU, average pooling, dense and argmax.
//!
//! ```
//! use digitnet::core::Tensor;
//! use digitnet::kernels::{avg_pool2d, PoolRemainder};
//!
//! let x = Tensor::<f32>::ones(&[1, 4, 4, 2]);
//! let y = avg_pool2d(&x, 2, PoolRemainder::Reject).unwrap();
//! assert_eq!(y.shape(), &[1, 2, 2, 2]);
//! ```
//!
//! ### The classifier ([`model`])
//!
//! Weight validation, shape planning, the forward pipeline and accuracy scoring.
//!
//! ## Features
//!
//! - `parallel` (default): batch-parallel convolution
//! - `tracing` (default): [`tracing_support::init_tracing`] installs a
//!   `tracing-subscriber` with env-filter and pretty/JSON/compact output

#![deny(warnings)]

pub use digitnet_core as core;
pub use digitnet_kernels as kernels;
pub use digitnet_model as model;

pub mod tracing_support;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```
    //! use digitnet::prelude::*;
    //!
    //! let config = ForwardConfig::new().with_conv_algorithm(ConvAlgorithm::Im2col);
    //! assert_eq!(config.conv_algorithm, ConvAlgorithm::Im2col);
    //! ```

    pub use crate::core::{DigitNetError, DigitNetResult, Tensor};

    pub use crate::kernels::{ConvAlgorithm, PoolRemainder};

    pub use crate::model::{
        classify, evaluate, forward, forward_logits_with, forward_with, labels_from_one_hot,
        EvalReport, ForwardConfig, ForwardPlan, ModelWeights, Stage,
    };
}
