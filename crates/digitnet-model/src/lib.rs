//! # digitnet-model
//!
//! The digitnet classifier: weight validation, shape planning and the fixed
//! forward pass
//!
//! ```text
//! conv1 → relu → avgpool(2) → conv2 → relu → avgpool(2) → flatten → fc1 → relu → fc2 → argmax
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use digitnet_core::Tensor;
//! use digitnet_model::{evaluate, forward, ModelWeights};
//!
//! let images = Tensor::<f32>::zeros(&[4, 28, 28, 1]);
//! let weights = ModelWeights::zeros_reference();
//!
//! let labels = forward(&images, &weights).unwrap();
//! assert_eq!(labels, vec![0, 0, 0, 0]);
//!
//! let report = evaluate(&labels, &[0, 0, 1, 0]).unwrap();
//! assert_eq!(report.correct, 3);
//! ```
//!
//! ## Logging
//!
//! Each forward call opens an `info` span named `forward` and emits a `debug`
//! event per stage with its output shape and elapsed time. Install a
//! subscriber (for example via `digitnet::tracing_support`) to see them.
//!
//! ## Features
//!
//! - `parallel` (default) - batch-parallel convolution when
//!   [`ForwardConfig::parallel`] is set

#![deny(warnings)]

pub mod config;
pub mod eval;
pub mod forward;
pub mod plan;
pub mod weights;


pub use config::ForwardConfig;
pub use eval::{evaluate, labels_from_one_hot, EvalReport};
pub use forward::{classify, forward, forward_logits_with, forward_with};
pub use plan::{ForwardPlan, Stage};
pub use weights::{
    reference_shapes, ModelWeights, INPUT_CHANNELS, INPUT_HEIGHT, INPUT_WIDTH, LAYER_NAMES,
    NUM_CLASSES, POOL_SIZE,
};
