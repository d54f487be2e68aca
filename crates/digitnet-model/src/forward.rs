//! The forward pass
//!
//! ```text
//! X → conv1 → relu → avgpool(2) → conv2 → relu → avgpool(2)
//!   → flatten → fc1 → relu → fc2 → argmax → labels
//! ```
//!
//! Each stage consumes the previous stage's tensor and produces a new one;
//! nothing is retained between calls. The whole shape chain is checked by a
//! [`ForwardPlan`] before the first convolution runs.

use crate::config::ForwardConfig;
use crate::plan::{ForwardPlan, Stage};
use crate::weights::{ModelWeights, POOL_SIZE};
use digitnet_core::{DigitNetResult, Tensor};
use digitnet_kernels::{argmax_rows, avg_pool2d, dense_forward, relu_inplace};
use scirs2_core::numeric::Float;
use std::time::Instant;

/// Classify a batch of `(B, 28, 28, 1)` images with the default configuration
///
/// Returns one class index per sample.
///
/// # Errors
///
/// - `ShapeMismatch` if the input or the weights do not chain through the network
///
/// # Examples
///
/// ```
/// use digitnet_core::Tensor;
/// use digitnet_model::{forward, ModelWeights};
///
/// let images = Tensor::<f32>::zeros(&[2, 28, 28, 1]);
/// let weights = ModelWeights::zeros_reference();
/// assert_eq!(forward(&images, &weights).unwrap(), vec![0, 0]);
/// ```
pub fn forward<T>(x: &Tensor<T>, weights: &ModelWeights<T>) -> DigitNetResult<Vec<usize>>
where
    T: Float + Send + Sync,
{
    forward_with(x, weights, &ForwardConfig::default())
}

/// Validate four raw weight tensors, then classify `x`
///
/// Weight validation happens before any arithmetic.
///
/// # Errors
///
/// - `InvalidWeights` if a weight tensor has the wrong rank or a zero extent
/// - `ShapeMismatch` as for [`forward`]
pub fn classify<T>(
    x: &Tensor<T>,
    conv1: Tensor<T>,
    conv2: Tensor<T>,
    fc1: Tensor<T>,
    fc2: Tensor<T>,
) -> DigitNetResult<Vec<usize>>
where
    T: Float + Send + Sync,
{
    let weights = ModelWeights::new(conv1, conv2, fc1, fc2)?;
    forward(x, &weights)
}

/// Classify a batch with an explicit configuration
pub fn forward_with<T>(
    x: &Tensor<T>,
    weights: &ModelWeights<T>,
    config: &ForwardConfig,
) -> DigitNetResult<Vec<usize>>
where
    T: Float + Send + Sync,
{
    let plan = ForwardPlan::new(x.shape(), weights, config)?;
    let span = forward_span(&plan, config);
    let _guard = span.enter();

    let logits = run_to_logits(x, weights, config)?;
    let started = Instant::now();
    let labels = argmax_rows(&logits)?;
    trace_stage(Stage::Argmax, &[labels.len()], started);
    Ok(labels)
}

/// Run every stage up to and including `fc2`, returning the `(B, 10)` logits
///
/// # Examples
///
/// ```
/// use digitnet_core::Tensor;
/// use digitnet_model::{forward_logits_with, ForwardConfig, ModelWeights};
///
/// let images = Tensor::<f64>::ones(&[3, 28, 28, 1]);
/// let weights = ModelWeights::zeros_reference();
/// let logits = forward_logits_with(&images, &weights, &ForwardConfig::default()).unwrap();
/// assert_eq!(logits.shape(), &[3, 10]);
/// assert!(logits.as_slice().iter().all(|&v| v == 0.0));
/// ```
pub fn forward_logits_with<T>(
    x: &Tensor<T>,
    weights: &ModelWeights<T>,
    config: &ForwardConfig,
) -> DigitNetResult<Tensor<T>>
where
    T: Float + Send + Sync,
{
    let plan = ForwardPlan::new(x.shape(), weights, config)?;
    let span = forward_span(&plan, config);
    let _guard = span.enter();
    run_to_logits(x, weights, config)
}

fn forward_span(plan: &ForwardPlan, config: &ForwardConfig) -> tracing::Span {
    let span = tracing::info_span!(
        "forward",
        batch = plan.batch(),
        conv = ?config.conv_algorithm,
        parallel = config.runs_parallel()
    );
    span.in_scope(|| {
        tracing::debug!(
            mac_ops = plan.estimated_flops(),
            peak_elements = plan.peak_elements(),
            "forward plan ready"
        )
    });
    span
}

/// Stages conv1 through fc2; the caller has already planned the shapes.
fn run_to_logits<T>(
    x: &Tensor<T>,
    weights: &ModelWeights<T>,
    config: &ForwardConfig,
) -> DigitNetResult<Tensor<T>>
where
    T: Float + Send + Sync,
{
    let started = Instant::now();
    let mut a = convolve(x, weights.conv1(), config)?;
    trace_stage(Stage::Conv1, a.shape(), started);

    let started = Instant::now();
    relu_inplace(&mut a);
    trace_stage(Stage::Relu1, a.shape(), started);

    let started = Instant::now();
    let b = avg_pool2d(&a, POOL_SIZE, config.pool_remainder)?;
    drop(a);
    trace_stage(Stage::Pool1, b.shape(), started);

    let started = Instant::now();
    let mut c = convolve(&b, weights.conv2(), config)?;
    drop(b);
    trace_stage(Stage::Conv2, c.shape(), started);

    let started = Instant::now();
    relu_inplace(&mut c);
    trace_stage(Stage::Relu2, c.shape(), started);

    let started = Instant::now();
    let d = avg_pool2d(&c, POOL_SIZE, config.pool_remainder)?;
    drop(c);
    trace_stage(Stage::Pool2, d.shape(), started);

    let started = Instant::now();
    let flat = d.flatten_batch()?;
    trace_stage(Stage::Flatten, flat.shape(), started);

    let started = Instant::now();
    let mut e = dense_forward(&flat, weights.fc1())?;
    drop(flat);
    trace_stage(Stage::Fc1, e.shape(), started);

    let started = Instant::now();
    relu_inplace(&mut e);
    trace_stage(Stage::Relu3, e.shape(), started);

    let started = Instant::now();
    let f = dense_forward(&e, weights.fc2())?;
    trace_stage(Stage::Fc2, f.shape(), started);

    Ok(f)
}

fn convolve<T>(
    x: &Tensor<T>,
    kernel: &Tensor<T>,
    config: &ForwardConfig,
) -> DigitNetResult<Tensor<T>>
where
    T: Float + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if config.parallel {
            return digitnet_kernels::conv2d_valid_parallel(x, kernel, config.conv_algorithm);
        }
    }
    digitnet_kernels::conv2d_valid_with(x, kernel, config.conv_algorithm)
}

fn trace_stage(stage: Stage, shape: &[usize], started: Instant) {
    tracing::debug!(
        stage = stage.name(),
        shape = ?shape,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "stage complete"
    );
}
