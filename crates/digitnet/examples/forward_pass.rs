//! Forward pass over a synthetic batch
//!
//! Builds deterministic weights with the published layer shapes, prints the
//! shape plan, then classifies the same batch with every convolution
//! configuration. Each run is scored against one-hot labels derived from the
//! bar position in each image and checked against the sequential direct run.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=digitnet_model=debug cargo run --example forward_pass --release
//! ```

use anyhow::Result;
use digitnet::prelude::*;
use digitnet::model::{reference_shapes, INPUT_CHANNELS, INPUT_HEIGHT, INPUT_WIDTH, NUM_CLASSES};
use digitnet::tracing_support::{init_tracing, TracingConfig};
use std::time::Instant;

const BATCH: usize = 64;

/// Small, sign-alternating values so activations stay in a sane range
fn synthetic_weights() -> Result<ModelWeights<f32>> {
    let [s1, s2, s3, s4] = reference_shapes();
    let fill = |shape: &[usize], salt: usize, scale: f32| {
        Tensor::from_fn(shape, move |i| {
            (((i.wrapping_mul(40503) + salt) % 1009) as f32 / 504.5 - 1.0) * scale
        })
    };
    Ok(ModelWeights::new(
        fill(&s1, 1, 0.2),
        fill(&s2, 2, 0.05),
        fill(&s3, 3, 0.05),
        fill(&s4, 4, 0.1),
    )?)
}

/// A vertical bar whose column depends on the sample index
fn synthetic_images() -> Tensor<f32> {
    let sample = INPUT_HEIGHT * INPUT_WIDTH * INPUT_CHANNELS;
    Tensor::from_fn(&[BATCH, INPUT_HEIGHT, INPUT_WIDTH, INPUT_CHANNELS], |i| {
        let b = i / sample;
        let w = (i % sample) / INPUT_CHANNELS % INPUT_WIDTH;
        if w.abs_diff(4 + b % 20) <= 1 {
            1.0
        } else {
            0.0
        }
    })
}

/// Ground truth for [`synthetic_images`]: the bar's column band, one class per two columns
fn synthetic_labels() -> Vec<usize> {
    (0..BATCH).map(|b| (b % 20) / 2).collect()
}

fn one_hot(labels: &[usize]) -> Result<Tensor<f32>> {
    let mut data = vec![0.0; labels.len() * NUM_CLASSES];
    for (row, &label) in labels.iter().enumerate() {
        data[row * NUM_CLASSES + label] = 1.0;
    }
    Ok(Tensor::from_vec(data, &[labels.len(), NUM_CLASSES])?)
}

fn main() -> Result<()> {
    init_tracing(TracingConfig::default())?;

    let weights = synthetic_weights()?;
    let images = synthetic_images();
    println!(
        "weights: {} parameters, reference shapes: {}",
        weights.parameter_count(),
        weights.has_reference_shapes()
    );

    let plan = ForwardPlan::new(images.shape(), &weights, &ForwardConfig::default())?;
    println!("\nplan ({:.2e} MACs):", plan.estimated_flops() as f64);
    for (stage, shape) in plan.stages() {
        println!("  {:<8} {:?}", stage.name(), shape);
    }

    let baseline_config = ForwardConfig::new().with_parallel(false);
    let baseline = forward_with(&images, &weights, &baseline_config)?;
    let reference = labels_from_one_hot(&one_hot(&synthetic_labels())?)?;

    println!("\nconfigurations:");
    for algorithm in [ConvAlgorithm::Direct, ConvAlgorithm::Im2col] {
        for parallel in [false, true] {
            let config = ForwardConfig::new()
                .with_conv_algorithm(algorithm)
                .with_parallel(parallel);
            let started = Instant::now();
            let labels = forward_with(&images, &weights, &config)?;
            let elapsed = started.elapsed();
            let report = evaluate(&labels, &reference)?;
            println!(
                "  {:<7} parallel={:<5} {:>8.2} ms  accuracy {}  matches baseline: {}",
                format!("{:?}", algorithm),
                config.runs_parallel(),
                elapsed.as_secs_f64() * 1000.0,
                report,
                labels == baseline
            );
        }
    }

    let mut histogram = [0usize; NUM_CLASSES];
    for &label in &baseline {
        histogram[label] += 1;
    }
    println!("\nclass histogram: {:?}", histogram);

    Ok(())
}
