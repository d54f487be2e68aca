//! End-to-end tests of the digitnet pipeline

use anyhow::Result;
use digitnet_core::Tensor;
use digitnet_kernels::{conv2d_valid, ConvAlgorithm};
use digitnet_model::{
    classify, evaluate, forward, forward_logits_with, forward_with, labels_from_one_hot,
    reference_shapes, ForwardConfig, ForwardPlan, ModelWeights, Stage, NUM_CLASSES,
};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Pointwise convolutions, a mean-brightness `fc1` and an `fc2` that votes for `class`
fn brightness_model(class: usize) -> Result<ModelWeights<f64>> {
    Ok(ModelWeights::new(
        Tensor::ones(&[1, 1, 1, 1]),
        Tensor::ones(&[1, 1, 1, 1]),
        Tensor::from_elem(&[49, 1], 1.0 / 49.0),
        Tensor::from_fn(&[1, NUM_CLASSES], |j| if j == class { 1.0 } else { 0.0 }),
    )?)
}

fn one_hot(labels: &[usize]) -> Result<Tensor<f64>> {
    let mut data = vec![0.0; labels.len() * NUM_CLASSES];
    for (row, &label) in labels.iter().enumerate() {
        data[row * NUM_CLASSES + label] = 1.0;
    }
    Ok(Tensor::from_vec(data, &[labels.len(), NUM_CLASSES])?)
}

#[test]
fn test_all_zero_images_and_weights() -> Result<()> {
    let x = Tensor::<f32>::zeros(&[2, 28, 28, 1]);
    let weights = ModelWeights::zeros_reference();
    assert!(weights.has_reference_shapes());

    let logits = forward_logits_with(&x, &weights, &ForwardConfig::default())?;
    assert_eq!(logits.shape(), &[2, NUM_CLASSES]);
    assert!(logits.as_slice().iter().all(|&v| v == 0.0));
    assert_eq!(forward(&x, &weights)?, vec![0, 0]);
    Ok(())
}

#[test]
fn test_single_tap_kernel_keeps_spatial_size() -> Result<()> {
    let x = Tensor::<f64>::ones(&[2, 28, 28, 1]);
    let weights = brightness_model(4)?;

    let conv1 = conv2d_valid(&x, weights.conv1())?;
    assert_eq!(conv1.shape(), &[2, 28, 28, 1]);
    assert!(conv1.as_slice().iter().all(|&v| v == 1.0));

    let plan = ForwardPlan::new(x.shape(), &weights, &ForwardConfig::default())?;
    assert_eq!(plan.shape_of(Stage::Conv1), Some(&[2, 28, 28, 1][..]));
    assert_eq!(plan.shape_of(Stage::Pool2), Some(&[2, 7, 7, 1][..]));

    assert_eq!(forward(&x, &weights)?, vec![4, 4]);
    Ok(())
}

#[test]
fn test_predictions_scored_against_one_hot_labels() -> Result<()> {
    let weights = brightness_model(7)?;
    // Dark images score all zeros (class 0), bright ones vote for 7
    let x = Tensor::from_fn(&[4, 28, 28, 1], |i| if i / 784 == 0 { 0.0 } else { 1.0 });

    let predicted = forward(&x, &weights)?;
    assert_eq!(predicted, vec![0, 7, 7, 7]);

    let reference = labels_from_one_hot(&one_hot(&[0, 7, 7, 1])?)?;
    let report = evaluate(&predicted, &reference)?;
    assert_eq!(report.correct, 3);
    assert_eq!(report.total, 4);
    assert!((report.accuracy() - 0.75).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_every_configuration_classifies_reference_shapes_alike() -> Result<()> {
    let [s1, s2, s3, s4] = reference_shapes();
    let scaled = |shape: &[usize], scale: f32| {
        Tensor::from_fn(shape, move |i| (((i * 31) % 17) as f32 - 8.0) * scale)
    };
    let weights = ModelWeights::new(
        scaled(&s1, 0.05),
        scaled(&s2, 0.01),
        scaled(&s3, 0.02),
        scaled(&s4, 0.1),
    )?;
    let x = Tensor::from_fn(&[3, 28, 28, 1], |i| ((i * 7) % 256) as f32 / 255.0);

    let baseline = forward_with(&x, &weights, &ForwardConfig::new().with_parallel(false))?;
    for algorithm in [ConvAlgorithm::Direct, ConvAlgorithm::Im2col] {
        for parallel in [false, true] {
            let config = ForwardConfig::new()
                .with_conv_algorithm(algorithm)
                .with_parallel(parallel);
            assert_eq!(forward_with(&x, &weights, &config)?, baseline);
        }
    }
    Ok(())
}

#[test]
fn test_classify_with_loose_tensors() -> Result<()> {
    let x = Tensor::<f64>::ones(&[1, 28, 28, 1]);
    let (conv1, conv2, fc1, fc2) = brightness_model(9)?.into_parts();
    assert_eq!(classify(&x, conv1, conv2, fc1, fc2)?, vec![9]);
    Ok(())
}

#[test]
fn test_mismatched_label_counts() {
    let err = evaluate(&[1, 2, 3], &[1, 2]).unwrap_err();
    assert!(err.to_string().contains('3'));
}

/// Records `(stage, enclosing span name)` for every stage event
#[derive(Clone, Default)]
struct StageRecorder(Arc<Mutex<Vec<(String, Option<String>)>>>);

#[derive(Default)]
struct StageField(Option<String>);

impl Visit for StageField {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "stage" {
            self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn fmt::Debug) {}
}

impl<S> Layer<S> for StageRecorder
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut field = StageField::default();
        event.record(&mut field);
        if let Some(stage) = field.0 {
            let span = ctx.event_span(event).map(|s| s.name().to_string());
            self.0.lock().unwrap().push((stage, span));
        }
    }
}

#[test]
fn test_every_stage_event_carries_the_forward_span() -> Result<()> {
    let recorder = StageRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());

    let x = Tensor::<f32>::zeros(&[2, 28, 28, 1]);
    let weights = ModelWeights::zeros_reference();
    let labels = tracing::subscriber::with_default(subscriber, || {
        forward_with(&x, &weights, &ForwardConfig::new().with_parallel(false))
    })?;
    assert_eq!(labels, vec![0, 0]);

    let events = recorder.0.lock().unwrap().clone();
    let stages: Vec<&str> = events.iter().map(|(stage, _)| stage.as_str()).collect();
    let expected: Vec<&str> = Stage::SEQUENCE.iter().map(|s| s.name()).collect();
    assert_eq!(stages, expected);
    for (stage, span) in &events {
        assert_eq!(span.as_deref(), Some("forward"), "stage {}", stage);
    }
    Ok(())
}
