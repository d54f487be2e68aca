//! Shape plan for the fixed layer sequence
//!
//! A [`ForwardPlan`] walks every stage's shape arithmetic before any numbers
//! are touched, so a bad input or an incompatible weight set fails fast with
//! the first violated precondition.

use crate::config::ForwardConfig;
use crate::weights::{ModelWeights, NUM_CLASSES, POOL_SIZE};
use digitnet_core::{DigitNetError, DigitNetResult};
use digitnet_kernels::{conv_output_shape, dense_output_shape, pool_output_shape};
use scirs2_core::numeric::Float;
use std::fmt;

/// One step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Conv1,
    Relu1,
    Pool1,
    Conv2,
    Relu2,
    Pool2,
    Flatten,
    Fc1,
    Relu3,
    Fc2,
    Argmax,
}

impl Stage {
    /// Stages in execution order
    pub const SEQUENCE: [Stage; 11] = [
        Stage::Conv1,
        Stage::Relu1,
        Stage::Pool1,
        Stage::Conv2,
        Stage::Relu2,
        Stage::Pool2,
        Stage::Flatten,
        Stage::Fc1,
        Stage::Relu3,
        Stage::Fc2,
        Stage::Argmax,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Conv1 => "conv1",
            Stage::Relu1 => "relu1",
            Stage::Pool1 => "pool1",
            Stage::Conv2 => "conv2",
            Stage::Relu2 => "relu2",
            Stage::Pool2 => "pool2",
            Stage::Flatten => "flatten",
            Stage::Fc1 => "fc1",
            Stage::Relu3 => "relu3",
            Stage::Fc2 => "fc2",
            Stage::Argmax => "argmax",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output shape of every stage for one concrete input shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardPlan {
    stages: Vec<(Stage, Vec<usize>)>,
    flops: u64,
}

impl ForwardPlan {
    /// Plan the forward pass for `input_shape`
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` (or `InvalidArgument` from pooling) for the first stage
    /// whose precondition fails, including an `fc2` that does not produce
    /// exactly `NUM_CLASSES` scores.
    ///
    /// # Examples
    ///
    /// ```
    /// use digitnet_model::{ForwardConfig, ForwardPlan, ModelWeights, Stage};
    ///
    /// let weights = ModelWeights::<f32>::zeros_reference();
    /// let plan = ForwardPlan::new(&[8, 28, 28, 1], &weights, &ForwardConfig::default()).unwrap();
    /// assert_eq!(plan.shape_of(Stage::Pool2), Some(&[8, 4, 4, 64][..]));
    /// assert_eq!(plan.output_shape(), &[8]);
    /// ```
    pub fn new<T: Float>(
        input_shape: &[usize],
        weights: &ModelWeights<T>,
        config: &ForwardConfig,
    ) -> DigitNetResult<Self> {
        let mut stages = Vec::with_capacity(Stage::SEQUENCE.len());
        let mut flops: u64 = 0;

        let (_, k1, a) = conv_output_shape(input_shape, weights.conv1().shape())?;
        flops += (a.len() * k1.patch_len()) as u64;
        stages.push((Stage::Conv1, a.to_vec()));
        stages.push((Stage::Relu1, a.to_vec()));

        let b = pool_output_shape(&a.to_vec(), POOL_SIZE, config.pool_remainder)?;
        stages.push((Stage::Pool1, b.to_vec()));

        let (_, k2, c) = conv_output_shape(&b.to_vec(), weights.conv2().shape())?;
        flops += (c.len() * k2.patch_len()) as u64;
        stages.push((Stage::Conv2, c.to_vec()));
        stages.push((Stage::Relu2, c.to_vec()));

        let d = pool_output_shape(&c.to_vec(), POOL_SIZE, config.pool_remainder)?;
        stages.push((Stage::Pool2, d.to_vec()));

        let flat = vec![d.batch, d.sample_len()];
        stages.push((Stage::Flatten, flat.clone()));

        let (batch, k, n1) = dense_output_shape(&flat, weights.fc1().shape())?;
        flops += (batch * k * n1) as u64;
        stages.push((Stage::Fc1, vec![batch, n1]));
        stages.push((Stage::Relu3, vec![batch, n1]));

        let (_, k, n2) = dense_output_shape(&[batch, n1], weights.fc2().shape())?;
        if n2 != NUM_CLASSES {
            return Err(DigitNetError::shape_mismatch(
                "fc2",
                format!("{} output columns, one per class", NUM_CLASSES),
                weights.fc2().shape().to_vec(),
            ));
        }
        flops += (batch * k * n2) as u64;
        stages.push((Stage::Fc2, vec![batch, n2]));
        stages.push((Stage::Argmax, vec![batch]));

        Ok(Self { stages, flops })
    }

    /// `(stage, output shape)` pairs in execution order
    pub fn stages(&self) -> &[(Stage, Vec<usize>)] {
        &self.stages
    }

    /// Output shape of a given stage
    pub fn shape_of(&self, stage: Stage) -> Option<&[usize]> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, shape)| shape.as_slice())
    }

    /// Number of samples in the batch
    pub fn batch(&self) -> usize {
        self.output_shape()[0]
    }

    /// Shape of the label vector
    pub fn output_shape(&self) -> &[usize] {
        match self.stages.last() {
            Some((_, shape)) => shape,
            None => unreachable!("a plan always contains every stage"),
        }
    }

    /// Multiply-accumulate count of the conv and dense stages
    pub fn estimated_flops(&self) -> u64 {
        self.flops
    }

    /// Largest intermediate tensor, in elements
    pub fn peak_elements(&self) -> usize {
        self.stages
            .iter()
            .map(|(_, shape)| shape.iter().product::<usize>())
            .max()
            .unwrap_or(0)
    }
}
