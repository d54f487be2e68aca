//! Pre-trained weight tensors of the classifier
//!
//! Weights are supplied by the caller (loading them from disk is the caller's
//! job) and validated once, before any arithmetic runs.

use digitnet_core::{DigitNetError, DigitNetResult, Tensor};
use scirs2_core::numeric::Float;

/// Input image height
pub const INPUT_HEIGHT: usize = 28;
/// Input image width
pub const INPUT_WIDTH: usize = 28;
/// Input image channels (grayscale)
pub const INPUT_CHANNELS: usize = 1;
/// Number of output classes (digits 0-9)
pub const NUM_CLASSES: usize = 10;
/// Window and stride of both pooling stages
pub const POOL_SIZE: usize = 2;

/// Names of the four weight tensors, in pipeline order
pub const LAYER_NAMES: [&str; 4] = ["conv1", "conv2", "fc1", "fc2"];

/// Shapes of the published model's weights
///
/// ```
/// use digitnet_model::reference_shapes;
///
/// let [conv1, conv2, fc1, fc2] = reference_shapes();
/// assert_eq!(conv1, [5, 5, 1, 32].to_vec());
/// assert_eq!(fc2, [128, 10].to_vec());
/// # let _ = (conv2, fc1);
/// ```
pub fn reference_shapes() -> [Vec<usize>; 4] {
    [
        vec![5, 5, INPUT_CHANNELS, 32],
        vec![5, 5, 32, 64],
        vec![1024, 128],
        vec![128, NUM_CLASSES],
    ]
}

/// The four weight tensors of the network
///
/// - `conv1`: (Fh, Fw, 1, 32)
/// - `conv2`: (Fh, Fw, 32, 64)
/// - `fc1`: (1024, 128)
/// - `fc2`: (128, 10)
#[derive(Debug, Clone)]
pub struct ModelWeights<T> {
    conv1: Tensor<T>,
    conv2: Tensor<T>,
    fc1: Tensor<T>,
    fc2: Tensor<T>,
}

impl<T: Float> ModelWeights<T> {
    /// Validate and bundle the weight tensors
    ///
    /// Only rank and non-zero extents are checked here. Whether the layers
    /// chain together is checked by [`crate::ForwardPlan`] against a concrete input.
    ///
    /// # Errors
    ///
    /// `InvalidWeights` naming the first offending layer.
    pub fn new(
        conv1: Tensor<T>,
        conv2: Tensor<T>,
        fc1: Tensor<T>,
        fc2: Tensor<T>,
    ) -> DigitNetResult<Self> {
        validate_layer("conv1", &conv1, 4)?;
        validate_layer("conv2", &conv2, 4)?;
        validate_layer("fc1", &fc1, 2)?;
        validate_layer("fc2", &fc2, 2)?;
        Ok(Self {
            conv1,
            conv2,
            fc1,
            fc2,
        })
    }

    /// All-zero weights with the published shapes
    pub fn zeros_reference() -> Self {
        let [conv1, conv2, fc1, fc2] = reference_shapes();
        Self {
            conv1: Tensor::zeros(&conv1),
            conv2: Tensor::zeros(&conv2),
            fc1: Tensor::zeros(&fc1),
            fc2: Tensor::zeros(&fc2),
        }
    }

    pub fn conv1(&self) -> &Tensor<T> {
        &self.conv1
    }

    pub fn conv2(&self) -> &Tensor<T> {
        &self.conv2
    }

    pub fn fc1(&self) -> &Tensor<T> {
        &self.fc1
    }

    pub fn fc2(&self) -> &Tensor<T> {
        &self.fc2
    }

    /// Layers paired with their names, in pipeline order
    pub fn layers(&self) -> [(&'static str, &Tensor<T>); 4] {
        [
            (LAYER_NAMES[0], &self.conv1),
            (LAYER_NAMES[1], &self.conv2),
            (LAYER_NAMES[2], &self.fc1),
            (LAYER_NAMES[3], &self.fc2),
        ]
    }

    /// Total number of scalar parameters
    pub fn parameter_count(&self) -> usize {
        self.layers().iter().map(|(_, t)| t.len()).sum()
    }

    /// Whether every layer has exactly the published shape
    pub fn has_reference_shapes(&self) -> bool {
        self.layers()
            .iter()
            .zip(reference_shapes().iter())
            .all(|((_, t), shape)| t.shape() == shape.as_slice())
    }

    /// Release the tensors
    pub fn into_parts(self) -> (Tensor<T>, Tensor<T>, Tensor<T>, Tensor<T>) {
        (self.conv1, self.conv2, self.fc1, self.fc2)
    }
}

fn validate_layer<T: Float>(layer: &str, tensor: &Tensor<T>, rank: usize) -> DigitNetResult<()> {
    if tensor.rank() != rank {
        return Err(DigitNetError::invalid_weights(
            layer,
            format!(
                "expected rank {}, got rank {} (shape {:?})",
                rank,
                tensor.rank(),
                tensor.shape()
            ),
        ));
    }
    if let Some(axis) = tensor.shape().iter().position(|&d| d == 0) {
        return Err(DigitNetError::invalid_weights(
            layer,
            format!("dimension {} is zero (shape {:?})", axis, tensor.shape()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_zeros() -> [Tensor<f32>; 4] {
        let [a, b, c, d] = reference_shapes();
        [
            Tensor::zeros(&a),
            Tensor::zeros(&b),
            Tensor::zeros(&c),
            Tensor::zeros(&d),
        ]
    }

    #[test]
    fn test_new_accepts_reference_shapes() {
        let [a, b, c, d] = reference_zeros();
        let w = ModelWeights::new(a, b, c, d).unwrap();
        assert!(w.has_reference_shapes());
        assert_eq!(
            w.parameter_count(),
            5 * 5 * 32 + 5 * 5 * 32 * 64 + 1024 * 128 + 128 * 10
        );
    }

    #[test]
    fn test_wrong_rank_names_layer() {
        let [a, _, c, d] = reference_zeros();
        let err = ModelWeights::new(a, Tensor::zeros(&[5, 5, 32]), c, d).unwrap_err();
        match err {
            DigitNetError::InvalidWeights { layer, reason } => {
                assert_eq!(layer, "conv2");
                assert!(reason.contains("expected rank 4"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let [a, b, c, _] = reference_zeros();
        let err = ModelWeights::new(a, b, c, Tensor::zeros(&[128, 0])).unwrap_err();
        assert!(err.is_invalid_weights());
        assert!(err.to_string().contains("fc2"));
    }

    #[test]
    fn test_dense_layer_must_be_matrix() {
        let [a, b, _, d] = reference_zeros();
        let err = ModelWeights::new(a, b, Tensor::zeros(&[1024]), d).unwrap_err();
        assert!(err.to_string().contains("fc1"));
    }

    #[test]
    fn test_non_reference_shapes_are_valid_weights() {
        let w = ModelWeights::new(
            Tensor::<f64>::ones(&[3, 3, 1, 4]),
            Tensor::ones(&[3, 3, 4, 8]),
            Tensor::ones(&[200, 16]),
            Tensor::ones(&[16, 10]),
        )
        .unwrap();
        assert!(!w.has_reference_shapes());
        assert_eq!(w.layers()[2].0, "fc1");
    }
}
