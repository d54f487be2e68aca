//! Execution settings for the forward pass
//!
//! These settings choose how stages compute, never which stages run: the
//! layer sequence and the pool size are fixed.

use digitnet_kernels::{ConvAlgorithm, PoolRemainder};

/// Forward pass configuration
///
/// # Examples
///
/// ```
/// use digitnet_kernels::{ConvAlgorithm, PoolRemainder};
/// use digitnet_model::ForwardConfig;
///
/// let config = ForwardConfig::new()
///     .with_conv_algorithm(ConvAlgorithm::Im2col)
///     .with_parallel(false);
/// assert_eq!(config.pool_remainder, PoolRemainder::Reject);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForwardConfig {
    /// Convolution implementation
    pub conv_algorithm: ConvAlgorithm,
    /// Spread convolution samples across threads (needs the `parallel` feature)
    pub parallel: bool,
    /// Behaviour for feature maps not divisible by the pool size
    pub pool_remainder: PoolRemainder,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            conv_algorithm: ConvAlgorithm::Direct,
            parallel: cfg!(feature = "parallel"),
            pool_remainder: PoolRemainder::Reject,
        }
    }
}

impl ForwardConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the convolution algorithm
    pub fn with_conv_algorithm(mut self, algorithm: ConvAlgorithm) -> Self {
        self.conv_algorithm = algorithm;
        self
    }

    /// Request batch-parallel convolution
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the pooling remainder policy
    pub fn with_pool_remainder(mut self, remainder: PoolRemainder) -> Self {
        self.pool_remainder = remainder;
        self
    }

    /// Whether convolutions will actually run in parallel in this build
    pub fn runs_parallel(&self) -> bool {
        self.parallel && cfg!(feature = "parallel")
    }
}
