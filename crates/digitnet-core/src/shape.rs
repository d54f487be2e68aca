//! Typed views of the two rank-4 layouts used by the network
//!
//! Activations are NHWC: (batch, height, width, channels).
//! Convolution kernels are (filter height, filter width, in channels, out channels).

use crate::error::{DigitNetError, DigitNetResult};

/// Extents of an NHWC activation tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeNhwc {
    pub batch: usize,
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl ShapeNhwc {
    pub fn new(batch: usize, height: usize, width: usize, channels: usize) -> Self {
        Self {
            batch,
            height,
            width,
            channels,
        }
    }

    /// Parse a rank-4 shape slice
    ///
    /// # Examples
    ///
    /// ```
    /// use digitnet_core::ShapeNhwc;
    ///
    /// let s = ShapeNhwc::from_shape("conv", &[2, 28, 28, 1]).unwrap();
    /// assert_eq!(s.height, 28);
    /// assert!(ShapeNhwc::from_shape("conv", &[28, 28]).is_err());
    /// ```
    pub fn from_shape(operation: &str, shape: &[usize]) -> DigitNetResult<Self> {
        match *shape {
            [batch, height, width, channels] => Ok(Self::new(batch, height, width, channels)),
            _ => Err(DigitNetError::shape_mismatch(
                operation,
                "rank 4 (batch, height, width, channels)",
                shape.to_vec(),
            )),
        }
    }

    /// Row-major flat offset of `[b, h, w, c]`
    #[inline]
    pub fn offset(&self, b: usize, h: usize, w: usize, c: usize) -> usize {
        ((b * self.height + h) * self.width + w) * self.channels + c
    }

    /// Number of elements in one sample
    pub fn sample_len(&self) -> usize {
        self.height * self.width * self.channels
    }

    pub fn len(&self) -> usize {
        self.batch * self.sample_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec(&self) -> Vec<usize> {
        vec![self.batch, self.height, self.width, self.channels]
    }
}

/// Extents of a convolution kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelShape {
    pub height: usize,
    pub width: usize,
    pub in_channels: usize,
    pub out_channels: usize,
}

impl KernelShape {
    pub fn new(height: usize, width: usize, in_channels: usize, out_channels: usize) -> Self {
        Self {
            height,
            width,
            in_channels,
            out_channels,
        }
    }

    /// Parse a rank-4 kernel shape slice
    pub fn from_shape(operation: &str, shape: &[usize]) -> DigitNetResult<Self> {
        match *shape {
            [height, width, in_channels, out_channels] => {
                Ok(Self::new(height, width, in_channels, out_channels))
            }
            _ => Err(DigitNetError::shape_mismatch(
                operation,
                "rank 4 kernel (filter_h, filter_w, in_channels, out_channels)",
                shape.to_vec(),
            )),
        }
    }

    /// Row-major flat offset of `[p, q, c, m]`
    #[inline]
    pub fn offset(&self, p: usize, q: usize, c: usize, m: usize) -> usize {
        ((p * self.width + q) * self.in_channels + c) * self.out_channels + m
    }

    /// Length of one receptive field: `height * width * in_channels`
    pub fn patch_len(&self) -> usize {
        self.height * self.width * self.in_channels
    }

    pub fn to_vec(&self) -> Vec<usize> {
        vec![self.height, self.width, self.in_channels, self.out_channels]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nhwc_offset_matches_row_major() {
        let s = ShapeNhwc::new(2, 3, 4, 5);
        assert_eq!(s.offset(0, 0, 0, 0), 0);
        assert_eq!(s.offset(0, 0, 0, 1), 1);
        assert_eq!(s.offset(0, 0, 1, 0), 5);
        assert_eq!(s.offset(0, 1, 0, 0), 20);
        assert_eq!(s.offset(1, 0, 0, 0), 60);
        assert_eq!(s.offset(1, 2, 3, 4), s.len() - 1);
    }

    #[test]
    fn test_kernel_offset_and_patch_len() {
        let k = KernelShape::new(5, 5, 32, 64);
        assert_eq!(k.patch_len(), 800);
        assert_eq!(k.offset(0, 0, 1, 0), 64);
        assert_eq!(k.offset(4, 4, 31, 63), 5 * 5 * 32 * 64 - 1);
    }

    #[test]
    fn test_from_shape_rank_errors() {
        assert!(ShapeNhwc::from_shape("op", &[1, 2, 3]).is_err());
        assert!(KernelShape::from_shape("op", &[1, 2, 3, 4, 5]).is_err());
        assert_eq!(
            KernelShape::from_shape("op", &[5, 5, 1, 32]).unwrap().to_vec(),
            vec![5, 5, 1, 32]
        );
    }
}
