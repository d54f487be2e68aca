//! Dense tensor container
//!
//! `Tensor<T>` is the single data structure every pipeline stage reads and
//! writes: a contiguous row-major buffer with a fixed shape, backed by
//! scirs2_core's dynamic-dimensionality arrays.
//!
//! # Layout
//!
//! Storage is always kept in standard (C-contiguous) layout. Kernels rely on
//! this to index the flat buffer directly, and [`Tensor::reshape`] is a pure
//! reinterpretation of that buffer.

use crate::error::{DigitNetError, DigitNetResult};
use scirs2_core::ndarray_ext::{Array, ArrayView, IxDyn};
use scirs2_core::numeric::{Float, Num};
use std::fmt;

/// Dense N-dimensional tensor in row-major layout
///
/// # Type Parameters
///
/// * `T` - The element type (the pipeline runs on `f32`; tests often use `f64`)
///
/// # Examples
///
/// ```
/// use digitnet_core::Tensor;
///
/// let tensor = Tensor::<f32>::zeros(&[2, 28, 28, 1]);
/// assert_eq!(tensor.shape(), &[2, 28, 28, 1]);
/// assert_eq!(tensor.rank(), 4);
/// assert_eq!(tensor.len(), 2 * 28 * 28);
/// ```
#[derive(Clone, PartialEq)]
pub struct Tensor<T> {
    data: Array<T, IxDyn>,
}

impl<T> Tensor<T>
where
    T: Clone + Num,
{
    /// Create a tensor from an existing array, copying into standard layout if needed
    pub fn from_array(array: Array<T, IxDyn>) -> Self {
        if array.is_standard_layout() {
            Self { data: array }
        } else {
            Self {
                data: array.as_standard_layout().into_owned(),
            }
        }
    }

    /// Create a tensor from a row-major vector with the given shape
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `vec.len()` differs from the product of `shape`.
    ///
    /// # Examples
    ///
    /// ```
    /// use digitnet_core::Tensor;
    ///
    /// let tensor = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// assert_eq!(tensor[&[1, 0]], 4.0);
    ///
    /// assert!(Tensor::from_vec(vec![1.0, 2.0], &[3]).is_err());
    /// ```
    pub fn from_vec(vec: Vec<T>, shape: &[usize]) -> DigitNetResult<Self> {
        let total: usize = shape.iter().product();
        if vec.len() != total {
            return Err(DigitNetError::shape_mismatch(
                "Tensor::from_vec",
                format!("{} elements for shape {:?}", total, shape),
                vec![vec.len()],
            ));
        }
        let array = Array::from_shape_vec(IxDyn(shape), vec).map_err(|e| {
            DigitNetError::shape_mismatch("Tensor::from_vec", e.to_string(), shape.to_vec())
        })?;
        Ok(Self { data: array })
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    /// Create a tensor filled with ones
    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: Array::ones(IxDyn(shape)),
        }
    }

    /// Create a tensor with every element set to `value`
    pub fn from_elem(shape: &[usize], value: T) -> Self {
        Self {
            data: Array::from_elem(IxDyn(shape), value),
        }
    }

    /// Create a tensor whose elements are computed from their flat row-major offset
    ///
    /// # Examples
    ///
    /// ```
    /// use digitnet_core::Tensor;
    ///
    /// let t = Tensor::from_fn(&[2, 3], |i| i as f64);
    /// assert_eq!(t.as_slice(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    /// ```
    pub fn from_fn<F>(shape: &[usize], f: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        let total: usize = shape.iter().product();
        let values: Vec<T> = (0..total).map(f).collect();
        match Array::from_shape_vec(IxDyn(shape), values) {
            Ok(data) => Self { data },
            Err(_) => unreachable!("from_fn generates exactly product(shape) elements"),
        }
    }

    /// Rank (number of axes)
    pub fn rank(&self) -> usize {
        self.data.ndim()
    }

    /// Shape of the tensor
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the tensor has zero elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major element buffer
    pub fn as_slice(&self) -> &[T] {
        match self.data.as_slice() {
            Some(slice) => slice,
            None => unreachable!("tensor storage is always in standard layout"),
        }
    }

    /// Mutable row-major element buffer
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self.data.as_slice_mut() {
            Some(slice) => slice,
            None => unreachable!("tensor storage is always in standard layout"),
        }
    }

    /// Copy the elements out in row-major order
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }

    /// Borrow the underlying array
    pub fn as_array(&self) -> &Array<T, IxDyn> {
        &self.data
    }

    /// Read-only view of the underlying array
    pub fn view(&self) -> ArrayView<'_, T, IxDyn> {
        self.data.view()
    }

    /// Consume the tensor and return the underlying array
    pub fn into_array(self) -> Array<T, IxDyn> {
        self.data
    }

    /// Consume the tensor and return its elements in row-major order
    pub fn into_vec(self) -> Vec<T> {
        self.data.into_iter().collect()
    }

    /// Element at a multi-index, or `None` if the index is out of bounds or has the wrong rank
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        if index.len() != self.rank() {
            return None;
        }
        self.data.get(IxDyn(index))
    }

    /// Reinterpret the buffer under a new shape, copying the data
    ///
    /// Element order is unchanged; only the shape descriptor differs.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the element counts differ.
    pub fn reshape(&self, new_shape: &[usize]) -> DigitNetResult<Self> {
        self.clone().into_reshaped(new_shape)
    }

    /// Reinterpret the buffer under a new shape without copying
    pub fn into_reshaped(self, new_shape: &[usize]) -> DigitNetResult<Self> {
        let new_size: usize = new_shape.iter().product();
        if new_size != self.len() {
            return Err(DigitNetError::shape_mismatch(
                "Tensor::reshape",
                format!("{} elements for shape {:?}", new_size, new_shape),
                self.shape().to_vec(),
            ));
        }
        let data = self
            .data
            .into_shape_with_order(IxDyn(new_shape))
            .map_err(|e| {
                DigitNetError::shape_mismatch("Tensor::reshape", e.to_string(), new_shape.to_vec())
            })?;
        Ok(Self { data })
    }

    /// Collapse every axis after the batch axis: (B, d1, ..., dn) -> (B, d1 * ... * dn)
    ///
    /// Feature order is the row-major order of the trailing axes, last axis fastest.
    ///
    /// # Examples
    ///
    /// ```
    /// use digitnet_core::Tensor;
    ///
    /// let t = Tensor::<f32>::zeros(&[3, 4, 4, 64]);
    /// let flat = t.flatten_batch().unwrap();
    /// assert_eq!(flat.shape(), &[3, 1024]);
    /// ```
    pub fn flatten_batch(self) -> DigitNetResult<Self> {
        if self.rank() < 2 {
            return Err(DigitNetError::shape_mismatch(
                "flatten_batch",
                "rank >= 2 with a leading batch axis",
                self.shape().to_vec(),
            ));
        }
        let batch = self.shape()[0];
        let features: usize = self.shape()[1..].iter().product();
        self.into_reshaped(&[batch, features])
    }

    /// Apply `f` to every element, producing a new tensor of the same shape
    pub fn map<F>(&self, f: F) -> Self
    where
        F: FnMut(&T) -> T,
    {
        Self {
            data: self.data.map(f),
        }
    }

    /// Apply `f` to every element in place
    pub fn map_inplace<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T),
    {
        self.as_mut_slice().iter_mut().for_each(|x| f(x));
    }
}

impl<T> Tensor<T>
where
    T: Float,
{
    /// Shape equality plus element-wise absolute tolerance
    ///
    /// # Examples
    ///
    /// ```
    /// use digitnet_core::Tensor;
    ///
    /// let a = Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
    /// let b = Tensor::from_vec(vec![1.0 + 1e-9, 2.0], &[2]).unwrap();
    /// assert!(a.approx_eq(&b, 1e-6));
    /// ```
    pub fn approx_eq(&self, other: &Self, tol: T) -> bool {
        self.shape() == other.shape()
            && self
                .as_slice()
                .iter()
                .zip(other.as_slice())
                .all(|(&a, &b)| (a - b).abs() <= tol)
    }

    /// Largest absolute element difference, or `None` when shapes differ
    pub fn max_abs_diff(&self, other: &Self) -> Option<T> {
        if self.shape() != other.shape() {
            return None;
        }
        Some(
            self.as_slice()
                .iter()
                .zip(other.as_slice())
                .fold(T::zero(), |acc, (&a, &b)| acc.max((a - b).abs())),
        )
    }
}

impl<T> std::ops::Index<&[usize]> for Tensor<T> {
    type Output = T;
    fn index(&self, index: &[usize]) -> &Self::Output {
        &self.data[IxDyn(index)]
    }
}

impl<T> std::ops::IndexMut<&[usize]> for Tensor<T> {
    fn index_mut(&mut self, index: &[usize]) -> &mut Self::Output {
        &mut self.data[IxDyn(index)]
    }
}

impl<T: fmt::Debug> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.data.shape())
            .field("data", &self.data)
            .finish()
    }
}
