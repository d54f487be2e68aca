//! Integration tests for digitnet-core
//!
//! These tests exercise the tensor container the way the pipeline stages use it.

use digitnet_core::{DigitNetError, ShapeNhwc, Tensor};

#[test]
fn test_nhwc_offsets_agree_with_indexing() {
    let t = Tensor::from_fn(&[2, 3, 4, 5], |i| i as f64);
    let s = ShapeNhwc::from_shape("test", t.shape()).unwrap();

    for b in 0..2 {
        for h in 0..3 {
            for w in 0..4 {
                for c in 0..5 {
                    assert_eq!(t.as_slice()[s.offset(b, h, w, c)], t[&[b, h, w, c]]);
                }
            }
        }
    }
}

#[test]
fn test_flatten_matches_dense_weight_row_order() {
    // Feature k of sample b is X[b, h, w, m] with k = (h * W + w) * M + m
    let (b, h, w, m) = (2, 4, 4, 3);
    let t = Tensor::from_fn(&[b, h, w, m], |i| i as f32);
    let s = ShapeNhwc::from_shape("test", t.shape()).unwrap();
    let flat = t.clone().flatten_batch().unwrap();

    for bi in 0..b {
        for hi in 0..h {
            for wi in 0..w {
                for mi in 0..m {
                    let k = (hi * w + wi) * m + mi;
                    assert_eq!(flat[&[bi, k]], t.as_slice()[s.offset(bi, hi, wi, mi)]);
                }
            }
        }
    }
}

#[test]
fn test_errors_are_typed() {
    match Tensor::from_vec(vec![0.0f32; 3], &[2, 2]) {
        Err(DigitNetError::ShapeMismatch { operation, .. }) => {
            assert_eq!(operation, "Tensor::from_vec")
        }
        other => panic!("expected shape mismatch, got {:?}", other),
    }
}
