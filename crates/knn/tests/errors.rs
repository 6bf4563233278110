//! Integration tests for KnnError variants.

use gridcast_knn::{KnnConfig, KnnError, NeighborIndex};

#[test]
fn error_empty_points() {
    let result = NeighborIndex::new(&[], &[]);
    assert!(matches!(result, Err(KnnError::EmptyPoints)));
}

#[test]
fn error_length_mismatch() {
    let result = NeighborIndex::new(&[0.0, 1.0, 2.0], &[0.0, 1.0]);
    assert!(matches!(
        result,
        Err(KnnError::CoordinateLengthMismatch { x: 3, y: 2 })
    ));
}

#[test]
fn error_nan_coordinate() {
    let result = NeighborIndex::new(&[0.0, f64::NAN], &[0.0, 1.0]);
    assert!(matches!(
        result,
        Err(KnnError::NonFiniteCoordinate { index: 1 })
    ));
}

#[test]
fn error_inf_coordinate() {
    let result = NeighborIndex::new(&[0.0, 1.0], &[f64::INFINITY, 1.0]);
    assert!(matches!(
        result,
        Err(KnnError::NonFiniteCoordinate { index: 0 })
    ));
}

#[test]
fn error_invalid_k() {
    let index = NeighborIndex::new(&[0.0], &[0.0]).unwrap();
    let result = index.neighborhoods(&KnnConfig::new(0));
    assert!(matches!(result, Err(KnnError::InvalidK { k: 0 })));
}
