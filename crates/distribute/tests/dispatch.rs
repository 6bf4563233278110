//! Behaviour of the distribution dispatcher across steps.

use approx::assert_abs_diff_eq;
use gridcast_distribute::{DistributeConfig, DistributeError, Distribution};
use gridcast_spatial::{Method, Mode, RasterGrid, SpatialError, StationSet, TrendConstraint, VariogramModel};
use ndarray::Array2;

fn stations() -> StationSet {
    StationSet::new(
        vec!["east".into(), "north".into(), "peak".into(), "west".into()],
        vec![4000.0, 2000.0, 2000.0, 0.0],
        vec![0.0, 4000.0, 1500.0, 0.0],
        vec![1400.0, 1900.0, 2800.0, 1100.0],
    )
    .unwrap()
}

fn grid() -> RasterGrid {
    let x: Vec<f64> = (0..9).map(|i| i as f64 * 500.0).collect();
    let y: Vec<f64> = (0..9).map(|i| i as f64 * 500.0).collect();
    let dem = Array2::from_shape_fn((9, 9), |(r, c)| 1000.0 + 120.0 * r as f64 + 60.0 * c as f64);
    let mask = Array2::from_shape_fn((9, 9), |(r, _)| r < 6);
    RasterGrid::from_axes(&x, &y, dem).unwrap().with_mask(mask).unwrap()
}

fn all_methods() -> Vec<DistributeConfig> {
    vec![
        DistributeConfig::new(Method::Idw).with_detrend(TrendConstraint::Unconstrained),
        DistributeConfig::new(Method::DetrendedKriging).with_grid_mask(true),
        DistributeConfig::new(Method::Grid)
            .with_detrend(TrendConstraint::NegativeOnly)
            .with_grid_mode(Mode::Nearest),
        DistributeConfig::new(Method::Grid)
            .with_detrend(TrendConstraint::Unconstrained)
            .with_local(3),
        DistributeConfig::new(Method::Kriging).with_variogram(VariogramModel::Exponential {
            nugget: 0.1,
            sill: 9.0,
            range: 6000.0,
        }),
    ]
}

#[test]
fn distribute_is_idempotent() {
    let values = [3.0, -1.0, -6.5, 4.0];
    for config in all_methods() {
        let mut d = Distribution::initialize("air_temp", config, &stations(), &grid()).unwrap();
        let first = d.distribute(&values).unwrap().clone();
        let second = d.distribute(&values).unwrap().clone();
        assert_eq!(first.shape(), &[9, 9]);
        for (a, b) in first.iter().zip(second.iter()) {
            assert!(a == b || (a.is_nan() && b.is_nan()));
        }
    }
}

#[test]
fn output_is_clamped_to_bounds() {
    let config = DistributeConfig::new(Method::Idw).with_bounds(0.0, 2.0);
    let mut d = Distribution::initialize("rh", config, &stations(), &grid()).unwrap();
    let out = d.distribute(&[-5.0, 1.0, 9.0, 1.5]).unwrap();

    let mut saw_min = false;
    let mut saw_max = false;
    for &v in out.iter() {
        assert!((0.0..=2.0).contains(&v));
        saw_min |= v == 0.0;
        saw_max |= v == 2.0;
    }
    assert!(saw_min && saw_max);
}

#[test]
fn nan_cells_stay_nan_after_clamping() {
    // Linear interpolation leaves cells outside the station hull as NaN.
    let config = DistributeConfig::new(Method::Grid).with_bounds(-1.0, 1.0);
    let mut d = Distribution::initialize("wind", config, &stations(), &grid()).unwrap();
    let out = d.distribute(&[0.5, 3.0, -3.0, 0.0]).unwrap();
    assert!(out[[8, 0]].is_nan());
    assert!(out.iter().filter(|v| !v.is_nan()).all(|v| (-1.0..=1.0).contains(v)));
}

#[test]
fn all_null_keeps_previous_output() {
    let mut d = Distribution::initialize(
        "precip",
        DistributeConfig::new(Method::Idw),
        &stations(),
        &grid(),
    )
    .unwrap();
    let before = d.distribute(&[1.0, 2.0, 3.0, 4.0]).unwrap().clone();

    let err = d.distribute(&[f64::NAN; 4]).unwrap_err();
    assert!(matches!(err, DistributeError::AllNull { ref name } if name == "precip"));
    assert_eq!(d.output(), Some(&before));
}

#[test]
fn wrong_length_is_rejected() {
    let mut d = Distribution::initialize(
        "precip",
        DistributeConfig::new(Method::Idw),
        &stations(),
        &grid(),
    )
    .unwrap();
    assert!(matches!(
        d.distribute(&[1.0, 2.0]),
        Err(DistributeError::LengthMismatch { expected: 4, got: 2, .. })
    ));
    assert!(d.output().is_none());
}

#[test]
fn kriging_stores_unclamped_variance() {
    let config = DistributeConfig::new(Method::Kriging)
        .with_variogram(VariogramModel::Spherical {
            nugget: 0.0,
            sill: 50.0,
            range: 8000.0,
        })
        .with_bounds(0.0, 0.001);
    let mut d = Distribution::initialize("air_temp", config, &stations(), &grid()).unwrap();
    assert!(d.variance().is_none());

    d.distribute(&[3.0, -1.0, -6.5, 4.0]).unwrap();
    let variance = d.variance().unwrap();
    assert_eq!(d.variance_name(), "air_temp_variance");
    // West station sits on cell (0, 0).
    assert_abs_diff_eq!(variance[[0, 0]], 0.0, epsilon = 1e-9);
    assert!(variance.iter().any(|&v| v > 0.001));
}

#[test]
fn non_kriging_has_no_variance() {
    let mut d = Distribution::initialize(
        "t",
        DistributeConfig::new(Method::DetrendedKriging),
        &stations(),
        &grid(),
    )
    .unwrap();
    d.distribute(&[3.0, -1.0, -6.5, 4.0]).unwrap();
    assert!(d.variance().is_none());
}

#[test]
fn null_station_is_skipped() {
    let mut d = Distribution::initialize(
        "t",
        DistributeConfig::new(Method::Grid).with_grid_mode(Mode::Nearest),
        &stations(),
        &grid(),
    )
    .unwrap();
    let out = d.distribute(&[1.0, 2.0, f64::NAN, 4.0]).unwrap();
    assert!(out.iter().all(|&v| v == 1.0 || v == 2.0 || v == 4.0));
}

#[test]
fn unknown_method_name_is_a_config_error() {
    assert!(matches!(
        "splines".parse::<Method>(),
        Err(SpatialError::UnknownMethod { .. })
    ));
}

#[test]
fn invalid_config_fails_initialize() {
    let config = DistributeConfig::new(Method::Idw).with_bounds(10.0, -10.0);
    assert!(matches!(
        Distribution::initialize("t", config, &stations(), &grid()),
        Err(DistributeError::InvalidConfig { .. })
    ));
}

#[test]
fn grid_mask_without_mask_raster_fails_initialize() {
    let x: Vec<f64> = (0..9).map(|i| i as f64 * 500.0).collect();
    let dem = Array2::from_elem((9, 9), 1500.0);
    let unmasked = RasterGrid::from_axes(&x, &x, dem).unwrap();
    let configs = [
        DistributeConfig::new(Method::Grid)
            .with_detrend(TrendConstraint::Unconstrained)
            .with_grid_mask(true),
        DistributeConfig::new(Method::DetrendedKriging).with_grid_mask(true),
    ];
    for config in configs {
        assert!(matches!(
            Distribution::initialize("air_temp", config, &stations(), &unmasked),
            Err(DistributeError::Spatial(SpatialError::MissingMask))
        ));
    }
    let config = DistributeConfig::new(Method::Grid).with_detrend(TrendConstraint::Unconstrained);
    assert!(Distribution::initialize("air_temp", config, &stations(), &unmasked).is_ok());
}

#[test]
fn distribution_is_send_and_sync() {
    fn assert_impl<T: Send + Sync>() {}
    assert_impl::<Distribution>();
}
