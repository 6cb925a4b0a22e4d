use approx::assert_abs_diff_eq;
use geomag::location::error::LocationError;
use geomag::location::geoid::UndulationGrid;
use geomag::model::coefficients::{CoefficientSet, ModelSource};
use geomag::model::error::EvaluationError;
use geomag::model::{evaluate, evaluate_with};
use geomag::sweep::dataset::Dataset;
use geomag::sweep::{par_sweep, SweepConfig, SweepRange};
use geomag::{
    DecimalYear, EvaluationOptions, FieldWarning, HeightReference, Location, LowFieldZone,
    MagneticField,
};
use std::fs;

fn wmm2020(latitude: f64, longitude: f64, height_km: f64, time: f64) -> MagneticField {
    let location = Location::from_geodetic(latitude, longitude, height_km * 1000.0).unwrap();
    evaluate(
        CoefficientSet::built_in().unwrap(),
        &location,
        DecimalYear::new(time),
    )
    .unwrap()
}

/// Published WMM2020 test values, heights above the ellipsoid
#[test]
fn published_test_values() {
    let field = wmm2020(80.0, 0.0, 0.0, 2020.0);
    let (x, y, z, dx, dy, dz) = field.ellipsoidal();
    assert_abs_diff_eq!(x, 6570.4, epsilon = 0.5);
    assert_abs_diff_eq!(y, -146.3, epsilon = 0.5);
    assert_abs_diff_eq!(z, 54606.0, epsilon = 0.5);
    assert_abs_diff_eq!(field.f(), 55000.1, epsilon = 0.5);
    assert_abs_diff_eq!(field.d(), -1.28, epsilon = 0.01);
    assert_abs_diff_eq!(field.i(), 83.14, epsilon = 0.01);
    assert_abs_diff_eq!(dx, -16.2, epsilon = 0.1);
    assert_abs_diff_eq!(dy, 59.0, epsilon = 0.1);
    assert_abs_diff_eq!(dz, 43.0, epsilon = 0.1);

    let field = wmm2020(0.0, 120.0, 0.0, 2020.0);
    assert_abs_diff_eq!(field.x(), 39624.3, epsilon = 0.5);
    assert_abs_diff_eq!(field.y(), 109.9, epsilon = 0.5);
    assert_abs_diff_eq!(field.z(), -10932.5, epsilon = 0.5);
    assert_abs_diff_eq!(field.f(), 41104.9, epsilon = 0.5);

    let field = wmm2020(-80.0, 240.0, 0.0, 2020.0);
    assert_abs_diff_eq!(field.x(), 5940.6, epsilon = 0.5);
    assert_abs_diff_eq!(field.y(), 15772.1, epsilon = 0.5);
    assert_abs_diff_eq!(field.z(), -52480.8, epsilon = 0.5);
    assert_abs_diff_eq!(field.f(), 55120.6, epsilon = 0.5);

    let field = wmm2020(80.0, 0.0, 100.0, 2020.0);
    assert_abs_diff_eq!(field.x(), 6261.8, epsilon = 0.5);
    assert_abs_diff_eq!(field.y(), -185.5, epsilon = 0.5);
    assert_abs_diff_eq!(field.z(), 52429.1, epsilon = 0.5);

    let field = wmm2020(0.0, 120.0, 0.0, 2022.5);
    assert_abs_diff_eq!(field.x(), 39684.7, epsilon = 0.5);
    assert_abs_diff_eq!(field.y(), -42.2, epsilon = 0.5);
    assert_abs_diff_eq!(field.z(), -10809.5, epsilon = 0.5);
    assert_abs_diff_eq!(field.f(), 41130.5, epsilon = 0.5);
    assert_abs_diff_eq!(field.d(), -0.06, epsilon = 0.01);
    assert_abs_diff_eq!(field.i(), -15.24, epsilon = 0.01);

    let field = wmm2020(-80.0, 240.0, 0.0, 2022.5);
    assert_abs_diff_eq!(field.x(), 6016.5, epsilon = 0.5);
    assert_abs_diff_eq!(field.y(), 15776.7, epsilon = 0.5);
    assert_abs_diff_eq!(field.z(), -52251.6, epsilon = 0.5);
}

#[test]
fn total_intensity_matches_components() {
    for (lat, lon, h, t) in [(45.0, 280.0, 1.0, 2022.5), (-33.0, 151.0, 0.0, 2021.0)] {
        let field = wmm2020(lat, lon, h, t);
        let (x, y, z, ..) = field.ellipsoidal();
        let f2 = field.f() * field.f();
        assert_abs_diff_eq!(f2, x * x + y * y + z * z, epsilon = 1e-3);
        assert_abs_diff_eq!(f2, field.h() * field.h() + z * z, epsilon = 1e-3);
        let (xs, ys, zs, ..) = field.spherical();
        assert_abs_diff_eq!(f2, xs * xs + ys * ys + zs * zs, epsilon = 1e-3);
    }
}

#[test]
fn longitude_domain() {
    assert!(matches!(
        Location::from_geodetic(10.0, 400.0, 0.0),
        Err(LocationError::Range(_))
    ));
    assert!(matches!(
        Location::from_geodetic(10.0, -200.0, 0.0),
        Err(LocationError::Range(_))
    ));
    let location = Location::from_geodetic(10.0, -90.0, 0.0).unwrap();
    assert_eq!(location.longitude(), 270.0);

    // -90 and 270 are the same point
    let west = evaluate(
        CoefficientSet::built_in().unwrap(),
        &location,
        DecimalYear::new(2021.0),
    )
    .unwrap();
    let east = wmm2020(10.0, 270.0, 0.0, 2021.0);
    assert_eq!(west.ellipsoidal(), east.ellipsoidal());
}

#[test]
fn zeroed_secular_variation_at_epoch() {
    let model = CoefficientSet::built_in().unwrap();
    let frozen = model.zero_secular();
    let location = Location::from_geodetic(-45.0, 170.0, 2000.0).unwrap();
    let time = DecimalYear::new(model.epoch());
    let live = evaluate(model, &location, time).unwrap();
    let still = evaluate(&frozen, &location, time).unwrap();
    let (x, y, z, ..) = live.ellipsoidal();
    let (xf, yf, zf, dx, dy, dz) = still.ellipsoidal();
    assert_abs_diff_eq!(x, xf, epsilon = 1e-9);
    assert_abs_diff_eq!(y, yf, epsilon = 1e-9);
    assert_abs_diff_eq!(z, zf, epsilon = 1e-9);
    assert_eq!((dx, dy, dz), (0.0, 0.0, 0.0));
}

#[test]
fn extrapolation_matches_pre_extrapolated_coefficients() {
    let model = CoefficientSet::built_in().unwrap();
    let time = DecimalYear::new(2023.7);
    let shifted = model.extrapolated_to(time);
    let location = Location::from_geodetic(60.0, 25.0, 300.0).unwrap();
    let direct = evaluate(model, &location, time).unwrap();
    let from_shifted = evaluate(&shifted, &location, time).unwrap();
    let a = direct.ellipsoidal();
    let b = from_shifted.ellipsoidal();
    assert_abs_diff_eq!(a.0, b.0, epsilon = 1e-6);
    assert_abs_diff_eq!(a.1, b.1, epsilon = 1e-6);
    assert_abs_diff_eq!(a.2, b.2, epsilon = 1e-6);
    assert_abs_diff_eq!(a.3, b.3, epsilon = 1e-9);
    assert_abs_diff_eq!(a.5, b.5, epsilon = 1e-9);
}

#[test]
fn outside_validity() {
    let model = CoefficientSet::built_in().unwrap();
    let location = Location::from_geodetic(0.0, 120.0, 0.0).unwrap();
    let late = DecimalYear::new(2026.5);

    let field = evaluate(model, &location, late).unwrap();
    assert!(field
        .warnings()
        .iter()
        .any(|w| matches!(w, FieldWarning::OutsideValidity { .. })));

    let strict = EvaluationOptions {
        strict_validity: true,
    };
    assert!(matches!(
        evaluate_with(model, &location, late, &strict),
        Err(EvaluationError::OutsideValidity { .. })
    ));
}

#[test]
fn low_field_zones() {
    // Close to the north dip pole
    let blackout = wmm2020(86.0, 165.0, 0.0, 2020.0);
    assert!(blackout.h() < 2000.0);
    assert_eq!(blackout.low_field_zone(), Some(LowFieldZone::Blackout));
    assert!(blackout.err_d() > 10.0 && blackout.err_d() <= 180.0);
    assert!(blackout.warnings().iter().any(|w| w
        .to_string()
        .contains("Compass readings have VERY LARGE uncertainties")));

    let caution = wmm2020(82.0, 165.0, 0.0, 2020.0);
    assert_eq!(caution.low_field_zone(), Some(LowFieldZone::Caution));

    let normal = wmm2020(45.0, 280.0, 0.0, 2020.0);
    assert_eq!(normal.low_field_zone(), None);
    assert!(normal.warnings().is_empty());
    assert_abs_diff_eq!(normal.err_x(), 131.0);
    assert!(normal.err_d() < 1.0);
}

#[test]
fn grid_variation() {
    let field = wmm2020(80.0, 0.0, 0.0, 2020.0);
    assert!(field.grid_variation_applies());
    assert_abs_diff_eq!(field.gv(), field.d(), epsilon = 1e-12);
    assert_eq!(field.err_gv(), field.err_d());

    let south = wmm2020(-80.0, 240.0, 0.0, 2020.0);
    let expected = (south.d() + 240.0 + 180.0).rem_euclid(360.0) - 180.0;
    assert_abs_diff_eq!(south.gv(), expected, epsilon = 1e-9);
    assert!(south.gv() > -180.0 && south.gv() <= 180.0);
}

#[test]
fn mean_sea_level_heights() {
    let (location, gap) = Location::from_mean_sea_level(45.0, 10.0, 500.0).unwrap();
    assert!(gap.is_none());
    assert_eq!(location.height_reference(), HeightReference::MeanSeaLevel);
    let (height, gap) = location.height_above_msl().unwrap();
    assert!(gap.is_none());
    assert_abs_diff_eq!(height, 500.0, epsilon = 1e-6);
    assert!((location.height_above_ellipsoid() - 500.0).abs() < 120.0);

    let field =
        geomag::evaluate_mean_sea_level(45.0, 10.0, 500.0, DecimalYear::new(2021.0)).unwrap();
    assert!(field.warnings().is_empty());
}

#[test]
fn mean_sea_level_reference_point() {
    let field =
        geomag::evaluate_mean_sea_level(0.0, 120.0, 0.0, DecimalYear::new(2022.5)).unwrap();
    // Sea level sits 55 m above the ellipsoid here
    assert_abs_diff_eq!(field.location().height_above_ellipsoid(), 55.0, epsilon = 1e-6);
    assert!(field.warnings().is_empty());
    assert_abs_diff_eq!(field.x(), 39683.6, epsilon = 0.5);
    assert_abs_diff_eq!(field.y(), -42.2, epsilon = 0.5);
    assert_abs_diff_eq!(field.z(), -10809.2, epsilon = 0.5);
    assert_abs_diff_eq!(field.f(), 41129.4, epsilon = 0.5);
    assert_abs_diff_eq!(field.d(), -0.06, epsilon = 0.01);
    assert_abs_diff_eq!(field.i(), -15.24, epsilon = 0.01);

    let on_ellipsoid = wmm2020(0.0, 120.0, 0.0, 2022.5);
    assert_abs_diff_eq!(field.x(), on_ellipsoid.x(), epsilon = 1.5);
    assert!(field.f() < on_ellipsoid.f());
}

#[test]
fn coverage_gaps_are_attached_not_fatal() {
    let regional = UndulationGrid::parse(
        "40 50 -10 10 5 10
         1 2 3
         4 5 6
         7 8 9",
    )
    .unwrap();
    let (location, gap) =
        Location::from_mean_sea_level_with(&regional, 60.0, 0.0, 100.0).unwrap();
    let gap = gap.expect("point north of the grid has no coverage");
    assert_abs_diff_eq!(location.height_above_ellipsoid(), 102.0, epsilon = 1e-9);

    let field = evaluate(
        CoefficientSet::built_in().unwrap(),
        &location,
        DecimalYear::new(2021.0),
    )
    .unwrap()
    .with_coverage_gap(Some(gap.clone()));
    assert!(field.f() > 0.0);
    assert_eq!(field.warnings(), vec![FieldWarning::Coverage(gap)]);
}

#[test]
fn coefficients_from_file() {
    let path = std::env::temp_dir().join("geomag_test_dipole.cof");
    fs::write(
        &path,
        "    2015.0            TEST-DIPOLE     01/01/2015
  1  0  -30000.0       0.0       10.0        0.0
  1  1   -2000.0    5000.0        5.0      -20.0
999999999999999999999999999999999999999999999999
999999999999999999999999999999999999999999999999
",
    )
    .unwrap();
    let model = CoefficientSet::load(&ModelSource::File(path.clone())).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(model.name(), "TEST-DIPOLE");
    assert_eq!(model.max_degree(), 1);
    assert_eq!((model.valid_from(), model.valid_until()), (2015.0, 2020.0));
    let location = Location::from_geodetic(0.0, 0.0, 0.0).unwrap();
    assert!(evaluate(&model, &location, DecimalYear::new(2016.0))
        .unwrap()
        .warnings()
        .is_empty());
}

#[test]
fn sweep_writes_column_oriented_json() {
    let config = SweepConfig {
        latitude: SweepRange::new(-10.0, 10.1, 10.0),
        longitude: SweepRange::new(0.0, 360.0, 90.0),
        altitude: 1000.0,
        height_reference: HeightReference::Ellipsoid,
        secular_variation: true,
        ..SweepConfig::equator(DecimalYear::new(2021.0))
    };
    let outcome = par_sweep(
        CoefficientSet::built_in().unwrap(),
        UndulationGrid::built_in().unwrap(),
        &config,
    )
    .unwrap();
    assert!(outcome.failures.is_empty());

    let path = std::env::temp_dir().join("geomag_test_sweep.json");
    outcome.dataset.write_json(&path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let reread = Dataset::read_json(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let object = json.as_object().unwrap();
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    for key in ["latitude", "longitude", "altitude", "bx", "by", "bz", "dbx", "dby", "dbz"] {
        assert!(keys.contains(&key), "{key}");
        assert_eq!(object[key].as_array().unwrap().len(), 12);
    }
    assert_eq!(keys.len(), 9);
    assert_eq!(reread, outcome.dataset);
    assert_eq!(
        reread.column("longitude").unwrap()[..4],
        [0.0, 90.0, 180.0, 270.0]
    );
    assert!(reread
        .column("altitude")
        .unwrap()
        .iter()
        .all(|h| (h - 1000.0).abs() < 1e-6));
}
