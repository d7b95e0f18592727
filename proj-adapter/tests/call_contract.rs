use std::{sync::Arc, thread};

use approx::assert_abs_diff_eq;
use proj_adapter::{fwd, inv, transform, Point, ProjError, Projection, Transformation};

const MERC_WGS84: &str = "+proj=merc +ellps=WGS84";
const LONGLAT_WGS84: &str = "+proj=longlat +datum=WGS84 +no_defs";
const UTM31: &str = "+proj=utm +zone=31 +datum=WGS84 +no_defs";
const UTM32: &str = "+proj=utm +zone=32 +datum=WGS84 +no_defs";
const ORTHO: &str = "+proj=ortho +R=6370997 +lat_0=0 +lon_0=0";

#[test]
fn forward_then_inverse_round_trips() {
    let merc = Projection::new(MERC_WGS84).unwrap();
    for (lng, lat) in [(0.0, 0.0), (139.767, 35.681), (-73.985, 40.758), (151.2, -33.86)] {
        let mut point = Point::new(lng, lat);
        fwd(&merc, &mut point).unwrap();
        assert_eq!(merc.last_error(), None);
        inv(&merc, &mut point).unwrap();
        assert_eq!(merc.last_error(), None);
        assert_abs_diff_eq!(point.x, lng, epsilon = 1e-9);
        assert_abs_diff_eq!(point.y, lat, epsilon = 1e-9);
    }
}

#[test]
fn origin_matches_engine_computation() {
    let merc = Projection::new(MERC_WGS84).unwrap();
    let mut point = Point::new(0.0, 0.0);
    fwd(&merc, &mut point).unwrap();
    assert_abs_diff_eq!(point.x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(point.y, 0.0, epsilon = 1e-9);

    // Same origin through the CRS-to-CRS path, which takes degrees directly.
    let utm = Projection::new(UTM31).unwrap();
    let mut projected = Point::new(0.0, 0.0);
    fwd(&utm, &mut projected).unwrap();

    let longlat = Projection::new(LONGLAT_WGS84).unwrap();
    let mut x = [0.0];
    let mut y = [0.0];
    transform(&longlat, &utm, 1, &mut x, &mut y, None).unwrap();
    assert_abs_diff_eq!(projected.x, x[0], epsilon = 1e-6);
    assert_abs_diff_eq!(projected.y, y[0], epsilon = 1e-6);
    assert_abs_diff_eq!(projected.x, 166021.44, epsilon = 1e-2);
}

#[test]
fn out_of_domain_latitude_is_reported() {
    let merc = Projection::new(MERC_WGS84).unwrap();
    let mut point = Point::new(0.0, 100.0);
    let err = fwd(&merc, &mut point).unwrap_err();
    assert!(matches!(err, ProjError::Engine { .. }));
    assert!(!err.message().is_empty());
    assert_eq!(merc.last_error(), Some(err.message()));
}

#[test]
fn register_reflects_the_latest_call_only() {
    let ortho = Projection::new(ORTHO).unwrap();

    let mut bad_latitude = Point::new(0.0, 100.0);
    let first = fwd(&ortho, &mut bad_latitude).unwrap_err();
    assert_eq!(ortho.last_error(), Some(first.message()));

    // Beyond the visible disc, a different failure from the one above.
    let mut off_disc = Point::new(1e7, 0.0);
    let second = inv(&ortho, &mut off_disc).unwrap_err();
    assert_ne!(first.code(), second.code());
    assert_ne!(first.message(), second.message());
    assert_eq!(ortho.last_error(), Some(second.message()));

    let mut good = Point::new(10.0, 10.0);
    fwd(&ortho, &mut good).unwrap();
    assert_eq!(ortho.last_error(), None);
}

#[test]
fn concurrent_callers_see_their_own_outcome() {
    let merc = Arc::new(Projection::new(MERC_WGS84).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let merc = Arc::clone(&merc);
            thread::spawn(move || {
                for j in 0..200 {
                    let fails = (i + j) % 2 == 0;
                    let lat = if fails { 100.0 } else { 45.0 };
                    let mut point = Point::new(5.0, lat);
                    let result = fwd(&merc, &mut point);
                    assert_eq!(result.is_err(), fails, "thread {i} call {j}");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn absent_elevation_is_not_zero_elevation() {
    let longlat = Projection::new(LONGLAT_WGS84).unwrap();
    let utm = Projection::new(UTM32).unwrap();
    let transformation = Transformation::new(&longlat, &utm).unwrap();

    let mut x = [9.0, 9.5];
    let mut y = [0.0, 10.0];
    transformation.transform(2, &mut x, &mut y, None).unwrap();
    assert_abs_diff_eq!(x[0], 500000.0, epsilon = 1e-6);

    let mut x = [9.0, 9.5];
    let mut y = [0.0, 10.0];
    let mut z = [0.0, 0.0];
    transformation
        .transform(2, &mut x, &mut y, Some(&mut z))
        .unwrap();
    assert_abs_diff_eq!(x[0], 500000.0, epsilon = 1e-6);
    assert_eq!(z, [0.0, 0.0]);
}

#[test]
fn failing_batch_reports_engine_message() {
    let longlat = Projection::new(LONGLAT_WGS84).unwrap();
    let utm = Projection::new(UTM32).unwrap();
    let transformation = Transformation::new(&longlat, &utm).unwrap();

    let mut x = [9.0, 9.0];
    let mut y = [0.0, 100.0];
    let err = transformation
        .transform(2, &mut x, &mut y, None)
        .unwrap_err();
    assert!(matches!(err, ProjError::Engine { context: "proj_trans_generic", .. }));
    assert!(!err.message().is_empty());
    assert_eq!(transformation.last_error(), Some(err.message()));

    let mut x = [9.0];
    let mut y = [0.0];
    transformation.transform(1, &mut x, &mut y, None).unwrap();
    assert_eq!(transformation.last_error(), None);
}

#[test]
fn empty_batch_succeeds_untouched() {
    let longlat = Projection::new(LONGLAT_WGS84).unwrap();
    let utm = Projection::new(UTM32).unwrap();

    let mut x = [1.0, 2.0];
    let mut y = [3.0, 4.0];
    let mut z = [5.0, 6.0];
    transform(&longlat, &utm, 0, &mut x, &mut y, Some(&mut z)).unwrap();
    assert_eq!(x, [1.0, 2.0]);
    assert_eq!(y, [3.0, 4.0]);
    assert_eq!(z, [5.0, 6.0]);

    transform(&longlat, &utm, 0, &mut [], &mut [], None).unwrap();
}
