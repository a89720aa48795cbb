use approx::assert_relative_eq;

use gridref::{
    geodetic_to_mgrs, geodetic_to_ups, geodetic_to_utm, mgrs_to_geodetic, ups_to_geodetic, utm_to_geodetic,
    Datum, Error, GeodeticPoint, Hemisphere, Mgrs, Utm,
};

/// Points on a coarse, irregular grid covering every latitude band and the
/// polar caps up to 86 degrees.
fn sweep() -> impl Iterator<Item = (f64, f64)> {
    (0..47).flat_map(|i| {
        let lat = -86.0 + 3.66 * f64::from(i) + 0.013;
        (0..50).map(move |j| (lat, -179.9 + 7.19 * f64::from(j)))
    })
}

fn round_trip_error(lat: f64, lon: f64, precision: i32) -> f64 {
    let point = GeodeticPoint::create(lat, lon).unwrap();
    let mgrs = geodetic_to_mgrs(lat, lon, precision).unwrap();
    let back = mgrs_to_geodetic(&mgrs).unwrap();

    point.haversine(back.value())
}

#[test]
fn round_trip_within_one_meter() {
    let mut count = 0;
    let mut worst = 0_f64;

    for (lat, lon) in sweep() {
        let mgrs = geodetic_to_mgrs(lat, lon, 5).unwrap();
        let back = mgrs_to_geodetic(&mgrs).unwrap();
        assert!(back.is_clean(), "{mgrs} raised {:?}", back.warnings());

        let error = GeodeticPoint::create(lat, lon).unwrap().haversine(back.value());
        assert!(error < 1.0, "{lat} {lon} -> {mgrs} is off by {error}m");

        worst = worst.max(error);
        count += 1;
    }

    println!("Worst error over {count} points: {worst}m");
}

#[test]
fn precision_bounds_the_error() {
    let points = [
        (0.0, 0.0),
        (40.748333, -73.985278),
        (-33.8688, 151.2093),
        (-60.25, -45.5),
        (70.5, 100.25),
        (88.0, -30.0),
        (-85.0, 120.0),
    ];

    for (lat, lon) in points {
        let mut previous_bound = f64::INFINITY;
        for precision in 0..=5 {
            // Half the diagonal of a cell, plus scale factor and sphere slack
            let bound = 0.75 * 10_f64.powi(5 - precision);
            let error = round_trip_error(lat, lon, precision);

            assert!(error <= bound, "{lat} {lon} at precision {precision} is off by {error}m");
            assert!(bound < previous_bound);
            previous_bound = bound;
        }
    }
}

#[test]
fn formatting_is_stable() {
    for (lat, lon) in sweep().step_by(7) {
        let point = GeodeticPoint::create(lat, lon).unwrap();
        for precision in [0, 3, 5] {
            let first = Mgrs::from_geodetic(&point, precision).unwrap();
            let second = Mgrs::from_geodetic(&point, precision).unwrap();
            assert_eq!(first, second);

            let text = first.to_string();
            assert_eq!(text.parse::<Mgrs>().unwrap().to_string(), text);

            if let Ok(utm) = Utm::from_geodetic(&point) {
                if first.is_utm() {
                    assert_eq!(Mgrs::from_utm(&utm, precision).unwrap().to_string(), text);
                }
            }
        }
    }
}

#[test]
fn letters_never_include_i_or_o() {
    for (lat, lon) in sweep() {
        let mgrs = geodetic_to_mgrs(lat, lon, 0).unwrap();
        let letters = mgrs.trim_start_matches(|c: char| c.is_ascii_digit());
        assert_eq!(letters.len(), 3, "{mgrs}");
        assert!(!letters.contains(|c| c == 'I' || c == 'O'), "{mgrs}");
    }

    assert!(matches!(mgrs_to_geodetic("31NAI6602100000"), Err(Error::MalformedMgrs(_))));
    assert!(matches!(mgrs_to_geodetic("31NOA6602100000"), Err(Error::MalformedMgrs(_))));
}

#[test]
fn reference_values() {
    assert_eq!(geodetic_to_mgrs(0.0, 0.0, 5).unwrap(), "31NAA6602100000");
    assert_eq!(geodetic_to_mgrs(40.748333, -73.985278, 5).unwrap(), "18TWL8566411315");
    assert_eq!(geodetic_to_mgrs(90.0, 0.0, 5).unwrap(), "ZAH0000000000");
    assert_eq!(geodetic_to_mgrs(-90.0, 0.0, 5).unwrap(), "BAN0000000000");

    let utm = geodetic_to_utm(0.0, 0.0, Datum::Wgs84).unwrap();
    assert_eq!(utm.zone(), 31);
    assert_relative_eq!(utm.easting(), 166_021.443, epsilon = 1e-3);
    assert_relative_eq!(utm.northing(), 0.0, epsilon = 1e-6);

    let point = utm_to_geodetic(18, Hemisphere::North, 585_664.121, 4_511_315.422).unwrap();
    assert!(point.is_clean());
    assert_relative_eq!(point.value().latitude(), 40.748333, epsilon = 1e-6);
    assert_relative_eq!(point.value().longitude(), -73.985278, epsilon = 1e-6);
}

#[test]
fn norway_exception() {
    let utm = geodetic_to_utm(60.5, 5.0, Datum::Wgs84).unwrap();
    assert_eq!(utm.zone(), 32);
    assert!(geodetic_to_mgrs(60.5, 5.0, 5).unwrap().starts_with("32V"));
}

#[test]
fn poles_route_through_ups() {
    let mgrs = geodetic_to_mgrs(89.5, 12.3, 5).unwrap();
    assert!(!mgrs.starts_with(|c: char| c.is_ascii_digit()), "{mgrs}");
    assert!(round_trip_error(89.5, 12.3, 5) < 1.0);

    let ups = geodetic_to_ups(-85.0, 120.0).unwrap();
    assert_eq!(ups.hemisphere(), Hemisphere::South);
    let back = ups_to_geodetic(ups.hemisphere(), ups.easting(), ups.northing()).unwrap();
    assert_relative_eq!(back.latitude(), -85.0, epsilon = 1e-9);
    assert_relative_eq!(back.longitude(), 120.0, epsilon = 1e-9);

    assert!(matches!(geodetic_to_ups(45.0, 0.0), Err(Error::LatitudeOutOfRange { .. })));
    assert!(matches!(geodetic_to_utm(87.0, 0.0, Datum::Wgs84), Err(Error::LatitudeOutOfRange { .. })));
}

#[test]
fn invalid_input_is_reported() {
    assert_eq!(geodetic_to_mgrs(0.0, 0.0, 6), Err(Error::PrecisionOutOfRange(6)));
    assert!(matches!(geodetic_to_mgrs(91.0, 0.0, 5), Err(Error::LatitudeOutOfRange { .. })));
    assert!(matches!(geodetic_to_mgrs(0.0, 181.0, 5), Err(Error::LongitudeOutOfRange { .. })));

    assert_eq!(
        utm_to_geodetic(61, Hemisphere::North, 500_000.0, 0.0),
        Err(Error::ZoneOutOfRange(61))
    );
    let err = utm_to_geodetic(18, Hemisphere::North, 10.0, -10.0).unwrap_err();
    assert_eq!(err.faults().len(), 2);

    let err = ups_to_geodetic(Hemisphere::North, -1.0, 5_000_000.0).unwrap_err();
    assert_eq!(err.faults().len(), 2);
}

#[test]
fn nad27_shifts_the_projection() {
    let wgs84 = geodetic_to_utm(38.0, -97.0, Datum::Wgs84).unwrap();
    let nad27 = geodetic_to_utm(38.0, -97.0, Datum::Nad27).unwrap();

    assert_eq!(wgs84.zone(), nad27.zone());
    let moved = (wgs84.easting() - nad27.easting()).hypot(wgs84.northing() - nad27.northing());
    assert!(moved > 1.0 && moved < 500.0, "moved {moved}m");

    // NAD27 grids use the older lettering
    let mgrs = Mgrs::from_utm(&nad27, 5).unwrap();
    assert_ne!(mgrs.row(), Mgrs::from_utm(&wgs84, 5).unwrap().row());
}
