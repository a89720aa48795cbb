//! Polar stereographic projection, parameterized by the latitude of true
//! scale rather than a central scale factor. The hemisphere follows the sign
//! of that latitude; southern projections are computed by folding onto the
//! north.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::{utility::{dms, GeoMath}, Ellipsoid, Error, Faults, GeodeticPoint, ThisOrThat};

/// Convergence tolerance of the inverse, in radians
const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 30;

#[derive(Clone, Copy, Debug)]
pub struct PolarStereographic {
    ellipsoid: Ellipsoid,
    true_scale_latitude: f64,
    longitude_down: f64,
    false_easting: f64,
    false_northing: f64,
    southern: bool,
    // Longitude down from the pole after folding onto the north, in radians
    origin_longitude: f64,
    es: f64,
    // rho = radius_factor * t
    radius_factor: f64,
    max_radius: f64,
}

impl PolarStereographic {
    /// Builds a projection. Angles are in degrees, offsets in meters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterInvalid`] if the ellipsoid is invalid, the
    /// latitude of true scale is outside `[-90, 90]` or the longitude down from
    /// the pole is outside `[-180, 360]`.
    pub fn new(
        ellipsoid: Ellipsoid,
        true_scale_latitude: f64,
        longitude_down: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<PolarStereographic, Error> {
        ellipsoid.validate()?;

        let qd = f64::from(dms::QD);
        if !(-qd..=qd).contains(&true_scale_latitude) {
            return Err(Error::ParameterInvalid(format!("Latitude of true scale {true_scale_latitude} outside of range [-90, 90]")));
        }
        if !(-f64::from(dms::HD)..=f64::from(dms::TD)).contains(&longitude_down) {
            return Err(Error::ParameterInvalid(format!("Longitude down from pole {longitude_down} outside of range [-180, 360]")));
        }

        let southern = true_scale_latitude < 0.;
        let origin_longitude = southern.ternary(-1., 1.) * longitude_down.ang_normalize().to_radians();

        let a = ellipsoid.a();
        let es = ellipsoid.e2().sqrt();

        let radius_factor = if (true_scale_latitude.abs() - qd).is_zero() {
            // The secant factors below are 0/0 at the pole
            let e4 = ((1. + es).powf(1. + es) * (1. - es).powf(1. - es)).sqrt();
            2. * a / e4
        } else {
            let phi_c = true_scale_latitude.abs().to_radians();
            let (sin_c, cos_c) = phi_c.sin_cos();
            let essin = es * sin_c;
            let mc = cos_c / (1. - essin.powi(2)).sqrt();
            let tc = (FRAC_PI_4 - phi_c / 2.).tan() / pow_es(essin, es);
            a * mc / tc
        };

        Ok(Self {
            ellipsoid,
            true_scale_latitude,
            longitude_down,
            false_easting,
            false_northing,
            southern,
            origin_longitude,
            es,
            radius_factor,
            // Projected distance from the pole to the equator, where t = 1
            max_radius: radius_factor,
        })
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    pub fn true_scale_latitude(&self) -> f64 {
        self.true_scale_latitude
    }

    pub fn longitude_down(&self) -> f64 {
        self.longitude_down
    }

    /// Largest distance from the pole, in meters, that the inverse accepts.
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Projects a point to `(easting, northing)`. The pole itself maps to the
    /// false easting/northing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LatitudeOutOfRange`] outside `[-90, 90]` or in the
    /// wrong hemisphere, and [`Error::LongitudeOutOfRange`] outside `[-180, 360]`.
    pub fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), Error> {
        let qd = f64::from(dms::QD);
        let hd = f64::from(dms::HD);
        let td = f64::from(dms::TD);

        let mut faults = Faults::new();
        faults.check((-qd..=qd).contains(&lat), || Error::LatitudeOutOfRange { latitude: lat, min: -qd, max: qd });
        faults.check((-hd..=td).contains(&lon), || Error::LongitudeOutOfRange { longitude: lon, min: -hd, max: td });
        faults.into_result()?;

        if (lat < 0. && !self.southern) || (lat > 0. && self.southern) {
            let (min, max) = self.southern.ternary((-qd, 0.), (0., qd));
            return Err(Error::LatitudeOutOfRange { latitude: lat, min, max });
        }

        if (lat.abs() - qd).is_zero() {
            return Ok((self.false_easting, self.false_northing));
        }

        let sign = self.southern.ternary(-1., 1.);
        let phi = (sign * lat).to_radians();
        let dlam = (sign * lon.to_radians() - self.origin_longitude).to_degrees().ang_normalize().to_radians();

        let t = (FRAC_PI_4 - phi / 2.).tan() / pow_es(self.es * phi.sin(), self.es);
        let rho = self.radius_factor * t;

        let (sin_dlam, cos_dlam) = dlam.sin_cos();
        let easting = sign * rho * sin_dlam + self.false_easting;
        let northing = -sign * rho * cos_dlam + self.false_northing;

        Ok((easting, northing))
    }

    /// Recovers the point at `(easting, northing)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EastingOutOfRange`] and/or [`Error::NorthingOutOfRange`]
    /// if either axis is further from the pole than the projection radius, and
    /// [`Error::RadiusExceeded`] if the point is outside the projection disk.
    pub fn inverse(&self, easting: f64, northing: f64) -> Result<GeodeticPoint, Error> {
        let r = self.max_radius;

        let mut faults = Faults::new();
        faults.check((self.false_easting - r..=self.false_easting + r).contains(&easting), || {
            Error::EastingOutOfRange { easting, min: self.false_easting - r, max: self.false_easting + r }
        });
        faults.check((self.false_northing - r..=self.false_northing + r).contains(&northing), || {
            Error::NorthingOutOfRange { northing, min: self.false_northing - r, max: self.false_northing + r }
        });
        faults.into_result()?;

        let sign = self.southern.ternary(-1., 1.);
        let dx = sign * (easting - self.false_easting);
        let dy = sign * (northing - self.false_northing);

        let rho = dx.hypot(dy);
        if rho > r {
            return Err(Error::RadiusExceeded { radius: rho, max: r });
        }

        let (lat, lam) = if rho.is_zero() {
            (f64::from(dms::QD), self.origin_longitude)
        } else {
            let (phi, _) = latitude_from_t(rho / self.radius_factor, self.es);

            (phi.clamp(-FRAC_PI_2, FRAC_PI_2).to_degrees(), self.origin_longitude + dx.atan2(-dy))
        };

        let lat = sign * lat;
        let lon = (sign * lam.to_degrees()).ang_normalize();

        Ok(GeodeticPoint::new(lat, lon))
    }
}

/// Latitude in radians with isometric parameter `t`, by fixed-point
/// iteration. Also returns the number of iterations taken.
fn latitude_from_t(t: f64, es: f64) -> (f64, usize) {
    let mut phi = FRAC_PI_2 - 2. * t.atan();
    for iteration in 1..=MAX_ITERATIONS {
        let previous = phi;
        phi = FRAC_PI_2 - 2. * (t * pow_es(es * phi.sin(), es)).atan();
        if (phi - previous).abs() < TOLERANCE {
            return (phi, iteration);
        }
    }
    (phi, MAX_ITERATIONS)
}

/// `((1 - e sin(phi)) / (1 + e sin(phi)))^(e / 2)`
fn pow_es(essin: f64, es: f64) -> f64 {
    ((1. - essin) / (1. + essin)).powf(es / 2.)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const UPS_LAT: f64 = 81.114_528;

    fn ups(north: bool) -> PolarStereographic {
        let lat = north.ternary(UPS_LAT, -UPS_LAT);
        PolarStereographic::new(Ellipsoid::WGS84, lat, 0., 2_000_000., 2_000_000.).unwrap()
    }

    #[test]
    fn pole_maps_to_false_origin() {
        assert_eq!(ups(true).forward(90., 123.).unwrap(), (2_000_000., 2_000_000.));
        assert_eq!(ups(false).forward(-90., -45.).unwrap(), (2_000_000., 2_000_000.));

        let pole = ups(true).inverse(2_000_000., 2_000_000.).unwrap();
        assert_relative_eq!(pole.latitude(), 90.);
        assert_relative_eq!(pole.longitude(), 0.);
    }

    #[test]
    fn scale_near_the_pole_is_ups_scale() {
        // 0.01 degree of meridian at the pole, where the radius of curvature is a^2/b
        let wgs84 = Ellipsoid::WGS84;
        let arc = wgs84.a().powi(2) / wgs84.b() * 0.01_f64.to_radians();

        let (x, y) = ups(true).forward(89.99, 90.).unwrap();
        assert_relative_eq!(x - 2_000_000., 0.994 * arc, epsilon = 5e-2);
        assert_relative_eq!(y, 2_000_000., epsilon = 1e-6);
    }

    #[test]
    fn orientation_follows_hemisphere() {
        let (x, y) = ups(true).forward(85., 0.).unwrap();
        assert_relative_eq!(x, 2_000_000., epsilon = 1e-6);
        assert!(y < 2_000_000.);

        let (x, y) = ups(false).forward(-85., 0.).unwrap();
        assert_relative_eq!(x, 2_000_000., epsilon = 1e-6);
        assert!(y > 2_000_000.);

        let (x, _) = ups(false).forward(-85., 90.).unwrap();
        assert!(x > 2_000_000.);
    }

    #[test]
    fn latitude_iteration_is_bounded() {
        let es = Ellipsoid::WGS84.e2().sqrt();

        let (phi, iterations) = latitude_from_t(0.05, es);
        assert!(iterations < 10, "{iterations}");
        let t = (FRAC_PI_4 - phi / 2.).tan() / pow_es(es * phi.sin(), es);
        assert_relative_eq!(t, 0.05, epsilon = 1e-10);

        // Never converges, so it must stop at the cap
        let (phi, iterations) = latitude_from_t(f64::NAN, es);
        assert!(phi.is_nan());
        assert_eq!(iterations, MAX_ITERATIONS);
    }

    #[test]
    fn inverse_round_trips() {
        for (north, lat, lon) in [
            (true, 72.5, -140.25),
            (true, 84.0, 179.5),
            (true, 89.999, 10.0),
            (false, -72.0, 45.0),
            (false, -80.5, -179.75),
            (false, -88.0, 0.0),
        ] {
            let projection = ups(north);
            let (x, y) = projection.forward(lat, lon).unwrap();
            let point = projection.inverse(x, y).unwrap();
            assert_relative_eq!(point.latitude(), lat, epsilon = 1e-9);
            assert_relative_eq!(point.longitude(), lon, epsilon = 1e-9);
        }
    }

    #[test]
    fn true_scale_at_the_pole_is_continuous() {
        let at_pole = PolarStereographic::new(Ellipsoid::WGS84, 90., 0., 0., 0.).unwrap();
        let near_pole = PolarStereographic::new(Ellipsoid::WGS84, 89.9999, 0., 0., 0.).unwrap();

        let (x1, y1) = at_pole.forward(80., 30.).unwrap();
        let (x2, y2) = near_pole.forward(80., 30.).unwrap();
        assert_relative_eq!(x1, x2, epsilon = 1e-3);
        assert_relative_eq!(y1, y2, epsilon = 1e-3);

        let point = at_pole.inverse(x1, y1).unwrap();
        assert_relative_eq!(point.latitude(), 80., epsilon = 1e-9);
        assert_relative_eq!(point.longitude(), 30., epsilon = 1e-9);
    }

    #[test]
    fn rejects_points_off_the_disk() {
        let projection = ups(true);
        let offset = 0.8 * projection.max_radius();
        assert!(matches!(
            projection.inverse(2_000_000. + offset, 2_000_000. - offset),
            Err(Error::RadiusExceeded { .. })
        ));

        let far = 1.5 * projection.max_radius();
        assert!(matches!(
            projection.inverse(2_000_000. + far, 2_000_000. - far),
            Err(Error::Multiple(errors)) if errors.len() == 2
        ));
    }

    #[test]
    fn rejects_wrong_hemisphere() {
        assert!(matches!(ups(true).forward(-10., 0.), Err(Error::LatitudeOutOfRange { .. })));
        assert!(matches!(ups(false).forward(10., 0.), Err(Error::LatitudeOutOfRange { .. })));
        assert!(matches!(ups(true).forward(80., 400.), Err(Error::LongitudeOutOfRange { .. })));
    }

    #[test]
    fn validates_parameters() {
        assert!(matches!(
            PolarStereographic::new(Ellipsoid::WGS84, 95., 0., 0., 0.),
            Err(Error::ParameterInvalid(_))
        ));
        assert!(matches!(
            PolarStereographic::new(Ellipsoid::WGS84, 80., -200., 0., 0.),
            Err(Error::ParameterInvalid(_))
        ));
        assert!(matches!(
            PolarStereographic::new(Ellipsoid::new(6e6, 1. / 100.), 80., 0., 0., 0.),
            Err(Error::ParameterInvalid(_))
        ));
    }
}
