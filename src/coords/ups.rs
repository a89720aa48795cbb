use std::fmt::Display;

use crate::{
    constants::{
        UPS_FALSE_EASTING, UPS_FALSE_NORTHING, UPS_MAX_EAST_NORTH, UPS_MAX_SOUTH_LAT, UPS_MIN_EAST_NORTH,
        UPS_MIN_NORTH_LAT, UPS_TRUE_SCALE_LAT,
    },
    log::debug,
    projections::polar_stereographic::PolarStereographic,
    utility::dms,
    Ellipsoid, Error, Faults, GeodeticPoint, Hemisphere, Mgrs, ThisOrThat,
};

/// Representation of a
/// [UPS](https://en.wikipedia.org/wiki/Universal_polar_stereographic_coordinate_system)
/// coordinate, covering the polar caps north of 72°N and south of 72°S.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ups {
    pub(crate) hemisphere: Hemisphere,
    pub(crate) easting: f64,
    pub(crate) northing: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub(crate) ellipsoid: Ellipsoid,
}

impl Ups {
    /// Internal-only constructor that doesn't check the coordinate
    pub(crate) fn new(hemisphere: Hemisphere, easting: f64, northing: f64, ellipsoid: Ellipsoid) -> Ups {
        Self {
            hemisphere,
            easting,
            northing,
            ellipsoid,
        }
    }

    /// Tries to create a WGS84 UPS point from its constituent parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EastingOutOfRange`] and/or [`Error::NorthingOutOfRange`]
    /// if either value is outside `[0, 4000000]`.
    ///
    /// ```
    /// use gridref::{Hemisphere, Ups};
    ///
    /// let coord = Ups::create(Hemisphere::North, 2_000_000.0, 1_500_000.0).unwrap();
    /// assert!(coord.is_north());
    ///
    /// assert!(Ups::create(Hemisphere::South, -1.0, 1_500_000.0).is_err());
    /// ```
    pub fn create(hemisphere: Hemisphere, easting: f64, northing: f64) -> Result<Ups, Error> {
        check_coords(easting, northing)?;
        Ok(Ups::new(hemisphere, easting, northing, Ellipsoid::WGS84))
    }

    /// Reinterprets the coordinate as lying on another ellipsoid.
    pub fn with_ellipsoid(self, ellipsoid: Ellipsoid) -> Ups {
        Ups {
            ellipsoid,
            ..self
        }
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    pub fn is_north(&self) -> bool {
        self.hemisphere.is_north()
    }

    pub fn easting(&self) -> f64 {
        self.easting
    }

    pub fn northing(&self) -> f64 {
        self.northing
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    /// Projects a WGS84 point in one of the polar caps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LatitudeOutOfRange`] if the point is between 72°S and 72°N.
    ///
    /// ```
    /// use gridref::{GeodeticPoint, Ups};
    ///
    /// let pole = GeodeticPoint::create(90.0, 0.0).unwrap();
    /// let ups = Ups::from_geodetic(&pole).unwrap();
    /// assert_eq!((ups.easting(), ups.northing()), (2_000_000.0, 2_000_000.0));
    ///
    /// let oslo = GeodeticPoint::create(59.91, 10.75).unwrap();
    /// assert!(Ups::from_geodetic(&oslo).is_err());
    /// ```
    pub fn from_geodetic(value: &GeodeticPoint) -> Result<Ups, Error> {
        Ups::from_geodetic_on(value, Ellipsoid::WGS84)
    }

    /// Same as [`Ups::from_geodetic`], projecting on `ellipsoid`.
    ///
    /// # Errors
    ///
    /// Same as [`Ups::from_geodetic`].
    pub fn from_geodetic_on(value: &GeodeticPoint, ellipsoid: Ellipsoid) -> Result<Ups, Error> {
        let lat = value.latitude();
        let hemisphere = Hemisphere::from_latitude(lat);

        check_latitude(lat, hemisphere, 0.)?;

        let (easting, northing) = projection(ellipsoid, hemisphere)?.forward(lat, value.longitude())?;

        debug!(%hemisphere, easting, northing, "projected to UPS");

        Ok(Ups::new(hemisphere, easting, northing, ellipsoid))
    }

    /// Converts from [`Ups`] to [`GeodeticPoint`].
    ///
    /// # Errors
    ///
    /// Returns easting/northing range errors, or [`Error::LatitudeOutOfRange`] if
    /// the recovered latitude lies outside the coordinate's polar cap.
    ///
    /// ```
    /// use gridref::{Hemisphere, Ups};
    ///
    /// let coord = Ups::create(Hemisphere::South, 2_000_000.0, 2_000_000.0).unwrap();
    /// assert_eq!(coord.to_geodetic().unwrap().latitude(), -90.0);
    /// ```
    pub fn to_geodetic(&self) -> Result<GeodeticPoint, Error> {
        check_coords(self.easting, self.northing)?;

        let point = projection(self.ellipsoid, self.hemisphere)?.inverse(self.easting, self.northing)?;
        check_latitude(point.latitude(), self.hemisphere, CAP_TOLERANCE)?;

        Ok(point)
    }

    /// Converts from [`Ups`] to [`Mgrs`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::PrecisionOutOfRange`] if `precision` is not in `[0, 5]`.
    pub fn to_mgrs(&self, precision: i32) -> Result<Mgrs, Error> {
        Mgrs::from_ups(self, precision)
    }
}

fn projection(ellipsoid: Ellipsoid, hemisphere: Hemisphere) -> Result<PolarStereographic, Error> {
    PolarStereographic::new(
        ellipsoid,
        hemisphere.is_north().ternary(UPS_TRUE_SCALE_LAT, -UPS_TRUE_SCALE_LAT),
        0.,
        UPS_FALSE_EASTING,
        UPS_FALSE_NORTHING,
    )
}

/// Inverse projection drift allowed past the edge of a cap, in degrees
const CAP_TOLERANCE: f64 = 1e-9;

fn check_latitude(lat: f64, hemisphere: Hemisphere, tolerance: f64) -> Result<(), Error> {
    let qd = f64::from(dms::QD);
    let (min, max) = hemisphere.is_north().ternary((UPS_MIN_NORTH_LAT, qd), (-qd, UPS_MAX_SOUTH_LAT));

    if (min - tolerance..=max + tolerance).contains(&lat) {
        Ok(())
    } else {
        Err(Error::LatitudeOutOfRange { latitude: lat, min, max })
    }
}

pub(crate) fn check_coords(easting: f64, northing: f64) -> Result<(), Error> {
    let mut faults = Faults::new();
    faults.check((UPS_MIN_EAST_NORTH..=UPS_MAX_EAST_NORTH).contains(&easting), || Error::EastingOutOfRange {
        easting,
        min: UPS_MIN_EAST_NORTH,
        max: UPS_MAX_EAST_NORTH,
    });
    faults.check((UPS_MIN_EAST_NORTH..=UPS_MAX_EAST_NORTH).contains(&northing), || Error::NorthingOutOfRange {
        northing,
        min: UPS_MIN_EAST_NORTH,
        max: UPS_MAX_EAST_NORTH,
    });
    faults.into_result()
}

impl Display for Ups {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:.3} {:.3}",
            self.hemisphere,
            self.easting,
            self.northing
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn round_trips_in_both_caps() {
        for (lat, lon) in [(72., 10.), (85.5, -135.), (89.9, 179.), (-72., -10.), (-84.25, 60.), (-89.99, -179.)] {
            let point = GeodeticPoint::create(lat, lon).unwrap();
            let ups = Ups::from_geodetic(&point).unwrap();
            assert_eq!(ups.is_north(), lat > 0.);

            let back = ups.to_geodetic().unwrap();
            assert_relative_eq!(back.latitude(), lat, epsilon = 1e-9);
            assert_relative_eq!(back.longitude(), lon, epsilon = 1e-9);
        }
    }

    #[test]
    fn cap_edges_survive_a_round_trip() {
        for (lat, lon) in [(72., 10.), (-72., -10.), (72., -135.), (-72., 45.)] {
            let ups = Ups::from_geodetic(&GeodeticPoint::create(lat, lon).unwrap()).unwrap();
            let back = ups.to_geodetic().unwrap();
            assert_relative_eq!(back.latitude(), lat, epsilon = 1e-9);
        }

        // Just past the edge is still a real error
        let point = GeodeticPoint::create(71.9999, 45.).unwrap();
        let (easting, northing) = projection(Ellipsoid::WGS84, Hemisphere::North)
            .unwrap()
            .forward(point.latitude(), point.longitude())
            .unwrap();
        let outside = Ups::create(Hemisphere::North, easting, northing).unwrap();
        assert!(matches!(outside.to_geodetic(), Err(Error::LatitudeOutOfRange { .. })));
    }

    #[test]
    fn rejects_temperate_latitudes() {
        for lat in [71.9, 0., -71.9] {
            let point = GeodeticPoint::create(lat, 0.).unwrap();
            assert!(matches!(Ups::from_geodetic(&point), Err(Error::LatitudeOutOfRange { .. })));
        }
    }

    #[test]
    fn decode_checks_the_cap() {
        // The corner of the grid is about 2,800 km from the pole
        let corner = Ups::create(Hemisphere::North, 0., 0.).unwrap();
        assert!(matches!(
            corner.to_geodetic(),
            Err(Error::LatitudeOutOfRange { min, .. }) if min == UPS_MIN_NORTH_LAT
        ));
    }

    #[test]
    fn create_collects_faults() {
        let err = Ups::create(Hemisphere::North, 4_000_001., -1.).unwrap_err();
        assert_eq!(err.faults().len(), 2);
    }

    #[test]
    fn display() {
        let ups = Ups::create(Hemisphere::South, 2_000_000., 1_234_567.891_2).unwrap();
        assert_eq!(ups.to_string(), "S 2000000.000 1234567.891");
    }
}
