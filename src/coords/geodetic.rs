use std::fmt::Display;

use crate::{Angle, Error, Mgrs, Ups, Utm};

/// Mean radius of Earth in meters
///
/// <https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius>
const EARTH_MEAN_RADIUS_M: f64 = 6371.0088 * 1000.0;

/// A geodetic latitude/longitude point, with an optional elevation that has
/// no effect on any projection. Can be converted to/from [`Utm`], [`Ups`] and
/// [`Mgrs`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeodeticPoint {
    #[cfg_attr(feature = "serde", serde(alias = "lat"))]
    pub(crate) latitude: Angle,
    #[cfg_attr(feature = "serde", serde(alias = "lon"))]
    pub(crate) longitude: Angle,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub(crate) elevation: Option<f64>,
}

impl GeodeticPoint {
    /// Internal-only constructor that doesn't check the bounds of lat/lon
    pub(crate) fn new(lat: f64, lon: f64) -> GeodeticPoint {
        Self {
            latitude: Angle::from_degrees(lat),
            longitude: Angle::from_degrees(lon),
            elevation: None,
        }
    }

    /// Tries to create a point from a lat/lon pair in degrees. First checks if the
    /// values are valid:
    /// * Latitude must be in range [-90,90]
    /// * Longitude must be in range [-180,180]
    ///
    /// # Errors
    ///
    /// Returns [`Error::LatitudeOutOfRange`] or [`Error::LongitudeOutOfRange`].
    ///
    /// # Usage
    ///
    /// ```
    /// use gridref::GeodeticPoint;
    ///
    /// let coord = GeodeticPoint::create(40.748333, -73.985278).unwrap();
    ///
    /// assert_eq!(coord.latitude(), 40.748333);
    /// assert_eq!(coord.longitude(), -73.985278);
    ///
    /// assert!(GeodeticPoint::create(100.0, 0.0).is_err());
    /// assert!(GeodeticPoint::create(0.0, -200.0).is_err());
    /// ```
    pub fn create(lat: f64, lon: f64) -> Result<GeodeticPoint, Error> {
        GeodeticPoint::from_angles(Angle::from_degrees(lat), Angle::from_degrees(lon))
    }

    /// Same as [`GeodeticPoint::create`], from [`Angle`]s.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LatitudeOutOfRange`] or [`Error::LongitudeOutOfRange`].
    pub fn from_angles(latitude: Angle, longitude: Angle) -> Result<GeodeticPoint, Error> {
        if !latitude.is_valid_latitude() {
            Err(Error::LatitudeOutOfRange { latitude: latitude.degrees(), min: -90., max: 90. })
        } else if !longitude.is_valid_longitude() {
            Err(Error::LongitudeOutOfRange { longitude: longitude.degrees(), min: -180., max: 180. })
        } else {
            Ok(GeodeticPoint {
                latitude,
                longitude,
                elevation: None,
            })
        }
    }

    /// Attaches an elevation in meters.
    pub fn with_elevation(self, elevation: f64) -> GeodeticPoint {
        GeodeticPoint {
            elevation: Some(elevation),
            ..self
        }
    }

    /// Returns the latitude in degrees.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude.degrees()
    }

    /// Returns the longitude in degrees.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude.degrees()
    }

    #[inline]
    pub fn latitude_angle(&self) -> Angle {
        self.latitude
    }

    #[inline]
    pub fn longitude_angle(&self) -> Angle {
        self.longitude
    }

    #[inline]
    pub fn elevation(&self) -> Option<f64> {
        self.elevation
    }

    /// Returns whether the current point is in the northern hemisphere.
    ///
    /// ```
    /// use gridref::GeodeticPoint;
    ///
    /// let coord = GeodeticPoint::create(40.748333, -73.985278).unwrap();
    /// assert!(coord.is_north());
    ///
    /// let coord = GeodeticPoint::create(-40.748333, -73.985278).unwrap();
    /// assert!(!coord.is_north());
    /// ```
    pub fn is_north(&self) -> bool {
        self.latitude().is_sign_positive()
    }

    /// Returns the distance in meters between two points
    /// using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
    /// Uses the [mean radius of the Earth](https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius)
    /// in the calculation: `6371.0088`
    pub fn haversine(&self, other: &GeodeticPoint) -> f64 {
        let lat1_r = self.latitude.radians();
        let lat2_r = other.latitude.radians();

        2.0 * EARTH_MEAN_RADIUS_M * (
            ((other.latitude - self.latitude).radians() / 2.0).sin().powi(2) +
            lat1_r.cos() * lat2_r.cos() *
            ((other.longitude - self.longitude).radians() / 2.0).sin().powi(2)
        ).sqrt().asin()
    }

    /// Converts from [`GeodeticPoint`] to WGS84 [`Utm`]
    ///
    /// # Errors
    ///
    /// Returns an error if the point is outside the UTM latitude band.
    ///
    /// # Usage
    ///
    /// ```
    /// use gridref::{GeodeticPoint, Hemisphere};
    ///
    /// let coord = GeodeticPoint::create(40.748333, -73.985278).unwrap();
    /// let converted = coord.to_utm().unwrap();
    ///
    /// assert_eq!(converted.zone(), 18);
    /// assert_eq!(converted.hemisphere(), Hemisphere::North);
    /// // Check if the converted coordinate is accurate to 3 decimals (same as reference)
    /// assert!((converted.easting() - 585664.121).abs() < 1e-3);
    /// assert!((converted.northing() - 4511315.422).abs() < 1e-3);
    /// ```
    pub fn to_utm(&self) -> Result<Utm, Error> {
        Utm::from_geodetic(self)
    }

    /// Converts from [`GeodeticPoint`] to WGS84 [`Ups`]
    ///
    /// # Errors
    ///
    /// Returns an error if the point is outside the polar caps.
    pub fn to_ups(&self) -> Result<Ups, Error> {
        Ups::from_geodetic(self)
    }

    /// Converts from [`GeodeticPoint`] to [`Mgrs`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::PrecisionOutOfRange`] if `precision` is not in `[0, 5]`.
    ///
    /// # Usage
    ///
    /// ```
    /// use gridref::GeodeticPoint;
    ///
    /// let coord = GeodeticPoint::create(40.748333, -73.985278).unwrap();
    /// let converted = coord.to_mgrs(5).unwrap();
    ///
    /// assert_eq!(converted.to_string(), "18TWL8566411315");
    /// ```
    pub fn to_mgrs(&self, precision: i32) -> Result<Mgrs, Error> {
        Mgrs::from_geodetic(self, precision)
    }
}

impl Display for GeodeticPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = ryu::Buffer::new();
        let lat = buf.format(self.latitude());
        let mut buf = ryu::Buffer::new();
        let lon = buf.format(self.longitude());
        write!(
            f,
            "{lat} {lon}",
        )?;
        if let Some(elevation) = self.elevation {
            let mut buf = ryu::Buffer::new();
            write!(f, " {}", buf.format(elevation))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn accepts_boundaries() {
        assert!(GeodeticPoint::create(90.0, 180.0).is_ok());
        assert!(GeodeticPoint::create(-90.0, -180.0).is_ok());
        assert!(matches!(
            GeodeticPoint::create(-90.5, 0.0),
            Err(Error::LatitudeOutOfRange { .. })
        ));
        assert!(matches!(
            GeodeticPoint::create(0.0, 180.5),
            Err(Error::LongitudeOutOfRange { .. })
        ));
    }

    #[test]
    fn elevation_is_carried_along() {
        let point = GeodeticPoint::create(1.5, 2.25).unwrap().with_elevation(10.0);
        assert_eq!(point.elevation(), Some(10.0));
        assert_eq!(point.to_string(), "1.5 2.25 10.0");
        assert_eq!(GeodeticPoint::new(1.5, 2.25).to_string(), "1.5 2.25");
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        let a = GeodeticPoint::create(0.0, 0.0).unwrap();
        let b = GeodeticPoint::create(1.0, 0.0).unwrap();
        assert_relative_eq!(a.haversine(&b), 111_195.08, epsilon = 1e-1);
    }
}
