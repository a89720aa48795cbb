use std::{fmt::Display, str::FromStr};

use crate::{
    constants::{
        MAXUTMZONE, MINUTMZONE, UTM_MAX_EASTING, UTM_MAX_LAT, UTM_MAX_NORTHING, UTM_MIN_EASTING,
        UTM_MIN_LAT, UTM_MIN_NORTHING, UTM_FALSE_NORTHING_SOUTH,
    },
    log::debug,
    projections::transverse_mercator::TransverseMercator,
    utility::{dms, GeoMath},
    Checked, Datum, Ellipsoid, Error, Faults, GeodeticPoint, Mgrs, ThisOrThat,
};

/// Hemisphere of a UTM or UPS coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hemisphere {
    #[cfg_attr(feature = "serde", serde(alias = "N", alias = "n"))]
    North,
    #[cfg_attr(feature = "serde", serde(alias = "S", alias = "s"))]
    South,
}

impl Hemisphere {
    /// The hemisphere containing `latitude`. The equator is north.
    pub fn from_latitude(latitude: f64) -> Hemisphere {
        (latitude < 0.).ternary(Hemisphere::South, Hemisphere::North)
    }

    pub fn is_north(&self) -> bool {
        *self == Hemisphere::North
    }

    pub(crate) fn utm_false_northing(self) -> f64 {
        self.is_north().ternary(0., UTM_FALSE_NORTHING_SOUTH)
    }
}

impl TryFrom<char> for Hemisphere {
    type Error = Error;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase() {
            'N' => Ok(Hemisphere::North),
            'S' => Ok(Hemisphere::South),
            _ => Err(Error::HemisphereInvalid(value.to_string())),
        }
    }
}

impl FromStr for Hemisphere {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Hemisphere::try_from(c),
            _ => Err(Error::HemisphereInvalid(s.to_string())),
        }
    }
}

impl Display for Hemisphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.is_north().ternary("N", "S"))
    }
}

/// Options for projecting a point to UTM.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UtmOptions {
    /// Datum the WGS84 input is shifted to before projecting.
    pub datum: Datum,
    /// Ellipsoid to project on. Defaults to the datum's ellipsoid.
    pub ellipsoid: Option<Ellipsoid>,
    /// Zone to use instead of the computed one. Must be adjacent to it.
    pub zone_override: Option<i32>,
}

/// Representation of a
/// [UTM](https://en.wikipedia.org/wiki/Universal_Transverse_Mercator_coordinate_system)
/// coordinate. Zones run from 1 to 60; the polar caps are handled by [`Ups`](crate::Ups).
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Utm {
    pub(crate) zone: i32,
    pub(crate) hemisphere: Hemisphere,
    pub(crate) easting: f64,
    pub(crate) northing: f64,
    pub(crate) central_meridian: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub(crate) ellipsoid: Ellipsoid,
}

impl Utm {
    /// Internal-only constructor that doesn't check the coordinate
    pub(crate) fn new(zone: i32, hemisphere: Hemisphere, easting: f64, northing: f64, ellipsoid: Ellipsoid) -> Utm {
        Self {
            zone,
            hemisphere,
            easting,
            northing,
            central_meridian: central_meridian(zone),
            ellipsoid,
        }
    }

    /// Tries to create a WGS84 UTM point from its constituent parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZoneOutOfRange`] if the zone is outside the range `[1, 60]`.
    /// Returns [`Error::EastingOutOfRange`] and/or [`Error::NorthingOutOfRange`]
    /// if easting is outside `[100000, 900000]` or northing outside `[0, 10000000]`.
    ///
    /// # Usage
    ///
    /// ```
    /// use gridref::{Hemisphere, Utm};
    ///
    /// let coord = Utm::create(18, Hemisphere::North, 585664.121, 4511315.422).unwrap();
    ///
    /// assert_eq!(coord.zone(), 18);
    /// assert_eq!(coord.central_meridian(), -75.0);
    /// assert!(coord.is_north());
    ///
    /// assert!(Utm::create(0, Hemisphere::North, 585664.121, 4511315.422).is_err());
    /// assert!(Utm::create(61, Hemisphere::North, 585664.121, 4511315.422).is_err());
    /// assert!(Utm::create(18, Hemisphere::North, 50000.0, 4511315.422).is_err());
    /// ```
    pub fn create(zone: i32, hemisphere: Hemisphere, easting: f64, northing: f64) -> Result<Utm, Error> {
        if !(MINUTMZONE..=MAXUTMZONE).contains(&zone) {
            return Err(Error::ZoneOutOfRange(zone));
        }

        check_coords(easting, northing)?;

        Ok(Utm::new(zone, hemisphere, easting, northing, Ellipsoid::WGS84))
    }

    /// Reinterprets the coordinate as lying on another ellipsoid.
    pub fn with_ellipsoid(self, ellipsoid: Ellipsoid) -> Utm {
        Utm {
            ellipsoid,
            ..self
        }
    }

    /// Returns the UTM zone.
    pub fn zone(&self) -> i32 {
        self.zone
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Returns whether the coordinate is in the northern hemisphere.
    pub fn is_north(&self) -> bool {
        self.hemisphere.is_north()
    }

    pub fn easting(&self) -> f64 {
        self.easting
    }

    pub fn northing(&self) -> f64 {
        self.northing
    }

    /// Central meridian of the zone, in degrees.
    pub fn central_meridian(&self) -> f64 {
        self.central_meridian
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    /// Projects a WGS84 point using the standard zone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LatitudeOutOfRange`] outside `[-82, 86]`.
    pub fn from_geodetic(value: &GeodeticPoint) -> Result<Utm, Error> {
        Utm::from_geodetic_with(value, &UtmOptions::default())
    }

    /// Shifts a WGS84 point into `datum`, then projects it on that datum's
    /// ellipsoid.
    ///
    /// # Errors
    ///
    /// Same as [`Utm::from_geodetic`].
    pub fn from_geodetic_in(value: &GeodeticPoint, datum: Datum) -> Result<Utm, Error> {
        Utm::from_geodetic_with(value, &UtmOptions { datum, ..UtmOptions::default() })
    }

    /// Projects a WGS84 point with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LatitudeOutOfRange`] outside `[-82, 86]`,
    /// [`Error::ZoneOutOfRange`] or [`Error::ZoneOverrideRejected`] for a bad zone
    /// override, and easting/northing range errors if the projected point falls
    /// outside the UTM grid. The grid range is not enforced for an accepted
    /// override.
    ///
    /// # Usage
    ///
    /// ```
    /// use gridref::{GeodeticPoint, Utm, UtmOptions};
    ///
    /// let point = GeodeticPoint::create(40.748333, -73.985278).unwrap();
    /// let options = UtmOptions { zone_override: Some(19), ..UtmOptions::default() };
    /// let utm = Utm::from_geodetic_with(&point, &options).unwrap();
    ///
    /// assert_eq!(utm.zone(), 19);
    /// assert!(utm.easting() < 500_000.0);
    ///
    /// let options = UtmOptions { zone_override: Some(21), ..UtmOptions::default() };
    /// assert!(Utm::from_geodetic_with(&point, &options).is_err());
    /// ```
    pub fn from_geodetic_with(value: &GeodeticPoint, options: &UtmOptions) -> Result<Utm, Error> {
        let point = options.datum.shift_from_wgs84(value);
        let ellipsoid = options.ellipsoid.unwrap_or_else(|| options.datum.ellipsoid());

        let mut lat = point.latitude();
        let lon = point.longitude();

        if !(UTM_MIN_LAT..=UTM_MAX_LAT).contains(&lat) {
            return Err(Error::LatitudeOutOfRange { latitude: lat, min: UTM_MIN_LAT, max: UTM_MAX_LAT });
        }
        // Round-off just south of the equator stays in the north
        if lat < 0. && lat > -1e-9 {
            lat = 0.;
        }

        let computed = zone_for(lat, lon);
        let zone = match options.zone_override {
            Some(requested) => {
                let zone = check_override(requested, computed)?;
                debug!(requested, computed, "using UTM zone override");
                zone
            },
            None => computed,
        };

        let hemisphere = Hemisphere::from_latitude(lat);
        let projection = TransverseMercator::utm(ellipsoid, central_meridian(zone), hemisphere.utm_false_northing())?;
        let (easting, northing) = projection.forward(lat, lon)?.into_inner();

        debug!(zone, %hemisphere, easting, northing, "projected to UTM");

        // An overridden zone may legitimately project outside the standard grid
        if options.zone_override.is_none() {
            check_coords(easting, northing)?;
        }

        Ok(Utm::new(zone, hemisphere, easting, northing, ellipsoid))
    }

    /// Converts from [`Utm`] to [`GeodeticPoint`] on the coordinate's ellipsoid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LatitudeOutOfRange`] if the coordinate lies outside the
    /// latitudes UTM is defined for.
    ///
    /// # Usage
    ///
    /// ```
    /// use gridref::{Hemisphere, Utm};
    ///
    /// let coord = Utm::create(18, Hemisphere::North, 585664.121, 4511315.422).unwrap();
    /// let converted = coord.to_geodetic().unwrap().into_inner();
    ///
    /// // Check if the converted coordinate is accurate to 6 decimals (same as reference)
    /// assert!((converted.latitude() - 40.748333).abs() < 1e-6);
    /// assert!((converted.longitude() + 73.985278).abs() < 1e-6);
    /// ```
    pub fn to_geodetic(&self) -> Result<Checked<GeodeticPoint>, Error> {
        let projection = TransverseMercator::utm(self.ellipsoid, self.central_meridian, self.hemisphere.utm_false_northing())?;
        let point = projection.inverse(self.easting, self.northing)?;

        let lat = point.value().latitude();
        if !(UTM_MIN_LAT..=UTM_MAX_LAT).contains(&lat) {
            return Err(Error::LatitudeOutOfRange { latitude: lat, min: UTM_MIN_LAT, max: UTM_MAX_LAT });
        }

        Ok(point)
    }

    /// Converts a coordinate projected in `datum` back to a WGS84 point.
    ///
    /// # Errors
    ///
    /// Same as [`Utm::to_geodetic`].
    pub fn to_geodetic_in(&self, datum: Datum) -> Result<Checked<GeodeticPoint>, Error> {
        Ok(self.to_geodetic()?.map(|point| datum.shift_to_wgs84(&point)))
    }

    /// Converts from [`Utm`] to [`Mgrs`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::PrecisionOutOfRange`] if `precision` is not in `[0, 5]`.
    pub fn to_mgrs(&self, precision: i32) -> Result<Mgrs, Error> {
        Mgrs::from_utm(self, precision)
    }
}

/// Central meridian of a UTM zone, in degrees.
///
/// ```
/// assert_eq!(gridref::coords::utm::central_meridian(31), 3.0);
/// assert_eq!(gridref::coords::utm::central_meridian(18), -75.0);
/// ```
pub fn central_meridian(zone: i32) -> f64 {
    (6. * f64::from(zone) - 183.).ang_normalize()
}

/// The standard UTM zone for a point, including the Norway and Svalbard
/// exceptions.
///
/// ```
/// use gridref::coords::utm::zone_for;
///
/// assert_eq!(zone_for(40.748333, -73.985278), 18);
/// assert_eq!(zone_for(60.5, 5.0), 32);
/// assert_eq!(zone_for(78.0, 15.0), 33);
/// assert_eq!(zone_for(0.0, 180.0), 1);
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn zone_for(lat: f64, lon: f64) -> i32 {
    let mut lon_int = lon.ang_normalize().floor() as i32;
    if lon_int == dms::HD {
        lon_int = -dms::HD;
    }

    let mut zone = (lon_int + 186) / 6;

    // The Norway exception
    if (56. ..64.).contains(&lat) {
        if (0..3).contains(&lon_int) {
            zone = 31;
        } else if (3..12).contains(&lon_int) {
            zone = 32;
        }
    }
    // The Svalbard exception
    else if lat >= 72. {
        zone = match lon_int {
            0..=8 => 31,
            9..=20 => 33,
            21..=32 => 35,
            33..=41 => 37,
            _ => zone,
        };
    }

    zone.clamp(MINUTMZONE, MAXUTMZONE)
}

/// Accepts an override only if it is next to the computed zone.
fn check_override(requested: i32, computed: i32) -> Result<i32, Error> {
    if !(MINUTMZONE..=MAXUTMZONE).contains(&requested) {
        return Err(Error::ZoneOutOfRange(requested));
    }

    let wraps = (computed == MINUTMZONE && requested == MAXUTMZONE)
        || (computed == MAXUTMZONE && requested == MINUTMZONE);

    if wraps || (requested - computed).abs() <= 1 {
        Ok(requested)
    } else {
        Err(Error::ZoneOverrideRejected { requested, computed })
    }
}

pub(crate) fn check_coords(easting: f64, northing: f64) -> Result<(), Error> {
    let mut faults = Faults::new();
    faults.check((UTM_MIN_EASTING..=UTM_MAX_EASTING).contains(&easting), || Error::EastingOutOfRange {
        easting,
        min: UTM_MIN_EASTING,
        max: UTM_MAX_EASTING,
    });
    faults.check((UTM_MIN_NORTHING..=UTM_MAX_NORTHING).contains(&northing), || Error::NorthingOutOfRange {
        northing,
        min: UTM_MIN_NORTHING,
        max: UTM_MAX_NORTHING,
    });
    faults.into_result()
}

impl Display for Utm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{} {:.3} {:.3}",
            self.zone,
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
    fn zone_exceptions() {
        // Plain zones
        assert_eq!(zone_for(0., 0.), 31);
        assert_eq!(zone_for(0., -0.5), 30);
        assert_eq!(zone_for(0., 179.9), 60);
        assert_eq!(zone_for(0., -180.), 1);

        // Norway widens 32 westwards
        assert_eq!(zone_for(60.5, 5.), 32);
        assert_eq!(zone_for(60.5, 2.9), 31);
        assert_eq!(zone_for(64.5, 5.), 31);
        assert_eq!(zone_for(55.9, 5.), 31);

        // Svalbard drops the even zones
        assert_eq!(zone_for(78., 8.9), 31);
        assert_eq!(zone_for(78., 9.), 33);
        assert_eq!(zone_for(78., 20.9), 33);
        assert_eq!(zone_for(78., 21.), 35);
        assert_eq!(zone_for(78., 33.), 37);
        assert_eq!(zone_for(78., 42.), 38);
        assert_eq!(zone_for(71.9, 9.), 32);
    }

    #[test]
    fn central_meridians() {
        assert_relative_eq!(central_meridian(1), -177.);
        assert_relative_eq!(central_meridian(30), -3.);
        assert_relative_eq!(central_meridian(31), 3.);
        assert_relative_eq!(central_meridian(60), 177.);
        assert_relative_eq!(central_meridian(18), -75.);

        let utm = Utm::create(1, Hemisphere::North, 500_000., 0.).unwrap();
        assert_relative_eq!(utm.central_meridian(), -177.);
        let back = utm.to_geodetic().unwrap().into_inner();
        assert_relative_eq!(back.longitude(), -177., epsilon = 1e-9);
    }

    #[test]
    fn norway_point_projects_in_zone_32() {
        let point = GeodeticPoint::create(60.5, 5.).unwrap();
        let utm = Utm::from_geodetic(&point).unwrap();
        assert_eq!(utm.zone(), 32);
        assert!(utm.easting() < 500_000.);

        let back = utm.to_geodetic().unwrap().into_inner();
        assert_relative_eq!(back.latitude(), 60.5, epsilon = 1e-9);
        assert_relative_eq!(back.longitude(), 5., epsilon = 1e-9);
    }

    #[test]
    fn zone_overrides() {
        let point = GeodeticPoint::create(10., 0.5).unwrap();
        let with = |zone| Utm::from_geodetic_with(&point, &UtmOptions { zone_override: Some(zone), ..UtmOptions::default() });

        assert_eq!(with(30).unwrap().zone(), 30);

        // 8.5° west of the zone 32 meridian, off the western edge of the grid
        let far = with(32).unwrap();
        assert_eq!(far.zone(), 32);
        assert!(far.easting() < 0.);
        let back = far.to_geodetic().unwrap().into_inner();
        assert_relative_eq!(back.latitude(), 10., epsilon = 1e-9);
        assert_relative_eq!(back.longitude(), 0.5, epsilon = 1e-9);

        assert_eq!(with(33), Err(Error::ZoneOverrideRejected { requested: 33, computed: 31 }));
        assert_eq!(with(0), Err(Error::ZoneOutOfRange(0)));
        assert_eq!(with(61), Err(Error::ZoneOutOfRange(61)));

        assert_eq!(check_override(60, 1), Ok(60));
        assert_eq!(check_override(1, 60), Ok(1));
        assert!(check_override(59, 1).is_err());
    }

    #[test]
    fn southern_hemisphere_uses_false_northing() {
        let point = GeodeticPoint::create(-33.8688, 151.2093).unwrap();
        let utm = Utm::from_geodetic(&point).unwrap();
        assert_eq!(utm.zone(), 56);
        assert_eq!(utm.hemisphere(), Hemisphere::South);
        assert!(utm.northing() > 6_000_000. && utm.northing() < 6_500_000.);

        let back = utm.to_geodetic().unwrap().into_inner();
        assert_relative_eq!(back.latitude(), -33.8688, epsilon = 1e-9);
        assert_relative_eq!(back.longitude(), 151.2093, epsilon = 1e-9);
    }

    #[test]
    fn equator_round_off_stays_north() {
        let point = GeodeticPoint::create(-1e-12, 3.).unwrap();
        let utm = Utm::from_geodetic(&point).unwrap();
        assert!(utm.is_north());
        assert_relative_eq!(utm.northing(), 0.);
    }

    #[test]
    fn rejects_polar_latitudes() {
        let point = GeodeticPoint::create(87., 0.).unwrap();
        assert!(matches!(Utm::from_geodetic(&point), Err(Error::LatitudeOutOfRange { .. })));

        let point = GeodeticPoint::create(-82.5, 0.).unwrap();
        assert!(matches!(Utm::from_geodetic(&point), Err(Error::LatitudeOutOfRange { .. })));
    }

    #[test]
    fn create_collects_faults() {
        let err = Utm::create(18, Hemisphere::North, 50_000., 12_000_000.).unwrap_err();
        assert_eq!(err.faults().len(), 2);
        assert!(matches!(err.faults()[0], Error::EastingOutOfRange { .. }));
        assert!(matches!(err.faults()[1], Error::NorthingOutOfRange { .. }));
    }

    #[test]
    fn nad27_differs_from_wgs84() {
        let point = GeodeticPoint::create(40., -100.).unwrap();
        let wgs84 = Utm::from_geodetic_in(&point, Datum::Wgs84).unwrap();
        let nad27 = Utm::from_geodetic_in(&point, Datum::Nad27).unwrap();

        assert_eq!(wgs84.zone(), nad27.zone());
        assert_eq!(nad27.ellipsoid(), Ellipsoid::CLARKE_1866);

        let moved = (wgs84.easting() - nad27.easting()).hypot(wgs84.northing() - nad27.northing());
        assert!(moved > 1. && moved < 500., "moved {moved}m");

        let back = nad27.to_geodetic_in(Datum::Nad27).unwrap().into_inner();
        assert_relative_eq!(back.latitude(), 40., epsilon = 1e-6);
        assert_relative_eq!(back.longitude(), -100., epsilon = 1e-6);
    }

    #[test]
    fn hemisphere_parsing() {
        assert_eq!("n".parse::<Hemisphere>(), Ok(Hemisphere::North));
        assert_eq!(" S ".parse::<Hemisphere>(), Ok(Hemisphere::South));
        assert!(matches!("NS".parse::<Hemisphere>(), Err(Error::HemisphereInvalid(_))));
        assert!(matches!(Hemisphere::try_from('x'), Err(Error::HemisphereInvalid(_))));
    }

    #[test]
    fn display() {
        let utm = Utm::create(18, Hemisphere::North, 585_664.121_4, 4_511_315.422).unwrap();
        assert_eq!(utm.to_string(), "18N 585664.121 4511315.422");
    }
}
