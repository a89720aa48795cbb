//! Conversions between geodetic latitude/longitude and the projected grid
//! systems used for land navigation:
//!
//! * [UTM](https://en.wikipedia.org/wiki/Universal_Transverse_Mercator_coordinate_system)
//!   via [`Utm`],
//! * [UPS](https://en.wikipedia.org/wiki/Universal_polar_stereographic_coordinate_system)
//!   via [`Ups`],
//! * [MGRS](https://en.wikipedia.org/wiki/Military_Grid_Reference_System)
//!   grid reference strings via [`Mgrs`].
//!
//! Every conversion is a pure function of its inputs. Failures are reported
//! as an [`Error`]; conditions that still yield a usable result are attached
//! to the value as [`Warning`]s inside a [`Checked`].
//!
//! ```
//! let mgrs = gridref::geodetic_to_mgrs(40.748333, -73.985278, 5).unwrap();
//! assert_eq!(mgrs, "18TWL8566411315");
//!
//! let point = gridref::mgrs_to_geodetic("18T WL 85664 11315").unwrap().into_inner();
//! assert!((point.latitude() - 40.748333).abs() < 1e-4);
//! ```

#![warn(clippy::pedantic)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

use thiserror::Error;

mod log;

pub mod angle;
pub mod datum;
pub mod ellipsoid;
pub(crate) mod utility;

pub mod projections {
    pub mod polar_stereographic;
    pub mod transverse_mercator;
}

pub mod coords {
    pub mod geodetic;
    pub mod mgrs;
    pub mod ups;
    pub mod utm;
}

pub(crate) mod constants;

pub use angle::Angle;
pub use coords::geodetic::GeodeticPoint;
pub use coords::mgrs::{Letter, Mgrs};
pub use coords::ups::Ups;
pub use coords::utm::{Hemisphere, Utm, UtmOptions};
pub use datum::Datum;
pub use ellipsoid::Ellipsoid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("Latitude {latitude} outside of valid range [{min}, {max}]")]
    LatitudeOutOfRange { latitude: f64, min: f64, max: f64 },
    #[error("Longitude {longitude} outside of valid range [{min}, {max}]")]
    LongitudeOutOfRange { longitude: f64, min: f64, max: f64 },
    #[error("Precision {0} outside of valid range [0, 5]")]
    PrecisionOutOfRange(i32),
    #[error("Zone {0} outside of valid range [1, 60]")]
    ZoneOutOfRange(i32),
    #[error("Zone override {requested} is not adjacent to computed zone {computed}")]
    ZoneOverrideRejected { requested: i32, computed: i32 },
    #[error("Hemisphere {0:?} is not one of 'N' or 'S'")]
    HemisphereInvalid(String),
    #[error("Easting {easting:.2}m outside of valid range [{min:.2}m, {max:.2}m]")]
    EastingOutOfRange { easting: f64, min: f64, max: f64 },
    #[error("Northing {northing:.2}m outside of valid range [{min:.2}m, {max:.2}m]")]
    NorthingOutOfRange { northing: f64, min: f64, max: f64 },
    #[error("Point {radius:.2}m from the pole exceeds the projection radius {max:.2}m")]
    RadiusExceeded { radius: f64, max: f64 },
    #[error("MGRS string is invalid: {0}")]
    MalformedMgrs(String),
    #[error("Projection parameters are not valid: {0}")]
    ParameterInvalid(String),
    #[error("Degrees/minutes/seconds value is not valid: {0}")]
    InvalidDms(String),
    #[error("{}", join_errors(.0))]
    Multiple(Vec<Error>),
    #[error("Result rejected: {0}")]
    Warned(Warning),
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Returns every individual fault carried by this error. A [`Error::Multiple`]
    /// is flattened, anything else yields itself.
    pub fn faults(&self) -> Vec<&Error> {
        match self {
            Error::Multiple(errors) => errors.iter().flat_map(Error::faults).collect(),
            other => vec![other],
        }
    }
}

/// Conditions under which a conversion still produces a best-effort result.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum Warning {
    /// The decoded latitude does not fall within the latitude band named by
    /// the MGRS band letter, usually a transcription error in the string.
    #[error("Latitude {latitude} is outside latitude band {band} [{min}, {max}]")]
    LatitudeBandMismatch {
        band: char,
        latitude: f64,
        min: f64,
        max: f64,
    },
    /// The point lies so far from the central meridian that the transverse
    /// Mercator series loses accuracy.
    #[error("Longitude {longitude} is {offset} degrees from central meridian {central_meridian}")]
    LongitudeFarFromMeridian {
        longitude: f64,
        central_meridian: f64,
        offset: f64,
    },
}

/// A conversion result together with any [`Warning`]s raised while computing it.
#[derive(Clone, Debug, PartialEq)]
pub struct Checked<T> {
    value: T,
    warnings: Vec<Warning>,
}

impl<T> Checked<T> {
    pub(crate) fn new(value: T) -> Checked<T> {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn warn(&mut self, warning: Warning) {
        crate::log::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub(crate) fn map<U, F>(self, f: F) -> Checked<U>
    where
        F: FnOnce(T) -> U,
    {
        Checked {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    /// Returns the converted value, regardless of any warnings.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consumes the result, discarding any warnings.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Returns the warnings raised during conversion, in the order they occurred.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Treats the first warning as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Warned`] if any warning was raised.
    pub fn strict(self) -> Result<T> {
        match self.warnings.first() {
            Some(warning) => Err(Error::Warned(*warning)),
            None => Ok(self.value),
        }
    }
}

/// Collects faults that can occur together, such as an easting and a northing
/// that are both out of range.
#[derive(Debug, Default)]
pub(crate) struct Faults(Vec<Error>);

impl Faults {
    pub(crate) fn new() -> Faults {
        Faults(Vec::new())
    }

    pub(crate) fn check<F>(&mut self, valid: bool, error: F)
    where
        F: FnOnce() -> Error,
    {
        if !valid {
            self.0.push(error());
        }
    }

    pub(crate) fn into_result(mut self) -> Result<()> {
        match self.0.len() {
            0 => Ok(()),
            1 => Err(self.0.remove(0)),
            _ => Err(Error::Multiple(self.0)),
        }
    }
}

trait ThisOrThat {
    fn ternary<T>(&self, r#true: T, r#false: T) -> T;
    fn ternary_lazy<F, E, T>(&self, r#true: F, r#false: E) -> T
    where
        F: Fn() -> T,
        E: Fn() -> T;
}

impl ThisOrThat for bool {
    fn ternary<T>(&self, r#true: T, r#false: T) -> T {
        if *self { r#true } else { r#false }
    }

    fn ternary_lazy<F, E, T>(&self, r#true: F, r#false: E) -> T
    where
        F: Fn() -> T,
        E: Fn() -> T,
    {
        if *self { r#true() } else { r#false() }
    }
}

/// Encodes a WGS84 point as an MGRS string with `precision` digits per axis.
///
/// # Errors
///
/// Returns [`Error::PrecisionOutOfRange`] if `precision` is not in `[0, 5]`, or a
/// range error if the point itself is invalid.
///
/// ```
/// assert_eq!(gridref::geodetic_to_mgrs(0.0, 0.0, 5).unwrap(), "31NAA6602100000");
/// assert_eq!(gridref::geodetic_to_mgrs(0.0, 0.0, 1).unwrap(), "31NAA70");
/// assert!(gridref::geodetic_to_mgrs(0.0, 0.0, 6).is_err());
/// ```
pub fn geodetic_to_mgrs(latitude: f64, longitude: f64, precision: i32) -> Result<String> {
    let point = GeodeticPoint::create(latitude, longitude)?;
    Ok(Mgrs::from_geodetic(&point, precision)?.to_string())
}

/// Decodes an MGRS string to a WGS84 point. The point is the south-west corner
/// of the grid cell the string names.
///
/// # Errors
///
/// Returns [`Error::MalformedMgrs`] for structurally invalid strings, or a
/// range error if the reference does not name a valid location.
pub fn mgrs_to_geodetic(mgrs: &str) -> Result<Checked<GeodeticPoint>> {
    mgrs.parse::<Mgrs>()?.to_geodetic()
}

/// Projects a point to UTM after optionally shifting it from WGS84 to `datum`.
///
/// # Errors
///
/// Returns a range error if the point lies outside the UTM latitude band.
pub fn geodetic_to_utm(latitude: f64, longitude: f64, datum: Datum) -> Result<Utm> {
    let point = GeodeticPoint::create(latitude, longitude)?;
    Utm::from_geodetic_in(&point, datum)
}

/// Inverse-projects a WGS84 UTM coordinate.
///
/// # Errors
///
/// Returns [`Error::ZoneOutOfRange`], or easting/northing range errors.
pub fn utm_to_geodetic(
    zone: i32,
    hemisphere: Hemisphere,
    easting: f64,
    northing: f64,
) -> Result<Checked<GeodeticPoint>> {
    Utm::create(zone, hemisphere, easting, northing)?.to_geodetic()
}

/// Projects a WGS84 point in one of the polar caps to UPS.
///
/// # Errors
///
/// Returns [`Error::LatitudeOutOfRange`] if the point is not within a polar cap.
pub fn geodetic_to_ups(latitude: f64, longitude: f64) -> Result<Ups> {
    let point = GeodeticPoint::create(latitude, longitude)?;
    Ups::from_geodetic(&point)
}

/// Inverse-projects a WGS84 UPS coordinate.
///
/// # Errors
///
/// Returns easting/northing range errors, or [`Error::LatitudeOutOfRange`] if
/// the coordinate lies outside its polar cap.
pub fn ups_to_geodetic(hemisphere: Hemisphere, easting: f64, northing: f64) -> Result<GeodeticPoint> {
    Ups::create(hemisphere, easting, northing)?.to_geodetic()
}
