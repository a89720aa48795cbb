//! Horizontal datums and the shift between them.

use std::{fmt::Display, str::FromStr};

use crate::{utility::GeoMath, Angle, Ellipsoid, Error, GeodeticPoint};

/// Geocentric translation (dX, dY, dZ) in meters taking a WGS84 position to
/// NAD27, the mean value for the conterminous United States.
const NAD27_FROM_WGS84: [f64; 3] = [8., -160., -176.];

/// The datum a geodetic coordinate is referenced to. Every conversion in this
/// crate works on WGS84 unless told otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Datum {
    #[default]
    Wgs84,
    /// North American Datum of 1927, on the Clarke 1866 ellipsoid
    Nad27,
}

impl Datum {
    /// The reference ellipsoid of this datum.
    pub fn ellipsoid(&self) -> Ellipsoid {
        match self {
            Datum::Wgs84 => Ellipsoid::WGS84,
            Datum::Nad27 => Ellipsoid::CLARKE_1866,
        }
    }

    /// Converts a WGS84 point into this datum.
    ///
    /// ```
    /// use gridref::{Datum, GeodeticPoint};
    ///
    /// let wgs84 = GeodeticPoint::create(40.0, -100.0).unwrap();
    /// let nad27 = Datum::Nad27.shift_from_wgs84(&wgs84);
    ///
    /// assert_ne!(wgs84, nad27);
    /// assert_eq!(Datum::Wgs84.shift_from_wgs84(&wgs84), wgs84);
    /// ```
    pub fn shift_from_wgs84(&self, point: &GeodeticPoint) -> GeodeticPoint {
        match self {
            Datum::Wgs84 => *point,
            Datum::Nad27 => molodensky(point, Ellipsoid::WGS84, Ellipsoid::CLARKE_1866, NAD27_FROM_WGS84),
        }
    }

    /// Converts a point in this datum back to WGS84.
    pub fn shift_to_wgs84(&self, point: &GeodeticPoint) -> GeodeticPoint {
        match self {
            Datum::Wgs84 => *point,
            Datum::Nad27 => {
                let [dx, dy, dz] = NAD27_FROM_WGS84;
                molodensky(point, Ellipsoid::CLARKE_1866, Ellipsoid::WGS84, [-dx, -dy, -dz])
            },
        }
    }
}

/// Standard Molodensky transformation. Elevation is treated as zero when the
/// point has none, and is only written back if it was present.
#[allow(clippy::similar_names)]
fn molodensky(point: &GeodeticPoint, from: Ellipsoid, to: Ellipsoid, shift: [f64; 3]) -> GeodeticPoint {
    let [dx, dy, dz] = shift;
    let h = point.elevation.unwrap_or(0.);

    let phi = point.latitude.radians();
    let lam = point.longitude.radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_lam, cos_lam) = lam.sin_cos();

    let a = from.a();
    let b = from.b();
    let e2 = from.e2();
    let da = to.a() - a;
    let df = to.f() - from.f();

    let w2 = 1. - e2 * sin_phi.powi(2);
    let w = w2.sqrt();
    // Radii of curvature in the prime vertical and the meridian
    let rn = a / w;
    let rm = a * (1. - e2) / (w2 * w);

    let dphi = (-dx * sin_phi * cos_lam - dy * sin_phi * sin_lam + dz * cos_phi
        + da * rn * e2 * sin_phi * cos_phi / a
        + df * (rm * a / b + rn * b / a) * sin_phi * cos_phi)
        / (rm + h);

    // Longitude is undefined at the poles
    let dlam = if cos_phi.is_zero() {
        0.
    } else {
        (-dx * sin_lam + dy * cos_lam) / ((rn + h) * cos_phi)
    };

    let dh = dx * cos_phi * cos_lam + dy * cos_phi * sin_lam + dz * sin_phi
        - da * a / rn
        + df * b / a * rn * sin_phi.powi(2);

    GeodeticPoint {
        latitude: Angle::latitude_from_radians(phi + dphi),
        longitude: Angle::from_degrees((lam + dlam).to_degrees().ang_normalize()),
        elevation: point.elevation.map(|_| h + dh),
    }
}

impl Display for Datum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Datum::Wgs84 => write!(f, "WGS84"),
            Datum::Nad27 => write!(f, "NAD27"),
        }
    }
}

impl FromStr for Datum {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WGS84" | "WGS-84" | "WGE" => Ok(Datum::Wgs84),
            "NAD27" | "NAD-27" => Ok(Datum::Nad27),
            _ => Err(Error::ParameterInvalid(format!("Unknown datum {s:?}"))),
        }
    }
}
