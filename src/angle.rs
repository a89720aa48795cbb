//! Angle values held in both degrees and radians.
//!
//! Both representations are computed when an [`Angle`] is built, so the
//! projection code can use radians directly while callers keep working in
//! degrees.
//!
//! ```
//! use gridref::Angle;
//!
//! let a = Angle::from_degrees(30.0);
//! let b = Angle::from_degrees(15.5);
//!
//! assert!(((a + b).degrees() - 45.5).abs() < 1e-12);
//! assert_eq!((a + b).to_dms_string(0), "45°30'0\"");
//! ```

use std::{
    fmt::Display,
    ops::{Add, Div, Mul, Neg, Sub},
};

use crate::{utility::dms, Error};

/// An immutable angle. The degree and radian values always describe the same angle.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "f64", into = "f64"))]
pub struct Angle {
    degrees: f64,
    radians: f64,
}

/// Sexagesimal breakdown of an [`Angle`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Dms {
    pub negative: bool,
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: f64,
}

impl Angle {
    pub const ZERO: Angle = Angle { degrees: 0., radians: 0. };

    #[inline]
    pub fn from_degrees(degrees: f64) -> Angle {
        Angle {
            degrees,
            radians: degrees.to_radians(),
        }
    }

    #[inline]
    pub fn from_radians(radians: f64) -> Angle {
        Angle {
            degrees: radians.to_degrees(),
            radians,
        }
    }

    /// Creates a latitude, clamping the value to `[-90, 90]` degrees.
    pub fn latitude(degrees: f64) -> Angle {
        let qd = f64::from(dms::QD);
        Angle::from_degrees(degrees.clamp(-qd, qd))
    }

    /// Creates a longitude, clamping the value to `[-180, 180]` degrees.
    pub fn longitude(degrees: f64) -> Angle {
        let hd = f64::from(dms::HD);
        Angle::from_degrees(degrees.clamp(-hd, hd))
    }

    pub fn latitude_from_radians(radians: f64) -> Angle {
        Angle::latitude(radians.to_degrees())
    }

    pub fn longitude_from_radians(radians: f64) -> Angle {
        Angle::longitude(radians.to_degrees())
    }

    /// Creates an angle from degrees, minutes and seconds. The sign of the
    /// angle is taken from `degrees`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDms`] if `minutes` or `seconds` is outside `[0, 60)`.
    ///
    /// ```
    /// use gridref::Angle;
    ///
    /// let angle = Angle::from_dms(-73.0, 59.0, 6.0).unwrap();
    /// assert!((angle.degrees() + 73.985).abs() < 1e-12);
    ///
    /// assert!(Angle::from_dms(10.0, 60.0, 0.0).is_err());
    /// ```
    pub fn from_dms(degrees: f64, minutes: f64, seconds: f64) -> Result<Angle, Error> {
        let dm = f64::from(dms::DM);
        let ms = f64::from(dms::MS);
        if !(0.0..dm).contains(&minutes) {
            return Err(Error::InvalidDms(format!("Minutes {minutes} outside of range [0, 60)")));
        }
        if !(0.0..ms).contains(&seconds) {
            return Err(Error::InvalidDms(format!("Seconds {seconds} outside of range [0, 60)")));
        }

        let magnitude = degrees.abs() + minutes / dm + seconds / f64::from(dms::DS);
        Ok(Angle::from_degrees(magnitude.copysign(degrees)))
    }

    #[inline]
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    #[inline]
    pub fn radians(&self) -> f64 {
        self.radians
    }

    pub fn is_valid_latitude(&self) -> bool {
        (-f64::from(dms::QD)..=f64::from(dms::QD)).contains(&self.degrees)
    }

    pub fn is_valid_longitude(&self) -> bool {
        (-f64::from(dms::HD)..=f64::from(dms::HD)).contains(&self.degrees)
    }

    /// Reduces the angle to a longitude in `(-180, 180]`.
    ///
    /// ```
    /// use gridref::Angle;
    ///
    /// assert_eq!(Angle::from_degrees(190.0).normalized_longitude().degrees(), -170.0);
    /// assert_eq!(Angle::from_degrees(-180.0).normalized_longitude().degrees(), 180.0);
    /// assert_eq!(Angle::from_degrees(-725.0).normalized_longitude().degrees(), -5.0);
    /// ```
    pub fn normalized_longitude(&self) -> Angle {
        let hd = f64::from(dms::HD);
        let td = f64::from(dms::TD);

        // `%` keeps the sign of the dividend, so fold negative remainders back up
        let mut wrapped = (self.degrees + hd) % td;
        if wrapped < 0.0 {
            wrapped += td;
        }
        let mut degrees = wrapped - hd;
        if degrees <= -hd {
            degrees += td;
        }

        Angle::from_degrees(degrees)
    }

    /// Reduces the angle to a latitude in `[-90, 90]`, reflecting values that
    /// pass over a pole.
    ///
    /// ```
    /// use gridref::Angle;
    ///
    /// assert_eq!(Angle::from_degrees(100.0).normalized_latitude().degrees(), 80.0);
    /// assert_eq!(Angle::from_degrees(-100.0).normalized_latitude().degrees(), -80.0);
    /// ```
    pub fn normalized_latitude(&self) -> Angle {
        let qd = f64::from(dms::QD);
        let hd = f64::from(dms::HD);

        let degrees = self.normalized_longitude().degrees;
        if degrees > qd {
            Angle::from_degrees(hd - degrees)
        } else if degrees < -qd {
            Angle::from_degrees(-hd - degrees)
        } else {
            Angle::from_degrees(degrees)
        }
    }

    /// Returns the magnitude of the shortest rotation between two angles, in
    /// `[0, 180]` degrees.
    ///
    /// ```
    /// use gridref::Angle;
    ///
    /// let a = Angle::from_degrees(179.0);
    /// let b = Angle::from_degrees(-179.0);
    /// assert!((a.angular_distance_to(&b).degrees() - 2.0).abs() < 1e-12);
    /// ```
    pub fn angular_distance_to(&self, other: &Angle) -> Angle {
        let diff = (other.degrees - self.degrees).abs();
        let td = f64::from(dms::TD);
        let hd = f64::from(dms::HD);

        let mut wrapped = diff % td;
        if wrapped > hd {
            wrapped = td - wrapped;
        }
        Angle::from_degrees(wrapped)
    }

    /// Splits the angle into degrees, minutes and seconds, with seconds rounded
    /// half-to-even at `decimals` places. A rounded 60 seconds carries into the
    /// minutes, and 60 minutes into the degrees.
    ///
    /// ```
    /// use gridref::Angle;
    ///
    /// let dms = Angle::from_degrees(10.0 + 59.0 / 60.0 + 59.9996 / 3600.0).to_dms(2);
    /// assert_eq!((dms.degrees, dms.minutes, dms.seconds), (11, 0, 0.0));
    /// ```
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_dms(&self, decimals: usize) -> Dms {
        let magnitude = self.degrees.abs();
        let mut degrees = magnitude.trunc();
        let minutes_f = (magnitude - degrees) * f64::from(dms::DM);
        let mut minutes = minutes_f.trunc();

        let scale = 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
        let seconds_raw = (minutes_f - minutes) * f64::from(dms::MS);
        let mut seconds = (seconds_raw * scale).round_ties_even() / scale;

        if seconds >= f64::from(dms::MS) {
            seconds -= f64::from(dms::MS);
            minutes += 1.0;
        }
        if minutes >= f64::from(dms::DM) {
            minutes -= f64::from(dms::DM);
            degrees += 1.0;
        }

        Dms {
            negative: self.degrees.is_sign_negative() && (degrees, minutes, seconds) != (0., 0., 0.),
            degrees: degrees as u32,
            minutes: minutes as u32,
            seconds,
        }
    }

    /// Formats the angle as `D°M'S"` with `decimals` places of seconds.
    pub fn to_dms_string(&self, decimals: usize) -> String {
        let Dms { negative, degrees, minutes, seconds } = self.to_dms(decimals);
        format!(
            "{}{degrees}°{minutes}'{seconds:.decimals$}\"",
            if negative { "-" } else { "" },
        )
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle::from_degrees(self.degrees + rhs.degrees)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle::from_degrees(self.degrees - rhs.degrees)
    }
}

impl Mul<f64> for Angle {
    type Output = Angle;

    fn mul(self, rhs: f64) -> Angle {
        Angle::from_degrees(self.degrees * rhs)
    }
}

impl Div<f64> for Angle {
    type Output = Angle;

    fn div(self, rhs: f64) -> Angle {
        Angle::from_degrees(self.degrees / rhs)
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle {
            degrees: -self.degrees,
            radians: -self.radians,
        }
    }
}

impl From<f64> for Angle {
    fn from(degrees: f64) -> Angle {
        Angle::from_degrees(degrees)
    }
}

impl From<Angle> for f64 {
    fn from(angle: Angle) -> f64 {
        angle.degrees
    }
}

/// Formats as degrees/minutes/seconds. The formatter precision selects the
/// number of decimal places of seconds (default 2).
impl Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dms_string(f.precision().unwrap_or(2)))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn representations_stay_consistent() {
        let from_deg = Angle::from_degrees(57.5);
        assert_relative_eq!(from_deg.radians(), 57.5_f64.to_radians());

        let from_rad = Angle::from_radians(1.25);
        assert_relative_eq!(from_rad.degrees(), 1.25_f64.to_degrees());

        let sum = from_deg + from_rad;
        assert_relative_eq!(sum.radians(), sum.degrees().to_radians());

        let scaled = from_deg * 2.0 / 4.0;
        assert_relative_eq!(scaled.degrees(), 28.75);
        assert_relative_eq!(scaled.radians(), 28.75_f64.to_radians());
    }

    #[test]
    fn clamps_latitude_and_longitude() {
        assert_relative_eq!(Angle::latitude(95.0).degrees(), 90.0);
        assert_relative_eq!(Angle::latitude(-91.0).degrees(), -90.0);
        assert_relative_eq!(Angle::longitude(181.0).degrees(), 180.0);
        assert_relative_eq!(Angle::longitude(-200.0).degrees(), -180.0);
        assert_relative_eq!(Angle::latitude_from_radians(2.0).degrees(), 90.0);
    }

    #[test]
    fn validity_predicates() {
        assert!(Angle::from_degrees(90.0).is_valid_latitude());
        assert!(!Angle::from_degrees(90.5).is_valid_latitude());
        assert!(Angle::from_degrees(-180.0).is_valid_longitude());
        assert!(!Angle::from_degrees(180.5).is_valid_longitude());
    }

    #[test]
    fn dms_rejects_out_of_range_parts() {
        assert!(matches!(Angle::from_dms(1.0, -1.0, 0.0), Err(Error::InvalidDms(_))));
        assert!(matches!(Angle::from_dms(1.0, 0.0, 60.0), Err(Error::InvalidDms(_))));
        assert_relative_eq!(Angle::from_dms(1.0, 30.0, 36.0).unwrap().degrees(), 1.51, epsilon = 1e-12);
    }

    #[test]
    fn dms_rounds_half_to_even() {
        // 1/128 degree is exactly 28.125 seconds, 3/256 degree is 42.1875
        let down = Angle::from_degrees(1.0 / 128.0).to_dms(2);
        assert_eq!((down.degrees, down.minutes), (0, 0));
        assert_relative_eq!(down.seconds, 28.12);

        let up = Angle::from_degrees(3.0 / 256.0).to_dms(3);
        assert_relative_eq!(up.seconds, 42.188);
    }

    #[test]
    fn dms_carries_into_minutes_and_degrees() {
        let angle = Angle::from_degrees(-(29.0 + 59.0 / 60.0 + 59.7 / 3600.0));
        assert_eq!(angle.to_dms_string(0), "-30°0'0\"");
        assert_eq!(format!("{:.1}", angle), "-29°59'59.7\"");
    }

    #[test]
    fn distance_takes_the_short_way_round() {
        let a = Angle::from_degrees(10.0);
        let b = Angle::from_degrees(350.0);
        assert_relative_eq!(a.angular_distance_to(&b).degrees(), 20.0, epsilon = 1e-12);
        assert_relative_eq!(b.angular_distance_to(&a).degrees(), 20.0, epsilon = 1e-12);
        assert_relative_eq!(a.angular_distance_to(&(-a)).degrees(), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn normalizes_into_canonical_ranges() {
        assert_relative_eq!(Angle::from_degrees(540.0).normalized_longitude().degrees(), 180.0);
        assert_relative_eq!(Angle::from_degrees(-190.0).normalized_longitude().degrees(), 170.0);
        assert_relative_eq!(Angle::from_degrees(270.0).normalized_latitude().degrees(), -90.0);
        assert_relative_eq!(Angle::from_degrees(45.0).normalized_latitude().degrees(), 45.0);
    }
}
