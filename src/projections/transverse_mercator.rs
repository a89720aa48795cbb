//! Transverse Mercator projection using the Krüger series in the third
//! flattening `n`, carried to sixth order. Accurate to a few nanometers
//! within 4000 km of the central meridian.

use std::f64::consts::PI;

use num::Complex;

use crate::{
    constants::{TM_LON_WARNING, UTM_FALSE_EASTING, UTM_K0},
    utility::{dms, polyval, GeoMath},
    Checked, Ellipsoid, Error, Faults, GeodeticPoint, ThisOrThat, Warning,
};

// ================================
// Transverse Mercator Constants
// ================================

const B1_COEFF: [f64; 5] = [
    // b1*(n+1), polynomial in n2 of order 3
    1., 4., 64., 256., 256.,
];  // count = 5

#[allow(clippy::unreadable_literal)]
const ALP_COEFF: [f64; 27] = [
    // alp[1]/n^1, polynomial in n of order 5
    31564., -66675., 34440., 47250., -100800., 75600., 151200.,
    // alp[2]/n^2, polynomial in n of order 4
    -1983433., 863232., 748608., -1161216., 524160., 1935360.,
    // alp[3]/n^3, polynomial in n of order 3
    670412., 406647., -533952., 184464., 725760.,
    // alp[4]/n^4, polynomial in n of order 2
    6601661., -7732800., 2230245., 7257600.,
    // alp[5]/n^5, polynomial in n of order 1
    -13675556., 3438171., 7983360.,
    // alp[6]/n^6, polynomial in n of order 0
    212378941., 319334400.,
];  // count = 27

#[allow(clippy::unreadable_literal)]
const BET_COEFF: [f64; 27] = [
    // bet[1]/n^1, polynomial in n of order 5
    384796., -382725., -6720., 932400., -1612800., 1209600., 2419200.,
    // bet[2]/n^2, polynomial in n of order 4
    -1118711., 1695744., -1174656., 258048., 80640., 3870720.,
    // bet[3]/n^3, polynomial in n of order 3
    22276., -16929., -15984., 12852., 362880.,
    // bet[4]/n^4, polynomial in n of order 2
    -830251., -158400., 197865., 7257600.,
    // bet[5]/n^5, polynomial in n of order 1
    -435388., 453717., 15966720.,
    // bet[6]/n^6, polynomial in n of order 0
    20648693., 638668800.,
];  // count = 27

const MAXPOW: usize = 6;
const M: usize = MAXPOW / 2;

// Accepted range of the central scale factor
const MIN_SCALE: f64 = 0.3;
const MAX_SCALE: f64 = 3.0;

/// A Transverse Mercator projection for one ellipsoid and origin. Built once
/// from validated parameters and never modified afterwards.
#[derive(Clone, Copy, Debug)]
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    origin_latitude: f64,
    central_meridian: f64,
    false_easting: f64,
    false_northing: f64,
    k0: f64,
    es: f64,
    a1: f64,
    alp: [f64; MAXPOW + 1],
    bet: [f64; MAXPOW + 1],
    // Meridian distance from the equator to the origin latitude, scaled by k0
    origin_northing: f64,
}

impl TransverseMercator {
    /// Builds a projection. Angles are in degrees, offsets in meters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterInvalid`] if the ellipsoid is invalid, the
    /// origin latitude is outside `[-90, 90]`, the central meridian is outside
    /// `[-180, 360]`, or the scale factor is outside `[0.3, 3.0]`.
    pub fn new(
        ellipsoid: Ellipsoid,
        origin_latitude: f64,
        central_meridian: f64,
        false_easting: f64,
        false_northing: f64,
        scale: f64,
    ) -> Result<TransverseMercator, Error> {
        ellipsoid.validate()?;

        let qd = f64::from(dms::QD);
        if !(-qd..=qd).contains(&origin_latitude) {
            return Err(Error::ParameterInvalid(format!("Origin latitude {origin_latitude} outside of range [-90, 90]")));
        }
        if !(-f64::from(dms::HD)..=f64::from(dms::TD)).contains(&central_meridian) {
            return Err(Error::ParameterInvalid(format!("Central meridian {central_meridian} outside of range [-180, 360]")));
        }
        if !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
            return Err(Error::ParameterInvalid(format!("Scale factor {scale} outside of range [{MIN_SCALE}, {MAX_SCALE}]")));
        }

        let f = ellipsoid.f();
        let n = f / (2. - f);
        let e2 = ellipsoid.e2();
        let es = (f < 0.).ternary(-1., 1.) * e2.abs().sqrt();

        let b1 = polyval(&B1_COEFF[0..=M], n.powi(2)) / (B1_COEFF[M + 1] * (1. + n));
        // a1 is the equivalent radius for computing the circumference of
        // ellipse.
        let a1 = b1 * ellipsoid.a();

        let mut alp = [0_f64; MAXPOW + 1];
        let mut bet = [0_f64; MAXPOW + 1];

        let mut o = 0;
        let mut d = n;

        for l in 1..=MAXPOW {
            let m = MAXPOW - l;
            alp[l] = d * polyval(&ALP_COEFF[o..=o+m], n) / ALP_COEFF[o + m + 1];
            bet[l] = d * polyval(&BET_COEFF[o..=o+m], n) / BET_COEFF[o + m + 1];
            o += m + 2;
            d *= n;
        }

        let mut projection = Self {
            ellipsoid,
            origin_latitude,
            central_meridian,
            false_easting,
            false_northing,
            k0: scale,
            es,
            a1,
            alp,
            bet,
            origin_northing: 0.,
        };
        projection.origin_northing = projection.series_forward(origin_latitude, 0.).1;

        Ok(projection)
    }

    /// The projection for a UTM zone with the given central meridian.
    pub(crate) fn utm(ellipsoid: Ellipsoid, central_meridian: f64, false_northing: f64) -> Result<TransverseMercator, Error> {
        Self::new(ellipsoid, 0., central_meridian, UTM_FALSE_EASTING, false_northing, UTM_K0)
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    pub fn origin_latitude(&self) -> f64 {
        self.origin_latitude
    }

    pub fn central_meridian(&self) -> f64 {
        self.central_meridian
    }

    pub fn scale_factor(&self) -> f64 {
        self.k0
    }

    /// Projects a point to `(easting, northing)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LatitudeOutOfRange`] outside `[-90, 90]`, and
    /// [`Error::LongitudeOutOfRange`] outside `[-360, 360]` or when the point is
    /// 90 degrees or more from the central meridian.
    ///
    /// A [`Warning::LongitudeFarFromMeridian`] is attached when the point is
    /// more than 9 degrees from the central meridian.
    pub fn forward(&self, lat: f64, lon: f64) -> Result<Checked<(f64, f64)>, Error> {
        let qd = f64::from(dms::QD);
        let td = f64::from(dms::TD);

        let mut faults = Faults::new();
        faults.check((-qd..=qd).contains(&lat), || Error::LatitudeOutOfRange { latitude: lat, min: -qd, max: qd });
        faults.check((-td..=td).contains(&lon), || Error::LongitudeOutOfRange { longitude: lon, min: -td, max: td });
        faults.into_result()?;

        let dlon = self.central_meridian.ang_diff(lon);
        if dlon.abs() >= qd {
            return Err(Error::LongitudeOutOfRange {
                longitude: lon,
                min: self.central_meridian - qd,
                max: self.central_meridian + qd,
            });
        }

        let (x, y) = self.series_forward(lat, dlon);
        let mut result = Checked::new((
            x + self.false_easting,
            y - self.origin_northing + self.false_northing,
        ));

        if dlon.abs() > TM_LON_WARNING {
            result.warn(Warning::LongitudeFarFromMeridian {
                longitude: lon,
                central_meridian: self.central_meridian,
                offset: dlon.abs(),
            });
        }

        Ok(result)
    }

    /// Recovers the point at `(easting, northing)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EastingOutOfRange`] or [`Error::NorthingOutOfRange`] if
    /// the coordinate cannot lie on the projection.
    ///
    /// A [`Warning::LongitudeFarFromMeridian`] is attached when the recovered
    /// longitude is more than 9 degrees from the central meridian.
    pub fn inverse(&self, easting: f64, northing: f64) -> Result<Checked<GeodeticPoint>, Error> {
        let x = easting - self.false_easting;
        let y = northing - self.false_northing + self.origin_northing;

        // Half of the meridian, either side of the equator
        let limit = self.a1 * self.k0 * PI;
        let mut faults = Faults::new();
        faults.check(x.is_finite(), || Error::EastingOutOfRange {
            easting,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        });
        faults.check(y.abs() <= limit, || Error::NorthingOutOfRange {
            northing,
            min: self.false_northing - self.origin_northing - limit,
            max: self.false_northing - self.origin_northing + limit,
        });
        faults.into_result()?;

        let mut xi = y / (self.a1 * self.k0);
        let mut eta = x / (self.a1 * self.k0);

        let xi_sign = (!xi.is_sign_positive()).ternary(-1., 1.);
        let eta_sign = (!eta.is_sign_positive()).ternary(-1., 1.);

        xi *= xi_sign;
        eta *= eta_sign;

        let backside = xi > PI/2.;
        if backside {
            xi = PI - xi;
        }

        let c0 = (2. * xi).cos();
        let ch0 = (2. * eta).cosh();
        let s0 = (2. * xi).sin();
        let sh0 = (2. * eta).sinh();

        let a = Complex::new(2. * c0 * ch0, -2. * s0 * sh0);
        let mut n = MAXPOW;

        let mut y0 = Complex::new((n % 2 == 1).ternary(-self.bet[n], 0.), 0.);
        let mut y1 = Complex::default();

        if n % 2 == 1 {
            n -= 1;
        }

        while n > 0 {
            y1 = a * y0 - y1 - self.bet[n];
            n -= 1;
            y0 = a * y1 - y0 - self.bet[n];
            n -= 1;
        }

        let a = Complex::new(s0 * ch0, c0 * sh0);
        let y1 = Complex::new(xi, eta) + a * y0;
        // Ignoring k and gamma

        let xip = y1.re;
        let etap = y1.im;
        let s = etap.sinh();
        let c = 0_f64.max(xip.cos());
        let r = s.hypot(c);

        let (mut lat, mut lon) = if r.is_zero() {
            (f64::from(dms::QD), 0.)
        } else {
            let lon = s.atan2(c).to_degrees();
            let sxip = xip.sin();
            let tau = (sxip / r).tauf(self.es);

            let lat = tau.atan().to_degrees();

            (lat, lon)
        };

        lat *= xi_sign;
        if backside {
            lon = f64::from(dms::HD) - lon;
        }
        lon *= eta_sign;
        let offset = lon;
        lon = (lon + self.central_meridian).ang_normalize();

        let mut result = Checked::new(GeodeticPoint::new(lat, lon));
        if offset.abs() > TM_LON_WARNING {
            result.warn(Warning::LongitudeFarFromMeridian {
                longitude: lon,
                central_meridian: self.central_meridian,
                offset: offset.abs(),
            });
        }

        Ok(result)
    }

    /// Series evaluation for a point `lon` degrees east of the central
    /// meridian, with `|lon| < 90`. Returns `(x, y)` relative to the equator on
    /// the central meridian.
    fn series_forward(&self, lat: f64, lon: f64) -> (f64, f64) {
        let lat_sign = lat.is_sign_negative().ternary(-1., 1.);
        let lon_sign = lon.is_sign_negative().ternary(-1., 1.);
        let lat = lat * lat_sign;
        let lon = lon * lon_sign;

        let (xip, etap) = if lat.eps_eq(f64::from(dms::QD)) {
            (PI / 2., 0.)
        } else {
            let tau = lat.to_radians().tan();
            let taup = tau.taupf(self.es);
            let (slam, clam) = lon.to_radians().sin_cos();

            (taup.atan2(clam), (slam / taup.hypot(clam)).asinh())
        };

        let c0 = (2. * xip).cos();
        let ch0 = (2. * etap).cosh();
        let s0 = (2. * xip).sin();
        let sh0 = (2. * etap).sinh();

        let a = Complex::new(2. * c0 * ch0, -2. * s0 * sh0);
        let mut n = MAXPOW;

        let mut y0 = Complex::new((n % 2 == 1).ternary(self.alp[n], 0.), 0.);
        let mut y1 = Complex::default();

        if n % 2 == 1 {
            n -= 1;
        }

        while n > 0 {
            y1 = a * y0 - y1 + self.alp[n];
            n -= 1;
            y0 = a * y1 - y0 + self.alp[n];
            n -= 1;
        }

        let a = Complex::new(s0 * ch0, c0 * sh0);
        let y1 = Complex::new(xip, etap) + a * y0;

        let xi = y1.re;
        let eta = y1.im;

        (
            self.a1 * self.k0 * eta * lon_sign,
            self.a1 * self.k0 * xi * lat_sign,
        )
    }
}
