use crate::ThisOrThat;

#[allow(dead_code)]
pub(crate) mod dms {
    /// Degrees per quarter turn
    pub const QD: i32 = 90;
    /// Minutes per degree
    pub const DM: i32 = 60;
    /// Seconds per minute
    pub const MS: i32 = 60;
    /// Degrees per half turn
    pub const HD: i32 = 2 * QD;
    /// Degrees per turn
    pub const TD: i32 = 2 * HD;
    /// Seconds per degree
    pub const DS: i32 = DM * MS;
}

fn special_sum(u: f64, v: f64) -> (f64, f64) {
    let s = u + v;
    let up = s - v;
    let vpp = s - up;

    let up = up - u;
    let vpp = vpp - v;

    let t = s.is_zero().ternary_lazy(|| s, || -(up + vpp));

    (s, t)
}

/// Evaluate a polynomial
pub(crate) fn polyval(p: &[f64], x: f64) -> f64 {
    p
        .iter()
        .fold(0_f64, |acc, val| acc*x + val)
}

pub(crate) trait GeoMath {
    fn is_zero(&self) -> bool;
    fn eps_eq(&self, other: Self) -> bool;
    fn ang_normalize(&self) -> Self;
    fn ang_diff(&self, other: Self) -> Self;
    fn eatanhe(&self, es: Self) -> Self;
    fn remainder(&self, denom: Self) -> Self;
    fn round_half_even(&self) -> Self;
    fn taupf(&self, es: Self) -> Self;
    fn tauf(&self, es: Self) -> Self;
}

impl GeoMath for f64 {
    fn is_zero(&self) -> bool {
        self.abs() < f64::EPSILON
    }

    fn eps_eq(&self, other: f64) -> bool {
        (*self - other).abs() < f64::EPSILON
    }

    /// Reduce an angle in degrees to `[-180, 180]`, keeping the sign of `self`
    /// at the half-turn.
    fn ang_normalize(&self) -> f64 {
        let value = self.remainder(f64::from(dms::TD));
        let hd = f64::from(dms::HD);

        if value.abs().eps_eq(hd) {
            hd.copysign(*self)
        }
        else {
            value
        }
    }

    /// Exact difference `other - self` in degrees, reduced to `[-180, 180]`.
    fn ang_diff(&self, other: f64) -> f64 {
        let td = f64::from(dms::TD);
        // Use remainder instead of AngNormalize, since we treat boundary cases
        // later taking account of the error
        let (diff, err) = special_sum((-*self).remainder(td), other % td);
        // This second sum can only change d if abs(d) < 128, so don't need to
        // apply remainder yet again.
        let (diff, err) = special_sum(diff.remainder(td), err);

        let hd = f64::from(dms::HD);
        // Fix the sign if d = -180, 0, 180.
        if diff.is_zero() || diff.abs().eps_eq(hd) {
            // If e == 0, take sign from y - x
            // else (e != 0, implies d = +/-180), d and e must have opposite signs
            let sign = if err.is_zero() { other - *self } else { -err };
            diff.copysign(sign)
        }
        else {
            diff
        }
    }

    fn eatanhe(&self, es: f64) -> f64 {
        if es.is_sign_positive() {
            es * (es * *self).atanh()
        } else {
            -es * (es * *self).atan()
        }
    }

    fn remainder(&self, denom: Self) -> Self {
        *self - (*self / denom).round() * denom
    }

    fn round_half_even(&self) -> f64 {
        self.round_ties_even()
    }

    fn taupf(&self, es: f64) -> f64 {
        let tau1 = 1.0_f64.hypot(*self);
        let sig = (*self / tau1).eatanhe(es).sinh();

        1.0_f64.hypot(sig) * *self - sig * tau1
    }

    #[allow(clippy::similar_names)]
    fn tauf(&self, es: f64) -> f64 {
        let numit = 5;
        let tol = f64::EPSILON.sqrt() / 10.0;

        let e2m = 1.0 - es.powi(2);
        let mut tau = if self.abs() > 70.0 {
            self * 1_f64.eatanhe(es).exp()
        } else {
            self / e2m
        };

        let stol = tol * self.abs().max(1.0);
        for _ in 0..numit {
            let taupa = tau.taupf(es);
            let dtau = (self - taupa) * (1.0 + e2m * tau.powi(2))
                / (e2m * 1.0_f64.hypot(tau) * 1.0_f64.hypot(taupa));
            tau += dtau;
            if dtau.abs() < stol {
                break;
            }
        }
        tau
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn normalizes_angles() {
        assert_relative_eq!(190_f64.ang_normalize(), -170.0);
        assert_relative_eq!((-190_f64).ang_normalize(), 170.0);
        assert_relative_eq!(540_f64.ang_normalize(), 180.0);
        assert_relative_eq!((-540_f64).ang_normalize(), -180.0);
    }

    #[test]
    fn differences_wrap_around_antimeridian() {
        assert_relative_eq!(179_f64.ang_diff(-179.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!((-179_f64).ang_diff(179.0), -2.0, epsilon = 1e-12);
        assert_relative_eq!(3_f64.ang_diff(363.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rounds_half_to_even() {
        assert_relative_eq!(2.5_f64.round_half_even(), 2.0);
        assert_relative_eq!(3.5_f64.round_half_even(), 4.0);
        assert_relative_eq!((-2.5_f64).round_half_even(), -2.0);
        assert_relative_eq!(2.4_f64.round_half_even(), 2.0);
    }

    #[test]
    fn conformal_latitude_inverts() {
        let es = (crate::Ellipsoid::WGS84.e2()).sqrt();
        for tau in [-3.0_f64, -0.5, 0.0, 0.25, 1.0, 10.0] {
            let taup = tau.taupf(es);
            assert_relative_eq!(taup.tauf(es), tau, epsilon = 1e-12);
        }
    }

    #[test]
    fn evaluates_polynomials() {
        // 2x^2 + 3x + 4 at x = 2
        assert_relative_eq!(polyval(&[2.0, 3.0, 4.0], 2.0), 18.0);
    }
}
