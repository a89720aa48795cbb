// Width of an MGRS grid square / tile in meters
pub(crate) const ONEHT: f64 = 100_000.;
// Period of the UTM row letters in meters
pub(crate) const TWOMIL: f64 = 2_000_000.;

// UTM central scale factor
pub(crate) const UTM_K0: f64 = 9996.0 / 10_000.;
pub(crate) const UTM_FALSE_EASTING: f64 = 500_000.;
pub(crate) const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.;
pub(crate) const UTM_MIN_EASTING: f64 = 100_000.;
pub(crate) const UTM_MAX_EASTING: f64 = 900_000.;
pub(crate) const UTM_MIN_NORTHING: f64 = 0.;
pub(crate) const UTM_MAX_NORTHING: f64 = 10_000_000.;
// Latitudes the UTM projection accepts
pub(crate) const UTM_MIN_LAT: f64 = -82.;
pub(crate) const UTM_MAX_LAT: f64 = 86.;
pub(crate) const MINUTMZONE: i32 = 1;
pub(crate) const MAXUTMZONE: i32 = 60;

// Latitude of true scale for UPS, equivalent to a central scale factor of 0.994
#[allow(clippy::unreadable_literal)]
pub(crate) const UPS_TRUE_SCALE_LAT: f64 = 81.114528;
pub(crate) const UPS_FALSE_EASTING: f64 = 2_000_000.;
pub(crate) const UPS_FALSE_NORTHING: f64 = 2_000_000.;
pub(crate) const UPS_MIN_EAST_NORTH: f64 = 0.;
pub(crate) const UPS_MAX_EAST_NORTH: f64 = 4_000_000.;
// Polar caps the UPS projection accepts
pub(crate) const UPS_MIN_NORTH_LAT: f64 = 72.;
pub(crate) const UPS_MAX_SOUTH_LAT: f64 = -72.;

// MGRS uses UTM between these latitudes and UPS outside them
pub(crate) const MGRS_MIN_UTM_LAT: f64 = -80.;
pub(crate) const MGRS_MAX_UTM_LAT: f64 = 84.;
pub(crate) const MGRS_MAX_PRECISION: i32 = 5;

// Transverse Mercator accuracy degrades beyond this distance from the central meridian
pub(crate) const TM_LON_WARNING: f64 = 9.;
