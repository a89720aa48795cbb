use std::{fmt::Display, str::FromStr};

use crate::{
    constants::{
        MAXUTMZONE, MGRS_MAX_PRECISION, MGRS_MAX_UTM_LAT, MGRS_MIN_UTM_LAT, MINUTMZONE, ONEHT, TWOMIL,
        UTM_FALSE_EASTING, UTM_FALSE_NORTHING_SOUTH, UTM_MAX_EASTING,
    },
    log::debug,
    utility::GeoMath,
    Checked, Ellipsoid, Error, GeodeticPoint, Hemisphere, ThisOrThat, Ups, Utm, UtmOptions, Warning,
};

/// A letter of the MGRS alphabet, which has no I or O.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Letter {
    A, B, C, D, E, F, G, H, J, K, L, M, N, P, Q, R, S, T, U, V, W, X, Y, Z,
}

const ALPHABET: &[u8; 24] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

impl Letter {
    const ALL: [Letter; 24] = [
        Letter::A, Letter::B, Letter::C, Letter::D, Letter::E, Letter::F, Letter::G, Letter::H,
        Letter::J, Letter::K, Letter::L, Letter::M, Letter::N, Letter::P, Letter::Q, Letter::R,
        Letter::S, Letter::T, Letter::U, Letter::V, Letter::W, Letter::X, Letter::Y, Letter::Z,
    ];

    /// Position in the 24-letter alphabet, `A = 0`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Letter> {
        Letter::ALL.get(index).copied()
    }

    pub fn as_char(self) -> char {
        char::from(ALPHABET[self.index()])
    }
}

impl TryFrom<char> for Letter {
    type Error = Error;

    /// Case-insensitive. I and O are rejected.
    fn try_from(value: char) -> Result<Self, Self::Error> {
        let upper = value.to_ascii_uppercase();
        ALPHABET
            .iter()
            .position(|&c| char::from(c) == upper)
            .and_then(Letter::from_index)
            .ok_or_else(|| Error::MalformedMgrs(format!("{value:?} is not an MGRS letter")))
    }
}

impl Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An MGRS latitude band, with the northing range its row letters resolve to.
#[derive(Debug)]
struct LatitudeBand {
    letter: Letter,
    min_lat: f64,
    max_lat: f64,
    // Smallest northing in the band, rounded down to 100 km
    min_northing: f64,
    // Multiple of 2,000 km added to the row letter northing
    northing_offset: f64,
}

const fn band(letter: Letter, min_lat: f64, max_lat: f64, min_northing: f64, northing_offset: f64) -> LatitudeBand {
    LatitudeBand { letter, min_lat, max_lat, min_northing, northing_offset }
}

const LATITUDE_BANDS: [LatitudeBand; 20] = [
    band(Letter::C, -80.5, -72., 1_100_000., 0.),
    band(Letter::D, -72., -64., 2_000_000., 2_000_000.),
    band(Letter::E, -64., -56., 2_800_000., 2_000_000.),
    band(Letter::F, -56., -48., 3_700_000., 2_000_000.),
    band(Letter::G, -48., -40., 4_600_000., 4_000_000.),
    band(Letter::H, -40., -32., 5_500_000., 4_000_000.),
    band(Letter::J, -32., -24., 6_400_000., 6_000_000.),
    band(Letter::K, -24., -16., 7_300_000., 6_000_000.),
    band(Letter::L, -16., -8., 8_200_000., 8_000_000.),
    band(Letter::M, -8., 0., 9_100_000., 8_000_000.),
    band(Letter::N, 0., 8., 0., 0.),
    band(Letter::P, 8., 16., 800_000., 0.),
    band(Letter::Q, 16., 24., 1_700_000., 0.),
    band(Letter::R, 24., 32., 2_600_000., 2_000_000.),
    band(Letter::S, 32., 40., 3_500_000., 2_000_000.),
    band(Letter::T, 40., 48., 4_400_000., 4_000_000.),
    band(Letter::U, 48., 56., 5_300_000., 4_000_000.),
    band(Letter::V, 56., 64., 6_200_000., 6_000_000.),
    band(Letter::W, 64., 72., 7_000_000., 6_000_000.),
    band(Letter::X, 72., 84.5, 7_900_000., 6_000_000.),
];

impl LatitudeBand {
    fn of(letter: Letter) -> Option<&'static LatitudeBand> {
        LATITUDE_BANDS.iter().find(|band| band.letter == letter)
    }

    /// Compares against the band edges directly, the same way the UTM zone
    /// exceptions at 56°N and 72°N do.
    fn containing(lat: f64) -> Result<&'static LatitudeBand, Error> {
        let (first, last) = (&LATITUDE_BANDS[0], &LATITUDE_BANDS[19]);

        LATITUDE_BANDS
            .iter()
            .filter(|_| lat > first.min_lat)
            .find(|band| lat >= band.min_lat && lat < band.max_lat)
            .ok_or(Error::LatitudeOutOfRange { latitude: lat, min: first.min_lat, max: last.max_lat })
    }

    fn is_north(&self) -> bool {
        self.letter >= Letter::N
    }
}

/// Grid square lettering of one half of a UPS polar cap.
#[derive(Debug)]
struct PolarGrid {
    letter: Letter,
    hemisphere: Hemisphere,
    columns: &'static [Letter],
    column_origin: f64,
    rows: &'static [Letter],
    row_origin: f64,
}

use Letter as Ltr;

const SOUTH_ROWS: &[Letter] = &Letter::ALL;
const NORTH_ROWS: &[Letter] = &[
    Ltr::A, Ltr::B, Ltr::C, Ltr::D, Ltr::E, Ltr::F, Ltr::G, Ltr::H, Ltr::J, Ltr::K, Ltr::L, Ltr::M, Ltr::N, Ltr::P,
];

const POLAR_GRIDS: [PolarGrid; 4] = [
    PolarGrid {
        letter: Ltr::A,
        hemisphere: Hemisphere::South,
        columns: &[Ltr::J, Ltr::K, Ltr::L, Ltr::P, Ltr::Q, Ltr::R, Ltr::S, Ltr::T, Ltr::U, Ltr::X, Ltr::Y, Ltr::Z],
        column_origin: 800_000.,
        rows: SOUTH_ROWS,
        row_origin: 800_000.,
    },
    PolarGrid {
        letter: Ltr::B,
        hemisphere: Hemisphere::South,
        columns: &[Ltr::A, Ltr::B, Ltr::C, Ltr::F, Ltr::G, Ltr::H, Ltr::J, Ltr::K, Ltr::L, Ltr::P, Ltr::Q, Ltr::R],
        column_origin: 2_000_000.,
        rows: SOUTH_ROWS,
        row_origin: 800_000.,
    },
    PolarGrid {
        letter: Ltr::Y,
        hemisphere: Hemisphere::North,
        columns: &[Ltr::R, Ltr::S, Ltr::T, Ltr::U, Ltr::X, Ltr::Y, Ltr::Z],
        column_origin: 1_300_000.,
        rows: NORTH_ROWS,
        row_origin: 1_300_000.,
    },
    PolarGrid {
        letter: Ltr::Z,
        hemisphere: Hemisphere::North,
        columns: &[Ltr::A, Ltr::B, Ltr::C, Ltr::F, Ltr::G, Ltr::H, Ltr::J],
        column_origin: 2_000_000.,
        rows: NORTH_ROWS,
        row_origin: 1_300_000.,
    },
];

impl PolarGrid {
    fn of(letter: Letter) -> Option<&'static PolarGrid> {
        POLAR_GRIDS.iter().find(|grid| grid.letter == letter)
    }

    fn containing(hemisphere: Hemisphere, easting: f64) -> &'static PolarGrid {
        let east = easting >= TWOMIL;
        match hemisphere {
            Hemisphere::South => &POLAR_GRIDS[east.ternary(1, 0)],
            Hemisphere::North => &POLAR_GRIDS[east.ternary(3, 2)],
        }
    }
}

/// First column letter index and row offset of a UTM zone's 100 km grid.
fn grid_values(zone: i32, ellipsoid: &Ellipsoid) -> (usize, f64) {
    let set = match zone % 6 {
        0 => 6,
        set => set,
    };

    let start = match set {
        1 | 4 => Letter::A,
        2 | 5 => Letter::J,
        _ => Letter::S,
    };

    let even = set % 2 == 0;
    let offset = if ellipsoid.legacy_lettering() {
        even.ternary(1_500_000., 1_000_000.)
    } else {
        even.ternary(500_000., 0.)
    };

    (start.index(), offset)
}

/// Size of the smallest digit at `precision`, in meters.
fn resolution(precision: i32) -> f64 {
    10_f64.powi(MGRS_MAX_PRECISION - precision)
}

fn check_precision(precision: i32) -> Result<(), Error> {
    if (0..=MGRS_MAX_PRECISION).contains(&precision) {
        Ok(())
    } else {
        Err(Error::PrecisionOutOfRange(precision))
    }
}

/// Meters within the 100 km square, truncated to the resolution.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn square_offset(value: f64, divisor: f64) -> u32 {
    (((value % ONEHT) / divisor).floor() * divisor) as u32
}

/// Representation of an
/// [MGRS](https://en.wikipedia.org/wiki/Military_Grid_Reference_System)
/// grid reference. UTM references carry a zone; UPS references don't.
///
/// The digits locate the south-west corner of a square of side
/// `10^(5 - precision)` meters within the 100 km square named by the letters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mgrs {
    zone: Option<i32>,
    band: Letter,
    column: Letter,
    row: Letter,
    easting: u32,
    northing: u32,
    precision: i32,
    ellipsoid: Ellipsoid,
}

impl Mgrs {
    /// UTM zone, or `None` for polar references.
    pub fn zone(&self) -> Option<i32> {
        self.zone
    }

    pub fn is_utm(&self) -> bool {
        self.zone.is_some()
    }

    /// Latitude band letter, or the polar letter A, B, Y or Z.
    pub fn band(&self) -> Letter {
        self.band
    }

    pub fn column(&self) -> Letter {
        self.column
    }

    pub fn row(&self) -> Letter {
        self.row
    }

    pub fn is_north(&self) -> bool {
        self.band >= Letter::N
    }

    /// Easting within the 100 km square, in meters.
    pub fn easting(&self) -> u32 {
        self.easting
    }

    /// Northing within the 100 km square, in meters.
    pub fn northing(&self) -> u32 {
        self.northing
    }

    pub fn precision(&self) -> i32 {
        self.precision
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    /// Interprets the reference against another ellipsoid, which also selects
    /// the grid lettering pattern used when decoding.
    pub fn with_ellipsoid(self, ellipsoid: Ellipsoid) -> Mgrs {
        Mgrs {
            ellipsoid,
            ..self
        }
    }

    /// Encodes a WGS84 point. Latitudes from 80°S to 84°N use UTM, the polar
    /// caps use UPS.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PrecisionOutOfRange`] if `precision` is not in `[0, 5]`.
    ///
    /// # Usage
    ///
    /// ```
    /// use gridref::{GeodeticPoint, Mgrs};
    ///
    /// let point = GeodeticPoint::create(40.748333, -73.985278).unwrap();
    /// assert_eq!(Mgrs::from_geodetic(&point, 5).unwrap().to_string(), "18TWL8566411315");
    /// assert_eq!(Mgrs::from_geodetic(&point, 2).unwrap().to_string(), "18TWL8611");
    ///
    /// let pole = GeodeticPoint::create(90.0, 0.0).unwrap();
    /// assert_eq!(Mgrs::from_geodetic(&pole, 5).unwrap().to_string(), "ZAH0000000000");
    /// ```
    pub fn from_geodetic(value: &GeodeticPoint, precision: i32) -> Result<Mgrs, Error> {
        Mgrs::from_geodetic_on(value, precision, Ellipsoid::WGS84)
    }

    /// Same as [`Mgrs::from_geodetic`], projecting on `ellipsoid`.
    ///
    /// # Errors
    ///
    /// Same as [`Mgrs::from_geodetic`].
    pub fn from_geodetic_on(value: &GeodeticPoint, precision: i32, ellipsoid: Ellipsoid) -> Result<Mgrs, Error> {
        check_precision(precision)?;

        let lat = value.latitude();
        if (MGRS_MIN_UTM_LAT..=MGRS_MAX_UTM_LAT).contains(&lat) {
            debug!(lat, "encoding MGRS through UTM");
            let options = UtmOptions { ellipsoid: Some(ellipsoid), ..UtmOptions::default() };
            let utm = Utm::from_geodetic_with(value, &options)?;
            Mgrs::encode_utm(&utm, lat, precision)
        } else {
            debug!(lat, "encoding MGRS through UPS");
            Mgrs::from_ups(&Ups::from_geodetic_on(value, ellipsoid)?, precision)
        }
    }

    /// Encodes a UTM coordinate without going through latitude/longitude,
    /// other than to find its latitude band.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PrecisionOutOfRange`] if `precision` is not in `[0, 5]`,
    /// and [`Error::LatitudeOutOfRange`] if the coordinate is outside the MGRS
    /// latitude bands.
    ///
    /// ```
    /// use gridref::{Hemisphere, Mgrs, Utm};
    ///
    /// let utm = Utm::create(18, Hemisphere::North, 585664.121, 4511315.422).unwrap();
    /// assert_eq!(Mgrs::from_utm(&utm, 3).unwrap().to_string(), "18TWL857113");
    /// ```
    pub fn from_utm(value: &Utm, precision: i32) -> Result<Mgrs, Error> {
        check_precision(precision)?;
        let lat = value.to_geodetic()?.value().latitude();
        Mgrs::encode_utm(value, lat, precision)
    }

    /// Encodes a UPS coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PrecisionOutOfRange`] if `precision` is not in `[0, 5]`,
    /// and easting/northing range errors if the coordinate falls outside the
    /// lettered part of the polar grid.
    pub fn from_ups(value: &Ups, precision: i32) -> Result<Mgrs, Error> {
        check_precision(precision)?;

        let divisor = resolution(precision);
        let easting = (value.easting / divisor).round_half_even() * divisor;
        let northing = (value.northing / divisor).round_half_even() * divisor;

        let grid = PolarGrid::containing(value.hemisphere, easting);

        let (column, easting) = polar_square(grid.columns, grid.column_origin, easting, value.easting, divisor)
            .ok_or(Error::EastingOutOfRange {
                easting: value.easting,
                min: grid.column_origin,
                max: grid.column_origin + extent(grid.columns),
            })?;
        let (row, northing) = polar_square(grid.rows, grid.row_origin, northing, value.northing, divisor)
            .ok_or(Error::NorthingOutOfRange {
                northing: value.northing,
                min: grid.row_origin,
                max: grid.row_origin + extent(grid.rows),
            })?;

        Ok(Mgrs {
            zone: None,
            band: grid.letter,
            column,
            row,
            easting: square_offset(easting, divisor),
            northing: square_offset(northing, divisor),
            precision,
            ellipsoid: value.ellipsoid,
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn encode_utm(value: &Utm, lat: f64, precision: i32) -> Result<Mgrs, Error> {
        let divisor = resolution(precision);
        let mut easting = (value.easting / divisor).round_half_even() * divisor;
        let mut northing = (value.northing / divisor).round_half_even() * divisor;
        // A point the UTM layer already moved onto the equator keeps band N
        let mut lat = (value.hemisphere.is_north() && lat < 0.).ternary(0., lat);

        // Just south of the equator, rounding can reach the northern origin
        if lat <= 0. && northing.eps_eq(UTM_FALSE_NORTHING_SOUTH) {
            lat = 0.;
            northing = 0.;
        }
        // Keep the last column when rounding reaches the grid edge
        if easting >= UTM_MAX_EASTING {
            easting = UTM_MAX_EASTING - divisor;
        }

        let band = LatitudeBand::containing(lat)?;
        let (start, offset) = grid_values(value.zone, &value.ellipsoid);

        // 31V is truncated at 3°E
        if value.zone == 31 && band.letter == Letter::V && easting >= UTM_FALSE_EASTING {
            easting = UTM_FALSE_EASTING - divisor;
        }

        let mut grid_northing = northing % TWOMIL + offset;
        if grid_northing >= TWOMIL {
            grid_northing -= TWOMIL;
        }

        let row = Letter::from_index((grid_northing / ONEHT).floor() as usize).ok_or(Error::NorthingOutOfRange {
            northing: value.northing,
            min: 0.,
            max: UTM_FALSE_NORTHING_SOUTH,
        })?;
        let column = ((easting / ONEHT).floor() as usize)
            .checked_sub(1)
            .and_then(|column| Letter::from_index(start + column))
            .ok_or(Error::EastingOutOfRange {
                easting: value.easting,
                min: ONEHT,
                max: UTM_MAX_EASTING,
            })?;

        Ok(Mgrs {
            zone: Some(value.zone),
            band: band.letter,
            column,
            row,
            easting: square_offset(easting, divisor),
            northing: square_offset(northing, divisor),
            precision,
            ellipsoid: value.ellipsoid,
        })
    }

    /// Recovers the UTM coordinate of the south-west corner of the square.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMgrs`] for a polar reference, or if the grid
    /// letters don't exist in the zone and band.
    ///
    /// ```
    /// use gridref::Mgrs;
    ///
    /// let utm = "18TWL8566411315".parse::<Mgrs>().unwrap().to_utm().unwrap();
    /// assert_eq!((utm.easting(), utm.northing()), (585664.0, 4511315.0));
    /// ```
    pub fn to_utm(&self) -> Result<Utm, Error> {
        let zone = self.zone.ok_or_else(|| Error::MalformedMgrs(format!("{self} has no UTM zone")))?;
        let band = LatitudeBand::of(self.band)
            .ok_or_else(|| Error::MalformedMgrs(format!("{} is not a latitude band", self.band)))?;

        if band.letter == Letter::X && matches!(zone, 32 | 34 | 36) {
            return Err(Error::MalformedMgrs(format!("Zone {zone} does not exist in band X")));
        }
        if band.letter == Letter::V && zone == 31 && self.column > Letter::D {
            return Err(Error::MalformedMgrs(format!("Column {} does not exist in zone 31V", self.column)));
        }

        let (start, offset) = grid_values(zone, &self.ellipsoid);
        let column = self.column.index()
            .checked_sub(start)
            .filter(|&column| column < 8)
            .ok_or_else(|| Error::MalformedMgrs(format!("Column {} does not exist in zone {zone}", self.column)))?;
        if self.row > Letter::V {
            return Err(Error::MalformedMgrs(format!("Row {} does not exist in UTM", self.row)));
        }

        let mut grid_northing = ONEHT * squares(self.row.index()) - offset;
        if grid_northing < 0. {
            grid_northing += TWOMIL;
        }
        grid_northing += band.northing_offset;
        if grid_northing < band.min_northing {
            grid_northing += TWOMIL;
        }

        let easting = ONEHT * squares(column + 1) + f64::from(self.easting);
        let northing = grid_northing + f64::from(self.northing);
        let hemisphere = band.is_north().ternary(Hemisphere::North, Hemisphere::South);

        Ok(Utm::new(zone, hemisphere, easting, northing, self.ellipsoid))
    }

    /// Recovers the UPS coordinate of the south-west corner of the square.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMgrs`] for a UTM reference, or if the grid
    /// letters don't exist in the polar grid.
    ///
    /// ```
    /// use gridref::{Hemisphere, Mgrs};
    ///
    /// let ups = "BAN0000000000".parse::<Mgrs>().unwrap().to_ups().unwrap();
    /// assert_eq!(ups.hemisphere(), Hemisphere::South);
    /// assert_eq!((ups.easting(), ups.northing()), (2_000_000.0, 2_000_000.0));
    /// ```
    pub fn to_ups(&self) -> Result<Ups, Error> {
        if self.zone.is_some() {
            return Err(Error::MalformedMgrs(format!("{self} is not a polar reference")));
        }
        let grid = PolarGrid::of(self.band)
            .ok_or_else(|| Error::MalformedMgrs(format!("{} is not a polar letter", self.band)))?;

        let column = grid.columns.iter().position(|&c| c == self.column).ok_or_else(|| {
            Error::MalformedMgrs(format!("Column {} does not exist in polar grid {}", self.column, grid.letter))
        })?;
        let row = grid.rows.iter().position(|&r| r == self.row).ok_or_else(|| {
            Error::MalformedMgrs(format!("Row {} does not exist in polar grid {}", self.row, grid.letter))
        })?;

        let easting = grid.column_origin + ONEHT * squares(column) + f64::from(self.easting);
        let northing = grid.row_origin + ONEHT * squares(row) + f64::from(self.northing);

        Ok(Ups::new(grid.hemisphere, easting, northing, self.ellipsoid))
    }

    /// Decodes to the south-west corner of the square.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMgrs`] if the letters don't exist in the zone,
    /// or a range error if the reference doesn't name a valid location.
    ///
    /// A [`Warning::LatitudeBandMismatch`] is attached if the decoded latitude
    /// is outside the band named by the band letter.
    pub fn to_geodetic(&self) -> Result<Checked<GeodeticPoint>, Error> {
        if self.zone.is_none() {
            return Ok(Checked::new(self.to_ups()?.to_geodetic()?));
        }

        let mut point = self.to_utm()?.to_geodetic()?;

        if let Some(band) = LatitudeBand::of(self.band) {
            let tolerance = 10_f64.powi(-self.precision);
            let lat = point.value().latitude();
            if lat < band.min_lat - tolerance || lat > band.max_lat + tolerance {
                point.warn(Warning::LatitudeBandMismatch {
                    band: band.letter.as_char(),
                    latitude: lat,
                    min: band.min_lat,
                    max: band.max_lat,
                });
            }
        }

        Ok(point)
    }
}

/// Number of 100 km squares as a distance multiplier. Never more than 24.
#[allow(clippy::cast_precision_loss)]
fn squares(count: usize) -> f64 {
    count as f64
}

/// Width of a run of 100 km squares, in meters.
fn extent(letters: &[Letter]) -> f64 {
    ONEHT * squares(letters.len())
}

/// Letter and rounded coordinate of a polar grid square. A value that only
/// reaches the outer edge through rounding stays in the last square.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn polar_square(letters: &[Letter], origin: f64, rounded: f64, exact: f64, divisor: f64) -> Option<(Letter, f64)> {
    let edge = origin + extent(letters);
    let value = (rounded >= edge && exact < edge).ternary(edge - divisor, rounded);

    if value < origin {
        return None;
    }

    letters
        .get(((value - origin) / ONEHT).floor() as usize)
        .map(|&letter| (letter, value))
}

impl FromStr for Mgrs {
    type Err = Error;

    /// Parses a reference, ignoring whitespace and case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        let zone_len = value.chars().take_while(char::is_ascii_digit).count();
        if zone_len > 2 {
            return Err(Error::MalformedMgrs(format!("More than 2 digits at start of {value}")));
        }

        let zone = if zone_len == 0 {
            None
        } else {
            let zone = value[..zone_len]
                .parse::<i32>()
                .map_err(|e| Error::MalformedMgrs(format!("Zone {}: {e}", &value[..zone_len])))?;
            if !(MINUTMZONE..=MAXUTMZONE).contains(&zone) {
                return Err(Error::ZoneOutOfRange(zone));
            }
            Some(zone)
        };

        let mut rest = value[zone_len..].chars();
        let mut letters = [Letter::A; 3];
        for letter in &mut letters {
            let c = rest
                .next()
                .filter(char::is_ascii_alphabetic)
                .ok_or_else(|| Error::MalformedMgrs(format!("Expected 3 letters in {value}")))?;
            *letter = Letter::try_from(c)?;
        }
        let [band, column, row] = letters;

        match zone {
            Some(_) if LatitudeBand::of(band).is_none() => {
                return Err(Error::MalformedMgrs(format!("Band letter {band} not in UTM set CDEFGHJKLMNPQRSTUVWX")));
            },
            None if PolarGrid::of(band).is_none() => {
                return Err(Error::MalformedMgrs(format!("Band letter {band} not in UPS set ABYZ")));
            },
            _ => {},
        }

        let digits = rest.as_str();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::MalformedMgrs(format!("Encountered a non-digit in {digits}")));
        }
        if digits.len() % 2 == 1 {
            return Err(Error::MalformedMgrs(format!("Not an even number of digits in {digits}")));
        }
        if digits.len() > 2 * MGRS_MAX_PRECISION.unsigned_abs() as usize {
            return Err(Error::MalformedMgrs(format!("More than {} digits in {digits}", 2 * MGRS_MAX_PRECISION)));
        }

        let half = digits.len() / 2;
        let precision = i32::try_from(half).map_err(|e| Error::MalformedMgrs(e.to_string()))?;
        let unit = 10_u32.pow(MGRS_MAX_PRECISION.unsigned_abs() - precision.unsigned_abs());
        let parse = |digits: &str| -> Result<u32, Error> {
            if digits.is_empty() {
                return Ok(0);
            }
            digits
                .parse::<u32>()
                .map(|v| v * unit)
                .map_err(|e| Error::MalformedMgrs(format!("{digits}: {e}")))
        };

        Ok(Mgrs {
            zone,
            band,
            column,
            row,
            easting: parse(&digits[..half])?,
            northing: parse(&digits[half..])?,
            precision,
            ellipsoid: Ellipsoid::WGS84,
        })
    }
}

impl Display for Mgrs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(zone) = self.zone {
            write!(f, "{zone:02}")?;
        }
        write!(f, "{}{}{}", self.band, self.column, self.row)?;

        if self.precision > 0 {
            let unit = 10_u32.pow(MGRS_MAX_PRECISION.unsigned_abs() - self.precision.unsigned_abs());
            let width = self.precision.unsigned_abs() as usize;
            write!(
                f,
                "{:0width$}{:0width$}",
                self.easting / unit,
                self.northing / unit,
            )?;
        }

        Ok(())
    }
}
