//! Low-precision lunar ephemeris after Jean Meeus, *Astronomical Algorithms*
//! (2nd ed.), chapters 47-49.
//!
//! Illumination is good to a few tenths of a percent and phase instants to
//! about a minute over the modern era, which is far below the resolution of
//! the image set.

use crate::domain::ports::Ephemeris;
use crate::utils::error::{PhaseError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const J2000_JD: f64 = 2_451_545.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const LUNATIONS_PER_YEAR: f64 = 12.3685;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    New,
    Full,
}

impl Phase {
    fn k_offset(self) -> f64 {
        match self {
            Phase::New => 0.0,
            Phase::Full => 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MeeusEphemeris;

impl MeeusEphemeris {
    pub fn new() -> Self {
        Self
    }

    fn next_phase(&self, date: NaiveDate, phase: Phase) -> Result<NaiveDateTime> {
        let target = midnight_jd(date);
        let year = decimal_year(target);

        // Start a couple of lunations early so the first candidate is never past the target.
        let mut k = ((year - 2000.0) * LUNATIONS_PER_YEAR).floor() - 2.0 + phase.k_offset();

        for _ in 0..8 {
            let jde = phase_jde(k, phase);
            let jd = jde - delta_t(decimal_year(jde)) / SECONDS_PER_DAY;
            if jd > target {
                return jd_to_datetime(jd);
            }
            k += 1.0;
        }

        Err(PhaseError::Ephemeris {
            message: format!("no {:?} moon found after {}", phase, date),
        })
    }
}

impl Ephemeris for MeeusEphemeris {
    fn illumination(&self, date: NaiveDate) -> Result<f64> {
        let jd = midnight_jd(date);
        let jde = jd + delta_t(decimal_year(jd)) / SECONDS_PER_DAY;
        let percentage = illuminated_fraction(jde) * 100.0;

        if !percentage.is_finite() {
            return Err(PhaseError::Ephemeris {
                message: format!("illumination is not finite for {}", date),
            });
        }

        Ok(percentage.clamp(0.0, 100.0))
    }

    fn next_new_moon(&self, date: NaiveDate) -> Result<NaiveDateTime> {
        self.next_phase(date, Phase::New)
    }

    fn next_full_moon(&self, date: NaiveDate) -> Result<NaiveDateTime> {
        self.next_phase(date, Phase::Full)
    }
}

fn midnight_jd(date: NaiveDate) -> f64 {
    let seconds = date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
    seconds as f64 / SECONDS_PER_DAY + UNIX_EPOCH_JD
}

/// Truncates to whole seconds.
fn jd_to_datetime(jd: f64) -> Result<NaiveDateTime> {
    let seconds = ((jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY).floor();
    if !seconds.is_finite() {
        return Err(PhaseError::Ephemeris {
            message: format!("Julian day {} is not representable", jd),
        });
    }

    DateTime::from_timestamp(seconds as i64, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| PhaseError::Ephemeris {
            message: format!("Julian day {} is outside the supported calendar range", jd),
        })
}

fn decimal_year(jd: f64) -> f64 {
    2000.0 + (jd - J2000_JD) / 365.25
}

fn normalize_degrees(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

fn sin_deg(deg: f64) -> f64 {
    deg.to_radians().sin()
}

/// TT - UT in seconds, Espenak & Meeus polynomial fits.
fn delta_t(year: f64) -> f64 {
    let long_term = |y: f64| {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    };

    match year {
        y if y < 1900.0 => long_term(y),
        y if y < 1920.0 => {
            let t = y - 1900.0;
            -2.79 + 1.494119 * t - 0.0598939 * t.powi(2) + 0.0061966 * t.powi(3)
                - 0.000197 * t.powi(4)
        }
        y if y < 1941.0 => {
            let t = y - 1920.0;
            21.20 + 0.84493 * t - 0.076100 * t.powi(2) + 0.0020936 * t.powi(3)
        }
        y if y < 1961.0 => {
            let t = y - 1950.0;
            29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
        }
        y if y < 1986.0 => {
            let t = y - 1975.0;
            45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
        }
        y if y < 2005.0 => {
            let t = y - 2000.0;
            63.86 + 0.3345 * t - 0.060374 * t.powi(2)
                + 0.0017275 * t.powi(3)
                + 0.000651814 * t.powi(4)
                + 0.00002373599 * t.powi(5)
        }
        y if y < 2050.0 => {
            let t = y - 2000.0;
            62.92 + 0.32217 * t + 0.005589 * t.powi(2)
        }
        y if y < 2150.0 => long_term(y) - 0.5628 * (2150.0 - y),
        y => long_term(y),
    }
}

/// Fraction of the lunar disk lit by the Sun (0..=1) at `jde` (TT).
fn illuminated_fraction(jde: f64) -> f64 {
    let t = (jde - J2000_JD) / 36_525.0;

    // Mean elongation, solar anomaly and lunar anomaly (47.2-47.4)
    let d = normalize_degrees(
        297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t.powi(2) + t.powi(3) / 545_868.0
            - t.powi(4) / 113_065_000.0,
    );
    let m = normalize_degrees(
        357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t.powi(2) + t.powi(3) / 24_490_000.0,
    );
    let mp = normalize_degrees(
        134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t.powi(2) + t.powi(3) / 69_699.0
            - t.powi(4) / 14_712_000.0,
    );

    // Phase angle (48.4)
    let i = 180.0 - d - 6.289 * sin_deg(mp) + 2.100 * sin_deg(m)
        - 1.274 * sin_deg(2.0 * d - mp)
        - 0.658 * sin_deg(2.0 * d)
        - 0.214 * sin_deg(2.0 * mp)
        - 0.110 * sin_deg(d);

    (1.0 + i.to_radians().cos()) / 2.0
}

const NEW_MOON_TERMS: [f64; 25] = [
    -0.40720, 0.17241, 0.01608, 0.01039, 0.00739, -0.00514, 0.00208, -0.00111, -0.00057, 0.00056,
    -0.00042, 0.00042, 0.00038, -0.00024, -0.00017, -0.00007, 0.00004, 0.00004, 0.00003, 0.00003,
    -0.00003, 0.00003, -0.00002, -0.00002, 0.00002,
];

const FULL_MOON_TERMS: [f64; 25] = [
    -0.40614, 0.17302, 0.01614, 0.01043, 0.00734, -0.00515, 0.00209, -0.00111, -0.00057, 0.00056,
    -0.00042, 0.00042, 0.00038, -0.00024, -0.00017, -0.00007, 0.00004, 0.00004, 0.00003, 0.00003,
    -0.00003, 0.00003, -0.00002, -0.00002, 0.00002,
];

const PLANETARY_TERMS: [(f64, f64, f64); 14] = [
    (299.77, 0.107_408, 0.000_325),
    (251.88, 0.016_321, 0.000_165),
    (251.83, 26.651_886, 0.000_164),
    (349.42, 36.412_478, 0.000_126),
    (84.66, 18.206_239, 0.000_110),
    (141.74, 53.303_771, 0.000_062),
    (207.14, 2.453_732, 0.000_060),
    (154.84, 7.306_860, 0.000_056),
    (34.52, 27.261_239, 0.000_047),
    (207.19, 0.121_824, 0.000_042),
    (291.34, 1.844_379, 0.000_040),
    (161.72, 24.198_154, 0.000_037),
    (239.56, 25.513_099, 0.000_035),
    (331.55, 3.592_518, 0.000_023),
];

/// Instant (JDE, TT) of lunation `k`; integral k is a new moon, k + 0.5 a full moon.
fn phase_jde(k: f64, phase: Phase) -> f64 {
    let t = k / 1_236.85;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let mean = 2_451_550.097_66 + 29.530_588_861 * k + 0.000_154_37 * t2 - 0.000_000_150 * t3
        + 0.000_000_000_73 * t4;

    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;
    let m = normalize_degrees(2.5534 + 29.105_356_70 * k - 0.000_001_4 * t2 - 0.000_000_11 * t3);
    let mp = normalize_degrees(
        201.5643 + 385.816_935_28 * k + 0.010_758_2 * t2 + 0.000_012_38 * t3
            - 0.000_000_058 * t4,
    );
    let f = normalize_degrees(
        160.7108 + 390.670_502_84 * k - 0.001_611_8 * t2 - 0.000_002_27 * t3
            + 0.000_000_011 * t4,
    );
    let omega = normalize_degrees(124.7746 - 1.563_755_88 * k + 0.002_067_2 * t2 + 0.000_002_15 * t3);

    let arguments = [
        sin_deg(mp),
        e * sin_deg(m),
        sin_deg(2.0 * mp),
        sin_deg(2.0 * f),
        e * sin_deg(mp - m),
        e * sin_deg(mp + m),
        e * e * sin_deg(2.0 * m),
        sin_deg(mp - 2.0 * f),
        sin_deg(mp + 2.0 * f),
        e * sin_deg(2.0 * mp + m),
        sin_deg(3.0 * mp),
        e * sin_deg(m + 2.0 * f),
        e * sin_deg(m - 2.0 * f),
        e * sin_deg(2.0 * mp - m),
        sin_deg(omega),
        sin_deg(mp + 2.0 * m),
        sin_deg(2.0 * mp - 2.0 * f),
        sin_deg(3.0 * m),
        sin_deg(mp + m - 2.0 * f),
        sin_deg(2.0 * mp + 2.0 * f),
        sin_deg(mp + m + 2.0 * f),
        sin_deg(mp - m + 2.0 * f),
        sin_deg(mp - m - 2.0 * f),
        sin_deg(3.0 * mp + m),
        sin_deg(4.0 * mp),
    ];

    let coefficients = match phase {
        Phase::New => &NEW_MOON_TERMS,
        Phase::Full => &FULL_MOON_TERMS,
    };

    let periodic: f64 = coefficients
        .iter()
        .zip(arguments.iter())
        .map(|(c, a)| c * a)
        .sum();

    let planetary: f64 = PLANETARY_TERMS
        .iter()
        .enumerate()
        .map(|(n, &(base, rate, amplitude))| {
            // A1 carries an extra T^2 term
            let angle = if n == 0 {
                base + rate * k - 0.009_173 * t2
            } else {
                base + rate * k
            };
            amplitude * sin_deg(angle)
        })
        .sum();

    mean + periodic + planetary
}
