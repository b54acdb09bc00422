//! Astronomical positioning: the ephemeris contract, a low-precision built-in
//! model, and the time-of-day star rotation.

use std::f64::consts::{PI, TAU};

use chrono::{DateTime, TimeZone, Timelike, Utc};
use glam::{DMat4, DVec3};

/// Mean equatorial radius used to scale the lunar parallax, meters.
const EARTH_RADIUS_M: f64 = 6_378_140.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Source of sun, moon and star positions for a simulated date/time.
pub trait Ephemeris: Send + Sync {
    /// Direction to the sun in ECEF. Callers normalize the result.
    fn sun_position_ecef(&self, date_time: &DateTime<Utc>) -> DVec3;

    /// Position of the moon in ECEF, meters.
    fn moon_position_ecef(&self, date_time: &DateTime<Utc>) -> DVec3;

    /// Point at `radius` in the direction given by right ascension (hours)
    /// and declination (degrees), in the frame the star rotation applies to.
    fn position_from_ra_decl(&self, right_ascension: f64, declination: f64, radius: f64) -> DVec3 {
        let ra = (right_ascension * 15.0).to_radians();
        let decl = declination.to_radians();
        DVec3::new(
            radius * decl.cos() * ra.cos(),
            radius * decl.cos() * ra.sin(),
            radius * decl.sin(),
        )
    }
}

/// Analytic low-precision ephemeris.
///
/// The sun follows the Astronomical Almanac's low-precision series (about
/// 0.01° over 1950-2050); the moon uses the truncated six-term longitude
/// series (a few tenths of a degree). Both are rotated from the true-of-date
/// equatorial frame into ECEF by Greenwich mean sidereal time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleEphemeris;

impl Ephemeris for SimpleEphemeris {
    fn sun_position_ecef(&self, date_time: &DateTime<Utc>) -> DVec3 {
        let d = days_since_j2000(date_time);
        let mean_longitude = 280.460 + 0.985_647_4 * d;
        let mean_anomaly = (357.528 + 0.985_600_3 * d).to_radians();
        let ecliptic_longitude = (mean_longitude
            + 1.915 * mean_anomaly.sin()
            + 0.020 * (2.0 * mean_anomaly).sin())
        .to_radians();
        let obliquity = obliquity_radians(d);

        let eci = ecliptic_to_equatorial(ecliptic_longitude, 0.0, obliquity);
        eci_to_ecef(eci, greenwich_mean_sidereal_time(date_time)).normalize()
    }

    fn moon_position_ecef(&self, date_time: &DateTime<Utc>) -> DVec3 {
        let d = days_since_j2000(date_time);
        let t = d / DAYS_PER_JULIAN_CENTURY;
        let s = |a: f64, b: f64| (a + b * t).to_radians().sin();
        let c = |a: f64, b: f64| (a + b * t).to_radians().cos();

        let longitude = 218.32 + 481_267.881 * t + 6.29 * s(135.0, 477_198.87)
            - 1.27 * s(259.3, -413_335.36)
            + 0.66 * s(235.7, 890_534.22)
            + 0.21 * s(269.9, 954_397.74)
            - 0.19 * s(357.5, 35_999.05)
            - 0.11 * s(186.5, 966_404.03);
        let latitude = 5.13 * s(93.3, 483_202.02) + 0.28 * s(228.2, 960_400.89)
            - 0.28 * s(318.3, 6_003.15)
            - 0.17 * s(217.6, -407_332.21);
        let parallax = 0.9508
            + 0.0518 * c(135.0, 477_198.87)
            + 0.0095 * c(259.3, -413_335.36)
            + 0.0078 * c(235.7, 890_534.22)
            + 0.0028 * c(269.9, 954_397.74);
        let distance = EARTH_RADIUS_M / parallax.to_radians().sin();

        let eci = ecliptic_to_equatorial(
            longitude.to_radians(),
            latitude.to_radians(),
            obliquity_radians(d),
        );
        eci_to_ecef(eci, greenwich_mean_sidereal_time(date_time)) * distance
    }
}

/// Fractional hours since midnight UTC, `[0, 24)`.
pub fn hours_of_day(date_time: &DateTime<Utc>) -> f64 {
    date_time.hour() as f64
        + date_time.minute() as f64 / 60.0
        + (date_time.second() as f64 + date_time.nanosecond() as f64 * 1e-9) / 3600.0
}

/// Star-field rotation angle about the vertical axis: `-π` at midnight,
/// rising linearly to `π` at the next midnight.
pub fn star_rotation_angle(date_time: &DateTime<Utc>) -> f64 {
    -PI + TAU * (hours_of_day(date_time) / 24.0)
}

/// The star transform for a date/time.
pub fn stars_matrix(date_time: &DateTime<Utc>) -> DMat4 {
    DMat4::from_rotation_z(-star_rotation_angle(date_time))
}

/// Greenwich mean sidereal time in radians.
pub fn greenwich_mean_sidereal_time(date_time: &DateTime<Utc>) -> f64 {
    let d = days_since_j2000(date_time);
    let t = d / DAYS_PER_JULIAN_CENTURY;
    let degrees = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    degrees.rem_euclid(360.0).to_radians()
}

fn days_since_j2000(date_time: &DateTime<Utc>) -> f64 {
    let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).single();
    match j2000 {
        Some(epoch) => (*date_time - epoch).num_milliseconds() as f64 / (1000.0 * SECONDS_PER_DAY),
        None => 0.0,
    }
}

fn obliquity_radians(days: f64) -> f64 {
    (23.439 - 0.000_000_4 * days).to_radians()
}

fn ecliptic_to_equatorial(longitude: f64, latitude: f64, obliquity: f64) -> DVec3 {
    let (sin_l, cos_l) = longitude.sin_cos();
    let (sin_b, cos_b) = latitude.sin_cos();
    let (sin_e, cos_e) = obliquity.sin_cos();
    DVec3::new(
        cos_b * cos_l,
        cos_e * cos_b * sin_l - sin_e * sin_b,
        sin_e * cos_b * sin_l + cos_e * sin_b,
    )
}

fn eci_to_ecef(eci: DVec3, gmst: f64) -> DVec3 {
    let (sin_g, cos_g) = gmst.sin_cos();
    DVec3::new(
        cos_g * eci.x + sin_g * eci.y,
        -sin_g * eci.x + cos_g * eci.y,
        eci.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_star_angle_follows_time_of_day() {
        for (h, m) in [(0, 0), (6, 0), (12, 0), (18, 30), (23, 59)] {
            let dt = utc(2024, 5, 1, h, m, 0);
            let hours = h as f64 + m as f64 / 60.0;
            let expected = -PI + TAU * hours / 24.0;
            assert!(
                (star_rotation_angle(&dt) - expected).abs() < 1e-12,
                "angle mismatch at {h}:{m}"
            );
        }
        assert!((star_rotation_angle(&utc(2024, 5, 1, 12, 0, 0))).abs() < 1e-12);
    }

    #[test]
    fn test_hours_of_day_includes_seconds() {
        let dt = utc(2020, 1, 1, 1, 30, 36);
        assert!((hours_of_day(&dt) - 1.51).abs() < 1e-12);
    }

    #[test]
    fn test_stars_matrix_rotates_about_z() {
        let dt = utc(2024, 5, 1, 18, 0, 0);
        let m = stars_matrix(&dt);
        let z = m.transform_vector3(DVec3::Z);
        assert!((z - DVec3::Z).length() < 1e-12);
        // angle = +π/2, so the matrix rotates by -π/2: X goes to -Y.
        let x = m.transform_vector3(DVec3::X);
        assert!((x - DVec3::NEG_Y).length() < 1e-12, "got {x:?}");
    }

    #[test]
    fn test_sun_direction_is_unit() {
        let eph = SimpleEphemeris;
        for dt in [utc(2000, 1, 1, 12, 0, 0), utc(2024, 6, 21, 3, 15, 0)] {
            let sun = eph.sun_position_ecef(&dt);
            assert!((sun.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sun_declination_at_solstice() {
        let sun = SimpleEphemeris.sun_position_ecef(&utc(2024, 6, 20, 20, 51, 0));
        let declination = sun.z.asin().to_degrees();
        assert!(
            (declination - 23.44).abs() < 0.1,
            "June solstice declination {declination}"
        );
    }

    #[test]
    fn test_sun_near_greenwich_meridian_at_noon() {
        // Near the equation-of-time zero in mid-April the sun transits at ~12:00 UTC.
        let sun = SimpleEphemeris.sun_position_ecef(&utc(2024, 4, 15, 12, 0, 0));
        let longitude = sun.y.atan2(sun.x).to_degrees();
        assert!(longitude.abs() < 1.0, "subsolar longitude {longitude}");
    }

    #[test]
    fn test_moon_distance_is_plausible() {
        let eph = SimpleEphemeris;
        for day in [1, 8, 15, 22] {
            let moon = eph.moon_position_ecef(&utc(2023, 3, day, 0, 0, 0));
            let km = moon.length() / 1000.0;
            assert!(
                (350_000.0..420_000.0).contains(&km),
                "moon distance {km} km on day {day}"
            );
        }
    }

    #[test]
    fn test_ra_decl_conversion() {
        let eph = SimpleEphemeris;
        let p = eph.position_from_ra_decl(6.0, 0.0, 10.0);
        assert!((p - DVec3::new(0.0, 10.0, 0.0)).length() < 1e-9);
        let pole = eph.position_from_ra_decl(3.0, 90.0, 2.0);
        assert!((pole - DVec3::new(0.0, 0.0, 2.0)).length() < 1e-9);
    }

    #[test]
    fn test_gmst_at_j2000() {
        let gmst = greenwich_mean_sidereal_time(&utc(2000, 1, 1, 12, 0, 0));
        assert!((gmst.to_degrees() - 280.460_618_37).abs() < 1e-6);
    }
}
