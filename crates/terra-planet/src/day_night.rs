//! Sun direction from the viewer's clock.
//!
//! The sun circles the planet in the XZ plane at 15° per hour with a fixed
//! elevation on Y. The direction and the matching planet rotation offset are
//! captured once per session in a [`SunSnapshot`] and never re-evaluated while
//! the renderer is alive.

use chrono::{DateTime, Timelike, Utc};
use glam::Vec3;

/// Y component of the sun direction before normalization.
pub const DEFAULT_SUN_ELEVATION: f32 = 0.3;

/// Degrees of hour angle per hour of clock time.
const DEGREES_PER_HOUR: f64 = 15.0;

/// Hour angle in radians for a UTC hour and a viewer offset.
pub fn hour_angle(utc_hour: f64, offset_hours: f64) -> f64 {
    ((utc_hour + offset_hours) * DEGREES_PER_HOUR).to_radians()
}

/// Unit sun direction for `utc_hour` seen from a zone `offset_hours` from UTC.
pub fn sun_direction(utc_hour: f64, offset_hours: f64, elevation: f32) -> Vec3 {
    let angle = hour_angle(utc_hour, offset_hours);
    Vec3::new(angle.cos() as f32, elevation, angle.sin() as f32).normalize()
}

/// Planet spin, in radians about +Y, that turns the viewer's longitude toward the camera.
pub fn rotation_offset(offset_hours: f64) -> f32 {
    (-(offset_hours * std::f64::consts::PI / 12.0)) as f32
}

/// The viewer's current offset from UTC in hours, as reported by the OS timezone.
///
/// Zones without a resolvable offset report zero.
pub fn local_utc_offset_hours() -> f64 {
    let seconds = chrono::Local::now().offset().local_minus_utc();
    f64::from(seconds) / 3600.0
}

/// Session-static lighting captured at mount.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunSnapshot {
    /// Unit vector toward the sun, in world space.
    pub direction: Vec3,
    /// Base rotation applied to the planet and cloud layers.
    pub rotation_offset: f32,
    /// Whole UTC hour the snapshot was taken at.
    pub utc_hour: u32,
    /// Viewer offset used for the snapshot.
    pub offset_hours: f64,
}

impl SunSnapshot {
    /// Evaluate the sun for `now`. Only the whole UTC hour is used.
    pub fn capture(now: DateTime<Utc>, offset_hours: f64, elevation: f32) -> Self {
        let utc_hour = now.hour();
        let offset_hours = if offset_hours.is_finite() {
            offset_hours
        } else {
            tracing::warn!("Ignoring non-finite UTC offset {offset_hours}, using 0");
            0.0
        };

        let snapshot = Self {
            direction: sun_direction(f64::from(utc_hour), offset_hours, elevation),
            rotation_offset: rotation_offset(offset_hours),
            utc_hour,
            offset_hours,
        };
        tracing::info!(
            "Sun snapshot at {utc_hour:02}:00 UTC, offset {offset_hours:+}h: direction {:?}",
            snapshot.direction
        );
        snapshot
    }

    /// Capture using the system clock and, unless overridden, the OS timezone.
    pub fn capture_now(offset_override: Option<f64>, elevation: f32) -> Self {
        let offset = offset_override.unwrap_or_else(local_utc_offset_hours);
        Self::capture(Utc::now(), offset, elevation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::f64::consts::PI;

    fn at_hour(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_direction_is_unit_for_every_offset() {
        for utc_hour in 0..24 {
            let mut offset = -12.0;
            while offset <= 14.0 {
                let dir = sun_direction(f64::from(utc_hour), offset, DEFAULT_SUN_ELEVATION);
                assert!(
                    (dir.length() - 1.0).abs() < 1e-5,
                    "hour {utc_hour} offset {offset}: length {}",
                    dir.length()
                );
                offset += 0.25;
            }
        }
    }

    #[test]
    fn test_elevation_is_positive_and_constant() {
        let a = sun_direction(3.0, 0.0, DEFAULT_SUN_ELEVATION);
        let b = sun_direction(15.0, 0.0, DEFAULT_SUN_ELEVATION);
        assert!(a.y > 0.0);
        assert!((a.y - b.y).abs() < 1e-6);
    }

    #[test]
    fn test_zero_hour_points_along_x() {
        let dir = sun_direction(0.0, 0.0, 0.0);
        assert!((dir - Vec3::X).length() < 1e-6);
        let six = sun_direction(6.0, 0.0, 0.0);
        assert!((six - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_zero_offset_depends_only_on_utc_hour() {
        let a = SunSnapshot::capture(at_hour(9, 0), 0.0, DEFAULT_SUN_ELEVATION);
        let b = SunSnapshot::capture(at_hour(9, 59), 0.0, DEFAULT_SUN_ELEVATION);
        assert_eq!(a.direction, b.direction);
        assert_eq!(a.rotation_offset, 0.0);
        let expected = sun_direction(9.0, 0.0, DEFAULT_SUN_ELEVATION);
        assert!((a.direction - expected).length() < 1e-6);
    }

    #[test]
    fn test_half_hour_zone_rotation_offset() {
        let offset = rotation_offset(5.5);
        assert!((f64::from(offset) - (-(5.5 * PI / 12.0))).abs() < 1e-6);
    }

    #[test]
    fn test_offset_shifts_hour_angle() {
        // 12:00 UTC seen from UTC-3 matches 09:00 UTC seen from UTC.
        let a = sun_direction(12.0, -3.0, DEFAULT_SUN_ELEVATION);
        let b = sun_direction(9.0, 0.0, DEFAULT_SUN_ELEVATION);
        assert!((a - b).length() < 1e-5);
    }

    #[test]
    fn test_snapshot_records_inputs() {
        let snapshot = SunSnapshot::capture(at_hour(23, 30), -8.0, DEFAULT_SUN_ELEVATION);
        assert_eq!(snapshot.utc_hour, 23);
        assert_eq!(snapshot.offset_hours, -8.0);
        assert!((f64::from(snapshot.rotation_offset) - 8.0 * PI / 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_offset_falls_back_to_zero() {
        let snapshot = SunSnapshot::capture(at_hour(4, 0), f64::NAN, DEFAULT_SUN_ELEVATION);
        assert_eq!(snapshot.offset_hours, 0.0);
        assert!((snapshot.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_local_offset_is_a_real_zone() {
        let offset = local_utc_offset_hours();
        assert!((-12.0..=14.0).contains(&offset), "offset {offset}");
    }

    #[test]
    fn test_capture_now_honours_override() {
        let snapshot = SunSnapshot::capture_now(Some(2.0), DEFAULT_SUN_ELEVATION);
        assert_eq!(snapshot.offset_hours, 2.0);
    }
}
