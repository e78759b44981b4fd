//! Core type definitions used throughout the codebase

/// Simulation tick counter (host time unit)
pub type Tick = u64;

/// Normalize an angle in degrees into the half-open range (-180, 180].
///
/// Used for relative bearings: a result of 0 means "dead ahead", positive
/// values are clockwise.
pub fn normalize_relative_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Normalize an angle in degrees into [0, 360).
pub fn normalize_absolute_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
