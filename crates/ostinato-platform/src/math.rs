//! Range mapping helpers for control values.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! - [`map_range`] - Linear remap between two spans (either may be descending)
//! - [`snap_to_rails`] - Deadband snap of a normalized reading onto 0.0 / 1.0
//! - [`clamp_unit`] - Clamp to `0.0..=1.0`

/// Linearly remaps `value` from `[a_min, a_max]` onto `[b_min, b_max]`.
///
/// The output span may be descending (`b_max < b_min`), which is how the
/// backwards loop bands shrink the loop as the knob turns up. Values outside
/// the input span extrapolate.
///
/// A zero-width input span is a contract violation: it is asserted in debug
/// builds and returns `b_min` in release builds.
///
/// # Example
/// ```rust
/// use ostinato_platform::map_range;
///
/// assert_eq!(map_range(0.5, 0.0, 1.0, 0.0, 1500.0), 750.0);
/// assert_eq!(map_range(0.0, 0.0, 0.35, 96_000.0, 2_400.0), 96_000.0);
/// assert_eq!(map_range(0.35, 0.0, 0.35, 96_000.0, 2_400.0), 2_400.0);
/// ```
#[inline]
pub fn map_range(value: f32, a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> f32 {
    let span = a_max - a_min;
    debug_assert!(span != 0.0, "map_range called with an empty input span");
    if span == 0.0 {
        return b_min;
    }
    b_min + (b_max - b_min) * (value - a_min) / span
}

/// Snaps a normalized reading onto a rail when it is within `deadband` of it.
///
/// The value is first clamped to `0.0..=1.0`. Readings within `deadband` of
/// 0.0 or 1.0 become exactly 0.0 or 1.0; everything else passes through
/// unchanged.
///
/// # Example
/// ```rust
/// use ostinato_platform::snap_to_rails;
///
/// assert_eq!(snap_to_rails(0.002, 0.003), 0.0);
/// assert_eq!(snap_to_rails(0.998, 0.003), 1.0);
/// assert_eq!(snap_to_rails(0.5, 0.003), 0.5);
/// ```
#[inline]
pub fn snap_to_rails(value: f32, deadband: f32) -> f32 {
    let value = clamp_unit(value);
    if value <= deadband {
        0.0
    } else if value >= 1.0 - deadband {
        1.0
    } else {
        value
    }
}

/// Clamps `value` to `0.0..=1.0`. NaN maps to 0.0.
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Milliseconds to samples at `sample_rate` (Hz).
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}
