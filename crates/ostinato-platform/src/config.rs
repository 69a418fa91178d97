//! Tunable constants of the control plane.

use crate::math::ms_to_samples;

/// What the two-position toggle drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleRole {
    /// Position 0 selects Loop, position 1 selects Rec.
    #[default]
    TriggerMode,
    /// Position 0 focuses the left channel, position 1 the right channel.
    ChannelFocus,
}

/// Control plane configuration.
///
/// Defaults match the hardware panel: 48 kHz engine, 0.003 knob deadband,
/// 300 / 1000 / 1500 ms hold thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlConfig {
    /// Engine sample rate in Hz, used to turn loop thresholds into samples.
    pub sample_rate: f32,
    /// Knob readings within this distance of a rail snap onto it; knob moves
    /// smaller than this are ignored.
    pub deadband: f32,
    /// Soft-takeover distance. Reserved: carried for configuration files but
    /// not consumed by the router.
    pub pickup_threshold: f32,
    /// Longest press (ms) that still counts as a tap; also the hold time
    /// after which a press becomes a settings-view candidate.
    pub tap_max_ms: u32,
    /// Hold time (ms) after which an armed press disarms and releases.
    pub disarm_hold_ms: u32,
    /// Hold time (ms) after which a press becomes an arm candidate.
    pub arm_hold_ms: u32,
    /// Consecutive identical samples required before a digital input
    /// changes level (1..=8).
    pub debounce_ticks: u8,
    /// Input gain at full Blend travel in settings view.
    pub max_gain: f32,
    /// Filter cutoff (Hz) at full Tone travel.
    pub max_filter_hz: f32,
    /// Loop length (ms) dividing the long-loop and flanger Size bands.
    pub flanger_threshold_ms: f32,
    /// Loop length (ms) dividing the flanger and grain Size bands; also the
    /// dead-zone loop length.
    pub grain_threshold_ms: f32,
    /// What the toggle switch drives.
    pub toggle_role: ToggleRole,
}

impl ControlConfig {
    /// Flanger band boundary in samples.
    #[inline]
    pub fn flanger_threshold_samples(&self) -> f32 {
        ms_to_samples(self.flanger_threshold_ms, self.sample_rate)
    }

    /// Grain band boundary in samples.
    #[inline]
    pub fn grain_threshold_samples(&self) -> f32 {
        ms_to_samples(self.grain_threshold_ms, self.sample_rate)
    }

    /// Loop length used across the Size dead zone.
    #[inline]
    pub fn min_loop_samples(&self) -> f32 {
        self.grain_threshold_samples()
    }

    /// Returns the debounce depth clamped to what the debouncer supports.
    #[inline]
    pub fn debounce_depth(&self) -> u8 {
        self.debounce_ticks.clamp(1, 8)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            deadband: 0.003,
            pickup_threshold: 0.01,
            tap_max_ms: 300,
            disarm_hold_ms: 1000,
            arm_hold_ms: 1500,
            debounce_ticks: 4,
            max_gain: 5.0,
            max_filter_hz: 1500.0,
            flanger_threshold_ms: 50.0,
            grain_threshold_ms: 1.0,
            toggle_role: ToggleRole::TriggerMode,
        }
    }
}
