//! Ostinato Platform - control plane for a stereo audio looper
//!
//! This crate turns the readings of a small hardware panel (four knobs, one
//! momentary button, one two-position toggle, one gate input and a status LED)
//! into a stream of commands for a real-time looper engine.
//!
//! # Core Abstractions
//!
//! ## Control Surface
//!
//! - [`ControlId`] - Identifier of a physical control on the panel
//! - [`ControlType`] - Physical control type (knob, toggle, button, gate, LED)
//! - [`ControlState`] - Current control state with change flag
//! - [`ControlSurface`] - Trait implemented by the hardware (or a test double)
//! - [`SurfaceReader`] - Knob deadband and digital debouncing, once per tick
//!
//! ## Control Plane
//!
//! - [`ParameterRouter`] - Maps a knob move onto engine commands with
//!   per-channel delta reconstruction
//! - [`GestureMachine`] - Tap / hold / arm gestures, trigger modes, gate input
//! - [`SettingsStore`] - Local and durable settings with a startup-gated drain
//! - [`Controller`] - The single state aggregate that runs one control tick
//!
//! ## Capabilities
//!
//! The controller never talks to hardware or to the audio engine directly.
//! Everything outside the control plane is injected:
//!
//! - [`Looper`] - The audio buffer engine (commands and status queries)
//! - [`Clock`] - Monotonic millisecond clock for hold timing
//! - [`SettingsStorage`] - Non-volatile settings record
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible so it can run inside the firmware's
//! control-rate callback. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! ostinato-platform = { version = "0.1", default-features = false }
//! ```
//!
//! The `tracing` feature adds debug logging of mode transitions, gestures and
//! durable writes.
//!
//! # Example
//!
//! ```rust
//! use ostinato_platform::{
//!     Controller, ControlConfig, ControlId, EngineStatus, ManualClock, MemoryStorage,
//!     SimLooper, SimSurface,
//! };
//!
//! let mut surface = SimSurface::new();
//! surface.set(ControlId::KNOB_BLEND, 0.5);
//!
//! let mut controller = Controller::new(
//!     ControlConfig::default(),
//!     surface,
//!     SimLooper::new(48_000),
//!     MemoryStorage::default(),
//!     ManualClock::new(),
//! );
//!
//! controller.looper_mut().set_status(EngineStatus::StartingUp);
//! controller.tick();
//! assert_eq!(controller.looper().dry_wet_mix(), Some(0.5));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod channel;
pub mod clock;
pub mod config;
pub mod controller;
pub mod gesture;
pub mod looper;
pub mod math;
pub mod router;
pub mod settings;
#[cfg(feature = "std")]
pub mod sim;
pub mod surface;

pub use channel::{Channel, ChannelFocus, ParameterSlot};
pub use clock::{Clock, ManualClock};
pub use config::{ControlConfig, ToggleRole};
pub use controller::Controller;
pub use gesture::{ButtonHoldMode, GestureMachine, TriggerMode};
pub use looper::{Direction, EngineStatus, FilterType, Looper, LooperCommand, Request};
pub use math::{map_range, snap_to_rails};
pub use router::{ChannelMatrix, DeltaMatrix, ParameterRouter};
pub use settings::{
    DrainOutcome, MemoryStorage, MemoryStorageError, Settings, SettingsStorage, SettingsStore,
};
#[cfg(feature = "std")]
pub use sim::{SimLooper, SimSurface};
pub use surface::{Debouncer, Edge, SurfaceReader, SurfaceSnapshot};

/// A control on the looper panel.
///
/// Knobs occupy indices `0..4` in [`ParameterSlot`] order; the digital
/// controls and the LED live in their own ranges so that a raw id read from a
/// wiring table is easy to classify.
///
/// # Example
///
/// ```rust
/// use ostinato_platform::{ControlId, ControlType};
///
/// assert_eq!(ControlId::knob(2), ControlId::KNOB_TONE);
/// assert_eq!(ControlId::KNOB_TONE.knob_index(), Some(2));
/// assert_eq!(ControlId::BUTTON.control_type(), Some(ControlType::Button));
/// assert_eq!(ControlId::LED.knob_index(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(u8);

impl ControlId {
    /// Blend knob (dry/wet, input gain in settings view).
    pub const KNOB_BLEND: Self = Self(0x00);
    /// Start knob (loop start, stereo width in settings view).
    pub const KNOB_START: Self = Self(0x01);
    /// Tone knob (filter cutoff, filter type in settings view).
    pub const KNOB_TONE: Self = Self(0x02);
    /// Size knob (loop length and direction, loop sync in settings view).
    pub const KNOB_SIZE: Self = Self(0x03);
    /// Momentary tap button.
    pub const BUTTON: Self = Self(0x10);
    /// Two-position toggle switch.
    pub const TOGGLE: Self = Self(0x11);
    /// Digital gate input.
    pub const GATE: Self = Self(0x12);
    /// Status LED.
    pub const LED: Self = Self(0x20);

    /// Number of knobs on the panel.
    pub const KNOB_COUNT: usize = 4;

    /// Creates a knob id from its index (0..4).
    #[inline]
    pub const fn knob(index: u8) -> Self {
        Self(index & 0x03)
    }

    /// Creates a ControlId from a raw 8-bit value.
    #[inline]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw 8-bit value.
    #[inline]
    pub const fn raw(&self) -> u8 {
        self.0
    }

    /// Returns the knob index if this id names a knob.
    #[inline]
    pub const fn knob_index(&self) -> Option<usize> {
        if (self.0 as usize) < Self::KNOB_COUNT {
            Some(self.0 as usize)
        } else {
            None
        }
    }

    /// Returns the type of this control, or `None` for an unknown id.
    pub const fn control_type(&self) -> Option<ControlType> {
        match self.0 {
            0x00..=0x03 => Some(ControlType::Knob),
            0x10 => Some(ControlType::Button),
            0x11 => Some(ControlType::Toggle2Way),
            0x12 => Some(ControlType::Gate),
            0x20 => Some(ControlType::Led),
            _ => None,
        }
    }
}

/// Physical control type.
///
/// # Example
///
/// ```rust
/// use ostinato_platform::ControlType;
///
/// assert_eq!(ControlType::Toggle2Way.discrete_positions(), Some(2));
/// assert!(ControlType::Led.is_output());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlType {
    /// Rotary knob with continuous value (0.0 to 1.0).
    Knob,
    /// Two-position toggle switch (0.0 = position 0, 1.0 = position 1).
    Toggle2Way,
    /// Momentary button (pressed = 1.0, released = 0.0).
    Button,
    /// Digital gate input (high = 1.0, low = 0.0).
    Gate,
    /// LED indicator (0.0 = off, 1.0 = on).
    Led,
}

impl ControlType {
    /// Returns the number of discrete positions for this control type.
    ///
    /// Returns `None` for continuous controls (Knob, Led).
    #[inline]
    pub const fn discrete_positions(&self) -> Option<u8> {
        match self {
            ControlType::Knob | ControlType::Led => None,
            ControlType::Toggle2Way | ControlType::Button | ControlType::Gate => Some(2),
        }
    }

    /// Returns true if this is an output control (LED).
    #[inline]
    pub const fn is_output(&self) -> bool {
        matches!(self, ControlType::Led)
    }

    /// Returns true if this is an input control.
    #[inline]
    pub const fn is_input(&self) -> bool {
        !self.is_output()
    }
}

/// Current state of a control.
///
/// All control values are normalized to the range 0.0 to 1.0:
///
/// - **Knob**: 0.0 = fully counter-clockwise, 1.0 = fully clockwise
/// - **Toggle2Way**: 0.0 = position 0 (reads as "pressed"), 1.0 = position 1
/// - **Button** / **Gate**: 0.0 = low, 1.0 = high
/// - **LED**: 0.0 = off, 1.0 = on
///
/// # Example
///
/// ```rust
/// use ostinato_platform::ControlState;
///
/// let mut state = ControlState::new(0.25);
/// assert!(!state.is_high());
/// state.set(0.75);
/// assert!(state.is_high());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    /// Normalized control value (0.0 to 1.0).
    pub value: f32,
}

impl ControlState {
    /// Creates a control state holding `value`.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self { value }
    }

    /// Replaces the value.
    #[inline]
    pub fn set(&mut self, value: f32) {
        self.value = value;
    }

    /// Returns true if the value reads as a logic high.
    #[inline]
    pub fn is_high(&self) -> bool {
        self.value >= 0.5
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Hardware side of the looper panel.
///
/// Implemented by the firmware's ADC/GPIO binding, or by [`SimSurface`] in
/// tests and simulation. Values are raw but normalized: knobs in `0.0..=1.0`
/// (possibly noisy near the rails), digital inputs as `0.0` / `1.0` before
/// debouncing.
///
/// # Example
///
/// ```rust,ignore
/// use ostinato_platform::{ControlId, ControlState, ControlSurface};
///
/// struct Panel {
///     adc: [f32; 4],
///     button: bool,
///     led: bool,
/// }
///
/// impl ControlSurface for Panel {
///     fn read_control(&self, id: ControlId) -> Option<ControlState> {
///         match id {
///             ControlId::BUTTON => Some(ControlState::new(if self.button { 1.0 } else { 0.0 })),
///             _ => id.knob_index().map(|i| ControlState::new(self.adc[i])),
///         }
///     }
///
///     fn write_control(&mut self, id: ControlId, value: f32) -> bool {
///         if id == ControlId::LED {
///             self.led = value >= 0.5;
///             return true;
///         }
///         false
///     }
/// }
/// ```
pub trait ControlSurface {
    /// Reads the current state of a control.
    ///
    /// Returns `None` if the control ID is not recognized or is not readable.
    fn read_control(&self, id: ControlId) -> Option<ControlState>;

    /// Writes a value to an output control (the LED).
    ///
    /// Returns `true` if the write was accepted.
    fn write_control(&mut self, id: ControlId, value: f32) -> bool;

    /// Samples the hardware. Called at the start of every control tick.
    fn poll(&mut self) {}

    /// Pushes pending output changes to the hardware at the end of a tick.
    fn flush(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knob_ids_follow_slot_order() {
        assert_eq!(ControlId::knob(0), ControlId::KNOB_BLEND);
        assert_eq!(ControlId::knob(1), ControlId::KNOB_START);
        assert_eq!(ControlId::knob(2), ControlId::KNOB_TONE);
        assert_eq!(ControlId::knob(3), ControlId::KNOB_SIZE);
        for i in 0..4u8 {
            assert_eq!(ControlId::knob(i).knob_index(), Some(i as usize));
        }
    }

    #[test]
    fn test_control_id_types() {
        assert_eq!(ControlId::KNOB_SIZE.control_type(), Some(ControlType::Knob));
        assert_eq!(ControlId::BUTTON.control_type(), Some(ControlType::Button));
        assert_eq!(
            ControlId::TOGGLE.control_type(),
            Some(ControlType::Toggle2Way)
        );
        assert_eq!(ControlId::GATE.control_type(), Some(ControlType::Gate));
        assert_eq!(ControlId::LED.control_type(), Some(ControlType::Led));
        assert_eq!(ControlId::from_raw(0x7F).control_type(), None);
    }

    #[test]
    fn test_digital_ids_are_not_knobs() {
        assert_eq!(ControlId::BUTTON.knob_index(), None);
        assert_eq!(ControlId::GATE.knob_index(), None);
        assert_eq!(ControlId::from_raw(0x12).raw(), 0x12);
    }

    #[test]
    fn test_control_type_input_output() {
        assert!(ControlType::Knob.is_input());
        assert!(ControlType::Gate.is_input());
        assert!(!ControlType::Led.is_input());
        assert_eq!(ControlType::Knob.discrete_positions(), None);
        assert_eq!(ControlType::Button.discrete_positions(), Some(2));
    }

    #[test]
    fn test_control_state_is_high() {
        assert!(ControlState::new(1.0).is_high());
        assert!(ControlState::new(0.5).is_high());
        assert!(!ControlState::new(0.49).is_high());
        assert!(!ControlState::default().is_high());
    }
}
