//! Per-tick normalization of the panel readings.
//!
//! [`SurfaceReader`] polls a [`ControlSurface`] once per control tick and
//! produces a [`SurfaceSnapshot`]:
//!
//! - knob readings are clamped and snapped onto the rails inside the
//!   deadband, so a knob parked at an end stop reads exactly 0.0 or 1.0
//!   despite ADC drift;
//! - button, toggle and gate are debounced with a shift register and
//!   reported as a level plus rising/falling edges.
//!
//! It also owns the status LED output.

use crate::channel::ParameterSlot;
use crate::math::snap_to_rails;
use crate::{ControlId, ControlSurface};

/// Debounced state of a digital input for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edge {
    /// Debounced level.
    pub level: bool,
    /// The level went high on this tick.
    pub rising: bool,
    /// The level went low on this tick.
    pub falling: bool,
}

impl Edge {
    /// A steady level with no edge.
    pub const fn steady(level: bool) -> Self {
        Self {
            level,
            rising: false,
            falling: false,
        }
    }
}

/// Shift-register debouncer.
///
/// Every sample is shifted into an 8-bit history. The debounced level only
/// changes once the last `depth` samples agree, and the change is reported
/// as an edge on exactly that tick.
///
/// # Example
///
/// ```rust
/// use ostinato_platform::Debouncer;
///
/// let mut button = Debouncer::new(3);
/// assert!(!button.update(true).rising);
/// assert!(!button.update(true).rising);
/// assert!(button.update(true).rising);
/// assert!(button.update(true).level);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    history: u8,
    mask: u8,
    level: bool,
}

impl Debouncer {
    /// Creates a low debouncer requiring `depth` agreeing samples (1..=8).
    pub const fn new(depth: u8) -> Self {
        let depth = if depth == 0 {
            1
        } else if depth > 8 {
            8
        } else {
            depth
        };
        Self {
            history: 0,
            mask: ((1u16 << depth) - 1) as u8,
            level: false,
        }
    }

    /// Forces the level without reporting an edge.
    pub fn prime(&mut self, level: bool) {
        self.level = level;
        self.history = if level { u8::MAX } else { 0 };
    }

    /// Current debounced level.
    #[inline]
    pub const fn level(&self) -> bool {
        self.level
    }

    /// Shifts in one raw sample.
    pub fn update(&mut self, high: bool) -> Edge {
        self.history = (self.history << 1) | u8::from(high);
        let window = self.history & self.mask;

        let mut edge = Edge::steady(self.level);
        if window == self.mask && !self.level {
            self.level = true;
            edge = Edge {
                level: true,
                rising: true,
                falling: false,
            };
        } else if window == 0 && self.level {
            self.level = false;
            edge = Edge {
                level: false,
                rising: false,
                falling: true,
            };
        }
        edge
    }
}

/// Normalized panel readings for one control tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSnapshot {
    /// Knob values in [`ParameterSlot`] order, snapped to the rails.
    pub knobs: [f32; ControlId::KNOB_COUNT],
    /// Tap button.
    pub button: Edge,
    /// Toggle switch; a high level means position 1.
    pub toggle: Edge,
    /// Gate input.
    pub gate: Edge,
}

impl SurfaceSnapshot {
    /// Reading of the knob bound to `slot`.
    #[inline]
    pub fn knob(&self, slot: ParameterSlot) -> f32 {
        self.knobs[slot.index()]
    }

    /// Toggle position: 1 while the switch reads high, 0 otherwise.
    #[inline]
    pub fn toggle_position(&self) -> u8 {
        u8::from(self.toggle.level)
    }
}

/// Reads the panel once per tick and drives the LED.
#[derive(Debug, Clone)]
pub struct SurfaceReader {
    deadband: f32,
    button: Debouncer,
    toggle: Debouncer,
    gate: Debouncer,
    primed: bool,
    led: bool,
}

impl SurfaceReader {
    /// Creates a reader with the given knob deadband and debounce depth.
    pub const fn new(deadband: f32, debounce_depth: u8) -> Self {
        Self {
            deadband,
            button: Debouncer::new(debounce_depth),
            toggle: Debouncer::new(debounce_depth),
            gate: Debouncer::new(debounce_depth),
            primed: false,
            led: false,
        }
    }

    /// Polls `surface` and returns this tick's snapshot.
    ///
    /// The first read adopts the digital levels as they are, so a switch
    /// already in position at power-on does not produce an edge.
    pub fn read<S: ControlSurface + ?Sized>(&mut self, surface: &mut S) -> SurfaceSnapshot {
        surface.poll();

        let mut knobs = [0.0; ControlId::KNOB_COUNT];
        for (i, knob) in knobs.iter_mut().enumerate() {
            let raw = surface
                .read_control(ControlId::knob(i as u8))
                .map_or(0.0, |state| state.value);
            *knob = snap_to_rails(raw, self.deadband);
        }

        let high = |id: ControlId| surface.read_control(id).is_some_and(|state| state.is_high());
        let (button, toggle, gate) = (
            high(ControlId::BUTTON),
            high(ControlId::TOGGLE),
            high(ControlId::GATE),
        );

        if !self.primed {
            self.primed = true;
            self.button.prime(button);
            self.toggle.prime(toggle);
            self.gate.prime(gate);
            return SurfaceSnapshot {
                knobs,
                button: Edge::steady(button),
                toggle: Edge::steady(toggle),
                gate: Edge::steady(gate),
            };
        }

        SurfaceSnapshot {
            knobs,
            button: self.button.update(button),
            toggle: self.toggle.update(toggle),
            gate: self.gate.update(gate),
        }
    }

    /// Sets the LED state written by the next [`SurfaceReader::flush`].
    #[inline]
    pub fn set_led(&mut self, on: bool) {
        self.led = on;
    }

    /// Current LED state.
    #[inline]
    pub const fn led(&self) -> bool {
        self.led
    }

    /// Writes the LED and flushes the surface's outputs.
    pub fn flush<S: ControlSurface + ?Sized>(&self, surface: &mut S) {
        surface.write_control(ControlId::LED, if self.led { 1.0 } else { 0.0 });
        surface.flush();
    }
}
