//! Knob-to-engine parameter routing with per-channel delta reconstruction.
//!
//! Four knobs drive a stereo engine. With focus on one channel a knob sets
//! that channel alone; with focus on both, each channel follows the knob
//! plus the offset it had when it was last set on its own:
//!
//! ```text
//! Left focus:   delta[L][slot] = value - matrix[Both][slot]   → L gets value
//! Both focus:   L gets clamp(value + delta[L][slot], 0, 1)
//!               R gets clamp(value + delta[R][slot], 0, 1)
//! ```
//!
//! Switching focus therefore never makes a channel jump: the joint knob
//! carries both channels with their individual offsets intact.
//!
//! Slot behavior is table-driven: each [`ParameterSlot`] has a
//! [`SlotStrategy`] holding its settings-view writer and its performance
//! writer.

use crate::channel::{Channel, ChannelFocus, ParameterSlot};
use crate::config::ControlConfig;
use crate::looper::{Direction, FilterType, Looper};
use crate::math::{clamp_unit, map_range};
use crate::settings::{Settings, SettingsStore};

/// Size-knob band edges.
pub mod size_bands {
    /// Top of the long backwards band (buffer → flanger threshold).
    pub const BACKWARDS_LONG_END: f32 = 0.35;
    /// Top of the short backwards band (flanger → grain threshold).
    pub const DEAD_ZONE_START: f32 = 0.47;
    /// Bottom of the short forward band (grain → flanger threshold).
    pub const DEAD_ZONE_END: f32 = 0.53;
    /// Bottom of the long forward band (flanger threshold → buffer).
    pub const FORWARD_LONG_START: f32 = 0.65;
}

/// Loop length and direction produced by the Size knob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopGeometry {
    /// Loop length in samples.
    pub length: f32,
    /// Read direction.
    pub direction: Direction,
}

/// Engine-facing ranges used by the slot writers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapping {
    /// Input gain at full Blend travel.
    pub max_gain: f32,
    /// Cutoff at full Tone travel, in Hz.
    pub max_filter_hz: f32,
    /// Flanger band boundary, in samples.
    pub flanger_samples: f32,
    /// Grain band boundary, in samples.
    pub grain_samples: f32,
    /// Dead-zone loop length, in samples.
    pub min_loop_samples: f32,
}

impl Mapping {
    /// Derives the mapping from a control configuration.
    pub fn from_config(config: &ControlConfig) -> Self {
        Self {
            max_gain: config.max_gain,
            max_filter_hz: config.max_filter_hz,
            flanger_samples: config.flanger_threshold_samples(),
            grain_samples: config.grain_threshold_samples(),
            min_loop_samples: config.min_loop_samples(),
        }
    }

    /// Five-band Size mapping for a buffer of `buffer_samples`.
    ///
    /// | band | direction | length |
    /// |---|---|---|
    /// | `[0, 0.35]` | backwards | buffer → flanger |
    /// | `(0.35, 0.47)` | backwards | flanger → grain |
    /// | `[0.47, 0.53]` | forward | minimum (dead zone) |
    /// | `[0.53, 0.65)` | forward | grain → flanger |
    /// | `[0.65, 1]` | forward | flanger → buffer |
    ///
    /// # Example
    ///
    /// ```rust
    /// use ostinato_platform::{ControlConfig, Direction};
    /// use ostinato_platform::router::Mapping;
    ///
    /// let mapping = Mapping::from_config(&ControlConfig::default());
    /// let centre = mapping.loop_geometry(0.5, 96_000.0);
    /// assert_eq!(centre.length, 48.0);
    /// assert_eq!(centre.direction, Direction::Forward);
    /// assert_eq!(mapping.loop_geometry(0.0, 96_000.0).direction, Direction::Backwards);
    /// ```
    pub fn loop_geometry(&self, value: f32, buffer_samples: f32) -> LoopGeometry {
        use size_bands::{BACKWARDS_LONG_END, DEAD_ZONE_END, DEAD_ZONE_START, FORWARD_LONG_START};

        let (length, direction) = if value <= BACKWARDS_LONG_END {
            (
                map_range(value, 0.0, BACKWARDS_LONG_END, buffer_samples, self.flanger_samples),
                Direction::Backwards,
            )
        } else if value < DEAD_ZONE_START {
            (
                map_range(
                    value,
                    BACKWARDS_LONG_END,
                    DEAD_ZONE_START,
                    self.flanger_samples,
                    self.grain_samples,
                ),
                Direction::Backwards,
            )
        } else if value <= DEAD_ZONE_END {
            (self.min_loop_samples, Direction::Forward)
        } else if value < FORWARD_LONG_START {
            (
                map_range(
                    value,
                    DEAD_ZONE_END,
                    FORWARD_LONG_START,
                    self.grain_samples,
                    self.flanger_samples,
                ),
                Direction::Forward,
            )
        } else {
            (
                map_range(value, FORWARD_LONG_START, 1.0, self.flanger_samples, buffer_samples),
                Direction::Forward,
            )
        };
        LoopGeometry { length, direction }
    }
}

/// Last committed knob value per (row, slot); rows Left, Right, Both.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelMatrix {
    values: [[f32; 4]; 3],
}

impl ChannelMatrix {
    const fn row(focus: ChannelFocus) -> Option<usize> {
        match focus {
            ChannelFocus::Left => Some(0),
            ChannelFocus::Right => Some(1),
            ChannelFocus::Both => Some(2),
            ChannelFocus::Settings => None,
        }
    }

    /// Value stored for `focus` and `slot`. Settings focus has no row and
    /// reads as 0.0.
    #[inline]
    pub fn get(&self, focus: ChannelFocus, slot: ParameterSlot) -> f32 {
        Self::row(focus).map_or(0.0, |row| self.values[row][slot.index()])
    }

    /// Records `value`; a Settings focus is ignored.
    #[inline]
    pub fn set(&mut self, focus: ChannelFocus, slot: ParameterSlot, value: f32) {
        if let Some(row) = Self::row(focus) {
            self.values[row][slot.index()] = value;
        }
    }
}

/// Per-channel signed offsets from the Both row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeltaMatrix {
    values: [[f32; 4]; 2],
}

impl DeltaMatrix {
    /// Offset of `channel` for `slot`.
    #[inline]
    pub fn get(&self, channel: Channel, slot: ParameterSlot) -> f32 {
        self.values[channel.index()][slot.index()]
    }

    /// Sets the offset of `channel` for `slot`.
    #[inline]
    pub fn set(&mut self, channel: Channel, slot: ParameterSlot, delta: f32) {
        self.values[channel.index()][slot.index()] = delta;
    }
}

type SettingsWriter = fn(&mut Settings, &mut dyn Looper, f32, &Mapping);
type GlobalWriter = fn(&mut dyn Looper, f32, &Mapping);
type ChannelWriter = fn(&mut dyn Looper, Channel, f32, &Mapping);

/// How a slot acts outside the settings view.
#[derive(Clone, Copy)]
pub enum Perform {
    /// One engine-wide parameter; the raw knob value is applied whatever
    /// the focus.
    Global(GlobalWriter),
    /// One parameter per channel, delta-reconstructed under Both focus.
    PerChannel(ChannelWriter),
}

/// Behavior of one knob slot.
#[derive(Clone, Copy)]
pub struct SlotStrategy {
    /// Writer used while the settings view is active.
    pub settings: SettingsWriter,
    /// Writer used in performance focus.
    pub perform: Perform,
}

/// Strategies in [`ParameterSlot`] index order.
pub const STRATEGIES: [SlotStrategy; 4] = [
    // Blend
    SlotStrategy {
        settings: |s, looper, v, m| {
            s.input_gain = v;
            looper.set_input_gain(v * m.max_gain);
        },
        perform: Perform::Global(|looper, v, _| looper.set_dry_wet_mix(v)),
    },
    // Start
    SlotStrategy {
        settings: |s, looper, v, _| {
            s.stereo_width = v;
            looper.set_stereo_width(v);
        },
        perform: Perform::PerChannel(|looper, ch, v, _| {
            let last = (looper.buffer_samples(ch) as f32 - 1.0).max(0.0);
            looper.set_loop_start(ch, map_range(v, 0.0, 1.0, 0.0, last));
        }),
    },
    // Tone
    SlotStrategy {
        settings: |s, looper, v, _| {
            s.filter_type = v;
            looper.set_filter_type(FilterType::from_normalized(v));
        },
        perform: Perform::Global(|looper, v, m| {
            looper.set_filter_value(map_range(v, 0.0, 1.0, 0.0, m.max_filter_hz));
        }),
    },
    // Size
    SlotStrategy {
        settings: |s, looper, v, _| {
            s.loop_sync = v;
            for ch in Channel::ALL {
                looper.set_loop_sync(ch, v >= 0.5);
            }
        },
        perform: Perform::PerChannel(|looper, ch, v, m| {
            let geometry = m.loop_geometry(v, looper.buffer_samples(ch) as f32);
            looper.set_loop_length(ch, geometry.length);
            looper.set_direction(ch, geometry.direction);
        }),
    },
];

/// Routes knob values to the engine and the settings record.
#[derive(Debug, Clone)]
pub struct ParameterRouter {
    mapping: Mapping,
    deadband: f32,
    matrix: ChannelMatrix,
    deltas: DeltaMatrix,
    knob_values: [f32; 4],
}

impl ParameterRouter {
    /// Creates a router with zeroed matrices.
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            mapping: Mapping::from_config(config),
            deadband: config.deadband,
            matrix: ChannelMatrix::default(),
            deltas: DeltaMatrix::default(),
            knob_values: [0.0; 4],
        }
    }

    /// The channel matrix.
    #[inline]
    pub fn matrix(&self) -> &ChannelMatrix {
        &self.matrix
    }

    /// The delta matrix.
    #[inline]
    pub fn deltas(&self) -> &DeltaMatrix {
        &self.deltas
    }

    /// The engine-facing ranges.
    #[inline]
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Last routed reading of the knob bound to `slot`.
    #[inline]
    pub fn knob_value(&self, slot: ParameterSlot) -> f32 {
        self.knob_values[slot.index()]
    }

    /// Overrides the last routed reading of a knob without routing it.
    #[inline]
    pub fn set_knob_value(&mut self, slot: ParameterSlot, value: f32) {
        self.knob_values[slot.index()] = value;
    }

    /// Routes a knob reading if it moved by more than the deadband since it
    /// was last routed. Returns true if it was routed.
    pub fn process_knob<L: Looper>(
        &mut self,
        slot: ParameterSlot,
        value: f32,
        focus: ChannelFocus,
        looper: &mut L,
        settings: &mut SettingsStore,
    ) -> bool {
        if libm::fabsf(self.knob_values[slot.index()] - value) <= self.deadband {
            return false;
        }
        self.route(slot, value, focus, looper, settings);
        self.knob_values[slot.index()] = value;
        true
    }

    /// Translates one `(slot, value, focus)` event into engine commands.
    ///
    /// - Settings focus: updates the local settings record (marking it
    ///   dirty) and applies the settings that act on the engine right away.
    /// - Left/Right focus: records the channel's delta, applies `value` to
    ///   that channel.
    /// - Both focus: applies `value + delta` to each channel.
    ///
    /// Matrix rows are only recorded once the engine is past startup.
    pub fn route<L: Looper>(
        &mut self,
        slot: ParameterSlot,
        value: f32,
        focus: ChannelFocus,
        looper: &mut L,
        settings: &mut SettingsStore,
    ) {
        if !looper.is_starting_up() {
            self.matrix.set(focus, slot, value);
        }
        if let Some(channel) = focus.single() {
            let baseline = self.matrix.get(ChannelFocus::Both, slot);
            self.deltas.set(channel, slot, value - baseline);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(slot = slot.name(), value, ?focus, "route");

        let strategy = STRATEGIES[slot.index()];
        let mapping = &self.mapping;
        let looper: &mut dyn Looper = looper;

        if focus == ChannelFocus::Settings {
            settings.edit(|s| (strategy.settings)(s, looper, value, mapping));
            return;
        }

        match strategy.perform {
            Perform::Global(write) => write(looper, value, mapping),
            Perform::PerChannel(write) => {
                for &channel in focus.channels() {
                    let effective = if focus == ChannelFocus::Both {
                        clamp_unit(value + self.deltas.get(channel, slot))
                    } else {
                        value
                    };
                    write(looper, channel, effective, mapping);
                }
            }
        }
    }

    /// Seeds every matrix row from the current knob positions and routes
    /// each reading to Both, Right and Left in turn.
    pub fn seed<L: Looper>(
        &mut self,
        knobs: [f32; 4],
        looper: &mut L,
        settings: &mut SettingsStore,
    ) {
        for slot in ParameterSlot::ALL {
            let value = knobs[slot.index()];
            self.knob_values[slot.index()] = value;
            for focus in [ChannelFocus::Both, ChannelFocus::Right, ChannelFocus::Left] {
                self.matrix.set(focus, slot, value);
                self.route(slot, value, focus, looper, settings);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::looper::{EngineStatus, LooperCommand};
    use crate::sim::SimLooper;

    const BUFFER: usize = 96_000;

    fn running_looper() -> SimLooper {
        let mut looper = SimLooper::new(BUFFER);
        looper.set_status(EngineStatus::Running);
        looper
    }

    fn router() -> ParameterRouter {
        ParameterRouter::new(&ControlConfig::default())
    }

    #[test]
    fn test_both_focus_applies_value_to_each_channel() {
        let mut router = router();
        let mut looper = running_looper();
        let mut settings = SettingsStore::default();

        router.route(ParameterSlot::Start, 1.0, ChannelFocus::Both, &mut looper, &mut settings);

        assert_eq!(looper.loop_start(Channel::Left), Some(95_999.0));
        assert_eq!(looper.loop_start(Channel::Right), Some(95_999.0));
        assert_eq!(router.matrix().get(ChannelFocus::Both, ParameterSlot::Start), 1.0);
    }

    #[test]
    fn test_single_focus_records_delta_and_addresses_one_channel() {
        let mut router = router();
        let mut looper = running_looper();
        let mut settings = SettingsStore::default();

        router.route(ParameterSlot::Start, 0.4, ChannelFocus::Both, &mut looper, &mut settings);
        looper.clear_commands();
        router.route(ParameterSlot::Start, 0.6, ChannelFocus::Left, &mut looper, &mut settings);

        assert!((router.deltas().get(Channel::Left, ParameterSlot::Start) - 0.2).abs() < 1e-6);
        assert_eq!(router.deltas().get(Channel::Right, ParameterSlot::Start), 0.0);
        assert_eq!(looper.commands().len(), 1);
        assert!(matches!(
            looper.commands()[0],
            LooperCommand::LoopStart(Channel::Left, _)
        ));
    }

    #[test]
    fn test_delta_reconstruction_under_both_focus() {
        let mut router = router();
        let mut looper = running_looper();
        let mut settings = SettingsStore::default();

        router.route(ParameterSlot::Start, 0.5, ChannelFocus::Both, &mut looper, &mut settings);
        router.route(ParameterSlot::Start, 0.7, ChannelFocus::Left, &mut looper, &mut settings);
        router.route(ParameterSlot::Start, 0.2, ChannelFocus::Both, &mut looper, &mut settings);

        let last = (BUFFER - 1) as f32;
        let left = looper.loop_start(Channel::Left).unwrap();
        let right = looper.loop_start(Channel::Right).unwrap();
        assert!((left - 0.4 * last).abs() < 1.0, "left = {left}");
        assert!((right - 0.2 * last).abs() < 1.0, "right = {right}");
    }

    #[test]
    fn test_effective_value_is_clamped() {
        let mut router = router();
        let mut looper = running_looper();
        let mut settings = SettingsStore::default();

        router.route(ParameterSlot::Start, 0.1, ChannelFocus::Both, &mut looper, &mut settings);
        router.route(ParameterSlot::Start, 0.9, ChannelFocus::Right, &mut looper, &mut settings);
        router.route(ParameterSlot::Start, 0.8, ChannelFocus::Both, &mut looper, &mut settings);

        assert_eq!(looper.loop_start(Channel::Right), Some((BUFFER - 1) as f32));
    }

    #[test]
    fn test_global_slots_ignore_deltas() {
        let mut router = router();
        let mut looper = running_looper();
        let mut settings = SettingsStore::default();

        router.route(ParameterSlot::Tone, 0.5, ChannelFocus::Both, &mut looper, &mut settings);
        router.route(ParameterSlot::Tone, 0.9, ChannelFocus::Left, &mut looper, &mut settings);
        router.route(ParameterSlot::Tone, 0.5, ChannelFocus::Both, &mut looper, &mut settings);

        assert_eq!(looper.filter_value(), Some(750.0));

        router.route(ParameterSlot::Blend, 0.3, ChannelFocus::Right, &mut looper, &mut settings);
        assert_eq!(looper.dry_wet_mix(), Some(0.3));
    }

    #[test]
    fn test_settings_writes_leave_matrix_untouched() {
        let mut router = router();
        let mut looper = running_looper();
        let mut settings = SettingsStore::default();

        router.route(ParameterSlot::Blend, 0.4, ChannelFocus::Settings, &mut looper, &mut settings);

        assert_eq!(router.matrix(), &ChannelMatrix::default());
        assert_eq!(router.deltas(), &DeltaMatrix::default());
        assert!(settings.is_dirty());
        assert_eq!(settings.local().input_gain, 0.4);
        let gain = looper.input_gain().unwrap();
        assert!((gain - 2.0).abs() < 1e-5, "gain = {gain}");
        assert_eq!(looper.dry_wet_mix(), None);
    }

    #[test]
    fn test_settings_slot_writers() {
        let mut router = router();
        let mut looper = running_looper();
        let mut settings = SettingsStore::default();

        router.route(ParameterSlot::Start, 0.25, ChannelFocus::Settings, &mut looper, &mut settings);
        router.route(ParameterSlot::Tone, 0.8, ChannelFocus::Settings, &mut looper, &mut settings);
        router.route(ParameterSlot::Size, 0.5, ChannelFocus::Settings, &mut looper, &mut settings);

        assert_eq!(looper.stereo_width(), Some(0.25));
        assert_eq!(looper.filter_type(), Some(FilterType::HighPass));
        assert_eq!(looper.loop_sync(Channel::Left), Some(true));
        assert_eq!(looper.loop_sync(Channel::Right), Some(true));
        assert_eq!(settings.local().stereo_width, 0.25);
        assert_eq!(settings.local().filter_type, 0.8);
        assert_eq!(settings.local().loop_sync, 0.5);
        assert_eq!(looper.loop_start(Channel::Left), None);
        assert_eq!(looper.loop_length(Channel::Left), None);
    }

    #[test]
    fn test_matrix_not_recorded_during_startup() {
        let mut router = router();
        let mut looper = SimLooper::new(BUFFER);
        let mut settings = SettingsStore::default();

        router.route(ParameterSlot::Blend, 0.7, ChannelFocus::Both, &mut looper, &mut settings);
        assert_eq!(router.matrix().get(ChannelFocus::Both, ParameterSlot::Blend), 0.0);
        assert_eq!(looper.dry_wet_mix(), Some(0.7));
    }

    #[test]
    fn test_process_knob_ignores_small_moves() {
        let mut router = router();
        let mut looper = running_looper();
        let mut settings = SettingsStore::default();

        assert!(router.process_knob(ParameterSlot::Blend, 0.5, ChannelFocus::Both, &mut looper, &mut settings));
        assert!(!router.process_knob(ParameterSlot::Blend, 0.502, ChannelFocus::Both, &mut looper, &mut settings));
        assert_eq!(router.knob_value(ParameterSlot::Blend), 0.5);
        assert!(router.process_knob(ParameterSlot::Blend, 0.51, ChannelFocus::Both, &mut looper, &mut settings));
        assert_eq!(looper.dry_wet_mix(), Some(0.51));
    }

    #[test]
    fn test_seed_fills_every_row() {
        let mut router = router();
        let mut looper = SimLooper::new(BUFFER);
        looper.set_status(EngineStatus::Ready);
        let mut settings = SettingsStore::default();

        router.seed([0.1, 0.2, 0.3, 0.9], &mut looper, &mut settings);

        for slot in ParameterSlot::ALL {
            let v = [0.1, 0.2, 0.3, 0.9][slot.index()];
            for focus in [ChannelFocus::Left, ChannelFocus::Right, ChannelFocus::Both] {
                assert_eq!(router.matrix().get(focus, slot), v);
            }
            for ch in Channel::ALL {
                assert_eq!(router.deltas().get(ch, slot), 0.0);
            }
            assert_eq!(router.knob_value(slot), v);
        }
        assert_eq!(looper.direction(Channel::Left), Some(Direction::Forward));
        assert!(!settings.is_dirty());
    }

    #[test]
    fn test_loop_geometry_bands() {
        let m = Mapping::from_config(&ControlConfig::default());
        let buffer = BUFFER as f32;

        assert_eq!(m.loop_geometry(0.0, buffer).length, buffer);
        assert_eq!(m.loop_geometry(1.0, buffer).length, buffer);
        assert_eq!(m.loop_geometry(0.35, buffer).length, 2400.0);
        assert_eq!(m.loop_geometry(0.65, buffer).length, 2400.0);
        assert_eq!(m.loop_geometry(0.47, buffer).length, 48.0);
        assert_eq!(m.loop_geometry(0.53, buffer).length, 48.0);
        assert_eq!(m.loop_geometry(0.4, buffer).direction, Direction::Backwards);
        assert_eq!(m.loop_geometry(0.6, buffer).direction, Direction::Forward);
    }
}
