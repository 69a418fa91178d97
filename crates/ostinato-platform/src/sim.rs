//! Host-side doubles for the panel and the engine.
//!
//! [`SimSurface`] is a panel whose controls are set programmatically.
//! [`SimLooper`] records every command it receives and walks through the
//! engine lifecycle the way the firmware engine does: a stop-buffering
//! request makes it ready, `start` makes it run and a reset sends it back to
//! buffering.

use std::vec::Vec;

use crate::channel::Channel;
use crate::looper::{Direction, EngineStatus, FilterType, Looper, LooperCommand, Request};
use crate::{ControlId, ControlState, ControlSurface};

/// A panel driven from code.
///
/// # Example
///
/// ```rust
/// use ostinato_platform::{ControlId, ControlSurface, SimSurface};
///
/// let mut panel = SimSurface::new();
/// panel.set(ControlId::KNOB_SIZE, 0.75);
/// panel.set(ControlId::BUTTON, 1.0);
/// assert_eq!(panel.read_control(ControlId::KNOB_SIZE).unwrap().value, 0.75);
/// assert!(panel.read_control(ControlId::BUTTON).unwrap().is_high());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimSurface {
    knobs: [ControlState; ControlId::KNOB_COUNT],
    button: ControlState,
    toggle: ControlState,
    gate: ControlState,
    led: Option<f32>,
    flushes: usize,
}

impl SimSurface {
    /// Creates a panel with every control at 0.0.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, id: ControlId) -> Option<&mut ControlState> {
        match id {
            ControlId::BUTTON => Some(&mut self.button),
            ControlId::TOGGLE => Some(&mut self.toggle),
            ControlId::GATE => Some(&mut self.gate),
            _ => id.knob_index().map(|i| &mut self.knobs[i]),
        }
    }

    /// Sets an input control. Returns false for unknown or output ids.
    pub fn set(&mut self, id: ControlId, value: f32) -> bool {
        match self.slot_mut(id) {
            Some(state) => {
                state.set(value);
                true
            }
            None => false,
        }
    }

    /// Sets a digital input high or low.
    pub fn set_digital(&mut self, id: ControlId, high: bool) -> bool {
        self.set(id, if high { 1.0 } else { 0.0 })
    }

    /// Last value written to the LED, if any.
    pub fn led(&self) -> Option<f32> {
        self.led
    }

    /// True if the LED was last written on.
    pub fn led_on(&self) -> bool {
        self.led.is_some_and(|v| v >= 0.5)
    }

    /// Number of output flushes.
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl ControlSurface for SimSurface {
    fn read_control(&self, id: ControlId) -> Option<ControlState> {
        match id {
            ControlId::BUTTON => Some(self.button),
            ControlId::TOGGLE => Some(self.toggle),
            ControlId::GATE => Some(self.gate),
            _ => id.knob_index().map(|i| self.knobs[i]),
        }
    }

    fn write_control(&mut self, id: ControlId, value: f32) -> bool {
        if id == ControlId::LED {
            self.led = Some(value);
            return true;
        }
        false
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

/// Recording looper double.
#[derive(Debug, Clone)]
pub struct SimLooper {
    status: EngineStatus,
    buffer_samples: [usize; 2],
    commands: Vec<LooperCommand>,
}

impl SimLooper {
    /// Creates a looper starting up, with `buffer_samples` recorded per
    /// channel.
    pub fn new(buffer_samples: usize) -> Self {
        Self {
            status: EngineStatus::StartingUp,
            buffer_samples: [buffer_samples; 2],
            commands: Vec::new(),
        }
    }

    /// Forces the lifecycle phase.
    pub fn set_status(&mut self, status: EngineStatus) {
        self.status = status;
    }

    /// Sets the recorded length of one channel.
    pub fn set_buffer_samples(&mut self, channel: Channel, samples: usize) {
        self.buffer_samples[channel.index()] = samples;
    }

    /// Every command received, oldest first.
    pub fn commands(&self) -> &[LooperCommand] {
        &self.commands
    }

    /// Drains the command log.
    pub fn take_commands(&mut self) -> Vec<LooperCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Empties the command log.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// One-shot requests received, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                LooperCommand::Request(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    /// Number of times `request` was raised.
    pub fn count_request(&self, request: Request) -> usize {
        self.requests().iter().filter(|&&r| r == request).count()
    }

    /// Number of `start` calls.
    pub fn starts(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, LooperCommand::Start))
            .count()
    }

    fn last<T>(&self, pick: impl Fn(&LooperCommand) -> Option<T>) -> Option<T> {
        self.commands.iter().rev().find_map(pick)
    }

    /// Last loop start written to `channel`.
    pub fn loop_start(&self, channel: Channel) -> Option<f32> {
        self.last(|c| match *c {
            LooperCommand::LoopStart(ch, v) if ch == channel => Some(v),
            _ => None,
        })
    }

    /// Last loop length written to `channel`.
    pub fn loop_length(&self, channel: Channel) -> Option<f32> {
        self.last(|c| match *c {
            LooperCommand::LoopLength(ch, v) if ch == channel => Some(v),
            _ => None,
        })
    }

    /// Last direction written to `channel`.
    pub fn direction(&self, channel: Channel) -> Option<Direction> {
        self.last(|c| match *c {
            LooperCommand::Direction(ch, d) if ch == channel => Some(d),
            _ => None,
        })
    }

    /// Last loop sync flag written to `channel`.
    pub fn loop_sync(&self, channel: Channel) -> Option<bool> {
        self.last(|c| match *c {
            LooperCommand::LoopSync(ch, on) if ch == channel => Some(on),
            _ => None,
        })
    }

    /// Last filter cutoff.
    pub fn filter_value(&self) -> Option<f32> {
        self.last(|c| match *c {
            LooperCommand::FilterValue(v) => Some(v),
            _ => None,
        })
    }

    /// Last filter type.
    pub fn filter_type(&self) -> Option<FilterType> {
        self.last(|c| match *c {
            LooperCommand::FilterType(f) => Some(f),
            _ => None,
        })
    }

    /// Last dry/wet mix.
    pub fn dry_wet_mix(&self) -> Option<f32> {
        self.last(|c| match *c {
            LooperCommand::DryWetMix(v) => Some(v),
            _ => None,
        })
    }

    /// Last input gain.
    pub fn input_gain(&self) -> Option<f32> {
        self.last(|c| match *c {
            LooperCommand::InputGain(v) => Some(v),
            _ => None,
        })
    }

    /// Last stereo width.
    pub fn stereo_width(&self) -> Option<f32> {
        self.last(|c| match *c {
            LooperCommand::StereoWidth(v) => Some(v),
            _ => None,
        })
    }

    /// Last looping flag.
    pub fn looping(&self) -> Option<bool> {
        self.last(|c| match *c {
            LooperCommand::Looping(on) => Some(on),
            _ => None,
        })
    }
}

impl Looper for SimLooper {
    fn set_loop_start(&mut self, channel: Channel, offset: f32) {
        self.commands.push(LooperCommand::LoopStart(channel, offset));
    }

    fn set_loop_length(&mut self, channel: Channel, length: f32) {
        self.commands.push(LooperCommand::LoopLength(channel, length));
    }

    fn set_direction(&mut self, channel: Channel, direction: Direction) {
        self.commands.push(LooperCommand::Direction(channel, direction));
    }

    fn set_filter_value(&mut self, hz: f32) {
        self.commands.push(LooperCommand::FilterValue(hz));
    }

    fn set_filter_type(&mut self, filter: FilterType) {
        self.commands.push(LooperCommand::FilterType(filter));
    }

    fn set_dry_wet_mix(&mut self, mix: f32) {
        self.commands.push(LooperCommand::DryWetMix(mix));
    }

    fn set_input_gain(&mut self, gain: f32) {
        self.commands.push(LooperCommand::InputGain(gain));
    }

    fn set_stereo_width(&mut self, width: f32) {
        self.commands.push(LooperCommand::StereoWidth(width));
    }

    fn set_loop_sync(&mut self, channel: Channel, enabled: bool) {
        self.commands.push(LooperCommand::LoopSync(channel, enabled));
    }

    fn set_looping(&mut self, looping: bool) {
        self.commands.push(LooperCommand::Looping(looping));
    }

    fn request(&mut self, request: Request) {
        self.commands.push(LooperCommand::Request(request));
        match (request, self.status) {
            (Request::StopBuffering, EngineStatus::Buffering) => self.status = EngineStatus::Ready,
            (Request::Reset, EngineStatus::Running) => self.status = EngineStatus::Buffering,
            _ => {}
        }
    }

    fn start(&mut self) {
        self.commands.push(LooperCommand::Start);
        self.status = EngineStatus::Running;
    }

    fn status(&self) -> EngineStatus {
        self.status
    }

    fn buffer_samples(&self, channel: Channel) -> usize {
        self.buffer_samples[channel.index()]
    }
}
