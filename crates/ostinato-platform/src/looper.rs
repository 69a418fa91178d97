//! The looper engine capability consumed by the control plane.
//!
//! The engine runs in the audio callback. Everything the control plane asks
//! of it is either a plain value write (latest value wins) or a one-shot
//! [`Request`] that the engine consumes at the start of its next block.

use crate::channel::Channel;

/// Playback direction of a channel's read head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Play the loop forward.
    Forward,
    /// Play the loop backwards.
    Backwards,
}

/// Engine filter response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    /// Low-pass.
    LowPass,
    /// Band-pass.
    BandPass,
    /// High-pass.
    HighPass,
}

impl FilterType {
    /// Selects a filter type from a normalized knob value, by thirds.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ostinato_platform::FilterType;
    ///
    /// assert_eq!(FilterType::from_normalized(0.1), FilterType::LowPass);
    /// assert_eq!(FilterType::from_normalized(0.5), FilterType::BandPass);
    /// assert_eq!(FilterType::from_normalized(0.9), FilterType::HighPass);
    /// ```
    pub fn from_normalized(value: f32) -> Self {
        if value < 0.33 {
            FilterType::LowPass
        } else if value <= 0.66 {
            FilterType::BandPass
        } else {
            FilterType::HighPass
        }
    }
}

/// Lifecycle phase reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineStatus {
    /// Allocating and clearing buffers.
    #[default]
    StartingUp,
    /// Recording the first loop; waits for a stop-buffering request.
    Buffering,
    /// First loop captured; waits for [`Looper::start`].
    Ready,
    /// Normal operation.
    Running,
}

/// One-shot requests to the engine.
///
/// At most one request of a kind is outstanding per gesture: the engine
/// clears it when consumed and the control plane only raises it again on the
/// next distinct gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    /// Start writing input into `Channel`'s buffer.
    StartWriting(Channel),
    /// Stop writing into `Channel`'s buffer.
    StopWriting(Channel),
    /// Start the read heads.
    StartReading,
    /// Stop the read heads.
    StopReading,
    /// Restart a one-shot playback from the loop start.
    Restart,
    /// Jump the read heads back to the loop start.
    Retrigger,
    /// Clear the buffers and go back to buffering.
    Reset,
    /// Close the first recording.
    StopBuffering,
}

/// The looper engine as seen by the control plane.
pub trait Looper {
    /// Sets the loop start offset of `channel`, in samples.
    fn set_loop_start(&mut self, channel: Channel, offset: f32);

    /// Sets the loop length of `channel`, in samples.
    fn set_loop_length(&mut self, channel: Channel, length: f32);

    /// Sets the read direction of `channel`.
    fn set_direction(&mut self, channel: Channel, direction: Direction);

    /// Sets the filter cutoff in Hz.
    fn set_filter_value(&mut self, hz: f32);

    /// Selects the filter response.
    fn set_filter_type(&mut self, filter: FilterType);

    /// Sets the dry/wet mix (0.0 = dry, 1.0 = wet).
    fn set_dry_wet_mix(&mut self, mix: f32);

    /// Sets the input gain multiplier.
    fn set_input_gain(&mut self, gain: f32);

    /// Sets the stereo width (0.0 = mono, 1.0 = full).
    fn set_stereo_width(&mut self, width: f32);

    /// Enables or disables loop sync for `channel`.
    fn set_loop_sync(&mut self, channel: Channel, enabled: bool);

    /// Enables continuous looping, or one-shot playback when `false`.
    fn set_looping(&mut self, looping: bool);

    /// Raises a one-shot request.
    fn request(&mut self, request: Request);

    /// Starts normal operation after the first loop has been captured.
    fn start(&mut self);

    /// Current lifecycle phase.
    fn status(&self) -> EngineStatus;

    /// Length of `channel`'s recorded buffer, in samples.
    fn buffer_samples(&self, channel: Channel) -> usize;

    /// True while the engine is still starting up.
    fn is_starting_up(&self) -> bool {
        self.status() == EngineStatus::StartingUp
    }

    /// True while the first loop is being recorded.
    fn is_buffering(&self) -> bool {
        self.status() == EngineStatus::Buffering
    }

    /// True once the first loop is captured and the engine awaits `start`.
    fn is_ready(&self) -> bool {
        self.status() == EngineStatus::Ready
    }
}

/// A single command issued to the engine.
///
/// Tagged-union form of every [`Looper`] write, used for logging and by the
/// recording double.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LooperCommand {
    /// See [`Looper::set_loop_start`].
    LoopStart(Channel, f32),
    /// See [`Looper::set_loop_length`].
    LoopLength(Channel, f32),
    /// See [`Looper::set_direction`].
    Direction(Channel, Direction),
    /// See [`Looper::set_filter_value`].
    FilterValue(f32),
    /// See [`Looper::set_filter_type`].
    FilterType(FilterType),
    /// See [`Looper::set_dry_wet_mix`].
    DryWetMix(f32),
    /// See [`Looper::set_input_gain`].
    InputGain(f32),
    /// See [`Looper::set_stereo_width`].
    StereoWidth(f32),
    /// See [`Looper::set_loop_sync`].
    LoopSync(Channel, bool),
    /// See [`Looper::set_looping`].
    Looping(bool),
    /// See [`Looper::request`].
    Request(Request),
    /// See [`Looper::start`].
    Start,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_type_thirds() {
        assert_eq!(FilterType::from_normalized(0.0), FilterType::LowPass);
        assert_eq!(FilterType::from_normalized(0.329), FilterType::LowPass);
        assert_eq!(FilterType::from_normalized(0.33), FilterType::BandPass);
        assert_eq!(FilterType::from_normalized(0.66), FilterType::BandPass);
        assert_eq!(FilterType::from_normalized(0.661), FilterType::HighPass);
        assert_eq!(FilterType::from_normalized(1.0), FilterType::HighPass);
    }

    #[test]
    fn test_default_status_is_starting_up() {
        assert_eq!(EngineStatus::default(), EngineStatus::StartingUp);
    }
}
