//! Button, toggle and gate gestures.
//!
//! One momentary button carries every imperative action, distinguished by
//! how long it is held:
//!
//! | hold | on release |
//! |---|---|
//! | up to `tap_max_ms` | quick action (depends on trigger mode) |
//! | past `tap_max_ms` | toggle the settings view |
//! | past `arm_hold_ms` | arm the reset; the next tap or gate resets |
//!
//! While armed, holding past `disarm_hold_ms` disarms without resetting.
//! Hold escalation is suspended while either channel is recording, so a
//! long press in Rec mode never lands in the settings view.

use crate::channel::{Channel, ChannelFocus};
use crate::clock::elapsed_ms;
use crate::config::ControlConfig;
use crate::looper::{Looper, Request};

/// What the current press will do when released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonHoldMode {
    /// No hold threshold crossed.
    #[default]
    NoMode,
    /// Release toggles the settings view.
    SettingsCandidate,
    /// Release arms the reset.
    ArmCandidate,
}

/// What a quick action does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriggerMode {
    /// Continuous looping; a tap retriggers the read heads.
    #[default]
    Loop,
    /// Looping with manual punch-in; a tap toggles recording.
    Rec,
    /// One-shot playback; a tap restarts it.
    OneShot,
}

impl TriggerMode {
    /// Maps a two-position toggle index onto a trigger mode.
    ///
    /// Position 0 selects Loop, anything else Rec.
    #[inline]
    pub const fn from_toggle_position(position: u8) -> Self {
        if position == 0 {
            TriggerMode::Loop
        } else {
            TriggerMode::Rec
        }
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            TriggerMode::Loop => "loop",
            TriggerMode::Rec => "rec",
            TriggerMode::OneShot => "oneshot",
        }
    }
}

/// Gesture and mode state of the panel.
#[derive(Debug, Clone)]
pub struct GestureMachine {
    tap_max_ms: u32,
    disarm_hold_ms: u32,
    arm_hold_ms: u32,
    hold_mode: ButtonHoldMode,
    trigger_mode: TriggerMode,
    focus: ChannelFocus,
    performance_focus: ChannelFocus,
    pressed: bool,
    pressed_at_ms: u32,
    armed: bool,
    recording: [bool; 2],
}

impl GestureMachine {
    /// Creates a machine in Loop mode with Both focus.
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            tap_max_ms: config.tap_max_ms,
            disarm_hold_ms: config.disarm_hold_ms,
            arm_hold_ms: config.arm_hold_ms,
            hold_mode: ButtonHoldMode::NoMode,
            trigger_mode: TriggerMode::Loop,
            focus: ChannelFocus::Both,
            performance_focus: ChannelFocus::Both,
            pressed: false,
            pressed_at_ms: 0,
            armed: false,
            recording: [false; 2],
        }
    }

    /// Focus the knobs currently address.
    #[inline]
    pub fn focus(&self) -> ChannelFocus {
        self.focus
    }

    /// Focus restored when the settings view closes.
    #[inline]
    pub fn performance_focus(&self) -> ChannelFocus {
        self.performance_focus
    }

    /// True while the knobs edit the settings.
    #[inline]
    pub fn in_settings_view(&self) -> bool {
        self.focus == ChannelFocus::Settings
    }

    /// Current trigger mode.
    #[inline]
    pub fn trigger_mode(&self) -> TriggerMode {
        self.trigger_mode
    }

    /// Current hold classification of the press.
    #[inline]
    pub fn hold_mode(&self) -> ButtonHoldMode {
        self.hold_mode
    }

    /// True while a reset is armed.
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// True while the button is held.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// True while `channel`'s recording latch is set.
    #[inline]
    pub fn is_recording(&self, channel: Channel) -> bool {
        self.recording[channel.index()]
    }

    /// Opens the settings view, remembering the performance focus.
    pub fn enter_settings_view(&mut self) {
        if self.in_settings_view() {
            return;
        }
        self.performance_focus = self.focus;
        self.focus = ChannelFocus::Settings;

        #[cfg(feature = "tracing")]
        tracing::debug!(restore = ?self.performance_focus, "gesture: settings view on");
    }

    /// Closes the settings view, restoring the performance focus.
    pub fn exit_settings_view(&mut self) {
        if !self.in_settings_view() {
            return;
        }
        self.focus = self.performance_focus;

        #[cfg(feature = "tracing")]
        tracing::debug!(focus = ?self.focus, "gesture: settings view off");
    }

    /// Selects the performance focus. Selecting [`ChannelFocus::Settings`]
    /// opens the settings view; any other change closes it first.
    ///
    /// Returns true if the focus changed.
    pub fn select_channel_focus(&mut self, focus: ChannelFocus) -> bool {
        if focus == ChannelFocus::Settings {
            let was_open = self.in_settings_view();
            self.enter_settings_view();
            return !was_open;
        }
        if focus == self.performance_focus {
            return false;
        }
        self.exit_settings_view();
        self.focus = focus;
        self.performance_focus = focus;

        #[cfg(feature = "tracing")]
        tracing::debug!(?focus, "gesture: channel focus");
        true
    }

    /// Switches the trigger mode and issues its entry commands.
    ///
    /// Nothing happens if `mode` is already current, unless `force` is set.
    /// Returns true if the entry commands were issued.
    pub fn select_trigger_mode<L: Looper + ?Sized>(
        &mut self,
        mode: TriggerMode,
        looper: &mut L,
        force: bool,
    ) -> bool {
        if mode == self.trigger_mode && !force {
            return false;
        }
        self.trigger_mode = mode;

        match mode {
            TriggerMode::Rec => {
                for channel in Channel::ALL {
                    looper.request(Request::StopWriting(channel));
                }
                looper.set_looping(true);
            }
            TriggerMode::Loop => {
                self.recording = [false; 2];
                for channel in Channel::ALL {
                    looper.request(Request::StartWriting(channel));
                }
                looper.request(Request::StartReading);
                looper.set_looping(true);
            }
            TriggerMode::OneShot => {
                looper.request(Request::StopReading);
                looper.set_looping(false);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(mode = mode.name(), force, "gesture: trigger mode");
        true
    }

    /// Button went down at `now_ms`.
    pub fn press(&mut self, now_ms: u32) {
        if self.pressed {
            return;
        }
        self.pressed = true;
        self.pressed_at_ms = now_ms;
    }

    /// Button went up at `now_ms`; resolves the press.
    ///
    /// A release following a forced release (see [`GestureMachine::hold`])
    /// is ignored.
    pub fn release<L: Looper + ?Sized>(&mut self, now_ms: u32, looper: &mut L) {
        if !self.pressed {
            return;
        }
        self.pressed = false;
        let held = elapsed_ms(now_ms, self.pressed_at_ms);

        match self.hold_mode {
            ButtonHoldMode::SettingsCandidate => {
                if self.in_settings_view() {
                    self.exit_settings_view();
                } else {
                    self.enter_settings_view();
                }
            }
            ButtonHoldMode::ArmCandidate => {
                self.armed = true;

                #[cfg(feature = "tracing")]
                tracing::debug!("gesture: reset armed");
            }
            ButtonHoldMode::NoMode => {
                if self.armed {
                    self.reset(looper);
                } else if held <= self.tap_max_ms {
                    self.quick_action(looper);
                }
            }
        }
        self.hold_mode = ButtonHoldMode::NoMode;
    }

    /// Evaluates hold thresholds for a held button at `now_ms`.
    pub fn hold(&mut self, now_ms: u32) {
        if !self.pressed || self.recording.iter().any(|&r| r) {
            return;
        }
        let held = elapsed_ms(now_ms, self.pressed_at_ms);

        if self.armed {
            if held >= self.disarm_hold_ms {
                self.armed = false;
                self.pressed = false;
                self.hold_mode = ButtonHoldMode::NoMode;

                #[cfg(feature = "tracing")]
                tracing::debug!(held, "gesture: disarmed");
            }
            return;
        }

        if held >= self.tap_max_ms {
            self.hold_mode = ButtonHoldMode::SettingsCandidate;
        }
        if held >= self.arm_hold_ms {
            self.exit_settings_view();
            self.hold_mode = ButtonHoldMode::ArmCandidate;
        }
    }

    /// Handles a gate rising edge.
    ///
    /// The gate is ignored while the settings view is open, while a hold
    /// threshold has been crossed and while `bootstrap` is set. Returns
    /// true if it acted.
    pub fn gate<L: Looper + ?Sized>(&mut self, looper: &mut L, bootstrap: bool) -> bool {
        if bootstrap || self.in_settings_view() || self.hold_mode != ButtonHoldMode::NoMode {
            return false;
        }
        if self.armed {
            self.reset(looper);
        } else {
            self.trigger(looper);
        }
        true
    }

    /// Quick action of a short tap.
    ///
    /// In the settings view a tap closes it. Otherwise the action depends
    /// on the trigger mode.
    pub fn quick_action<L: Looper + ?Sized>(&mut self, looper: &mut L) {
        if self.in_settings_view() {
            self.exit_settings_view();
            return;
        }
        self.trigger(looper);
    }

    /// Flips the recording latch of every channel the focus addresses and
    /// issues the matching start/stop write requests.
    pub fn toggle_recording<L: Looper + ?Sized>(&mut self, looper: &mut L) {
        for channel in Channel::ALL {
            if !self.focus.addresses(channel) {
                continue;
            }
            let latch = &mut self.recording[channel.index()];
            *latch = !*latch;
            looper.request(if *latch {
                Request::StartWriting(channel)
            } else {
                Request::StopWriting(channel)
            });

            #[cfg(feature = "tracing")]
            tracing::debug!(?channel, recording = *latch, "gesture: recording");
        }
    }

    fn trigger<L: Looper + ?Sized>(&mut self, looper: &mut L) {
        match self.trigger_mode {
            TriggerMode::Rec => self.toggle_recording(looper),
            TriggerMode::OneShot => looper.request(Request::Restart),
            TriggerMode::Loop => looper.request(Request::Retrigger),
        }
    }

    fn reset<L: Looper + ?Sized>(&mut self, looper: &mut L) {
        self.exit_settings_view();
        looper.request(Request::Reset);
        self.armed = false;

        #[cfg(feature = "tracing")]
        tracing::debug!("gesture: reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::looper::{EngineStatus, LooperCommand};
    use crate::sim::SimLooper;

    fn machine() -> GestureMachine {
        GestureMachine::new(&ControlConfig::default())
    }

    fn looper() -> SimLooper {
        let mut looper = SimLooper::new(48_000);
        looper.set_status(EngineStatus::Running);
        looper
    }

    fn tap(m: &mut GestureMachine, looper: &mut SimLooper, at: u32, held: u32) {
        m.press(at);
        m.hold(at + held);
        m.release(at + held, looper);
    }

    #[test]
    fn test_short_tap_retriggers_in_loop_mode() {
        let mut m = machine();
        let mut l = looper();
        tap(&mut m, &mut l, 0, 120);
        assert_eq!(l.requests(), vec![Request::Retrigger]);
    }

    #[test]
    fn test_tap_at_threshold_is_still_quick() {
        let mut m = machine();
        let mut l = looper();
        m.press(0);
        m.release(300, &mut l);
        assert_eq!(l.requests(), vec![Request::Retrigger]);
    }

    #[test]
    fn test_medium_hold_toggles_settings_view() {
        let mut m = machine();
        let mut l = looper();
        tap(&mut m, &mut l, 0, 600);
        assert!(m.in_settings_view());
        assert!(l.requests().is_empty());

        tap(&mut m, &mut l, 1000, 600);
        assert!(!m.in_settings_view());
        assert_eq!(m.focus(), ChannelFocus::Both);
    }

    #[test]
    fn test_tap_in_settings_view_closes_it() {
        let mut m = machine();
        let mut l = looper();
        m.select_channel_focus(ChannelFocus::Left);
        m.enter_settings_view();
        tap(&mut m, &mut l, 0, 50);
        assert_eq!(m.focus(), ChannelFocus::Left);
        assert!(l.requests().is_empty());
    }

    #[test]
    fn test_long_hold_arms_then_tap_resets() {
        let mut m = machine();
        let mut l = looper();
        m.press(0);
        m.hold(400);
        assert_eq!(m.hold_mode(), ButtonHoldMode::SettingsCandidate);
        m.hold(1600);
        assert_eq!(m.hold_mode(), ButtonHoldMode::ArmCandidate);
        m.release(1700, &mut l);
        assert!(m.is_armed());
        assert!(!m.in_settings_view());
        assert_eq!(m.hold_mode(), ButtonHoldMode::NoMode);

        tap(&mut m, &mut l, 3000, 50);
        assert_eq!(l.requests(), vec![Request::Reset]);
        assert!(!m.is_armed());
    }

    #[test]
    fn test_arm_hold_closes_settings_view() {
        let mut m = machine();
        let mut l = looper();
        m.enter_settings_view();
        m.press(0);
        m.hold(1500);
        assert!(!m.in_settings_view());
        m.release(1510, &mut l);
        assert!(m.is_armed());
    }

    #[test]
    fn test_armed_long_hold_disarms_and_releases() {
        let mut m = machine();
        let mut l = looper();
        tap(&mut m, &mut l, 0, 1600);
        assert!(m.is_armed());

        m.press(2000);
        m.hold(2500);
        assert!(m.is_armed());
        m.hold(3000);
        assert!(!m.is_armed());
        assert!(!m.is_pressed());

        m.release(3100, &mut l);
        assert!(l.requests().is_empty());
    }

    #[test]
    fn test_gate_follows_trigger_mode() {
        let mut m = machine();
        let mut l = looper();

        assert!(m.gate(&mut l, false));
        m.select_trigger_mode(TriggerMode::OneShot, &mut l, false);
        l.clear_commands();
        assert!(m.gate(&mut l, false));
        assert_eq!(l.requests(), vec![Request::Restart]);
    }

    #[test]
    fn test_gate_suppressed() {
        let mut m = machine();
        let mut l = looper();

        assert!(!m.gate(&mut l, true));

        m.enter_settings_view();
        assert!(!m.gate(&mut l, false));
        m.exit_settings_view();

        m.press(0);
        m.hold(400);
        assert!(!m.gate(&mut l, false));
        assert!(l.commands().is_empty());
    }

    #[test]
    fn test_gate_resets_when_armed() {
        let mut m = machine();
        let mut l = looper();
        tap(&mut m, &mut l, 0, 1600);
        assert!(m.gate(&mut l, false));
        assert_eq!(l.requests(), vec![Request::Reset]);
        assert!(!m.is_armed());
    }

    #[test]
    fn test_rec_mode_toggles_focused_channels() {
        let mut m = machine();
        let mut l = looper();
        m.select_trigger_mode(TriggerMode::Rec, &mut l, false);
        l.clear_commands();

        tap(&mut m, &mut l, 0, 50);
        assert_eq!(
            l.requests(),
            vec![
                Request::StartWriting(Channel::Left),
                Request::StartWriting(Channel::Right)
            ]
        );
        assert!(m.is_recording(Channel::Left));

        l.clear_commands();
        tap(&mut m, &mut l, 1000, 50);
        assert_eq!(
            l.requests(),
            vec![
                Request::StopWriting(Channel::Left),
                Request::StopWriting(Channel::Right)
            ]
        );
        assert!(!m.is_recording(Channel::Right));
    }

    #[test]
    fn test_recording_latches_are_independent() {
        let mut m = machine();
        let mut l = looper();
        m.select_trigger_mode(TriggerMode::Rec, &mut l, false);

        m.select_channel_focus(ChannelFocus::Left);
        m.toggle_recording(&mut l);
        m.select_channel_focus(ChannelFocus::Right);
        m.toggle_recording(&mut l);
        m.select_channel_focus(ChannelFocus::Left);
        l.clear_commands();
        m.toggle_recording(&mut l);

        assert_eq!(l.requests(), vec![Request::StopWriting(Channel::Left)]);
        assert!(!m.is_recording(Channel::Left));
        assert!(m.is_recording(Channel::Right));
    }

    #[test]
    fn test_hold_escalation_suspended_while_recording() {
        let mut m = machine();
        let mut l = looper();
        m.select_trigger_mode(TriggerMode::Rec, &mut l, false);
        m.toggle_recording(&mut l);

        m.press(0);
        m.hold(2000);
        assert_eq!(m.hold_mode(), ButtonHoldMode::NoMode);
        m.release(2000, &mut l);
        assert!(!m.in_settings_view());
        assert!(!m.is_armed());
    }

    #[test]
    fn test_trigger_mode_entry_commands() {
        let mut m = machine();
        let mut l = looper();

        assert!(!m.select_trigger_mode(TriggerMode::Loop, &mut l, false));
        assert!(l.commands().is_empty());

        assert!(m.select_trigger_mode(TriggerMode::Loop, &mut l, true));
        assert_eq!(
            l.take_commands(),
            vec![
                LooperCommand::Request(Request::StartWriting(Channel::Left)),
                LooperCommand::Request(Request::StartWriting(Channel::Right)),
                LooperCommand::Request(Request::StartReading),
                LooperCommand::Looping(true),
            ]
        );

        m.select_trigger_mode(TriggerMode::Rec, &mut l, false);
        assert_eq!(
            l.take_commands(),
            vec![
                LooperCommand::Request(Request::StopWriting(Channel::Left)),
                LooperCommand::Request(Request::StopWriting(Channel::Right)),
                LooperCommand::Looping(true),
            ]
        );

        m.select_trigger_mode(TriggerMode::OneShot, &mut l, false);
        assert_eq!(
            l.take_commands(),
            vec![
                LooperCommand::Request(Request::StopReading),
                LooperCommand::Looping(false),
            ]
        );
    }

    #[test]
    fn test_loop_mode_clears_recording_latches() {
        let mut m = machine();
        let mut l = looper();
        m.select_trigger_mode(TriggerMode::Rec, &mut l, false);
        m.toggle_recording(&mut l);
        m.select_trigger_mode(TriggerMode::Loop, &mut l, false);
        assert!(!m.is_recording(Channel::Left));
        assert!(!m.is_recording(Channel::Right));
    }

    #[test]
    fn test_channel_focus_change_closes_settings_view() {
        let mut m = machine();
        m.enter_settings_view();
        assert!(!m.select_channel_focus(ChannelFocus::Both));
        assert!(m.in_settings_view());

        assert!(m.select_channel_focus(ChannelFocus::Right));
        assert_eq!(m.focus(), ChannelFocus::Right);
        assert_eq!(m.performance_focus(), ChannelFocus::Right);

        assert!(m.select_channel_focus(ChannelFocus::Settings));
        assert!(m.in_settings_view());
        assert!(!m.select_channel_focus(ChannelFocus::Settings));
    }

    #[test]
    fn test_settings_view_entry_is_idempotent() {
        let mut m = machine();
        m.select_channel_focus(ChannelFocus::Left);
        m.enter_settings_view();
        m.enter_settings_view();
        m.exit_settings_view();
        assert_eq!(m.focus(), ChannelFocus::Left);
    }
}
