//! The control tick.
//!
//! [`Controller`] owns every piece of control-plane state and the injected
//! capabilities. The host calls [`Controller::tick`] at control rate; each
//! tick reads the panel once, acts according to the engine's lifecycle
//! phase, drives the LED and drains pending settings writes.
//!
//! ```text
//! StartingUp  seed dry/wet from the Blend knob, re-apply stored settings
//! Buffering   LED on; tap (or gate, after boot) stops buffering
//! Ready       apply trigger mode, seed all knobs, start the engine
//! Running     toggle → knobs (Size, Start, Blend, Tone) → button → hold → gate
//! ```

use crate::channel::{ChannelFocus, ParameterSlot};
use crate::clock::Clock;
use crate::config::{ControlConfig, ToggleRole};
use crate::gesture::{GestureMachine, TriggerMode};
use crate::looper::{EngineStatus, Looper, Request};
use crate::router::ParameterRouter;
use crate::settings::{DrainOutcome, SettingsStorage, SettingsStore};
use crate::surface::{SurfaceReader, SurfaceSnapshot};
use crate::ControlSurface;

/// Control-plane state aggregate.
pub struct Controller<S, L, P, C>
where
    S: ControlSurface,
    L: Looper,
    P: SettingsStorage,
    C: Clock,
{
    config: ControlConfig,
    surface: S,
    looper: L,
    storage: P,
    clock: C,
    reader: SurfaceReader,
    router: ParameterRouter,
    gesture: GestureMachine,
    settings: SettingsStore,
    startup_seeded: bool,
    started: bool,
    stop_buffering_sent: bool,
    bootstrap: bool,
    toggle_position: Option<u8>,
    last_drain: DrainOutcome,
}

impl<S, L, P, C> Controller<S, L, P, C>
where
    S: ControlSurface,
    L: Looper,
    P: SettingsStorage,
    C: Clock,
{
    /// Creates a controller and loads the durable settings from `storage`.
    pub fn new(config: ControlConfig, surface: S, looper: L, mut storage: P, clock: C) -> Self {
        let settings = SettingsStore::load(&mut storage);
        Self {
            reader: SurfaceReader::new(config.deadband, config.debounce_depth()),
            router: ParameterRouter::new(&config),
            gesture: GestureMachine::new(&config),
            config,
            surface,
            looper,
            storage,
            clock,
            settings,
            startup_seeded: false,
            started: false,
            stop_buffering_sent: false,
            bootstrap: true,
            toggle_position: None,
            last_drain: DrainOutcome::Clean,
        }
    }

    /// Runs one control tick.
    pub fn tick(&mut self) {
        let snapshot = self.reader.read(&mut self.surface);

        match self.looper.status() {
            EngineStatus::StartingUp => self.tick_starting_up(&snapshot),
            EngineStatus::Buffering => self.tick_buffering(&snapshot),
            EngineStatus::Ready => self.tick_ready(&snapshot),
            EngineStatus::Running => self.tick_running(&snapshot),
        }

        self.reader.flush(&mut self.surface);
        self.last_drain = self
            .settings
            .drain(&mut self.storage, self.looper.is_starting_up());
    }

    fn tick_starting_up(&mut self, snapshot: &SurfaceSnapshot) {
        self.started = false;
        if self.startup_seeded {
            return;
        }
        self.startup_seeded = true;

        let blend = snapshot.knob(ParameterSlot::Blend);
        self.router.set_knob_value(ParameterSlot::Blend, blend);
        self.router.route(
            ParameterSlot::Blend,
            blend,
            ChannelFocus::Both,
            &mut self.looper,
            &mut self.settings,
        );

        let stored = *self.settings.durable();
        for (slot, value) in [
            (ParameterSlot::Blend, stored.input_gain),
            (ParameterSlot::Start, stored.stereo_width),
            (ParameterSlot::Tone, stored.filter_type),
            (ParameterSlot::Size, stored.loop_sync),
        ] {
            self.router.route(
                slot,
                value,
                ChannelFocus::Settings,
                &mut self.looper,
                &mut self.settings,
            );
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(blend, "controller: startup seeding done");
    }

    fn tick_buffering(&mut self, snapshot: &SurfaceSnapshot) {
        self.started = false;
        if self.stop_buffering_sent {
            return;
        }
        self.reader.set_led(true);

        let gate = snapshot.gate.rising && !self.bootstrap;
        if snapshot.button.rising || gate {
            self.reader.set_led(false);
            self.looper.request(Request::StopBuffering);
            self.stop_buffering_sent = true;

            #[cfg(feature = "tracing")]
            tracing::debug!(gate, "controller: stop buffering");
        }
    }

    fn tick_ready(&mut self, snapshot: &SurfaceSnapshot) {
        self.stop_buffering_sent = false;
        if self.started {
            return;
        }

        let mode = match self.config.toggle_role {
            ToggleRole::TriggerMode => TriggerMode::from_toggle_position(snapshot.toggle_position()),
            ToggleRole::ChannelFocus => self.gesture.trigger_mode(),
        };
        self.gesture.select_trigger_mode(mode, &mut self.looper, true);

        self.router
            .seed(snapshot.knobs, &mut self.looper, &mut self.settings);

        self.looper.start();
        self.started = true;
        self.toggle_position = None;

        #[cfg(feature = "tracing")]
        tracing::info!(mode = mode.name(), "controller: engine started");
    }

    fn tick_running(&mut self, snapshot: &SurfaceSnapshot) {
        self.stop_buffering_sent = false;
        let now = self.clock.now_ms();
        let position = snapshot.toggle_position();

        // The toggle only acts when it moves, so direct selections stick.
        if self.toggle_position != Some(position) {
            self.toggle_position = Some(position);
            match self.config.toggle_role {
                ToggleRole::TriggerMode => {
                    self.gesture.select_trigger_mode(
                        TriggerMode::from_toggle_position(position),
                        &mut self.looper,
                        false,
                    );
                }
                ToggleRole::ChannelFocus => {
                    self.gesture
                        .select_channel_focus(ChannelFocus::from_toggle_position(position));
                }
            }
        }

        for slot in ParameterSlot::SCAN_ORDER {
            self.router.process_knob(
                slot,
                snapshot.knob(slot),
                self.gesture.focus(),
                &mut self.looper,
                &mut self.settings,
            );
        }

        if snapshot.button.rising {
            self.gesture.press(now);
        }
        if snapshot.button.falling {
            self.gesture.release(now, &mut self.looper);
        }
        self.gesture.hold(now);

        if snapshot.gate.rising {
            self.gesture.gate(&mut self.looper, self.bootstrap);
        }
        self.bootstrap = false;
    }

    /// Selects the trigger mode directly, for hosts with a dedicated
    /// trigger-mode control.
    pub fn select_trigger_mode(&mut self, mode: TriggerMode) -> bool {
        self.gesture
            .select_trigger_mode(mode, &mut self.looper, false)
    }

    /// Selects the channel focus directly, for hosts with a dedicated
    /// channel selector.
    pub fn select_channel_focus(&mut self, focus: ChannelFocus) -> bool {
        self.gesture.select_channel_focus(focus)
    }

    /// The configuration.
    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// The panel.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The panel, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The engine.
    pub fn looper(&self) -> &L {
        &self.looper
    }

    /// The engine, mutably.
    pub fn looper_mut(&mut self) -> &mut L {
        &mut self.looper
    }

    /// The settings storage.
    pub fn storage(&self) -> &P {
        &self.storage
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Knob routing state.
    pub fn router(&self) -> &ParameterRouter {
        &self.router
    }

    /// Gesture and mode state.
    pub fn gesture(&self) -> &GestureMachine {
        &self.gesture
    }

    /// Settings copies and dirty flag.
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Outcome of the most recent settings drain.
    pub fn last_drain(&self) -> DrainOutcome {
        self.last_drain
    }

    /// True while the status LED is lit.
    pub fn led(&self) -> bool {
        self.reader.led()
    }
}
