//! Replay a session script against the control plane.

use std::path::PathBuf;

use clap::Args;
use ostinato_config::SettingsFile;
use ostinato_platform::{
    Channel, Clock, ControlConfig, ControlId, Controller, EngineStatus, Looper, LooperCommand,
    ManualClock, MemoryStorage, Request, SettingsStorage, SimLooper, SimSurface,
};
use serde_json::{Value, json};

use super::common::load_control_config;
use crate::script::{Script, Step};

/// Replay a session script and print the engine commands it produces.
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to the session script (TOML)
    pub script: PathBuf,

    /// Settings record to load and write back (in-memory if omitted)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Controller configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit JSON lines instead of text
    #[arg(long)]
    pub json: bool,
}

/// A command the engine received on a given tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Tick index, from 0.
    pub tick: u64,
    /// Clock reading when the tick ran.
    pub time_ms: u32,
    /// The command.
    pub command: LooperCommand,
}

/// Result of a replay.
#[derive(Debug)]
pub struct Report {
    /// Every emitted command, in order.
    pub events: Vec<Event>,
    /// Summary of the final controller state.
    pub summary: Value,
}

/// Run the simulate command.
pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    let script = Script::load(&args.script)?;
    let config = load_control_config(args.config.as_deref())?;

    tracing::info!(
        script = %args.script.display(),
        steps = script.steps.len(),
        ticks = script.total_ticks(),
        "simulating"
    );

    let report = match &args.settings {
        Some(path) => replay(&script, config, SettingsFile::new(path)),
        None => replay(&script, config, MemoryStorage::default()),
    };

    if args.json {
        for event in &report.events {
            println!("{}", event_json(event));
        }
        println!("{}", json!({ "summary": report.summary }));
    } else {
        for event in &report.events {
            println!(
                "{:>6}  {:>8} ms  {}",
                event.tick,
                event.time_ms,
                describe(&event.command)
            );
        }
        println!();
        println!("Summary:");
        if let Some(fields) = report.summary.as_object() {
            for (key, value) in fields {
                println!("  {key:16} {value}");
            }
        }
    }
    Ok(())
}

fn apply_step<P: SettingsStorage>(
    controller: &mut Controller<SimSurface, SimLooper, P, ManualClock>,
    step: &Step,
) {
    let knob_ids = [
        ControlId::KNOB_BLEND,
        ControlId::KNOB_START,
        ControlId::KNOB_TONE,
        ControlId::KNOB_SIZE,
    ];
    for (id, (_, value)) in knob_ids.into_iter().zip(step.knobs()) {
        if let Some(v) = value {
            controller.surface_mut().set(id, v);
        }
    }
    for (id, level) in [
        (ControlId::BUTTON, step.button),
        (ControlId::TOGGLE, step.toggle),
        (ControlId::GATE, step.gate),
    ] {
        if let Some(high) = level {
            controller.surface_mut().set_digital(id, high);
        }
    }
    if let Some(focus) = step.focus {
        controller.select_channel_focus(focus.into());
    }
    if let Some(mode) = step.mode {
        controller.select_trigger_mode(mode.into());
    }
}

/// Replays `script` and collects every command the engine received.
pub fn replay<P: SettingsStorage>(script: &Script, config: ControlConfig, storage: P) -> Report {
    let mut controller = Controller::new(
        config,
        SimSurface::new(),
        SimLooper::new(script.buffer_samples),
        storage,
        ManualClock::new(),
    );

    let mut events = Vec::new();
    let mut tick: u64 = 0;

    for step in &script.steps {
        apply_step(&mut controller, step);

        for _ in 0..step.ticks {
            if tick >= u64::from(script.startup_ticks) && controller.looper().is_starting_up() {
                controller.looper_mut().set_status(EngineStatus::Buffering);
                tracing::debug!(tick, "engine buffering");
            }

            controller.tick();

            let time_ms = controller.clock().now_ms();
            events.extend(
                controller
                    .looper_mut()
                    .take_commands()
                    .into_iter()
                    .map(|command| Event {
                        tick,
                        time_ms,
                        command,
                    }),
            );

            controller.clock().advance(script.tick_ms);
            tick += 1;
        }
    }

    let gesture = controller.gesture();
    let settings = controller.settings().durable();
    let summary = json!({
        "ticks": tick,
        "status": format!("{:?}", controller.looper().status()),
        "trigger_mode": gesture.trigger_mode().name(),
        "focus": format!("{:?}", gesture.focus()),
        "armed": gesture.is_armed(),
        "recording": [
            gesture.is_recording(Channel::Left),
            gesture.is_recording(Channel::Right),
        ],
        "led": controller.led(),
        "settings": {
            "input_gain": settings.input_gain,
            "filter_type": settings.filter_type,
            "loop_sync": settings.loop_sync,
            "filter_level": settings.filter_level,
            "rate_slew": settings.rate_slew,
            "stereo_width": settings.stereo_width,
            "degradation": settings.degradation,
        },
        "settings_dirty": controller.settings().is_dirty(),
    });

    Report { events, summary }
}

fn channel_name(channel: Channel) -> &'static str {
    match channel {
        Channel::Left => "left",
        Channel::Right => "right",
    }
}

fn request_name(request: Request) -> String {
    match request {
        Request::StartWriting(ch) => format!("start_writing:{}", channel_name(ch)),
        Request::StopWriting(ch) => format!("stop_writing:{}", channel_name(ch)),
        Request::StartReading => "start_reading".to_string(),
        Request::StopReading => "stop_reading".to_string(),
        Request::Restart => "restart".to_string(),
        Request::Retrigger => "retrigger".to_string(),
        Request::Reset => "reset".to_string(),
        Request::StopBuffering => "stop_buffering".to_string(),
    }
}

/// Human-readable one-line form of a command.
pub fn describe(command: &LooperCommand) -> String {
    match *command {
        LooperCommand::LoopStart(ch, v) => format!("loop_start {} {v:.1}", channel_name(ch)),
        LooperCommand::LoopLength(ch, v) => format!("loop_length {} {v:.1}", channel_name(ch)),
        LooperCommand::Direction(ch, d) => format!("direction {} {d:?}", channel_name(ch)),
        LooperCommand::FilterValue(hz) => format!("filter_value {hz:.1} Hz"),
        LooperCommand::FilterType(f) => format!("filter_type {f:?}"),
        LooperCommand::DryWetMix(v) => format!("dry_wet_mix {v:.3}"),
        LooperCommand::InputGain(v) => format!("input_gain {v:.3}"),
        LooperCommand::StereoWidth(v) => format!("stereo_width {v:.3}"),
        LooperCommand::LoopSync(ch, on) => format!("loop_sync {} {on}", channel_name(ch)),
        LooperCommand::Looping(on) => format!("looping {on}"),
        LooperCommand::Request(r) => format!("request {}", request_name(r)),
        LooperCommand::Start => "start".to_string(),
    }
}

/// JSON form of an event.
pub fn event_json(event: &Event) -> Value {
    let (command, args) = match event.command {
        LooperCommand::LoopStart(ch, v) => ("loop_start", json!([channel_name(ch), v])),
        LooperCommand::LoopLength(ch, v) => ("loop_length", json!([channel_name(ch), v])),
        LooperCommand::Direction(ch, d) => {
            ("direction", json!([channel_name(ch), format!("{d:?}")]))
        }
        LooperCommand::FilterValue(hz) => ("filter_value", json!([hz])),
        LooperCommand::FilterType(f) => ("filter_type", json!([format!("{f:?}")])),
        LooperCommand::DryWetMix(v) => ("dry_wet_mix", json!([v])),
        LooperCommand::InputGain(v) => ("input_gain", json!([v])),
        LooperCommand::StereoWidth(v) => ("stereo_width", json!([v])),
        LooperCommand::LoopSync(ch, on) => ("loop_sync", json!([channel_name(ch), on])),
        LooperCommand::Looping(on) => ("looping", json!([on])),
        LooperCommand::Request(r) => ("request", json!([request_name(r)])),
        LooperCommand::Start => ("start", json!([])),
    };
    json!({
        "tick": event.tick,
        "time_ms": event.time_ms,
        "command": command,
        "args": args,
    })
}
