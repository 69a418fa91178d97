//! Session scripts replayed by `ostinato simulate`.
//!
//! A script describes the engine (buffer length, how long it takes to start
//! up) and a list of steps. Each step sets some panel inputs and then holds
//! them for a number of control ticks; inputs a step leaves out keep their
//! previous value.
//!
//! ```toml
//! buffer_samples = 48000
//! startup_ticks = 2
//! tick_ms = 10
//!
//! [[step]]
//! ticks = 3
//! button = true
//!
//! [[step]]
//! ticks = 5
//! button = false
//! size = 0.8
//! ```

use std::path::Path;

use anyhow::Context;
use ostinato_platform::{ChannelFocus, TriggerMode};
use serde::Deserialize;

fn default_buffer_samples() -> usize {
    48_000
}

fn default_startup_ticks() -> u32 {
    1
}

fn default_tick_ms() -> u32 {
    1
}

fn default_ticks() -> u32 {
    1
}

/// Channel focus names accepted in scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusName {
    /// Left channel.
    Left,
    /// Right channel.
    Right,
    /// Both channels.
    Both,
    /// Settings view.
    Settings,
}

impl From<FocusName> for ChannelFocus {
    fn from(name: FocusName) -> Self {
        match name {
            FocusName::Left => ChannelFocus::Left,
            FocusName::Right => ChannelFocus::Right,
            FocusName::Both => ChannelFocus::Both,
            FocusName::Settings => ChannelFocus::Settings,
        }
    }
}

/// Trigger mode names accepted in scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeName {
    /// Loop mode.
    Loop,
    /// Rec mode.
    Rec,
    /// One-shot mode.
    Oneshot,
}

impl From<ModeName> for TriggerMode {
    fn from(name: ModeName) -> Self {
        match name {
            ModeName::Loop => TriggerMode::Loop,
            ModeName::Rec => TriggerMode::Rec,
            ModeName::Oneshot => TriggerMode::OneShot,
        }
    }
}

/// One script step.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Control ticks to hold this step for.
    #[serde(default = "default_ticks")]
    pub ticks: u32,
    /// Blend knob position.
    pub blend: Option<f32>,
    /// Start knob position.
    pub start: Option<f32>,
    /// Tone knob position.
    pub tone: Option<f32>,
    /// Size knob position.
    pub size: Option<f32>,
    /// Button level.
    pub button: Option<bool>,
    /// Toggle level.
    pub toggle: Option<bool>,
    /// Gate level.
    pub gate: Option<bool>,
    /// Direct channel focus selection.
    pub focus: Option<FocusName>,
    /// Direct trigger mode selection.
    pub mode: Option<ModeName>,
}

impl Step {
    /// Knob fields present in this step, with their names.
    pub fn knobs(&self) -> [(&'static str, Option<f32>); 4] {
        [
            ("blend", self.blend),
            ("start", self.start),
            ("tone", self.tone),
            ("size", self.size),
        ]
    }
}

/// A parsed session script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Recorded buffer length per channel, in samples.
    #[serde(default = "default_buffer_samples")]
    pub buffer_samples: usize,
    /// Ticks the engine spends starting up before it begins buffering.
    #[serde(default = "default_startup_ticks")]
    pub startup_ticks: u32,
    /// Milliseconds between control ticks.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u32,
    /// Steps in order.
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    /// Load and validate a script file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script '{}'", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("invalid script '{}'", path.display()))
    }

    /// Parse and validate a script.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        let script: Script = toml::from_str(toml_str)?;
        script.validate()?;
        Ok(script)
    }

    /// Total number of control ticks the script runs for.
    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.ticks)).sum()
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.buffer_samples == 0 {
            anyhow::bail!("buffer_samples must be non-zero");
        }
        if self.tick_ms == 0 {
            anyhow::bail!("tick_ms must be non-zero");
        }
        for (i, step) in self.steps.iter().enumerate() {
            let n = i + 1;
            if step.ticks == 0 {
                anyhow::bail!("step {n}: ticks must be at least 1");
            }
            for (name, value) in step.knobs() {
                if let Some(v) = value
                    && !(0.0..=1.0).contains(&v)
                {
                    anyhow::bail!("step {n}: {name} = {v} is outside 0.0..=1.0");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let script = Script::from_toml("").unwrap();
        assert_eq!(script.buffer_samples, 48_000);
        assert_eq!(script.startup_ticks, 1);
        assert_eq!(script.tick_ms, 1);
        assert!(script.steps.is_empty());
    }

    #[test]
    fn test_steps_parse() {
        let script = Script::from_toml(
            r#"
            tick_ms = 10

            [[step]]
            ticks = 3
            button = true
            focus = "left"

            [[step]]
            size = 0.8
            mode = "oneshot"
            "#,
        )
        .unwrap();
        assert_eq!(script.steps.len(), 2);
        assert_eq!(script.steps[0].ticks, 3);
        assert_eq!(script.steps[0].button, Some(true));
        assert_eq!(script.steps[0].focus, Some(FocusName::Left));
        assert_eq!(script.steps[1].ticks, 1);
        assert_eq!(script.steps[1].size, Some(0.8));
        assert_eq!(TriggerMode::from(ModeName::Oneshot), TriggerMode::OneShot);
        assert_eq!(script.total_ticks(), 4);
    }

    #[test]
    fn test_rejects_out_of_range_knob() {
        let err = Script::from_toml("[[step]]\ntone = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("step 1: tone"), "got: {err}");
    }

    #[test]
    fn test_rejects_zero_ticks() {
        assert!(Script::from_toml("[[step]]\nticks = 0\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_field() {
        assert!(Script::from_toml("[[step]]\nknob = 0.5\n").is_err());
    }
}
