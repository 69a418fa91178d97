//! Controller configuration file.
//!
//! Every field is optional; a missing field keeps the panel default from
//! [`ControlConfig::default`].
//!
//! ```toml
//! deadband = 0.004
//! tap_max_ms = 250
//! toggle_role = "channel_focus"
//! ```

use std::path::Path;

use ostinato_platform::{ControlConfig, ToggleRole};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Serialized form of [`ToggleRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleRoleSetting {
    /// The toggle selects Loop / Rec.
    TriggerMode,
    /// The toggle selects Left / Right focus.
    ChannelFocus,
}

impl From<ToggleRoleSetting> for ToggleRole {
    fn from(role: ToggleRoleSetting) -> Self {
        match role {
            ToggleRoleSetting::TriggerMode => ToggleRole::TriggerMode,
            ToggleRoleSetting::ChannelFocus => ToggleRole::ChannelFocus,
        }
    }
}

impl From<ToggleRole> for ToggleRoleSetting {
    fn from(role: ToggleRole) -> Self {
        match role {
            ToggleRole::TriggerMode => ToggleRoleSetting::TriggerMode,
            ToggleRole::ChannelFocus => ToggleRoleSetting::ChannelFocus,
        }
    }
}

/// Partial [`ControlConfig`] as read from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfigFile {
    /// Engine sample rate in Hz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f32>,
    /// Knob deadband.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadband: Option<f32>,
    /// Soft-takeover distance (reserved).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_threshold: Option<f32>,
    /// Longest tap, in ms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tap_max_ms: Option<u32>,
    /// Disarm hold, in ms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disarm_hold_ms: Option<u32>,
    /// Arm hold, in ms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arm_hold_ms: Option<u32>,
    /// Debounce depth, in ticks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ticks: Option<u8>,
    /// Input gain at full travel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_gain: Option<f32>,
    /// Filter cutoff at full travel, in Hz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_filter_hz: Option<f32>,
    /// Flanger band boundary, in ms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flanger_threshold_ms: Option<f32>,
    /// Grain band boundary, in ms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grain_threshold_ms: Option<f32>,
    /// What the toggle drives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle_role: Option<ToggleRoleSetting>,
}

impl ControlConfigFile {
    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Overlays the present fields on the defaults and validates the result.
    pub fn into_control_config(self) -> Result<ControlConfig, ConfigError> {
        let d = ControlConfig::default();
        let config = ControlConfig {
            sample_rate: self.sample_rate.unwrap_or(d.sample_rate),
            deadband: self.deadband.unwrap_or(d.deadband),
            pickup_threshold: self.pickup_threshold.unwrap_or(d.pickup_threshold),
            tap_max_ms: self.tap_max_ms.unwrap_or(d.tap_max_ms),
            disarm_hold_ms: self.disarm_hold_ms.unwrap_or(d.disarm_hold_ms),
            arm_hold_ms: self.arm_hold_ms.unwrap_or(d.arm_hold_ms),
            debounce_ticks: self.debounce_ticks.unwrap_or(d.debounce_ticks),
            max_gain: self.max_gain.unwrap_or(d.max_gain),
            max_filter_hz: self.max_filter_hz.unwrap_or(d.max_filter_hz),
            flanger_threshold_ms: self.flanger_threshold_ms.unwrap_or(d.flanger_threshold_ms),
            grain_threshold_ms: self.grain_threshold_ms.unwrap_or(d.grain_threshold_ms),
            toggle_role: self.toggle_role.map_or(d.toggle_role, Into::into),
        };
        validate(&config)?;
        Ok(config)
    }
}

impl From<&ControlConfig> for ControlConfigFile {
    fn from(c: &ControlConfig) -> Self {
        Self {
            sample_rate: Some(c.sample_rate),
            deadband: Some(c.deadband),
            pickup_threshold: Some(c.pickup_threshold),
            tap_max_ms: Some(c.tap_max_ms),
            disarm_hold_ms: Some(c.disarm_hold_ms),
            arm_hold_ms: Some(c.arm_hold_ms),
            debounce_ticks: Some(c.debounce_ticks),
            max_gain: Some(c.max_gain),
            max_filter_hz: Some(c.max_filter_hz),
            flanger_threshold_ms: Some(c.flanger_threshold_ms),
            grain_threshold_ms: Some(c.grain_threshold_ms),
            toggle_role: Some(c.toggle_role.into()),
        }
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid_field(field, format!("{value} must be positive")))
    }
}

/// Checks the invariants the control plane relies on.
pub fn validate(c: &ControlConfig) -> Result<(), ConfigError> {
    positive("sample_rate", c.sample_rate)?;
    positive("max_gain", c.max_gain)?;
    positive("max_filter_hz", c.max_filter_hz)?;
    positive("grain_threshold_ms", c.grain_threshold_ms)?;

    if !(0.0..0.5).contains(&c.deadband) {
        return Err(ConfigError::invalid_field(
            "deadband",
            format!("{} is outside 0.0..0.5", c.deadband),
        ));
    }
    if !(0.0..=1.0).contains(&c.pickup_threshold) {
        return Err(ConfigError::invalid_field(
            "pickup_threshold",
            format!("{} is outside 0.0..=1.0", c.pickup_threshold),
        ));
    }
    if !(1..=8).contains(&c.debounce_ticks) {
        return Err(ConfigError::invalid_field(
            "debounce_ticks",
            format!("{} is outside 1..=8", c.debounce_ticks),
        ));
    }
    if c.tap_max_ms == 0 || c.tap_max_ms >= c.arm_hold_ms {
        return Err(ConfigError::invalid_field(
            "tap_max_ms",
            format!("{} must be non-zero and below arm_hold_ms ({})", c.tap_max_ms, c.arm_hold_ms),
        ));
    }
    if c.disarm_hold_ms == 0 {
        return Err(ConfigError::invalid_field("disarm_hold_ms", "must be non-zero"));
    }
    if !c.flanger_threshold_ms.is_finite() || c.flanger_threshold_ms <= c.grain_threshold_ms {
        return Err(ConfigError::invalid_field(
            "flanger_threshold_ms",
            format!(
                "{} must exceed grain_threshold_ms ({})",
                c.flanger_threshold_ms, c.grain_threshold_ms
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = ControlConfigFile::from_toml("")
            .unwrap()
            .into_control_config()
            .unwrap();
        assert_eq!(config, ControlConfig::default());
    }

    #[test]
    fn test_partial_overlay() {
        let file = ControlConfigFile::from_toml(
            r#"
            deadband = 0.004
            tap_max_ms = 250
            toggle_role = "channel_focus"
            "#,
        )
        .unwrap();
        let config = file.into_control_config().unwrap();
        assert_eq!(config.deadband, 0.004);
        assert_eq!(config.tap_max_ms, 250);
        assert_eq!(config.toggle_role, ToggleRole::ChannelFocus);
        assert_eq!(config.arm_hold_ms, 1500);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ControlConfigFile::from_toml("dead_band = 0.1").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            ("deadband = 0.7", "deadband"),
            ("sample_rate = 0.0", "sample_rate"),
            ("debounce_ticks = 0", "debounce_ticks"),
            ("tap_max_ms = 2000", "tap_max_ms"),
            ("grain_threshold_ms = 80.0", "flanger_threshold_ms"),
            ("disarm_hold_ms = 0", "disarm_hold_ms"),
        ];
        for (toml_str, expected) in cases {
            let err = ControlConfigFile::from_toml(toml_str)
                .unwrap()
                .into_control_config()
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidField { ref field, .. } if field == expected),
                "{toml_str}: got {err}"
            );
        }
    }

    #[test]
    fn test_full_roundtrip() {
        let config = ControlConfig {
            toggle_role: ToggleRole::ChannelFocus,
            debounce_ticks: 2,
            ..ControlConfig::default()
        };
        let toml_str = ControlConfigFile::from(&config).to_toml().unwrap();
        let parsed = ControlConfigFile::from_toml(&toml_str)
            .unwrap()
            .into_control_config()
            .unwrap();
        assert_eq!(parsed, config);
    }
}
