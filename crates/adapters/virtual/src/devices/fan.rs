//! Virtual fan with speed percentage, preset modes, oscillation and direction.
//!
//! Percentage and preset mode are exclusive: setting one clears the other.
//! Only configured preset modes are accepted.

use mockhub_app::ports::Device;
use mockhub_domain::capability::{FanDirection, FanFeatures};
use mockhub_domain::entity::{Entity, EntityState};
use mockhub_domain::error::{MockHubError, RejectedCommand};
use mockhub_domain::id::EntityId;
use mockhub_domain::kind::DeviceKind;
use mockhub_domain::service::{
    OSCILLATE, SET_DIRECTION, SET_PERCENTAGE, SET_PRESET_MODE, TURN_OFF, TURN_ON,
};
use serde::Deserialize;
use serde_json::Value;

use super::{EntityCore, params};
use crate::config::FanConfig;

/// Speed used by `turn_on` when no percentage is given.
pub const DEFAULT_ON_PERCENTAGE: u8 = 67;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TurnOnParams {
    percentage: Option<u8>,
    preset_mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PercentageParams {
    percentage: u8,
}

#[derive(Debug, Deserialize)]
struct PresetModeParams {
    preset_mode: String,
}

#[derive(Debug, Deserialize)]
struct DirectionParams {
    direction: FanDirection,
}

#[derive(Debug, Deserialize)]
struct OscillateParams {
    oscillating: bool,
}

pub struct VirtualFan {
    core: EntityCore,
    features: FanFeatures,
    speed_count: u32,
    preset_modes: Vec<String>,
    percentage: Option<u8>,
    preset_mode: Option<String>,
    oscillating: Option<bool>,
    direction: Option<FanDirection>,
}

impl VirtualFan {
    #[must_use]
    pub fn new(name: &str, config: &FanConfig) -> Self {
        let speed_count = if config.speed { 3 } else { config.speed_count };
        let mut features = FanFeatures::empty();
        if speed_count > 0 {
            features.insert(FanFeatures::SET_SPEED);
        }
        if config.oscillate {
            features.insert(FanFeatures::OSCILLATE);
        }
        if config.direction {
            features.insert(FanFeatures::DIRECTION);
        }
        if !config.modes.is_empty() {
            features.insert(FanFeatures::PRESET_MODE);
        }
        Self {
            core: EntityCore::new(DeviceKind::Fan, name, config.initial_availability, None),
            features,
            speed_count,
            preset_modes: config.modes.clone(),
            percentage: None,
            preset_mode: None,
            oscillating: config.oscillate.then_some(false),
            direction: config.direction.then_some(FanDirection::Forward),
        }
    }

    #[must_use]
    pub fn features(&self) -> FanFeatures {
        self.features
    }

    #[must_use]
    pub fn speed_count(&self) -> u32 {
        self.speed_count
    }

    #[must_use]
    pub fn percentage(&self) -> Option<u8> {
        self.percentage
    }

    #[must_use]
    pub fn preset_mode(&self) -> Option<&str> {
        self.preset_mode.as_deref()
    }

    #[must_use]
    pub fn oscillating(&self) -> Option<bool> {
        self.oscillating
    }

    #[must_use]
    pub fn direction(&self) -> Option<FanDirection> {
        self.direction
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.percentage.is_some_and(|p| p > 0) || self.preset_mode.is_some()
    }

    /// Start the fan, on a preset when one is given, else at `percentage`
    /// (67% by default).
    ///
    /// # Errors
    ///
    /// Returns [`RejectedCommand::InvalidPresetMode`] for an unknown preset.
    pub fn turn_on(
        &mut self,
        percentage: Option<u8>,
        preset_mode: Option<String>,
    ) -> Result<(), RejectedCommand> {
        if let Some(mode) = preset_mode.filter(|mode| !mode.is_empty()) {
            return self.set_preset_mode(mode);
        }
        self.set_percentage(percentage.unwrap_or(DEFAULT_ON_PERCENTAGE));
        Ok(())
    }

    pub fn turn_off(&mut self) {
        self.set_percentage(0);
    }

    pub fn set_percentage(&mut self, percentage: u8) {
        self.percentage = Some(percentage);
        self.preset_mode = None;
    }

    /// # Errors
    ///
    /// Returns [`RejectedCommand::InvalidPresetMode`] when `mode` is not one
    /// of the configured modes. The fan is left unchanged.
    pub fn set_preset_mode(&mut self, mode: String) -> Result<(), RejectedCommand> {
        if !self.preset_modes.contains(&mode) {
            return Err(RejectedCommand::InvalidPresetMode {
                mode,
                allowed: self.preset_modes.clone(),
            });
        }
        self.preset_mode = Some(mode);
        self.percentage = None;
        Ok(())
    }

    pub fn set_direction(&mut self, direction: FanDirection) {
        self.direction = Some(direction);
    }

    pub fn oscillate(&mut self, oscillating: bool) {
        self.oscillating = Some(oscillating);
    }
}

impl Device for VirtualFan {
    fn entity_id(&self) -> &EntityId {
        self.core.entity_id()
    }

    fn name(&self) -> &str {
        self.core.name()
    }

    fn is_available(&self) -> bool {
        self.core.is_available()
    }

    fn set_available(&mut self, available: bool) {
        self.core.set_available(available);
    }

    fn state(&self) -> EntityState {
        if self.is_on() {
            EntityState::On
        } else {
            EntityState::Off
        }
    }

    fn snapshot(&self) -> Entity {
        let preset_modes = (!self.preset_modes.is_empty()).then(|| self.preset_modes.clone());
        self.core
            .snapshot(self.state())
            .with_attribute("supported_features", self.features.bits())
            .with_attribute("speed_count", self.speed_count)
            .with_optional_attribute("percentage", self.percentage)
            .with_optional_attribute("preset_mode", self.preset_mode.clone())
            .with_optional_attribute("preset_modes", preset_modes)
            .with_optional_attribute("oscillating", self.oscillating)
            .with_optional_attribute("direction", self.direction.map(FanDirection::as_str))
    }

    fn apply(&mut self, service: &str, data: &Value) -> Result<(), MockHubError> {
        let before = self.state();
        match service {
            TURN_ON => {
                let TurnOnParams {
                    percentage,
                    preset_mode,
                } = params(service, data)?;
                self.turn_on(percentage, preset_mode)?;
            }
            TURN_OFF => self.turn_off(),
            SET_PERCENTAGE => {
                let PercentageParams { percentage } = params(service, data)?;
                self.set_percentage(percentage);
            }
            SET_PRESET_MODE => {
                let PresetModeParams { preset_mode } = params(service, data)?;
                self.set_preset_mode(preset_mode)?;
            }
            SET_DIRECTION => {
                let DirectionParams { direction } = params(service, data)?;
                self.set_direction(direction);
            }
            OSCILLATE => {
                let OscillateParams { oscillating } = params(service, data)?;
                self.oscillate(oscillating);
            }
            other => return Err(self.core.unsupported(other)),
        }
        tracing::info!(
            entity_id = %self.core.entity_id(),
            percentage = ?self.percentage,
            preset_mode = ?self.preset_mode,
            "{service}"
        );
        self.core.touch(before != self.state());
        Ok(())
    }
}
