//! Virtual light with optional brightness, hs color, color temperature and
//! effects.
//!
//! Hs color and color temperature are exclusive modes: selecting one clears
//! the other. Brightness is independent of both. An effect in a `turn_on`
//! payload is ignored unless effects were enabled in configuration.

use mockhub_app::ports::Device;
use mockhub_domain::capability::{ColorMode, HsColor, LightFeatures};
use mockhub_domain::entity::{Entity, EntityState};
use mockhub_domain::error::MockHubError;
use mockhub_domain::id::EntityId;
use mockhub_domain::kind::DeviceKind;
use mockhub_domain::service::{TURN_OFF, TURN_ON};
use serde::Deserialize;
use serde_json::Value;

use super::{EntityCore, params};
use crate::config::LightConfig;

/// Optional parameters of `light.turn_on`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LightTurnOn {
    pub hs_color: Option<HsColor>,
    pub color_temp: Option<u16>,
    pub brightness: Option<u8>,
    pub effect: Option<String>,
}

pub struct VirtualLight {
    core: EntityCore,
    on: bool,
    features: LightFeatures,
    color_modes: Vec<ColorMode>,
    color_mode: Option<ColorMode>,
    brightness: Option<u8>,
    hs_color: Option<HsColor>,
    color_temp: Option<u16>,
    effect: Option<String>,
    effect_list: Option<Vec<String>>,
}

impl VirtualLight {
    #[must_use]
    pub fn new(name: &str, config: &LightConfig) -> Self {
        let mut light = Self {
            core: EntityCore::new(DeviceKind::Light, name, config.initial_availability, None),
            on: config.initial_value.eq_ignore_ascii_case("on"),
            features: LightFeatures::empty(),
            color_modes: vec![ColorMode::Onoff],
            color_mode: None,
            brightness: None,
            hs_color: None,
            color_temp: None,
            effect: None,
            effect_list: None,
        };
        if config.support_brightness {
            light.features.insert(LightFeatures::BRIGHTNESS);
            light.brightness = Some(config.initial_brightness);
            light.color_modes.push(ColorMode::Brightness);
        }
        if config.support_color {
            light.features.insert(LightFeatures::COLOR);
            light.hs_color = Some(config.initial_color);
            light.color_mode = Some(ColorMode::Hs);
            light.color_modes.push(ColorMode::Hs);
        }
        // Temperature wins when both modes are supported.
        if config.support_color_temp {
            light.features.insert(LightFeatures::COLOR_TEMP);
            light.color_temp = Some(config.initial_color_temp);
            light.color_mode = Some(ColorMode::ColorTemp);
            light.color_modes.push(ColorMode::ColorTemp);
        }
        if config.support_effect {
            light.features.insert(LightFeatures::EFFECT);
            light.effect = Some(config.initial_effect.clone());
            light.effect_list = Some(config.initial_effect_list.clone());
        }
        light
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    #[must_use]
    pub fn features(&self) -> LightFeatures {
        self.features
    }

    #[must_use]
    pub fn brightness(&self) -> Option<u8> {
        self.brightness
    }

    /// Mode shown to callers: the active color mode, else the plainest
    /// supported one.
    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode.unwrap_or(if self.features.contains(LightFeatures::BRIGHTNESS) {
            ColorMode::Brightness
        } else {
            ColorMode::Onoff
        })
    }

    /// Current hs color, only while hs mode is active.
    #[must_use]
    pub fn hs_color(&self) -> Option<HsColor> {
        self.hs_color.filter(|_| self.color_mode == Some(ColorMode::Hs))
    }

    /// Current color temperature, only while temperature mode is active.
    #[must_use]
    pub fn color_temp(&self) -> Option<u16> {
        self.color_temp
            .filter(|_| self.color_mode == Some(ColorMode::ColorTemp))
    }

    #[must_use]
    pub fn effect(&self) -> Option<&str> {
        self.effect.as_deref()
    }

    pub fn turn_on(&mut self, params: LightTurnOn) {
        if let Some(hs) = params.hs_color
            && self.features.contains(LightFeatures::COLOR)
        {
            self.color_mode = Some(ColorMode::Hs);
            self.hs_color = Some(hs);
            self.color_temp = None;
        }
        if let Some(ct) = params.color_temp
            && self.features.contains(LightFeatures::COLOR_TEMP)
        {
            self.color_mode = Some(ColorMode::ColorTemp);
            self.color_temp = Some(ct);
            self.hs_color = None;
        }
        if let Some(brightness) = params.brightness {
            self.brightness = Some(brightness);
        }
        if let Some(effect) = params.effect
            && self.features.contains(LightFeatures::EFFECT)
        {
            self.effect = Some(effect);
        }
        self.on = true;
    }

    pub fn turn_off(&mut self) {
        self.on = false;
    }
}

impl Device for VirtualLight {
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
        if self.on {
            EntityState::On
        } else {
            EntityState::Off
        }
    }

    fn snapshot(&self) -> Entity {
        let color_modes: Vec<&str> = self.color_modes.iter().map(|m| m.as_str()).collect();
        self.core
            .snapshot(self.state())
            .with_attribute("supported_features", self.features.bits())
            .with_attribute("supported_color_modes", color_modes)
            .with_attribute("color_mode", self.color_mode().as_str())
            .with_optional_attribute("brightness", self.brightness)
            .with_optional_attribute(
                "hs_color",
                self.hs_color().map(|hs| vec![hs.hue, hs.saturation]),
            )
            .with_optional_attribute("color_temp", self.color_temp())
            .with_optional_attribute("effect", self.effect.clone())
            .with_optional_attribute("effect_list", self.effect_list.clone())
    }

    fn apply(&mut self, service: &str, data: &Value) -> Result<(), MockHubError> {
        let before = self.snapshot();
        match service {
            TURN_ON => {
                let params: LightTurnOn = params(service, data)?;
                tracing::info!(entity_id = %self.core.entity_id(), ?params, "turn_on");
                self.turn_on(params);
            }
            TURN_OFF => {
                tracing::info!(entity_id = %self.core.entity_id(), "turn_off");
                self.turn_off();
            }
            other => return Err(self.core.unsupported(other)),
        }
        let after = self.snapshot();
        self.core
            .touch(before.state != after.state || before.attributes != after.attributes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockhub_domain::entity::AttributeValue;
    use serde_json::json;

    fn light(configure: impl FnOnce(&mut LightConfig)) -> VirtualLight {
        let mut config = LightConfig::default();
        configure(&mut config);
        VirtualLight::new("Desk Lamp", &config)
    }

    #[test]
    fn should_default_to_on_with_full_brightness() {
        let light = light(|_| {});
        assert!(light.is_on());
        assert_eq!(light.brightness(), Some(255));
        assert_eq!(light.features(), LightFeatures::BRIGHTNESS);
        assert_eq!(light.color_mode(), ColorMode::Brightness);
    }

    #[test]
    fn should_prefer_color_temp_mode_at_start() {
        let light = light(|c| {
            c.support_color = true;
            c.support_color_temp = true;
        });
        assert_eq!(light.color_mode(), ColorMode::ColorTemp);
        assert_eq!(light.color_temp(), Some(240));
        assert_eq!(light.hs_color(), None);
        assert_eq!(light.features().bits(), 1 | 2 | 16);
    }

    #[test]
    fn should_clear_color_temp_when_color_is_set() {
        let mut light = light(|c| {
            c.support_color = true;
            c.support_color_temp = true;
        });

        light
            .apply(TURN_ON, &json!({"color_temp": 300}))
            .unwrap();
        light
            .apply(TURN_ON, &json!({"hs_color": [200, 40]}))
            .unwrap();

        assert_eq!(light.color_temp(), None);
        assert_eq!(light.color_mode(), ColorMode::Hs);
        assert_eq!(
            light.hs_color(),
            Some(HsColor {
                hue: 200.0,
                saturation: 40.0
            })
        );
    }

    #[test]
    fn should_clear_color_when_color_temp_is_set() {
        let mut light = light(|c| {
            c.support_color = true;
            c.support_color_temp = true;
        });

        light.apply(TURN_ON, &json!({"hs_color": [10, 20]})).unwrap();
        light.apply(TURN_ON, &json!({"color_temp": 153})).unwrap();

        assert_eq!(light.hs_color(), None);
        assert_eq!(light.color_temp(), Some(153));
    }

    #[test]
    fn should_ignore_color_without_capability() {
        let mut light = light(|_| {});
        light.apply(TURN_ON, &json!({"hs_color": [10, 20]})).unwrap();
        assert_eq!(light.hs_color(), None);
        assert_eq!(light.color_mode(), ColorMode::Brightness);
    }

    #[test]
    fn should_set_brightness_alongside_color() {
        let mut light = light(|c| c.support_color = true);
        light
            .apply(TURN_ON, &json!({"hs_color": [10, 20], "brightness": 12}))
            .unwrap();
        assert_eq!(light.brightness(), Some(12));
        assert!(light.hs_color().is_some());
    }

    #[test]
    fn should_ignore_effect_without_capability() {
        let mut light = light(|_| {});
        light.apply(TURN_ON, &json!({"effect": "rainbow"})).unwrap();
        assert_eq!(light.effect(), None);
    }

    #[test]
    fn should_set_effect_with_capability() {
        let mut light = light(|c| c.support_effect = true);
        assert_eq!(light.effect(), Some("none"));

        light.apply(TURN_ON, &json!({"effect": "rainbow"})).unwrap();

        assert_eq!(light.effect(), Some("rainbow"));
        let entity = light.snapshot();
        assert_eq!(
            entity.get_attribute("effect_list"),
            Some(&AttributeValue::from(vec!["rainbow", "none"]))
        );
    }

    #[test]
    fn should_turn_off_regardless_of_payload() {
        let mut light = light(|_| {});
        light
            .apply(TURN_OFF, &json!({"brightness": 10, "transition": 2}))
            .unwrap();
        assert!(!light.is_on());
        assert_eq!(light.brightness(), Some(255));
        assert_eq!(light.snapshot().state, EntityState::Off);
    }

    #[test]
    fn should_reject_malformed_brightness() {
        let mut light = light(|_| {});
        light.turn_off();
        let result = light.apply(TURN_ON, &json!({"brightness": "bright"}));
        assert!(matches!(result, Err(MockHubError::Validation(_))));
        assert!(!light.is_on());
    }

    #[test]
    fn should_report_color_attributes_only_for_active_mode() {
        let light = light(|c| {
            c.support_color = true;
            c.support_color_temp = true;
        });
        let entity = light.snapshot();
        assert_eq!(
            entity.get_attribute("color_temp"),
            Some(&AttributeValue::Int(240))
        );
        assert!(entity.get_attribute("hs_color").is_none());
        assert_eq!(
            entity.get_attribute("supported_color_modes"),
            Some(&AttributeValue::from(vec![
                "onoff",
                "brightness",
                "hs",
                "color_temp"
            ]))
        );
    }
}
