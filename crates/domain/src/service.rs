//! Service: a named command routed to one or more entities.
//!
//! Examples: `light.turn_on`, `fan.set_preset_mode`, `tester.set_available`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{MockHubError, ValidationError};
use crate::kind::DeviceKind;

/// Namespace of the kind-independent services (`tester.set_available`).
pub const TESTER_DOMAIN: &str = "tester";

pub const SET_AVAILABLE: &str = "set_available";
pub const TURN_ON: &str = "turn_on";
pub const TURN_OFF: &str = "turn_off";
pub const TOGGLE: &str = "toggle";
pub const LOCK: &str = "lock";
pub const UNLOCK: &str = "unlock";
pub const OPEN: &str = "open";
pub const SET_PERCENTAGE: &str = "set_percentage";
pub const SET_PRESET_MODE: &str = "set_preset_mode";
pub const SET_DIRECTION: &str = "set_direction";
pub const OSCILLATE: &str = "oscillate";
pub const SET: &str = "set";

/// Which handlers a service call is looked up under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceDomain {
    /// Services every device kind answers to.
    Tester,
    /// Services specific to one device kind.
    Kind(DeviceKind),
}

impl ServiceDomain {
    /// Whether an entity of `kind` can be targeted by calls in this domain.
    #[must_use]
    pub fn accepts(self, kind: DeviceKind) -> bool {
        match self {
            Self::Tester => true,
            Self::Kind(own) => own == kind,
        }
    }
}

impl From<DeviceKind> for ServiceDomain {
    fn from(kind: DeviceKind) -> Self {
        Self::Kind(kind)
    }
}

impl fmt::Display for ServiceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tester => f.write_str(TESTER_DOMAIN),
            Self::Kind(kind) => kind.fmt(f),
        }
    }
}

impl FromStr for ServiceDomain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == TESTER_DOMAIN {
            return Ok(Self::Tester);
        }
        s.parse().map(Self::Kind)
    }
}

impl Serialize for ServiceDomain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ServiceDomain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single invocation: which service, which targets, which parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCall {
    pub domain: ServiceDomain,
    pub service: String,
    /// Raw target identifiers, resolved one by one at dispatch time.
    pub targets: Vec<String>,
    /// Service parameters, without the `entity_id` field.
    pub data: Value,
}

impl ServiceCall {
    pub fn new<I, T>(domain: ServiceDomain, service: impl Into<String>, targets: I, data: Value) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            domain,
            service: service.into(),
            targets: targets.into_iter().map(Into::into).collect(),
            data,
        }
    }

    /// Split host-style service data into targets and parameters.
    ///
    /// `entity_id` may be a single id, a comma-separated string or a list.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingTargets`] when `entity_id` is absent
    /// or names nothing, and [`ValidationError::InvalidPayload`] when it is
    /// neither a string nor a list of strings.
    pub fn from_service_data(
        domain: ServiceDomain,
        service: impl Into<String>,
        service_data: Value,
    ) -> Result<Self, MockHubError> {
        let service = service.into();
        let mut data = match service_data {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(ValidationError::InvalidPayload {
                    service,
                    source: serde::de::Error::custom(format!("expected an object, got {other}")),
                }
                .into());
            }
        };
        let raw = data.remove("entity_id").ok_or(ValidationError::MissingTargets)?;
        let targets = entity_id_list(raw).map_err(|source| ValidationError::InvalidPayload {
            service: service.clone(),
            source,
        })?;
        if targets.is_empty() {
            return Err(ValidationError::MissingTargets.into());
        }
        Ok(Self {
            domain,
            service,
            targets,
            data: Value::Object(data),
        })
    }

    /// `domain.service`, as shown in logs and error messages.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.domain, self.service)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntityIdList {
    Csv(String),
    List(Vec<String>),
}

fn entity_id_list(raw: Value) -> Result<Vec<String>, serde_json::Error> {
    let ids = match serde_json::from_value(raw)? {
        EntityIdList::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        EntityIdList::List(list) => list,
    };
    Ok(ids
        .into_iter()
        .map(|id| id.trim().to_lowercase())
        .filter(|id| !id.is_empty())
        .collect())
}

/// Interpret a JSON boolean or a truthy/falsy word as a `bool`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidBoolean`] for anything else.
pub fn coerce_bool(value: &Value) -> Result<bool, ValidationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
            "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
            _ => Err(ValidationError::InvalidBoolean(s.clone())),
        },
        Value::Number(n) if n.as_u64() == Some(1) => Ok(true),
        Value::Number(n) if n.as_u64() == Some(0) => Ok(false),
        other => Err(ValidationError::InvalidBoolean(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_parse_tester_domain() {
        assert_eq!("tester".parse::<ServiceDomain>().unwrap(), ServiceDomain::Tester);
    }

    #[test]
    fn should_parse_kind_domain() {
        assert_eq!(
            "binary_sensor".parse::<ServiceDomain>().unwrap(),
            ServiceDomain::Kind(DeviceKind::BinarySensor)
        );
    }

    #[test]
    fn should_accept_every_kind_in_tester_domain() {
        assert!(DeviceKind::ALL.into_iter().all(|k| ServiceDomain::Tester.accepts(k)));
    }

    #[test]
    fn should_accept_only_own_kind_in_kind_domain() {
        let domain = ServiceDomain::Kind(DeviceKind::Fan);
        assert!(domain.accepts(DeviceKind::Fan));
        assert!(!domain.accepts(DeviceKind::Light));
    }

    #[test]
    fn should_split_comma_separated_entity_ids() {
        let call = ServiceCall::from_service_data(
            ServiceDomain::Tester,
            SET_AVAILABLE,
            json!({"entity_id": "light.a, Switch.B", "value": false}),
        )
        .unwrap();
        assert_eq!(call.targets, vec!["light.a", "switch.b"]);
        assert_eq!(call.data, json!({"value": false}));
    }

    #[test]
    fn should_accept_entity_id_list() {
        let call = ServiceCall::from_service_data(
            DeviceKind::Switch.into(),
            TURN_ON,
            json!({"entity_id": ["switch.a", "switch.b"]}),
        )
        .unwrap();
        assert_eq!(call.targets.len(), 2);
    }

    #[test]
    fn should_reject_call_without_targets() {
        let result = ServiceCall::from_service_data(DeviceKind::Lock.into(), LOCK, json!({}));
        assert!(matches!(
            result,
            Err(MockHubError::Validation(ValidationError::MissingTargets))
        ));
    }

    #[test]
    fn should_reject_non_object_service_data() {
        let result = ServiceCall::from_service_data(DeviceKind::Lock.into(), LOCK, json!(3));
        assert!(matches!(
            result,
            Err(MockHubError::Validation(ValidationError::InvalidPayload { .. }))
        ));
    }

    #[test]
    fn should_format_qualified_name() {
        let call = ServiceCall::new(DeviceKind::Fan.into(), OSCILLATE, ["fan.a"], json!({}));
        assert_eq!(call.qualified_name(), "fan.oscillate");
    }

    #[test]
    fn should_coerce_truthy_and_falsy_words() {
        assert!(coerce_bool(&json!("Yes")).unwrap());
        assert!(coerce_bool(&json!("on")).unwrap());
        assert!(!coerce_bool(&json!("0")).unwrap());
        assert!(!coerce_bool(&json!(false)).unwrap());
    }

    #[test]
    fn should_reject_non_boolean_words() {
        assert!(matches!(
            coerce_bool(&json!("maybe")),
            Err(ValidationError::InvalidBoolean(_))
        ));
        assert!(coerce_bool(&json!(null)).is_err());
    }
}
