//! JSON-lines command session.
//!
//! Each input line is one [`Request`]; each produces exactly one
//! [`Response`] line. Event lines are written by the caller from the bus.

use std::path::PathBuf;

use mockhub_adapter_virtual::VirtualIntegration;
use mockhub_app::ports::EventPublisher;
use mockhub_app::services::platform::{LoadReport, Platform};
use mockhub_app::services::service_registry::DispatchReport;
use mockhub_domain::error::MockHubError;
use mockhub_domain::event::Event;
use mockhub_domain::kind::DeviceKind;
use mockhub_domain::service::{ServiceCall, ServiceDomain};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::{Config, ConfigError};

/// One input line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    CallService {
        domain: String,
        service: String,
        #[serde(default)]
        service_data: Value,
    },
    /// Every entity, or only those of one kind.
    GetStates {
        #[serde(default)]
        domain: Option<DeviceKind>,
    },
    GetState {
        entity_id: String,
    },
    GetServices,
    Reload,
}

/// One output line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Result(Outcome),
    Event { event: Event },
}

#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl ErrorBody {
    fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: "invalid_request",
            message: message.into(),
        }
    }
}

impl From<&MockHubError> for ErrorBody {
    fn from(err: &MockHubError) -> Self {
        let code = match err {
            MockHubError::Configuration(_) => "configuration_error",
            MockHubError::NotFound(_) => "not_found",
            MockHubError::Rejected(_) => "rejected",
            MockHubError::Validation(_) => "invalid",
        };
        Self {
            code,
            message: error_chain(err),
        }
    }
}

impl From<&ConfigError> for ErrorBody {
    fn from(err: &ConfigError) -> Self {
        Self {
            code: "configuration_error",
            message: error_chain(err),
        }
    }
}

/// `outer: inner: innermost`, so wrapped causes reach the caller.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl Response {
    fn ok(result: Value) -> Self {
        Self::Result(Outcome {
            success: true,
            result: Some(result),
            error: None,
        })
    }

    fn err(error: ErrorBody) -> Self {
        Self::Result(Outcome {
            success: false,
            result: None,
            error: Some(error),
        })
    }

    /// Wrap a bus event for output.
    #[must_use]
    pub fn event(event: Event) -> Self {
        Self::Event { event }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Result(outcome) => outcome.success,
            Self::Event { .. } => true,
        }
    }

    /// Render as a single JSON line, without the trailing newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            json!({
                "type": "result",
                "success": false,
                "error": { "code": "internal", "message": err.to_string() },
            })
            .to_string()
        })
    }
}

/// A platform plus the integration feeding it, driven by [`Request`]s.
pub struct Session<P> {
    platform: Platform<P>,
    integration: VirtualIntegration,
    config_path: Option<PathBuf>,
}

impl<P: EventPublisher + Send + Sync> Session<P> {
    /// Load `integration` into a fresh platform.
    pub fn new(publisher: P, mut integration: VirtualIntegration) -> Self {
        let mut platform = Platform::new(publisher);
        log_load(&platform.load(&mut integration));
        Self {
            platform,
            integration,
            config_path: None,
        }
    }

    /// Re-read this file on `reload` instead of reusing the startup records.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn platform(&self) -> &Platform<P> {
        &self.platform
    }

    /// Parse and handle one input line.
    pub async fn handle_line(&mut self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request).await,
            Err(err) => {
                tracing::warn!(error = %err, "malformed request");
                Response::err(ErrorBody::invalid_request(err.to_string()))
            }
        }
    }

    pub async fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::CallService {
                domain,
                service,
                service_data,
            } => self.call_service(&domain, service, service_data).await,
            Request::GetStates { domain: None } => {
                Response::ok(json!(self.platform.entities().list()))
            }
            Request::GetStates { domain: Some(kind) } => {
                Response::ok(json!(self.platform.entities_of(kind)))
            }
            Request::GetState { entity_id } => match self.platform.state(&entity_id) {
                Ok(entity) => Response::ok(json!(entity)),
                Err(err) => Response::err((&err).into()),
            },
            Request::GetServices => Response::ok(json!(self.platform.services().services())),
            Request::Reload => self.reload(),
        }
    }

    async fn call_service(&self, domain: &str, service: String, data: Value) -> Response {
        let domain: ServiceDomain = match domain.parse() {
            Ok(domain) => domain,
            Err(err) => return Response::err((&MockHubError::from(err)).into()),
        };
        let call = match ServiceCall::from_service_data(domain, service, data) {
            Ok(call) => call,
            Err(err) => return Response::err((&err).into()),
        };
        tracing::info!(service = %call.qualified_name(), targets = ?call.targets, "service called");
        match self.platform.call(&call).await {
            Ok(report) => dispatch_response(&report),
            Err(err) => Response::err((&err).into()),
        }
    }

    fn reload(&mut self) -> Response {
        if let Some(path) = &self.config_path {
            match Config::load_from(path) {
                Ok(config) => self.integration.reconfigure(config.virtual_config()),
                Err(err) => {
                    tracing::warn!(error = %err, "reload aborted");
                    return Response::err((&err).into());
                }
            }
        }
        let report = self.platform.load(&mut self.integration);
        log_load(&report);
        Response::ok(load_summary(&report))
    }
}

fn dispatch_response(report: &DispatchReport) -> Response {
    let targets: Vec<Value> = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(entity) => json!({
                "entity_id": outcome.target,
                "success": true,
                "state": entity,
            }),
            Err(err) => json!({
                "entity_id": outcome.target,
                "success": false,
                "error": ErrorBody::from(err),
            }),
        })
        .collect();
    Response::Result(Outcome {
        success: report.is_success(),
        result: Some(Value::Array(targets)),
        error: None,
    })
}

fn load_summary(report: &LoadReport) -> Value {
    let failures: Vec<Value> = report
        .failures
        .iter()
        .map(|failure| {
            json!({
                "index": failure.index,
                "name": failure.name,
                "error": ErrorBody::from(&failure.error),
            })
        })
        .collect();
    json!({
        "integration": report.integration,
        "entities": report.entities,
        "failures": failures,
        "installed": report.installed,
    })
}

fn log_load(report: &LoadReport) {
    for failure in &report.failures {
        tracing::warn!(
            index = ?failure.index,
            name = ?failure.name,
            error = %error_chain(&failure.error),
            "device not created"
        );
    }
}
