//! Flow engine: binds an input schema, an output schema, a prompt template
//! and model options into one named, single-shot AI invocation.
//!
//! Invocation: credential check → validate input → render → model call →
//! validate output → typed record. Every step short-circuits; there are no
//! retries and no partial results.

pub mod registry;
pub mod schema;
pub mod template;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::flow::schema::{validate, Schema, ValidationError};
use crate::flow::template::{Template, TemplateError};
use crate::llm_client::{ModelBackend, ModelError, ModelOptions, ModelRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStage {
    Input,
    Output,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStage::Input => f.write_str("input"),
            ValidationStage::Output => f.write_str("output"),
        }
    }
}

/// Why a flow invocation failed. Always returned as a value.
#[derive(Debug, Error)]
pub enum InvocationFailure {
    #[error("{flow}: backend credential is not configured")]
    MissingCredential { flow: String },

    #[error("{flow}: {stage} validation failed ({} errors)", .errors.len())]
    ValidationFailed {
        flow: String,
        stage: ValidationStage,
        errors: Vec<ValidationError>,
    },

    #[error("{flow}: model unavailable: {reason}")]
    ModelUnavailable { flow: String, reason: String },

    #[error("{flow}: model refused: {reason}")]
    ModelRefused { flow: String, reason: String },

    #[error("{flow}: model call timed out")]
    Timeout { flow: String },
}

impl InvocationFailure {
    pub fn flow(&self) -> &str {
        match self {
            InvocationFailure::MissingCredential { flow }
            | InvocationFailure::ValidationFailed { flow, .. }
            | InvocationFailure::ModelUnavailable { flow, .. }
            | InvocationFailure::ModelRefused { flow, .. }
            | InvocationFailure::Timeout { flow } => flow,
        }
    }

    /// Short, non-technical message safe to show an end user.
    pub fn user_message(&self) -> String {
        match self {
            InvocationFailure::MissingCredential { .. } => {
                "AI features are not configured. Please contact support.".to_string()
            }
            InvocationFailure::ValidationFailed {
                stage: ValidationStage::Input,
                errors,
                ..
            } => format!(
                "Please check your input: {}",
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
            InvocationFailure::Timeout { .. } => {
                "The request took too long. Please try again.".to_string()
            }
            _ => "Something went wrong while generating a response. Please try again.".to_string(),
        }
    }

    fn from_model_error(flow: &str, err: ModelError) -> Self {
        let flow = flow.to_string();
        match err {
            ModelError::Unavailable(reason) => InvocationFailure::ModelUnavailable { flow, reason },
            ModelError::Refused(reason) => InvocationFailure::ModelRefused { flow, reason },
            ModelError::Timeout(_) => InvocationFailure::Timeout { flow },
        }
    }
}

/// Invocation progress, used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Validating,
    Rendering,
    Invoking,
    ValidatingOutput,
}

/// Declarative description of a flow.
#[derive(Debug, Clone)]
pub struct FlowSpec {
    pub name: &'static str,
    pub input_schema: Schema,
    pub output_schema: Schema,
    pub template: String,
    pub model_options: ModelOptions,
    /// When false the flow skips the credential precondition.
    pub requires_credential: bool,
}

/// A compiled flow with typed input `I` and output `O`.
pub struct Flow<I, O> {
    name: &'static str,
    input_schema: Schema,
    output_schema: Schema,
    response_schema: Value,
    template: Template,
    options: ModelOptions,
    requires_credential: bool,
    backend: Arc<dyn ModelBackend>,
    _records: PhantomData<fn(I) -> O>,
}

impl<I, O> Flow<I, O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    /// Compiles the template against the input schema. Fails on unknown
    /// placeholders so a broken flow is never registered.
    pub fn new(spec: FlowSpec, backend: Arc<dyn ModelBackend>) -> Result<Self, TemplateError> {
        let template = Template::compile(&spec.template, &spec.input_schema)?;
        Ok(Self {
            name: spec.name,
            response_schema: spec.output_schema.to_response_schema(),
            input_schema: spec.input_schema,
            output_schema: spec.output_schema,
            template,
            options: spec.model_options,
            requires_credential: spec.requires_credential,
            backend,
            _records: PhantomData,
        })
    }

    /// Typed entry point.
    pub async fn run(&self, input: &I) -> Result<O, InvocationFailure> {
        let value = serde_json::to_value(input).map_err(|e| InvocationFailure::ValidationFailed {
            flow: self.name.to_string(),
            stage: ValidationStage::Input,
            errors: vec![ValidationError {
                path: String::new(),
                expected: "serializable record".to_string(),
                actual: e.to_string(),
            }],
        })?;
        self.invoke(value).await
    }

    /// Untyped entry point: accepts any JSON value from the caller.
    pub async fn invoke(&self, input: Value) -> Result<O, InvocationFailure> {
        let output = self.execute(input).await?;
        serde_json::from_value(output).map_err(|e| {
            error!(flow = self.name, "Validated output does not fit the typed record: {e}");
            InvocationFailure::ValidationFailed {
                flow: self.name.to_string(),
                stage: ValidationStage::Output,
                errors: vec![ValidationError {
                    path: String::new(),
                    expected: "typed output record".to_string(),
                    actual: e.to_string(),
                }],
            }
        })
    }

    /// Steps 1–5; returns the validated output value.
    async fn execute(&self, input: Value) -> Result<Value, InvocationFailure> {
        let span = info_span!("flow", flow = self.name, invocation_id = %Uuid::new_v4());
        async move {
            if self.requires_credential && !self.backend.has_credential() {
                warn!("Flow invoked without a configured backend credential");
                return Err(InvocationFailure::MissingCredential {
                    flow: self.name.to_string(),
                });
            }

            debug!(stage = ?FlowStage::Validating);
            let input = validate(&self.input_schema, &input).map_err(|errors| {
                debug!(count = errors.len(), "Input rejected");
                InvocationFailure::ValidationFailed {
                    flow: self.name.to_string(),
                    stage: ValidationStage::Input,
                    errors,
                }
            })?;

            debug!(stage = ?FlowStage::Rendering);
            let prompt = self.template.render(&input);

            debug!(stage = ?FlowStage::Invoking, media = prompt.media_count());
            let raw = self
                .backend
                .generate(ModelRequest {
                    flow: self.name,
                    prompt: &prompt,
                    response_schema: &self.response_schema,
                    options: &self.options,
                })
                .await
                .map_err(|e| {
                    warn!("Model call failed: {e}");
                    InvocationFailure::from_model_error(self.name, e)
                })?;

            debug!(stage = ?FlowStage::ValidatingOutput);
            let output = validate(&self.output_schema, &raw).map_err(|errors| {
                let paths: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                error!(errors = ?paths, "Model output failed validation");
                InvocationFailure::ValidationFailed {
                    flow: self.name.to_string(),
                    stage: ValidationStage::Output,
                    errors,
                }
            })?;

            info!("Flow succeeded");
            Ok(output)
        }
        .instrument(span)
        .await
    }
}

/// Type-erased flow, so the registry and HTTP layer can dispatch by name.
#[async_trait]
pub trait AdvisorFlow: Send + Sync {
    fn name(&self) -> &'static str;

    fn requires_credential(&self) -> bool;

    async fn invoke_json(&self, input: Value) -> Result<Value, InvocationFailure>;
}

#[async_trait]
impl<I, O> AdvisorFlow for Flow<I, O>
where
    I: Serialize + Send + Sync,
    O: Serialize + DeserializeOwned + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn requires_credential(&self) -> bool {
        self.requires_credential
    }

    async fn invoke_json(&self, input: Value) -> Result<Value, InvocationFailure> {
        let output: O = self.invoke(input).await?;
        serde_json::to_value(output).map_err(|e| InvocationFailure::ValidationFailed {
            flow: self.name.to_string(),
            stage: ValidationStage::Output,
            errors: vec![ValidationError {
                path: String::new(),
                expected: "serializable record".to_string(),
                actual: e.to_string(),
            }],
        })
    }
}
