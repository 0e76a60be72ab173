/*!
 * The step contract.
 *
 * A step receives each event, may change its payload and passes it on. It
 * must return an event of the same type unless it declares that it
 * generates events. Everything beyond `name` and `handle_event` has a
 * default.
 */

use std::collections::HashMap;

use crate::errors::PipelineError;
use crate::event::Event;
use crate::filter::OutputTarget;
use crate::locale::LocaleId;

/// What a step can do beyond handling events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCapabilities {
    /// Produces events of its own (a filter acting as first step)
    pub generates_events: bool,
    /// Requires an output target
    pub needs_output: bool,
    /// Reacts to `cancel`
    pub supports_cancel: bool,
    /// Consumes the document; usually last in the chain
    pub is_terminal: bool,
}

/// Values the pipeline can inject into steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterKind {
    SourceLocale,
    TargetLocale,
    InputEncoding,
    OutputEncoding,
    OutputUri,
    FilterConfigId,
}

/// An injected value
#[derive(Debug, Clone)]
pub enum ParameterValue {
    Locale(LocaleId),
    Text(String),
    Output(OutputTarget),
}

impl ParameterValue {
    pub fn as_locale(&self) -> Option<&LocaleId> {
        match self {
            Self::Locale(locale) => Some(locale),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Parameter values for one batch item
#[derive(Debug, Clone, Default)]
pub struct PipelineParameters(HashMap<ParameterKind, ParameterValue>);

impl PipelineParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, kind: ParameterKind, value: ParameterValue) {
        self.0.insert(kind, value);
    }

    pub fn get(&self, kind: ParameterKind) -> Option<&ParameterValue> {
        self.0.get(&kind)
    }

    pub fn with(mut self, kind: ParameterKind, value: ParameterValue) -> Self {
        self.set(kind, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One stage of a pipeline
pub trait Step: Send {
    fn name(&self) -> &str;

    /// Handle one event and return the event to pass on
    fn handle_event(&mut self, event: Event) -> Result<Event, PipelineError>;

    /// Whether the step has no more events of its own to produce
    fn is_done(&self) -> bool {
        true
    }

    fn capabilities(&self) -> StepCapabilities {
        StepCapabilities::default()
    }

    /// Parameters the pipeline should inject before each document
    fn declared_parameters(&self) -> &[ParameterKind] {
        &[]
    }

    fn set_parameter(&mut self, _kind: ParameterKind, _value: &ParameterValue) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Request cancellation; effective at the next event
    fn cancel(&mut self) {}

    /// Release per-document resources; called on every exit path
    fn finish(&mut self) {}
}

/// Read a locale parameter or fail with a contract violation
pub(crate) fn expect_locale(step: &str, value: &ParameterValue) -> Result<LocaleId, PipelineError> {
    value
        .as_locale()
        .cloned()
        .ok_or_else(|| PipelineError::contract(step, "expected a locale parameter"))
}

/// Read a text parameter or fail with a contract violation
pub(crate) fn expect_text(step: &str, value: &ParameterValue) -> Result<String, PipelineError> {
    value
        .as_text()
        .map(str::to_string)
        .ok_or_else(|| PipelineError::contract(step, "expected a text parameter"))
}
