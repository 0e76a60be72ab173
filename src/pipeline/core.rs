/*!
 * Pipeline: drives a chain of steps over one document.
 *
 * The first step receives the raw document, then `NO_OP` events until it
 * reports it is done; a filter acting as the first step turns each `NO_OP`
 * into its next event. Every event goes through the whole chain before the
 * next one is requested. Cancellation is checked between events.
 */

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::errors::PipelineError;
use crate::event::{Event, EventType};
use crate::pipeline::context::{BatchItemContext, CancellationToken};
use crate::pipeline::step::{PipelineParameters, Step};

/// Current state of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Processing,
    Canceled,
}

/// Result of processing one document
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Document name
    pub document: String,
    /// Events that left the last step, by type
    pub event_counts: BTreeMap<EventType, usize>,
    /// Processing time
    pub duration: Duration,
}

impl PipelineRun {
    /// Number of events of one type
    pub fn count(&self, event_type: EventType) -> usize {
        self.event_counts.get(&event_type).copied().unwrap_or(0)
    }

    /// Get a summary of the run
    pub fn summary(&self) -> String {
        format!(
            "{}: {} text units, {} document parts, {} groups in {:.2}s",
            self.document,
            self.count(EventType::TextUnit),
            self.count(EventType::DocumentPart),
            self.count(EventType::StartGroup),
            self.duration.as_secs_f32()
        )
    }
}

/// Ordered chain of steps
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
    state: PipelineState,
    token: CancellationToken,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            state: PipelineState::Idle,
            token: CancellationToken::new(),
        }
    }

    /// Append a step
    pub fn with_step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Append a boxed step
    pub fn add_step(&mut self, step: Box<dyn Step>) {
        self.steps.push(step);
    }

    /// Step names in order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Token that cancels this pipeline when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Request cancellation; the running document stops at the next event
    pub fn cancel(&mut self) {
        self.token.cancel();
        for step in &mut self.steps {
            if step.capabilities().supports_cancel {
                step.cancel();
            }
        }
    }

    /// Process one document
    pub fn process(&mut self, item: BatchItemContext) -> Result<PipelineRun, PipelineError> {
        if self.steps.is_empty() {
            return Err(PipelineError::step("pipeline", "no steps to run"));
        }

        let start = Instant::now();
        let document = item.display_name();
        self.state = PipelineState::Processing;
        debug!("Processing '{}' through {:?}", document, self.step_names());

        let result = self.run(item);

        for step in &mut self.steps {
            step.finish();
        }

        self.state = match &result {
            Err(e) if e.is_canceled() => PipelineState::Canceled,
            _ => PipelineState::Idle,
        };

        result.map(|event_counts| PipelineRun {
            document,
            event_counts,
            duration: start.elapsed(),
        })
    }

    fn inject(&mut self, parameters: &PipelineParameters) -> Result<(), PipelineError> {
        for step in &mut self.steps {
            let kinds = step.declared_parameters().to_vec();
            for kind in kinds {
                match parameters.get(kind) {
                    Some(value) => step.set_parameter(kind, value)?,
                    None => debug!("No value for {:?} requested by '{}'", kind, step.name()),
                }
            }
        }
        Ok(())
    }

    fn run(&mut self, item: BatchItemContext) -> Result<BTreeMap<EventType, usize>, PipelineError> {
        self.inject(&item.parameters)?;

        let mut counts = BTreeMap::new();
        let mut event = Event::RawDocument(Box::new(item.document));
        loop {
            if self.token.is_canceled() {
                self.propagate_cancel();
                return Err(PipelineError::Canceled);
            }

            let out = self.feed(event)?;
            if out.event_type() != EventType::NoOp {
                *counts.entry(out.event_type()).or_insert(0) += 1;
            }
            if out.event_type() == EventType::Canceled {
                return Err(PipelineError::Canceled);
            }

            if self.steps[0].is_done() {
                break;
            }
            event = Event::NoOp;
        }
        Ok(counts)
    }

    fn feed(&mut self, mut event: Event) -> Result<Event, PipelineError> {
        for step in &mut self.steps {
            let before = event.event_type();
            event = step.handle_event(event)?;
            let after = event.event_type();
            if before != after && !step.capabilities().generates_events {
                return Err(PipelineError::contract(
                    step.name(),
                    format!("received {} but returned {}", before, after),
                ));
            }
        }
        Ok(event)
    }

    fn propagate_cancel(&mut self) {
        debug!("Pipeline canceled, notifying steps");
        let mut event = Event::Canceled;
        for step in &mut self.steps {
            event = match step.handle_event(event) {
                Ok(next) => next,
                Err(e) => {
                    warn!("Step '{}' failed while canceling: {}", step.name(), e);
                    Event::Canceled
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocaleId;
    use crate::resource::{DocumentPart, RawDocument};
    use crate::skeleton::GenericSkeleton;

    struct Passthrough;

    impl Step for Passthrough {
        fn name(&self) -> &str {
            "passthrough"
        }

        fn handle_event(&mut self, event: Event) -> Result<Event, PipelineError> {
            Ok(event)
        }
    }

    struct Converter;

    impl Step for Converter {
        fn name(&self) -> &str {
            "converter"
        }

        fn handle_event(&mut self, _event: Event) -> Result<Event, PipelineError> {
            Ok(Event::document_part(DocumentPart::new("dp1", GenericSkeleton::new())))
        }
    }

    fn item() -> BatchItemContext {
        BatchItemContext::new(RawDocument::from_text("x", LocaleId::new("en").unwrap()))
    }

    #[test]
    fn test_process_withoutSteps_shouldFail() {
        let mut pipeline = Pipeline::new();
        assert!(pipeline.process(item()).is_err());
    }

    #[test]
    fn test_process_passthrough_shouldSeeRawDocumentOnce() {
        let mut pipeline = Pipeline::new().with_step(Passthrough);
        let run = pipeline.process(item()).unwrap();
        assert_eq!(run.count(EventType::RawDocument), 1);
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[test]
    fn test_process_typeChange_shouldViolateContract() {
        let mut pipeline = Pipeline::new().with_step(Converter);
        let err = pipeline.process(item()).unwrap_err();
        assert!(matches!(err, PipelineError::ContractViolation { ref step, .. } if step == "converter"));
    }

    #[test]
    fn test_process_afterCancel_shouldReportCanceled() {
        let mut pipeline = Pipeline::new().with_step(Passthrough);
        pipeline.cancellation_token().cancel();
        assert!(pipeline.process(item()).unwrap_err().is_canceled());
        assert_eq!(pipeline.state(), PipelineState::Canceled);
    }
}
