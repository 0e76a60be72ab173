/*!
 * Tests for the event sequence filters emit and the pipeline enforces
 */

use std::sync::Arc;

use locflow::errors::{FilterError, PipelineError};
use locflow::event::{Event, EventType};
use locflow::filter::{Filter, FilterOptions, FilterRegistry, FilterWriter, PlainTextFilter};
use locflow::pipeline::{
    BatchItemContext, EventLogStep, EventSequenceValidator, Pipeline, RawDocumentToEventsStep,
};
use locflow::resource::RawDocument;
use crate::common::{self, ConformanceFilter};

/// Filter that loses every event of one type, to break the sequence
struct LossyFilter {
    inner: ConformanceFilter,
    lost: EventType,
}

impl Filter for LossyFilter {
    fn name(&self) -> &str {
        "lossy"
    }

    fn display_name(&self) -> &str {
        "Lossy Filter"
    }

    fn mime_type(&self) -> &str {
        self.inner.mime_type()
    }

    fn set_options(&mut self, options: FilterOptions) {
        self.inner.set_options(options);
    }

    fn open(&mut self, input: &RawDocument) -> Result<(), FilterError> {
        self.inner.open(input)
    }

    fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    fn next(&mut self) -> Result<Event, FilterError> {
        let event = self.inner.next()?;
        if event.event_type() == self.lost && self.inner.has_next() {
            return self.inner.next();
        }
        Ok(event)
    }

    fn cancel(&mut self) {
        self.inner.cancel();
    }

    fn close(&mut self) {
        self.inner.close();
    }

    fn create_filter_writer(&self) -> Box<dyn FilterWriter> {
        self.inner.create_filter_writer()
    }
}

fn registry() -> Arc<FilterRegistry> {
    let mut registry = FilterRegistry::with_defaults();
    registry.register(ConformanceFilter::CONFIG_ID, || Box::new(ConformanceFilter::new()));
    registry.register("lossy", || {
        Box::new(LossyFilter {
            inner: ConformanceFilter::new(),
            lost: EventType::StartDocument,
        })
    });
    Arc::new(registry)
}

fn item(text: &str, config_id: &str) -> BatchItemContext {
    BatchItemContext::new(RawDocument::from_text(text, common::en()).with_filter(config_id))
}

#[test]
fn test_conformanceFilter_drain_shouldEmitMinimalSequence() {
    let mut filter = ConformanceFilter::new();
    filter.set_options(FilterOptions::new(common::en()));
    filter
        .open(&RawDocument::from_text("Just one unit", common::en()))
        .unwrap();

    let events = common::drain(&mut filter).unwrap();
    let types: Vec<EventType> = events.iter().map(Event::event_type).collect();
    assert_eq!(
        types,
        vec![
            EventType::Start,
            EventType::StartDocument,
            EventType::TextUnit,
            EventType::EndDocument,
            EventType::Finished,
        ]
    );
    assert_eq!(events[2].as_text_unit().unwrap().source().to_string(), "Just one unit");
    assert!(matches!(filter.next(), Err(FilterError::NoMoreEvents(_))));
}

#[test]
fn test_pipeline_conformanceFilter_shouldPassValidator() {
    let (log_step, log) = EventLogStep::shared();
    let mut pipeline = Pipeline::new()
        .with_step(RawDocumentToEventsStep::new(registry(), PlainTextFilter::CONFIG_ID))
        .with_step(EventSequenceValidator::new())
        .with_step(log_step);

    let run = pipeline.process(item("text", ConformanceFilter::CONFIG_ID)).unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            EventType::Start,
            EventType::StartDocument,
            EventType::TextUnit,
            EventType::EndDocument,
            EventType::Finished,
        ]
    );
    assert_eq!(run.count(EventType::StartDocument), 1);
    assert_eq!(run.count(EventType::EndDocument), 1);
    assert_eq!(run.count(EventType::TextUnit), 1);
}

/// Exactly one document pair per document, even for the real filter
#[test]
fn test_pipeline_plainText_shouldPairDocumentEvents() {
    let (log_step, log) = EventLogStep::shared();
    let mut pipeline = Pipeline::new()
        .with_step(RawDocumentToEventsStep::new(registry(), PlainTextFilter::CONFIG_ID))
        .with_step(EventSequenceValidator::new())
        .with_step(log_step);

    let run = pipeline
        .process(BatchItemContext::new(RawDocument::from_text(
            "One\n\n<b>Two</b>\nThree\n",
            common::en(),
        )))
        .unwrap();

    let log = log.lock();
    assert_eq!(log.first(), Some(&EventType::Start));
    assert_eq!(log.last(), Some(&EventType::Finished));
    assert_eq!(run.count(EventType::StartDocument), 1);
    assert_eq!(run.count(EventType::EndDocument), 1);
    assert_eq!(run.count(EventType::TextUnit), 3);
    assert_eq!(run.count(EventType::DocumentPart), 1);
}

#[test]
fn test_pipeline_missingStartDocument_shouldBeRejected() {
    common::init_logger();
    let mut pipeline = Pipeline::new()
        .with_step(RawDocumentToEventsStep::new(registry(), PlainTextFilter::CONFIG_ID))
        .with_step(EventSequenceValidator::new());

    let result = pipeline.process(item("text", "lossy"));
    match result {
        Err(PipelineError::ContractViolation { step, message }) => {
            assert_eq!(step, "event-sequence-validator");
            assert!(message.contains("START_DOCUMENT"), "{}", message);
        }
        other => panic!("expected a contract violation, got {:?}", other),
    }

    // The pipeline is reusable after a failed document
    assert!(pipeline.process(item("again", ConformanceFilter::CONFIG_ID)).is_ok());
}

#[test]
fn test_validator_eventsAfterFinished_shouldBeRejected() {
    let mut validator = EventSequenceValidator::new();
    let mut filter = ConformanceFilter::new();
    filter
        .open(&RawDocument::from_text("x", common::en()))
        .unwrap();
    for event in common::drain(&mut filter).unwrap() {
        validator.check(&event).unwrap();
    }
    assert_eq!(validator.events_seen(), 5);
    assert!(validator.check(&Event::Finished).is_err());
}
