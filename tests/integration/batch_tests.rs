/*!
 * Tests for batch processing, failures and cancellation
 */

use std::sync::Arc;

use parking_lot::Mutex;

use locflow::errors::PipelineError;
use locflow::event::{Event, EventType};
use locflow::filter::{FilterRegistry, OutputTarget, PlainTextFilter, SharedBuffer};
use locflow::pipeline::{
    BatchItemContext, CancellationToken, FilterWriterStep, Pipeline, PipelineDriver,
    RawDocumentToEventsStep, Step,
};
use locflow::resource::RawDocument;
use crate::common;

/// Triggers the batch token when it sees a given text unit
struct CancelOnUnit {
    token: CancellationToken,
    unit_id: String,
}

impl Step for CancelOnUnit {
    fn name(&self) -> &str {
        "cancel-on-unit"
    }

    fn handle_event(&mut self, event: Event) -> Result<Event, PipelineError> {
        if let Event::TextUnit(tu) = &event {
            if tu.id == self.unit_id {
                self.token.cancel();
            }
        }
        Ok(event)
    }
}

fn writer_pipeline() -> Pipeline {
    let registry = Arc::new(FilterRegistry::with_defaults());
    Pipeline::new()
        .with_step(RawDocumentToEventsStep::new(Arc::clone(&registry), PlainTextFilter::CONFIG_ID))
        .with_step(FilterWriterStep::new(registry))
}

fn queue(driver: &mut PipelineDriver, document: RawDocument) -> SharedBuffer {
    let (target, buffer) = OutputTarget::buffer();
    driver.add_item(BatchItemContext::new(document).with_output(target));
    buffer
}

/// A failing document is reported and the rest of the batch still runs
#[test]
fn test_processBatch_missingFile_shouldFailOnlyThatDocument() {
    common::init_logger();
    let dir = common::create_temp_dir().unwrap();
    let first = common::create_test_file(dir.path(), "a.txt", b"first\n").unwrap();
    let missing = dir.path().join("missing.txt");
    let last = common::create_test_file(dir.path(), "c.txt", b"last\n").unwrap();

    let progress = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&progress);
    let mut driver = PipelineDriver::new(writer_pipeline()).with_progress(Box::new(
        move |done: usize, total: usize, _name: &str| seen.lock().push((done, total)),
    ));

    let first_out = queue(&mut driver, RawDocument::from_path(&first, common::en()));
    queue(&mut driver, RawDocument::from_path(&missing, common::en()));
    let last_out = queue(&mut driver, RawDocument::from_path(&last, common::en()));
    assert_eq!(driver.pending(), 3);

    let report = driver.process_batch();

    assert_eq!(driver.pending(), 0);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.canceled);
    assert!(!report.is_success());

    let failures: Vec<(&str, &PipelineError)> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].0.ends_with("missing.txt"));
    assert!(matches!(failures[0].1, PipelineError::Filter(_)));

    assert_eq!(*first_out.lock(), b"first\n");
    assert_eq!(*last_out.lock(), b"last\n");
    assert_eq!(*progress.lock(), vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn test_processBatch_canceledBeforeStart_shouldProcessNothing() {
    let mut driver = PipelineDriver::new(writer_pipeline());
    let buffer = queue(&mut driver, RawDocument::from_text("never\n", common::en()));

    driver.cancellation_token().cancel();
    let report = driver.process_batch();

    assert!(report.canceled);
    assert!(report.outcomes.is_empty());
    assert!(buffer.lock().is_empty());
    assert!(report.summary().contains("canceled"));
}

/// Canceling mid-document stops it at the next event and skips the rest
#[test]
fn test_processBatch_canceledMidDocument_shouldStopBatch() {
    let registry = Arc::new(FilterRegistry::with_defaults());
    let pipeline = Pipeline::new()
        .with_step(RawDocumentToEventsStep::new(Arc::clone(&registry), PlainTextFilter::CONFIG_ID));
    let token = pipeline.cancellation_token();
    let pipeline = pipeline
        .with_step(CancelOnUnit {
            token,
            unit_id: "tu1".to_string(),
        })
        .with_step(FilterWriterStep::new(registry));

    let mut driver = PipelineDriver::new(pipeline);
    let interrupted = queue(&mut driver, RawDocument::from_text("one\ntwo\n", common::en()));
    let skipped = queue(&mut driver, RawDocument::from_text("three\n", common::en()));

    let report = driver.process_batch();

    assert!(report.canceled);
    assert_eq!(report.outcomes.len(), 1);
    assert!(matches!(report.outcomes[0].error(), Some(PipelineError::Canceled)));
    assert!(interrupted.lock().is_empty());
    assert!(skipped.lock().is_empty());
}

#[test]
fn test_processBatch_allSucceed_shouldCountEvents() {
    let mut driver = PipelineDriver::new(writer_pipeline());
    queue(&mut driver, RawDocument::from_text("a\n\nb\n", common::en()));
    queue(&mut driver, RawDocument::from_text("c", common::en()));

    let report = driver.process_batch();

    assert!(report.is_success());
    let units: Vec<usize> = report
        .outcomes
        .iter()
        .map(|o| match &o.status {
            locflow::pipeline::DocumentStatus::Succeeded(run) => run.count(EventType::TextUnit),
            locflow::pipeline::DocumentStatus::Failed(e) => panic!("unexpected failure: {}", e),
        })
        .collect();
    assert_eq!(units, vec![2, 1]);
}
