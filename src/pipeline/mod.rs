/*!
 * Event pipeline.
 *
 * - `step`: the step contract and parameter injection
 * - `context`: batch items and cancellation
 * - `core`: the pipeline driving one document through its steps
 * - `driver`: batch processing with per-document outcomes
 * - `steps`: built-in steps
 */

pub mod context;
pub mod core;
pub mod driver;
pub mod step;
pub mod steps;

pub use self::context::{BatchItemContext, CancellationToken};
pub use self::core::{Pipeline, PipelineRun, PipelineState};
pub use driver::{BatchReport, DocumentOutcome, DocumentStatus, PipelineDriver, ProgressCallback};
pub use step::{ParameterKind, ParameterValue, PipelineParameters, Step, StepCapabilities};
pub use steps::{
    EventLog, EventLogStep, EventSequenceValidator, FilterWriterStep, PseudoTranslateStep,
    RawDocumentToEventsStep, TargetSegmentSyncStep,
};
