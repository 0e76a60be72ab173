/*!
 * Built-in steps.
 */

pub mod event_log;
pub mod filter_writer;
pub mod pseudo;
pub mod raw_document;
pub mod segment_sync;
pub mod sequence_validator;

pub use event_log::{EventLog, EventLogStep};
pub use filter_writer::FilterWriterStep;
pub use pseudo::{PSEUDO_ORIGIN, PseudoTranslateStep};
pub use raw_document::RawDocumentToEventsStep;
pub use segment_sync::TargetSegmentSyncStep;
pub use sequence_validator::EventSequenceValidator;
