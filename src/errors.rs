/*!
 * Error types for the locflow engine.
 *
 * Each component gets its own error enum built with `thiserror`; the
 * umbrella `EngineError` wraps them for the batch driver and the CLI.
 * Contract violations (calling a filter past its end, asking an event for
 * the wrong resource) have dedicated variants so they are never confused
 * with data errors.
 */

use thiserror::Error;

use crate::event::EventType;

/// Errors raised by locale parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocaleError {
    /// The tag is empty or contains characters outside `[A-Za-z0-9_-]`
    #[error("Invalid locale tag: '{0}'")]
    InvalidTag(String),
}

/// Errors raised while building or editing coded text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FragmentError {
    /// A marker refers to a code index that does not exist
    #[error("Marker index {index} is out of range (fragment has {code_count} codes)")]
    InvalidMarkerIndex {
        /// Index decoded from the marker
        index: usize,
        /// Number of codes available
        code_count: usize,
    },

    /// A position is not on a character boundary or falls inside a marker
    #[error("Invalid position {position} in coded text")]
    InvalidPosition {
        /// Byte offset that was rejected
        position: usize,
    },

    /// A range is reversed or past the end of the text
    #[error("Invalid range {start}..{end} in coded text")]
    InvalidRange {
        /// Start offset
        start: usize,
        /// End offset
        end: usize,
    },

    /// The fragment cannot reference any more codes
    #[error("Too many codes in one fragment: {count}")]
    TooManyCodes {
        /// Number of codes requested
        count: usize,
    },

    /// A marker kind character is followed by a non-index character
    #[error("Truncated or corrupt marker at position {position}")]
    CorruptMarker {
        /// Byte offset of the marker kind character
        position: usize,
    },

    /// Code storage string could not be parsed
    #[error("Invalid code storage: {0}")]
    InvalidCodeStorage(String),
}

/// Errors raised by text containers and segmentation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContainerError {
    /// Error from the underlying coded text
    #[error("Fragment error: {0}")]
    Fragment(#[from] FragmentError),

    /// No segment with this id or index
    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    /// A segment id is already used in this container
    #[error("Duplicate segment id: {0}")]
    DuplicateSegmentId(String),

    /// A segmentation range overlaps an existing segment or another range
    #[error("Invalid segmentation range {start}..{end}")]
    InvalidRange {
        /// Start offset
        start: usize,
        /// End offset
        end: usize,
    },

    /// Target segments do not match source segments (strict policy only)
    #[error("Segment mismatch for locale '{locale}': missing {missing:?}")]
    SegmentMismatch {
        /// Target locale that was aligned
        locale: String,
        /// Source segment ids absent from the target
        missing: Vec<String>,
    },
}

/// Errors raised when asking an event for a resource it does not carry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventError {
    /// Typed accessor used on the wrong kind of event
    #[error("Expected a {expected} event, got {actual}")]
    UnexpectedResource {
        /// Event type the caller asked for
        expected: EventType,
        /// Event type actually present
        actual: EventType,
    },
}

/// Errors raised by skeleton and filter writers
#[derive(Error, Debug)]
pub enum WriterError {
    /// A placeholder refers to a resource the writer never received
    #[error("Referent not found: '{0}'")]
    MissingReferent(String),

    /// The requested output encoding is not known
    #[error("Unsupported output encoding: {0}")]
    UnsupportedEncoding(String),

    /// Writing the output failed
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// Event stream or call order does not follow the writer contract
    #[error("Writer contract violation: {0}")]
    ContractViolation(String),

    /// Event payload did not match its type
    #[error("Event error: {0}")]
    Event(#[from] EventError),
}

/// Errors raised by filters
#[derive(Error, Debug)]
pub enum FilterError {
    /// Reading the input failed
    #[error("Input error: {0}")]
    Io(#[from] std::io::Error),

    /// Input bytes could not be decoded
    #[error("Decoding error: {0}")]
    Decode(String),

    /// The input could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// `next()` or `close()` called before `open()`
    #[error("Filter '{0}' is not open")]
    NotOpen(String),

    /// `next()` called after the last event
    #[error("Filter '{0}' has no more events")]
    NoMoreEvents(String),

    /// No filter is registered under this configuration id
    #[error("Unknown filter configuration: '{0}'")]
    UnknownConfiguration(String),

    /// The raw document location is not usable
    #[error("Unsupported input location: {0}")]
    UnsupportedInput(String),
}

/// Errors raised while running a pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error from a filter
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// Error from a writer
    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),

    /// Error from segmentation handling
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Event payload did not match its type
    #[error("Event error: {0}")]
    Event(#[from] EventError),

    /// A step broke the pipeline contract
    #[error("Contract violation in step '{step}': {message}")]
    ContractViolation {
        /// Step name
        step: String,
        /// What went wrong
        message: String,
    },

    /// A step failed for a step-specific reason
    #[error("Step '{step}' failed: {message}")]
    Step {
        /// Step name
        step: String,
        /// What went wrong
        message: String,
    },

    /// The pipeline was canceled
    #[error("Pipeline canceled")]
    Canceled,
}

/// Main engine error type that wraps all other errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a pipeline run
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Error from a filter used outside a pipeline
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// Error from locale handling
    #[error("Locale error: {0}")]
    Locale(#[from] LocaleError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for EngineError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl PipelineError {
    /// Build a contract violation for a named step
    pub fn contract(step: &str, message: impl Into<String>) -> Self {
        Self::ContractViolation {
            step: step.to_string(),
            message: message.into(),
        }
    }

    /// Build a step failure for a named step
    pub fn step(step: &str, message: impl Into<String>) -> Self {
        Self::Step {
            step: step.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error is a cancellation rather than a failure
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}
