/*!
 * # locflow - localization extraction and merge engine
 *
 * Extracts translatable text from documents as a stream of events, lets
 * steps transform it, and writes the documents back unchanged outside the
 * translated spans.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `resource`: the content model:
 *   - `resource::fragment`: coded text, inline codes as markers plus a code table
 *   - `resource::container`: source or target content and its segments
 *   - `resource::text_unit`: translatable units with their targets
 *   - `resource::parts`: document, group and document part resources
 * - `skeleton`: the non-translatable remainder of a document and the writer
 *   that rebuilds documents from it
 * - `encoder`: output escaping per format and charset
 * - `event`: the events filters emit and steps consume
 * - `filter`: format readers, their registry and writers
 * - `pipeline`: steps, the pipeline and the batch driver
 * - `app_config`: Configuration management
 * - `file_utils`: File system and encoding operations
 * - `locale`: locale identifiers and ISO language code utilities
 * - `errors`: Custom error types for the library
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod encoder;
pub mod errors;
pub mod event;
pub mod file_utils;
pub mod filter;
pub mod locale;
pub mod pipeline;
pub mod resource;
pub mod skeleton;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{
    ContainerError, EngineError, EventError, FilterError, FragmentError, LocaleError, PipelineError,
    WriterError,
};
pub use event::{Event, EventType};
pub use filter::{Filter, FilterRegistry, OutputTarget, PlainTextFilter};
pub use locale::{LocaleId, get_language_name, language_codes_match};
pub use pipeline::{BatchItemContext, BatchReport, Pipeline, PipelineDriver, Step};
pub use resource::{Code, TagType, TextContainer, TextFragment, TextUnit};
pub use skeleton::{GenericSkeleton, GenericSkeletonWriter, SkeletonWriter};
