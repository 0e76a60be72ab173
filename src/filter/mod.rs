/*!
 * Filters: format readers that turn a raw document into events, and the
 * writers that turn events back into a document.
 *
 * - `registry`: configuration id to filter factory
 * - `writer`: the filter writer contract and the generic filter writer
 * - `plaintext`: line-based plain-text filter
 */

pub mod plaintext;
pub mod registry;
pub mod writer;

use crate::errors::FilterError;
use crate::event::Event;
use crate::locale::LocaleId;
use crate::resource::RawDocument;

pub use plaintext::{PlainTextFilter, PlainTextParameters};
pub use registry::{FilterFactory, FilterRegistry};
pub use writer::{FilterWriter, GenericFilterWriter, OutputTarget, SharedBuffer};

/// Options a filter is opened with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    /// Source locale of the documents
    pub source_locale: LocaleId,
    /// Target locale, when known
    pub target_locale: Option<LocaleId>,
    /// Encoding for input without a byte order mark
    pub default_encoding: String,
    /// Whether to build skeletons; without them the document cannot be rewritten
    pub generate_skeleton: bool,
}

impl FilterOptions {
    pub fn new(source_locale: LocaleId) -> Self {
        Self {
            source_locale,
            target_locale: None,
            default_encoding: "UTF-8".to_string(),
            generate_skeleton: true,
        }
    }
}

/// Pull-based reader of one document at a time.
///
/// After `open`, `next` yields `START`, `START_DOCUMENT`, the content
/// events, `END_DOCUMENT` and `FINISHED`, then `has_next` is false and
/// further calls to `next` fail with [`FilterError::NoMoreEvents`].
pub trait Filter: Send {
    /// Configuration id
    fn name(&self) -> &str;

    /// Human-readable name
    fn display_name(&self) -> &str;

    /// MIME type of the format
    fn mime_type(&self) -> &str;

    fn set_options(&mut self, options: FilterOptions);

    /// Start reading a document
    fn open(&mut self, input: &RawDocument) -> Result<(), FilterError>;

    /// Whether `next` has an event to return
    fn has_next(&self) -> bool;

    /// Next event of the document
    fn next(&mut self) -> Result<Event, FilterError>;

    /// Stop reading; the next event is `CANCELED`
    fn cancel(&mut self);

    /// Release the document
    fn close(&mut self);

    /// Writer able to rebuild documents read by this filter
    fn create_filter_writer(&self) -> Box<dyn FilterWriter>;
}
