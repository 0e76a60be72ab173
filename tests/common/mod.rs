/*!
 * Common test utilities for the locflow test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use locflow::errors::FilterError;
use locflow::event::Event;
use locflow::filter::{Filter, FilterOptions, FilterWriter, GenericFilterWriter};
use locflow::locale::LocaleId;
use locflow::resource::{Ending, RawDocument, StartDocument, TextUnit};
use locflow::skeleton::{GenericSkeleton, GenericSkeletonWriter, Referent};

/// Route library logs to the test output; safe to call from every test
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

pub fn en() -> LocaleId {
    LocaleId::new("en").unwrap()
}

pub fn fr() -> LocaleId {
    LocaleId::new("fr").unwrap()
}

/// Pull every event out of an opened filter
pub fn drain(filter: &mut dyn Filter) -> Result<Vec<Event>, FilterError> {
    let mut events = Vec::new();
    while filter.has_next() {
        events.push(filter.next()?);
    }
    Ok(events)
}

/// Minimal filter emitting a single text unit, used to check the event
/// contract independently of any real format
pub struct ConformanceFilter {
    queue: Vec<Event>,
    opened: bool,
}

impl ConformanceFilter {
    pub const CONFIG_ID: &'static str = "conformance";

    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            opened: false,
        }
    }
}

impl Filter for ConformanceFilter {
    fn name(&self) -> &str {
        Self::CONFIG_ID
    }

    fn display_name(&self) -> &str {
        "Conformance Filter"
    }

    fn mime_type(&self) -> &str {
        "text/plain"
    }

    fn set_options(&mut self, _options: FilterOptions) {}

    fn open(&mut self, input: &RawDocument) -> Result<(), FilterError> {
        let text = input.read_text()?.text;
        let mut skeleton = GenericSkeleton::new();
        skeleton.add_content_placeholder(Referent::Owner, None);
        let tu = TextUnit::new("tu1", &text).with_skeleton(skeleton);

        // Stored in reverse so `pop` yields document order
        self.queue = vec![
            Event::Finished,
            Event::EndDocument(Ending::new("sd1")),
            Event::text_unit(tu),
            Event::StartDocument(Box::new(StartDocument::new(
                "sd1",
                input.source_locale.clone(),
                Self::CONFIG_ID,
                "text/plain",
            ))),
            Event::Start,
        ];
        self.opened = true;
        Ok(())
    }

    fn has_next(&self) -> bool {
        self.opened && !self.queue.is_empty()
    }

    fn next(&mut self) -> Result<Event, FilterError> {
        if !self.opened {
            return Err(FilterError::NotOpen(Self::CONFIG_ID.to_string()));
        }
        self.queue
            .pop()
            .ok_or_else(|| FilterError::NoMoreEvents(Self::CONFIG_ID.to_string()))
    }

    fn cancel(&mut self) {
        if self.opened {
            self.queue = vec![Event::Canceled];
        }
    }

    fn close(&mut self) {
        self.queue.clear();
        self.opened = false;
    }

    fn create_filter_writer(&self) -> Box<dyn FilterWriter> {
        Box::new(GenericFilterWriter::new(Box::new(GenericSkeletonWriter::default())))
    }
}
