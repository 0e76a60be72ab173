/*!
 * Plain-text filter.
 *
 * Each non-blank line is a text unit; blank lines are document parts.
 * Line breaks, and surrounding whitespace when trimming is on, stay in the
 * skeleton so writing the events back reproduces the input. Inline tags
 * such as `<b>`, `</b>` and `<br/>` can be extracted as codes.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::FilterError;
use crate::event::Event;
use crate::filter::{Filter, FilterOptions, FilterWriter, GenericFilterWriter};
use crate::resource::code::TagType;
use crate::resource::fragment::TextFragment;
use crate::resource::{DocumentPart, Ending, RawDocument, StartDocument, TextContainer, TextUnit};
use crate::skeleton::{GenericSkeleton, GenericSkeletonWriter, Referent, WriterOptions};

static INLINE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?([A-Za-z][\w:.-]*)[^<>]*?/?>").expect("valid inline tag regex"));

const DOCUMENT_ID: &str = "sd1";

/// Plain-text filter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainTextParameters {
    /// Turn inline tags into codes
    pub extract_inline_codes: bool,
    /// Keep leading and trailing whitespace out of text units
    pub trim_whitespace: bool,
    /// Options for the writer this filter creates
    pub writer: WriterOptions,
}

impl Default for PlainTextParameters {
    fn default() -> Self {
        Self {
            extract_inline_codes: true,
            trim_whitespace: true,
            writer: WriterOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Start,
    StartDocument,
    Lines,
    Finished,
    Canceled,
    Done,
}

struct Line {
    text: String,
    line_break: String,
}

/// Line-based filter for plain text
pub struct PlainTextFilter {
    parameters: PlainTextParameters,
    options: Option<FilterOptions>,
    state: State,
    lines: Vec<Line>,
    position: usize,
    document: Option<StartDocument>,
    next_unit: usize,
    next_part: usize,
}

impl Default for PlainTextFilter {
    fn default() -> Self {
        Self::with_parameters(PlainTextParameters::default())
    }
}

impl PlainTextFilter {
    pub const CONFIG_ID: &'static str = "plaintext";
    pub const MIME_TYPE: &'static str = "text/plain";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: PlainTextParameters) -> Self {
        Self {
            parameters,
            options: None,
            state: State::Closed,
            lines: Vec::new(),
            position: 0,
            document: None,
            next_unit: 0,
            next_part: 0,
        }
    }

    fn generate_skeleton(&self) -> bool {
        self.options.as_ref().is_none_or(|o| o.generate_skeleton)
    }

    fn split_lines(text: &str) -> Vec<Line> {
        text.split_inclusive('\n')
            .map(|raw| {
                let (body, line_break) = if let Some(body) = raw.strip_suffix("\r\n") {
                    (body, "\r\n")
                } else if let Some(body) = raw.strip_suffix('\n') {
                    (body, "\n")
                } else {
                    (raw, "")
                };
                Line {
                    text: body.to_string(),
                    line_break: line_break.to_string(),
                }
            })
            .collect()
    }

    fn build_fragment(&self, text: &str) -> Result<TextFragment, FilterError> {
        let mut fragment = TextFragment::new();
        if !self.parameters.extract_inline_codes {
            fragment.append_text(text);
            return Ok(fragment);
        }

        let mut last = 0;
        for caps in INLINE_TAG.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let label = caps.get(1).map_or("", |m| m.as_str());
            let tag = whole.as_str();
            let tag_type = if tag.starts_with("</") {
                TagType::Closing
            } else if tag.ends_with("/>") {
                TagType::Isolated
            } else {
                TagType::Opening
            };

            fragment.append_text(&text[last..whole.start()]);
            fragment
                .append_tag(tag_type, label, tag)
                .map_err(|e| FilterError::Parse(e.to_string()))?;
            last = whole.end();
        }
        fragment.append_text(&text[last..]);
        fragment.balance_markers();
        Ok(fragment)
    }

    fn line_event(&mut self, line: &Line) -> Result<Event, FilterError> {
        let generate = self.generate_skeleton();

        if line.text.trim().is_empty() {
            self.next_part += 1;
            let skeleton = GenericSkeleton::from_text(&format!("{}{}", line.text, line.line_break));
            return Ok(Event::document_part(DocumentPart::new(
                &format!("dp{}", self.next_part),
                skeleton,
            )));
        }

        let (leading, core, trailing) = if self.parameters.trim_whitespace {
            let start = line.text.len() - line.text.trim_start().len();
            let end = line.text.trim_end().len();
            (&line.text[..start], &line.text[start..end], &line.text[end..])
        } else {
            ("", line.text.as_str(), "")
        };

        self.next_unit += 1;
        let fragment = self.build_fragment(core)?;
        let mut tu = TextUnit::with_source(
            &format!("tu{}", self.next_unit),
            TextContainer::from(fragment),
        );
        tu.preserve_whitespace = !self.parameters.trim_whitespace;

        if generate {
            let mut skeleton = GenericSkeleton::new();
            if !leading.is_empty() {
                skeleton.add(leading);
            }
            skeleton.add_content_placeholder(Referent::Owner, None);
            let tail = format!("{}{}", trailing, line.line_break);
            if !tail.is_empty() {
                skeleton.append(&tail);
            }
            tu.skeleton = Some(skeleton);
        }
        Ok(Event::text_unit(tu))
    }
}

impl Filter for PlainTextFilter {
    fn name(&self) -> &str {
        Self::CONFIG_ID
    }

    fn display_name(&self) -> &str {
        "Plain Text Filter"
    }

    fn mime_type(&self) -> &str {
        Self::MIME_TYPE
    }

    fn set_options(&mut self, options: FilterOptions) {
        self.options = Some(options);
    }

    fn open(&mut self, input: &RawDocument) -> Result<(), FilterError> {
        let decoded = input.read_text()?;

        let lines = Self::split_lines(&decoded.text);
        let line_break = lines
            .iter()
            .map(|l| l.line_break.as_str())
            .find(|b| !b.is_empty())
            .unwrap_or("\n")
            .to_string();

        let mut document = StartDocument::new(
            DOCUMENT_ID,
            input.source_locale.clone(),
            Self::CONFIG_ID,
            Self::MIME_TYPE,
        );
        document.name = input
            .path()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()));
        document.encoding = decoded.encoding;
        document.has_bom = decoded.has_bom;
        document.has_utf8_bom = decoded.has_bom && document.encoding == "UTF-8";
        document.line_break = line_break;

        debug!(
            "Opened '{}' with {} lines ({})",
            input.display_name(),
            lines.len(),
            document.encoding
        );

        self.lines = lines;
        self.position = 0;
        self.next_unit = 0;
        self.next_part = 0;
        self.document = Some(document);
        self.state = State::Start;
        Ok(())
    }

    fn has_next(&self) -> bool {
        !matches!(self.state, State::Closed | State::Done)
    }

    fn next(&mut self) -> Result<Event, FilterError> {
        match self.state {
            State::Closed => Err(FilterError::NotOpen(Self::CONFIG_ID.to_string())),
            State::Done => Err(FilterError::NoMoreEvents(Self::CONFIG_ID.to_string())),
            State::Start => {
                self.state = State::StartDocument;
                Ok(Event::Start)
            }
            State::StartDocument => {
                self.state = State::Lines;
                let document = self
                    .document
                    .clone()
                    .ok_or_else(|| FilterError::NotOpen(Self::CONFIG_ID.to_string()))?;
                Ok(Event::StartDocument(Box::new(document)))
            }
            State::Lines => {
                if self.position < self.lines.len() {
                    let line = std::mem::replace(
                        &mut self.lines[self.position],
                        Line {
                            text: String::new(),
                            line_break: String::new(),
                        },
                    );
                    self.position += 1;
                    return self.line_event(&line);
                }
                self.state = State::Finished;
                Ok(Event::EndDocument(Ending::new(DOCUMENT_ID)))
            }
            State::Finished => {
                self.state = State::Done;
                Ok(Event::Finished)
            }
            State::Canceled => {
                self.state = State::Done;
                Ok(Event::Canceled)
            }
        }
    }

    fn cancel(&mut self) {
        if !matches!(self.state, State::Closed | State::Done) {
            debug!("Plain-text filter canceled");
            self.state = State::Canceled;
        }
    }

    fn close(&mut self) {
        self.lines.clear();
        self.document = None;
        self.state = State::Closed;
    }

    fn create_filter_writer(&self) -> Box<dyn FilterWriter> {
        Box::new(GenericFilterWriter::new(Box::new(GenericSkeletonWriter::new(
            self.parameters.writer,
        ))))
    }
}
