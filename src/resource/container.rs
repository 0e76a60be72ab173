/*!
 * Text containers and segmentation.
 *
 * A `TextContainer` holds the content of one language of a text unit.
 * Unsegmented, the content is a single coded-text fragment. Once segmented,
 * each segment's text moves into its own fragment and the content keeps a
 * segment marker where it was cut, so text between segments (spaces after
 * a sentence, say) stays where it was and merging restores the original.
 */

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::ContainerError;
use crate::resource::fragment::{MARKER_LEN, MARKER_SEGMENT, Piece, TextFragment, make_marker};
use crate::resource::property::PropertyTable;

/// One id-tagged span of content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Id unique within the container
    pub id: String,
    /// Segment text
    pub text: TextFragment,
}

impl Segment {
    /// Create a segment
    pub fn new(id: &str, text: TextFragment) -> Self {
        Self {
            id: id.to_string(),
            text,
        }
    }
}

/// What to do when a target lacks segments its source has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Copy the missing source segments to the end of the target
    #[default]
    AppendSource,
    /// Drop the target so output falls back to the source content
    UseSource,
    /// Fail the document
    Strict,
}

/// Result of matching target segments against source segments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentReport {
    /// Ids present on both sides
    pub matched: Vec<String>,
    /// Source ids absent from the target
    pub missing: Vec<String>,
    /// Target ids absent from the source
    pub extra: Vec<String>,
    /// Ids appended to the target by the fallback
    pub appended: Vec<String>,
    /// Whether the target was dropped in favour of the source
    pub fell_back_to_source: bool,
}

impl AlignmentReport {
    /// Whether source and target segment ids line up
    pub fn is_aligned(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Content of one language, optionally segmented
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextContainer {
    content: TextFragment,
    segments: Vec<Segment>,
    next_id: usize,
    /// Language-level properties
    pub properties: PropertyTable,
}

impl TextContainer {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container holding plain text
    pub fn from_text(text: &str) -> Self {
        Self::from_fragment(TextFragment::from_text(text))
    }

    /// Create a container around a fragment
    pub fn from_fragment(content: TextFragment) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    /// Whole content; segment markers stand in for segments
    pub fn content(&self) -> &TextFragment {
        &self.content
    }

    /// Whole content for editing; segment markers must be left in place
    pub fn content_mut(&mut self) -> &mut TextFragment {
        &mut self.content
    }

    /// Replace the content, dropping any segmentation
    pub fn set_content(&mut self, content: TextFragment) {
        self.content = content;
        self.segments.clear();
        self.next_id = 0;
    }

    /// Whether the content has been segmented
    pub fn is_segmented(&self) -> bool {
        !self.segments.is_empty()
    }

    /// Segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segments in order, for editing their text
    pub fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }

    /// Number of segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segment ids in order
    pub fn segment_ids(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.id.as_str()).collect()
    }

    /// Segment with this id
    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Segment with this id, for editing
    pub fn segment_mut(&mut self, id: &str) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.id == id)
    }

    /// Position of the segment with this id
    pub fn segment_index(&self, id: &str) -> Option<usize> {
        self.segments.iter().position(|s| s.id == id)
    }

    fn next_segment_id(&mut self) -> String {
        loop {
            let id = self.next_id.to_string();
            self.next_id += 1;
            if self.segment(&id).is_none() {
                return id;
            }
        }
    }

    /// Cut `start..end` of the content into a new segment; `None` runs to the end.
    /// Returns the index of the new segment.
    pub fn create_segment(&mut self, start: usize, end: Option<usize>) -> Result<usize, ContainerError> {
        let id = self.next_segment_id();
        self.create_segment_with_id(start, end, id)
    }

    fn create_segment_with_id(
        &mut self,
        start: usize,
        end: Option<usize>,
        id: String,
    ) -> Result<usize, ContainerError> {
        let end = end.unwrap_or(self.content.coded_text().len());
        let range = self.content.coded_text_range(start, end)?;
        if range.contains(MARKER_SEGMENT) {
            return Err(ContainerError::InvalidRange { start, end });
        }
        if self.segment(&id).is_some() {
            return Err(ContainerError::DuplicateSegmentId(id));
        }

        self.content.codes();
        let text = self.content.sub_fragment(start, end)?;
        let index = self.content.segment_markers_before(start);

        self.content.remove(start, end)?;
        self.content
            .splice_raw(start, start, &make_marker(MARKER_SEGMENT, index)?)?;
        self.segments.insert(index, Segment { id, text });
        self.content.renumber_segment_markers()?;

        debug!("Created segment {} at index {}", self.segments[index].id, index);
        Ok(index)
    }

    /// Segment several ranges at once; ranges must be ascending and disjoint.
    /// Ids are assigned in range order. Returns the number of segments created.
    pub fn create_segments(&mut self, ranges: &[(usize, Option<usize>)]) -> Result<usize, ContainerError> {
        let len = self.content.coded_text().len();
        let resolved: Vec<(usize, usize)> = ranges
            .iter()
            .map(|&(start, end)| (start, end.unwrap_or(len)))
            .collect();

        let mut previous_end = 0;
        for &(start, end) in &resolved {
            if start < previous_end || start > end {
                return Err(ContainerError::InvalidRange { start, end });
            }
            previous_end = end;
        }

        // Cut on a copy so a bad range leaves the container untouched
        let mut work = self.clone();
        let ids: Vec<String> = resolved.iter().map(|_| work.next_segment_id()).collect();
        for (&(start, end), id) in resolved.iter().zip(ids).rev() {
            work.create_segment_with_id(start, Some(end), id)?;
        }
        *self = work;
        Ok(resolved.len())
    }

    /// Append a segment at the end of the content.
    /// Unsegmented non-empty content becomes the first segment.
    pub fn append_segment(
        &mut self,
        id: Option<&str>,
        text: TextFragment,
    ) -> Result<&Segment, ContainerError> {
        if !self.is_segmented() && !self.content.is_empty() {
            self.create_segment(0, None)?;
        }

        let id = match id {
            Some(id) if self.segment(id).is_some() => {
                return Err(ContainerError::DuplicateSegmentId(id.to_string()));
            }
            Some(id) => id.to_string(),
            None => self.next_segment_id(),
        };

        let index = self.segments.len();
        let end = self.content.coded_text().len();
        self.content
            .splice_raw(end, end, &make_marker(MARKER_SEGMENT, index)?)?;
        self.segments.push(Segment { id, text });
        Ok(&self.segments[index])
    }

    /// Put the segment at `index` back into the content
    pub fn merge_segment(&mut self, index: usize) -> Result<(), ContainerError> {
        let position = self
            .content
            .segment_marker_position(index)
            .filter(|_| index < self.segments.len())
            .ok_or_else(|| ContainerError::SegmentNotFound(index.to_string()))?;

        let segment = self.segments.remove(index);
        self.content.splice_raw(position, position + MARKER_LEN, "")?;
        self.content.insert_keeping_ids(position, segment.text)?;
        self.content.renumber_segment_markers()?;
        Ok(())
    }

    /// Undo all segmentation
    pub fn merge_all_segments(&mut self) -> Result<(), ContainerError> {
        while self.is_segmented() {
            self.merge_segment(0)?;
        }
        self.next_id = 0;
        Ok(())
    }

    /// Content with segments expanded into a single fragment
    pub fn full_fragment(&self) -> Result<TextFragment, ContainerError> {
        let mut copy = self.clone();
        copy.merge_all_segments()?;
        Ok(copy.content)
    }

    /// Whether the container has any text
    pub fn has_text(&self, whitespace_counts: bool) -> bool {
        self.content.has_text(whitespace_counts)
            || self.segments.iter().any(|s| s.text.has_text(whitespace_counts))
    }

    /// Whether the container is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Text with every marker removed
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for piece in self.content.pieces() {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Segment(i) => {
                    if let Some(segment) = self.segments.get(i) {
                        out.push_str(&segment.text.plain_text());
                    }
                }
                Piece::Code(_) => {}
            }
        }
        out
    }

    /// Remove every code from content and segments
    pub fn strip_codes(&mut self) {
        self.content.strip_codes();
        for segment in &mut self.segments {
            segment.text.strip_codes();
        }
    }

    /// Apply a text transformation to content and every segment
    pub fn map_plain_text<F>(&mut self, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        self.content.map_plain_text(&mut f);
        for segment in &mut self.segments {
            segment.text.map_plain_text(&mut f);
        }
    }
}

impl fmt::Display for TextContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in self.content.pieces() {
            match piece {
                Piece::Text(t) => f.write_str(t)?,
                Piece::Code(index) => {
                    if let Some(code) = self.content.code(index) {
                        f.write_str(code.outer_data())?;
                    }
                }
                Piece::Segment(index) => {
                    if let Some(segment) = self.segments.get(index) {
                        write!(f, "{}", segment.text)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl From<TextFragment> for TextContainer {
    fn from(content: TextFragment) -> Self {
        Self::from_fragment(content)
    }
}
