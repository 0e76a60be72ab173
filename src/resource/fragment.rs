/*!
 * Coded text.
 *
 * A `TextFragment` stores text with inline markup replaced by two-character
 * markers: a kind character (opening, closing, isolated, segment) followed
 * by an index character pointing into the fragment's code list. Both
 * characters live in the Private Use Area and take three bytes each in
 * UTF-8, so every marker is six bytes long.
 *
 * Positions used by the editing operations are byte offsets into the coded
 * text. An offset must sit on a character boundary and must not split a
 * marker.
 *
 * Opening and closing codes are paired lazily: appending them marks the
 * fragment unbalanced and the next call to [`TextFragment::codes`] runs
 * [`TextFragment::balance_markers`].
 */

use std::borrow::Cow;
use std::fmt;

use log::warn;

use crate::errors::FragmentError;
use crate::resource::code::{Code, TagType};

/// Kind character for an opening code
pub const MARKER_OPENING: char = '\u{E101}';
/// Kind character for a closing code
pub const MARKER_CLOSING: char = '\u{E102}';
/// Kind character for an isolated code
pub const MARKER_ISOLATED: char = '\u{E103}';
/// Kind character for a segment position inside container content
pub const MARKER_SEGMENT: char = '\u{E104}';
/// First index character
pub const CHARBASE: u32 = 0xE110;
/// Highest index a marker can carry
pub const MAX_INDEX: usize = (0xF8FF - CHARBASE) as usize;
/// Byte length of one marker in UTF-8
pub const MARKER_LEN: usize = 6;

/// Encode an index as a marker index character
pub fn to_char(index: usize) -> Option<char> {
    if index > MAX_INDEX {
        return None;
    }
    char::from_u32(CHARBASE + index as u32)
}

/// Decode a marker index character
pub fn to_index(c: char) -> Option<usize> {
    let value = c as u32;
    if (CHARBASE..=0xF8FF).contains(&value) {
        Some((value - CHARBASE) as usize)
    } else {
        None
    }
}

/// Whether a character is one of the four marker kind characters
pub fn is_marker(c: char) -> bool {
    matches!(
        c,
        MARKER_OPENING | MARKER_CLOSING | MARKER_ISOLATED | MARKER_SEGMENT
    )
}

/// Kind character used for a tag type
pub fn marker_for(tag_type: TagType) -> char {
    match tag_type {
        TagType::Opening => MARKER_OPENING,
        TagType::Closing => MARKER_CLOSING,
        TagType::Isolated => MARKER_ISOLATED,
    }
}

/// Build the two-character marker string
pub fn make_marker(kind: char, index: usize) -> Result<String, FragmentError> {
    let index_char = to_char(index).ok_or(FragmentError::TooManyCodes { count: index + 1 })?;
    let mut marker = String::with_capacity(MARKER_LEN);
    marker.push(kind);
    marker.push(index_char);
    Ok(marker)
}

// Marker kind characters must never appear in plain text
fn sanitize(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_marker) {
        return Cow::Borrowed(text);
    }
    warn!("Reserved marker characters found in plain text, replaced with U+FFFD");
    Cow::Owned(
        text.chars()
            .map(|c| if is_marker(c) { '\u{FFFD}' } else { c })
            .collect(),
    )
}

#[derive(Debug, Clone, Copy)]
struct MarkerPos {
    pos: usize,
    kind: char,
    index: usize,
}

fn scan_markers(text: &str) -> Result<Vec<MarkerPos>, FragmentError> {
    let mut markers = Vec::new();
    let mut chars = text.char_indices();
    while let Some((pos, c)) = chars.next() {
        if !is_marker(c) {
            continue;
        }
        let index = chars
            .next()
            .and_then(|(_, index_char)| to_index(index_char))
            .ok_or(FragmentError::CorruptMarker { position: pos })?;
        markers.push(MarkerPos { pos, kind: c, index });
    }
    Ok(markers)
}

fn check_indices(markers: &[MarkerPos], code_count: usize) -> Result<(), FragmentError> {
    for marker in markers {
        if marker.kind != MARKER_SEGMENT && marker.index >= code_count {
            return Err(FragmentError::InvalidMarkerIndex {
                index: marker.index,
                code_count,
            });
        }
    }
    Ok(())
}

/// One run of a coded text, as produced by [`TextFragment::pieces`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    /// Plain text between markers
    Text(&'a str),
    /// Marker pointing at the code with this index
    Code(usize),
    /// Segment marker pointing at the segment with this index
    Segment(usize),
}

/// Iterator over the runs of a coded text
pub struct Pieces<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Pieces<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Piece<'a>> {
        let rest = &self.text[self.pos..];
        let mut chars = rest.chars();
        let first = chars.next()?;

        if is_marker(first) {
            if let Some(index) = chars.next().and_then(to_index) {
                self.pos += MARKER_LEN;
                return Some(if first == MARKER_SEGMENT {
                    Piece::Segment(index)
                } else {
                    Piece::Code(index)
                });
            }
        }

        let skip = first.len_utf8();
        let end = rest[skip..]
            .find(is_marker)
            .map_or(rest.len(), |i| i + skip);
        self.pos += end;
        Some(Piece::Text(&rest[..end]))
    }
}

/// Text with inline codes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFragment {
    text: String,
    codes: Vec<Code>,
    last_id: i32,
    unbalanced: bool,
}

impl TextFragment {
    /// Create an empty fragment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fragment holding plain text
    pub fn from_text(text: &str) -> Self {
        let mut fragment = Self::new();
        fragment.append_text(text);
        fragment
    }

    /// The coded text, markers included
    pub fn coded_text(&self) -> &str {
        &self.text
    }

    /// Codes, balanced first if needed
    pub fn codes(&mut self) -> &[Code] {
        if self.unbalanced {
            self.balance_markers();
        }
        &self.codes
    }

    /// Codes as they are, without balancing
    pub fn codes_as_is(&self) -> &[Code] {
        &self.codes
    }

    /// Code at a list index
    pub fn code(&self, index: usize) -> Option<&Code> {
        self.codes.get(index)
    }

    /// Mutable access to the code at a list index; tag types are managed by balancing
    pub fn code_mut(&mut self, index: usize) -> Option<&mut Code> {
        self.codes.get_mut(index)
    }

    /// Number of codes
    pub fn code_count(&self) -> usize {
        self.codes.len()
    }

    /// Highest id handed out so far
    pub fn last_id(&self) -> i32 {
        self.last_id
    }

    /// Whether opening and closing codes are known to be paired
    pub fn is_balanced(&self) -> bool {
        !self.unbalanced
    }

    /// Iterate over text runs, codes and segment markers in body order
    pub fn pieces(&self) -> Pieces<'_> {
        Pieces {
            text: &self.text,
            pos: 0,
        }
    }

    /// Append plain text
    pub fn append_text(&mut self, text: &str) {
        self.text.push_str(&sanitize(text));
    }

    /// Append one plain character
    pub fn append_char(&mut self, c: char) {
        if is_marker(c) {
            warn!("Reserved marker character appended as plain text, replaced with U+FFFD");
            self.text.push('\u{FFFD}');
        } else {
            self.text.push(c);
        }
    }

    /// Append a code; returns its index in the code list
    pub fn append_code(&mut self, mut code: Code) -> Result<usize, FragmentError> {
        let index = self.codes.len();
        let marker = make_marker(marker_for(code.tag_type), index)?;

        match code.tag_type {
            TagType::Closing => self.unbalanced = true,
            TagType::Opening | TagType::Isolated => {
                if code.is_unresolved() {
                    self.last_id += 1;
                    code.id = self.last_id;
                } else {
                    self.last_id = self.last_id.max(code.id);
                }
                if code.tag_type == TagType::Opening {
                    self.unbalanced = true;
                }
            }
        }

        self.text.push_str(&marker);
        self.codes.push(code);
        Ok(index)
    }

    /// Append a new code built from its parts
    pub fn append_tag(
        &mut self,
        tag_type: TagType,
        label: &str,
        data: &str,
    ) -> Result<usize, FragmentError> {
        self.append_code(Code::new(tag_type, label, data))
    }

    /// Append another fragment; its codes get fresh ids
    pub fn append_fragment(&mut self, other: &TextFragment) -> Result<(), FragmentError> {
        self.insert(None, other)
    }

    /// Insert another fragment at `offset` (`None` appends); its codes get fresh ids
    pub fn insert(
        &mut self,
        offset: Option<usize>,
        other: &TextFragment,
    ) -> Result<(), FragmentError> {
        let offset = offset.unwrap_or(self.text.len());
        self.check_position(offset)?;

        let mut other = other.clone();
        other.balance_markers();

        let mut id_map: Vec<(i32, i32)> = Vec::new();
        for code in &mut other.codes {
            if code.is_unresolved() {
                continue;
            }
            let new_id = match id_map.iter().find(|(old, _)| *old == code.id) {
                Some((_, new)) => *new,
                None => {
                    self.last_id += 1;
                    id_map.push((code.id, self.last_id));
                    self.last_id
                }
            };
            code.id = new_id;
        }

        self.splice_fragment(offset, other)
    }

    /// Insert another fragment keeping its code ids
    pub(crate) fn insert_keeping_ids(
        &mut self,
        offset: usize,
        other: TextFragment,
    ) -> Result<(), FragmentError> {
        self.check_position(offset)?;
        self.last_id = self.last_id.max(other.last_id);
        for code in &other.codes {
            self.last_id = self.last_id.max(code.id);
        }
        self.unbalanced |= other.unbalanced;
        self.splice_fragment(offset, other)
    }

    fn splice_fragment(&mut self, offset: usize, other: TextFragment) -> Result<(), FragmentError> {
        let base = self.codes.len();
        if base + other.codes.len() > MAX_INDEX + 1 {
            return Err(FragmentError::TooManyCodes {
                count: base + other.codes.len(),
            });
        }

        let mut rebased = String::with_capacity(other.text.len());
        let mut chars = other.text.chars();
        while let Some(c) = chars.next() {
            rebased.push(c);
            if is_marker(c) {
                let index = chars
                    .next()
                    .and_then(to_index)
                    .ok_or(FragmentError::CorruptMarker { position: 0 })?;
                let shifted = if c == MARKER_SEGMENT { index } else { index + base };
                rebased.push(to_char(shifted).ok_or(FragmentError::TooManyCodes { count: shifted + 1 })?);
            }
        }

        self.text.insert_str(offset, &rebased);
        self.codes.extend(other.codes);
        Ok(())
    }

    /// Insert plain text at `offset`
    pub fn insert_text(&mut self, offset: usize, text: &str) -> Result<(), FragmentError> {
        self.check_position(offset)?;
        self.text.insert_str(offset, &sanitize(text));
        Ok(())
    }

    /// Remove a range; codes whose markers fall inside it are dropped
    pub fn remove(&mut self, start: usize, end: usize) -> Result<(), FragmentError> {
        self.check_range(start, end)?;
        let mut text = String::with_capacity(self.text.len() - (end - start));
        text.push_str(&self.text[..start]);
        text.push_str(&self.text[end..]);

        let codes = std::mem::take(&mut self.codes);
        let (text, codes) = compact(&text, codes)?;
        self.text = text;
        self.codes = codes;
        Ok(())
    }

    /// Coded text between two offsets
    pub fn coded_text_range(&self, start: usize, end: usize) -> Result<&str, FragmentError> {
        self.check_range(start, end)?;
        Ok(&self.text[start..end])
    }

    /// Codes referenced from a range, in body order
    pub fn codes_in_range(&self, start: usize, end: usize) -> Result<Vec<Code>, FragmentError> {
        let range = self.coded_text_range(start, end)?;
        Ok(scan_markers(range)?
            .iter()
            .filter(|m| m.kind != MARKER_SEGMENT)
            .filter_map(|m| self.codes.get(m.index).cloned())
            .collect())
    }

    /// Copy of a range as a fragment of its own; codes keep ids and kinds
    pub fn sub_fragment(&self, start: usize, end: usize) -> Result<TextFragment, FragmentError> {
        let range = self.coded_text_range(start, end)?;
        let (text, codes) = compact(range, self.codes.clone())?;
        let last_id = codes.iter().map(|c| c.id).max().unwrap_or(0).max(0);
        Ok(TextFragment {
            text,
            codes,
            last_id,
            unbalanced: false,
        })
    }

    /// Replace the coded text keeping the current codes; unreferenced codes are dropped
    pub fn set_coded_text(&mut self, text: &str) -> Result<(), FragmentError> {
        let markers = scan_markers(text)?;
        check_indices(&markers, self.codes.len())?;
        let (text, codes) = compact(text, self.codes.clone())?;
        self.text = text;
        self.codes = codes;
        Ok(())
    }

    /// Replace both the coded text and the code list
    pub fn set_coded_text_with_codes(
        &mut self,
        text: &str,
        codes: Vec<Code>,
    ) -> Result<(), FragmentError> {
        let markers = scan_markers(text)?;
        check_indices(&markers, codes.len())?;

        self.last_id = codes.iter().map(|c| c.id).max().unwrap_or(0).max(0);
        self.unbalanced = codes
            .iter()
            .any(|c| c.is_unresolved() && c.tag_type != TagType::Isolated);
        self.text = text.to_string();
        self.codes = codes;
        Ok(())
    }

    /// Whether there is any text; markers never count
    pub fn has_text(&self, whitespace_counts: bool) -> bool {
        self.pieces().any(|piece| match piece {
            Piece::Text(t) if whitespace_counts => !t.is_empty(),
            Piece::Text(t) => t.chars().any(|c| !c.is_whitespace()),
            _ => false,
        })
    }

    /// Whether the fragment references at least one code
    pub fn has_code(&self) -> bool {
        !self.codes.is_empty()
    }

    /// Whether the coded text is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Drop all text and codes
    pub fn clear(&mut self) {
        self.text.clear();
        self.codes.clear();
        self.last_id = 0;
        self.unbalanced = false;
    }

    /// Turn a span of plain text into a code; returns the change in length
    pub fn change_to_code(
        &mut self,
        start: usize,
        end: usize,
        tag_type: TagType,
        label: &str,
    ) -> Result<isize, FragmentError> {
        self.check_range(start, end)?;
        let span = &self.text[start..end];
        if span.chars().any(is_marker) {
            return Err(FragmentError::InvalidRange { start, end });
        }

        let mut code = Code::new(tag_type, label, span);
        let index = self.codes.len();
        let marker = make_marker(marker_for(tag_type), index)?;
        if tag_type != TagType::Closing {
            self.last_id += 1;
            code.id = self.last_id;
        }
        if tag_type != TagType::Isolated {
            self.unbalanced = true;
        }

        self.text.replace_range(start..end, &marker);
        self.codes.push(code);
        Ok(MARKER_LEN as isize - (end - start) as isize)
    }

    /// First list index of a non-closing code with this id
    pub fn index_of_code_id(&self, id: i32) -> Option<usize> {
        self.codes
            .iter()
            .position(|c| c.id == id && c.tag_type != TagType::Closing)
    }

    /// Pair opening and closing codes by label and isolate the leftovers
    pub fn balance_markers(&mut self) {
        let markers = match scan_markers(&self.text) {
            Ok(markers) => markers,
            Err(e) => {
                warn!("Cannot balance corrupt coded text: {}", e);
                return;
            }
        };
        let code_markers: Vec<MarkerPos> = markers
            .into_iter()
            .filter(|m| m.kind != MARKER_SEGMENT && m.index < self.codes.len())
            .collect();

        for marker in &code_markers {
            let code = &mut self.codes[marker.index];
            if code.tag_type != TagType::Closing && code.is_unresolved() {
                self.last_id += 1;
                code.id = self.last_id;
            }
        }

        let mut consumed = vec![false; code_markers.len()];
        let mut isolate = Vec::new();

        for i in 0..code_markers.len() {
            let opening = &self.codes[code_markers[i].index];
            if opening.tag_type != TagType::Opening {
                continue;
            }
            let (label, id) = (opening.label.clone(), opening.id);

            let mut depth = 0usize;
            let mut found = None;
            for (j, marker) in code_markers.iter().enumerate().skip(i + 1) {
                let candidate = &self.codes[marker.index];
                if candidate.label != label {
                    continue;
                }
                match candidate.tag_type {
                    TagType::Opening => depth += 1,
                    TagType::Closing if !consumed[j] => {
                        if depth == 0 {
                            found = Some(j);
                            break;
                        }
                        depth -= 1;
                    }
                    _ => {}
                }
            }

            match found {
                Some(j) => {
                    consumed[j] = true;
                    self.codes[code_markers[j].index].id = id;
                }
                None => isolate.push(i),
            }
        }

        for (j, marker) in code_markers.iter().enumerate() {
            let code = &mut self.codes[marker.index];
            if code.tag_type == TagType::Closing && !consumed[j] {
                if code.is_unresolved() {
                    self.last_id += 1;
                    code.id = self.last_id;
                }
                isolate.push(j);
            }
        }

        for i in isolate {
            let marker = code_markers[i];
            let code = &mut self.codes[marker.index];
            warn!(
                "Unbalanced {:?} code '{}' (id {}) changed to isolated",
                code.tag_type, code.label, code.id
            );
            code.tag_type = TagType::Isolated;
            let mut buffer = [0u8; 4];
            self.text.replace_range(
                marker.pos..marker.pos + MARKER_ISOLATED.len_utf8(),
                MARKER_ISOLATED.encode_utf8(&mut buffer),
            );
        }

        self.unbalanced = false;
    }

    /// Text with codes shown as `{(id)=data}`
    pub fn equiv_text(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        for piece in self.pieces() {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Code(index) => {
                    if let Some(code) = self.codes.get(index) {
                        out.push_str(&format!("{{({})={}}}", code.id, code.data));
                    }
                }
                Piece::Segment(_) => {}
            }
        }
        out
    }

    /// Text with all markers removed
    pub fn plain_text(&self) -> String {
        self.pieces()
            .filter_map(|piece| match piece {
                Piece::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// Remove every code, keeping the text and any segment markers
    pub fn strip_codes(&mut self) {
        let mut text = String::with_capacity(self.text.len());
        let mut chars = self.text.chars();
        while let Some(c) = chars.next() {
            if is_marker(c) {
                let index_char = chars.next();
                if c == MARKER_SEGMENT {
                    text.push(c);
                    text.extend(index_char);
                }
            } else {
                text.push(c);
            }
        }
        self.text = text;
        self.codes.clear();
        self.unbalanced = false;
    }

    /// Rewrite every plain-text run, leaving markers untouched
    pub fn map_plain_text<F>(&mut self, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();
        while !rest.is_empty() {
            match rest.find(is_marker) {
                Some(0) => {
                    let len = rest
                        .char_indices()
                        .nth(2)
                        .map_or(rest.len(), |(i, _)| i);
                    out.push_str(&rest[..len]);
                    rest = &rest[len..];
                }
                Some(i) => {
                    out.push_str(&sanitize(&f(&rest[..i])));
                    rest = &rest[i..];
                }
                None => {
                    out.push_str(&sanitize(&f(rest)));
                    rest = "";
                }
            }
        }
        self.text = out;
    }

    /// Replace a range with raw coded text, bypassing sanitizing
    pub(crate) fn splice_raw(&mut self, start: usize, end: usize, raw: &str) -> Result<(), FragmentError> {
        self.check_range(start, end)?;
        self.text.replace_range(start..end, raw);
        Ok(())
    }

    /// Byte offset of the segment marker with this index
    pub(crate) fn segment_marker_position(&self, index: usize) -> Option<usize> {
        scan_markers(&self.text)
            .ok()?
            .into_iter()
            .find(|m| m.kind == MARKER_SEGMENT && m.index == index)
            .map(|m| m.pos)
    }

    /// Number of segment markers before a byte offset
    pub(crate) fn segment_markers_before(&self, position: usize) -> usize {
        self.text[..position.min(self.text.len())]
            .chars()
            .filter(|&c| c == MARKER_SEGMENT)
            .count()
    }

    /// Renumber segment markers in body order
    pub(crate) fn renumber_segment_markers(&mut self) -> Result<(), FragmentError> {
        let mut text = String::with_capacity(self.text.len());
        let mut next = 0;
        let mut chars = self.text.chars();
        while let Some(c) = chars.next() {
            text.push(c);
            if c == MARKER_SEGMENT {
                chars.next();
                text.push(to_char(next).ok_or(FragmentError::TooManyCodes { count: next + 1 })?);
                next += 1;
            }
        }
        self.text = text;
        Ok(())
    }

    fn check_position(&self, position: usize) -> Result<(), FragmentError> {
        let invalid = FragmentError::InvalidPosition { position };
        if position > self.text.len() || !self.text.is_char_boundary(position) {
            return Err(invalid);
        }
        let splits_marker = self.text[..position]
            .chars()
            .next_back()
            .is_some_and(is_marker)
            && self.text[position..].chars().next().and_then(to_index).is_some();
        if splits_marker {
            return Err(invalid);
        }
        Ok(())
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), FragmentError> {
        if start > end {
            return Err(FragmentError::InvalidRange { start, end });
        }
        self.check_position(start)?;
        self.check_position(end)
    }
}

// Drop codes no longer referenced from `text` and renumber the markers
fn compact(text: &str, codes: Vec<Code>) -> Result<(String, Vec<Code>), FragmentError> {
    let markers = scan_markers(text)?;
    check_indices(&markers, codes.len())?;

    let mut used = vec![false; codes.len()];
    for marker in markers.iter().filter(|m| m.kind != MARKER_SEGMENT) {
        used[marker.index] = true;
    }
    if used.iter().all(|u| *u) {
        return Ok((text.to_string(), codes));
    }

    let mut new_index = vec![0usize; codes.len()];
    let mut kept = Vec::new();
    for (old, code) in codes.into_iter().enumerate() {
        if used[old] {
            new_index[old] = kept.len();
            kept.push(code);
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for marker in markers.iter().filter(|m| m.kind != MARKER_SEGMENT) {
        out.push_str(&text[last..marker.pos]);
        out.push_str(&make_marker(marker.kind, new_index[marker.index])?);
        last = marker.pos + MARKER_LEN;
    }
    out.push_str(&text[last..]);
    Ok((out, kept))
}

impl fmt::Display for TextFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in self.pieces() {
            match piece {
                Piece::Text(t) => f.write_str(t)?,
                Piece::Code(index) => {
                    if let Some(code) = self.codes.get(index) {
                        f.write_str(code.outer_data())?;
                    }
                }
                Piece::Segment(_) => {}
            }
        }
        Ok(())
    }
}

impl From<&str> for TextFragment {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}
