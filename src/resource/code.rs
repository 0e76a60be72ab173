/*!
 * Inline codes.
 *
 * A `Code` is one piece of inline markup lifted out of translatable text:
 * a bold tag, a line-break element, a variable. The coded text only keeps
 * a two-character marker; everything needed to rebuild the markup lives
 * here.
 */

use serde::{Deserialize, Serialize};

use crate::errors::FragmentError;

/// Id carried by a closing code before balancing pairs it with an opener
pub const UNRESOLVED_ID: i32 = -1;

/// Role of a code relative to the text around it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagType {
    /// Starts a span, e.g. `<b>`
    Opening,
    /// Ends a span, e.g. `</b>`
    Closing,
    /// Stands alone, e.g. `<br/>`, or a pair half that lost its partner
    Isolated,
}

/// Behaviour flags carried by a code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeFlags {
    /// The data contains reference markers to other resources
    #[serde(default)]
    pub has_reference: bool,
    /// Translators may duplicate the code
    #[serde(default)]
    pub cloneable: bool,
    /// Translators may delete the code
    #[serde(default)]
    pub deleteable: bool,
}

/// One inline markup item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    /// Stable id shared by an opening code and its closing partner
    pub id: i32,

    /// Opening, closing or isolated
    pub tag_type: TagType,

    /// Type tag used to pair openings and closings (often the element name)
    pub label: String,

    /// Text rendered for this code on output
    pub data: String,

    /// Original full markup, when it differs from `data`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_data: Option<String>,

    /// Behaviour flags
    #[serde(default)]
    pub flags: CodeFlags,
}

impl Code {
    /// Create a code with an unresolved id
    pub fn new(tag_type: TagType, label: &str, data: &str) -> Self {
        Self {
            id: UNRESOLVED_ID,
            tag_type,
            label: label.to_string(),
            data: data.to_string(),
            outer_data: None,
            flags: CodeFlags::default(),
        }
    }

    /// Set an explicit id
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    /// Set the original markup
    pub fn with_outer_data(mut self, outer_data: &str) -> Self {
        self.outer_data = Some(outer_data.to_string());
        self
    }

    /// Mark the data as containing reference markers
    pub fn with_reference(mut self) -> Self {
        self.flags.has_reference = true;
        self
    }

    /// Original markup, falling back to `data`
    pub fn outer_data(&self) -> &str {
        self.outer_data.as_deref().unwrap_or(&self.data)
    }

    /// Whether the data must go through reference resolution
    pub fn has_reference(&self) -> bool {
        self.flags.has_reference
    }

    /// Whether the id is still the unresolved sentinel
    pub fn is_unresolved(&self) -> bool {
        self.id == UNRESOLVED_ID
    }
}

/// Serialize a code list so it can be stored next to its coded text
pub fn codes_to_string(codes: &[Code]) -> Result<String, FragmentError> {
    serde_json::to_string(codes).map_err(|e| FragmentError::InvalidCodeStorage(e.to_string()))
}

/// Rebuild a code list stored with `codes_to_string`
pub fn string_to_codes(storage: &str) -> Result<Vec<Code>, FragmentError> {
    if storage.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(storage).map_err(|e| FragmentError::InvalidCodeStorage(e.to_string()))
}
