/*!
 * Structural resources carried by events: document and sub-document
 * starts, groups, endings, non-translatable document parts and the raw
 * document handed to a filter.
 */

use std::path::PathBuf;

use url::Url;

use crate::errors::FilterError;
use crate::file_utils::{DecodedText, FileManager};
use crate::locale::LocaleId;
use crate::resource::property::{PropertyHolder, PropertySet, PropertyTable};
use crate::skeleton::GenericSkeleton;

/// Start of a document
#[derive(Debug, Clone)]
pub struct StartDocument {
    /// Resource id
    pub id: String,
    /// Document name, usually the input file name
    pub name: Option<String>,
    /// Source locale of the document
    pub locale: LocaleId,
    /// Encoding the input was read with
    pub encoding: String,
    /// Whether the input started with a UTF-8 byte order mark
    pub has_utf8_bom: bool,
    /// Whether the input started with a byte order mark of any Unicode encoding
    pub has_bom: bool,
    /// Line break used by the input
    pub line_break: String,
    /// MIME type of the format
    pub mime_type: String,
    /// Whether the format stores several languages (XLIFF, TMX, ...)
    pub is_multilingual: bool,
    /// Configuration id of the filter that produced the document
    pub filter_id: String,
    /// Properties at all levels
    pub properties: PropertySet,
    /// Skeleton written before the content
    pub skeleton: Option<GenericSkeleton>,
}

impl StartDocument {
    /// Create a start-document resource with defaults for a filter
    pub fn new(id: &str, locale: LocaleId, filter_id: &str, mime_type: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            locale,
            encoding: "UTF-8".to_string(),
            has_utf8_bom: false,
            has_bom: false,
            line_break: "\n".to_string(),
            mime_type: mime_type.to_string(),
            is_multilingual: false,
            filter_id: filter_id.to_string(),
            properties: PropertySet::default(),
            skeleton: None,
        }
    }
}

/// Start of a sub-document (an embedded file, a sheet, a story)
#[derive(Debug, Clone, Default)]
pub struct StartSubDocument {
    /// Resource id
    pub id: String,
    /// Sub-document name
    pub name: Option<String>,
    /// Id of the enclosing document
    pub parent_id: Option<String>,
    /// Properties at all levels
    pub properties: PropertySet,
    /// Skeleton written before the content
    pub skeleton: Option<GenericSkeleton>,
}

/// Start of a group of resources (a table, a list, a footnote)
#[derive(Debug, Clone, Default)]
pub struct StartGroup {
    /// Resource id
    pub id: String,
    /// Group name
    pub name: Option<String>,
    /// Group type, e.g. the element name
    pub group_type: Option<String>,
    /// Id of the enclosing group or document
    pub parent_id: Option<String>,
    /// Referent groups are written where they are referenced
    pub is_referent: bool,
    /// Properties at all levels
    pub properties: PropertySet,
    /// Skeleton written before the group content
    pub skeleton: Option<GenericSkeleton>,
}

impl StartGroup {
    /// Create a group start
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }
}

/// End of a group, sub-document or document
#[derive(Debug, Clone, Default)]
pub struct Ending {
    /// Resource id
    pub id: String,
    /// Skeleton written after the content
    pub skeleton: Option<GenericSkeleton>,
}

impl Ending {
    /// Create an ending
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            skeleton: None,
        }
    }
}

/// Non-translatable part of a document
#[derive(Debug, Clone, Default)]
pub struct DocumentPart {
    /// Resource id
    pub id: String,
    /// Referents are written where they are referenced
    pub is_referent: bool,
    /// Properties at all levels
    pub properties: PropertySet,
    /// Skeleton holding the part's text
    pub skeleton: Option<GenericSkeleton>,
}

impl DocumentPart {
    /// Create a document part around a skeleton
    pub fn new(id: &str, skeleton: GenericSkeleton) -> Self {
        Self {
            id: id.to_string(),
            skeleton: Some(skeleton),
            ..Self::default()
        }
    }
}

macro_rules! property_set_holder {
    ($($ty:ty),+) => {
        $(impl PropertyHolder for $ty {
            fn resource_properties(&self) -> &PropertyTable {
                &self.properties.resource
            }

            fn source_properties(&self) -> &PropertyTable {
                &self.properties.source
            }

            fn target_properties(&self, locale: &LocaleId) -> Option<&PropertyTable> {
                self.properties.targets.get(locale)
            }
        })+
    };
}

property_set_holder!(StartDocument, StartSubDocument, StartGroup, DocumentPart);

/// Where a raw document's bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// In-memory text
    Text(String),
    /// Local file
    Path(PathBuf),
    /// `file:` URL
    Url(Url),
}

/// Input handed to a filter
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Document bytes or their location
    pub input: RawInput,
    /// Encoding to use when the input has no byte order mark
    pub encoding: String,
    /// Source locale
    pub source_locale: LocaleId,
    /// Target locale, when known
    pub target_locale: Option<LocaleId>,
    /// Filter configuration to use; the pipeline default applies when unset
    pub filter_config_id: Option<String>,
}

impl RawDocument {
    /// Document from in-memory text
    pub fn from_text(text: &str, source_locale: LocaleId) -> Self {
        Self::new(RawInput::Text(text.to_string()), source_locale)
    }

    /// Document from a local file
    pub fn from_path(path: impl Into<PathBuf>, source_locale: LocaleId) -> Self {
        Self::new(RawInput::Path(path.into()), source_locale)
    }

    fn new(input: RawInput, source_locale: LocaleId) -> Self {
        Self {
            input,
            encoding: "UTF-8".to_string(),
            source_locale,
            target_locale: None,
            filter_config_id: None,
        }
    }

    /// Set the target locale
    pub fn with_target_locale(mut self, locale: LocaleId) -> Self {
        self.target_locale = Some(locale);
        self
    }

    /// Set the default encoding
    pub fn with_encoding(mut self, encoding: &str) -> Self {
        self.encoding = encoding.to_string();
        self
    }

    /// Set the filter configuration id
    pub fn with_filter(mut self, filter_config_id: &str) -> Self {
        self.filter_config_id = Some(filter_config_id.to_string());
        self
    }

    /// Human-readable name used in logs and batch reports
    pub fn display_name(&self) -> String {
        match &self.input {
            RawInput::Text(_) => "<memory>".to_string(),
            RawInput::Path(path) => path.display().to_string(),
            RawInput::Url(url) => url.to_string(),
        }
    }

    /// Local path of the document, if it has one
    pub fn path(&self) -> Option<PathBuf> {
        match &self.input {
            RawInput::Text(_) => None,
            RawInput::Path(path) => Some(path.clone()),
            RawInput::Url(url) => url.to_file_path().ok(),
        }
    }

    /// Raw bytes of the document
    pub fn read_bytes(&self) -> Result<Vec<u8>, FilterError> {
        match &self.input {
            RawInput::Text(text) => Ok(text.as_bytes().to_vec()),
            RawInput::Path(path) => Ok(std::fs::read(path)?),
            RawInput::Url(url) => {
                let path = url
                    .to_file_path()
                    .map_err(|_| FilterError::UnsupportedInput(url.to_string()))?;
                Ok(std::fs::read(path)?)
            }
        }
    }

    /// Read and decode the document
    pub fn read_text(&self) -> Result<DecodedText, FilterError> {
        if let RawInput::Text(text) = &self.input {
            return Ok(DecodedText {
                text: text.clone(),
                encoding: self.encoding.clone(),
                has_bom: false,
            });
        }
        let bytes = self.read_bytes()?;
        FileManager::decode_bytes(&bytes, &self.encoding).map_err(|e| FilterError::Decode(e.to_string()))
    }
}
