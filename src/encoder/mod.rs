/*!
 * Output encoders.
 *
 * An encoder turns text into the native form of an output format:
 * character escaping, line-break normalization and numeric references for
 * characters the output charset cannot represent.
 *
 * - `default`: line breaks only
 * - `xml`: XML escaping
 * - `html`: HTML escaping
 * - `properties`: Java-properties style escaping
 * - `manager`: MIME type to encoder registry
 * - `layer`: wrapping of inline codes and segments for bilingual output
 */

pub mod default;
pub mod html;
pub mod layer;
pub mod manager;
pub mod properties;
pub mod xml;

use encoding_rs::{Encoding, UTF_8};

use crate::errors::WriterError;
use crate::file_utils::FileManager;

pub use default::DefaultEncoder;
pub use html::HtmlEncoder;
pub use layer::{EncoderLayer, InlineTagLayer};
pub use manager::{EncoderFactory, EncoderManager};
pub use properties::PropertiesEncoder;
pub use xml::XmlEncoder;

/// What the text being encoded is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderContext {
    /// Encodable skeleton text
    Skeleton,
    /// Translatable text
    Text,
    /// Data of an inline code
    Inline,
}

/// Output settings shared by all encoders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Output encoding label
    pub encoding: String,
    /// Line break written for each `\n`
    pub line_break: String,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            line_break: "\n".to_string(),
        }
    }
}

/// Converts text to the native form of an output format
pub trait Encoder: Send {
    /// Set the output encoding and line break
    fn set_options(&mut self, options: &EncoderOptions) -> Result<(), WriterError>;

    /// Encode a string
    fn encode(&self, text: &str, context: EncoderContext) -> String;

    /// Encode one character
    fn encode_char(&self, c: char, context: EncoderContext) -> String {
        let mut buffer = [0u8; 4];
        self.encode(c.encode_utf8(&mut buffer), context)
    }

    /// Convert a normalized property value to the format's native value
    fn to_native(&self, _property: &str, value: &str) -> String {
        value.to_string()
    }

    /// Line break in use
    fn line_break(&self) -> &str;

    /// Output encoding label in use
    fn encoding(&self) -> &str;
}

/// Which characters an output encoding can represent
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Charset {
    // None when every character is representable
    encoding: Option<&'static Encoding>,
}

impl Charset {
    pub(crate) fn for_label(label: &str) -> Result<Self, WriterError> {
        let encoding = FileManager::encoding_for_label(label)
            .map_err(|_| WriterError::UnsupportedEncoding(label.to_string()))?;
        // UTF-16 encodes through UTF-8 in encoding_rs; both cover all of Unicode
        let unrestricted = encoding.output_encoding() == UTF_8;
        Ok(Self {
            encoding: (!unrestricted).then_some(encoding),
        })
    }

    pub(crate) fn can_encode(&self, c: char) -> bool {
        if c.is_ascii() {
            return true;
        }
        match self.encoding {
            None => true,
            Some(encoding) => {
                let mut buffer = [0u8; 4];
                let (_, _, had_errors) = encoding.encode(c.encode_utf8(&mut buffer));
                !had_errors
            }
        }
    }
}

/// Replace each `\n` with `line_break`
pub(crate) fn convert_line_breaks(text: &str, line_break: &str) -> String {
    if line_break == "\n" {
        text.to_string()
    } else {
        text.replace('\n', line_break)
    }
}
