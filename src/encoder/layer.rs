/*!
 * Encoder layers.
 *
 * A layer sits on top of the format encoder when the output is a bilingual
 * wrapper around the native format: already-encoded native text is escaped
 * once more for the wrapper, inline codes are wrapped in the wrapper's
 * inline tags and each segment is written as source and target.
 */

use crate::encoder::{Encoder, EncoderContext, XmlEncoder};

/// Wrapper format written around native output
pub trait EncoderLayer: Send {
    /// Escape native text for the wrapper
    fn encode(&self, text: &str, context: EncoderContext) -> String;

    /// Written before each inline code
    fn start_inline(&self) -> &str;

    /// Written after each inline code
    fn end_inline(&self) -> &str;

    /// Written before a segment's source
    fn start_segment(&self) -> &str;

    /// Written between a segment's source and target
    fn mid_segment(&self) -> &str;

    /// Written after a segment's target
    fn end_segment(&self) -> &str;
}

/// Layer built from fixed tag strings, escaping with XML rules
#[derive(Debug, Clone)]
pub struct InlineTagLayer {
    pub start_inline: String,
    pub end_inline: String,
    pub start_segment: String,
    pub mid_segment: String,
    pub end_segment: String,
    escaper: XmlEncoder,
}

impl Default for InlineTagLayer {
    fn default() -> Self {
        Self {
            start_inline: "<ph>".to_string(),
            end_inline: "</ph>".to_string(),
            start_segment: "<seg><src>".to_string(),
            mid_segment: "</src><trg>".to_string(),
            end_segment: "</trg></seg>".to_string(),
            escaper: XmlEncoder::new(),
        }
    }
}

impl EncoderLayer for InlineTagLayer {
    fn encode(&self, text: &str, context: EncoderContext) -> String {
        self.escaper.encode(text, context)
    }

    fn start_inline(&self) -> &str {
        &self.start_inline
    }

    fn end_inline(&self) -> &str {
        &self.end_inline
    }

    fn start_segment(&self) -> &str {
        &self.start_segment
    }

    fn mid_segment(&self) -> &str {
        &self.mid_segment
    }

    fn end_segment(&self) -> &str {
        &self.end_segment
    }
}
