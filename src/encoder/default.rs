use crate::encoder::{Encoder, EncoderContext, EncoderOptions, convert_line_breaks};
use crate::errors::WriterError;

/// Encoder for formats without escaping rules: only line breaks change
#[derive(Debug, Clone, Default)]
pub struct DefaultEncoder {
    options: EncoderOptions,
}

impl DefaultEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Encoder for DefaultEncoder {
    fn set_options(&mut self, options: &EncoderOptions) -> Result<(), WriterError> {
        self.options = options.clone();
        Ok(())
    }

    fn encode(&self, text: &str, _context: EncoderContext) -> String {
        convert_line_breaks(text, &self.options.line_break)
    }

    fn line_break(&self) -> &str {
        &self.options.line_break
    }

    fn encoding(&self) -> &str {
        &self.options.encoding
    }
}
