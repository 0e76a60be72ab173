use crate::encoder::{Charset, Encoder, EncoderContext, EncoderOptions};
use crate::errors::WriterError;

/// Encoder for HTML. Escapes `<`, `&` and quotes; the output encoding
/// decides which characters become numeric references.
#[derive(Debug, Clone, Default)]
pub struct HtmlEncoder {
    options: EncoderOptions,
    charset: Charset,
}

impl HtmlEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Encoder for HtmlEncoder {
    fn set_options(&mut self, options: &EncoderOptions) -> Result<(), WriterError> {
        self.charset = Charset::for_label(&options.encoding)?;
        self.options = options.clone();
        Ok(())
    }

    fn encode(&self, text: &str, context: EncoderContext) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '<' => out.push_str("&lt;"),
                '&' => out.push_str("&amp;"),
                '"' if context != EncoderContext::Text => out.push_str("&quot;"),
                '\n' => out.push_str(&self.options.line_break),
                _ if !self.charset.can_encode(c) => out.push_str(&format!("&#{};", c as u32)),
                _ => out.push(c),
            }
        }
        out
    }

    fn line_break(&self) -> &str {
        &self.options.line_break
    }

    fn encoding(&self) -> &str {
        &self.options.encoding
    }
}
