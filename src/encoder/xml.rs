/*!
 * XML encoder.
 *
 * `<`, `&`, `"` and `'` are always escaped. `>` is escaped when it follows
 * `]` (so `]]>` never appears in text) or when `escape_gt` is set. Characters
 * the output encoding cannot represent become hexadecimal character
 * references.
 */

use crate::encoder::{Charset, Encoder, EncoderContext, EncoderOptions};
use crate::errors::WriterError;

/// Encoder for XML-based formats
#[derive(Debug, Clone, Default)]
pub struct XmlEncoder {
    options: EncoderOptions,
    charset: Charset,
    /// Always escape `>`
    pub escape_gt: bool,
    /// Write non-breaking spaces as `&#x00a0;`
    pub escape_nbsp: bool,
}

impl XmlEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether `>` is always escaped
    pub fn with_escape_gt(mut self, escape_gt: bool) -> Self {
        self.escape_gt = escape_gt;
        self
    }

    /// Set whether non-breaking spaces are escaped
    pub fn with_escape_nbsp(mut self, escape_nbsp: bool) -> Self {
        self.escape_nbsp = escape_nbsp;
        self
    }

    fn push_encoded(&self, out: &mut String, c: char, previous: Option<char>) {
        match c {
            '<' => out.push_str("&lt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '>' if self.escape_gt || previous == Some(']') => out.push_str("&gt;"),
            '\n' => out.push_str(&self.options.line_break),
            '\u{00A0}' if self.escape_nbsp => out.push_str("&#x00a0;"),
            _ if !self.charset.can_encode(c) => {
                out.push_str(&format!("&#x{:04x};", c as u32));
            }
            _ => out.push(c),
        }
    }
}

impl Encoder for XmlEncoder {
    fn set_options(&mut self, options: &EncoderOptions) -> Result<(), WriterError> {
        self.charset = Charset::for_label(&options.encoding)?;
        self.options = options.clone();
        Ok(())
    }

    fn encode(&self, text: &str, _context: EncoderContext) -> String {
        let mut out = String::with_capacity(text.len() + text.len() / 8);
        let mut previous = None;
        for c in text.chars() {
            self.push_encoded(&mut out, c, previous);
            previous = Some(c);
        }
        out
    }

    fn encode_char(&self, c: char, _context: EncoderContext) -> String {
        let mut out = String::new();
        self.push_encoded(&mut out, c, None);
        out
    }

    fn line_break(&self) -> &str {
        &self.options.line_break
    }

    fn encoding(&self) -> &str {
        &self.options.encoding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder(encoding: &str) -> XmlEncoder {
        let mut encoder = XmlEncoder::new();
        encoder
            .set_options(&EncoderOptions {
                encoding: encoding.to_string(),
                line_break: "\n".to_string(),
            })
            .unwrap();
        encoder
    }

    #[test]
    fn test_encode_shouldEscapeMarkupCharacters() {
        let encoded = encoder("UTF-8").encode("a<b & \"c\" 'd'>", EncoderContext::Text);
        assert_eq!(encoded, "a&lt;b &amp; &quot;c&quot; &apos;d&apos;>");
    }

    #[test]
    fn test_encode_gtAfterBracket_shouldEscape() {
        let encoded = encoder("UTF-8").encode("]]> a>b", EncoderContext::Text);
        assert_eq!(encoded, "]]&gt; a>b");
    }

    #[test]
    fn test_encode_escapeGt_shouldEscapeAll() {
        let mut encoder = encoder("UTF-8").with_escape_gt(true);
        encoder.escape_nbsp = true;
        assert_eq!(encoder.encode("a>b\u{00A0}", EncoderContext::Text), "a&gt;b&#x00a0;");
    }

    #[test]
    fn test_encode_unmappable_shouldUseCharacterReference() {
        let encoded = encoder("windows-1252").encode("é中", EncoderContext::Text);
        assert_eq!(encoded, "é&#x4e2d;");
    }
}
