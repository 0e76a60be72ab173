use crate::encoder::{Charset, Encoder, EncoderContext, EncoderOptions, convert_line_breaks};
use crate::errors::WriterError;

/// Encoder for Java-style properties files.
///
/// In text, backslashes, tabs and line breaks are escaped and characters the
/// output encoding cannot hold become `\uXXXX` escapes (surrogate pairs past
/// the BMP). Skeleton text only gets its line breaks converted.
#[derive(Debug, Clone, Default)]
pub struct PropertiesEncoder {
    options: EncoderOptions,
    charset: Charset,
}

impl PropertiesEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Encoder for PropertiesEncoder {
    fn set_options(&mut self, options: &EncoderOptions) -> Result<(), WriterError> {
        self.charset = Charset::for_label(&options.encoding)?;
        self.options = options.clone();
        Ok(())
    }

    fn encode(&self, text: &str, context: EncoderContext) -> String {
        if context == EncoderContext::Skeleton {
            return convert_line_breaks(text, &self.options.line_break);
        }

        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                _ if !self.charset.can_encode(c) => {
                    let mut units = [0u16; 2];
                    for unit in c.encode_utf16(&mut units) {
                        out.push_str(&format!("\\u{:04x}", unit));
                    }
                }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn latin1() -> PropertiesEncoder {
        let mut encoder = PropertiesEncoder::new();
        encoder
            .set_options(&EncoderOptions {
                encoding: "iso-8859-1".to_string(),
                line_break: "\n".to_string(),
            })
            .unwrap();
        encoder
    }

    #[test]
    fn test_encode_text_shouldEscapeSpecials() {
        assert_eq!(
            latin1().encode("a\\b\tc\nd", EncoderContext::Text),
            "a\\\\b\\tc\\nd"
        );
    }

    #[test]
    fn test_encode_unmappable_shouldUseUnicodeEscape() {
        assert_eq!(latin1().encode("中😀", EncoderContext::Text), "\\u4e2d\\ud83d\\ude00");
    }

    #[test]
    fn test_encode_skeleton_shouldKeepBackslashes() {
        assert_eq!(latin1().encode("key\\\n", EncoderContext::Skeleton), "key\\\n");
    }
}
