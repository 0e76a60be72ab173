/*!
 * Encoder registry.
 *
 * Maps MIME types to encoder factories and keeps one active encoder, the
 * one for the MIME type of the resource being written. With no encoder
 * active, text passes through unchanged.
 */

use std::collections::HashMap;

use log::debug;

use crate::encoder::{
    DefaultEncoder, Encoder, EncoderContext, EncoderOptions, HtmlEncoder, PropertiesEncoder,
    XmlEncoder,
};
use crate::errors::WriterError;

/// Builds a fresh encoder
pub type EncoderFactory = fn() -> Box<dyn Encoder>;

/// MIME type to encoder registry with one active encoder
pub struct EncoderManager {
    factories: HashMap<String, EncoderFactory>,
    options: EncoderOptions,
    mime_type: Option<String>,
    encoder: Option<Box<dyn Encoder>>,
}

impl Default for EncoderManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderManager {
    /// Create a manager with no mappings
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            options: EncoderOptions::default(),
            mime_type: None,
            encoder: None,
        }
    }

    /// Create a manager with the built-in mappings
    pub fn with_defaults() -> Self {
        let mut manager = Self::new();
        manager.add_mapping("text/plain", || Box::new(DefaultEncoder::new()));
        manager.add_mapping("text/xml", || Box::new(XmlEncoder::new()));
        manager.add_mapping("application/xml", || Box::new(XmlEncoder::new()));
        manager.add_mapping("application/x-xliff+xml", || Box::new(XmlEncoder::new()));
        manager.add_mapping("text/html", || Box::new(HtmlEncoder::new()));
        manager.add_mapping("text/x-properties", || Box::new(PropertiesEncoder::new()));
        manager
    }

    /// Register or replace the encoder for a MIME type
    pub fn add_mapping(&mut self, mime_type: &str, factory: EncoderFactory) {
        self.factories.insert(mime_type.to_string(), factory);
    }

    /// Remove the mapping for a MIME type
    pub fn remove_mapping(&mut self, mime_type: &str) {
        self.factories.remove(mime_type);
    }

    /// Whether a MIME type has an encoder
    pub fn has_mapping(&self, mime_type: &str) -> bool {
        self.factories.contains_key(mime_type)
    }

    /// Options given to every encoder the manager creates
    pub fn set_default_options(&mut self, options: EncoderOptions) {
        self.options = options;
    }

    /// MIME type of the active encoder
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Whether an encoder is active
    pub fn has_encoder(&self) -> bool {
        self.encoder.is_some()
    }

    /// Switch to the encoder for `mime_type`; a no-op if it is already active
    pub fn update_encoder(&mut self, mime_type: &str) -> Result<(), WriterError> {
        if self.mime_type.as_deref() == Some(mime_type) {
            return Ok(());
        }
        self.mime_type = Some(mime_type.to_string());
        self.encoder = match self.factories.get(mime_type) {
            Some(factory) => {
                let mut encoder = factory();
                encoder.set_options(&self.options)?;
                debug!("Encoder for '{}' is now active", mime_type);
                Some(encoder)
            }
            None => {
                debug!("No encoder registered for '{}', text is written as is", mime_type);
                None
            }
        };
        Ok(())
    }
}

impl Encoder for EncoderManager {
    fn set_options(&mut self, options: &EncoderOptions) -> Result<(), WriterError> {
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.set_options(options)?;
        }
        self.options = options.clone();
        Ok(())
    }

    fn encode(&self, text: &str, context: EncoderContext) -> String {
        match &self.encoder {
            Some(encoder) => encoder.encode(text, context),
            None => text.to_string(),
        }
    }

    fn encode_char(&self, c: char, context: EncoderContext) -> String {
        match &self.encoder {
            Some(encoder) => encoder.encode_char(c, context),
            None => c.to_string(),
        }
    }

    fn to_native(&self, property: &str, value: &str) -> String {
        match &self.encoder {
            Some(encoder) => encoder.to_native(property, value),
            None => value.to_string(),
        }
    }

    fn line_break(&self) -> &str {
        &self.options.line_break
    }

    fn encoding(&self) -> &str {
        &self.options.encoding
    }
}
