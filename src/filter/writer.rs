/*!
 * Filter writers.
 *
 * A filter writer receives the events of a document, renders them with a
 * skeleton writer and stores the encoded result in its output target when
 * the document ends.
 */

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;

use crate::errors::WriterError;
use crate::event::Event;
use crate::file_utils::FileManager;
use crate::locale::LocaleId;
use crate::resource::StartDocument;
use crate::skeleton::{OutputContext, SkeletonWriter};

/// In-memory output shared with the caller
pub type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// Where a filter writer puts the finished document
#[derive(Debug, Clone)]
pub enum OutputTarget {
    /// File, parent directories are created
    Path(PathBuf),
    /// Shared buffer, replaced by each document
    Buffer(SharedBuffer),
}

impl OutputTarget {
    /// New buffer target and the handle to read it back
    pub fn buffer() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::Buffer(Arc::clone(&buffer)), buffer)
    }
}

/// Writes events back into a document
pub trait FilterWriter: Send {
    fn name(&self) -> &str;

    /// Output locale, and output encoding when it differs from the input's
    fn set_options(&mut self, output_locale: LocaleId, output_encoding: Option<String>);

    /// Line break replacing the document's own
    fn set_line_break(&mut self, line_break: Option<String>);

    fn set_output(&mut self, target: OutputTarget);

    /// Handle one event; the document is stored at `END_DOCUMENT`
    fn handle_event(&mut self, event: &Event) -> Result<(), WriterError>;

    /// Drop any unfinished document
    fn close(&mut self);
}

/// Filter writer driving a skeleton writer
pub struct GenericFilterWriter {
    skeleton_writer: Box<dyn SkeletonWriter>,
    output_locale: Option<LocaleId>,
    output_encoding: Option<String>,
    line_break: Option<String>,
    target: Option<OutputTarget>,
    buffer: String,
    encoding_in_use: String,
    write_bom: bool,
    in_document: bool,
}

impl GenericFilterWriter {
    pub fn new(skeleton_writer: Box<dyn SkeletonWriter>) -> Self {
        Self {
            skeleton_writer,
            output_locale: None,
            output_encoding: None,
            line_break: None,
            target: None,
            buffer: String::new(),
            encoding_in_use: "UTF-8".to_string(),
            write_bom: false,
            in_document: false,
        }
    }

    /// UTF-8 keeps the input's BOM. UTF-16 keeps the input's choice when the
    /// encoding is unchanged and always gets a BOM when converted to.
    fn needs_bom(sd: &StartDocument, output_encoding: &str) -> bool {
        let Ok(output) = FileManager::encoding_for_label(output_encoding) else {
            return false;
        };
        if output == encoding_rs::UTF_8 {
            return sd.has_utf8_bom;
        }
        if output == encoding_rs::UTF_16LE || output == encoding_rs::UTF_16BE {
            let unchanged = FileManager::encoding_for_label(&sd.encoding).is_ok_and(|e| e == output);
            return sd.has_bom || !unchanged;
        }
        false
    }

    fn flush(&mut self) -> Result<(), WriterError> {
        let bytes = FileManager::encode_text(&self.buffer, &self.encoding_in_use, self.write_bom)
            .map_err(|_| WriterError::UnsupportedEncoding(self.encoding_in_use.clone()))?;

        match &self.target {
            Some(OutputTarget::Path(path)) => {
                FileManager::write_output(path, &bytes)
                    .map_err(|e| WriterError::Io(std::io::Error::other(format!("{:#}", e))))?;
                info!("Wrote {} bytes to {:?}", bytes.len(), path);
            }
            Some(OutputTarget::Buffer(buffer)) => {
                *buffer.lock() = bytes;
            }
            None => {
                return Err(WriterError::ContractViolation("no output target set".to_string()));
            }
        }
        self.buffer.clear();
        Ok(())
    }
}

impl FilterWriter for GenericFilterWriter {
    fn name(&self) -> &str {
        "generic"
    }

    fn set_options(&mut self, output_locale: LocaleId, output_encoding: Option<String>) {
        self.output_locale = Some(output_locale);
        self.output_encoding = output_encoding;
    }

    fn set_line_break(&mut self, line_break: Option<String>) {
        self.line_break = line_break;
    }

    fn set_output(&mut self, target: OutputTarget) {
        self.target = Some(target);
    }

    fn handle_event(&mut self, event: &Event) -> Result<(), WriterError> {
        let rendered = match event {
            Event::StartDocument(sd) => {
                if self.target.is_none() {
                    return Err(WriterError::ContractViolation("no output target set".to_string()));
                }
                let locale = self.output_locale.clone().ok_or_else(|| {
                    WriterError::ContractViolation("no output locale set".to_string())
                })?;
                self.encoding_in_use = self
                    .output_encoding
                    .clone()
                    .unwrap_or_else(|| sd.encoding.clone());
                self.write_bom = Self::needs_bom(sd, &self.encoding_in_use);
                self.buffer.clear();
                self.in_document = true;

                let mut context = OutputContext::new(locale, &self.encoding_in_use);
                context.line_break = self.line_break.clone();
                self.skeleton_writer.process_start_document(context, sd)?
            }
            Event::StartSubDocument(ssd) => self.skeleton_writer.process_start_subdocument(ssd)?,
            Event::EndSubDocument(ending) => self.skeleton_writer.process_end_subdocument(ending)?,
            Event::StartGroup(sg) => self.skeleton_writer.process_start_group(sg)?,
            Event::EndGroup(ending) => self.skeleton_writer.process_end_group(ending)?,
            Event::TextUnit(tu) => self.skeleton_writer.process_text_unit(tu)?,
            Event::DocumentPart(dp) => self.skeleton_writer.process_document_part(dp)?,
            Event::EndDocument(ending) => {
                let tail = self.skeleton_writer.process_end_document(ending)?;
                self.buffer.push_str(&tail);
                self.flush()?;
                self.skeleton_writer.close();
                self.in_document = false;
                return Ok(());
            }
            Event::Canceled => {
                debug!("Document canceled, discarding {} bytes of output", self.buffer.len());
                self.close();
                return Ok(());
            }
            _ => return Ok(()),
        };
        self.buffer.push_str(&rendered);
        Ok(())
    }

    fn close(&mut self) {
        if self.in_document {
            self.skeleton_writer.close();
            self.in_document = false;
        }
        self.buffer.clear();
    }
}
