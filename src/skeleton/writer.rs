/*!
 * Skeleton writing.
 *
 * A skeleton writer turns the events of one document back into text. The
 * generic writer walks each resource's skeleton in part order: raw literals
 * are copied, encodable literals go through the active encoder, and
 * placeholders are resolved against the owning resource, the resource table
 * (document, sub-document and group starts) or the stored referents.
 *
 * Referents (text units, document parts and groups flagged `is_referent`)
 * are not written where they occur. The writer keeps `referent_copies`
 * clones of each and consumes one every time a skeleton references it.
 * A reference that cannot be resolved aborts the document.
 *
 * One writer handles one event stream, in document order.
 */

use std::collections::{HashMap, VecDeque};

use log::{debug, warn};

use crate::encoder::{Encoder, EncoderContext, EncoderLayer, EncoderManager, EncoderOptions};
use crate::errors::WriterError;
use crate::event::Event;
use crate::locale::LocaleId;
use crate::resource::code::Code;
use crate::resource::container::TextContainer;
use crate::resource::fragment::{Piece, TextFragment};
use crate::resource::property::{ENCODING, LANGUAGE, PropertyHolder, PropertyScope, PropertySet};
use crate::resource::{DocumentPart, Ending, StartDocument, StartGroup, StartSubDocument, TextUnit};
use crate::skeleton::generic::{GenericSkeleton, LiteralMode, Referent, SkeletonPart};
use crate::skeleton::marker::find_ref_markers;

/// Where and how a document is written
pub struct OutputContext {
    /// Locale of the output
    pub output_locale: LocaleId,
    /// Output encoding label
    pub output_encoding: String,
    /// Line break override; the document's own line break is used otherwise
    pub line_break: Option<String>,
    /// Encoders, switched by MIME type
    pub encoders: EncoderManager,
}

impl OutputContext {
    /// Context with the built-in encoders
    pub fn new(output_locale: LocaleId, output_encoding: &str) -> Self {
        Self {
            output_locale,
            output_encoding: output_encoding.to_string(),
            line_break: None,
            encoders: EncoderManager::with_defaults(),
        }
    }

    /// Override the line break
    pub fn with_line_break(mut self, line_break: &str) -> Self {
        self.line_break = Some(line_break.to_string());
        self
    }

    /// Use a specific encoder registry
    pub fn with_encoders(mut self, encoders: EncoderManager) -> Self {
        self.encoders = encoders;
        self
    }
}

/// Generic writer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Number of independent copies kept for each referent
    pub referent_copies: usize,
    /// Whether the output holds several languages; monolingual output
    /// rewrites `language` and `encoding` properties
    pub multilingual: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            referent_copies: 1,
            multilingual: false,
        }
    }
}

/// Writes the events of one document as text
pub trait SkeletonWriter: Send {
    /// Start a document; must come first
    fn process_start_document(
        &mut self,
        context: OutputContext,
        resource: &StartDocument,
    ) -> Result<String, WriterError>;

    fn process_end_document(&mut self, ending: &Ending) -> Result<String, WriterError>;

    fn process_start_subdocument(&mut self, resource: &StartSubDocument) -> Result<String, WriterError>;

    fn process_end_subdocument(&mut self, ending: &Ending) -> Result<String, WriterError>;

    fn process_start_group(&mut self, resource: &StartGroup) -> Result<String, WriterError>;

    fn process_end_group(&mut self, ending: &Ending) -> Result<String, WriterError>;

    fn process_text_unit(&mut self, resource: &TextUnit) -> Result<String, WriterError>;

    fn process_document_part(&mut self, resource: &DocumentPart) -> Result<String, WriterError>;

    /// Release everything held for the current document
    fn close(&mut self);
}

#[derive(Debug, Clone)]
enum Stored {
    TextUnit(TextUnit),
    DocumentPart(DocumentPart),
    Group(Vec<Event>),
}

struct GroupStorage {
    id: String,
    depth: usize,
    events: Vec<Event>,
}

#[derive(Clone, Copy)]
enum Owner<'a> {
    Unit(&'a TextUnit),
    Holder(&'a dyn PropertyHolder),
    Nothing,
}

struct Output {
    locale: LocaleId,
    encoding: String,
    mime_type: String,
}

/// Skeleton writer for generic skeletons
pub struct GenericSkeletonWriter {
    options: WriterOptions,
    layer: Option<Box<dyn EncoderLayer>>,
    encoders: EncoderManager,
    output: Option<Output>,
    resources: HashMap<String, PropertySet>,
    referents: HashMap<String, VecDeque<Stored>>,
    storage: Option<GroupStorage>,
}

impl Default for GenericSkeletonWriter {
    fn default() -> Self {
        Self::new(WriterOptions::default())
    }
}

impl GenericSkeletonWriter {
    pub fn new(options: WriterOptions) -> Self {
        Self {
            options: WriterOptions {
                referent_copies: options.referent_copies.max(1),
                ..options
            },
            layer: None,
            encoders: EncoderManager::new(),
            output: None,
            resources: HashMap::new(),
            referents: HashMap::new(),
            storage: None,
        }
    }

    /// Write through an encoder layer
    pub fn with_layer(mut self, layer: Box<dyn EncoderLayer>) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Settings in use
    pub fn options(&self) -> WriterOptions {
        self.options
    }

    fn output(&self) -> Result<&Output, WriterError> {
        self.output
            .as_ref()
            .ok_or_else(|| WriterError::ContractViolation("no START_DOCUMENT processed".to_string()))
    }

    fn store_referent(&mut self, id: &str, stored: Stored) {
        let copies = std::iter::repeat_n(stored, self.options.referent_copies).collect();
        debug!("Stored {} copies of referent '{}'", self.options.referent_copies, id);
        self.referents.insert(id.to_string(), copies);
    }

    fn take_referent(&mut self, id: &str) -> Result<Stored, WriterError> {
        self.referents
            .get_mut(id)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| WriterError::MissingReferent(id.to_string()))
    }

    /// Record an event in the active group storage; false when not storing
    fn push_stored(&mut self, event: impl FnOnce() -> Event) -> bool {
        let Some(storage) = self.storage.as_mut() else {
            return false;
        };
        let event = event();
        match &event {
            Event::StartGroup(_) => storage.depth += 1,
            Event::EndGroup(_) => storage.depth -= 1,
            _ => {}
        }
        storage.events.push(event);

        if storage.depth == 0 {
            if let Some(done) = self.storage.take() {
                self.store_referent(&done.id, Stored::Group(done.events));
            }
        }
        true
    }

    fn dispatch(&mut self, event: &Event) -> Result<String, WriterError> {
        match event {
            Event::StartSubDocument(ssd) => self.process_start_subdocument(ssd),
            Event::EndSubDocument(ending) => self.process_end_subdocument(ending),
            Event::StartGroup(sg) => self.process_start_group(sg),
            Event::EndGroup(ending) => self.process_end_group(ending),
            Event::TextUnit(tu) => self.process_text_unit(tu),
            Event::DocumentPart(dp) => self.process_document_part(dp),
            Event::StartDocument(_) | Event::EndDocument(_) => Err(WriterError::ContractViolation(
                format!("{} inside a stored group", event.event_type()),
            )),
            _ => Ok(String::new()),
        }
    }

    fn render_stored(&mut self, stored: Stored) -> Result<String, WriterError> {
        match stored {
            Stored::TextUnit(tu) => self.render_text_unit(&tu),
            Stored::DocumentPart(dp) => self.render_document_part(&dp),
            Stored::Group(events) => {
                let mut out = String::new();
                let mut events = events.into_iter();
                if let Some(Event::StartGroup(sg)) = events.next() {
                    out.push_str(&self.render_start_group(&sg)?);
                }
                for event in events {
                    out.push_str(&self.dispatch(&event)?);
                }
                Ok(out)
            }
        }
    }

    fn render_start_group(&mut self, sg: &StartGroup) -> Result<String, WriterError> {
        self.resources.insert(sg.id.clone(), sg.properties.clone());
        self.render_optional(sg.skeleton.as_ref(), Owner::Holder(sg))
    }

    fn render_document_part(&mut self, dp: &DocumentPart) -> Result<String, WriterError> {
        self.render_optional(dp.skeleton.as_ref(), Owner::Holder(dp))
    }

    fn render_text_unit(&mut self, tu: &TextUnit) -> Result<String, WriterError> {
        let switched = match &tu.mime_type {
            Some(mime) => {
                self.encoders.update_encoder(mime)?;
                true
            }
            None => false,
        };

        let result = match &tu.skeleton {
            Some(skeleton) => self.render_skeleton(skeleton, Owner::Unit(tu)),
            None => self.render_content(tu, None),
        };

        if switched {
            let mime = self.output()?.mime_type.clone();
            self.encoders.update_encoder(&mime)?;
        }
        result
    }

    fn render_optional(
        &mut self,
        skeleton: Option<&GenericSkeleton>,
        owner: Owner<'_>,
    ) -> Result<String, WriterError> {
        match skeleton {
            Some(skeleton) => self.render_skeleton(skeleton, owner),
            None => Ok(String::new()),
        }
    }

    fn render_skeleton(
        &mut self,
        skeleton: &GenericSkeleton,
        owner: Owner<'_>,
    ) -> Result<String, WriterError> {
        let mut out = String::new();
        for part in skeleton.parts() {
            match part.as_ref() {
                SkeletonPart::Literal {
                    text,
                    mode: LiteralMode::Raw,
                } => out.push_str(text),
                SkeletonPart::Literal {
                    text,
                    mode: LiteralMode::Encodable,
                } => out.push_str(&self.encoders.encode(text, EncoderContext::Skeleton)),
                SkeletonPart::Content { referent, locale } => {
                    let rendered = match referent {
                        Referent::Owner => match owner {
                            Owner::Unit(tu) => self.render_content(tu, locale.as_ref())?,
                            _ => {
                                return Err(WriterError::ContractViolation(
                                    "content placeholder outside a text unit".to_string(),
                                ));
                            }
                        },
                        Referent::Id(id) => match self.take_referent(id)? {
                            Stored::TextUnit(tu) => self.render_content(&tu, locale.as_ref())?,
                            _ => {
                                return Err(WriterError::ContractViolation(format!(
                                    "content placeholder refers to '{}', which is not a text unit",
                                    id
                                )));
                            }
                        },
                    };
                    out.push_str(&rendered);
                }
                SkeletonPart::Value {
                    referent,
                    property,
                    scope,
                } => out.push_str(&self.render_value(referent, property, scope, owner)?),
                SkeletonPart::Reference { id } => {
                    let stored = self.take_referent(id)?;
                    out.push_str(&self.render_stored(stored)?);
                }
            }
        }
        Ok(out)
    }

    fn lookup_value(
        &self,
        referent: &Referent,
        property: &str,
        scope: &PropertyScope,
        owner: Owner<'_>,
    ) -> Result<Option<(String, bool)>, WriterError> {
        let found = |holder: &dyn PropertyHolder| {
            holder
                .lookup_property(property, scope)
                .map(|(p, from_source)| (p.value.clone(), from_source))
        };

        match referent {
            Referent::Owner => match owner {
                Owner::Unit(tu) => Ok(found(tu)),
                Owner::Holder(holder) => Ok(found(holder)),
                Owner::Nothing => Err(WriterError::ContractViolation(format!(
                    "value placeholder '{}' has no owner",
                    property
                ))),
            },
            Referent::Id(id) => {
                if let Some(set) = self.resources.get(id) {
                    return Ok(found(set));
                }
                match self.referents.get(id).and_then(VecDeque::front) {
                    Some(Stored::TextUnit(tu)) => Ok(found(tu)),
                    Some(Stored::DocumentPart(dp)) => Ok(found(dp)),
                    Some(Stored::Group(events)) => match events.first() {
                        Some(Event::StartGroup(sg)) => Ok(found(&**sg)),
                        _ => Ok(None),
                    },
                    None => Err(WriterError::MissingReferent(id.clone())),
                }
            }
        }
    }

    fn render_value(
        &self,
        referent: &Referent,
        property: &str,
        scope: &PropertyScope,
        owner: Owner<'_>,
    ) -> Result<String, WriterError> {
        let Some((value, from_source)) = self.lookup_value(referent, property, scope, owner)? else {
            warn!(
                "Property '{}' not found on '{}', writing an empty value",
                property,
                referent.marker_id()
            );
            return Ok(String::new());
        };

        let output = self.output()?;
        let value = if !self.options.multilingual && from_source {
            match property {
                LANGUAGE => output.locale.to_string(),
                ENCODING => output.encoding.clone(),
                _ => value,
            }
        } else {
            value
        };
        Ok(self.encoders.to_native(property, &value))
    }

    fn render_content(&mut self, tu: &TextUnit, locale: Option<&LocaleId>) -> Result<String, WriterError> {
        let output_locale = self.output()?.locale.clone();
        let source = tu.source();

        if !tu.translatable {
            return self.render_container(source, Owner::Unit(tu));
        }

        let target = match locale {
            Some(locale) => tu.target(locale),
            None if self.options.multilingual => None,
            None => tu.target(&output_locale),
        };

        match target {
            Some(target) if self.layer.is_some() && locale.is_none() => {
                self.render_bilingual(source, target, Owner::Unit(tu))
            }
            Some(target) => self.render_container(target, Owner::Unit(tu)),
            None => self.render_container(source, Owner::Unit(tu)),
        }
    }

    fn render_container(&mut self, container: &TextContainer, owner: Owner<'_>) -> Result<String, WriterError> {
        let mut out = String::new();
        let content = container.content();
        for piece in content.pieces() {
            match piece {
                Piece::Text(text) => out.push_str(&self.encode_text(text)),
                Piece::Code(index) => {
                    if let Some(code) = content.code(index) {
                        out.push_str(&self.expand_code(code, owner)?);
                    }
                }
                Piece::Segment(index) => {
                    if let Some(segment) = container.segments().get(index) {
                        out.push_str(&self.render_fragment(&segment.text, owner)?);
                    }
                }
            }
        }
        Ok(out)
    }

    fn render_fragment(&mut self, fragment: &TextFragment, owner: Owner<'_>) -> Result<String, WriterError> {
        let mut out = String::new();
        for piece in fragment.pieces() {
            match piece {
                Piece::Text(text) => out.push_str(&self.encode_text(text)),
                Piece::Code(index) => {
                    if let Some(code) = fragment.code(index) {
                        out.push_str(&self.expand_code(code, owner)?);
                    }
                }
                Piece::Segment(_) => {}
            }
        }
        Ok(out)
    }

    fn render_bilingual(
        &mut self,
        source: &TextContainer,
        target: &TextContainer,
        owner: Owner<'_>,
    ) -> Result<String, WriterError> {
        let (start, mid, end) = match &self.layer {
            Some(layer) => (
                layer.start_segment().to_string(),
                layer.mid_segment().to_string(),
                layer.end_segment().to_string(),
            ),
            None => return self.render_container(target, owner),
        };

        if !source.is_segmented() {
            let source_text = self.render_container(source, owner)?;
            let target_text = self.render_container(target, owner)?;
            return Ok(format!("{}{}{}{}{}", start, source_text, mid, target_text, end));
        }

        let mut out = String::new();
        let content = source.content();
        for piece in content.pieces() {
            match piece {
                Piece::Text(text) => out.push_str(&self.encode_text(text)),
                Piece::Code(index) => {
                    if let Some(code) = content.code(index) {
                        out.push_str(&self.expand_code(code, owner)?);
                    }
                }
                Piece::Segment(index) => {
                    let Some(segment) = source.segments().get(index) else {
                        continue;
                    };
                    out.push_str(&start);
                    out.push_str(&self.render_fragment(&segment.text, owner)?);
                    out.push_str(&mid);
                    match target.segment(&segment.id) {
                        Some(translated) => out.push_str(&self.render_fragment(&translated.text, owner)?),
                        None => {
                            warn!("Segment '{}' has no target, writing the source", segment.id);
                            out.push_str(&self.render_fragment(&segment.text, owner)?);
                        }
                    }
                    out.push_str(&end);
                }
            }
        }
        Ok(out)
    }

    fn encode_text(&self, text: &str) -> String {
        let encoded = self.encoders.encode(text, EncoderContext::Text);
        match &self.layer {
            Some(layer) => layer.encode(&encoded, EncoderContext::Text),
            None => encoded,
        }
    }

    fn expand_code(&mut self, code: &Code, owner: Owner<'_>) -> Result<String, WriterError> {
        let data = if code.has_reference() {
            self.resolve_references(code.outer_data(), owner)?
        } else {
            code.outer_data().to_string()
        };

        Ok(match &self.layer {
            Some(layer) => format!(
                "{}{}{}",
                layer.start_inline(),
                layer.encode(&data, EncoderContext::Inline),
                layer.end_inline()
            ),
            None => data,
        })
    }

    fn resolve_references(&mut self, data: &str, owner: Owner<'_>) -> Result<String, WriterError> {
        let markers = find_ref_markers(data);
        if markers.is_empty() {
            return Ok(data.to_string());
        }

        let mut out = String::with_capacity(data.len());
        let mut last = 0;
        for marker in markers {
            out.push_str(&data[last..marker.start]);
            let referent = if marker.is_self() {
                Referent::Owner
            } else {
                Referent::Id(marker.id.clone())
            };
            match &marker.property {
                Some(property) => {
                    out.push_str(&self.render_value(&referent, property, &PropertyScope::Source, owner)?);
                }
                None => {
                    let stored = self.take_referent(&marker.id)?;
                    out.push_str(&self.render_stored(stored)?);
                }
            }
            last = marker.end;
        }
        out.push_str(&data[last..]);
        Ok(out)
    }
}

impl SkeletonWriter for GenericSkeletonWriter {
    fn process_start_document(
        &mut self,
        context: OutputContext,
        resource: &StartDocument,
    ) -> Result<String, WriterError> {
        let OutputContext {
            output_locale,
            output_encoding,
            line_break,
            mut encoders,
        } = context;

        encoders.set_default_options(EncoderOptions {
            encoding: output_encoding.clone(),
            line_break: line_break.unwrap_or_else(|| resource.line_break.clone()),
        });
        encoders.update_encoder(&resource.mime_type)?;
        self.encoders = encoders;

        debug!(
            "Writing document '{}' as {} in {}",
            resource.id, output_locale, output_encoding
        );
        self.output = Some(Output {
            locale: output_locale,
            encoding: output_encoding,
            mime_type: resource.mime_type.clone(),
        });
        self.resources.insert(resource.id.clone(), resource.properties.clone());
        self.render_optional(resource.skeleton.as_ref(), Owner::Holder(resource))
    }

    fn process_end_document(&mut self, ending: &Ending) -> Result<String, WriterError> {
        if let Some(storage) = &self.storage {
            return Err(WriterError::ContractViolation(format!(
                "group '{}' not closed before END_DOCUMENT",
                storage.id
            )));
        }
        let out = self.render_optional(ending.skeleton.as_ref(), Owner::Nothing)?;
        let unused: Vec<&String> = self
            .referents
            .iter()
            .filter(|(_, copies)| copies.len() == self.options.referent_copies)
            .map(|(id, _)| id)
            .collect();
        if !unused.is_empty() {
            warn!("Referents never referenced: {:?}", unused);
        }
        Ok(out)
    }

    fn process_start_subdocument(&mut self, resource: &StartSubDocument) -> Result<String, WriterError> {
        self.output()?;
        if self.push_stored(|| Event::StartSubDocument(Box::new(resource.clone()))) {
            return Ok(String::new());
        }
        self.resources.insert(resource.id.clone(), resource.properties.clone());
        self.render_optional(resource.skeleton.as_ref(), Owner::Holder(resource))
    }

    fn process_end_subdocument(&mut self, ending: &Ending) -> Result<String, WriterError> {
        if self.push_stored(|| Event::EndSubDocument(ending.clone())) {
            return Ok(String::new());
        }
        self.render_optional(ending.skeleton.as_ref(), Owner::Nothing)
    }

    fn process_start_group(&mut self, resource: &StartGroup) -> Result<String, WriterError> {
        self.output()?;
        if self.push_stored(|| Event::StartGroup(Box::new(resource.clone()))) {
            return Ok(String::new());
        }
        if resource.is_referent {
            self.storage = Some(GroupStorage {
                id: resource.id.clone(),
                depth: 1,
                events: vec![Event::StartGroup(Box::new(resource.clone()))],
            });
            return Ok(String::new());
        }
        self.render_start_group(resource)
    }

    fn process_end_group(&mut self, ending: &Ending) -> Result<String, WriterError> {
        if self.push_stored(|| Event::EndGroup(ending.clone())) {
            return Ok(String::new());
        }
        self.render_optional(ending.skeleton.as_ref(), Owner::Nothing)
    }

    fn process_text_unit(&mut self, resource: &TextUnit) -> Result<String, WriterError> {
        self.output()?;
        if self.push_stored(|| Event::text_unit(resource.clone())) {
            return Ok(String::new());
        }
        if resource.is_referent {
            self.store_referent(&resource.id, Stored::TextUnit(resource.clone()));
            return Ok(String::new());
        }
        self.render_text_unit(resource)
    }

    fn process_document_part(&mut self, resource: &DocumentPart) -> Result<String, WriterError> {
        self.output()?;
        if self.push_stored(|| Event::document_part(resource.clone())) {
            return Ok(String::new());
        }
        if resource.is_referent {
            self.store_referent(&resource.id, Stored::DocumentPart(resource.clone()));
            return Ok(String::new());
        }
        self.render_document_part(resource)
    }

    fn close(&mut self) {
        self.output = None;
        self.resources.clear();
        self.referents.clear();
        self.storage = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::InlineTagLayer;
    use crate::resource::code::TagType;
    use crate::resource::property::Property;

    fn en() -> LocaleId {
        LocaleId::new("en").unwrap()
    }

    fn fr() -> LocaleId {
        LocaleId::new("fr").unwrap()
    }

    fn start(writer: &mut GenericSkeletonWriter, locale: LocaleId, mime: &str) -> String {
        let sd = StartDocument::new("sd1", en(), "test", mime);
        writer
            .process_start_document(OutputContext::new(locale, "UTF-8"), &sd)
            .unwrap()
    }

    fn hello_world() -> TextFragment {
        let mut fragment = TextFragment::from_text("Hello ");
        fragment.append_tag(TagType::Opening, "b", "<b>").unwrap();
        fragment.append_text("World");
        fragment.append_tag(TagType::Closing, "b", "</b>").unwrap();
        fragment.append_text("!");
        fragment
    }

    fn unit_with_placeholder(id: &str, fragment: TextFragment) -> TextUnit {
        let mut skeleton = GenericSkeleton::from_text("<p>");
        skeleton.add_content_placeholder(Referent::Owner, None);
        skeleton.append("</p>");
        TextUnit::with_source(id, TextContainer::from(fragment)).with_skeleton(skeleton)
    }

    #[test]
    fn test_processTextUnit_shouldRebuildCodes() {
        let mut writer = GenericSkeletonWriter::default();
        start(&mut writer, en(), "text/plain");
        let tu = unit_with_placeholder("tu1", hello_world());
        assert_eq!(writer.process_text_unit(&tu).unwrap(), "<p>Hello <b>World</b>!</p>");
    }

    #[test]
    fn test_processTextUnit_withMissingTarget_shouldFallBackToSource() {
        let mut writer = GenericSkeletonWriter::default();
        start(&mut writer, fr(), "text/plain");
        let tu = unit_with_placeholder("tu1", TextFragment::from_text("Hello"));
        assert_eq!(writer.process_text_unit(&tu).unwrap(), "<p>Hello</p>");
    }

    #[test]
    fn test_processTextUnit_withTarget_shouldWriteTarget() {
        let mut writer = GenericSkeletonWriter::default();
        start(&mut writer, fr(), "text/xml");
        let mut tu = unit_with_placeholder("tu1", TextFragment::from_text("Hello"));
        tu.set_target(fr(), TextContainer::from_text("Bonjour & merci"));
        assert_eq!(writer.process_text_unit(&tu).unwrap(), "<p>Bonjour &amp; merci</p>");
    }

    #[test]
    fn test_processTextUnit_nonTranslatable_shouldWriteSource() {
        let mut writer = GenericSkeletonWriter::default();
        start(&mut writer, fr(), "text/plain");
        let mut tu = unit_with_placeholder("tu1", TextFragment::from_text("Hello"));
        tu.translatable = false;
        tu.set_target(fr(), TextContainer::from_text("Bonjour"));
        assert_eq!(writer.process_text_unit(&tu).unwrap(), "<p>Hello</p>");
    }

    #[test]
    fn test_processTextUnit_segmented_shouldWriteSegmentsInOrder() {
        let mut writer = GenericSkeletonWriter::default();
        start(&mut writer, en(), "text/plain");
        let mut tu = TextUnit::new("tu1", "One. Two.");
        tu.source_mut().create_segments(&[(0, Some(4)), (5, None)]).unwrap();
        assert_eq!(writer.process_text_unit(&tu).unwrap(), "One. Two.");
    }

    #[test]
    fn test_reference_toReferent_shouldRenderInPlace() {
        let mut writer = GenericSkeletonWriter::default();
        start(&mut writer, en(), "text/plain");

        let mut note = TextUnit::new("tu2", "a note");
        note.is_referent = true;
        assert_eq!(writer.process_text_unit(&note).unwrap(), "");

        let mut fragment = TextFragment::from_text("Text");
        fragment
            .append_code(Code::new(TagType::Isolated, "fn", "<fn>[#$tu2]</fn>").with_reference())
            .unwrap();
        let tu = unit_with_placeholder("tu1", fragment);
        assert_eq!(writer.process_text_unit(&tu).unwrap(), "<p>Text<fn>a note</fn></p>");
    }

    #[test]
    fn test_reference_missing_shouldBeFatal() {
        let mut writer = GenericSkeletonWriter::default();
        start(&mut writer, en(), "text/plain");
        let mut skeleton = GenericSkeleton::new();
        skeleton.add_reference("nowhere");
        let dp = DocumentPart::new("dp1", skeleton);
        assert!(matches!(
            writer.process_document_part(&dp),
            Err(WriterError::MissingReferent(id)) if id == "nowhere"
        ));
    }

    #[test]
    fn test_reference_withTwoCopies_shouldResolveTwice() {
        let mut writer = GenericSkeletonWriter::new(WriterOptions {
            referent_copies: 2,
            multilingual: false,
        });
        start(&mut writer, en(), "text/plain");
        let mut part = DocumentPart::new("dp2", GenericSkeleton::from_text("[x]"));
        part.is_referent = true;
        writer.process_document_part(&part).unwrap();

        let mut skeleton = GenericSkeleton::new();
        skeleton.add_reference("dp2");
        skeleton.add_reference("dp2");
        let dp = DocumentPart::new("dp1", skeleton.clone());
        assert_eq!(writer.process_document_part(&dp).unwrap(), "[x][x]");
        assert!(writer.process_document_part(&DocumentPart::new("dp3", skeleton)).is_err());
    }

    #[test]
    fn test_referentGroup_shouldBeStoredUntilReferenced() {
        let mut writer = GenericSkeletonWriter::default();
        start(&mut writer, en(), "text/plain");

        let mut group = StartGroup::new("g1");
        group.is_referent = true;
        group.skeleton = Some(GenericSkeleton::from_text("<ul>"));
        let mut end = Ending::new("g1");
        end.skeleton = Some(GenericSkeleton::from_text("</ul>"));
        let item = unit_with_placeholder("tu1", TextFragment::from_text("item"));

        assert_eq!(writer.process_start_group(&group).unwrap(), "");
        assert_eq!(writer.process_text_unit(&item).unwrap(), "");
        assert_eq!(writer.process_end_group(&end).unwrap(), "");

        let mut skeleton = GenericSkeleton::from_text("before ");
        skeleton.add_reference("g1");
        let dp = DocumentPart::new("dp1", skeleton);
        assert_eq!(
            writer.process_document_part(&dp).unwrap(),
            "before <ul><p>item</p></ul>"
        );
    }

    #[test]
    fn test_valuePlaceholder_language_shouldUseOutputLocale() {
        let mut writer = GenericSkeletonWriter::default();
        let mut sd = StartDocument::new("sd1", en(), "test", "text/html");
        sd.properties.source.set(Property::new(LANGUAGE, "en"));
        let mut skeleton = GenericSkeleton::from_text("<html lang=\"");
        skeleton.add_value_placeholder(Referent::Owner, LANGUAGE, PropertyScope::Source);
        skeleton.append("\">");
        sd.skeleton = Some(skeleton);

        let out = writer
            .process_start_document(OutputContext::new(fr(), "UTF-8"), &sd)
            .unwrap();
        assert_eq!(out, "<html lang=\"fr\">");
    }

    #[test]
    fn test_valuePlaceholder_multilingual_shouldKeepSourceLanguage() {
        let mut writer = GenericSkeletonWriter::new(WriterOptions {
            referent_copies: 1,
            multilingual: true,
        });
        let mut sd = StartDocument::new("sd1", en(), "test", "text/xml");
        sd.properties.source.set(Property::new(LANGUAGE, "en"));
        let mut skeleton = GenericSkeleton::new();
        skeleton.add_value_placeholder(Referent::Id("sd1".to_string()), LANGUAGE, PropertyScope::Source);
        sd.skeleton = Some(skeleton);

        let out = writer
            .process_start_document(OutputContext::new(fr(), "UTF-8"), &sd)
            .unwrap();
        assert_eq!(out, "en");
    }

    #[test]
    fn test_valuePlaceholder_missingProperty_shouldWriteEmpty() {
        let mut writer = GenericSkeletonWriter::default();
        start(&mut writer, en(), "text/plain");
        let mut skeleton = GenericSkeleton::from_text("[");
        skeleton.add_value_placeholder(Referent::Owner, "href", PropertyScope::Resource);
        skeleton.append("]");
        let dp = DocumentPart::new("dp1", skeleton);
        assert_eq!(writer.process_document_part(&dp).unwrap(), "[]");
    }

    #[test]
    fn test_layer_withTarget_shouldWriteSourceAndTarget() {
        let mut writer = GenericSkeletonWriter::default().with_layer(Box::new(InlineTagLayer::default()));
        start(&mut writer, fr(), "text/plain");

        let mut tu = TextUnit::with_source("tu1", TextContainer::from(hello_world()));
        let mut target = TextFragment::from_text("Bonjour ");
        target.append_tag(TagType::Isolated, "br", "<br/>").unwrap();
        tu.set_target(fr(), TextContainer::from(target));

        assert_eq!(
            writer.process_text_unit(&tu).unwrap(),
            "<seg><src>Hello <ph>&lt;b></ph>World<ph>&lt;/b></ph>!</src>\
             <trg>Bonjour <ph>&lt;br/></ph></trg></seg>"
        );
    }

    #[test]
    fn test_processTextUnit_beforeStartDocument_shouldViolateContract() {
        let mut writer = GenericSkeletonWriter::default();
        let tu = TextUnit::new("tu1", "x");
        assert!(matches!(
            writer.process_text_unit(&tu),
            Err(WriterError::ContractViolation(_))
        ));
    }
}
