/*!
 * Events: the unit of communication between filters, steps and writers.
 *
 * An event is a tagged union of an event type and the resource it carries.
 * Typed accessors return an error when asked for a resource of another
 * kind; using them on the wrong event is a contract violation.
 */

use std::fmt;

use crate::errors::EventError;
use crate::resource::{
    DocumentPart, Ending, RawDocument, StartDocument, StartGroup, StartSubDocument, TextUnit,
};

/// Kind of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventType {
    Start,
    StartDocument,
    StartSubDocument,
    StartGroup,
    TextUnit,
    DocumentPart,
    EndGroup,
    EndSubDocument,
    EndDocument,
    Finished,
    NoOp,
    RawDocument,
    Canceled,
}

impl EventType {
    /// Upper-case name as used in logs
    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::StartDocument => "START_DOCUMENT",
            Self::StartSubDocument => "START_SUBDOCUMENT",
            Self::StartGroup => "START_GROUP",
            Self::TextUnit => "TEXT_UNIT",
            Self::DocumentPart => "DOCUMENT_PART",
            Self::EndGroup => "END_GROUP",
            Self::EndSubDocument => "END_SUBDOCUMENT",
            Self::EndDocument => "END_DOCUMENT",
            Self::Finished => "FINISHED",
            Self::NoOp => "NO_OP",
            Self::RawDocument => "RAW_DOCUMENT",
            Self::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event and its resource
#[derive(Debug, Clone)]
pub enum Event {
    Start,
    StartDocument(Box<StartDocument>),
    StartSubDocument(Box<StartSubDocument>),
    StartGroup(Box<StartGroup>),
    TextUnit(Box<TextUnit>),
    DocumentPart(Box<DocumentPart>),
    EndGroup(Ending),
    EndSubDocument(Ending),
    EndDocument(Ending),
    Finished,
    NoOp,
    RawDocument(Box<RawDocument>),
    Canceled,
}

impl Event {
    /// Kind of the event
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Start => EventType::Start,
            Self::StartDocument(_) => EventType::StartDocument,
            Self::StartSubDocument(_) => EventType::StartSubDocument,
            Self::StartGroup(_) => EventType::StartGroup,
            Self::TextUnit(_) => EventType::TextUnit,
            Self::DocumentPart(_) => EventType::DocumentPart,
            Self::EndGroup(_) => EventType::EndGroup,
            Self::EndSubDocument(_) => EventType::EndSubDocument,
            Self::EndDocument(_) => EventType::EndDocument,
            Self::Finished => EventType::Finished,
            Self::NoOp => EventType::NoOp,
            Self::RawDocument(_) => EventType::RawDocument,
            Self::Canceled => EventType::Canceled,
        }
    }

    /// Id of the carried resource, if it has one
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            Self::StartDocument(sd) => Some(&sd.id),
            Self::StartSubDocument(ssd) => Some(&ssd.id),
            Self::StartGroup(sg) => Some(&sg.id),
            Self::TextUnit(tu) => Some(&tu.id),
            Self::DocumentPart(dp) => Some(&dp.id),
            Self::EndGroup(e) | Self::EndSubDocument(e) | Self::EndDocument(e) => Some(&e.id),
            _ => None,
        }
    }

    /// Event for a text unit
    pub fn text_unit(tu: TextUnit) -> Self {
        Self::TextUnit(Box::new(tu))
    }

    /// Event for a document part
    pub fn document_part(dp: DocumentPart) -> Self {
        Self::DocumentPart(Box::new(dp))
    }

    fn unexpected(&self, expected: EventType) -> EventError {
        EventError::UnexpectedResource {
            expected,
            actual: self.event_type(),
        }
    }

    pub fn as_text_unit(&self) -> Result<&TextUnit, EventError> {
        match self {
            Self::TextUnit(tu) => Ok(tu),
            _ => Err(self.unexpected(EventType::TextUnit)),
        }
    }

    pub fn as_text_unit_mut(&mut self) -> Result<&mut TextUnit, EventError> {
        match self {
            Self::TextUnit(tu) => Ok(tu),
            _ => Err(self.unexpected(EventType::TextUnit)),
        }
    }

    pub fn into_text_unit(self) -> Result<TextUnit, EventError> {
        match self {
            Self::TextUnit(tu) => Ok(*tu),
            other => Err(other.unexpected(EventType::TextUnit)),
        }
    }

    pub fn as_start_document(&self) -> Result<&StartDocument, EventError> {
        match self {
            Self::StartDocument(sd) => Ok(sd),
            _ => Err(self.unexpected(EventType::StartDocument)),
        }
    }

    pub fn as_document_part(&self) -> Result<&DocumentPart, EventError> {
        match self {
            Self::DocumentPart(dp) => Ok(dp),
            _ => Err(self.unexpected(EventType::DocumentPart)),
        }
    }

    pub fn as_start_group(&self) -> Result<&StartGroup, EventError> {
        match self {
            Self::StartGroup(sg) => Ok(sg),
            _ => Err(self.unexpected(EventType::StartGroup)),
        }
    }

    pub fn as_start_subdocument(&self) -> Result<&StartSubDocument, EventError> {
        match self {
            Self::StartSubDocument(ssd) => Ok(ssd),
            _ => Err(self.unexpected(EventType::StartSubDocument)),
        }
    }

    /// Ending carried by an end-group, end-subdocument or end-document event
    pub fn as_ending(&self) -> Result<&Ending, EventError> {
        match self {
            Self::EndGroup(e) | Self::EndSubDocument(e) | Self::EndDocument(e) => Ok(e),
            _ => Err(self.unexpected(EventType::EndDocument)),
        }
    }

    pub fn as_raw_document(&self) -> Result<&RawDocument, EventError> {
        match self {
            Self::RawDocument(raw) => Ok(raw),
            _ => Err(self.unexpected(EventType::RawDocument)),
        }
    }

    pub fn into_raw_document(self) -> Result<RawDocument, EventError> {
        match self {
            Self::RawDocument(raw) => Ok(*raw),
            other => Err(other.unexpected(EventType::RawDocument)),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource_id() {
            Some(id) => write!(f, "{}({})", self.event_type(), id),
            None => write!(f, "{}", self.event_type()),
        }
    }
}
