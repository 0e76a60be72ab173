use log::warn;

use crate::errors::PipelineError;
use crate::event::{Event, EventType};
use crate::pipeline::step::Step;

const NAME: &str = "event-sequence-validator";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Started,
    InDocument,
    DocumentEnded,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Open {
    kind: EventType,
    id: String,
}

/// Checks that events arrive in document order: `START`, `START_DOCUMENT`,
/// content with properly nested groups and sub-documents, `END_DOCUMENT`,
/// `FINISHED`. `CANCELED` is accepted anywhere.
#[derive(Debug)]
pub struct EventSequenceValidator {
    phase: Phase,
    open: Vec<Open>,
    seen: usize,
}

impl Default for EventSequenceValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSequenceValidator {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            open: Vec::new(),
            seen: 0,
        }
    }

    /// Number of events checked for the current document
    pub fn events_seen(&self) -> usize {
        self.seen
    }

    fn violation(&self, event: &Event, expected: &str) -> PipelineError {
        PipelineError::contract(
            NAME,
            format!("unexpected {} after {} events, expected {}", event, self.seen, expected),
        )
    }

    fn close(&mut self, event: &Event, kind: EventType) -> Result<(), PipelineError> {
        let Some(top) = self.open.pop() else {
            return Err(self.violation(event, "a matching start event"));
        };
        if top.kind != kind {
            let expected = format!("the end of {}({})", top.kind, top.id);
            self.open.push(top);
            return Err(self.violation(event, &expected));
        }
        if let Some(id) = event.resource_id().filter(|id| *id != top.id) {
            warn!("{} closes '{}' with id '{}'", event.event_type(), top.id, id);
        }
        Ok(())
    }

    /// Check one event against the sequence so far
    pub fn check(&mut self, event: &Event) -> Result<(), PipelineError> {
        match event.event_type() {
            EventType::NoOp | EventType::RawDocument => return Ok(()),
            EventType::Canceled => {
                self.reset();
                return Ok(());
            }
            _ => {}
        }

        match (self.phase, event) {
            (Phase::Idle | Phase::Finished, Event::Start) => {
                self.phase = Phase::Started;
                self.open.clear();
            }
            (Phase::Started, Event::StartDocument(_)) => self.phase = Phase::InDocument,
            (Phase::InDocument, Event::StartSubDocument(ssd)) => self.open.push(Open {
                kind: EventType::StartSubDocument,
                id: ssd.id.clone(),
            }),
            (Phase::InDocument, Event::StartGroup(sg)) => self.open.push(Open {
                kind: EventType::StartGroup,
                id: sg.id.clone(),
            }),
            (Phase::InDocument, Event::EndGroup(_)) => self.close(event, EventType::StartGroup)?,
            (Phase::InDocument, Event::EndSubDocument(_)) => {
                self.close(event, EventType::StartSubDocument)?
            }
            (Phase::InDocument, Event::TextUnit(_) | Event::DocumentPart(_)) => {}
            (Phase::InDocument, Event::EndDocument(_)) => {
                if let Some(top) = self.open.last() {
                    let expected = format!("the end of {}({})", top.kind, top.id);
                    return Err(self.violation(event, &expected));
                }
                self.phase = Phase::DocumentEnded;
            }
            (Phase::DocumentEnded, Event::Finished) => self.phase = Phase::Finished,
            (Phase::Idle | Phase::Finished, _) => return Err(self.violation(event, "START")),
            (Phase::Started, _) => return Err(self.violation(event, "START_DOCUMENT")),
            (Phase::InDocument, _) => return Err(self.violation(event, "content or END_DOCUMENT")),
            (Phase::DocumentEnded, _) => return Err(self.violation(event, "FINISHED")),
        }
        self.seen += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.open.clear();
        self.seen = 0;
    }
}

impl Step for EventSequenceValidator {
    fn name(&self) -> &str {
        NAME
    }

    fn handle_event(&mut self, event: Event) -> Result<Event, PipelineError> {
        self.check(&event)?;
        Ok(event)
    }

    fn finish(&mut self) {
        if !matches!(self.phase, Phase::Idle | Phase::Finished) {
            warn!("Document stopped before FINISHED after {} events", self.seen);
        }
        self.reset();
    }
}
