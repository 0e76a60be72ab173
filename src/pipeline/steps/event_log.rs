use std::sync::Arc;

use log::{Level, debug, log_enabled};
use parking_lot::Mutex;

use crate::errors::PipelineError;
use crate::event::{Event, EventType};
use crate::pipeline::step::Step;

/// Event types recorded by an [`EventLogStep`], shared with the caller
pub type EventLog = Arc<Mutex<Vec<EventType>>>;

/// Records the type of every event that passes and traces it at debug level
#[derive(Debug, Default)]
pub struct EventLogStep {
    log: EventLog,
    include_no_op: bool,
}

impl EventLogStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step and the handle to read the recorded types
    pub fn shared() -> (Self, EventLog) {
        let step = Self::new();
        let log = Arc::clone(&step.log);
        (step, log)
    }

    /// Also record `NO_OP` events
    pub fn with_no_op(mut self) -> Self {
        self.include_no_op = true;
        self
    }

    pub fn log(&self) -> EventLog {
        Arc::clone(&self.log)
    }
}

impl Step for EventLogStep {
    fn name(&self) -> &str {
        "event-log"
    }

    fn handle_event(&mut self, event: Event) -> Result<Event, PipelineError> {
        let event_type = event.event_type();
        if event_type == EventType::NoOp && !self.include_no_op {
            return Ok(event);
        }
        if log_enabled!(Level::Debug) {
            debug!("Event {}", event);
        }
        self.log.lock().push(event_type);
        Ok(event)
    }
}
