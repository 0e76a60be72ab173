use std::sync::Arc;

use log::debug;

use crate::errors::PipelineError;
use crate::event::Event;
use crate::filter::{FilterRegistry, FilterWriter, OutputTarget};
use crate::locale::LocaleId;
use crate::pipeline::step::{
    ParameterKind, ParameterValue, Step, StepCapabilities, expect_locale, expect_text,
};
use crate::resource::StartDocument;

const NAME: &str = "filter-events-to-raw-document";

const PARAMETERS: &[ParameterKind] = &[
    ParameterKind::TargetLocale,
    ParameterKind::OutputEncoding,
    ParameterKind::OutputUri,
];

/// Last step of a pipeline: writes the events back with the writer of the
/// filter that produced them
pub struct FilterWriterStep {
    registry: Arc<FilterRegistry>,
    line_break: Option<String>,
    target_locale: Option<LocaleId>,
    output_encoding: Option<String>,
    output: Option<OutputTarget>,
    writer: Option<Box<dyn FilterWriter>>,
}

impl FilterWriterStep {
    pub fn new(registry: Arc<FilterRegistry>) -> Self {
        Self {
            registry,
            line_break: None,
            target_locale: None,
            output_encoding: None,
            output: None,
            writer: None,
        }
    }

    /// Replace the documents' line breaks in the output
    pub fn with_line_break(mut self, line_break: &str) -> Self {
        self.line_break = Some(line_break.to_string());
        self
    }

    fn create_writer(&mut self, sd: &StartDocument) -> Result<Box<dyn FilterWriter>, PipelineError> {
        let output = self
            .output
            .clone()
            .ok_or_else(|| PipelineError::contract(NAME, "no output target for the document"))?;
        let filter = self.registry.create(&sd.filter_id)?;
        let mut writer = filter.create_filter_writer();

        let locale = self.target_locale.clone().unwrap_or_else(|| sd.locale.clone());
        debug!(
            "Writing '{}' for {} with the '{}' writer",
            sd.name.as_deref().unwrap_or(&sd.id),
            locale,
            writer.name()
        );
        writer.set_options(locale, self.output_encoding.clone());
        writer.set_line_break(self.line_break.clone());
        writer.set_output(output);
        Ok(writer)
    }
}

impl Step for FilterWriterStep {
    fn name(&self) -> &str {
        NAME
    }

    fn handle_event(&mut self, event: Event) -> Result<Event, PipelineError> {
        if let Event::StartDocument(sd) = &event {
            if let Some(mut previous) = self.writer.take() {
                previous.close();
            }
            self.writer = Some(self.create_writer(sd)?);
        }

        if let Some(writer) = self.writer.as_mut() {
            writer.handle_event(&event)?;
            if matches!(event, Event::EndDocument(_) | Event::Canceled) {
                self.writer = None;
            }
        }
        Ok(event)
    }

    fn capabilities(&self) -> StepCapabilities {
        StepCapabilities {
            needs_output: true,
            is_terminal: true,
            ..StepCapabilities::default()
        }
    }

    fn declared_parameters(&self) -> &[ParameterKind] {
        PARAMETERS
    }

    fn set_parameter(&mut self, kind: ParameterKind, value: &ParameterValue) -> Result<(), PipelineError> {
        match kind {
            ParameterKind::TargetLocale => self.target_locale = Some(expect_locale(NAME, value)?),
            ParameterKind::OutputEncoding => self.output_encoding = Some(expect_text(NAME, value)?),
            ParameterKind::OutputUri => match value {
                ParameterValue::Output(target) => self.output = Some(target.clone()),
                _ => return Err(PipelineError::contract(NAME, "expected an output target")),
            },
            _ => {}
        }
        Ok(())
    }

    fn finish(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            writer.close();
        }
        self.target_locale = None;
        self.output_encoding = None;
        self.output = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Ending, TextUnit};

    fn start_document() -> Event {
        Event::StartDocument(Box::new(StartDocument::new(
            "sd1",
            LocaleId::new("en").unwrap(),
            "plaintext",
            "text/plain",
        )))
    }

    #[test]
    fn test_handleEvent_shouldWriteIntoBuffer() {
        let mut step = FilterWriterStep::new(Arc::new(FilterRegistry::with_defaults()));
        let (target, buffer) = OutputTarget::buffer();
        step.set_parameter(ParameterKind::OutputUri, &ParameterValue::Output(target))
            .unwrap();

        step.handle_event(start_document()).unwrap();
        step.handle_event(Event::text_unit(TextUnit::new("tu1", "Hello"))).unwrap();
        step.handle_event(Event::EndDocument(Ending::new("sd1"))).unwrap();

        assert_eq!(buffer.lock().as_slice(), b"Hello");
    }

    #[test]
    fn test_handleEvent_withoutOutput_shouldViolateContract() {
        let mut step = FilterWriterStep::new(Arc::new(FilterRegistry::with_defaults()));
        let err = step.handle_event(start_document()).unwrap_err();
        assert!(matches!(err, PipelineError::ContractViolation { .. }));
    }
}
