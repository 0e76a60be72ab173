use std::sync::Arc;

use log::{debug, warn};

use crate::errors::PipelineError;
use crate::event::Event;
use crate::filter::{Filter, FilterOptions, FilterRegistry};
use crate::locale::LocaleId;
use crate::pipeline::step::{
    ParameterKind, ParameterValue, Step, StepCapabilities, expect_locale, expect_text,
};

const NAME: &str = "raw-document-to-events";

const PARAMETERS: &[ParameterKind] = &[
    ParameterKind::SourceLocale,
    ParameterKind::TargetLocale,
    ParameterKind::InputEncoding,
    ParameterKind::FilterConfigId,
];

/// First step of a pipeline: opens a filter on the raw document and turns
/// each `NO_OP` into the filter's next event
pub struct RawDocumentToEventsStep {
    registry: Arc<FilterRegistry>,
    default_config_id: String,
    config_id: Option<String>,
    source_locale: Option<LocaleId>,
    target_locale: Option<LocaleId>,
    input_encoding: Option<String>,
    filter: Option<Box<dyn Filter>>,
    done: bool,
}

impl RawDocumentToEventsStep {
    pub fn new(registry: Arc<FilterRegistry>, default_config_id: &str) -> Self {
        Self {
            registry,
            default_config_id: default_config_id.to_string(),
            config_id: None,
            source_locale: None,
            target_locale: None,
            input_encoding: None,
            filter: None,
            done: true,
        }
    }

    fn open(&mut self, event: Event) -> Result<Event, PipelineError> {
        let mut document = event.into_raw_document()?;
        let config_id = self
            .config_id
            .clone()
            .or_else(|| document.filter_config_id.clone())
            .unwrap_or_else(|| self.default_config_id.clone());

        if let Some(locale) = &self.source_locale {
            document.source_locale = locale.clone();
        }
        if let Some(encoding) = &self.input_encoding {
            document.encoding = encoding.clone();
        }

        let mut filter = self.registry.create(&config_id)?;
        let mut options = FilterOptions::new(document.source_locale.clone());
        options.target_locale = self
            .target_locale
            .clone()
            .or_else(|| document.target_locale.clone());
        options.default_encoding = document.encoding.clone();
        filter.set_options(options);
        filter.open(&document)?;

        debug!("Opened '{}' with filter '{}'", document.display_name(), config_id);
        self.filter = Some(filter);
        self.done = false;
        self.pull()
    }

    fn pull(&mut self) -> Result<Event, PipelineError> {
        let Some(filter) = self.filter.as_mut() else {
            self.done = true;
            return Ok(Event::NoOp);
        };
        if !filter.has_next() {
            self.close_filter();
            return Ok(Event::NoOp);
        }

        let event = filter.next()?;
        if !filter.has_next() {
            self.close_filter();
        }
        Ok(event)
    }

    fn close_filter(&mut self) {
        if let Some(mut filter) = self.filter.take() {
            filter.close();
        }
        self.done = true;
    }
}

impl Step for RawDocumentToEventsStep {
    fn name(&self) -> &str {
        NAME
    }

    fn handle_event(&mut self, event: Event) -> Result<Event, PipelineError> {
        match event {
            Event::RawDocument(_) => {
                if self.filter.is_some() {
                    warn!("New document received while the previous one is open");
                    self.close_filter();
                }
                self.open(event)
            }
            Event::NoOp => self.pull(),
            Event::Canceled => {
                self.cancel();
                self.close_filter();
                Ok(Event::Canceled)
            }
            other => Ok(other),
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn capabilities(&self) -> StepCapabilities {
        StepCapabilities {
            generates_events: true,
            supports_cancel: true,
            ..StepCapabilities::default()
        }
    }

    fn declared_parameters(&self) -> &[ParameterKind] {
        PARAMETERS
    }

    fn set_parameter(&mut self, kind: ParameterKind, value: &ParameterValue) -> Result<(), PipelineError> {
        match kind {
            ParameterKind::SourceLocale => self.source_locale = Some(expect_locale(NAME, value)?),
            ParameterKind::TargetLocale => self.target_locale = Some(expect_locale(NAME, value)?),
            ParameterKind::InputEncoding => self.input_encoding = Some(expect_text(NAME, value)?),
            ParameterKind::FilterConfigId => self.config_id = Some(expect_text(NAME, value)?),
            _ => {}
        }
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(filter) = self.filter.as_mut() {
            filter.cancel();
        }
    }

    fn finish(&mut self) {
        self.close_filter();
        self.config_id = None;
        self.source_locale = None;
        self.target_locale = None;
        self.input_encoding = None;
    }
}
