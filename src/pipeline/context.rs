use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::filter::OutputTarget;
use crate::pipeline::step::{ParameterKind, ParameterValue, PipelineParameters};
use crate::resource::RawDocument;

/// Shared flag checked by the pipeline between events
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag before reusing the token
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One document to process and the parameters that go with it
#[derive(Debug, Clone)]
pub struct BatchItemContext {
    pub document: RawDocument,
    pub parameters: PipelineParameters,
}

impl BatchItemContext {
    /// Item whose parameters are taken from the document
    pub fn new(document: RawDocument) -> Self {
        let mut parameters = PipelineParameters::new();
        parameters.set(
            ParameterKind::SourceLocale,
            ParameterValue::Locale(document.source_locale.clone()),
        );
        if let Some(target) = &document.target_locale {
            parameters.set(ParameterKind::TargetLocale, ParameterValue::Locale(target.clone()));
        }
        parameters.set(
            ParameterKind::InputEncoding,
            ParameterValue::Text(document.encoding.clone()),
        );
        if let Some(config_id) = &document.filter_config_id {
            parameters.set(ParameterKind::FilterConfigId, ParameterValue::Text(config_id.clone()));
        }
        Self {
            document,
            parameters,
        }
    }

    /// Set where the output goes
    pub fn with_output(mut self, target: OutputTarget) -> Self {
        self.parameters
            .set(ParameterKind::OutputUri, ParameterValue::Output(target));
        self
    }

    /// Set or replace a parameter
    pub fn with_parameter(mut self, kind: ParameterKind, value: ParameterValue) -> Self {
        self.parameters.set(kind, value);
        self
    }

    /// Name used in logs and reports
    pub fn display_name(&self) -> String {
        self.document.display_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocaleId;

    #[test]
    fn test_new_shouldDeriveParametersFromDocument() {
        let document = RawDocument::from_text("x", LocaleId::new("en").unwrap())
            .with_target_locale(LocaleId::new("de").unwrap())
            .with_filter("plaintext");
        let item = BatchItemContext::new(document);

        let target = item.parameters.get(ParameterKind::TargetLocale).unwrap();
        assert_eq!(target.as_locale().unwrap().as_str(), "de");
        assert_eq!(
            item.parameters
                .get(ParameterKind::FilterConfigId)
                .and_then(ParameterValue::as_text),
            Some("plaintext")
        );
        assert!(item.parameters.get(ParameterKind::OutputUri).is_none());
    }

    #[test]
    fn test_cancellationToken_clones_shouldShareState() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_canceled());
        token.reset();
        assert!(!clone.is_canceled());
    }
}
