use log::debug;

use crate::errors::PipelineError;
use crate::event::Event;
use crate::locale::LocaleId;
use crate::pipeline::step::{ParameterKind, ParameterValue, Step, expect_locale};
use crate::resource::MismatchPolicy;

const NAME: &str = "target-segment-sync";

const PARAMETERS: &[ParameterKind] = &[ParameterKind::TargetLocale];

/// Matches target segments to source segments before output and applies
/// a [`MismatchPolicy`] where the target lacks some
#[derive(Debug, Clone)]
pub struct TargetSegmentSyncStep {
    policy: MismatchPolicy,
    target_locale: Option<LocaleId>,
    repaired: usize,
}

impl TargetSegmentSyncStep {
    pub fn new(policy: MismatchPolicy) -> Self {
        Self {
            policy,
            target_locale: None,
            repaired: 0,
        }
    }

    pub fn policy(&self) -> MismatchPolicy {
        self.policy
    }
}

impl Step for TargetSegmentSyncStep {
    fn name(&self) -> &str {
        NAME
    }

    fn handle_event(&mut self, mut event: Event) -> Result<Event, PipelineError> {
        let Some(locale) = self.target_locale.as_ref() else {
            return Ok(event);
        };
        if let Event::TextUnit(tu) = &mut event {
            let report = tu.align_target_segments(locale, self.policy)?;
            if !report.appended.is_empty() || report.fell_back_to_source {
                self.repaired += 1;
            }
        }
        Ok(event)
    }

    fn declared_parameters(&self) -> &[ParameterKind] {
        PARAMETERS
    }

    fn set_parameter(&mut self, kind: ParameterKind, value: &ParameterValue) -> Result<(), PipelineError> {
        if kind == ParameterKind::TargetLocale {
            self.target_locale = Some(expect_locale(NAME, value)?);
        }
        Ok(())
    }

    fn finish(&mut self) {
        if self.repaired > 0 {
            debug!("Repaired segmentation of {} text units", self.repaired);
        }
        self.repaired = 0;
        self.target_locale = None;
    }
}
