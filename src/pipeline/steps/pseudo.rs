use log::debug;

use crate::errors::{ContainerError, PipelineError};
use crate::event::Event;
use crate::locale::LocaleId;
use crate::pipeline::step::{ParameterKind, ParameterValue, Step, expect_locale};
use crate::resource::{Annotation, CopyMode, TextUnit};

const NAME: &str = "pseudo-translate";

const PARAMETERS: &[ParameterKind] = &[ParameterKind::TargetLocale];

/// Marks a target produced by this step
pub const PSEUDO_ORIGIN: &str = "pseudo-translation";

fn accent(c: char) -> char {
    match c {
        'a' => 'à',
        'c' => 'ç',
        'e' => 'è',
        'i' => 'ì',
        'n' => 'ñ',
        'o' => 'ö',
        'u' => 'ü',
        'y' => 'ý',
        'A' => 'À',
        'C' => 'Ç',
        'E' => 'É',
        'I' => 'Î',
        'N' => 'Ñ',
        'O' => 'Ö',
        'U' => 'Ü',
        'Y' => 'Ý',
        other => other,
    }
}

/// Fills the target of every translatable text unit with an accented,
/// bracketed and optionally expanded copy of the source. Codes are kept, so
/// the output stays well formed.
#[derive(Debug, Clone)]
pub struct PseudoTranslateStep {
    prefix: String,
    suffix: String,
    expand_ratio: f32,
    target_locale: Option<LocaleId>,
    units: usize,
}

impl Default for PseudoTranslateStep {
    fn default() -> Self {
        Self::new("[", "]", 0.0)
    }
}

impl PseudoTranslateStep {
    /// `expand_ratio` adds `~` characters in proportion to the text length
    pub fn new(prefix: &str, suffix: &str, expand_ratio: f32) -> Self {
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            expand_ratio: expand_ratio.max(0.0),
            target_locale: None,
            units: 0,
        }
    }

    /// Pseudo-translate a single string
    pub fn transform(&self, text: &str) -> String {
        text.chars().map(accent).collect()
    }

    fn padding(&self, len: usize) -> String {
        let count = (len as f32 * self.expand_ratio).round() as usize;
        "~".repeat(count)
    }

    fn translate(&self, tu: &mut TextUnit, locale: &LocaleId) -> Result<(), PipelineError> {
        let padding = self.padding(tu.source().plain_text().chars().count());
        let target = tu.create_target(locale, true, CopyMode::ContentAndCodes);
        target.map_plain_text(|text| self.transform(text));

        let content = target.content_mut();
        content
            .insert_text(0, &self.prefix)
            .map_err(ContainerError::from)?;
        content.append_text(&padding);
        content.append_text(&self.suffix);

        tu.annotations.set(Annotation::Origin(PSEUDO_ORIGIN.to_string()));
        Ok(())
    }
}

impl Step for PseudoTranslateStep {
    fn name(&self) -> &str {
        NAME
    }

    fn handle_event(&mut self, mut event: Event) -> Result<Event, PipelineError> {
        if let Event::TextUnit(tu) = &mut event {
            if !tu.translatable || !tu.source().has_text(false) {
                return Ok(event);
            }
            let locale = self
                .target_locale
                .clone()
                .ok_or_else(|| PipelineError::contract(NAME, "no target locale set"))?;
            self.translate(tu, &locale)?;
            self.units += 1;
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
        debug!("Pseudo-translated {} text units", self.units);
        self.units = 0;
        self.target_locale = None;
    }
}
