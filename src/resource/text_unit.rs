/*!
 * Text units: one translatable item with its source, its targets and the
 * skeleton needed to write it back.
 */

use std::collections::BTreeMap;

use log::warn;

use crate::errors::ContainerError;
use crate::locale::LocaleId;
use crate::resource::annotation::Annotations;
use crate::resource::container::{AlignmentReport, MismatchPolicy, TextContainer};
use crate::resource::property::{PropertyHolder, PropertyTable};
use crate::skeleton::GenericSkeleton;

/// How much of the source a new target starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyMode {
    /// Empty target
    #[default]
    Empty,
    /// Source text without codes
    ContentOnly,
    /// Full copy of the source, codes and segmentation included
    ContentAndCodes,
}

/// One translatable unit
#[derive(Debug, Clone)]
pub struct TextUnit {
    /// Id unique within the document
    pub id: String,
    /// Optional name (resource key, element id)
    pub name: Option<String>,
    /// Optional type (e.g. the element name)
    pub unit_type: Option<String>,
    /// MIME type of the content when it differs from the document's
    pub mime_type: Option<String>,
    /// Whether the unit should be translated
    pub translatable: bool,
    /// Whether whitespace is significant
    pub preserve_whitespace: bool,
    /// Referents are written where they are referenced, not where they occur
    pub is_referent: bool,
    /// Resource-level properties
    pub properties: PropertyTable,
    /// Skeleton used to write the unit back
    pub skeleton: Option<GenericSkeleton>,
    /// Typed annotations
    pub annotations: Annotations,
    source: TextContainer,
    targets: BTreeMap<LocaleId, TextContainer>,
}

impl TextUnit {
    /// Create a unit with plain source text
    pub fn new(id: &str, text: &str) -> Self {
        Self::with_source(id, TextContainer::from_text(text))
    }

    /// Create a unit around an existing source container
    pub fn with_source(id: &str, source: TextContainer) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            unit_type: None,
            mime_type: None,
            translatable: true,
            preserve_whitespace: false,
            is_referent: false,
            properties: PropertyTable::new(),
            skeleton: None,
            annotations: Annotations::default(),
            source,
            targets: BTreeMap::new(),
        }
    }

    /// Attach a skeleton
    pub fn with_skeleton(mut self, skeleton: GenericSkeleton) -> Self {
        self.skeleton = Some(skeleton);
        self
    }

    /// Source content
    pub fn source(&self) -> &TextContainer {
        &self.source
    }

    /// Source content for editing
    pub fn source_mut(&mut self) -> &mut TextContainer {
        &mut self.source
    }

    /// Replace the source content
    pub fn set_source(&mut self, source: TextContainer) {
        self.source = source;
    }

    /// Whether a target exists for a locale
    pub fn has_target(&self, locale: &LocaleId) -> bool {
        self.targets.contains_key(locale)
    }

    /// Target for a locale
    pub fn target(&self, locale: &LocaleId) -> Option<&TextContainer> {
        self.targets.get(locale)
    }

    /// Target for a locale, for editing
    pub fn target_mut(&mut self, locale: &LocaleId) -> Option<&mut TextContainer> {
        self.targets.get_mut(locale)
    }

    /// Set or replace a target
    pub fn set_target(&mut self, locale: LocaleId, target: TextContainer) -> Option<TextContainer> {
        self.targets.insert(locale, target)
    }

    /// Remove a target
    pub fn remove_target(&mut self, locale: &LocaleId) -> Option<TextContainer> {
        self.targets.remove(locale)
    }

    /// Locales that have a target
    pub fn target_locales(&self) -> impl Iterator<Item = &LocaleId> {
        self.targets.keys()
    }

    /// Create a target for a locale. An existing target is returned untouched
    /// unless `overwrite` is set.
    pub fn create_target(
        &mut self,
        locale: &LocaleId,
        overwrite: bool,
        mode: CopyMode,
    ) -> &mut TextContainer {
        if overwrite || !self.targets.contains_key(locale) {
            let target = match mode {
                CopyMode::Empty => TextContainer::new(),
                CopyMode::ContentOnly => {
                    let mut copy = self.source.clone();
                    copy.strip_codes();
                    copy
                }
                CopyMode::ContentAndCodes => self.source.clone(),
            };
            self.targets.insert(locale.clone(), target);
        }
        self.targets
            .entry(locale.clone())
            .or_default()
    }

    /// Match target segments to source segments by id and apply `policy` to
    /// any source segment the target lacks
    pub fn align_target_segments(
        &mut self,
        locale: &LocaleId,
        policy: MismatchPolicy,
    ) -> Result<AlignmentReport, ContainerError> {
        let mut report = AlignmentReport::default();
        let Some(target) = self.targets.get(locale) else {
            return Ok(report);
        };
        if !self.source.is_segmented() {
            report.extra = target.segment_ids().iter().map(|s| s.to_string()).collect();
            return Ok(report);
        }

        for id in self.source.segment_ids() {
            if target.segment(id).is_some() {
                report.matched.push(id.to_string());
            } else {
                report.missing.push(id.to_string());
            }
        }
        report.extra = target
            .segment_ids()
            .into_iter()
            .filter(|id| self.source.segment(id).is_none())
            .map(str::to_string)
            .collect();

        if !report.extra.is_empty() {
            warn!(
                "Text unit '{}': target '{}' has segments unknown to the source: {:?}",
                self.id, locale, report.extra
            );
        }
        if report.missing.is_empty() {
            return Ok(report);
        }

        match policy {
            MismatchPolicy::Strict => {
                return Err(ContainerError::SegmentMismatch {
                    locale: locale.to_string(),
                    missing: report.missing,
                });
            }
            MismatchPolicy::UseSource => {
                warn!(
                    "Text unit '{}': target '{}' lacks segments {:?}, using the source instead",
                    self.id, locale, report.missing
                );
                self.targets.remove(locale);
                report.fell_back_to_source = true;
            }
            MismatchPolicy::AppendSource => {
                let Some(target) = self.targets.get_mut(locale) else {
                    return Ok(report);
                };
                if !target.is_segmented() {
                    // Nothing to append to, so the source stands in for the whole target
                    warn!(
                        "Text unit '{}': target '{}' is not segmented, using the source instead of missing segments {:?}",
                        self.id, locale, report.missing
                    );
                    self.targets.remove(locale);
                    report.fell_back_to_source = true;
                    return Ok(report);
                }
                for id in &report.missing {
                    if let Some(segment) = self.source.segment(id) {
                        target.append_segment(Some(id), segment.text.clone())?;
                        report.appended.push(id.clone());
                    }
                }
                warn!(
                    "Text unit '{}': appended source segments {:?} to target '{}'",
                    self.id, report.appended, locale
                );
            }
        }

        Ok(report)
    }
}

impl PropertyHolder for TextUnit {
    fn resource_properties(&self) -> &PropertyTable {
        &self.properties
    }

    fn source_properties(&self) -> &PropertyTable {
        &self.source.properties
    }

    fn target_properties(&self, locale: &LocaleId) -> Option<&PropertyTable> {
        self.targets.get(locale).map(|t| &t.properties)
    }
}
