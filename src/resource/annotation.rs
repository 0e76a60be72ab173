/*!
 * Typed annotations for text units.
 */

use std::collections::BTreeMap;

/// Kinds of annotation a resource can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationKind {
    /// Free-form note for translators
    Note,
    /// Name of the process that produced a target
    Origin,
    /// Match score of a leveraged translation, 0-100
    MatchScore,
}

/// One annotation value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Free-form note
    Note(String),
    /// Producing process
    Origin(String),
    /// Match score
    MatchScore(u8),
}

impl Annotation {
    /// Kind of this annotation
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Self::Note(_) => AnnotationKind::Note,
            Self::Origin(_) => AnnotationKind::Origin,
            Self::MatchScore(_) => AnnotationKind::MatchScore,
        }
    }
}

/// At most one annotation per kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations(BTreeMap<AnnotationKind, Annotation>);

impl Annotations {
    /// Set an annotation, replacing one of the same kind
    pub fn set(&mut self, annotation: Annotation) -> Option<Annotation> {
        self.0.insert(annotation.kind(), annotation)
    }

    /// Get an annotation by kind
    pub fn get(&self, kind: AnnotationKind) -> Option<&Annotation> {
        self.0.get(&kind)
    }

    /// Remove an annotation by kind
    pub fn remove(&mut self, kind: AnnotationKind) -> Option<Annotation> {
        self.0.remove(&kind)
    }

    /// Whether no annotation is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over annotations in kind order
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.values()
    }
}
