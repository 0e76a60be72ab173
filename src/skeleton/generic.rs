/*!
 * Generic skeleton.
 *
 * Everything in a document that is not translatable text is kept as an
 * ordered list of parts: literal text and placeholders. Placeholders store
 * a reference (the owner, another resource's id, a property name), never
 * the data itself; the skeleton writer resolves them at output time.
 *
 * Parts are shared behind `Arc` so concatenating skeletons copies
 * references only. A part is never changed once another skeleton shares
 * it: `append` goes through `Arc::make_mut`, which copies a shared part
 * before extending it.
 */

use std::fmt;
use std::sync::Arc;

use crate::locale::LocaleId;
use crate::resource::property::PropertyScope;
use crate::skeleton::marker::{SELF_REF, make_property_marker, make_ref_marker};

/// Resource a placeholder points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Referent {
    /// The resource owning the skeleton
    Owner,
    /// Another resource, by id
    Id(String),
}

impl Referent {
    /// Id used in textual markers
    pub fn marker_id(&self) -> &str {
        match self {
            Self::Owner => SELF_REF,
            Self::Id(id) => id,
        }
    }
}

/// How a literal part is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiteralMode {
    /// Original markup, copied verbatim
    #[default]
    Raw,
    /// Text that goes through the output encoder
    Encodable,
}

/// One part of a skeleton
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkeletonPart {
    /// Literal text
    Literal {
        /// The text
        text: String,
        /// Raw or encodable
        mode: LiteralMode,
    },
    /// Content of a text unit; `None` means the output locale
    Content {
        /// Text unit to render
        referent: Referent,
        /// Explicit locale to render
        locale: Option<LocaleId>,
    },
    /// Value of a property
    Value {
        /// Resource holding the property
        referent: Referent,
        /// Property name
        property: String,
        /// Level to read the property from
        scope: PropertyScope,
    },
    /// Another resource rendered in place
    Reference {
        /// Id of the referenced resource
        id: String,
    },
}

impl SkeletonPart {
    /// Text of a literal part
    pub fn literal_text(&self) -> Option<&str> {
        match self {
            Self::Literal { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Whether this part is a placeholder
    pub fn is_placeholder(&self) -> bool {
        !matches!(self, Self::Literal { .. })
    }
}

impl fmt::Display for SkeletonPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { text, .. } => f.write_str(text),
            Self::Content { referent, .. } => f.write_str(&make_ref_marker(referent.marker_id())),
            Self::Value {
                referent, property, ..
            } => f.write_str(&make_property_marker(referent.marker_id(), property)),
            Self::Reference { id } => f.write_str(&make_ref_marker(id)),
        }
    }
}

/// Ordered list of literal and placeholder parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericSkeleton {
    parts: Vec<Arc<SkeletonPart>>,
    create_new: bool,
}

impl GenericSkeleton {
    /// Create an empty skeleton
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a skeleton holding one raw literal
    pub fn from_text(text: &str) -> Self {
        let mut skeleton = Self::new();
        skeleton.add(text);
        skeleton
    }

    /// Parts in order
    pub fn parts(&self) -> &[Arc<SkeletonPart>] {
        &self.parts
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether there are no parts
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether all parts are literals made of whitespace
    pub fn is_empty_ignoring_whitespace(&self) -> bool {
        self.parts.iter().all(|part| {
            part.literal_text()
                .is_some_and(|text| text.chars().all(char::is_whitespace))
        })
    }

    fn push(&mut self, part: SkeletonPart, create_new: bool) {
        self.parts.push(Arc::new(part));
        self.create_new = create_new;
    }

    /// Add a raw literal as a new part
    pub fn add(&mut self, text: &str) {
        self.push(
            SkeletonPart::Literal {
                text: text.to_string(),
                mode: LiteralMode::Raw,
            },
            false,
        );
    }

    /// Add an encodable literal as a new part
    pub fn add_encodable(&mut self, text: &str) {
        self.push(
            SkeletonPart::Literal {
                text: text.to_string(),
                mode: LiteralMode::Encodable,
            },
            true,
        );
    }

    /// Extend the last raw literal, or add a new part after a placeholder
    pub fn append(&mut self, text: &str) {
        if !self.create_new {
            if let Some(last) = self.parts.last_mut() {
                if let SkeletonPart::Literal {
                    text: existing,
                    mode: LiteralMode::Raw,
                } = Arc::make_mut(last)
                {
                    existing.push_str(text);
                    return;
                }
            }
        }
        self.add(text);
    }

    /// Prepend raw text to the first part
    pub fn append_to_first_part(&mut self, text: &str) {
        if let Some(first) = self.parts.first_mut() {
            if let SkeletonPart::Literal {
                text: existing,
                mode: LiteralMode::Raw,
            } = Arc::make_mut(first)
            {
                existing.insert_str(0, text);
                return;
            }
        }
        self.parts.insert(
            0,
            Arc::new(SkeletonPart::Literal {
                text: text.to_string(),
                mode: LiteralMode::Raw,
            }),
        );
        if self.parts.len() == 1 {
            self.create_new = false;
        }
    }

    /// Add a placeholder for a text unit's content
    pub fn add_content_placeholder(&mut self, referent: Referent, locale: Option<LocaleId>) {
        self.push(SkeletonPart::Content { referent, locale }, true);
    }

    /// Add a placeholder for a property value
    pub fn add_value_placeholder(&mut self, referent: Referent, property: &str, scope: PropertyScope) {
        self.push(
            SkeletonPart::Value {
                referent,
                property: property.to_string(),
                scope,
            },
            true,
        );
    }

    /// Add a reference to another resource
    pub fn add_reference(&mut self, id: &str) {
        self.push(SkeletonPart::Reference { id: id.to_string() }, true);
    }

    /// Append the parts of another skeleton; parts are shared, not copied
    pub fn add_skeleton(&mut self, other: &GenericSkeleton) {
        if other.is_empty() {
            return;
        }
        self.parts.extend(other.parts.iter().cloned());
        self.create_new = true;
    }

    /// Index of the content placeholder for the owner and a locale
    pub fn find_content_placeholder(&self, locale: Option<&LocaleId>) -> Option<usize> {
        self.parts.iter().position(|part| {
            matches!(
                part.as_ref(),
                SkeletonPart::Content { referent: Referent::Owner, locale: l } if l.as_ref() == locale
            )
        })
    }

    /// Whether the skeleton renders its owner's content somewhere
    pub fn has_content_placeholder(&self) -> bool {
        self.parts.iter().any(|part| {
            matches!(
                part.as_ref(),
                SkeletonPart::Content {
                    referent: Referent::Owner,
                    ..
                }
            )
        })
    }

    /// Replace the part at `index` with the parts of another skeleton
    pub fn replace_part(&mut self, index: usize, replacement: &GenericSkeleton) -> bool {
        if index >= self.parts.len() {
            return false;
        }
        self.parts
            .splice(index..=index, replacement.parts.iter().cloned());
        self.create_new = true;
        true
    }
}

impl fmt::Display for GenericSkeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}
